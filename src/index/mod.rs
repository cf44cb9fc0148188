//! SQLite metadata cache and the builder that fills it

mod builder;
mod repository;
mod schema;
mod sqlite;

pub use builder::{
    BuildError, BuildResult, FileResult, IndexBuilder, NoopReporter, ProgressReporter,
    UpdateResult,
};
pub use repository::{IndexError, IndexResult, MetadataCache, NoteMeta, NoteMetaBuilder};
pub use schema::{SCHEMA_VERSION, create_schema, get_schema_version};
pub use sqlite::{SqliteIndex, Transaction};
