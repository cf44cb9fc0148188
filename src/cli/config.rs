//! Configuration file support.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::progress::DEFAULT_BAR_WIDTH;
use crate::query::{DEFAULT_GAP_THRESHOLD, DEFAULT_LIMIT, ReportOptions};
use crate::sync::{DEFAULT_DEBOUNCE, SyncSettings};

/// Application configuration loaded from config file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default vault directory
    pub dir: Option<PathBuf>,

    /// Quiet period before the watcher processes changes
    pub debounce_ms: Option<u64>,

    /// Width of the progress bar in topic notes and reports
    pub bar_width: Option<usize>,

    /// Progress below which a topic is reported as a knowledge gap
    pub gap_threshold: Option<f64>,

    /// Number of topics listed by `recommend`
    pub recommend_limit: Option<usize>,

    /// Number of topics listed by `gaps`
    pub gap_limit: Option<usize>,
}

impl Config {
    /// Load configuration from the default config file location.
    ///
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read config file: {}", config_path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("failed to parse config file: {}", config_path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Returns the path to the config file.
    ///
    /// Default: `~/.config/trail/config.toml`
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("trail")
            .join("config.toml")
    }

    /// Resolve the vault directory, with CLI argument taking precedence.
    ///
    /// Precedence order:
    /// 1. CLI `--dir` argument
    /// 2. Config file `dir` setting
    /// 3. Current working directory
    pub fn notes_dir(&self, cli_dir: Option<&PathBuf>) -> PathBuf {
        cli_dir
            .cloned()
            .or_else(|| self.dir.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn sync_settings(&self) -> SyncSettings {
        SyncSettings {
            debounce: self
                .debounce_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_DEBOUNCE),
            bar_width: self.bar_width(),
        }
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            bar_width: self.bar_width(),
            gap_threshold: self.gap_threshold.unwrap_or(DEFAULT_GAP_THRESHOLD),
            recommend_limit: self.recommend_limit.unwrap_or(DEFAULT_LIMIT),
            gap_limit: self.gap_limit.unwrap_or(DEFAULT_LIMIT),
        }
    }

    fn bar_width(&self) -> usize {
        self.bar_width.unwrap_or(DEFAULT_BAR_WIDTH)
    }
}
