use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(err) = trail::run() {
        eprintln!("error: {err:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
