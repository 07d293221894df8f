//! Binary entrypoint for the `picflow` CLI.

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,picflow=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Recording is handled in commands::dispatch via PICFLOW_RECORD=<dir>.
    match picflow::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
