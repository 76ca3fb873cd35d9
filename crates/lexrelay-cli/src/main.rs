mod cli;
mod commands;
mod config;
mod error;

use clap::Parser;
use cli::Cli;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let _guard = init_logging(cli.verbose);
    let config = config::CliConfig::load();

    if let Err(err) = commands::run(cli, config).await {
        error::handle_error(err);
    }
}

/// Log to a daily file so streamed replies on stdout stay clean.
fn init_logging(verbose: bool) -> Option<WorkerGuard> {
    let log_dir = dirs::data_dir()?.join("lexrelay").join("logs");
    std::fs::create_dir_all(&log_dir).ok()?;

    let file_appender = tracing_appender::rolling::daily(log_dir, "lexrelay.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let default_level = if verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .init();

    Some(guard)
}
