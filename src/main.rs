//! Verlock CLI - resolve, download and lock dependency versions
//!
//! Entry point for the verlock command-line application.

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use verlock::cli::output::display_error;
use verlock::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let output = cli.output_config();

    let level = match (cli.quiet, cli.verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::WARN,
        (false, 1) => Level::INFO,
        (false, _) => Level::DEBUG,
    };

    // Initialize tracing subscriber; RUST_LOG directives refine the level
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing lock writes in progress");
            interrupt.cancel();
        }
    });

    // Run the command and handle errors
    if let Err(e) = cli.run(cancel).await {
        display_error(&e, &output);
        std::process::exit(1);
    }
}
