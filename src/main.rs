use std::process::ExitCode;

use clap::Parser;
use ilm_report::{app::App, cli::Args};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let (config, kind) = match args.into_config() {
        Ok(config) => config,
        Err(report) => {
            tracing::error!("{report:?}");
            return ExitCode::FAILURE;
        }
    };

    match App::new(config).run(kind).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) => {
            tracing::error!("{report:?}");
            ExitCode::FAILURE
        }
    }
}

// Logs go to stderr, stdout carries the report.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
