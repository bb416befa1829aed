use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod error;
mod model;
mod parsers;
mod services;

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = cli::command::Cli::parse();
    init_tracing(args.verbose);

    cli::run(args)?;
    Ok(())
}
