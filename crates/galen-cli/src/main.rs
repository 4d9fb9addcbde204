//! Galen CLI - Command-line interface for the clinical knowledge graph.

use clap::Parser;
use galen_cli::{commands, Cli, Config, Formatter, Workspace};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_env("GALEN_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run() {
        println!("{}", e.to_payload());
        std::process::exit(1);
    }
}

fn run() -> galen_cli::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    let workspace = Workspace::open(&config)?;
    let output = commands::execute(cli.command, &workspace, &formatter)?;
    if !output.is_empty() {
        println!("{}", output);
    }

    Ok(())
}
