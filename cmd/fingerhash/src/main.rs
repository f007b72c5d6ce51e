//! fingerhash - fingerprint identification from the command line.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{ConfigCommand, IdentifyCommand, ParseCommand};

/// fingerhash - identify fingerprints against a gallery of `.xyt` templates.
///
/// Templates are read from `.xyt` minutiae files (one "X Y ANGLE" record per
/// line). The gallery is indexed in memory for every invocation.
///
/// Settings are read from ~/.fingerhash/config.yaml when present.
#[derive(Parser)]
#[command(name = "fingerhash")]
#[command(about = "Fingerprint identification with a geometric hash index")]
#[command(version)]
pub struct Cli {
    /// Settings file, YAML or JSON (default is ~/.fingerhash/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Output file (default: stdout)
    #[arg(short = 'o', long, global = true)]
    pub output: Option<String>,

    /// Output as JSON (for piping)
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show or initialize settings
    Config(ConfigCommand),
    /// Parse an .xyt file and print its template
    Parse(ParseCommand),
    /// Identify a probe against a gallery
    Identify(IdentifyCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Config(cmd) => cmd.run(&cli),
        Commands::Parse(cmd) => cmd.run(&cli),
        Commands::Identify(cmd) => cmd.run(&cli),
    }
}
