use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod error;
mod formats;
mod identify;
mod output;
mod utils;

use error::Result;

#[derive(Parser)]
#[command(name = "keyprobe", version)]
#[command(about = "Identify SSH and PEM private key files without decrypting them", long_about = None)]
struct Cli {
    /// Log diagnostics to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report format, type, size and fingerprints of key files
    Identify {
        #[command(flatten)]
        config: identify::Config,
    },
    /// List the key formats that can be detected
    Formats {
        #[command(flatten)]
        config: formats::Config,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Identify { config } => identify::execute(config),
        Commands::Formats { config } => formats::execute(config),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("keyprobe: {}", err);
            ExitCode::FAILURE
        }
    }
}
