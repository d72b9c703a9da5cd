// Secretsenv - export secrets from cloud secret stores as shell variables
//
// This is the main entry point for the application.

use anyhow::{Context, Result};
use clap::Parser;
use secretsenv::cloud::LoaderRegistry;
use secretsenv::config::Config;
use secretsenv::runner::SecretsEnv;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Print `export` statements for secrets described in .secretsenv.yml
#[derive(Parser, Debug)]
#[command(name = "secretsenv")]
#[command(version)]
#[command(about = "Export secrets from cloud secret stores as shell variables", long_about = None)]
struct Cli {
    /// Path to the configuration file (default: search .secretsenv.yml upwards)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, default_value = "false")]
    verbose: bool,

    /// Entries to export (default: all entries)
    entries: Vec<String>,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("SECRETSENV_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config_path = match cli.config {
        Some(path) => path,
        None => {
            let cwd = std::env::current_dir().context("Failed to get current directory")?;
            Config::discover(&cwd)?
        }
    };
    debug!(path = %config_path.display(), "Using configuration file");

    let config = Config::from_file(&config_path)?;
    config
        .validate()
        .with_context(|| format!("Configuration validation failed: {}", config_path.display()))?;

    let secrets_env = SecretsEnv::new(LoaderRegistry::with_builtin());

    let mut stdout = std::io::stdout().lock();
    secrets_env.run(&config, &cli.entries, &mut stdout)?;

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
