//! Magpie CLI - Command line interface for Magpie
//!
//! Pulls GitHub issues and pull requests (and the items they reference)
//! into LLM-ready JSON or Markdown documents.

mod commands;
mod markdown;

use clap::{Parser, Subcommand};
use magpie_core::{Config, Secrets};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::FetchArgs;

/// Magpie: GitHub issue and PR extraction for LLM consumption
#[derive(Parser, Debug)]
#[command(name = "magpie")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Base URL of the extraction service (overrides config and env)
    #[arg(long, global = true, env = "MAGPIE_EXTRACTOR_URL")]
    extractor_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Fetch a GitHub issue or pull request as an LLM-ready document
    #[command(visible_alias = "f")]
    Fetch(FetchArgs),

    /// Show current configuration
    Config {
        /// Create a secrets file template at the default location
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("Error: {:#}", err);
        std::process::exit(exit_code(&err));
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    // Load configuration with overrides
    let config = Config::load_with_overrides(cli.extractor_url.clone())?;

    if cli.verbose {
        tracing::info!(
            extractor_url = %config.extractor.base_url,
            diff_host = %config.diff.host,
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("magpie {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Fetch(args)) => {
            args.execute(cli.verbose, &config).await?;
        }
        Some(Commands::Config { init }) => {
            if init {
                let path = Secrets::create_template()?;
                println!("Secrets template created at {}", path.display());
                return Ok(());
            }

            println!("Magpie Configuration");
            println!("====================");
            println!();
            println!("Extractor:");
            println!("  base_url: {}", config.extractor.base_url);
            println!("  timeout: {:?}", config.extractor.timeout);
            println!(
                "  retry: {} attempts, {:?} min delay",
                config.extractor.retry.max_attempts, config.extractor.retry.min_delay
            );
            println!(
                "  api_key: {}",
                match Secrets::load().map(|s| s.api_key()) {
                    Ok(Some(_)) => "(configured)",
                    _ => "(not set)",
                }
            );
            println!();
            println!("Diff:");
            println!("  host: {}", config.diff.host);
            println!();
            if let Some(path) = Config::default_config_path() {
                println!("Config file: {}", path.display());
                if path.exists() {
                    println!("  (exists)");
                } else {
                    println!("  (not found - using defaults)");
                }
            }
        }
        None => {
            println!("Magpie - GitHub issue and PR extraction for LLM consumption");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

/// Map failures to distinct exit codes
///
/// 1: the URL was not a GitHub issue/PR URL. 2: a classified upstream
/// failure (extraction service or diff host). 3: anything unexpected.
fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<magpie_github::Error>() {
        Some(magpie_github::Error::InvalidUrl(_)) => 1,
        Some(_) => 2,
        None => 3,
    }
}
