//! `intestacy`: work out who inherits under UK intestacy rules.

mod commands;
mod config;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use config::IntestacyConfig;
use intestacy_flow::{Catalog, QuestionFlowEngine, TransitionTable};

#[derive(Parser)]
#[command(
    name = "intestacy",
    version,
    about = "UK (England & Wales) intestacy distribution calculator"
)]
struct Cli {
    /// Log filter directive (e.g. "debug", "intestacy_flow=trace")
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer questions interactively until the estate is resolved
    Ask {
        /// Also ask how many people share, to show per-person amounts
        #[arg(long)]
        collect_counts: bool,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Resolve a JSON file of estate facts
    Resolve {
        /// Path to the facts file
        facts: PathBuf,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the questions and where each answer leads
    Questions {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write a default intestacy.toml in the current directory
    Init,
}

fn main() {
    let cli = Cli::parse();

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let (config, config_path) = load_config_optional(&cwd)?;

    init_logging(
        cli.log_level
            .as_deref()
            .or(config.logging.filter.as_deref())
            .unwrap_or("warn"),
        cli.log_json || config.logging.json,
    );
    if let Some(path) = &config_path {
        debug!(path = %path.display(), "loaded configuration");
    }

    match cli.command {
        Commands::Ask {
            collect_counts,
            json,
        } => {
            let mut options = config.flow_options();
            options.collect_counts |= collect_counts;
            let engine = build_engine(&config)?.with_options(options);
            commands::ask::run(&engine, json)
        }
        Commands::Resolve { facts, json } => {
            commands::resolve::run(&config.calculator(), &facts, json)
        }
        Commands::Questions { json } => commands::questions::run(&build_engine(&config)?, json),
        Commands::Init => commands::init::run(&cwd),
    }
}

fn build_engine(config: &IntestacyConfig) -> anyhow::Result<QuestionFlowEngine> {
    let engine = QuestionFlowEngine::new(
        Catalog::standard(),
        TransitionTable::standard(),
        config.calculator(),
    )?;
    Ok(engine)
}

/// Install the global subscriber. `RUST_LOG` wins over `filter`. Logs go to
/// stderr so prompts on stdout stay clean.
fn init_logging(filter: &str, json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Try to load a config from the current directory upward. Defaults if none.
fn load_config_optional(cwd: &Path) -> anyhow::Result<(IntestacyConfig, Option<PathBuf>)> {
    match IntestacyConfig::find_and_load(cwd)? {
        Some((config, path)) => Ok((config, Some(path))),
        None => Ok((IntestacyConfig::default(), None)),
    }
}
