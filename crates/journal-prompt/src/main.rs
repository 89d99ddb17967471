//! Generate today's journaling question, record it, and email it.
//!
//! Configuration comes from the environment (optionally seeded from a `.env`
//! file in the working directory). `RUST_LOG` controls log verbosity.
//!
//! # Examples
//!
//! ```sh
//! # Normal scheduled run
//! journal-prompt
//!
//! # Preview without touching history or sending mail
//! journal-prompt --dry-run --variant single
//! ```

use std::path::PathBuf;
use std::process;

use clap::Parser;
use journal_prompt::{Config, RunOptions, RunOutcome, Variant};
use tracing_subscriber::EnvFilter;

/// Generate today's journaling question, record it, and email it.
#[derive(Parser)]
#[command(name = "journal-prompt", version)]
struct Cli {
    /// Print the question instead of recording and emailing it
    #[arg(long)]
    dry_run: bool,

    /// Question contract (overrides QUESTION_VARIANT)
    #[arg(long, value_enum)]
    variant: Option<Variant>,

    /// History file (overrides HISTORY_PATH)
    #[arg(long)]
    history_path: Option<PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn execute(cli: &Cli) -> journal_prompt::Result<RunOutcome> {
    let mut config = Config::from_env()?;
    if let Some(variant) = cli.variant {
        config = config.with_variant(variant);
    }
    if let Some(ref path) = cli.history_path {
        config = config.with_history_path(path);
    }

    let options = RunOptions {
        dry_run: cli.dry_run,
    };
    journal_prompt::run(&config, chrono::Utc::now(), options).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenv::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();

    match execute(&cli).await {
        Ok(outcome) => {
            if cli.dry_run {
                println!("{}\n\n{}", outcome.subject, outcome.question);
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
