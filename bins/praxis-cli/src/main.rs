mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "praxis-cli")]
#[command(about = "Praxis CLI - Run code against a remote execution backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a source file against a JSON test-case file
    Run {
        /// Path to the source file
        #[arg(short, long)]
        source: PathBuf,

        /// Path to the test-case JSON file
        #[arg(short, long)]
        tests: PathBuf,

        /// Submission mode: sync (one wait request per test) or batch
        /// (chunked tokens plus polling)
        #[arg(short, long, default_value = "batch")]
        mode: String,

        /// Backend base URL (defaults to JUDGE_API_URL)
        #[arg(long)]
        url: Option<String>,

        /// Backend credential (defaults to JUDGE_API_KEY)
        #[arg(long)]
        key: Option<String>,

        /// Language name or numeric backend language id
        #[arg(short, long, default_value = "python")]
        language: String,

        /// Wall-clock timeout for the whole run, in seconds
        #[arg(long, default_value = "60")]
        timeout: u64,
    },

    /// List known language identifiers
    Languages,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            source,
            tests,
            mode,
            url,
            key,
            language,
            timeout,
        } => {
            commands::run(&source, &tests, &mode, url, key, &language, timeout).await?;
        }
        Commands::Languages => {
            commands::list_languages();
        }
    }

    Ok(())
}
