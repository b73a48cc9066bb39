//! Originality CLI
//!
//! Reads text from a file or stdin and prints the result as JSON.
//! Configuration comes from `$ORIGINALITY_CONFIG`, else `./originality.yaml`.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use originality::{build_service, OriginalityConfig};
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

/// Score text for AI likelihood and paraphrase it
#[derive(Parser)]
#[command(name = "originality")]
#[command(version)]
#[command(about = "Score text for AI likelihood and paraphrase it")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the AI-likelihood of the text as JSON
    Check {
        /// Input file; stdin when omitted or '-'
        file: Option<PathBuf>,
    },
    /// Print a paraphrase of the text as JSON
    Paraphrase {
        /// Input file; stdin when omitted or '-'
        file: Option<PathBuf>,
    },
    /// Paraphrase, diff and re-check the text
    Rewrite {
        /// Input file; stdin when omitted or '-'
        file: Option<PathBuf>,
    },
}

impl Command {
    fn input(&self) -> Option<&PathBuf> {
        let file = match self {
            Command::Check { file } | Command::Paraphrase { file } | Command::Rewrite { file } => {
                file.as_ref()
            }
        };
        file.filter(|path| path.as_os_str() != "-")
    }
}

async fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("failed to read stdin")?;
            Ok(text)
        }
    }
}

async fn run(command: Command) -> Result<()> {
    let config = OriginalityConfig::load().context("failed to load configuration")?;
    let service = build_service(&config)?;

    let text = read_input(command.input()).await?;
    let text = text.trim_end_matches(['\r', '\n']);
    service.validate_input(text)?;

    let json = match command {
        Command::Check { .. } => {
            serde_json::to_string_pretty(&service.check_originality(text).await?)?
        }
        Command::Paraphrase { .. } => serde_json::to_string_pretty(&service.paraphrase(text).await)?,
        Command::Rewrite { .. } => serde_json::to_string_pretty(&service.rewrite(text).await?)?,
    };
    println!("{json}");
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
