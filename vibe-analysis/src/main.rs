//! Vibe Analysis - command-line front end for the content analyzer.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use vibe_common::config::Config;
use vibe_common::logging::init_logging;
use vibe_common::BackendKind;
use vibe_analysis::ContentAnalyzer;

#[derive(Parser, Debug)]
#[command(name = "vibe-analysis")]
#[command(version)]
#[command(about = "Sentiment, context and safety analysis for short posts", long_about = None)]
struct Cli {
    /// Load configuration from this file instead of ~/.vibe/config.json
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze one text and print both annotations as JSON
    Analyze {
        /// Text to analyze (read from stdin when omitted)
        text: Option<String>,

        /// Override the configured backend (strict, heuristic, none)
        #[arg(long)]
        backend: Option<BackendKind>,
    },
    /// Validate and print the effective configuration
    CheckConfig,
}

fn read_input(text: Option<String>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }

    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read text from stdin")?;
    Ok(buf)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let path = cli.config.as_deref();
    let mut config = match cli.command {
        Commands::CheckConfig => {
            Config::load_and_validate(path).context("Invalid configuration")?
        }
        Commands::Analyze { .. } => Config::load_with_env(path)?,
    };

    init_logging(
        &config.observability.log_level,
        &config.observability.log_format,
    );

    match cli.command {
        Commands::Analyze { text, backend } => {
            if let Some(kind) = backend {
                config.backend.kind = kind;
            }

            let analyzer = ContentAnalyzer::from_config(&config)
                .context("Failed to initialize content analyzer")?;
            let text = read_input(text)?;

            let pair = analyzer.analyze(&text).await;
            println!("{}", serde_json::to_string_pretty(&pair)?);
        }
        Commands::CheckConfig => {
            tracing::info!("Configuration is valid");
            println!("{}", serde_json::to_string_pretty(&config.redacted())?);
        }
    }

    Ok(())
}
