use anyhow::{Context, Result};
use clap::Parser;
use judgy_core::{AppError, Config, Judgy, RoastLevel, init, render};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Get your photo roasted", long_about = None)]
struct Args {
    /// Override the analysis endpoint defined in .env
    #[arg(long)]
    api_url: Option<String>,

    /// Roast this image in the terminal instead of opening the window
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// Roast level: mild, medium or savage
    #[arg(short, long, default_value = "medium", value_parser = parse_level)]
    level: RoastLevel,
}

fn parse_level(raw: &str) -> std::result::Result<RoastLevel, String> {
    raw.parse::<RoastLevel>().map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Setup
    let _ = dotenvy::dotenv();
    init();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    // Load config and override the endpoint if specified via CLI
    let config = match &args.api_url {
        Some(url) => Config::builder()
            .with_api_url(url)
            .build()
            .context("Invalid --api-url")?,
        None => Config::load().context("Failed to load configuration")?,
    };

    let judgy = Judgy::with_config(config).context("Failed to initialize client")?;
    tracing::debug!(api_url = %judgy.config().api_url, "configuration loaded");

    let Some(path) = args.image else {
        judgy.run_interactive().context("Failed to run the roast window")?;
        return Ok(ExitCode::SUCCESS);
    };

    eprintln!("Analyzing your image and crafting the perfect roast...");
    match judgy.roast_file(&path, args.level).await {
        Ok(result) => {
            println!("{}", render(&result));
            Ok(ExitCode::SUCCESS)
        }
        Err(e @ (AppError::InvalidInput(_) | AppError::RequestFailed(_))) => {
            eprintln!("{}", e);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e).with_context(|| format!("Failed to roast {}", path.display())),
    }
}
