mod cli;
mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::{Cli, Command};
use mediaconv_core::{load_config_or_default, validate_config, Config};

/// Environment variable naming the configuration file.
const CONFIG_ENV: &str = "MEDIACONV_CONFIG";

/// Configuration file picked up from the working directory.
const DEFAULT_CONFIG_FILE: &str = "mediaconv.toml";

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .or_else(|| std::env::var(CONFIG_ENV).ok().map(PathBuf::from))
        .or_else(|| {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.is_file().then_some(default)
        });

    let mut config = load_config_or_default(config_path.as_deref())
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    init_logging(&config, cli.verbose);
    match &config_path {
        Some(path) => info!("Loaded configuration from {:?}", path),
        None => debug!("No configuration file, using defaults"),
    }

    if let Some(ffmpeg) = cli.ffmpeg {
        config.converter.ffmpeg_path = ffmpeg;
    }

    match cli.command {
        Command::Convert {
            file,
            to,
            output_dir,
            json,
        } => commands::convert(config.converter, &file, &to, output_dir.as_deref(), json).await,
        Command::Formats { file } => commands::formats(&file),
        Command::Encoders => commands::encoders(config.converter).await,
    }
}

/// Logs go to stderr so stdout stays clean for results and `--json`.
fn init_logging(config: &Config, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.filter))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
