// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! NeonFolio: portfolio builder
//!
//! Serves the builder UI and offers one-shot commands for describing an
//! image and exporting the print view.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

use neonfolio::config::AppConfig;
use neonfolio::gemini::GeminiClient;
use neonfolio::generator::DescriptionGenerator;
use neonfolio::ingest::ingest_file;
use neonfolio::seed::Seed;
use neonfolio::session::Portfolio;
use neonfolio::web::{self, AppState, Pages};
use neonfolio::{NeonfolioError, Result};

/// NeonFolio CLI - portfolio builder with AI descriptions
#[derive(Parser, Debug)]
#[command(name = "neonfolio")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version)]
#[command(about = "Portfolio builder with AI-generated project descriptions", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (JSON format)
    #[arg(short, long, default_value = "config.json", global = true)]
    config: PathBuf,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the portfolio builder
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Open browser automatically
        #[arg(long)]
        open: bool,
    },

    /// Generate a project description from an image
    Describe {
        /// Image file
        image: PathBuf,

        /// Project title
        #[arg(short, long)]
        title: String,
    },

    /// Write the print view of the seed portfolio to an HTML file
    Export {
        /// Output file
        #[arg(short, long, default_value = "portfolio.html")]
        output: PathBuf,
    },

    /// Check that the AI service accepts the configured model and key
    Status,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Generate default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config.json")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = AppConfig::load(&cli.config)?;

    match cli.command {
        Some(Commands::Serve { host, port, open }) => run_serve(config, host, port, open).await,
        Some(Commands::Describe { image, title }) => run_describe(config, &image, &title).await,
        Some(Commands::Export { output }) => run_export(config, &output),
        Some(Commands::Status) => run_status(config).await,
        Some(Commands::Config { action }) => run_config_command(config, action),
        None => run_serve(config, None, None, false).await,
    }
}

fn build_generator(config: &AppConfig) -> Result<DescriptionGenerator> {
    let api_key = config.ai_engine.api_key();
    if api_key.is_none() {
        warn!(
            "No API key in ${} or $GEMINI_API_KEY; AI descriptions will fail",
            config.ai_engine.api_key_env
        );
    }

    let client = GeminiClient::new(&config.ai_engine, api_key)?;
    Ok(DescriptionGenerator::new(Arc::new(client), &config.prompts))
}

async fn run_serve(
    mut config: AppConfig,
    host: Option<String>,
    port: Option<u16>,
    open: bool,
) -> Result<()> {
    // Apply CLI overrides
    if let Some(host) = host {
        config.web.host = host;
    }
    if let Some(port) = port {
        config.web.port = port;
    }

    let seed = Seed::load(config.seed.path.as_deref())?;
    let generator = build_generator(&config)?;
    info!("AI model: {}", config.ai_engine.model);

    if open {
        let url = format!("http://{}:{}", config.web.host, config.web.port);
        if let Err(e) = open_browser(&url) {
            error!("Failed to open browser: {}", e);
        }
    }

    let state = Arc::new(AppState::new(config, seed, generator)?);
    web::start_server(state).await
}

async fn run_describe(config: AppConfig, image: &Path, title: &str) -> Result<()> {
    let image = ingest_file(image).await?;
    let generator = build_generator(&config)?;

    let description = generator.generate(title, Some(&image)).await?;
    println!("{}", description);
    Ok(())
}

fn run_export(config: AppConfig, output: &Path) -> Result<()> {
    let portfolio: Portfolio = Seed::load(config.seed.path.as_deref())?.into();
    let pages = Pages::new(&config.web.image_fallback_url)?;

    std::fs::write(output, pages.print(&portfolio, true)?)?;
    println!("Exported {} projects to {:?}", portfolio.projects.len(), output);
    println!("Open it in a browser and choose \"Save as PDF\" in the print dialog.");
    Ok(())
}

async fn run_status(config: AppConfig) -> Result<()> {
    let client = GeminiClient::new(&config.ai_engine, config.ai_engine.api_key())?;

    println!("AI service: {}", config.ai_engine.url);
    println!("Model:      {}", client.model());

    match client.health_check().await {
        Ok(()) => {
            println!("Status:     reachable");
            Ok(())
        }
        Err(e) => {
            println!("Status:     unavailable");
            Err(e)
        }
    }
}

fn run_config_command(config: AppConfig, action: ConfigCommands) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigCommands::Generate { output, force } => {
            if output.exists() && !force {
                return Err(NeonfolioError::Config(format!(
                    "{:?} already exists (use --force to overwrite)",
                    output
                )));
            }
            AppConfig::default().save(&output)?;
            println!("Generated config at {:?}", output);
        }
    }
    Ok(())
}

fn open_browser(url: &str) -> std::io::Result<()> {
    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()?;
    }
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()?;
    }
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }
    Ok(())
}
