//! winpos CLI
//!
//! Runs scene files through the window placement engine and prints one JSON
//! response per step.

mod config;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use winpos_platform_win32::HostBackend;
use winpos_script::{to_json_lines, Runner, Scene};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "winpos")]
#[command(author, version, about = "Drive the winpos window placement engine")]
struct Cli {
    /// Use this config file instead of searching the standard locations
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scene and print its responses as JSON lines
    Run {
        /// Scene file (TOML)
        scene: PathBuf,
        /// Stop at the first failing step
        #[arg(long)]
        stop_on_error: bool,
    },
    /// Print the effective configuration
    Config,
    /// Validate a scene without running it
    Check {
        /// Scene file (TOML)
        scene: PathBuf,
    },
}

fn load_config(path: Option<&Path>) -> Config {
    let loaded = match path {
        Some(p) => Config::load_from_path(p),
        None => Config::load(),
    };
    loaded.unwrap_or_else(|e| {
        // Can't use tracing yet, fall back to eprintln
        eprintln!("Failed to load configuration: {e:#}. Using defaults.");
        Config::default()
    })
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn read_scene(path: &Path) -> Result<Scene> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scene file: {}", path.display()))?;
    Scene::from_toml(&text).with_context(|| format!("Failed to parse scene: {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref());
    let warnings = config.validate();
    init_logging(&config.logging.level)?;
    for w in &warnings {
        warn!("Config: {} - {}", w.field, w.message);
    }

    match cli.command {
        Commands::Run {
            scene,
            stop_on_error,
        } => {
            let parsed = read_scene(&scene)?;
            let backend = HostBackend::new(config.platform());
            let mut runner = Runner::new(&parsed, config.metrics, Box::new(backend))
                .with_context(|| format!("Failed to build scene: {}", scene.display()))?
                .stop_on_error(stop_on_error || config.runner.stop_on_error);

            info!(steps = parsed.steps.len(), "running {}", scene.display());
            let responses = runner.run(&parsed.steps);
            print!("{}", to_json_lines(&responses)?);

            let failed = responses.iter().filter(|r| r.is_error()).count();
            if failed > 0 {
                bail!("{failed} step(s) failed");
            }
        }
        Commands::Config => {
            print!(
                "{}",
                toml::to_string_pretty(&config).context("Failed to encode configuration")?
            );
        }
        Commands::Check { scene } => {
            let parsed = read_scene(&scene)?;
            parsed
                .validate()
                .with_context(|| format!("Invalid scene: {}", scene.display()))?;
            println!(
                "{}: {} window(s), {} step(s)",
                scene.display(),
                parsed.windows.len(),
                parsed.steps.len()
            );
        }
    }

    Ok(())
}
