//! Reelshade command-line interface.
//!
//! Runs the discovery pass headless: list the catalog, dump the composed
//! blending shader, or show which directories a pass would touch. Useful for
//! validating an effects installation without starting the editor.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use reelshade_core::core::frei0r::plugin_search_roots;
use reelshade_core::{run_discovery, DiscoveryConfig, EffectMeta, SettingsManager};

static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

#[derive(Parser)]
#[command(name = "reelshade")]
#[command(about = "Effect discovery and blending-shader composition")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Effect directory to scan; repeatable, overrides configured directories
    #[arg(long = "effects-dir", global = true, value_name = "DIR")]
    effects_dirs: Vec<PathBuf>,

    /// Skip the platform's well-known frei0r plugin directories
    #[arg(long, global = true)]
    no_system_plugin_dirs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run discovery and print the effect catalog
    Scan {
        /// Emit the catalog as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run discovery and print the composed blending shader
    Shader {
        /// Write the shader to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Print the effective search directories and plugin roots
    Paths {
        /// Emit the paths as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = discovery_config(&cli)?;

    match cli.command {
        Commands::Scan { json } => scan(&config, json),
        Commands::Shader { output } => shader(&config, output.as_deref()),
        Commands::Paths { json } => paths(&config, json),
    }
}

/// Logs go to stderr so stdout stays clean for catalog and shader output; a
/// rolling file copy lands in the platform data directory, best effort.
fn init_logging() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(cfg!(debug_assertions));

    let file_layer = dirs::data_local_dir().map(|base| {
        let log_dir = base.join("reelshade").join("logs");
        let _ = std::fs::create_dir_all(&log_dir);
        let appender = tracing_appender::rolling::daily(&log_dir, "reelshade.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let _ = LOG_GUARD.set(guard);
        tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
    });

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init();
}

/// Resolves the discovery configuration from settings, then applies
/// command-line overrides on top.
fn discovery_config(cli: &Cli) -> anyhow::Result<DiscoveryConfig> {
    let manager = match &cli.settings {
        Some(path) => SettingsManager::new(path.clone()),
        None => SettingsManager::new(
            SettingsManager::default_path().context("resolving settings path")?,
        ),
    };
    let settings = manager
        .load()
        .with_context(|| format!("loading settings from {}", manager.path().display()))?;

    let mut config = DiscoveryConfig::from_settings(&settings);
    if !cli.effects_dirs.is_empty() {
        config.effect_dirs = cli.effects_dirs.clone();
    }
    if cli.no_system_plugin_dirs {
        config.include_system_plugin_dirs = false;
    }
    Ok(config)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScanReport<'a> {
    effects: &'a [EffectMeta],
    blend_modes: Vec<&'a str>,
}

fn scan(config: &DiscoveryConfig, json: bool) -> anyhow::Result<()> {
    let context = run_discovery(config);

    if json {
        let report = ScanReport {
            effects: context.catalog.entries(),
            blend_modes: context
                .blend_modes
                .modes()
                .iter()
                .map(|mode| mode.name.as_str())
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for meta in context.catalog.entries() {
        let category = if meta.category.is_empty() {
            "-"
        } else {
            meta.category.as_str()
        };
        println!(
            "{:<24} {:<12} {} {}",
            meta.name, category, meta.subtype, meta.effect_type
        );
    }
    println!();
    println!(
        "{} effects, {} blend modes, shader {} bytes",
        context.catalog.len(),
        context.blend_modes.len(),
        context.blending_shader.len()
    );
    Ok(())
}

fn shader(config: &DiscoveryConfig, output: Option<&Path>) -> anyhow::Result<()> {
    let context = run_discovery(config);

    match output {
        Some(path) => {
            std::fs::write(path, &context.blending_shader)
                .with_context(|| format!("writing {}", path.display()))?;
            info!("Wrote blending shader to {}", path.display());
        }
        None => print!("{}", context.blending_shader),
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PathsReport {
    effect_dirs: Vec<PathBuf>,
    plugin_roots: Vec<PathBuf>,
}

fn paths(config: &DiscoveryConfig, json: bool) -> anyhow::Result<()> {
    let report = PathsReport {
        effect_dirs: config.effect_dirs.clone(),
        plugin_roots: plugin_search_roots(&config.effect_dirs, config.include_system_plugin_dirs),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Effect directories:");
    for dir in &report.effect_dirs {
        println!("  {}", dir.display());
    }
    println!("Plugin roots:");
    for root in &report.plugin_roots {
        println!("  {}", root.display());
    }
    Ok(())
}
