use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use sheetdraw_core::{RenderConfig, Renderer};
use std::path::PathBuf;

mod formatter;

#[derive(Parser)]
#[command(name = "sheetdraw")]
#[command(about = "Resolve ODS sheet layout and styles into draw commands", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the ODS file to render
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Device resolution in dots per inch
    #[arg(long, value_name = "N")]
    dpi: Option<f64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    format: OutputFormat,

    /// Only output the named sheet (repeatable)
    #[arg(short, long = "sheet", value_name = "NAME")]
    sheets: Vec<String>,

    /// Drop text commands with no content
    #[arg(long)]
    elide_empty_text: bool,

    /// Render rows in parallel
    #[arg(long)]
    parallel: bool,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable colored summary
    Human,
    /// Full command stream as JSON
    Json,
}

fn load_config(cli: &Cli) -> Result<RenderConfig> {
    let mut config = if let Some(config_path) = &cli.config {
        RenderConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        // Try to load default config from current directory if it exists
        let default_config_path = PathBuf::from("sheetdraw.toml");
        if default_config_path.exists() {
            RenderConfig::from_file(&default_config_path).with_context(|| {
                format!(
                    "Failed to load config from {}",
                    default_config_path.display()
                )
            })?
        } else {
            RenderConfig::default()
        }
    };

    // Command-line flags win over the file
    if let Some(dpi) = cli.dpi {
        config.resolution_dpi = dpi;
    }
    if cli.elide_empty_text {
        config.elide_empty_text = true;
    }
    if cli.parallel {
        config.parallel_rows = true;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = load_config(&cli)?;
    let renderer = Renderer::with_config(config);

    let mut rendering = renderer
        .render_file(&cli.file)
        .with_context(|| format!("Failed to render file: {}", cli.file.display()))?;

    if !cli.sheets.is_empty() {
        for wanted in &cli.sheets {
            if rendering.sheet(wanted).is_none() {
                log::warn!("Sheet '{}' not found in {}", wanted, cli.file.display());
            }
        }
        rendering.sheets.retain(|s| cli.sheets.contains(&s.name));
        rendering.diagnostics.retain(|d| match d.scope.sheet_name() {
            Some(name) => cli.sheets.iter().any(|s| s == name),
            None => true,
        });
    }

    match cli.format {
        OutputFormat::Human => {
            formatter::print_human(&cli.file, &rendering);
        }
        OutputFormat::Json => {
            formatter::print_json(&cli.file, &rendering)?;
        }
    }

    Ok(())
}
