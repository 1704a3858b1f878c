//! Render command - Print or write a sample document.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use cfnkit_core::{Format, RenderConfig};

use super::parse_sample;

#[derive(Args)]
pub struct RenderArgs {
    /// Name of the sample document
    sample: String,

    /// Output format (json or yaml); overrides the config file
    #[arg(short, long)]
    format: Option<String>,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Render settings file (.yaml, .yml or .toml)
    #[arg(short, long, env = "CFNKIT_CONFIG")]
    config: Option<PathBuf>,

    /// Token appended to substituted names
    #[arg(long)]
    suffix_token: Option<String>,
}

pub fn execute(args: RenderArgs) -> Result<()> {
    let sample = parse_sample(&args.sample)?;

    let mut config = match &args.config {
        Some(path) => RenderConfig::from_file(path)
            .with_context(|| format!("Failed to load render config {:?}", path))?,
        None => RenderConfig::default(),
    };
    if let Some(format) = &args.format {
        let format =
            Format::from_str(format).ok_or_else(|| anyhow::anyhow!("Unknown format: {}", format))?;
        config = config.with_format(format);
    } else if let Some(format) = args
        .output
        .as_deref()
        .and_then(|p| p.extension())
        .and_then(|e| e.to_str())
        .and_then(Format::from_str)
    {
        config = config.with_format(format);
    }
    if let Some(token) = args.suffix_token {
        config = config.with_suffix_token(token);
    }

    info!("Rendering sample document {} as {}", sample, config.format);
    let rendered = sample.build_with(config)?.render()?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write {:?}", path))?;
            println!("📄 Wrote {} to {}", sample, path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}
