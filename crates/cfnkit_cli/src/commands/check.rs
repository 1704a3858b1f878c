//! Check command - Build and resolve a sample document.

use anyhow::Result;
use clap::Args;
use tracing::info;

use super::parse_sample;

#[derive(Args)]
pub struct CheckArgs {
    /// Name of the sample document
    sample: String,
}

pub fn execute(args: CheckArgs) -> Result<()> {
    let sample = parse_sample(&args.sample)?;
    info!("Checking sample document: {}", sample);

    let doc = sample.build()?;
    doc.resolve()?;

    println!(
        "✅ {} is valid ({} parameters, {} resources, {} outputs)",
        sample,
        doc.parameter_names().len(),
        doc.resource_names().len(),
        doc.output_names().len()
    );
    Ok(())
}
