//! CLI command definitions.
//!
//! Each subcommand works on one of the sample documents bundled with
//! `cfnkit_resources`.

use anyhow::Result;
use clap::{Parser, Subcommand};

use cfnkit_resources::Sample;

pub mod check;
pub mod list;
pub mod render;

/// cfnkit - Fluent, validated CloudFormation document builders
#[derive(Parser)]
#[command(name = "cfnkit")]
#[command(version, about = "cfnkit - Fluent, validated CloudFormation document builders")]
#[command(long_about = r#"
cfnkit assembles CloudFormation documents from validated resource builders
and renders them as JSON or YAML.

COMMANDS:
  list    → List the bundled sample documents
  render  → Render a sample document
  check   → Build and resolve a sample document without printing it

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Validation failure
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the bundled sample documents
    List(list::ListArgs),

    /// Render a sample document
    Render(render::RenderArgs),

    /// Check that a sample document builds and resolves
    Check(check::CheckArgs),
}

/// Look up a sample by name.
pub(crate) fn parse_sample(name: &str) -> Result<Sample> {
    Sample::from_str(name).ok_or_else(|| {
        let known: Vec<_> = Sample::all().iter().map(|s| s.as_str()).collect();
        anyhow::anyhow!("Unknown sample: {} (expected one of: {})", name, known.join(", "))
    })
}
