//! List command - Show the bundled sample documents.

use anyhow::Result;
use clap::Args;

use cfnkit_resources::Sample;

#[derive(Args)]
pub struct ListArgs {
    /// Print only the sample names
    #[arg(long)]
    names_only: bool,
}

pub fn execute(args: ListArgs) -> Result<()> {
    for sample in Sample::all() {
        if args.names_only {
            println!("{}", sample);
        } else {
            println!("{:<10} {}", sample.as_str(), sample.description());
        }
    }
    Ok(())
}
