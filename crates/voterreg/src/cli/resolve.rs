//! `voterreg resolve` - apply discriminant changes and print the result.

use anyhow::Result;
use std::path::PathBuf;
use voterreg_record::{resolve, DiscriminantChange};

use crate::cli::input::read_record;

#[derive(Debug)]
pub struct ResolveArgs {
    pub file: PathBuf,
    pub changes: Vec<DiscriminantChange>,
}

/// Changes are applied left to right; the resolved record goes to stdout.
pub fn run(args: ResolveArgs) -> Result<()> {
    let record = read_record(&args.file)?;
    let resolved = args
        .changes
        .iter()
        .fold(record, |record, change| resolve(&record, *change));
    println!("{}", serde_json::to_string_pretty(&resolved)?);
    Ok(())
}
