//! `voterreg fingerprint` - duplicate-detection key of a record.

use anyhow::Result;
use std::path::PathBuf;
use voterreg_draft::fingerprint;

use crate::cli::input::read_record;

#[derive(Debug)]
pub struct FingerprintArgs {
    pub file: PathBuf,
    pub json: bool,
}

pub fn run(args: FingerprintArgs) -> Result<()> {
    let record = read_record(&args.file)?;
    let fp = fingerprint(&record);
    if args.json {
        let value = serde_json::json!({
            "fingerprint": fp,
            "applicationType": record.application_type(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{}", fp);
    }
    Ok(())
}
