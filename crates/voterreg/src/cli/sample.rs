//! `voterreg sample` - print a complete record to start from.

use anyhow::Result;
use voterreg_record::sample::sample_record;
use voterreg_record::ApplicationType;

pub fn run(application_type: ApplicationType) -> Result<()> {
    let record = sample_record(application_type);
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
