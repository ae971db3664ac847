//! `voterreg validate` - run every rule against a record file.

use anyhow::Result;
use chrono::NaiveDate;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use voterreg_record::{ResidencyMinimum, Validator};

use crate::cli::input::read_record;

/// Exit code when the record fails validation.
pub const EXIT_INVALID: u8 = 2;

#[derive(Debug)]
pub struct ValidateArgs {
    pub file: PathBuf,
    pub today: Option<NaiveDate>,
    pub json: bool,
    /// Residency policy from the submission config
    pub residency_minimum: Option<ResidencyMinimum>,
}

pub fn run(args: ValidateArgs) -> Result<ExitCode> {
    let record = read_record(&args.file)?;
    let today = args
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let report = Validator::new(today)
        .with_residency_minimum(args.residency_minimum)
        .validate(&record);
    info!(
        file = %args.file.display(),
        failures = report.len(),
        "validated record"
    );

    if args.json {
        let value = serde_json::json!({
            "valid": report.is_valid(),
            "applicationType": record.application_type(),
            "today": today,
            "failures": report.failures(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else if report.is_valid() {
        println!("VALID: {}", args.file.display());
    } else {
        println!("INVALID: {} ({} field(s))", args.file.display(), report.len());
        println!();
        for failure in report.failures() {
            println!("  {:<28} {}", failure.field.as_str(), failure.message);
        }
    }

    Ok(if report.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_INVALID)
    })
}
