//! Reading records from files or stdin.

use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;
use voterreg_draft::{decode_draft, DraftError};
use voterreg_record::ApplicationRecord;

use crate::cli::error::HelpfulError;

/// Read a record from `path` (`-` for stdin). Draft documents are accepted too.
pub fn read_record(path: &Path) -> Result<ApplicationRecord> {
    let raw = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read record from stdin")?;
        buf
    } else {
        if !path.exists() {
            return Err(HelpfulError::file_not_found(path).into());
        }
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    };

    match decode_draft(&raw) {
        Ok(stored) => Ok(stored.record),
        Err(DraftError::Corrupt(details)) => Err(HelpfulError::invalid_record(path, &details).into()),
        Err(err) => Err(err.into()),
    }
}
