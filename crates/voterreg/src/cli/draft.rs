//! `voterreg draft` - inspect, import, or reset the saved draft.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use voterreg_draft::{fingerprint, DraftError, DraftGuard, FileKeyValueStore};

use crate::cli::input::read_record;

#[derive(Debug)]
pub enum DraftAction {
    Status { json: bool },
    Show,
    Save { file: PathBuf },
    Reset,
}

fn open_guard(dir: &Path) -> Result<DraftGuard> {
    let store = FileKeyValueStore::open(dir)
        .with_context(|| format!("Failed to open draft directory {}", dir.display()))?;
    Ok(DraftGuard::new(Arc::new(store)))
}

pub fn run(action: DraftAction, draft_dir: &Path) -> Result<()> {
    let guard = open_guard(draft_dir)?;
    match action {
        DraftAction::Status { json } => status(&guard, draft_dir, json),
        DraftAction::Show => show(&guard),
        DraftAction::Save { file } => {
            let record = read_record(&file)?;
            let saved_at = guard.drafts().save(&record)?;
            info!(file = %file.display(), "imported draft");
            println!("Saved draft at {}", saved_at.to_rfc3339());
            Ok(())
        }
        DraftAction::Reset => {
            guard.reset()?;
            println!("Draft and last-submission fingerprint cleared");
            Ok(())
        }
    }
}

/// Reports what the next mount would do, without discarding anything.
fn status(guard: &DraftGuard, draft_dir: &Path, json: bool) -> Result<()> {
    let last_submitted = guard.fingerprints().last_submitted()?;
    let (state, draft_fp, saved_at, application_type, reason) = match guard.drafts().load() {
        Ok(None) => ("no_draft", None, None, None, None),
        Ok(Some(stored)) => {
            let fp = fingerprint(&stored.record);
            let state = if last_submitted.as_ref() == Some(&fp) {
                "stale"
            } else {
                "resumable"
            };
            (
                state,
                Some(fp),
                stored.saved_at,
                stored.record.application_type(),
                None,
            )
        }
        Err(DraftError::Corrupt(reason)) => ("corrupt", None, None, None, Some(reason)),
        Err(err) => return Err(err.into()),
    };

    if json {
        let value = serde_json::json!({
            "dir": draft_dir.to_string_lossy(),
            "state": state,
            "savedAt": saved_at,
            "applicationType": application_type,
            "fingerprint": draft_fp,
            "lastSubmitted": last_submitted,
            "reason": reason,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Draft directory: {}", draft_dir.display());
    println!("State:           {}", state);
    if let Some(saved_at) = saved_at {
        println!("Saved at:        {}", saved_at.to_rfc3339());
    }
    if let Some(kind) = application_type {
        println!("Application:     {}", kind);
    }
    if let Some(fp) = draft_fp {
        println!("Fingerprint:     {}", fp);
    }
    if let Some(last) = last_submitted {
        println!("Last submitted:  {}", last);
    }
    if let Some(reason) = reason {
        println!("Unreadable:      {}", reason);
    }
    Ok(())
}

fn show(guard: &DraftGuard) -> Result<()> {
    match guard.drafts().load()? {
        Some(stored) => println!("{}", serde_json::to_string_pretty(&stored.record)?),
        None => println!("No saved draft"),
    }
    Ok(())
}
