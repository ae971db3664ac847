//! `voterreg rehearse` - dry-run a submission against the in-process backend.
//!
//! Runs the full orchestrator (validation, uploads, identity, application,
//! branch records) without touching any hosted service, and prints what
//! would have been written.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use voterreg_ids::ActorId;
use voterreg_record::{ApplicationBranch, ApplicationRecord};
use voterreg_submit::{
    Actor, MemoryBackend, MemoryUploader, Orchestrator, SubmissionConfig, SubmissionError,
};

use crate::cli::input::read_record;
use crate::cli::validate::EXIT_INVALID;

#[derive(Debug)]
pub struct RehearseArgs {
    pub file: PathBuf,
    pub today: Option<NaiveDate>,
    /// Pretend the actor already registered through an earlier application
    pub existing_identity: bool,
    pub json: bool,
}

pub fn run(args: RehearseArgs, config: &SubmissionConfig) -> Result<ExitCode> {
    let mut record = read_record(&args.file)?;

    // File contents are never serialized; give the dry run something to send.
    if let Some(ApplicationBranch::Register(registration)) = record.application.as_mut() {
        for attachment in [&mut registration.id_front_photo, &mut registration.id_selfie_url]
            .into_iter()
            .flatten()
        {
            if !attachment.is_present() {
                attachment.bytes = attachment.file_name.as_bytes().to_vec();
            }
        }
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(rehearse(args, record, config))
}

async fn rehearse(
    args: RehearseArgs,
    record: ApplicationRecord,
    config: &SubmissionConfig,
) -> Result<ExitCode> {
    let backend = Arc::new(MemoryBackend::new());
    let uploader = Arc::new(MemoryUploader::new());
    let actor = Actor::new(ActorId::new());
    if args.existing_identity {
        backend.seed_registration(&actor.id).await;
    }

    let mut orchestrator = Orchestrator::new(backend.clone(), uploader.clone(), config.clone());
    if let Some(today) = args.today {
        orchestrator = orchestrator.with_today(today);
    }

    match orchestrator.submit(&record, &actor).await {
        Ok(number) => {
            let branches = backend.branch_records(&number).await;
            let uploads: Vec<String> = uploader
                .files()
                .await
                .into_iter()
                .map(|(bucket, file)| format!("{}/{}", bucket, file.file_name))
                .collect();
            if args.json {
                let value = serde_json::json!({
                    "submitted": true,
                    "applicationNumber": number,
                    "uploads": uploads,
                    "branches": branches
                        .iter()
                        .map(|(kind, payload)| serde_json::json!({
                            "branch": kind,
                            "payload": payload,
                        }))
                        .collect::<Vec<_>>(),
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("SUBMITTED: {}", number);
                for upload in &uploads {
                    println!("  upload   {}", upload);
                }
                for (kind, _) in &branches {
                    println!("  write    {}", kind);
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(SubmissionError::ValidationFailed(report)) => {
            if args.json {
                let value = serde_json::json!({
                    "submitted": false,
                    "failures": report.failures(),
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("REJECTED: {}", report);
            }
            Ok(ExitCode::from(EXIT_INVALID))
        }
        Err(err) => Err(err.into()),
    }
}
