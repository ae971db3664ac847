//! Voter-registration portal operator CLI
//!
//! Validates, resolves and fingerprints application records, manages the
//! local draft slot, and rehearses submissions against an in-process backend.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use voterreg_logging::{init_logging, LogConfig};
use voterreg_record::{ApplicationType, DiscriminantChange};

mod cli;

use cli::config::PortalConfig;

#[derive(Parser, Debug)]
#[command(name = "voterreg", about = "Voter-registration application tooling")]
struct Cli {
    /// Enable verbose logging (info/debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a record file (`-` for stdin)
    Validate {
        file: PathBuf,

        /// Evaluate date rules as of this day (YYYY-MM-DD) instead of today
        #[arg(long)]
        today: Option<NaiveDate>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Apply discriminant changes and print the resolved record
    Resolve {
        file: PathBuf,

        /// Change as <field>=<value>, e.g. applicationType=transfer or isPwd=false.
        /// An empty value unselects. Can be given multiple times.
        #[arg(short = 'c', long = "change", required = true)]
        changes: Vec<DiscriminantChange>,
    },

    /// Print the duplicate-detection fingerprint of a record
    Fingerprint {
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect or reset the saved draft
    Draft {
        #[command(subcommand)]
        action: DraftCommands,
    },

    /// Print a complete sample record of the given application type
    Sample {
        /// register, transfer, reactivation, transfer_with_reactivation,
        /// correction_of_entry or reinstatement
        application_type: ApplicationType,
    },

    /// Dry-run a submission against the in-process backend
    Rehearse {
        file: PathBuf,

        /// Evaluate date rules as of this day (YYYY-MM-DD) instead of today
        #[arg(long)]
        today: Option<NaiveDate>,

        /// Pretend the applicant already has an identity with a registration on file
        #[arg(long)]
        existing_identity: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show resolved paths and configuration
    Config(cli::config::ConfigArgs),
}

#[derive(Subcommand, Debug)]
enum DraftCommands {
    /// Show what the next form mount would do with the saved draft
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the saved draft record
    Show,
    /// Save a record file as the draft
    Save { file: PathBuf },
    /// Delete the draft and forget the last submission
    Reset,
}

fn command_wants_json(command: &Commands) -> bool {
    match command {
        Commands::Validate { json, .. }
        | Commands::Fingerprint { json, .. }
        | Commands::Rehearse { json, .. } => *json,
        Commands::Draft {
            action: DraftCommands::Status { json },
        } => *json,
        Commands::Config(args) => args.json,
        _ => false,
    }
}

fn run_command(command: Commands, config: &PortalConfig) -> Result<ExitCode> {
    match command {
        Commands::Validate { file, today, json } => {
            cli::validate::run(cli::validate::ValidateArgs {
                file,
                today,
                json,
                residency_minimum: config.submission.residency_minimum,
            })
        }
        Commands::Resolve { file, changes } => {
            cli::resolve::run(cli::resolve::ResolveArgs { file, changes })?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Fingerprint { file, json } => {
            cli::fingerprint::run(cli::fingerprint::FingerprintArgs { file, json })?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Draft { action } => {
            let action = match action {
                DraftCommands::Status { json } => cli::draft::DraftAction::Status { json },
                DraftCommands::Show => cli::draft::DraftAction::Show,
                DraftCommands::Save { file } => cli::draft::DraftAction::Save { file },
                DraftCommands::Reset => cli::draft::DraftAction::Reset,
            };
            cli::draft::run(action, &config.draft_dir())?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Sample { application_type } => {
            cli::sample::run(application_type)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Rehearse {
            file,
            today,
            existing_identity,
            json,
        } => cli::rehearse::run(
            cli::rehearse::RehearseArgs {
                file,
                today,
                existing_identity,
                json,
            },
            &config.submission,
        ),
        Commands::Config(args) => {
            cli::config::run(args, config)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let json_mode = command_wants_json(&cli.command);

    let config = match PortalConfig::load(&cli::config::config_path()) {
        Ok(config) => config,
        Err(err) => {
            if json_mode {
                cli::error::print_json_error(&err);
            } else {
                eprintln!("{:?}", err);
            }
            return ExitCode::from(1);
        }
    };

    if let Err(err) = init_logging(LogConfig {
        app_name: "voterreg",
        verbose: cli.verbose,
        filter: config.log_filter.as_deref(),
        log_dir: None,
    }) {
        eprintln!("Warning: failed to initialize logging: {:#}", err);
    }

    match run_command(cli.command, &config) {
        Ok(code) => code,
        Err(err) => {
            if json_mode {
                cli::error::print_json_error(&err);
            } else {
                eprintln!("{:?}", err);
            }
            ExitCode::from(1)
        }
    }
}
