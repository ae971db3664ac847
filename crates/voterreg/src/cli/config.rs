//! Portal configuration
//!
//! Everything lives under `~/.voterreg/` (or `$VOTERREG_HOME`). An optional
//! `config.toml` there overrides the defaults:
//!
//! ```toml
//! draft_dir = "/var/lib/voterreg/drafts"
//! log_filter = "voterreg=debug"
//!
//! [submission]
//! id_front_bucket = "id-front-photos"
//! id_selfie_bucket = "id-selfies"
//!
//! # Optional; without it any declared residence is accepted
//! [submission.residency_minimum]
//! municipality_months = 6
//! country_months = 12
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use voterreg_submit::SubmissionConfig;

pub use voterreg_logging::{logs_dir, voterreg_home};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Directory holding the draft slot; defaults to `<home>/drafts`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft_dir: Option<PathBuf>,

    /// Tracing filter directive; `RUST_LOG` still wins when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,

    pub submission: SubmissionConfig,
}

impl PortalConfig {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn draft_dir(&self) -> PathBuf {
        self.draft_dir
            .clone()
            .unwrap_or_else(|| voterreg_home().join("drafts"))
    }
}

/// Get config file path: ~/.voterreg/config.toml
pub fn config_path() -> PathBuf {
    voterreg_home().join("config.toml")
}

/// Arguments for the config command
#[derive(Debug, clap::Args)]
pub struct ConfigArgs {
    /// Show resolved paths in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Run the config command - shows resolved paths and settings
pub fn run(args: ConfigArgs, config: &PortalConfig) -> Result<()> {
    let home = voterreg_home();
    let config_file = config_path();
    let drafts = config.draft_dir();
    let logs = logs_dir();

    if args.json {
        let value = serde_json::json!({
            "home": home.to_string_lossy(),
            "config_file": {
                "path": config_file.to_string_lossy(),
                "exists": config_file.exists(),
            },
            "drafts": {
                "path": drafts.to_string_lossy(),
                "exists": drafts.exists(),
            },
            "logs": {
                "path": logs.to_string_lossy(),
                "exists": logs.exists(),
            },
            "log_filter": config.log_filter,
            "submission": config.submission,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("VOTERREG CONFIGURATION");
        println!("======================");
        println!();
        println!("Home:        {}", home.display());
        println!(
            "Config:      {}{}",
            config_file.display(),
            if config_file.exists() { "" } else { " (not present, using defaults)" }
        );
        println!("Drafts:      {}", drafts.display());
        println!("Logs:        {}", logs.display());
        if let Some(filter) = &config.log_filter {
            println!("Log filter:  {}", filter);
        }
        println!();
        println!("Upload buckets:");
        println!("  ID front:  {}", config.submission.id_front_bucket);
        println!("  ID selfie: {}", config.submission.id_selfie_bucket);
        match config.submission.residency_minimum {
            Some(minimum) => println!(
                "Residency minimum: {} month(s) local, {} month(s) in country",
                minimum.municipality_months, minimum.country_months
            ),
            None => println!("Residency minimum: none"),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = PortalConfig::load(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, PortalConfig::default());
        assert_eq!(config.submission.id_selfie_bucket, "id-selfies");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "draft_dir = \"/tmp/drafts\"\n\n[submission]\nid_front_bucket = \"fronts\"\n",
        )
        .unwrap();

        let config = PortalConfig::load(&path).unwrap();
        assert_eq!(config.draft_dir(), PathBuf::from("/tmp/drafts"));
        assert_eq!(config.submission.id_front_bucket, "fronts");
        assert_eq!(config.submission.id_selfie_bucket, "id-selfies");
        assert!(config.log_filter.is_none());
        assert!(config.submission.residency_minimum.is_none());
    }

    #[test]
    fn test_residency_minimum_table() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[submission.residency_minimum]\nmunicipality_months = 3\n",
        )
        .unwrap();

        let config = PortalConfig::load(&path).unwrap();
        let minimum = config.submission.residency_minimum.unwrap();
        assert_eq!(minimum.municipality_months, 3);
        assert_eq!(minimum.country_months, 12);
        assert_eq!(config.submission.id_front_bucket, "id-front-photos");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "draft_dir = [").unwrap();
        let err = PortalConfig::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse"));
    }
}
