//! Configuration management for rootfs-verify.
//!
//! Loads configuration from a TOML file; command line flags override it.
//! Every section and field is optional and falls back to its default.

use crate::scheduler::{default_workers, SchedulerOptions, DEFAULT_BATCH_SIZE};
use crate::utils::{Result, VerifyError};
use crate::verify::ValidateOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub manifest: ManifestConfig,
    pub report: ReportConfig,
    pub performance: PerformanceConfig,
    pub verify: VerifyConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestConfig {
    /// Manifest to verify against
    #[serde(default = "default_manifest_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Where discrepancies are written when any are found
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceConfig {
    /// Manifest lines per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Batches validated in parallel
    #[serde(default = "default_workers")]
    pub workers: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyConfig {
    /// Mount point of the tree; manifest paths are resolved below it
    #[serde(default)]
    pub root: Option<PathBuf>,

    /// Compare symlink targets against the manifest's `link=`
    #[serde(default = "default_check_link_targets")]
    pub check_link_targets: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default values
fn default_manifest_path() -> PathBuf {
    PathBuf::from("/conf/rootfs.mtree")
}

fn default_log_path() -> PathBuf {
    PathBuf::from("/var/log/rootfs-verify.log")
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_check_link_targets() -> bool {
    true
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            path: default_manifest_path(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            log_path: default_log_path(),
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            workers: default_workers(),
        }
    }
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            root: None,
            check_link_targets: default_check_link_targets(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Reject values the scheduler cannot run with
    pub fn validate(&self) -> Result<()> {
        self.scheduler_options().map(|_| ())
    }

    pub fn scheduler_options(&self) -> Result<SchedulerOptions> {
        SchedulerOptions::new(self.performance.batch_size, self.performance.workers)
    }

    pub fn validate_options(&self) -> ValidateOptions {
        ValidateOptions {
            root: self.verify.root.clone(),
            check_link_targets: self.verify.check_link_targets,
        }
    }

    /// Check that configured paths are usable before any work starts
    pub fn check_paths(&self) -> Result<()> {
        if let Some(root) = &self.verify.root {
            if !root.is_dir() {
                return Err(VerifyError::Config(format!(
                    "verification root {} is not a directory",
                    root.display()
                )));
            }
        }
        Ok(())
    }
}
