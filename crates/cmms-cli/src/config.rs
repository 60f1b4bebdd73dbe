//! # CLI Configuration File
//!
//! YAML, passed with `--config`. Holds the caller directory the tenant
//! guard resolves against and optional scheduler overrides:
//!
//! ```yaml
//! super_admins: [root]
//! members:
//!   alice: 1
//!   bob: 2
//! scheduler:
//!   max_occurrences: 24
//!   poll_interval_secs: 60
//! ```
//!
//! Scheduler precedence is defaults, then environment, then this file,
//! then command-line flags.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use cmms_core::{TenantId, UserId};
use cmms_service::{DirectoryTenantGuard, SchedulerConfig};

/// Optional scheduler settings from the file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerOverrides {
    #[serde(default)]
    pub max_occurrences: Option<u32>,
    #[serde(default)]
    pub poll_interval_secs: Option<u64>,
}

impl SchedulerOverrides {
    /// `base` with every present override applied.
    pub fn apply(&self, base: SchedulerConfig) -> SchedulerConfig {
        SchedulerConfig {
            max_occurrences: self.max_occurrences.unwrap_or(base.max_occurrences),
            poll_interval_secs: self.poll_interval_secs.unwrap_or(base.poll_interval_secs),
        }
    }
}

/// Parsed `--config` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    #[serde(default)]
    pub super_admins: BTreeSet<UserId>,
    #[serde(default)]
    pub members: BTreeMap<UserId, TenantId>,
    #[serde(default)]
    pub scheduler: SchedulerOverrides,
}

impl CliConfig {
    /// Read and parse a config file. No path means an empty directory.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            tracing::debug!("no config file; tenant directory is empty");
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        tracing::debug!(
            path = %path.display(),
            super_admins = config.super_admins.len(),
            members = config.members.len(),
            "config loaded"
        );
        Ok(config)
    }

    /// The tenant guard for this directory.
    pub fn tenant_guard(&self) -> DirectoryTenantGuard {
        DirectoryTenantGuard {
            super_admins: self.super_admins.clone(),
            members: self.members.clone(),
        }
    }

    /// Environment-derived scheduler config with the file's overrides.
    pub fn scheduler_config(&self) -> SchedulerConfig {
        self.scheduler.apply(SchedulerConfig::from_env())
    }
}
