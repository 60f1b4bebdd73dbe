//! # Asset Status
//!
//! The slice of the external asset registry the lifecycle touches: the
//! operational status a completed work order may cascade onto its asset.

use serde::{Deserialize, Serialize};

/// Operational status of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetStatus {
    /// In service.
    Operational,
    /// Being worked on.
    UnderMaintenance,
    /// Out of service, awaiting repair.
    Down,
    /// Permanently withdrawn.
    Decommissioned,
}

impl AssetStatus {
    /// Canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Operational => "OPERATIONAL",
            Self::UnderMaintenance => "UNDER_MAINTENANCE",
            Self::Down => "DOWN",
            Self::Decommissioned => "DECOMMISSIONED",
        }
    }

    /// Parse a canonical name (case-insensitive). `None` for anything else.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "OPERATIONAL" => Some(Self::Operational),
            "UNDER_MAINTENANCE" => Some(Self::UnderMaintenance),
            "DOWN" => Some(Self::Down),
            "DECOMMISSIONED" => Some(Self::Decommissioned),
            _ => None,
        }
    }
}

impl std::fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
