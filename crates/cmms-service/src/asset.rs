//! # Asset Registry
//!
//! The narrow slice of the asset registry the core needs: existence and
//! ownership checks when a work order or schedule is created, and the
//! status cascade on completion.

use serde::{Deserialize, Serialize};

use cmms_core::{AssetId, TenantId};
use cmms_state::AssetStatus;

use crate::error::StoreError;

/// What the core knows about an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub id: AssetId,
    pub name: String,
    pub tenant_id: Option<TenantId>,
    pub status: AssetStatus,
    /// Criticality label (`Critical`, `High`, `Medium`, `Low`).
    #[serde(default)]
    pub criticality: Option<String>,
}

impl AssetRecord {
    /// An operational asset.
    pub fn new(name: impl Into<String>, tenant_id: Option<TenantId>) -> Self {
        Self {
            id: AssetId::new(),
            name: name.into(),
            tenant_id,
            status: AssetStatus::Operational,
            criticality: None,
        }
    }
}

/// Asset lookups and the completion cascade.
pub trait AssetRegistry: Send + Sync {
    /// Load one asset.
    fn get_asset(&self, id: AssetId) -> Result<AssetRecord, StoreError>;

    /// Overwrite the asset's status, returning the updated record.
    fn set_status(&self, id: AssetId, status: AssetStatus) -> Result<AssetRecord, StoreError>;
}
