//! # Tenant Context
//!
//! The resolved authorization scope of a caller. A context is either
//! unrestricted (super-admin) or scoped to exactly one tenant; there is no
//! third shape, so "scoped but without a tenant" cannot be represented.
//!
//! Resolution from a caller identity happens in the service layer's
//! `TenantGuard`; this module only defines the result and the access rule.

use serde::{Deserialize, Serialize};

use crate::identity::{TenantId, UserId};

/// Who is calling. Produced by the authentication boundary and handed to
/// the tenant guard for resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallerIdentity {
    /// The authenticated user.
    pub user: UserId,
}

impl CallerIdentity {
    /// Identity for `user`.
    pub fn new(user: UserId) -> Self {
        Self { user }
    }
}

/// Authorization scope of the current caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum TenantContext {
    /// Exempt from all tenant filters.
    SuperAdmin,
    /// Restricted to one tenant.
    Scoped {
        /// The caller's tenant.
        tenant_id: TenantId,
    },
}

impl TenantContext {
    /// A context scoped to `tenant_id`.
    pub fn scoped(tenant_id: TenantId) -> Self {
        Self::Scoped { tenant_id }
    }

    /// Whether the caller bypasses tenant filtering.
    pub fn is_super_admin(&self) -> bool {
        matches!(self, Self::SuperAdmin)
    }

    /// The caller's tenant, or `None` for a super-admin.
    pub fn tenant_id(&self) -> Option<TenantId> {
        match self {
            Self::SuperAdmin => None,
            Self::Scoped { tenant_id } => Some(*tenant_id),
        }
    }

    /// Whether a write to an entity owned by `owner` is permitted.
    ///
    /// `allowed = super_admin OR owner == caller_tenant`. An unowned entity
    /// (`owner == None`) is not writable by a scoped caller: the creating
    /// context is expected to stamp a tenant, and the core never adopts
    /// stray records silently.
    pub fn can_write(&self, owner: Option<TenantId>) -> bool {
        match self {
            Self::SuperAdmin => true,
            Self::Scoped { tenant_id } => owner == Some(*tenant_id),
        }
    }

    /// Whether an entity owned by `owner` is visible on read and list paths.
    ///
    /// Same as [`can_write`](Self::can_write) except that unowned entities
    /// are visible to every scoped caller.
    pub fn can_read(&self, owner: Option<TenantId>) -> bool {
        match self {
            Self::SuperAdmin => true,
            Self::Scoped { tenant_id } => owner.map_or(true, |o| o == *tenant_id),
        }
    }
}

impl std::fmt::Display for TenantContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SuperAdmin => f.write_str("super-admin"),
            Self::Scoped { tenant_id } => write!(f, "{tenant_id}"),
        }
    }
}
