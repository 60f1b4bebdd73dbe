//! # Tenant Guard
//!
//! Resolves a [`CallerIdentity`] to a [`TenantContext`] and applies the
//! access rule before any mutation.
//!
//! ```text
//! allowed = super_admin OR entity.tenant_id == caller.tenant_id
//! ```
//!
//! Reads additionally admit unowned entities. Every denial is logged at
//! `warn` and surfaced as [`ServiceError::Unauthorized`]; the message names
//! only what the caller asked for, never the owning tenant.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

use serde::{Deserialize, Serialize};

use cmms_core::{CallerIdentity, TenantContext, TenantId, UserId};

use crate::error::ServiceError;

/// Resolves who a caller is allowed to act as.
pub trait TenantGuard: Send + Sync {
    /// The caller's context, or `Unauthorized` if the caller is unknown.
    fn resolve(&self, caller: &CallerIdentity) -> Result<TenantContext, ServiceError>;
}

/// A static directory of super-admins and tenant members.
///
/// A user listed as super-admin resolves to [`TenantContext::SuperAdmin`]
/// even if also listed as a member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryTenantGuard {
    #[serde(default)]
    pub super_admins: BTreeSet<UserId>,
    #[serde(default)]
    pub members: BTreeMap<UserId, TenantId>,
}

impl DirectoryTenantGuard {
    /// An empty directory; every caller is refused.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a super-admin.
    pub fn with_super_admin(mut self, user: UserId) -> Self {
        self.super_admins.insert(user);
        self
    }

    /// Add a member of `tenant_id`.
    pub fn with_member(mut self, user: UserId, tenant_id: TenantId) -> Self {
        self.members.insert(user, tenant_id);
        self
    }
}

impl TenantGuard for DirectoryTenantGuard {
    fn resolve(&self, caller: &CallerIdentity) -> Result<TenantContext, ServiceError> {
        if self.super_admins.contains(&caller.user) {
            return Ok(TenantContext::SuperAdmin);
        }
        match self.members.get(&caller.user) {
            Some(tenant_id) => Ok(TenantContext::scoped(*tenant_id)),
            None => {
                tracing::warn!(user = %caller.user, "caller not in tenant directory");
                Err(ServiceError::Unauthorized(format!(
                    "unknown caller {}",
                    caller.user
                )))
            }
        }
    }
}

/// The tenant a new record for an asset owned by `asset_owner` is stamped
/// with when `ctx` creates it and asked for `requested`.
///
/// A scoped caller gets its own tenant, and naming any other tenant is
/// `Unauthorized`. A super-admin gets what it asked for, or the asset's
/// tenant when it asked for nothing. A record on an owned asset always
/// belongs to the asset's tenant; any other owner is `Unauthorized`.
pub fn owning_tenant(
    ctx: &TenantContext,
    requested: Option<TenantId>,
    asset_owner: Option<TenantId>,
) -> Result<Option<TenantId>, ServiceError> {
    let owner = match (ctx, requested) {
        (TenantContext::SuperAdmin, t) => t.or(asset_owner),
        (TenantContext::Scoped { tenant_id }, None) => Some(*tenant_id),
        (TenantContext::Scoped { tenant_id }, Some(t)) if t == *tenant_id => Some(t),
        (TenantContext::Scoped { .. }, Some(_)) => {
            return Err(ServiceError::Unauthorized(
                "cannot create records for another tenant".to_string(),
            ))
        }
    };
    match asset_owner {
        Some(a) if owner != Some(a) => Err(ServiceError::Unauthorized(
            "record tenant must match the asset's tenant".to_string(),
        )),
        _ => Ok(owner),
    }
}

/// Refuse a write unless `ctx` may write an entity owned by `owner`.
pub fn ensure_write(
    ctx: &TenantContext,
    caller: &CallerIdentity,
    kind: &'static str,
    id: impl Display,
    owner: Option<TenantId>,
) -> Result<(), ServiceError> {
    if ctx.can_write(owner) {
        return Ok(());
    }
    Err(deny(ctx, caller, "write", kind, id))
}

/// Refuse a read unless `ctx` may see an entity owned by `owner`.
pub fn ensure_read(
    ctx: &TenantContext,
    caller: &CallerIdentity,
    kind: &'static str,
    id: impl Display,
    owner: Option<TenantId>,
) -> Result<(), ServiceError> {
    if ctx.can_read(owner) {
        return Ok(());
    }
    Err(deny(ctx, caller, "read", kind, id))
}

fn deny(
    ctx: &TenantContext,
    caller: &CallerIdentity,
    access: &'static str,
    kind: &'static str,
    id: impl Display,
) -> ServiceError {
    let id = id.to_string();
    tracing::warn!(user = %caller.user, scope = %ctx, access, kind, id = %id, "tenant access denied");
    ServiceError::Unauthorized(format!("{access} access to {kind} {id} denied"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> UserId {
        UserId::new(name).unwrap()
    }

    fn tenant(n: i64) -> TenantId {
        TenantId::new(n).unwrap()
    }

    fn guard() -> DirectoryTenantGuard {
        DirectoryTenantGuard::new()
            .with_super_admin(user("root"))
            .with_member(user("alice"), tenant(1))
            .with_member(user("bob"), tenant(2))
            .with_member(user("root"), tenant(1))
    }

    #[test]
    fn test_resolve() {
        let g = guard();
        assert_eq!(
            g.resolve(&CallerIdentity::new(user("root"))).unwrap(),
            TenantContext::SuperAdmin
        );
        assert_eq!(
            g.resolve(&CallerIdentity::new(user("alice"))).unwrap(),
            TenantContext::scoped(tenant(1))
        );
        assert!(matches!(
            g.resolve(&CallerIdentity::new(user("mallory"))),
            Err(ServiceError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_cross_tenant_write_is_denied_without_leaking_owner() {
        let alice = CallerIdentity::new(user("alice"));
        let ctx = TenantContext::scoped(tenant(1));
        let err = ensure_write(&ctx, &alice, "work order", "wo:x", Some(tenant(2))).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("work order wo:x"));
        assert!(!msg.contains("tenant:2"));
    }

    #[test]
    fn test_unowned_entity_read_but_not_written() {
        let alice = CallerIdentity::new(user("alice"));
        let ctx = TenantContext::scoped(tenant(1));
        assert!(ensure_read(&ctx, &alice, "schedule", "s", None).is_ok());
        assert!(ensure_write(&ctx, &alice, "schedule", "s", None).is_err());
    }

    #[test]
    fn test_owning_tenant() {
        let scoped = TenantContext::scoped(tenant(1));
        assert_eq!(owning_tenant(&scoped, None, None).unwrap(), Some(tenant(1)));
        assert_eq!(
            owning_tenant(&scoped, Some(tenant(1)), Some(tenant(1))).unwrap(),
            Some(tenant(1))
        );
        assert!(owning_tenant(&scoped, Some(tenant(2)), None).is_err());
        assert_eq!(
            owning_tenant(&TenantContext::SuperAdmin, None, None).unwrap(),
            None
        );
        assert_eq!(
            owning_tenant(&TenantContext::SuperAdmin, Some(tenant(2)), None).unwrap(),
            Some(tenant(2))
        );
    }

    #[test]
    fn test_owning_tenant_follows_the_asset() {
        let root = TenantContext::SuperAdmin;
        assert_eq!(
            owning_tenant(&root, None, Some(tenant(2))).unwrap(),
            Some(tenant(2))
        );
        assert!(matches!(
            owning_tenant(&root, Some(tenant(1)), Some(tenant(2))),
            Err(ServiceError::Unauthorized(_))
        ));
        let scoped = TenantContext::scoped(tenant(1));
        assert!(owning_tenant(&scoped, None, Some(tenant(2))).is_err());
    }

    #[test]
    fn test_directory_from_yaml_shape() {
        let json = serde_json::json!({
            "super_admins": ["root"],
            "members": {"alice": 1, "bob": 2}
        });
        let g: DirectoryTenantGuard = serde_json::from_value(json).unwrap();
        assert_eq!(
            g.resolve(&CallerIdentity::new(user("bob"))).unwrap(),
            TenantContext::scoped(tenant(2))
        );
    }
}
