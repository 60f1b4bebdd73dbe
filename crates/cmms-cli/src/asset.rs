//! # Asset Subcommand
//!
//! Minimal registry upkeep so work orders and schedules have something to
//! point at. Registering assets is an administrative action: only a
//! super-admin, or a member registering into their own tenant, may add one.

use anyhow::Result;
use clap::{Args, Subcommand};

use cmms_core::TenantId;
use cmms_service::{owning_tenant, AssetRecord, TenantGuard};

use crate::context::Context;

/// Arguments for `cmms asset`.
#[derive(Args, Debug)]
pub struct AssetArgs {
    #[command(subcommand)]
    pub command: AssetCommand,
}

/// Asset subcommands.
#[derive(Subcommand, Debug)]
pub enum AssetCommand {
    /// Register an asset.
    Add {
        #[arg(long)]
        name: String,
        /// Owning tenant. Defaults to the caller's tenant.
        #[arg(long)]
        tenant: Option<i64>,
        /// Criticality label (Critical, High, Medium, Low).
        #[arg(long)]
        criticality: Option<String>,
    },
    /// List assets visible to the caller.
    List,
}

/// Execute `cmms asset`.
pub fn run_asset(args: &AssetArgs, ctx: &Context) -> Result<u8> {
    let caller = ctx.caller()?;
    let scope = ctx.guard.resolve(&caller)?;
    match &args.command {
        AssetCommand::Add {
            name,
            tenant,
            criticality,
        } => {
            let requested = tenant.map(TenantId::new).transpose()?;
            let owner = owning_tenant(&scope, requested, None)?;
            let mut asset = AssetRecord::new(name.clone(), owner);
            asset.criticality = criticality.clone();
            let id = asset.id;
            ctx.store.register_asset(asset);
            ctx.save()?;
            tracing::info!(asset = %id, "asset registered");
            println!("OK: registered {id} ({name})");
        }
        AssetCommand::List => {
            let visible: Vec<_> = ctx
                .store
                .assets()
                .into_iter()
                .filter(|a| scope.can_read(a.tenant_id))
                .collect();
            if visible.is_empty() {
                println!("No assets.");
            }
            for a in visible {
                let owner = a.tenant_id.map_or_else(|| "-".to_string(), |t| t.to_string());
                println!("{}  {}  {}  {}", a.id, a.status, owner, a.name);
            }
        }
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::testing::context;

    #[test]
    fn test_member_registers_into_own_tenant_only() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path(), "alice", "2025-01-01");
        let add = |tenant| AssetArgs {
            command: AssetCommand::Add {
                name: "Chiller".to_string(),
                tenant,
                criticality: Some("High".to_string()),
            },
        };
        assert_eq!(run_asset(&add(None), &ctx).unwrap(), 0);
        assert!(run_asset(&add(Some(2)), &ctx).is_err());

        let assets = ctx.store.assets();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].tenant_id, Some(TenantId::new(1).unwrap()));
        assert!(dir.path().join("store.json").exists());
    }
}
