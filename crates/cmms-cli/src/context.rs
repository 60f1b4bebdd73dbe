//! # Command Context
//!
//! Everything a subcommand needs: the store loaded from its JSON snapshot,
//! the tenant guard from the config file, the clock, scheduler settings and
//! the acting user. Commands that mutate call [`Context::save`] once at the
//! end; a failed command leaves the snapshot file untouched.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context as _, Result};

use cmms_core::{CallerIdentity, Clock, ManualClock, SystemClock, Timestamp, UserId};
use cmms_service::{
    DirectoryTenantGuard, InMemoryStore, RecurringScheduler, SchedulerConfig, StoreSnapshot,
    WorkOrderService,
};

/// Work-order service as wired by the CLI.
pub type CliWorkOrders =
    WorkOrderService<InMemoryStore, InMemoryStore, DirectoryTenantGuard, Arc<dyn Clock>>;

/// Scheduler as wired by the CLI.
pub type CliScheduler =
    RecurringScheduler<InMemoryStore, InMemoryStore, DirectoryTenantGuard, Arc<dyn Clock>>;

/// Load a store snapshot. A missing file is an empty store.
pub fn load_store(path: &Path) -> Result<InMemoryStore> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "store file absent, starting empty");
        return Ok(InMemoryStore::new());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read store {}", path.display()))?;
    let snapshot: StoreSnapshot = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse store {}", path.display()))?;
    Ok(InMemoryStore::from_snapshot(snapshot))
}

/// Write a store snapshot via a sibling temp file and rename.
pub fn save_store(path: &Path, store: &InMemoryStore) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(&store.snapshot())?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).with_context(|| format!("failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("failed to replace {}", path.display()))?;
    Ok(())
}

/// Resolved runtime context for one command.
pub struct Context {
    pub store_path: PathBuf,
    pub store: InMemoryStore,
    pub guard: DirectoryTenantGuard,
    pub clock: Arc<dyn Clock>,
    pub scheduler_config: SchedulerConfig,
    user: Option<String>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("store_path", &self.store_path)
            .field("scheduler_config", &self.scheduler_config)
            .field("user", &self.user)
            .finish()
    }
}

impl Context {
    /// Load the store and wire the collaborators. `now` pins the clock.
    pub fn open(
        store_path: PathBuf,
        guard: DirectoryTenantGuard,
        scheduler_config: SchedulerConfig,
        user: Option<String>,
        now: Option<Timestamp>,
    ) -> Result<Self> {
        let store = load_store(&store_path)?;
        let clock: Arc<dyn Clock> = match now {
            Some(at) => Arc::new(ManualClock::new(at)),
            None => Arc::new(SystemClock),
        };
        Ok(Self {
            store_path,
            store,
            guard,
            clock,
            scheduler_config,
            user,
        })
    }

    /// The acting user, required by every tenant-checked command.
    pub fn caller(&self) -> Result<CallerIdentity> {
        let Some(name) = self.user.as_deref() else {
            bail!("this command needs an acting user: pass --as <user>");
        };
        Ok(CallerIdentity::new(UserId::new(name)?))
    }

    pub fn work_orders(&self) -> CliWorkOrders {
        WorkOrderService::new(
            self.store.clone(),
            self.store.clone(),
            self.guard.clone(),
            Arc::clone(&self.clock),
        )
    }

    pub fn scheduler(&self) -> CliScheduler {
        RecurringScheduler::new(
            self.store.clone(),
            self.store.clone(),
            self.guard.clone(),
            Arc::clone(&self.clock),
            self.scheduler_config,
        )
    }

    /// Persist the store back to its snapshot file.
    pub fn save(&self) -> Result<()> {
        save_store(&self.store_path, &self.store)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use cmms_core::TenantId;

    /// A context over a temp store with `root` (super-admin), `alice`
    /// (tenant 1) and `bob` (tenant 2), clock pinned at `now`.
    pub fn context(dir: &Path, user: &str, now: &str) -> Context {
        let guard = DirectoryTenantGuard::new()
            .with_super_admin(UserId::new("root").unwrap())
            .with_member(UserId::new("alice").unwrap(), TenantId::new(1).unwrap())
            .with_member(UserId::new("bob").unwrap(), TenantId::new(2).unwrap());
        Context::open(
            dir.join("store.json"),
            guard,
            SchedulerConfig::default(),
            Some(user.to_string()),
            Some(Timestamp::parse_date_or_timestamp(now).unwrap()),
        )
        .unwrap()
    }
}
