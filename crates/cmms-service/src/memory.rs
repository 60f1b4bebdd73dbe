//! # In-Memory Store
//!
//! A thread-safe implementation of every store contract, used by the CLI
//! (through a JSON snapshot file) and by tests.
//!
//! All locks are `parking_lot` and are never held across an `.await`.
//! Each contract operation takes exactly one table's write lock, so the
//! version check and the write it guards cannot interleave with another
//! writer. Sequence allocation takes the counter lock before the
//! work-order read lock; nothing takes them in the other order.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use cmms_core::{AssetId, ScheduleId, TenantContext, Timestamp, WorkOrderId};
use cmms_schedule::MaintenanceSchedule;
use cmms_state::{AssetStatus, WorkOrder};

use crate::asset::{AssetRecord, AssetRegistry};
use crate::error::StoreError;
use crate::store::{ScheduleStore, WorkOrderFilter, WorkOrderStore};

// ─── Table ───────────────────────────────────────────────────────────

/// Cloneable keyed table behind a non-poisoning `RwLock`.
#[derive(Debug)]
pub struct Table<K, V> {
    data: Arc<RwLock<HashMap<K, V>>>,
}

impl<K, V> Clone for Table<K, V> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<K: Eq + Hash, V: Clone> Table<K, V> {
    /// An empty table.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Retrieve a record.
    pub fn get(&self, key: &K) -> Option<V> {
        self.data.read().get(key).cloned()
    }

    /// Insert a record, returning the previous value.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.data.write().insert(key, value)
    }

    /// Every record, in no particular order.
    pub fn list(&self) -> Vec<V> {
        self.data.read().values().cloned().collect()
    }

    /// Records passing `keep`.
    pub fn filter(&self, keep: impl Fn(&V) -> bool) -> Vec<V> {
        self.data
            .read()
            .values()
            .filter(|v| keep(v))
            .cloned()
            .collect()
    }

    /// Atomically read-validate-update one record. `None` if absent.
    pub fn try_update<R, E>(
        &self,
        key: &K,
        f: impl FnOnce(&mut V) -> Result<R, E>,
    ) -> Option<Result<R, E>> {
        self.data.write().get_mut(key).map(f)
    }

    /// Run `f` with the whole table under the write lock.
    pub fn with_write<R>(&self, f: impl FnOnce(&mut HashMap<K, V>) -> R) -> R {
        f(&mut self.data.write())
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Eq + Hash, V: Clone> Default for Table<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Snapshot ────────────────────────────────────────────────────────

/// The last sequence handed out for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceCounter {
    pub year: i32,
    pub month: u32,
    pub last: u32,
}

/// Serializable contents of an [`InMemoryStore`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub assets: Vec<AssetRecord>,
    #[serde(default)]
    pub work_orders: Vec<WorkOrder>,
    #[serde(default)]
    pub schedules: Vec<MaintenanceSchedule>,
    #[serde(default)]
    pub sequences: Vec<SequenceCounter>,
}

// ─── Store ───────────────────────────────────────────────────────────

/// In-memory work orders, schedules and assets. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    assets: Table<AssetId, AssetRecord>,
    work_orders: Table<WorkOrderId, WorkOrder>,
    schedules: Table<ScheduleId, MaintenanceSchedule>,
    sequences: Arc<Mutex<HashMap<(i32, u32), u32>>>,
}

impl InMemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from a snapshot. Records keep their versions.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let store = Self::new();
        for asset in snapshot.assets {
            store.assets.insert(asset.id, asset);
        }
        for order in snapshot.work_orders {
            store.work_orders.insert(order.id, order);
        }
        for schedule in snapshot.schedules {
            store.schedules.insert(schedule.id, schedule);
        }
        {
            let mut seq = store.sequences.lock();
            for c in snapshot.sequences {
                seq.insert((c.year, c.month), c.last);
            }
        }
        store
    }

    /// Copy the current contents out, in a stable order.
    pub fn snapshot(&self) -> StoreSnapshot {
        let assets = self.assets();
        let mut work_orders = self.work_orders.list();
        work_orders.sort_by(|a, b| a.number.cmp(&b.number).then(a.id.cmp(&b.id)));
        let mut schedules = self.schedules.list();
        sort_schedules(&mut schedules);
        let mut sequences: Vec<_> = self
            .sequences
            .lock()
            .iter()
            .map(|(&(year, month), &last)| SequenceCounter { year, month, last })
            .collect();
        sequences.sort_by_key(|c| (c.year, c.month));
        StoreSnapshot {
            assets,
            work_orders,
            schedules,
            sequences,
        }
    }

    /// Add or replace an asset.
    pub fn register_asset(&self, asset: AssetRecord) {
        self.assets.insert(asset.id, asset);
    }

    /// Every asset, by name.
    pub fn assets(&self) -> Vec<AssetRecord> {
        let mut assets = self.assets.list();
        assets.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        assets
    }
}

fn sort_schedules(schedules: &mut [MaintenanceSchedule]) {
    schedules.sort_by(|a, b| {
        a.scheduled_date
            .cmp(&b.scheduled_date)
            .then(a.id.cmp(&b.id))
    });
}

/// Version check shared by every save path. Returns the version to store.
fn next_version(
    kind: &'static str,
    id: impl std::fmt::Display,
    incoming: u64,
    stored: Option<u64>,
) -> Result<u64, StoreError> {
    let current = stored.unwrap_or(0);
    if incoming != current {
        return Err(StoreError::ConcurrencyConflict {
            kind,
            id: id.to_string(),
            expected: incoming.to_string(),
            actual: current.to_string(),
        });
    }
    Ok(current + 1)
}

fn not_found(kind: &'static str, id: impl std::fmt::Display) -> StoreError {
    StoreError::NotFound {
        kind,
        id: id.to_string(),
    }
}

impl WorkOrderStore for InMemoryStore {
    fn get_work_order(&self, id: WorkOrderId) -> Result<WorkOrder, StoreError> {
        self.work_orders
            .get(&id)
            .ok_or_else(|| not_found("work order", id))
    }

    fn save_work_order(&self, mut order: WorkOrder) -> Result<WorkOrder, StoreError> {
        self.work_orders.with_write(|map| -> Result<WorkOrder, StoreError> {
            let stored = map.get(&order.id).map(|o| o.version);
            order.version = next_version("work order", order.id, order.version, stored)?;
            map.insert(order.id, order.clone());
            Ok(order)
        })
    }

    fn list_work_orders(
        &self,
        scope: &TenantContext,
        filter: &WorkOrderFilter,
        now: Timestamp,
    ) -> Vec<WorkOrder> {
        let mut out = self
            .work_orders
            .filter(|o| scope.can_read(o.tenant_id) && filter.matches(o, now));
        out.sort_by(|a, b| {
            a.requested_date
                .cmp(&b.requested_date)
                .then(a.number.cmp(&b.number))
        });
        out
    }

    fn next_work_order_sequence(&self, year: i32, month: u32) -> u32 {
        let mut counters = self.sequences.lock();
        let last = counters.entry((year, month)).or_insert_with(|| {
            // Seed from orders that predate the counter, e.g. a hand-edited snapshot.
            self.work_orders
                .filter(|o| o.number.year() == year && o.number.month() == month)
                .iter()
                .map(|o| o.number.sequence())
                .max()
                .unwrap_or(0)
        });
        *last += 1;
        *last
    }
}

impl ScheduleStore for InMemoryStore {
    fn get_schedule(&self, id: ScheduleId) -> Result<MaintenanceSchedule, StoreError> {
        self.schedules
            .get(&id)
            .ok_or_else(|| not_found("schedule", id))
    }

    fn save_schedules(
        &self,
        schedules: Vec<MaintenanceSchedule>,
    ) -> Result<Vec<MaintenanceSchedule>, StoreError> {
        self.schedules.with_write(|map| -> Result<Vec<MaintenanceSchedule>, StoreError> {
            let mut staged = Vec::with_capacity(schedules.len());
            for mut s in schedules {
                let stored = map.get(&s.id).map(|x| x.version);
                s.version = next_version("schedule", s.id, s.version, stored)?;
                staged.push(s);
            }
            for s in &staged {
                map.insert(s.id, s.clone());
            }
            Ok(staged)
        })
    }

    fn list_schedules(&self, scope: &TenantContext) -> Vec<MaintenanceSchedule> {
        let mut out = self.schedules.filter(|s| scope.can_read(s.tenant_id));
        sort_schedules(&mut out);
        out
    }

    fn list_due_recurring_schedules(&self, now: Timestamp) -> Vec<MaintenanceSchedule> {
        let mut out = self.schedules.filter(|s| s.is_due(now));
        out.sort_by(|a, b| {
            a.next_scheduled_date
                .cmp(&b.next_scheduled_date)
                .then(a.id.cmp(&b.id))
        });
        out
    }

    fn commit_advancement(
        &self,
        source_id: ScheduleId,
        expected_next: Timestamp,
        mut occurrence: MaintenanceSchedule,
        advanced_next: Timestamp,
    ) -> Result<MaintenanceSchedule, StoreError> {
        self.schedules.with_write(|map| -> Result<MaintenanceSchedule, StoreError> {
            let source = map
                .get_mut(&source_id)
                .ok_or_else(|| not_found("schedule", source_id))?;
            if source.next_scheduled_date != Some(expected_next) {
                return Err(StoreError::ConcurrencyConflict {
                    kind: "schedule",
                    id: source_id.to_string(),
                    expected: expected_next.to_string(),
                    actual: source
                        .next_scheduled_date
                        .map_or_else(|| "none".to_string(), |t| t.to_string()),
                });
            }
            source.next_scheduled_date = Some(advanced_next);
            source.version += 1;
            occurrence.version = 1;
            map.insert(occurrence.id, occurrence.clone());
            Ok(occurrence)
        })
    }
}

impl AssetRegistry for InMemoryStore {
    fn get_asset(&self, id: AssetId) -> Result<AssetRecord, StoreError> {
        self.assets.get(&id).ok_or_else(|| not_found("asset", id))
    }

    fn set_status(&self, id: AssetId, status: AssetStatus) -> Result<AssetRecord, StoreError> {
        self.assets
            .try_update(&id, |asset| {
                asset.status = status;
                Ok(asset.clone())
            })
            .unwrap_or_else(|| Err(not_found("asset", id)))
    }
}
