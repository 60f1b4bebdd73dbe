//! # Tenant Isolation
//!
//! Two tenants and a super-admin sharing one store. A scoped caller never
//! reads, lists or mutates the other tenant's records, and a denial leaves
//! the target untouched.

use std::sync::Arc;

use cmms_core::{AssetId, CallerIdentity, ManualClock, TenantId, Timestamp, UserId};
use cmms_schedule::{Frequency, ScheduleDraft};
use cmms_service::{
    AssetRecord, DirectoryTenantGuard, InMemoryStore, NewWorkOrder, RecurringScheduler,
    SchedulerConfig, ServiceError, WorkOrderFilter, WorkOrderService,
};
use cmms_state::{EntryPoint, Priority, WorkOrderCommand, WorkOrderDraft, WorkOrderStatus};

struct World {
    store: InMemoryStore,
    orders: WorkOrderService<InMemoryStore, InMemoryStore, DirectoryTenantGuard, Arc<ManualClock>>,
    schedules:
        RecurringScheduler<InMemoryStore, InMemoryStore, DirectoryTenantGuard, Arc<ManualClock>>,
    acme_asset: AssetId,
    globex_asset: AssetId,
}

fn user(name: &str) -> CallerIdentity {
    CallerIdentity::new(UserId::new(name).unwrap())
}

fn tenant(n: i64) -> TenantId {
    TenantId::new(n).unwrap()
}

fn world() -> World {
    let store = InMemoryStore::new();
    let acme = AssetRecord::new("Acme boiler", Some(tenant(1)));
    let globex = AssetRecord::new("Globex chiller", Some(tenant(2)));
    let (acme_asset, globex_asset) = (acme.id, globex.id);
    store.register_asset(acme);
    store.register_asset(globex);

    let guard = DirectoryTenantGuard::new()
        .with_super_admin(UserId::new("root").unwrap())
        .with_member(UserId::new("alice").unwrap(), tenant(1))
        .with_member(UserId::new("bob").unwrap(), tenant(2));
    let clock = Arc::new(ManualClock::new(
        Timestamp::parse("2025-02-10T12:00:00Z").unwrap(),
    ));
    World {
        orders: WorkOrderService::new(
            store.clone(),
            store.clone(),
            guard.clone(),
            Arc::clone(&clock),
        ),
        schedules: RecurringScheduler::new(
            store.clone(),
            store.clone(),
            guard,
            clock,
            SchedulerConfig::default(),
        ),
        store,
        acme_asset,
        globex_asset,
    }
}

fn raise(w: &World, who: &str, asset_id: AssetId) -> Result<cmms_state::WorkOrder, ServiceError> {
    w.orders.create(
        &user(who),
        NewWorkOrder {
            draft: WorkOrderDraft {
                title: "Pressure drop".to_string(),
                description: None,
                priority: Priority::High,
                work_type: "Corrective".to_string(),
                category: String::new(),
                asset_id,
                due_date: None,
                assigned_to: None,
                estimated_cost: None,
                estimated_downtime_hours: None,
            },
            entry: EntryPoint::Direct,
            tenant_id: None,
        },
    )
}

#[test]
fn scoped_callers_list_only_their_own_work_orders() {
    let w = world();
    raise(&w, "alice", w.acme_asset).unwrap();
    raise(&w, "alice", w.acme_asset).unwrap();
    raise(&w, "bob", w.globex_asset).unwrap();

    let all = WorkOrderFilter::default();
    let alice = w.orders.list(&user("alice"), &all).unwrap();
    let bob = w.orders.list(&user("bob"), &all).unwrap();
    let root = w.orders.list(&user("root"), &all).unwrap();

    assert_eq!(alice.len(), 2);
    assert!(alice.iter().all(|o| o.tenant_id == Some(tenant(1))));
    assert_eq!(bob.len(), 1);
    assert_eq!(root.len(), 3);
}

#[test]
fn cross_tenant_transition_is_unauthorized_and_writes_nothing() {
    let w = world();
    let order = raise(&w, "alice", w.acme_asset).unwrap();

    let err = w
        .orders
        .transition(&user("bob"), order.id, WorkOrderCommand::Start)
        .unwrap_err();
    assert!(matches!(err, ServiceError::Unauthorized(_)));

    let stored = w.orders.get(&user("alice"), order.id).unwrap();
    assert_eq!(stored, order);
    assert_eq!(stored.status, WorkOrderStatus::Open);
}

#[test]
fn cross_tenant_read_is_unauthorized() {
    let w = world();
    let order = raise(&w, "alice", w.acme_asset).unwrap();
    assert!(matches!(
        w.orders.get(&user("bob"), order.id),
        Err(ServiceError::Unauthorized(_))
    ));
    assert!(w.orders.get(&user("root"), order.id).is_ok());
}

#[test]
fn raising_against_another_tenants_asset_is_refused() {
    let w = world();
    assert!(matches!(
        raise(&w, "alice", w.globex_asset),
        Err(ServiceError::Unauthorized(_))
    ));
    assert!(w.store.snapshot().work_orders.is_empty());
}

#[test]
fn unknown_caller_is_refused_everywhere() {
    let w = world();
    assert!(matches!(
        raise(&w, "mallory", w.acme_asset),
        Err(ServiceError::Unauthorized(_))
    ));
    assert!(w
        .orders
        .list(&user("mallory"), &WorkOrderFilter::default())
        .is_err());
}

#[test]
fn super_admin_acts_across_tenants() {
    let w = world();
    let order = raise(&w, "bob", w.globex_asset).unwrap();
    let outcome = w
        .orders
        .transition(&user("root"), order.id, WorkOrderCommand::Start)
        .unwrap();
    assert!(outcome.is_applied());
}

#[test]
fn schedules_follow_the_same_rules() {
    let w = world();
    let template = w
        .schedules
        .create_schedule(
            &user("alice"),
            ScheduleDraft {
                asset_id: w.acme_asset,
                asset_name: String::new(),
                title: "Descale".to_string(),
                description: None,
                maintenance_type: "Preventive".to_string(),
                assigned_technician: None,
                estimated_duration_hours: None,
                scheduled_date: Timestamp::from_ymd(2025, 3, 1).unwrap(),
                end_date: None,
                frequency: Some(Frequency::Quarterly),
                custom_interval_days: None,
            },
            None,
        )
        .unwrap();
    assert_eq!(template.tenant_id, Some(tenant(1)));

    assert!(w.schedules.list_schedules(&user("bob")).unwrap().is_empty());
    assert!(matches!(
        w.schedules.generate_for_template(&user("bob"), template.id, 4),
        Err(ServiceError::Unauthorized(_))
    ));
    assert!(matches!(
        w.schedules.complete_schedule(&user("bob"), template.id),
        Err(ServiceError::Unauthorized(_))
    ));
    assert_eq!(w.store.snapshot().schedules.len(), 1);

    let generated = w
        .schedules
        .generate_for_template(&user("alice"), template.id, 4)
        .unwrap();
    assert_eq!(generated.len(), 4);
    assert!(generated.iter().all(|s| s.tenant_id == Some(tenant(1))));
}

#[test]
fn super_admin_work_stays_with_the_asset_tenant() {
    let w = world();
    let order = raise(&w, "root", w.globex_asset).unwrap();
    assert_eq!(order.tenant_id, Some(tenant(2)));

    assert!(matches!(
        w.orders.get(&user("alice"), order.id),
        Err(ServiceError::Unauthorized(_))
    ));
    let all = WorkOrderFilter::default();
    assert!(w.orders.list(&user("alice"), &all).unwrap().is_empty());
    assert_eq!(w.orders.list(&user("bob"), &all).unwrap().len(), 1);
}
