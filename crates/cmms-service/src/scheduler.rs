//! # Recurring Scheduler
//!
//! Persisted, tenant-checked scheduling on top of the pure generator in
//! `cmms-schedule`.
//!
//! - **Bulk generation** ([`RecurringScheduler::generate_for_template`])
//!   saves the generated rows and, when it changed, the template in one
//!   batch. The count is capped by [`SchedulerConfig::max_occurrences`].
//!
//! - **Due processing** ([`RecurringScheduler::process_due`]) is the
//!   background pass. Each due source is advanced through
//!   [`ScheduleStore::commit_advancement`], so two passes racing over the
//!   same source produce one occurrence between them; the loser is
//!   reported in [`DueRunReport::skipped`]. One pass advances each source
//!   by one step; [`RecurringScheduler::catch_up`] repeats passes until
//!   nothing is due.

use serde::Serialize;

use cmms_core::{CallerIdentity, Clock, ScheduleId, TenantId, Timestamp};
use cmms_schedule::{
    check_custom_interval, generate_recurring_schedules, plan_advancement, MaintenanceSchedule,
    ScheduleDraft,
};

use crate::asset::AssetRegistry;
use crate::config::SchedulerConfig;
use crate::error::ServiceError;
use crate::store::ScheduleStore;
use crate::tenant::{ensure_read, ensure_write, owning_tenant, TenantGuard};

const KIND: &str = "schedule";

/// What one due pass did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DueRunReport {
    /// Occurrences created, in the order their sources were processed.
    pub generated: Vec<MaintenanceSchedule>,
    /// Sources another writer advanced (or removed) first.
    pub skipped: Vec<ScheduleId>,
}

impl DueRunReport {
    /// Whether the pass did nothing at all.
    pub fn is_idle(&self) -> bool {
        self.generated.is_empty() && self.skipped.is_empty()
    }
}

/// Result of completing a schedule occurrence.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleCompletion {
    /// Marked completed and saved.
    Completed(MaintenanceSchedule),
    /// It already was; nothing written.
    AlreadyCompleted(MaintenanceSchedule),
}

/// Schedule operations over injected store, asset registry, tenant guard
/// and clock.
#[derive(Debug, Clone)]
pub struct RecurringScheduler<S, A, G, C> {
    store: S,
    assets: A,
    guard: G,
    clock: C,
    config: SchedulerConfig,
}

impl<S, A, G, C> RecurringScheduler<S, A, G, C>
where
    S: ScheduleStore,
    A: AssetRegistry,
    G: TenantGuard,
    C: Clock,
{
    pub fn new(store: S, assets: A, guard: G, clock: C, config: SchedulerConfig) -> Self {
        Self {
            store,
            assets,
            guard,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Create a schedule directly. An empty `asset_name` is filled from
    /// the asset registry. A custom interval above
    /// [`cmms_schedule::MAX_CUSTOM_INTERVAL_DAYS`] is a validation error.
    pub fn create_schedule(
        &self,
        caller: &CallerIdentity,
        mut draft: ScheduleDraft,
        tenant_id: Option<TenantId>,
    ) -> Result<MaintenanceSchedule, ServiceError> {
        check_custom_interval(draft.custom_interval_days)?;
        let ctx = self.guard.resolve(caller)?;
        let asset = self.assets.get_asset(draft.asset_id)?;
        ensure_read(&ctx, caller, "asset", asset.id, asset.tenant_id)?;
        let tenant_id = owning_tenant(&ctx, tenant_id, asset.tenant_id)?;
        if draft.asset_name.trim().is_empty() {
            draft.asset_name = asset.name;
        }

        let schedule =
            MaintenanceSchedule::create(draft, tenant_id, caller.user.clone(), self.clock.now());
        note_frequency(&schedule);
        let saved = self.save_one(schedule)?;
        tracing::info!(
            schedule = %saved.id,
            frequency = saved.frequency.as_ref().map_or("", |f| f.as_str()),
            scheduled = %saved.scheduled_date,
            "schedule created"
        );
        Ok(saved)
    }

    /// Load one schedule the caller may see.
    pub fn get_schedule(
        &self,
        caller: &CallerIdentity,
        id: ScheduleId,
    ) -> Result<MaintenanceSchedule, ServiceError> {
        let schedule = self.store.get_schedule(id)?;
        let ctx = self.guard.resolve(caller)?;
        ensure_read(&ctx, caller, KIND, id, schedule.tenant_id)?;
        Ok(schedule)
    }

    /// Schedules in the caller's scope.
    pub fn list_schedules(
        &self,
        caller: &CallerIdentity,
    ) -> Result<Vec<MaintenanceSchedule>, ServiceError> {
        let ctx = self.guard.resolve(caller)?;
        Ok(self.store.list_schedules(&ctx))
    }

    /// Mark an occurrence done. Completing a recurring schedule is what
    /// makes it eligible for due processing.
    pub fn complete_schedule(
        &self,
        caller: &CallerIdentity,
        id: ScheduleId,
    ) -> Result<ScheduleCompletion, ServiceError> {
        let mut schedule = self.store.get_schedule(id)?;
        let ctx = self.guard.resolve(caller)?;
        ensure_write(&ctx, caller, KIND, id, schedule.tenant_id)?;

        if !schedule.complete(self.clock.now()) {
            tracing::debug!(schedule = %id, "schedule already completed");
            return Ok(ScheduleCompletion::AlreadyCompleted(schedule));
        }
        let saved = self.save_one(schedule)?;
        tracing::info!(schedule = %id, user = %caller.user, "schedule completed");
        Ok(ScheduleCompletion::Completed(saved))
    }

    /// Pre-generate up to `occurrences` future rows from template
    /// `template_id` and persist them with the template in one batch.
    pub fn generate_for_template(
        &self,
        caller: &CallerIdentity,
        template_id: ScheduleId,
        occurrences: u32,
    ) -> Result<Vec<MaintenanceSchedule>, ServiceError> {
        let mut template = self.store.get_schedule(template_id)?;
        let ctx = self.guard.resolve(caller)?;
        ensure_write(&ctx, caller, KIND, template_id, template.tenant_id)?;
        note_frequency(&template);

        let capped = occurrences.min(self.config.max_occurrences);
        if capped < occurrences {
            tracing::debug!(
                requested = occurrences,
                cap = self.config.max_occurrences,
                "occurrence count capped"
            );
        }

        let before = template.next_scheduled_date;
        let generated = generate_recurring_schedules(&mut template, capped, self.clock.now());
        let template_changed = template.next_scheduled_date != before;
        if generated.is_empty() && !template_changed {
            return Ok(Vec::new());
        }

        let count = generated.len();
        let mut batch = generated;
        if template_changed {
            batch.push(template);
        }
        let saved = self.store.save_schedules(batch).map_err(|e| {
            tracing::warn!(schedule = %template_id, error = %e, "bulk generation not saved");
            ServiceError::from(e)
        })?;
        let occurrences: Vec<_> = saved.into_iter().take(count).collect();
        for occ in &occurrences {
            tracing::info!(
                schedule = %occ.id,
                template = %template_id,
                scheduled = %occ.scheduled_date,
                "occurrence generated"
            );
        }
        Ok(occurrences)
    }

    /// One due pass at the clock's current instant.
    pub fn run_due_pass(&self) -> DueRunReport {
        self.process_due(self.clock.now())
    }

    /// Advance every source due at `now` by exactly one step.
    pub fn process_due(&self, now: Timestamp) -> DueRunReport {
        let mut report = DueRunReport::default();
        for source in self.store.list_due_recurring_schedules(now) {
            note_frequency(&source);
            let Some(step) = plan_advancement(&source, now) else {
                continue;
            };
            match self.store.commit_advancement(
                source.id,
                step.expected_next,
                step.occurrence,
                step.advanced_next,
            ) {
                Ok(occ) => {
                    tracing::info!(
                        schedule = %occ.id,
                        source = %source.id,
                        scheduled = %occ.scheduled_date,
                        next = %step.advanced_next,
                        "occurrence generated"
                    );
                    report.generated.push(occ);
                }
                Err(e) => {
                    tracing::warn!(source = %source.id, error = %e, "advancement skipped");
                    report.skipped.push(source.id);
                }
            }
        }
        report
    }

    /// Repeat due passes at `now` until one generates nothing, at most
    /// `max_passes` times. Returns every occurrence created.
    pub fn catch_up(&self, now: Timestamp, max_passes: usize) -> Vec<MaintenanceSchedule> {
        let mut all = Vec::new();
        for _ in 0..max_passes {
            let report = self.process_due(now);
            if report.generated.is_empty() {
                break;
            }
            all.extend(report.generated);
        }
        all
    }

    fn save_one(&self, schedule: MaintenanceSchedule) -> Result<MaintenanceSchedule, ServiceError> {
        let id = schedule.id;
        self.store
            .save_schedules(vec![schedule])?
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::NotFound {
                kind: KIND,
                id: id.to_string(),
            })
    }
}

fn note_frequency(schedule: &MaintenanceSchedule) {
    if let Some(freq) = &schedule.frequency {
        if !freq.is_recognized() {
            tracing::debug!(
                schedule = %schedule.id,
                label = freq.as_str(),
                days = schedule.interval_days(),
                "unrecognized frequency, using default interval"
            );
        }
    }
}
