//! # Maintenance Schedule
//!
//! A planned maintenance event for one asset, optionally recurring.
//!
//! ## Recurrence Invariants
//!
//! - `frequency == None` (one-off) ⇒ `next_scheduled_date` stays `None` and
//!   nothing is ever generated from the record.
//! - `frequency == Some(_)` ⇒ `next_scheduled_date`, once set, is exactly
//!   one interval after `scheduled_date` or after the previous
//!   `next_scheduled_date`. Each advancement is a single step.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use cmms_core::{AssetId, ScheduleId, TenantId, Timestamp, UserId};

use crate::recurrence::{self, Frequency, DEFAULT_INTERVAL_DAYS};

/// Schedule status. Only these two values drive the recurrence engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleStatus {
    Scheduled,
    Completed,
}

impl std::fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scheduled => f.write_str("SCHEDULED"),
            Self::Completed => f.write_str("COMPLETED"),
        }
    }
}

/// Fields supplied by a user creating a schedule directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDraft {
    pub asset_id: AssetId,
    pub asset_name: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub maintenance_type: String,
    #[serde(default)]
    pub assigned_technician: Option<UserId>,
    #[serde(default)]
    pub estimated_duration_hours: Option<f64>,
    pub scheduled_date: Timestamp,
    #[serde(default)]
    pub end_date: Option<Timestamp>,
    #[serde(default, with = "recurrence::label")]
    pub frequency: Option<Frequency>,
    #[serde(default)]
    pub custom_interval_days: Option<u32>,
}

/// A stored maintenance schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceSchedule {
    pub id: ScheduleId,
    pub asset_id: AssetId,
    pub asset_name: String,
    pub title: String,
    pub description: Option<String>,
    pub maintenance_type: String,
    pub assigned_technician: Option<UserId>,
    pub estimated_duration_hours: Option<f64>,

    pub scheduled_date: Timestamp,
    pub end_date: Option<Timestamp>,
    pub next_scheduled_date: Option<Timestamp>,
    #[serde(default, with = "recurrence::label")]
    pub frequency: Option<Frequency>,
    pub custom_interval_days: Option<u32>,

    pub status: ScheduleStatus,
    pub completed_date: Option<Timestamp>,
    pub tenant_id: Option<TenantId>,
    pub created_by: UserId,
    pub created_at: Timestamp,
    /// The schedule this occurrence was generated from, if synthetic.
    pub generated_from: Option<ScheduleId>,
    #[serde(default)]
    pub version: u64,
}

impl MaintenanceSchedule {
    /// A schedule created directly by a user. `next_scheduled_date` starts
    /// empty; the generator fills it on first use.
    pub fn create(
        draft: ScheduleDraft,
        tenant_id: Option<TenantId>,
        created_by: UserId,
        at: Timestamp,
    ) -> Self {
        Self {
            id: ScheduleId::new(),
            asset_id: draft.asset_id,
            asset_name: draft.asset_name,
            title: draft.title,
            description: draft.description,
            maintenance_type: draft.maintenance_type,
            assigned_technician: draft.assigned_technician,
            estimated_duration_hours: draft.estimated_duration_hours,
            scheduled_date: draft.scheduled_date,
            end_date: draft.end_date,
            next_scheduled_date: None,
            frequency: draft.frequency,
            custom_interval_days: draft.custom_interval_days,
            status: ScheduleStatus::Scheduled,
            completed_date: None,
            tenant_id,
            created_by,
            created_at: at,
            generated_from: None,
            version: 0,
        }
    }

    /// Whether the schedule repeats.
    pub fn is_recurring(&self) -> bool {
        self.frequency.is_some()
    }

    /// The recurrence step in days.
    pub fn interval_days(&self) -> i64 {
        self.frequency
            .as_ref()
            .map_or(DEFAULT_INTERVAL_DAYS, |f| f.days(self.custom_interval_days))
    }

    /// Span from start to end of the occurrence, if it has an end.
    pub fn duration(&self) -> Option<Duration> {
        self.end_date.map(|end| end.since(&self.scheduled_date))
    }

    /// Completed, recurring, and its next occurrence has arrived.
    pub fn is_due(&self, now: Timestamp) -> bool {
        self.is_recurring()
            && self.status == ScheduleStatus::Completed
            && self.next_scheduled_date.is_some_and(|next| next <= now)
    }

    /// Mark this occurrence done. Returns `false` if it already was.
    pub fn complete(&mut self, at: Timestamp) -> bool {
        if self.status == ScheduleStatus::Completed {
            return false;
        }
        self.status = ScheduleStatus::Completed;
        self.completed_date = Some(at);
        true
    }

    /// A fresh `Scheduled` occurrence at `scheduled_date`, inheriting this
    /// schedule's descriptive fields and ownership. Its end date keeps this
    /// schedule's start-to-end span and its own successor is one step out.
    pub fn spawn_occurrence(&self, scheduled_date: Timestamp, created_at: Timestamp) -> Self {
        Self {
            id: ScheduleId::new(),
            asset_id: self.asset_id,
            asset_name: self.asset_name.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            maintenance_type: self.maintenance_type.clone(),
            assigned_technician: self.assigned_technician.clone(),
            estimated_duration_hours: self.estimated_duration_hours,
            scheduled_date,
            end_date: self.duration().map(|span| scheduled_date.plus(span)),
            next_scheduled_date: Some(scheduled_date.plus_days(self.interval_days())),
            frequency: self.frequency.clone(),
            custom_interval_days: self.custom_interval_days,
            status: ScheduleStatus::Scheduled,
            completed_date: None,
            tenant_id: self.tenant_id,
            created_by: self.created_by.clone(),
            created_at,
            generated_from: Some(self.id),
            version: 0,
        }
    }
}
