//! # Schedule Generator
//!
//! Two ways of producing future occurrences from a recurring schedule.
//!
//! ## Bulk pre-generation
//!
//! [`generate_recurring_schedules`] emits up to `occurrences` rows stepping
//! forward from the template's next date (or its scheduled date when no
//! next date exists yet). Candidates before `now` are skipped, not replaced.
//! The template is left alone except for one case: when its next date was
//! empty it is set to one step after its scheduled date.
//!
//! ## Rolling single-step advancement
//!
//! [`plan_advancement`] looks at one completed, due schedule and describes
//! exactly one new occurrence plus the source's advanced next date.
//! [`process_due_recurring_schedules`] applies that to an in-memory slice.
//!
//! One call advances each due schedule by one step only. After a long gap
//! the caller must call again until nothing is due; missed occurrences are
//! not caught up in a single pass.

use cmms_core::Timestamp;

use crate::schedule::MaintenanceSchedule;

/// Produce up to `occurrences` future rows from `template`.
///
/// Returns an empty list, and leaves `template` untouched, when the
/// template is one-off or `occurrences == 0`.
///
/// A template with no next date gets one step after its scheduled date,
/// which is also the date of the first generated row. If that template is
/// later completed, the due pass spawns its own occurrence on that date,
/// so the two rows coincide. Callers that pre-generate and then rely on
/// rolling advancement should expect the overlap.
pub fn generate_recurring_schedules(
    template: &mut MaintenanceSchedule,
    occurrences: u32,
    now: Timestamp,
) -> Vec<MaintenanceSchedule> {
    if !template.is_recurring() || occurrences == 0 {
        return Vec::new();
    }

    let step = template.interval_days();
    let base = template.next_scheduled_date.unwrap_or(template.scheduled_date);
    let generated = (1..=i64::from(occurrences))
        .map(|i| base.plus_days(step.saturating_mul(i)))
        .filter(|candidate| *candidate >= now)
        .map(|candidate| template.spawn_occurrence(candidate, now))
        .collect();

    if template.next_scheduled_date.is_none() {
        template.next_scheduled_date = Some(template.scheduled_date.plus_days(step));
    }
    generated
}

/// One step of rolling advancement for a single source schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct Advancement {
    /// The new `Scheduled` occurrence, dated at the source's old next date.
    pub occurrence: MaintenanceSchedule,
    /// The source's next date as read; used as the compare-and-swap guard.
    pub expected_next: Timestamp,
    /// The source's next date after this step.
    pub advanced_next: Timestamp,
}

/// Describe the next step for `source`, or `None` if it is not due.
pub fn plan_advancement(source: &MaintenanceSchedule, now: Timestamp) -> Option<Advancement> {
    if !source.is_due(now) {
        return None;
    }
    let expected_next = source.next_scheduled_date?;
    let advanced_next = expected_next.plus_days(source.interval_days());
    Some(Advancement {
        occurrence: source.spawn_occurrence(expected_next, now),
        expected_next,
        advanced_next,
    })
}

/// Advance every due schedule in `schedules` by one step, returning the
/// new occurrences.
pub fn process_due_recurring_schedules(
    schedules: &mut [MaintenanceSchedule],
    now: Timestamp,
) -> Vec<MaintenanceSchedule> {
    let mut created = Vec::new();
    for source in schedules.iter_mut() {
        if let Some(step) = plan_advancement(source, now) {
            source.next_scheduled_date = Some(step.advanced_next);
            created.push(step.occurrence);
        }
    }
    created
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::Frequency;
    use crate::schedule::{ScheduleDraft, ScheduleStatus};
    use cmms_core::{AssetId, TenantId, UserId};

    fn day(y: i32, m: u32, d: u32) -> Timestamp {
        Timestamp::from_ymd(y, m, d).unwrap()
    }

    fn template(frequency: Option<Frequency>, scheduled: Timestamp) -> MaintenanceSchedule {
        MaintenanceSchedule::create(
            ScheduleDraft {
                asset_id: AssetId::new(),
                asset_name: "Chiller 1".to_string(),
                title: "Filter change".to_string(),
                description: None,
                maintenance_type: "Preventive".to_string(),
                assigned_technician: None,
                estimated_duration_hours: Some(1.5),
                scheduled_date: scheduled,
                end_date: None,
                frequency,
                custom_interval_days: None,
            },
            Some(TenantId::new(1).unwrap()),
            UserId::new("planner").unwrap(),
            scheduled,
        )
    }

    // ── Bulk ─────────────────────────────────────────────────────────

    #[test]
    fn test_monthly_three_occurrences_from_new_year() {
        let start = day(2025, 1, 1);
        let mut t = template(Some(Frequency::Monthly), start);
        let out = generate_recurring_schedules(&mut t, 3, start);

        let dates: Vec<_> = out.iter().map(|s| s.scheduled_date).collect();
        assert_eq!(dates, vec![day(2025, 1, 31), day(2025, 3, 2), day(2025, 4, 1)]);
        for s in &out {
            assert_eq!(s.next_scheduled_date, Some(s.scheduled_date.plus_days(30)));
            assert_eq!(s.status, ScheduleStatus::Scheduled);
        }
        assert_eq!(t.next_scheduled_date, Some(day(2025, 1, 31)));
    }

    #[test]
    fn test_zero_occurrences_is_a_no_op() {
        let start = day(2025, 1, 1);
        let mut t = template(Some(Frequency::Monthly), start);
        let before = t.clone();
        assert!(generate_recurring_schedules(&mut t, 0, start).is_empty());
        assert_eq!(t, before);
    }

    #[test]
    fn test_one_off_template_is_a_no_op() {
        let start = day(2025, 1, 1);
        let mut t = template(None, start);
        let before = t.clone();
        assert!(generate_recurring_schedules(&mut t, 5, start).is_empty());
        assert_eq!(t, before);
        assert_eq!(t.next_scheduled_date, None);
    }

    #[test]
    fn test_past_candidates_are_skipped() {
        let mut t = template(Some(Frequency::Weekly), day(2025, 1, 1));
        let out = generate_recurring_schedules(&mut t, 4, day(2025, 1, 20));
        let dates: Vec<_> = out.iter().map(|s| s.scheduled_date).collect();
        assert_eq!(dates, vec![day(2025, 1, 22), day(2025, 1, 29)]);
    }

    #[test]
    fn test_existing_next_date_is_base_and_is_kept() {
        let mut t = template(Some(Frequency::Weekly), day(2025, 1, 1));
        t.next_scheduled_date = Some(day(2025, 1, 8));
        let out = generate_recurring_schedules(&mut t, 2, day(2025, 1, 1));
        assert_eq!(out[0].scheduled_date, day(2025, 1, 15));
        assert_eq!(out[1].scheduled_date, day(2025, 1, 22));
        assert_eq!(t.next_scheduled_date, Some(day(2025, 1, 8)));
    }

    #[test]
    fn test_end_date_keeps_template_span() {
        let mut t = template(Some(Frequency::Daily), day(2025, 1, 1));
        t.end_date = Some(day(2025, 1, 1).plus(chrono::Duration::hours(6)));
        let out = generate_recurring_schedules(&mut t, 1, day(2025, 1, 1));
        assert_eq!(
            out[0].end_date,
            Some(day(2025, 1, 2).plus(chrono::Duration::hours(6)))
        );
    }

    #[test]
    fn test_huge_custom_interval_clamps_at_year_9999() {
        let start = day(2025, 1, 1);
        let mut t = template(Some(Frequency::Custom), start);
        t.custom_interval_days = Some(100_000_000);
        let out = generate_recurring_schedules(&mut t, 3, start);
        assert_eq!(out.len(), 3);
        for s in &out {
            assert_eq!(s.scheduled_date.to_iso8601(), "9999-12-31T23:59:59Z");
        }
        assert_eq!(t.next_scheduled_date, Some(out[0].scheduled_date));
    }

    #[test]
    fn test_completed_template_repeats_first_generated_date() {
        let start = day(2025, 1, 1);
        let mut t = template(Some(Frequency::Monthly), start);
        let bulk = generate_recurring_schedules(&mut t, 2, start);
        t.complete(start);

        let mut list = vec![t];
        let rolled = process_due_recurring_schedules(&mut list, day(2025, 1, 31));
        assert_eq!(rolled.len(), 1);
        assert_eq!(rolled[0].scheduled_date, bulk[0].scheduled_date);
    }

    // ── Rolling ──────────────────────────────────────────────────────

    fn completed_due(next: Timestamp) -> MaintenanceSchedule {
        let mut s = template(Some(Frequency::Monthly), next.plus_days(-30));
        s.next_scheduled_date = Some(next);
        s.complete(next.plus_days(-29));
        s
    }

    #[test]
    fn test_due_schedule_spawns_one_occurrence_and_advances_source() {
        let mut list = vec![completed_due(day(2025, 2, 1))];
        let created = process_due_recurring_schedules(&mut list, day(2025, 2, 1));
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].scheduled_date, day(2025, 2, 1));
        assert_eq!(created[0].next_scheduled_date, Some(day(2025, 3, 3)));
        assert_eq!(created[0].generated_from, Some(list[0].id));
        assert_eq!(list[0].next_scheduled_date, Some(day(2025, 3, 3)));
    }

    #[test]
    fn test_second_pass_without_time_advance_creates_nothing() {
        let mut list = vec![completed_due(day(2025, 2, 1))];
        let now = day(2025, 2, 1);
        assert_eq!(process_due_recurring_schedules(&mut list, now).len(), 1);
        assert!(process_due_recurring_schedules(&mut list, now).is_empty());
    }

    #[test]
    fn test_not_yet_due_is_ignored() {
        let mut list = vec![completed_due(day(2025, 2, 1))];
        assert!(process_due_recurring_schedules(&mut list, day(2025, 1, 31)).is_empty());
        assert_eq!(list[0].next_scheduled_date, Some(day(2025, 2, 1)));
    }

    #[test]
    fn test_long_gap_advances_one_step_per_call() {
        // Single-step by design: a 100-day outage needs repeated calls.
        let mut list = vec![completed_due(day(2025, 1, 1))];
        let now = day(2025, 4, 11);
        let mut passes = Vec::new();
        loop {
            let created = process_due_recurring_schedules(&mut list, now);
            if created.is_empty() {
                break;
            }
            assert_eq!(created.len(), 1);
            passes.push(created[0].scheduled_date);
        }
        assert_eq!(
            passes,
            vec![day(2025, 1, 1), day(2025, 1, 31), day(2025, 3, 2), day(2025, 4, 1)]
        );
        assert_eq!(list[0].next_scheduled_date, Some(day(2025, 5, 1)));
    }

    #[test]
    fn test_scheduled_or_one_off_sources_are_not_due() {
        let mut scheduled = completed_due(day(2025, 2, 1));
        scheduled.status = ScheduleStatus::Scheduled;
        let mut one_off = completed_due(day(2025, 2, 1));
        one_off.frequency = None;
        let mut list = vec![scheduled, one_off];
        assert!(process_due_recurring_schedules(&mut list, day(2025, 6, 1)).is_empty());
    }
}
