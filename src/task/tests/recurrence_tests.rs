//! Unit tests for recurrence rules and next-occurrence generation.

use super::support::{date, proof_required_item, recurring_task_data};
use crate::task::domain::{
    AssignmentStatus, Frequency, RecurrenceRule, TaskDomainError, TaskId, TaskRecord, TaskStatus,
    compute_next_due_date,
};
use chrono::Weekday;
use eyre::ensure;
use mockable::DefaultClock;
use rstest::{fixture, rstest};

#[fixture]
fn clock() -> DefaultClock {
    DefaultClock
}

#[rstest]
fn zero_interval_is_rejected() {
    assert_eq!(
        RecurrenceRule::new(Frequency::Daily, 0),
        Err(TaskDomainError::InvalidInterval(0))
    );
}

#[rstest]
#[case(Frequency::Daily, 1, (2025, 7, 10), (2025, 7, 11))]
#[case(Frequency::Daily, 3, (2025, 7, 10), (2025, 7, 13))]
#[case(Frequency::Daily, 30, (2025, 12, 15), (2026, 1, 14))]
#[case(Frequency::Weekly, 1, (2025, 7, 10), (2025, 7, 17))]
#[case(Frequency::Weekly, 2, (2025, 7, 10), (2025, 7, 24))]
#[case(Frequency::Monthly, 1, (2025, 7, 10), (2025, 8, 10))]
#[case(Frequency::Monthly, 6, (2025, 7, 10), (2026, 1, 10))]
// Month arithmetic clamps to the last day of shorter target months.
#[case(Frequency::Monthly, 1, (2025, 1, 31), (2025, 2, 28))]
#[case(Frequency::Monthly, 1, (2024, 1, 31), (2024, 2, 29))]
#[case(Frequency::Monthly, 2, (2025, 12, 31), (2026, 2, 28))]
fn next_due_date_is_computed_per_rule(
    #[case] frequency: Frequency,
    #[case] interval: u32,
    #[case] current: (i32, u32, u32),
    #[case] expected: (i32, u32, u32),
) -> eyre::Result<()> {
    let rule = RecurrenceRule::new(frequency, interval)?;
    let current_due = date(current.0, current.1, current.2);

    let next = compute_next_due_date(TaskId::new(), current_due, &rule)?;

    ensure!(next == date(expected.0, expected.1, expected.2));
    ensure!(next > current_due, "next occurrence is strictly later");
    Ok(())
}

#[rstest]
fn weekly_offset_ignores_the_captured_weekday_selection() -> eyre::Result<()> {
    // A Thursday baseline with Monday selected still advances a flat week.
    let rule = RecurrenceRule::new(Frequency::Weekly, 1)?.with_days_of_week([Weekday::Mon]);

    let next = compute_next_due_date(TaskId::new(), date(2025, 7, 10), &rule)?;

    ensure!(next == date(2025, 7, 17));
    ensure!(rule.days_of_week() == [Weekday::Mon]);
    Ok(())
}

#[rstest]
fn next_occurrence_resets_work_state(clock: DefaultClock) -> eyre::Result<()> {
    let rule = RecurrenceRule::new(Frequency::Weekly, 2)?;
    let mut data = recurring_task_data(rule, date(2025, 7, 10));
    data.checklist = vec![proof_required_item("photograph kitchen")];
    let mut task = TaskRecord::new(data, &clock)?;
    task.update_checklist_item(
        0,
        &crate::task::domain::ChecklistItemPatch {
            text: None,
            instructions: None,
            completed: Some(true),
            proof_url: Some("https://cdn/proof.jpg".to_owned()),
        },
        &clock,
    )?;

    let next = task.next_occurrence(&clock)?;

    ensure!(next.id() != task.id());
    ensure!(next.status() == TaskStatus::Pending);
    ensure!(next.assignment() == AssignmentStatus::PendingPrimary);
    ensure!(next.assigned_to().is_none());
    ensure!(next.scheduled_date() == Some(date(2025, 7, 24)));
    ensure!(next.rejection_count() == 0);
    ensure!(next.inspection().is_none());
    ensure!(next.proofs().is_empty());
    let first_item = next
        .checklist()
        .first()
        .ok_or_else(|| eyre::eyre!("checklist carried over"))?;
    ensure!(!first_item.completed);
    ensure!(first_item.proof_url.is_empty());
    ensure!(first_item.proof_required, "requirements carry over");
    ensure!(next.owner() == task.owner());
    ensure!(next.property_id() == task.property_id());
    ensure!(!next.is_prototype());
    Ok(())
}

#[rstest]
fn next_occurrence_without_primary_starts_unassigned(clock: DefaultClock) -> eyre::Result<()> {
    let rule = RecurrenceRule::new(Frequency::Daily, 1)?;
    let mut data = recurring_task_data(rule, date(2025, 7, 10));
    data.primary_assignee = None;
    data.fallback_assignee = None;
    let task = TaskRecord::new(data, &clock)?;

    let next = task.next_occurrence(&clock)?;

    ensure!(next.assignment() == AssignmentStatus::Unassigned);
    ensure!(next.status() == TaskStatus::Pending);
    Ok(())
}

#[rstest]
fn disabled_rule_never_spawns(clock: DefaultClock) -> eyre::Result<()> {
    let rule = RecurrenceRule::new(Frequency::Daily, 1)?.disabled();
    let task = TaskRecord::new(recurring_task_data(rule, date(2025, 7, 10)), &clock)?;

    let result = task.next_occurrence(&clock);

    ensure!(result == Err(TaskDomainError::NotRecurring(task.id())));
    Ok(())
}

#[rstest]
fn non_recurring_task_never_spawns(clock: DefaultClock) -> eyre::Result<()> {
    let task = TaskRecord::new(super::support::task_data(), &clock)?;
    let result = task.next_occurrence(&clock);
    ensure!(result == Err(TaskDomainError::NotRecurring(task.id())));
    Ok(())
}

#[rstest]
fn prototype_never_spawns_directly(clock: DefaultClock) -> eyre::Result<()> {
    let rule = RecurrenceRule::new(Frequency::Weekly, 1)?.as_prototype();
    let task = TaskRecord::new(recurring_task_data(rule, date(2025, 7, 10)), &clock)?;

    let result = task.next_occurrence(&clock);

    ensure!(result == Err(TaskDomainError::PrototypeNotWorkable(task.id())));
    Ok(())
}

#[rstest]
fn successors_chain_monotonically(clock: DefaultClock) -> eyre::Result<()> {
    let rule = RecurrenceRule::new(Frequency::Weekly, 2)?;
    let first = TaskRecord::new(recurring_task_data(rule, date(2025, 7, 10)), &clock)?;

    let second = first.next_occurrence(&clock)?;
    let third = second.next_occurrence(&clock)?;

    ensure!(second.scheduled_date() == Some(date(2025, 7, 24)));
    ensure!(third.scheduled_date() == Some(date(2025, 8, 7)));
    Ok(())
}
