//! Shared fixtures for task lifecycle tests.

#![expect(
    clippy::expect_used,
    reason = "Test fixtures use expect for construction clarity"
)]

use crate::task::domain::{
    ActorId, ChecklistItem, NewTaskData, Priority, PropertyId, RecurrenceRule, TaskRecord,
    TaskType,
};
use chrono::NaiveDate;
use mockable::Clock;

/// Builds a validated actor identifier.
pub(crate) fn actor(name: &str) -> ActorId {
    ActorId::new(name).expect("valid actor id")
}

/// Baseline task data: a turnover clean owned by `manager-1`.
pub(crate) fn task_data() -> NewTaskData {
    NewTaskData {
        name: "Turnover clean - unit 4B".to_owned(),
        description: Some("Full clean between guests".to_owned()),
        task_type: TaskType::Cleaning,
        priority: Priority::Medium,
        owner: actor("manager-1"),
        property_id: PropertyId::new(),
        primary_assignee: None,
        fallback_assignee: None,
        inspector: None,
        scheduled_date: None,
        checklist: Vec::new(),
        recurrence: None,
    }
}

/// Task data offered to alice with bob as fallback.
pub(crate) fn offered_task_data() -> NewTaskData {
    let mut data = task_data();
    data.primary_assignee = Some(actor("alice"));
    data.fallback_assignee = Some(actor("bob"));
    data
}

/// A task sitting as an open offer with alice primary and bob fallback.
pub(crate) fn offered_task(clock: &impl Clock) -> TaskRecord {
    TaskRecord::new(offered_task_data(), clock).expect("valid task data")
}

/// A recurring task data set with a weekly rule and a due date.
pub(crate) fn recurring_task_data(rule: RecurrenceRule, due: NaiveDate) -> NewTaskData {
    let mut data = offered_task_data();
    data.scheduled_date = Some(due);
    data.recurrence = Some(rule);
    data
}

/// A proof-required checklist item with no proof attached.
pub(crate) fn proof_required_item(text: &str) -> ChecklistItem {
    ChecklistItem::new(text).requiring_proof()
}

/// A calendar date that must be valid.
pub(crate) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid calendar date")
}
