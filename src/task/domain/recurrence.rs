//! Recurrence rules and next-occurrence date arithmetic.

use super::{TaskDomainError, TaskId};
use chrono::{Days, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// How often a recurring task repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    /// Every `interval` days.
    Daily,
    /// Every `interval` weeks.
    Weekly,
    /// Every `interval` calendar months.
    Monthly,
}

/// Recurrence definition attached to a task record.
///
/// Weekly rules carry the selected `days_of_week`, but the next-occurrence
/// computation uses a flat `interval * 7`-day offset rather than snapping to
/// the next matching weekday. The selected days are retained for display and
/// for a future scheduling refinement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    enabled: bool,
    is_prototype: bool,
    frequency: Frequency,
    interval: u32,
    days_of_week: Vec<Weekday>,
}

impl RecurrenceRule {
    /// Creates an enabled, non-prototype recurrence rule.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidInterval`] when `interval` is zero.
    pub fn new(frequency: Frequency, interval: u32) -> Result<Self, TaskDomainError> {
        if interval == 0 {
            return Err(TaskDomainError::InvalidInterval(interval));
        }
        Ok(Self {
            enabled: true,
            is_prototype: false,
            frequency,
            interval,
            days_of_week: Vec::new(),
        })
    }

    /// Marks the rule as belonging to a prototype (template) record.
    #[must_use]
    pub const fn as_prototype(mut self) -> Self {
        self.is_prototype = true;
        self
    }

    /// Disables the rule without discarding it.
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Sets the weekday selection for weekly rules.
    #[must_use]
    pub fn with_days_of_week(mut self, days: impl IntoIterator<Item = Weekday>) -> Self {
        self.days_of_week = days.into_iter().collect();
        self
    }

    /// Whether new occurrences should be generated.
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    /// Whether this rule belongs to a template record that is never worked.
    #[must_use]
    pub const fn is_prototype(&self) -> bool {
        self.is_prototype
    }

    /// Returns the repeat frequency.
    #[must_use]
    pub const fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Returns the repeat interval (every N days/weeks/months).
    #[must_use]
    pub const fn interval(&self) -> u32 {
        self.interval
    }

    /// Returns the weekday selection captured for weekly rules.
    #[must_use]
    pub fn days_of_week(&self) -> &[Weekday] {
        &self.days_of_week
    }

    /// Carries the rule onto a spawned occurrence.
    ///
    /// Occurrences are concrete work items, never prototypes.
    pub(crate) fn for_next_occurrence(&self) -> Self {
        let mut rule = self.clone();
        rule.is_prototype = false;
        rule
    }
}

/// Computes the due date of the occurrence following `current_due`.
///
/// Daily and weekly rules advance by a flat day offset. Monthly rules use
/// calendar month arithmetic, clamping to the last day when the target month
/// is shorter (2025-01-31 + 1 month = 2025-02-28).
///
/// # Errors
///
/// Returns [`TaskDomainError::DueDateOutOfRange`] when the arithmetic leaves
/// the representable calendar range.
pub fn compute_next_due_date(
    task_id: TaskId,
    current_due: NaiveDate,
    rule: &RecurrenceRule,
) -> Result<NaiveDate, TaskDomainError> {
    let next = match rule.frequency() {
        Frequency::Daily => current_due.checked_add_days(Days::new(u64::from(rule.interval()))),
        Frequency::Weekly => {
            current_due.checked_add_days(Days::new(u64::from(rule.interval()) * 7))
        }
        Frequency::Monthly => current_due.checked_add_months(Months::new(rule.interval())),
    };
    next.ok_or(TaskDomainError::DueDateOutOfRange(task_id))
}
