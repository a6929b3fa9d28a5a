//! Task aggregate root and related lifecycle types.

use super::{
    ActorId, ChecklistChange, ChecklistItem, ChecklistItemPatch, ParseAssignmentStatusError,
    ParseTaskStatusError, PropertyId, RecurrenceRule, TaskDomainError, TaskId, checklist,
    recurrence,
};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of work a task represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    /// Turnover or scheduled cleaning.
    Cleaning,
    /// Repair or upkeep work.
    Maintenance,
    /// Walkthrough or condition inspection.
    Inspection,
}

/// Scheduling priority of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Can wait for the next scheduled visit.
    Low,
    /// Normal turnaround.
    Medium,
    /// Needs attention before the next guest or tenant.
    High,
}

/// Work lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Accepted or created, work not yet started.
    Pending,
    /// Actively being worked.
    InProgress,
    /// Submitted and awaiting review.
    PendingInspection,
    /// Approved and finished.
    Completed,
    /// Review rejected; back with the assignee.
    RequiresRevisions,
    /// No active assignee.
    Unassigned,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::PendingInspection => "pending_inspection",
            Self::Completed => "completed",
            Self::RequiresRevisions => "requires_revisions",
            Self::Unassigned => "unassigned",
        }
    }

    /// Whether the state machine permits moving from `self` to `to`.
    ///
    /// `Completed` admits only the explicit re-open edge into
    /// `RequiresRevisions`; same-state transitions are never valid (callers
    /// treat duplicate completion as a no-op before consulting this table).
    #[must_use]
    pub const fn can_transition_to(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Unassigned, Self::Pending | Self::InProgress)
                | (
                    Self::Pending,
                    Self::InProgress
                        | Self::PendingInspection
                        | Self::Completed
                        | Self::Unassigned
                )
                | (
                    Self::InProgress,
                    Self::Pending | Self::PendingInspection | Self::Completed | Self::Unassigned
                )
                | (
                    Self::PendingInspection,
                    Self::InProgress | Self::Completed | Self::RequiresRevisions
                )
                | (
                    Self::RequiresRevisions,
                    Self::InProgress | Self::PendingInspection | Self::Completed
                )
                | (Self::Completed, Self::RequiresRevisions)
        )
    }

    /// Whether the state ends the lifecycle (barring an explicit re-open).
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "pending_inspection" => Ok(Self::PendingInspection),
            "completed" => Ok(Self::Completed),
            "requires_revisions" => Ok(Self::RequiresRevisions),
            "unassigned" => Ok(Self::Unassigned),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a task sits in the offer/acceptance flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    /// Nobody has been offered the task.
    Unassigned,
    /// Offered to the primary assignee, awaiting their response.
    PendingPrimary,
    /// Primary rejected; offered to the fallback assignee.
    PendingFallback,
    /// An assignee accepted the offer.
    Accepted,
    /// All configured assignees rejected; manual intervention required.
    Rejected,
}

impl AssignmentStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unassigned => "unassigned",
            Self::PendingPrimary => "pending_primary",
            Self::PendingFallback => "pending_fallback",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl TryFrom<&str> for AssignmentStatus {
    type Error = ParseAssignmentStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "unassigned" => Ok(Self::Unassigned),
            "pending_primary" => Ok(Self::PendingPrimary),
            "pending_fallback" => Ok(Self::PendingFallback),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ParseAssignmentStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of an inspection review, stored on the task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionRecord {
    /// Whether the reviewer approved the work.
    pub approved: bool,
    /// Reviewer identity.
    pub reviewed_by: ActorId,
    /// Review timestamp.
    pub reviewed_at: DateTime<Utc>,
    /// Free-form reviewer comments.
    pub comments: Option<String>,
}

/// Outcome of a review, for side-effect dispatch by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// Work approved; the task is now completed.
    Approved,
    /// Work sent back to the assignee for revisions.
    RevisionsRequested,
}

/// Parameter object for constructing a new task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTaskData {
    /// Display name of the task.
    pub name: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// Category of work.
    pub task_type: TaskType,
    /// Scheduling priority.
    pub priority: Priority,
    /// Owning manager.
    pub owner: ActorId,
    /// Property the work belongs to.
    pub property_id: PropertyId,
    /// First assignee to offer the task to.
    pub primary_assignee: Option<ActorId>,
    /// Assignee to escalate to when the primary rejects.
    pub fallback_assignee: Option<ActorId>,
    /// Designated reviewer; the owner reviews when unset.
    pub inspector: Option<ActorId>,
    /// Due date; required when a recurrence rule is attached.
    pub scheduled_date: Option<NaiveDate>,
    /// Checklist items in display order.
    pub checklist: Vec<ChecklistItem>,
    /// Optional recurrence definition.
    pub recurrence: Option<RecurrenceRule>,
}

/// Task aggregate root.
///
/// All mutation goes through the methods below; the service layer persists
/// the whole record after each operation (whole-record replace, guarded by
/// the revision counter at the store).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    id: TaskId,
    name: String,
    description: Option<String>,
    task_type: TaskType,
    priority: Priority,
    status: TaskStatus,
    assignment: AssignmentStatus,
    primary_assignee: Option<ActorId>,
    fallback_assignee: Option<ActorId>,
    assigned_to: Option<ActorId>,
    inspector: Option<ActorId>,
    rejection_count: u32,
    scheduled_date: Option<NaiveDate>,
    checklist: Vec<ChecklistItem>,
    recurrence: Option<RecurrenceRule>,
    inspection: Option<InspectionRecord>,
    proofs: Vec<String>,
    last_proof_url: Option<String>,
    owner: ActorId,
    property_id: PropertyId,
    submitted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    revision: u64,
}

impl TaskRecord {
    /// Creates a new task record.
    ///
    /// Prototype records start outside the offer flow. Otherwise a task with
    /// a pre-selected primary assignee starts `Pending`/`PendingPrimary`;
    /// without one it starts `Unassigned`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTaskName`] when the name is blank and
    /// [`TaskDomainError::MissingDueDate`] when a recurrence rule is attached
    /// without a scheduled date.
    pub fn new(data: NewTaskData, clock: &impl Clock) -> Result<Self, TaskDomainError> {
        let name = data.name.trim().to_owned();
        if name.is_empty() {
            return Err(TaskDomainError::EmptyTaskName);
        }

        let id = TaskId::new();
        if data.recurrence.is_some() && data.scheduled_date.is_none() {
            return Err(TaskDomainError::MissingDueDate(id));
        }

        let is_prototype = data
            .recurrence
            .as_ref()
            .is_some_and(RecurrenceRule::is_prototype);
        let (status, assignment) = if is_prototype {
            (TaskStatus::Unassigned, AssignmentStatus::Unassigned)
        } else if data.primary_assignee.is_some() {
            (TaskStatus::Pending, AssignmentStatus::PendingPrimary)
        } else {
            (TaskStatus::Unassigned, AssignmentStatus::Unassigned)
        };

        let timestamp = clock.utc();
        Ok(Self {
            id,
            name,
            description: data.description,
            task_type: data.task_type,
            priority: data.priority,
            status,
            assignment,
            primary_assignee: data.primary_assignee,
            fallback_assignee: data.fallback_assignee,
            assigned_to: None,
            inspector: data.inspector,
            rejection_count: 0,
            scheduled_date: data.scheduled_date,
            checklist: data.checklist,
            recurrence: data.recurrence,
            inspection: None,
            proofs: Vec::new(),
            last_proof_url: None,
            owner: data.owner,
            property_id: data.property_id,
            submitted_at: None,
            created_at: timestamp,
            updated_at: timestamp,
            revision: 0,
        })
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the category of work.
    #[must_use]
    pub const fn task_type(&self) -> TaskType {
        self.task_type
    }

    /// Returns the scheduling priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the work lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the offer/acceptance state.
    #[must_use]
    pub const fn assignment(&self) -> AssignmentStatus {
        self.assignment
    }

    /// Returns the primary assignee, if configured.
    #[must_use]
    pub const fn primary_assignee(&self) -> Option<&ActorId> {
        self.primary_assignee.as_ref()
    }

    /// Returns the fallback assignee, if configured.
    #[must_use]
    pub const fn fallback_assignee(&self) -> Option<&ActorId> {
        self.fallback_assignee.as_ref()
    }

    /// Returns the actor currently working the task, if any.
    #[must_use]
    pub const fn assigned_to(&self) -> Option<&ActorId> {
        self.assigned_to.as_ref()
    }

    /// Returns the designated inspector, if configured.
    #[must_use]
    pub const fn inspector(&self) -> Option<&ActorId> {
        self.inspector.as_ref()
    }

    /// Returns the actor authorised to review this task.
    ///
    /// The designated inspector when set, otherwise the owner.
    #[must_use]
    pub fn reviewer(&self) -> &ActorId {
        self.inspector.as_ref().unwrap_or(&self.owner)
    }

    /// Number of rejections recorded over the task's lifetime.
    ///
    /// Monotone audit counter, never reset.
    #[must_use]
    pub const fn rejection_count(&self) -> u32 {
        self.rejection_count
    }

    /// Returns the due date, if set.
    #[must_use]
    pub const fn scheduled_date(&self) -> Option<NaiveDate> {
        self.scheduled_date
    }

    /// Returns the checklist in display order.
    #[must_use]
    pub fn checklist(&self) -> &[ChecklistItem] {
        &self.checklist
    }

    /// Returns the recurrence rule, if attached.
    #[must_use]
    pub const fn recurrence(&self) -> Option<&RecurrenceRule> {
        self.recurrence.as_ref()
    }

    /// Returns the recorded inspection result, if any.
    #[must_use]
    pub const fn inspection(&self) -> Option<&InspectionRecord> {
        self.inspection.as_ref()
    }

    /// Returns the proof URL trail.
    #[must_use]
    pub fn proofs(&self) -> &[String] {
        &self.proofs
    }

    /// Returns the most recent proof URL, if any.
    #[must_use]
    pub fn last_proof_url(&self) -> Option<&str> {
        self.last_proof_url.as_deref()
    }

    /// Returns the owning manager.
    #[must_use]
    pub const fn owner(&self) -> &ActorId {
        &self.owner
    }

    /// Returns the property this work belongs to.
    #[must_use]
    pub const fn property_id(&self) -> PropertyId {
        self.property_id
    }

    /// Returns the submission timestamp, if the task was submitted.
    #[must_use]
    pub const fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Optimistic-concurrency token checked by the store on update.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether this record is a recurrence template.
    #[must_use]
    pub fn is_prototype(&self) -> bool {
        self.recurrence
            .as_ref()
            .is_some_and(RecurrenceRule::is_prototype)
    }

    /// Rejects work-state-machine operations on prototype records.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::PrototypeNotWorkable`] for prototypes.
    pub fn guard_workable(&self) -> Result<(), TaskDomainError> {
        if self.is_prototype() {
            return Err(TaskDomainError::PrototypeNotWorkable(self.id));
        }
        Ok(())
    }

    /// Moves the task into `PendingInspection` on behalf of its assignee.
    ///
    /// No checklist gating happens here; inspection itself is the gate.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NotAssignee`] when `actor` is not the
    /// current assignee and [`TaskDomainError::InvalidTransition`] when the
    /// task is not in a submittable state.
    pub fn submit_for_inspection(
        &mut self,
        actor: &ActorId,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if self.assigned_to.as_ref() != Some(actor) {
            return Err(TaskDomainError::NotAssignee {
                task_id: self.id,
                actor: actor.to_string(),
            });
        }
        self.transition_status(TaskStatus::PendingInspection, clock)?;
        self.submitted_at = Some(clock.utc());
        Ok(())
    }

    /// Records a review verdict and moves the task accordingly.
    ///
    /// Approval completes the task; rejection sends it back for revisions.
    /// The inspection record is stored for both verdicts.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NotReviewer`] when `reviewer` is not
    /// authorised and [`TaskDomainError::InvalidTransition`] when the task is
    /// not awaiting inspection.
    pub fn review(
        &mut self,
        reviewer: &ActorId,
        approved: bool,
        comments: Option<String>,
        clock: &impl Clock,
    ) -> Result<ReviewOutcome, TaskDomainError> {
        if self.reviewer() != reviewer {
            return Err(TaskDomainError::NotReviewer {
                task_id: self.id,
                actor: reviewer.to_string(),
            });
        }
        let target = if approved {
            TaskStatus::Completed
        } else {
            TaskStatus::RequiresRevisions
        };
        self.transition_status(target, clock)?;
        self.inspection = Some(InspectionRecord {
            approved,
            reviewed_by: reviewer.clone(),
            reviewed_at: clock.utc(),
            comments,
        });
        Ok(if approved {
            ReviewOutcome::Approved
        } else {
            ReviewOutcome::RevisionsRequested
        })
    }

    /// Applies a partial update to the checklist item at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::ItemIndexOutOfRange`] when `index` does not
    /// address an existing item.
    pub fn update_checklist_item(
        &mut self,
        index: usize,
        patch: &ChecklistItemPatch,
        clock: &impl Clock,
    ) -> Result<ChecklistChange, TaskDomainError> {
        let change = checklist::apply_patch(&mut self.checklist, index, patch)?;
        self.touch(clock);
        Ok(change)
    }

    /// Attaches an uploaded proof URL to the checklist item at `index` and
    /// records it on the task's proof trail.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::ItemIndexOutOfRange`] when `index` does not
    /// address an existing item.
    pub fn attach_proof(
        &mut self,
        index: usize,
        url: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        let len = self.checklist.len();
        let item = self
            .checklist
            .get_mut(index)
            .ok_or(TaskDomainError::ItemIndexOutOfRange { index, len })?;
        let proof_url = url.into();
        item.proof_url.clone_from(&proof_url);
        self.proofs.push(proof_url.clone());
        self.last_proof_url = Some(proof_url);
        self.touch(clock);
        Ok(())
    }

    /// Applies a direct status edit, enforcing the transition table and the
    /// checklist proof gate for `Completed`.
    ///
    /// An edit to `Unassigned` releases the assignment as well: `Accepted`
    /// implies an active status, so the offer state and `assigned_to` are
    /// cleared together with the move.
    ///
    /// Callers are expected to treat a duplicate `Completed` edit as a no-op
    /// before invoking this method.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::ChecklistIncomplete`] when a proof-required
    /// item has no proof attached and [`TaskDomainError::InvalidTransition`]
    /// when the table rejects the move.
    pub fn set_status_direct(
        &mut self,
        to: TaskStatus,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if to == TaskStatus::Completed
            && let Some(index) = checklist::first_blocking_item(&self.checklist)
        {
            return Err(TaskDomainError::ChecklistIncomplete {
                task_id: self.id,
                index,
            });
        }
        self.transition_status(to, clock)?;
        if to == TaskStatus::Unassigned {
            self.assignment = AssignmentStatus::Unassigned;
            self.assigned_to = None;
        }
        Ok(())
    }

    /// Builds the next occurrence of a completed recurring task.
    ///
    /// The successor gets a fresh identifier, `Pending` status, a reset
    /// assignment (offered back to the primary assignee when one is
    /// configured), a cleared checklist and proof trail, and a due date
    /// advanced per the recurrence rule. Tenancy fields carry over.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NotRecurring`] without an enabled rule,
    /// [`TaskDomainError::PrototypeNotWorkable`] for prototypes,
    /// [`TaskDomainError::MissingDueDate`] without a baseline due date, and
    /// [`TaskDomainError::DueDateOutOfRange`] when date arithmetic overflows.
    pub fn next_occurrence(&self, clock: &impl Clock) -> Result<Self, TaskDomainError> {
        let rule = self
            .recurrence
            .as_ref()
            .filter(|rule| rule.enabled())
            .ok_or(TaskDomainError::NotRecurring(self.id))?;
        if rule.is_prototype() {
            return Err(TaskDomainError::PrototypeNotWorkable(self.id));
        }
        let current_due = self
            .scheduled_date
            .ok_or(TaskDomainError::MissingDueDate(self.id))?;
        let next_due = recurrence::compute_next_due_date(self.id, current_due, rule)?;

        let mut next_checklist = self.checklist.clone();
        for item in &mut next_checklist {
            item.reset_for_new_occurrence();
        }
        let assignment = if self.primary_assignee.is_some() {
            AssignmentStatus::PendingPrimary
        } else {
            AssignmentStatus::Unassigned
        };

        let timestamp = clock.utc();
        Ok(Self {
            id: TaskId::new(),
            name: self.name.clone(),
            description: self.description.clone(),
            task_type: self.task_type,
            priority: self.priority,
            status: TaskStatus::Pending,
            assignment,
            primary_assignee: self.primary_assignee.clone(),
            fallback_assignee: self.fallback_assignee.clone(),
            assigned_to: None,
            inspector: self.inspector.clone(),
            rejection_count: 0,
            scheduled_date: Some(next_due),
            checklist: next_checklist,
            recurrence: Some(rule.for_next_occurrence()),
            inspection: None,
            proofs: Vec::new(),
            last_proof_url: None,
            owner: self.owner.clone(),
            property_id: self.property_id,
            submitted_at: None,
            created_at: timestamp,
            updated_at: timestamp,
            revision: 0,
        })
    }

    /// Bumps the optimistic-concurrency token ahead of a store update.
    pub(crate) const fn bump_revision(&mut self) {
        self.revision += 1;
    }

    /// Marks the offer accepted by `actor`.
    pub(crate) fn apply_acceptance(&mut self, actor: &ActorId, clock: &impl Clock) {
        self.status = TaskStatus::Pending;
        self.assignment = AssignmentStatus::Accepted;
        self.assigned_to = Some(actor.clone());
        self.touch(clock);
    }

    /// Re-offers the task to the fallback assignee after a primary rejection.
    pub(crate) fn escalate_to_fallback(&mut self, clock: &impl Clock) {
        self.rejection_count += 1;
        self.assignment = AssignmentStatus::PendingFallback;
        self.touch(clock);
    }

    /// Marks automatic assignment exhausted after the final rejection.
    pub(crate) fn mark_offer_exhausted(&mut self, clock: &impl Clock) {
        self.rejection_count += 1;
        self.status = TaskStatus::Unassigned;
        self.assignment = AssignmentStatus::Rejected;
        self.touch(clock);
    }

    fn transition_status(
        &mut self,
        to: TaskStatus,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if !self.status.can_transition_to(to) {
            return Err(TaskDomainError::InvalidTransition {
                task_id: self.id,
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.touch(clock);
        Ok(())
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
