//! Error types for task domain validation and state transitions.

use super::{AssignmentStatus, TaskId, TaskStatus};
use thiserror::Error;

/// Errors returned while constructing or mutating domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The actor identifier is missing or blank.
    #[error("actor identifier must not be empty")]
    MissingActor,

    /// The task name is empty after trimming.
    #[error("task name must not be empty")]
    EmptyTaskName,

    /// The offer response value is not a recognised accept/reject verb.
    #[error("invalid offer response '{0}', expected 'accepted' or 'rejected'")]
    InvalidResponse(String),

    /// The actor is not the assignee currently holding the offer.
    #[error("actor '{actor}' does not hold the current offer for task {task_id} ({assignment})")]
    NotCurrentOfferee {
        /// Task whose offer was responded to.
        task_id: TaskId,
        /// Actor that attempted the response.
        actor: String,
        /// Assignment state at the time of the attempt.
        assignment: AssignmentStatus,
    },

    /// The actor is not the assignee working the task.
    #[error("actor '{actor}' is not assigned to task {task_id}")]
    NotAssignee {
        /// Task being acted upon.
        task_id: TaskId,
        /// Actor that attempted the action.
        actor: String,
    },

    /// The actor is not authorised to review the task.
    #[error("actor '{actor}' is not the designated reviewer for task {task_id}")]
    NotReviewer {
        /// Task being reviewed.
        task_id: TaskId,
        /// Actor that attempted the review.
        actor: String,
    },

    /// The actor does not own the task.
    #[error("actor '{actor}' does not own task {task_id}")]
    NotOwner {
        /// Task being acted upon.
        task_id: TaskId,
        /// Actor that attempted the action.
        actor: String,
    },

    /// A recurring prototype was driven through the work state machine.
    #[error("task {0} is a recurrence prototype and cannot be worked")]
    PrototypeNotWorkable(TaskId),

    /// The requested status change is not permitted by the state machine.
    #[error("invalid status transition for task {task_id}: {from} -> {to}")]
    InvalidTransition {
        /// Task whose transition was rejected.
        task_id: TaskId,
        /// Status before the attempted transition.
        from: TaskStatus,
        /// Requested target status.
        to: TaskStatus,
    },

    /// A proof-required checklist item is missing its proof.
    #[error("checklist item {index} of task {task_id} requires proof before completion")]
    ChecklistIncomplete {
        /// Task whose completion was blocked.
        task_id: TaskId,
        /// Index of the first blocking item.
        index: usize,
    },

    /// A checklist item index fell outside the checklist bounds.
    #[error("checklist index {index} is out of range for a checklist of {len} items")]
    ItemIndexOutOfRange {
        /// Requested item index.
        index: usize,
        /// Checklist length at the time of the request.
        len: usize,
    },

    /// The recurrence interval is not a positive integer.
    #[error("recurrence interval must be at least 1, got {0}")]
    InvalidInterval(u32),

    /// A recurrence rule was attached without a baseline due date.
    #[error("task {0} has a recurrence rule but no scheduled date")]
    MissingDueDate(TaskId),

    /// Recurrence spawning was requested for a non-recurring task.
    #[error("task {0} has no enabled recurrence rule")]
    NotRecurring(TaskId),

    /// Date arithmetic left the representable calendar range.
    #[error("next due date for task {0} is outside the representable date range")]
    DueDateOutOfRange(TaskId),
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing assignment statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown assignment status: {0}")]
pub struct ParseAssignmentStatusError(pub String);
