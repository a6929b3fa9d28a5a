//! Domain model for the task lifecycle and recurrence engine.
//!
//! Pure business types: the task aggregate and its embedded checklist,
//! offer-response resolution with fallback escalation, the proof gate, and
//! recurrence date arithmetic. Infrastructure stays outside this boundary.

mod assignment;
pub mod checklist;
mod error;
mod ids;
pub mod recurrence;
mod task;

pub use assignment::{OfferOutcome, OfferResponse, resolve_response};
pub use checklist::{ChecklistChange, ChecklistItem, ChecklistItemPatch};
pub use error::{ParseAssignmentStatusError, ParseTaskStatusError, TaskDomainError};
pub use ids::{ActorId, PropertyId, TaskId};
pub use recurrence::{Frequency, RecurrenceRule, compute_next_due_date};
pub use task::{
    AssignmentStatus, InspectionRecord, NewTaskData, Priority, ReviewOutcome, TaskRecord,
    TaskStatus, TaskType,
};
