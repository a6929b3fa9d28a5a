//! Offer-response resolution and fallback escalation.
//!
//! Escalation is a single hop: primary, then fallback, then manual admin
//! handling. Deeper chains are a product decision that has not been taken.

use super::{ActorId, AssignmentStatus, TaskDomainError, TaskRecord};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// An assignee's answer to a work offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferResponse {
    /// The assignee takes the work.
    Accepted,
    /// The assignee declines the work.
    Rejected,
}

impl TryFrom<&str> for OfferResponse {
    type Error = TaskDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            _ => Err(TaskDomainError::InvalidResponse(value.to_owned())),
        }
    }
}

/// What an offer response did to the task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferOutcome {
    /// The responding assignee accepted and now holds the work.
    Accepted,
    /// The primary rejected; the offer moved to the fallback assignee.
    EscalatedToFallback,
    /// The last configured assignee rejected; manual intervention required.
    Exhausted,
    /// The actor's response had already been applied; nothing changed.
    ///
    /// Covers retries after an ambiguous network failure, where the actor's
    /// own earlier attempt is the most likely cause of the state mismatch.
    AlreadyResolved,
}

/// Resolves an assignee's response to the offer currently held on `task`.
///
/// Only the assignee the offer currently sits with may respond: the primary
/// while the assignment is `PendingPrimary`, the fallback while it is
/// `PendingFallback`. A response that the task state shows was already
/// applied resolves to [`OfferOutcome::AlreadyResolved`] without mutation.
///
/// # Errors
///
/// Returns [`TaskDomainError::NotCurrentOfferee`] when `actor` does not hold
/// the current offer.
pub fn resolve_response(
    task: &mut TaskRecord,
    actor: &ActorId,
    response: OfferResponse,
    clock: &impl Clock,
) -> Result<OfferOutcome, TaskDomainError> {
    match task.assignment() {
        AssignmentStatus::PendingPrimary if task.primary_assignee() == Some(actor) => {
            Ok(respond(task, actor, response, true, clock))
        }
        AssignmentStatus::PendingFallback if task.fallback_assignee() == Some(actor) => {
            Ok(respond(task, actor, response, false, clock))
        }
        assignment if is_already_applied(task, actor, response, assignment) => {
            Ok(OfferOutcome::AlreadyResolved)
        }
        assignment => Err(TaskDomainError::NotCurrentOfferee {
            task_id: task.id(),
            actor: actor.to_string(),
            assignment,
        }),
    }
}

fn respond(
    task: &mut TaskRecord,
    actor: &ActorId,
    response: OfferResponse,
    from_primary: bool,
    clock: &impl Clock,
) -> OfferOutcome {
    match response {
        OfferResponse::Accepted => {
            task.apply_acceptance(actor, clock);
            OfferOutcome::Accepted
        }
        OfferResponse::Rejected => {
            if from_primary && task.fallback_assignee().is_some() {
                task.escalate_to_fallback(clock);
                OfferOutcome::EscalatedToFallback
            } else {
                task.mark_offer_exhausted(clock);
                OfferOutcome::Exhausted
            }
        }
    }
}

/// Whether the task state shows this exact response was already processed.
fn is_already_applied(
    task: &TaskRecord,
    actor: &ActorId,
    response: OfferResponse,
    assignment: AssignmentStatus,
) -> bool {
    match (assignment, response) {
        // The actor accepted earlier and still holds the work.
        (AssignmentStatus::Accepted, OfferResponse::Accepted) => {
            task.assigned_to() == Some(actor)
        }
        // The primary's rejection already escalated to the fallback.
        (AssignmentStatus::PendingFallback, OfferResponse::Rejected) => {
            task.primary_assignee() == Some(actor)
        }
        // The final rejection already exhausted automatic assignment.
        (AssignmentStatus::Rejected, OfferResponse::Rejected) => {
            task.primary_assignee() == Some(actor) || task.fallback_assignee() == Some(actor)
        }
        _ => false,
    }
}
