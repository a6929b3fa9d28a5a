//! Unit tests for offer-response resolution and fallback escalation.

use super::support::{actor, offered_task, offered_task_data, task_data};
use crate::task::domain::{
    AssignmentStatus, OfferOutcome, OfferResponse, TaskDomainError, TaskRecord, TaskStatus,
    resolve_response,
};
use eyre::{bail, ensure};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

#[fixture]
fn clock() -> DefaultClock {
    DefaultClock
}

#[rstest]
#[case("accepted", OfferResponse::Accepted)]
#[case(" Rejected ", OfferResponse::Rejected)]
fn response_parsing_normalises_input(
    #[case] raw: &str,
    #[case] expected: OfferResponse,
) -> eyre::Result<()> {
    ensure!(OfferResponse::try_from(raw)? == expected);
    Ok(())
}

#[rstest]
fn response_parsing_rejects_unknown_verbs() {
    let result = OfferResponse::try_from("maybe");
    assert_eq!(
        result,
        Err(TaskDomainError::InvalidResponse("maybe".to_owned()))
    );
}

#[rstest]
fn primary_acceptance_assigns_the_work(clock: DefaultClock) -> eyre::Result<()> {
    let mut task = offered_task(&clock);
    let alice = actor("alice");

    let outcome = resolve_response(&mut task, &alice, OfferResponse::Accepted, &clock)?;

    ensure!(outcome == OfferOutcome::Accepted);
    ensure!(task.status() == TaskStatus::Pending);
    ensure!(task.assignment() == AssignmentStatus::Accepted);
    ensure!(task.assigned_to() == Some(&alice));
    ensure!(task.rejection_count() == 0);
    Ok(())
}

#[rstest]
fn primary_rejection_escalates_to_fallback(clock: DefaultClock) -> eyre::Result<()> {
    let mut task = offered_task(&clock);

    let outcome = resolve_response(&mut task, &actor("alice"), OfferResponse::Rejected, &clock)?;

    ensure!(outcome == OfferOutcome::EscalatedToFallback);
    ensure!(task.assignment() == AssignmentStatus::PendingFallback);
    ensure!(task.status() == TaskStatus::Pending, "status is untouched");
    ensure!(task.rejection_count() == 1);
    ensure!(task.assigned_to().is_none());
    Ok(())
}

#[rstest]
fn fallback_rejection_exhausts_automatic_assignment(clock: DefaultClock) -> eyre::Result<()> {
    let mut task = offered_task(&clock);
    resolve_response(&mut task, &actor("alice"), OfferResponse::Rejected, &clock)?;

    let outcome = resolve_response(&mut task, &actor("bob"), OfferResponse::Rejected, &clock)?;

    ensure!(outcome == OfferOutcome::Exhausted);
    ensure!(task.assignment() == AssignmentStatus::Rejected);
    ensure!(task.status() == TaskStatus::Unassigned);
    ensure!(task.rejection_count() == 2);
    Ok(())
}

#[rstest]
fn fallback_can_accept_after_primary_rejection(clock: DefaultClock) -> eyre::Result<()> {
    let mut task = offered_task(&clock);
    resolve_response(&mut task, &actor("alice"), OfferResponse::Rejected, &clock)?;
    let bob = actor("bob");

    let outcome = resolve_response(&mut task, &bob, OfferResponse::Accepted, &clock)?;

    ensure!(outcome == OfferOutcome::Accepted);
    ensure!(task.assigned_to() == Some(&bob));
    ensure!(task.rejection_count() == 1, "audit counter is never reset");
    Ok(())
}

#[rstest]
fn primary_rejection_without_fallback_exhausts_immediately(
    clock: DefaultClock,
) -> eyre::Result<()> {
    let mut data = task_data();
    data.primary_assignee = Some(actor("alice"));
    let mut task = TaskRecord::new(data, &clock)?;

    let outcome = resolve_response(&mut task, &actor("alice"), OfferResponse::Rejected, &clock)?;

    ensure!(outcome == OfferOutcome::Exhausted);
    ensure!(task.assignment() == AssignmentStatus::Rejected);
    ensure!(task.status() == TaskStatus::Unassigned);
    ensure!(task.rejection_count() == 1);
    Ok(())
}

#[rstest]
fn stranger_response_is_rejected_without_mutation(clock: DefaultClock) -> eyre::Result<()> {
    let mut task = offered_task(&clock);
    let before = task.clone();

    let result = resolve_response(&mut task, &actor("mallory"), OfferResponse::Accepted, &clock);

    let Err(TaskDomainError::NotCurrentOfferee { assignment, .. }) = result else {
        bail!("expected NotCurrentOfferee, got {result:?}");
    };
    ensure!(assignment == AssignmentStatus::PendingPrimary);
    ensure!(task == before);
    Ok(())
}

#[rstest]
fn fallback_cannot_respond_while_offer_sits_with_primary(
    clock: DefaultClock,
) -> eyre::Result<()> {
    let mut task = offered_task(&clock);

    let result = resolve_response(&mut task, &actor("bob"), OfferResponse::Accepted, &clock);

    ensure!(matches!(
        result,
        Err(TaskDomainError::NotCurrentOfferee { .. })
    ));
    Ok(())
}

#[rstest]
fn repeated_acceptance_is_a_benign_no_op(clock: DefaultClock) -> eyre::Result<()> {
    let mut task = offered_task(&clock);
    let alice = actor("alice");
    resolve_response(&mut task, &alice, OfferResponse::Accepted, &clock)?;
    let before = task.clone();

    let outcome = resolve_response(&mut task, &alice, OfferResponse::Accepted, &clock)?;

    ensure!(outcome == OfferOutcome::AlreadyResolved);
    ensure!(task == before);
    Ok(())
}

#[rstest]
fn primary_rejection_retry_after_escalation_is_a_benign_no_op(
    clock: DefaultClock,
) -> eyre::Result<()> {
    let mut task = offered_task(&clock);
    let alice = actor("alice");
    resolve_response(&mut task, &alice, OfferResponse::Rejected, &clock)?;
    let before = task.clone();

    let outcome = resolve_response(&mut task, &alice, OfferResponse::Rejected, &clock)?;

    ensure!(outcome == OfferOutcome::AlreadyResolved);
    ensure!(task == before, "no double escalation on retry");
    ensure!(task.rejection_count() == 1);
    Ok(())
}

#[rstest]
fn fallback_rejection_retry_after_exhaustion_is_a_benign_no_op(
    clock: DefaultClock,
) -> eyre::Result<()> {
    let mut task = offered_task(&clock);
    resolve_response(&mut task, &actor("alice"), OfferResponse::Rejected, &clock)?;
    let bob = actor("bob");
    resolve_response(&mut task, &bob, OfferResponse::Rejected, &clock)?;
    let before = task.clone();

    let outcome = resolve_response(&mut task, &bob, OfferResponse::Rejected, &clock)?;

    ensure!(outcome == OfferOutcome::AlreadyResolved);
    ensure!(task == before);
    ensure!(task.rejection_count() == 2);
    Ok(())
}

#[rstest]
fn acceptance_retry_by_a_different_actor_is_still_denied(
    clock: DefaultClock,
) -> eyre::Result<()> {
    let mut task = offered_task(&clock);
    resolve_response(&mut task, &actor("alice"), OfferResponse::Accepted, &clock)?;

    let result = resolve_response(&mut task, &actor("bob"), OfferResponse::Accepted, &clock);

    ensure!(matches!(
        result,
        Err(TaskDomainError::NotCurrentOfferee { .. })
    ));
    Ok(())
}

#[rstest]
fn offered_task_fixture_starts_as_an_open_offer(clock: DefaultClock) {
    let data = offered_task_data();
    assert!(data.primary_assignee.is_some());
    let task = offered_task(&clock);
    assert_eq!(task.assignment(), AssignmentStatus::PendingPrimary);
    assert_eq!(task.status(), TaskStatus::Pending);
}
