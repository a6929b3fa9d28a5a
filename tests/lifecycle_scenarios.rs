//! End-to-end lifecycle scenarios through the public service API.
//!
//! Each scenario drives the service against the in-memory adapters the way
//! a property manager and their cleaners would: creating tasks, resolving
//! offers, working checklists, and completing recurring work.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]
#![expect(
    clippy::cognitive_complexity,
    reason = "Test functions may have higher complexity for full scenario coverage"
)]

use std::sync::Arc;

use mockable::DefaultClock;
use tokio::runtime::Runtime;
use turnkey::task::{
    adapters::memory::{
        InMemoryBlobStore, InMemoryTaskStore, RecordingActivityLog, RecordingNotifier,
    },
    domain::{
        ActorId, AssignmentStatus, ChecklistItem, Frequency, PropertyId, RecurrenceRule,
        TaskStatus, TaskType,
    },
    ports::{ActivityLog, NotificationEvent, Notifier},
    services::{CreateTaskRequest, TaskLifecycleError, TaskLifecycleService},
};

/// Creates a tokio runtime for async operations in tests.
fn test_runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to create test runtime")
}

struct World {
    service: TaskLifecycleService<InMemoryTaskStore, DefaultClock>,
    store: Arc<InMemoryTaskStore>,
    notifier: Arc<RecordingNotifier>,
    activity: Arc<RecordingActivityLog>,
    property_id: PropertyId,
}

fn world() -> World {
    let store = Arc::new(InMemoryTaskStore::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let activity = Arc::new(RecordingActivityLog::new());
    let service = TaskLifecycleService::new(
        Arc::clone(&store),
        Arc::new(DefaultClock),
        Arc::clone(&notifier) as Arc<dyn Notifier>,
        Arc::clone(&activity) as Arc<dyn ActivityLog>,
        Arc::new(InMemoryBlobStore::new()),
    );
    World {
        service,
        store,
        notifier,
        activity,
        property_id: PropertyId::new(),
    }
}

fn actor(name: &str) -> ActorId {
    ActorId::new(name).expect("valid actor id")
}

fn date(year: i32, month: u32, day: u32) -> chrono::NaiveDate {
    chrono::NaiveDate::from_ymd_opt(year, month, day).expect("valid calendar date")
}

fn offered_request(world: &World) -> CreateTaskRequest {
    CreateTaskRequest::new(
        "Turnover clean - unit 4B",
        TaskType::Cleaning,
        "manager-1",
        world.property_id,
    )
    .with_primary_assignee("alice")
    .with_fallback_assignee("bob")
}

/// A primary rejection escalates the offer to the configured fallback.
#[test]
fn primary_rejection_escalates_to_the_fallback() {
    let rt = test_runtime();
    let world = world();

    let task = rt
        .block_on(world.service.create_task(offered_request(&world)))
        .expect("task creation should succeed");
    let rejected = rt
        .block_on(world.service.respond_to_offer(task.id(), "alice", "rejected"))
        .expect("primary rejection should succeed");

    assert_eq!(rejected.assignment(), AssignmentStatus::PendingFallback);
    assert_eq!(rejected.rejection_count(), 1);
    let sent_to_bob = world
        .notifier
        .sent_to(&actor("bob"))
        .expect("notifier snapshot");
    assert!(matches!(
        sent_to_bob.as_slice(),
        [NotificationEvent::OfferExtended { task_id, .. }] if *task_id == task.id()
    ));
}

/// A fallback rejection exhausts automatic assignment and alerts the admins.
#[test]
fn fallback_rejection_exhausts_the_offer_chain() {
    let rt = test_runtime();
    let world = world();

    let task = rt
        .block_on(world.service.create_task(offered_request(&world)))
        .expect("task creation should succeed");
    rt.block_on(world.service.respond_to_offer(task.id(), "alice", "rejected"))
        .expect("primary rejection should succeed");
    let exhausted = rt
        .block_on(world.service.respond_to_offer(task.id(), "bob", "rejected"))
        .expect("fallback rejection should succeed");

    assert_eq!(exhausted.assignment(), AssignmentStatus::Rejected);
    assert_eq!(exhausted.status(), TaskStatus::Unassigned);
    assert_eq!(exhausted.rejection_count(), 2);
    let admin_events = world.notifier.sent_to_admins().expect("notifier snapshot");
    assert!(matches!(
        admin_events.as_slice(),
        [NotificationEvent::AssignmentExhausted {
            rejection_count: 2,
            ..
        }]
    ));
}

/// Completion is blocked until the required proof is attached, then succeeds.
#[test]
fn proof_gate_blocks_then_admits_completion() {
    let rt = test_runtime();
    let world = world();

    let request = offered_request(&world)
        .with_checklist([ChecklistItem::new("photograph kitchen").requiring_proof()]);
    let task = rt
        .block_on(world.service.create_task(request))
        .expect("task creation should succeed");
    rt.block_on(world.service.respond_to_offer(task.id(), "alice", "accepted"))
        .expect("acceptance should succeed");

    let blocked = rt.block_on(world.service.set_status(task.id(), "alice", "completed"));
    assert!(matches!(
        blocked,
        Err(TaskLifecycleError::PreconditionFailed(_))
    ));

    rt.block_on(world.service.attach_proof(
        task.id(),
        "alice",
        0,
        "kitchen.jpg",
        vec![0xFF, 0xD8],
    ))
    .expect("proof attachment should succeed");
    let completed = rt
        .block_on(world.service.set_status(task.id(), "alice", "completed"))
        .expect("completion should succeed once proof is attached");

    assert_eq!(completed.status(), TaskStatus::Completed);
}

/// Completing a fortnightly task spawns a successor two weeks out.
#[test]
fn completed_recurring_task_spawns_the_next_occurrence() {
    let rt = test_runtime();
    let world = world();

    let rule = RecurrenceRule::new(Frequency::Weekly, 2).expect("valid rule");
    let request = offered_request(&world)
        .with_scheduled_date(date(2025, 7, 10))
        .with_recurrence(rule);
    let task = rt
        .block_on(world.service.create_task(request))
        .expect("task creation should succeed");
    rt.block_on(world.service.respond_to_offer(task.id(), "alice", "accepted"))
        .expect("acceptance should succeed");

    rt.block_on(world.service.set_status(task.id(), "alice", "completed"))
        .expect("completion should succeed");

    let tasks = rt
        .block_on(world.service.list_for_property(world.property_id))
        .expect("listing should succeed");
    let successor = tasks
        .iter()
        .find(|t| t.id() != task.id())
        .expect("a successor was spawned");
    assert_eq!(successor.scheduled_date(), Some(date(2025, 7, 24)));
    assert_eq!(successor.status(), TaskStatus::Pending);
    assert_eq!(successor.assignment(), AssignmentStatus::PendingPrimary);
    assert_eq!(world.store.len().expect("store snapshot"), 2);
}

/// A stranger's offer response is denied and mutates nothing.
#[test]
fn stranger_responses_are_denied_without_side_effects() {
    let rt = test_runtime();
    let world = world();

    let task = rt
        .block_on(world.service.create_task(offered_request(&world)))
        .expect("task creation should succeed");
    let notifications_before = world.notifier.sent().expect("notifier snapshot").len();

    let result = rt.block_on(world.service.respond_to_offer(task.id(), "mallory", "accepted"));

    assert!(matches!(result, Err(TaskLifecycleError::PermissionDenied(_))));
    let stored = rt
        .block_on(world.service.find_task(task.id()))
        .expect("lookup should succeed")
        .expect("task present");
    assert_eq!(stored, task, "denied responses leave the task untouched");
    let notifications_after = world.notifier.sent().expect("notifier snapshot").len();
    assert_eq!(notifications_after, notifications_before);
    assert!(
        world
            .activity
            .entries()
            .expect("activity snapshot")
            .is_empty()
    );
}

/// The full happy path: offer, accept, submit, approve.
#[test]
fn inspection_flow_completes_the_task() {
    let rt = test_runtime();
    let world = world();

    let request = offered_request(&world).with_inspector("inspector-1");
    let task = rt
        .block_on(world.service.create_task(request))
        .expect("task creation should succeed");
    rt.block_on(world.service.respond_to_offer(task.id(), "alice", "accepted"))
        .expect("acceptance should succeed");
    rt.block_on(world.service.submit_for_inspection(task.id(), "alice"))
        .expect("submission should succeed");

    // The owner is not the reviewer once an inspector is designated.
    let denied = rt.block_on(world.service.review_task(task.id(), "manager-1", true, None));
    assert!(matches!(
        denied,
        Err(TaskLifecycleError::PermissionDenied(_))
    ));

    let reviewed = rt
        .block_on(world.service.review_task(task.id(), "inspector-1", true, None))
        .expect("review should succeed");
    assert_eq!(reviewed.status(), TaskStatus::Completed);
    let record = reviewed.inspection().expect("inspection recorded");
    assert!(record.approved);
    assert_eq!(record.reviewed_by, actor("inspector-1"));
}
