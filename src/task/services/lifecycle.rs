//! Orchestration service for the task lifecycle state machine.
//!
//! Every operation follows the same shape: validate and authorise before any
//! mutation, apply the domain transition, write the whole record back under
//! a revision check, then dispatch notifications and activity records
//! fire-and-forget. Side-effect failures are logged and never fail the
//! primary state change.

use crate::task::{
    domain::{
        ActorId, AssignmentStatus, ChecklistItem, ChecklistItemPatch, NewTaskData, OfferOutcome,
        OfferResponse, Priority, PropertyId, RecurrenceRule, ReviewOutcome, TaskDomainError,
        TaskId, TaskRecord, TaskStatus, TaskType, resolve_response,
    },
    ports::{
        ActivityAction, ActivityEntry, ActivityLog, BlobStore, BlobStoreError, NotificationEvent,
        Notifier, TaskStore, TaskStoreError,
    },
};
use chrono::NaiveDate;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    name: String,
    description: Option<String>,
    task_type: TaskType,
    priority: Priority,
    owner: String,
    property_id: PropertyId,
    primary_assignee: Option<String>,
    fallback_assignee: Option<String>,
    inspector: Option<String>,
    scheduled_date: Option<NaiveDate>,
    checklist: Vec<ChecklistItem>,
    recurrence: Option<RecurrenceRule>,
}

impl CreateTaskRequest {
    /// Creates a request with required fields and `Medium` priority.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        task_type: TaskType,
        owner: impl Into<String>,
        property_id: PropertyId,
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            task_type,
            priority: Priority::Medium,
            owner: owner.into(),
            property_id,
            primary_assignee: None,
            fallback_assignee: None,
            inspector: None,
            scheduled_date: None,
            checklist: Vec::new(),
            recurrence: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the scheduling priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Pre-selects the primary assignee; the task starts as an open offer.
    #[must_use]
    pub fn with_primary_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.primary_assignee = Some(assignee.into());
        self
    }

    /// Configures the fallback assignee for rejection escalation.
    #[must_use]
    pub fn with_fallback_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.fallback_assignee = Some(assignee.into());
        self
    }

    /// Designates the reviewer; the owner reviews when unset.
    #[must_use]
    pub fn with_inspector(mut self, inspector: impl Into<String>) -> Self {
        self.inspector = Some(inspector.into());
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_scheduled_date(mut self, date: NaiveDate) -> Self {
        self.scheduled_date = Some(date);
        self
    }

    /// Sets the checklist in display order.
    #[must_use]
    pub fn with_checklist(mut self, items: impl IntoIterator<Item = ChecklistItem>) -> Self {
        self.checklist = items.into_iter().collect();
        self
    }

    /// Attaches a recurrence rule; requires a scheduled date.
    #[must_use]
    pub fn with_recurrence(mut self, rule: RecurrenceRule) -> Self {
        self.recurrence = Some(rule);
        self
    }
}

/// Service-level failures, classified for the caller.
///
/// Variants are the error taxonomy the UI renders; `Display` carries the
/// human-readable reason.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// No usable actor identity accompanied the request.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// The actor lacks authority for this task or action.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The task does not exist.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The input was malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A state-machine guard rejected the operation.
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    /// A concurrent write won; the caller should re-read and retry.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Blob storage failed while attaching proof.
    #[error(transparent)]
    Blob(#[from] BlobStoreError),

    /// Persistence-layer failure outside the taxonomy.
    #[error(transparent)]
    Store(TaskStoreError),
}

impl TaskLifecycleError {
    /// Stable taxonomy label for callers mapping errors onto responses.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Unauthenticated(_) => "unauthenticated",
            Self::PermissionDenied(_) => "permission_denied",
            Self::NotFound(_) => "not_found",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::PreconditionFailed(_) => "precondition_failed",
            Self::Conflict(_) => "conflict",
            Self::Blob(_) | Self::Store(_) => "internal",
        }
    }
}

impl From<TaskDomainError> for TaskLifecycleError {
    fn from(err: TaskDomainError) -> Self {
        let reason = err.to_string();
        match err {
            TaskDomainError::MissingActor => Self::Unauthenticated(reason),
            TaskDomainError::EmptyTaskName
            | TaskDomainError::InvalidResponse(_)
            | TaskDomainError::ItemIndexOutOfRange { .. }
            | TaskDomainError::InvalidInterval(_)
            | TaskDomainError::MissingDueDate(_)
            | TaskDomainError::DueDateOutOfRange(_) => Self::InvalidArgument(reason),
            TaskDomainError::NotCurrentOfferee { .. }
            | TaskDomainError::NotAssignee { .. }
            | TaskDomainError::NotReviewer { .. }
            | TaskDomainError::NotOwner { .. } => Self::PermissionDenied(reason),
            TaskDomainError::PrototypeNotWorkable(_)
            | TaskDomainError::InvalidTransition { .. }
            | TaskDomainError::ChecklistIncomplete { .. }
            | TaskDomainError::NotRecurring(_) => Self::PreconditionFailed(reason),
        }
    }
}

impl From<TaskStoreError> for TaskLifecycleError {
    fn from(err: TaskStoreError) -> Self {
        match err {
            TaskStoreError::NotFound(id) => Self::NotFound(id),
            TaskStoreError::RevisionConflict(_) | TaskStoreError::DuplicateTask(_) => {
                Self::Conflict(err.to_string())
            }
            TaskStoreError::Persistence(_) => Self::Store(err),
        }
    }
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle orchestration service.
///
/// Safe to invoke concurrently for different task identifiers; operations on
/// the same task are serialised by the store's revision check.
#[derive(Clone)]
pub struct TaskLifecycleService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
    notifier: Arc<dyn Notifier>,
    activity: Arc<dyn ActivityLog>,
    blobs: Arc<dyn BlobStore>,
}

impl<S, C> TaskLifecycleService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub fn new(
        store: Arc<S>,
        clock: Arc<C>,
        notifier: Arc<dyn Notifier>,
        activity: Arc<dyn ActivityLog>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            store,
            clock,
            notifier,
            activity,
            blobs,
        }
    }

    /// Creates a task and, when a primary assignee was pre-selected, extends
    /// the first offer.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when validation fails or the store
    /// rejects the insert.
    pub async fn create_task(&self, request: CreateTaskRequest) -> TaskLifecycleResult<TaskRecord> {
        let owner = ActorId::new(request.owner)?;
        let primary_assignee = request.primary_assignee.map(ActorId::new).transpose()?;
        let fallback_assignee = request.fallback_assignee.map(ActorId::new).transpose()?;
        let inspector = request.inspector.map(ActorId::new).transpose()?;

        let data = NewTaskData {
            name: request.name,
            description: request.description,
            task_type: request.task_type,
            priority: request.priority,
            owner,
            property_id: request.property_id,
            primary_assignee,
            fallback_assignee,
            inspector,
            scheduled_date: request.scheduled_date,
            checklist: request.checklist,
            recurrence: request.recurrence,
        };
        let task = TaskRecord::new(data, &*self.clock)?;
        self.store.insert(&task).await?;

        if task.assignment() == AssignmentStatus::PendingPrimary
            && let Some(primary) = task.primary_assignee()
        {
            self.dispatch_to(
                primary,
                NotificationEvent::OfferExtended {
                    task_id: task.id(),
                    task_name: task.name().to_owned(),
                },
            )
            .await;
        }
        Ok(task)
    }

    /// Resolves an assignee's accept/reject response to the current offer.
    ///
    /// Acceptance notifies the owner; a primary rejection with a configured
    /// fallback re-offers to the fallback; a final rejection escalates to the
    /// administrators for manual assignment. A response the task state shows
    /// was already applied is a benign no-op.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the actor does not hold the
    /// current offer, the response verb is unknown, the task is missing or a
    /// prototype, or the write loses a revision race.
    pub async fn respond_to_offer(
        &self,
        task_id: TaskId,
        actor: &str,
        response: &str,
    ) -> TaskLifecycleResult<TaskRecord> {
        let actor_id = ActorId::new(actor)?;
        let offer_response = OfferResponse::try_from(response)?;
        let mut task = self.load(task_id).await?;
        task.guard_workable()?;

        let outcome = resolve_response(&mut task, &actor_id, offer_response, &*self.clock)?;
        if outcome == OfferOutcome::AlreadyResolved {
            return Ok(task);
        }
        self.persist(&mut task).await?;

        match outcome {
            OfferOutcome::Accepted => {
                self.dispatch_to(
                    task.owner(),
                    NotificationEvent::OfferAccepted {
                        task_id: task.id(),
                        task_name: task.name().to_owned(),
                        accepted_by: actor_id.clone(),
                    },
                )
                .await;
                self.record_activity(task.id(), actor_id, ActivityAction::OfferAccepted)
                    .await;
            }
            OfferOutcome::EscalatedToFallback => {
                if let Some(fallback) = task.fallback_assignee() {
                    self.dispatch_to(
                        fallback,
                        NotificationEvent::OfferExtended {
                            task_id: task.id(),
                            task_name: task.name().to_owned(),
                        },
                    )
                    .await;
                }
                self.record_activity(task.id(), actor_id, ActivityAction::OfferRejected)
                    .await;
            }
            OfferOutcome::Exhausted => {
                self.dispatch_to_admins(NotificationEvent::AssignmentExhausted {
                    task_id: task.id(),
                    task_name: task.name().to_owned(),
                    rejection_count: task.rejection_count(),
                })
                .await;
                self.record_activity(task.id(), actor_id, ActivityAction::OfferRejected)
                    .await;
            }
            OfferOutcome::AlreadyResolved => {}
        }
        Ok(task)
    }

    /// Submits the task for inspection on behalf of its assignee.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the actor is not the assignee,
    /// the task is missing, a prototype, or not in a submittable state.
    pub async fn submit_for_inspection(
        &self,
        task_id: TaskId,
        actor: &str,
    ) -> TaskLifecycleResult<TaskRecord> {
        let actor_id = ActorId::new(actor)?;
        let mut task = self.load(task_id).await?;
        task.guard_workable()?;

        let previous = task.status();
        task.submit_for_inspection(&actor_id, &*self.clock)?;
        self.persist(&mut task).await?;

        self.dispatch_to(
            task.reviewer(),
            NotificationEvent::InspectionRequested {
                task_id: task.id(),
                task_name: task.name().to_owned(),
            },
        )
        .await;
        self.record_activity(
            task.id(),
            actor_id,
            ActivityAction::StatusChanged {
                from: previous,
                to: task.status(),
            },
        )
        .await;
        Ok(task)
    }

    /// Records a review verdict: approval completes the task (spawning the
    /// next occurrence of a recurring task), rejection sends it back for
    /// revisions and notifies the assignee.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the reviewer is not authorised,
    /// the task is missing, a prototype, or not awaiting inspection.
    pub async fn review_task(
        &self,
        task_id: TaskId,
        reviewer: &str,
        approved: bool,
        comments: Option<String>,
    ) -> TaskLifecycleResult<TaskRecord> {
        let reviewer_id = ActorId::new(reviewer)?;
        let mut task = self.load(task_id).await?;
        task.guard_workable()?;

        let previous = task.status();
        let outcome = task.review(&reviewer_id, approved, comments.clone(), &*self.clock)?;
        self.persist(&mut task).await?;

        match outcome {
            ReviewOutcome::Approved => {
                self.spawn_successor_if_recurring(&task).await;
            }
            ReviewOutcome::RevisionsRequested => {
                if let Some(assignee) = task.assigned_to() {
                    self.dispatch_to(
                        assignee,
                        NotificationEvent::RevisionsRequested {
                            task_id: task.id(),
                            task_name: task.name().to_owned(),
                            comments,
                        },
                    )
                    .await;
                }
            }
        }
        self.record_activity(
            task.id(),
            reviewer_id,
            ActivityAction::StatusChanged {
                from: previous,
                to: task.status(),
            },
        )
        .await;
        Ok(task)
    }

    /// Applies a partial update to a checklist item.
    ///
    /// A flip of the `completed` flag is recorded in the activity log.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the actor may not work the task
    /// or the index is out of range.
    pub async fn update_checklist_item(
        &self,
        task_id: TaskId,
        actor: &str,
        index: usize,
        patch: &ChecklistItemPatch,
    ) -> TaskLifecycleResult<TaskRecord> {
        let actor_id = ActorId::new(actor)?;
        let mut task = self.load(task_id).await?;
        self.authorize_worker(&task, &actor_id)?;

        let change = task.update_checklist_item(index, patch, &*self.clock)?;
        self.persist(&mut task).await?;

        if let Some(completed) = change.completed_flipped_to {
            self.record_activity(
                task.id(),
                actor_id,
                ActivityAction::ChecklistItemToggled { index, completed },
            )
            .await;
        }
        Ok(task)
    }

    /// Uploads proof bytes and attaches the durable URL to a checklist item.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the actor may not work the task,
    /// the index is out of range, or the blob store rejects the upload.
    pub async fn attach_proof(
        &self,
        task_id: TaskId,
        actor: &str,
        index: usize,
        filename: &str,
        bytes: Vec<u8>,
    ) -> TaskLifecycleResult<TaskRecord> {
        let actor_id = ActorId::new(actor)?;
        let mut task = self.load(task_id).await?;
        self.authorize_worker(&task, &actor_id)?;

        // Bounds-check before the upload so a bad index leaves no orphan blob.
        let len = task.checklist().len();
        if index >= len {
            return Err(TaskDomainError::ItemIndexOutOfRange { index, len }.into());
        }

        let path = format!("tasks/{}/{index}/{filename}", task.id());
        let url = self.blobs.upload(&path, bytes).await?;
        task.attach_proof(index, url, &*self.clock)?;
        self.persist(&mut task).await?;
        Ok(task)
    }

    /// Applies a direct status edit (manual "mark complete" and friends).
    ///
    /// Moving to `Completed` is gated on the checklist proof requirements
    /// and, for recurring tasks, spawns the next occurrence exactly once: a
    /// repeat call on an already-completed task is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the actor may not work the task,
    /// the status value is unknown, the proof gate blocks completion, or the
    /// transition table rejects the move.
    pub async fn set_status(
        &self,
        task_id: TaskId,
        actor: &str,
        new_status: &str,
    ) -> TaskLifecycleResult<TaskRecord> {
        let actor_id = ActorId::new(actor)?;
        let to = TaskStatus::try_from(new_status)
            .map_err(|err| TaskLifecycleError::InvalidArgument(err.to_string()))?;
        let mut task = self.load(task_id).await?;
        task.guard_workable()?;
        self.authorize_worker(&task, &actor_id)?;

        if to == TaskStatus::Completed && task.status() == TaskStatus::Completed {
            return Ok(task);
        }

        let previous = task.status();
        task.set_status_direct(to, &*self.clock)?;
        self.persist(&mut task).await?;

        self.record_activity(
            task.id(),
            actor_id,
            ActivityAction::StatusChanged { from: previous, to },
        )
        .await;
        if to == TaskStatus::Completed {
            self.spawn_successor_if_recurring(&task).await;
        }
        Ok(task)
    }

    /// Deletes a task. Owner only; irreversible; spawned recurrence
    /// successors and prototypes are unaffected.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the actor is not the owner or the
    /// task is missing.
    pub async fn delete_task(&self, task_id: TaskId, actor: &str) -> TaskLifecycleResult<()> {
        let actor_id = ActorId::new(actor)?;
        let task = self.load(task_id).await?;
        if task.owner() != &actor_id {
            return Err(TaskDomainError::NotOwner {
                task_id,
                actor: actor_id.to_string(),
            }
            .into());
        }
        self.store.delete(task_id).await?;
        self.record_activity(task_id, actor_id, ActivityAction::TaskDeleted)
            .await;
        Ok(())
    }

    /// Retrieves a task by identifier.
    ///
    /// Returns `Ok(None)` when the task does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Store`] when the lookup fails.
    pub async fn find_task(&self, task_id: TaskId) -> TaskLifecycleResult<Option<TaskRecord>> {
        Ok(self.store.find_by_id(task_id).await?)
    }

    /// Lists all tasks for a property.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Store`] when the query fails.
    pub async fn list_for_property(
        &self,
        property_id: PropertyId,
    ) -> TaskLifecycleResult<Vec<TaskRecord>> {
        Ok(self.store.list_for_property(property_id).await?)
    }

    async fn load(&self, task_id: TaskId) -> TaskLifecycleResult<TaskRecord> {
        self.store
            .find_by_id(task_id)
            .await?
            .ok_or(TaskLifecycleError::NotFound(task_id))
    }

    /// Writes the mutated record back under the revision it was read at.
    async fn persist(&self, task: &mut TaskRecord) -> TaskLifecycleResult<()> {
        let expected = task.revision();
        task.bump_revision();
        self.store.update(task, expected).await?;
        Ok(())
    }

    /// The assignee currently working the task, or the owner, may act on it.
    fn authorize_worker(
        &self,
        task: &TaskRecord,
        actor: &ActorId,
    ) -> Result<(), TaskLifecycleError> {
        if task.assigned_to() == Some(actor) || task.owner() == actor {
            return Ok(());
        }
        Err(TaskDomainError::NotAssignee {
            task_id: task.id(),
            actor: actor.to_string(),
        }
        .into())
    }

    /// Spawns the next occurrence after a completion, fire-and-forget.
    ///
    /// Failures are logged; they never revert the completed task.
    async fn spawn_successor_if_recurring(&self, completed: &TaskRecord) {
        let Some(rule) = completed.recurrence() else {
            return;
        };
        if !rule.enabled() || rule.is_prototype() {
            return;
        }
        match completed.next_occurrence(&*self.clock) {
            Ok(next) => {
                if let Err(err) = self.store.insert(&next).await {
                    warn!(
                        task_id = %completed.id(),
                        successor_id = %next.id(),
                        error = %err,
                        "failed to persist next recurrence occurrence"
                    );
                } else if let Some(primary) = next.primary_assignee() {
                    self.dispatch_to(
                        primary,
                        NotificationEvent::OfferExtended {
                            task_id: next.id(),
                            task_name: next.name().to_owned(),
                        },
                    )
                    .await;
                }
            }
            Err(err) => {
                warn!(task_id = %completed.id(), error = %err, "skipping recurrence spawn");
            }
        }
    }

    async fn dispatch_to(&self, recipient: &ActorId, event: NotificationEvent) {
        if let Err(err) = self.notifier.notify(recipient, event).await {
            warn!(recipient = %recipient, error = %err, "notification dispatch failed");
        }
    }

    async fn dispatch_to_admins(&self, event: NotificationEvent) {
        if let Err(err) = self.notifier.notify_admins(event).await {
            warn!(error = %err, "admin notification dispatch failed");
        }
    }

    async fn record_activity(&self, task_id: TaskId, actor: ActorId, action: ActivityAction) {
        let entry = ActivityEntry {
            task_id,
            actor,
            action,
            at: self.clock.utc(),
        };
        if let Err(err) = self.activity.record(entry).await {
            warn!(task_id = %task_id, error = %err, "activity recording failed");
        }
    }
}
