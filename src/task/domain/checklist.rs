//! Checklist items and the proof gate guarding task completion.
//!
//! The gate deliberately checks proof presence only: an item that has been
//! ticked off but whose mandatory proof is missing still blocks completion,
//! while an unticked item with no proof requirement does not. The `completed`
//! flags are display state, not completion evidence.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};

/// A single checklist entry embedded in a task record.
///
/// Items are stored in insertion order; that order is meaningful for
/// instructions but completion order is not enforced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    /// Short label shown to the assignee.
    pub text: String,
    /// Optional longer instructions.
    pub instructions: Option<String>,
    /// Optional reference image.
    pub image_url: Option<String>,
    /// Whether the assignee has ticked the item off.
    pub completed: bool,
    /// Whether proof must be attached before the task can complete.
    pub proof_required: bool,
    /// Durable URL of the attached proof; empty when none is attached.
    pub proof_url: String,
}

impl ChecklistItem {
    /// Creates an unticked item with no proof requirement.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            instructions: None,
            image_url: None,
            completed: false,
            proof_required: false,
            proof_url: String::new(),
        }
    }

    /// Marks the item as requiring proof before completion.
    #[must_use]
    pub fn requiring_proof(mut self) -> Self {
        self.proof_required = true;
        self
    }

    /// Sets the longer instructions.
    #[must_use]
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Sets the reference image.
    #[must_use]
    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    /// Whether this item blocks task completion.
    #[must_use]
    pub fn blocks_completion(&self) -> bool {
        self.proof_required && self.proof_url.is_empty()
    }

    /// Resets work state for a freshly spawned recurrence instance.
    pub(crate) fn reset_for_new_occurrence(&mut self) {
        self.completed = false;
        self.proof_url.clear();
    }
}

/// Partial update applied to a checklist item.
///
/// Absent fields leave the item untouched; `proof_url` set to an empty
/// string detaches the proof.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItemPatch {
    /// New label, if changing.
    pub text: Option<String>,
    /// New instructions, if changing.
    pub instructions: Option<String>,
    /// New completion flag, if changing.
    pub completed: Option<bool>,
    /// New proof URL, if changing.
    pub proof_url: Option<String>,
}

impl ChecklistItemPatch {
    /// A patch that only toggles the completion flag.
    #[must_use]
    pub const fn completion(completed: bool) -> Self {
        Self {
            text: None,
            instructions: None,
            completed: Some(completed),
            proof_url: None,
        }
    }

    /// A patch that only sets the proof URL.
    #[must_use]
    pub fn proof(url: impl Into<String>) -> Self {
        Self {
            text: None,
            instructions: None,
            completed: None,
            proof_url: Some(url.into()),
        }
    }
}

/// Outcome of applying a patch, for activity recording by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecklistChange {
    /// The new `completed` value when the patch flipped the flag.
    pub completed_flipped_to: Option<bool>,
}

/// Whether the checklist permits the task to complete.
///
/// An empty checklist always permits completion.
#[must_use]
pub fn can_complete(items: &[ChecklistItem]) -> bool {
    first_blocking_item(items).is_none()
}

/// Index of the first proof-required item with no proof attached.
#[must_use]
pub fn first_blocking_item(items: &[ChecklistItem]) -> Option<usize> {
    items.iter().position(ChecklistItem::blocks_completion)
}

/// Merges a patch into the item at `index`.
///
/// # Errors
///
/// Returns [`TaskDomainError::ItemIndexOutOfRange`] when `index` does not
/// address an existing item.
pub fn apply_patch(
    items: &mut [ChecklistItem],
    index: usize,
    patch: &ChecklistItemPatch,
) -> Result<ChecklistChange, TaskDomainError> {
    let len = items.len();
    let item = items
        .get_mut(index)
        .ok_or(TaskDomainError::ItemIndexOutOfRange { index, len })?;

    if let Some(text) = &patch.text {
        item.text.clone_from(text);
    }
    if let Some(instructions) = &patch.instructions {
        item.instructions = Some(instructions.clone());
    }
    if let Some(proof_url) = &patch.proof_url {
        item.proof_url.clone_from(proof_url);
    }

    let mut change = ChecklistChange {
        completed_flipped_to: None,
    };
    if let Some(completed) = patch.completed
        && completed != item.completed
    {
        item.completed = completed;
        change.completed_flipped_to = Some(completed);
    }
    Ok(change)
}
