//! Pending-action stack
//!
//! The ordered, undoable log of "move image X to folder Y" decisions
//! that have not yet been applied to storage. Push/pop are strict LIFO;
//! drain hands actions back oldest-first for commit. Image names are
//! unique across the stack: once queued, an image is no longer
//! "current" and cannot be queued again.

use crate::error::{Error, Result};
use serde::Serialize;

/// A recorded, not-yet-applied intent to move one image to one folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingAction {
    pub image_name: String,
    pub target_folder: String,
}

/// Insertion-ordered undo log of pending actions
#[derive(Debug, Default)]
pub struct ActionStack {
    entries: Vec<PendingAction>,
}

impl ActionStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether an image already has a pending action
    pub fn contains(&self, image_name: &str) -> bool {
        self.entries.iter().any(|a| a.image_name == image_name)
    }

    /// Number of entries targeting a folder
    pub fn pending_count_for(&self, folder: &str) -> usize {
        self.entries
            .iter()
            .filter(|a| a.target_folder == folder)
            .count()
    }

    /// Append an action at the top of the stack
    ///
    /// The uniqueness invariant is enforced here as well as by the
    /// controller's validation, so the stack can never hold two entries
    /// for one image regardless of the caller.
    pub fn push(&mut self, action: PendingAction) -> Result<()> {
        if self.contains(&action.image_name) {
            return Err(Error::AlreadyPending(action.image_name));
        }
        self.entries.push(action);
        Ok(())
    }

    /// Remove and return the most recently pushed action (undo)
    ///
    /// Exact inverse of the latest push; no storage side effect, the
    /// file never moved.
    pub fn pop(&mut self) -> Result<PendingAction> {
        self.entries.pop().ok_or(Error::EmptyStack)
    }

    /// Read-only view of all pending actions, oldest first
    pub fn peek_all(&self) -> &[PendingAction] {
        &self.entries
    }

    /// Take all actions oldest-first and clear the stack (commit only)
    pub fn drain(&mut self) -> Vec<PendingAction> {
        std::mem::take(&mut self.entries)
    }
}
