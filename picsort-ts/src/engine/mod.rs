//! Triage engine
//!
//! Orchestrates the session arbiter, folder registry, action stack,
//! hash ledger, storage, and classifier. Every operation here is meant
//! to run under one mutual-exclusion domain (the server wraps the
//! engine in a single async mutex): the stack, the folder view, and the
//! filesystem are mutated together and must never interleave.

use crate::classify::{Classifier, Confidences, LabeledImage};
use crate::error::{Error, Result};
use crate::storage::{content_hash, is_reserved_name, mime_type_for, Storage, INPUT_FOLDER};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{error, info, warn};
use uuid::Uuid;

pub mod arbiter;
pub mod ledger;
pub mod registry;
pub mod stack;

pub use arbiter::SessionArbiter;
pub use ledger::HashLedger;
pub use registry::FolderStatus;
pub use stack::{ActionStack, PendingAction};

/// The next image to triage, resolved fresh on every request
#[derive(Debug, Clone)]
pub struct CurrentImage {
    pub image_name: String,
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
}

/// Per-action commit outcome
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ActionOutcome {
    /// File relocated to its target folder
    Moved,
    /// File stayed put; sibling actions were unaffected
    Failed { reason: String },
}

/// One entry of the commit result list
#[derive(Debug, Clone, Serialize)]
pub struct ActionResult {
    pub image_name: String,
    pub target_folder: String,
    #[serde(flatten)]
    pub outcome: ActionOutcome,
}

impl ActionResult {
    fn moved(action: &PendingAction) -> Self {
        Self {
            image_name: action.image_name.clone(),
            target_folder: action.target_folder.clone(),
            outcome: ActionOutcome::Moved,
        }
    }

    fn failed(action: &PendingAction, reason: String) -> Self {
        Self {
            image_name: action.image_name.clone(),
            target_folder: action.target_folder.clone(),
            outcome: ActionOutcome::Failed { reason },
        }
    }
}

/// Overall commit status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitStatus {
    /// Every action moved and training (if due) succeeded
    Complete,
    /// At least one action failed or training failed
    Partial,
}

/// Structured commit result
#[derive(Debug, Clone, Serialize)]
pub struct CommitReport {
    pub status: CommitStatus,
    pub actions: Vec<ActionResult>,
    /// Whether an incremental fit ran
    pub trained: bool,
    pub training_error: Option<String>,
}

/// Initialization result
#[derive(Debug, Clone, Serialize)]
pub struct InitializeReport {
    /// Whether an initial fit ran (false when the ledger already
    /// matched the folder contents)
    pub trained: bool,
    pub example_count: usize,
}

/// The session-scoped triage and commit engine
pub struct TriageEngine {
    storage: Box<dyn Storage>,
    classifier: Box<dyn Classifier>,
    stack: ActionStack,
    arbiter: SessionArbiter,
    ledger: HashLedger,
}

impl TriageEngine {
    pub fn new(
        storage: Box<dyn Storage>,
        classifier: Box<dyn Classifier>,
        ledger: HashLedger,
        session_timeout: Duration,
    ) -> Self {
        Self {
            storage,
            classifier,
            stack: ActionStack::new(),
            arbiter: SessionArbiter::new(session_timeout),
            ledger,
        }
    }

    // --- Session arbitration ---

    pub fn acquire_session(&mut self) -> Result<Uuid> {
        self.arbiter.acquire()
    }

    pub fn heartbeat(&mut self, token: Uuid) -> Result<Uuid> {
        self.arbiter.heartbeat(token)
    }

    /// Gate for every operation below; callers hold a valid token or
    /// get `Unauthorized`
    pub fn authorize(&self, token: Uuid) -> Result<()> {
        self.arbiter.authorize(token)
    }

    // --- Folder registry ---

    pub fn list_folders(&self) -> Result<BTreeMap<String, FolderStatus>> {
        registry::list_folders(self.storage.as_ref(), &self.stack)
    }

    pub fn create_folder(&self, name: &str) -> Result<()> {
        registry::create_folder(self.storage.as_ref(), name)?;
        info!("Created folder '{}'", name);
        Ok(())
    }

    pub fn delete_folder(&self, name: &str) -> Result<()> {
        registry::delete_folder(self.storage.as_ref(), &self.stack, name)?;
        info!("Deleted folder '{}'", name);
        Ok(())
    }

    // --- Triage ---

    /// The next image in the input folder: lexicographically first
    /// filename without a pending action. Pure read, never cached.
    pub fn current_image(&self) -> Result<CurrentImage> {
        let image_name = self
            .storage
            .list_images(INPUT_FOLDER)?
            .into_iter()
            .find(|name| !self.stack.contains(name))
            .ok_or(Error::NoImageAvailable)?;
        let bytes = self.storage.read(INPUT_FOLDER, &image_name)?;
        let mime_type = mime_type_for(&image_name);
        Ok(CurrentImage {
            image_name,
            bytes,
            mime_type,
        })
    }

    /// Score one triageable image against all known categories
    ///
    /// Only images still eligible for `current_image` can be classified:
    /// present in the input folder and not already queued.
    pub fn classify(&self, image_name: &str) -> Result<Confidences> {
        if self.stack.contains(image_name) || !self.storage.image_exists(INPUT_FOLDER, image_name)
        {
            return Err(Error::ImageNotFound(image_name.to_string()));
        }
        let bytes = self.storage.read(INPUT_FOLDER, image_name)?;
        self.classifier.predict(&bytes)
    }

    /// Queue "move image to folder"; the image stops being current
    pub fn assign(&mut self, image_name: &str, target_folder: &str) -> Result<()> {
        if is_reserved_name(target_folder) {
            return Err(Error::ReservedTarget);
        }
        if !self.storage.folder_exists(target_folder) {
            return Err(Error::FolderNotFound(target_folder.to_string()));
        }
        if self.stack.contains(image_name) {
            return Err(Error::AlreadyPending(image_name.to_string()));
        }
        if !self.storage.image_exists(INPUT_FOLDER, image_name) {
            return Err(Error::ImageNotFound(image_name.to_string()));
        }
        self.stack.push(PendingAction {
            image_name: image_name.to_string(),
            target_folder: target_folder.to_string(),
        })
    }

    /// Discard the most recent pending action; its image becomes
    /// current-eligible again (nothing moved on disk)
    pub fn undo(&mut self) -> Result<PendingAction> {
        let action = self.stack.pop()?;
        info!(
            "Undid pending action '{}' -> '{}'",
            action.image_name, action.target_folder
        );
        Ok(action)
    }

    /// Pending actions, oldest first
    pub fn pending(&self) -> &[PendingAction] {
        self.stack.peek_all()
    }

    /// Apply every pending action to storage, then retrain on the newly
    /// labeled images
    ///
    /// Per-action failures are isolated: one bad move neither aborts the
    /// batch nor rolls back earlier moves. After the stack is drained no
    /// error path re-inserts actions; everything past that point lands
    /// in the report instead of unwinding.
    pub async fn commit(&mut self) -> Result<CommitReport> {
        if self.stack.is_empty() {
            return Err(Error::NothingToCommit);
        }

        let actions = self.stack.drain();
        info!("Committing {} pending actions", actions.len());

        let mut results = Vec::with_capacity(actions.len());
        let mut moved: Vec<(PendingAction, Vec<u8>, String)> = Vec::new();

        for action in actions {
            // Bytes are read before the move so the hash and training
            // example come from exactly what was relocated
            let bytes = match self.storage.read(INPUT_FOLDER, &action.image_name) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("Commit: skipping '{}': {}", action.image_name, e);
                    results.push(ActionResult::failed(&action, e.to_string()));
                    continue;
                }
            };
            if let Err(e) =
                self.storage
                    .move_image(INPUT_FOLDER, &action.target_folder, &action.image_name)
            {
                warn!("Commit: move failed for '{}': {}", action.image_name, e);
                results.push(ActionResult::failed(&action, e.to_string()));
                continue;
            }
            let hash = content_hash(&bytes);
            results.push(ActionResult::moved(&action));
            moved.push((action, bytes, hash));
        }

        // Training set: moved images whose hash/category pair the
        // ledger has not seen
        let mut examples = Vec::new();
        for (action, bytes, hash) in &moved {
            match self.ledger.contains(hash, &action.target_folder).await {
                Ok(true) => {}
                Ok(false) => examples.push(LabeledImage {
                    name: action.image_name.clone(),
                    bytes: bytes.clone(),
                    category: action.target_folder.clone(),
                }),
                Err(e) => {
                    // Retraining on a duplicate is harmless; losing an
                    // example is not
                    warn!("Ledger lookup failed for '{}': {}", action.image_name, e);
                    examples.push(LabeledImage {
                        name: action.image_name.clone(),
                        bytes: bytes.clone(),
                        category: action.target_folder.clone(),
                    });
                }
            }
        }

        let mut trained = false;
        let mut training_error = None;
        if examples.is_empty() {
            info!("No previously-unseen examples, skipping incremental fit");
        } else {
            match self.classifier.fit_incremental(&examples) {
                Ok(()) => {
                    trained = true;
                    info!("Incremental fit on {} examples", examples.len());
                }
                Err(e) => {
                    // Filesystem state is the source of truth; the model
                    // just stays stale until the next successful commit
                    error!("Incremental training failed: {}", e);
                    training_error = Some(e.to_string());
                }
            }
        }

        // The ledger reflects every successful move, training outcome
        // notwithstanding; entries are written only after their move
        for (action, _bytes, hash) in &moved {
            if let Err(e) = self.ledger.upsert(hash, &action.target_folder).await {
                warn!("Ledger update failed for '{}': {}", action.image_name, e);
            }
        }

        let any_failed = results
            .iter()
            .any(|r| matches!(r.outcome, ActionOutcome::Failed { .. }));
        let status = if any_failed || training_error.is_some() {
            CommitStatus::Partial
        } else {
            CommitStatus::Complete
        };

        Ok(CommitReport {
            status,
            actions: results,
            trained,
            training_error,
        })
    }

    /// Train from scratch when the category folders no longer match the
    /// ledger; no-op when they do. Idempotent.
    pub async fn initialize(&mut self) -> Result<InitializeReport> {
        let mut scan: BTreeMap<String, String> = BTreeMap::new();
        let mut examples = Vec::new();
        for folder in self.storage.list_folders()? {
            for name in self.storage.list_images(&folder)? {
                let bytes = self.storage.read(&folder, &name)?;
                scan.insert(content_hash(&bytes), folder.clone());
                examples.push(LabeledImage {
                    name,
                    bytes,
                    category: folder.clone(),
                });
            }
        }

        let ledgered = self.ledger.snapshot().await?;
        if ledgered == scan {
            info!(
                "Training data unchanged ({} images), skipping initial fit",
                examples.len()
            );
            return Ok(InitializeReport {
                trained: false,
                example_count: examples.len(),
            });
        }

        info!("Initial fit on {} labeled images", examples.len());
        self.classifier.fit_initial(&examples)?;
        self.ledger.replace_all(&scan).await?;

        Ok(InitializeReport {
            trained: true,
            example_count: examples.len(),
        })
    }
}
