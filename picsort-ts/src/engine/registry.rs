//! Folder registry
//!
//! Category folders as the engine sees them. Everything here is a pure
//! query over current storage state and the action stack; nothing is
//! cached, so the derived flags can never go stale against either
//! source.

use super::stack::ActionStack;
use crate::error::{Error, Result};
use crate::storage::{is_reserved_name, Storage};
use serde::Serialize;
use std::collections::BTreeMap;

/// Derived per-folder state
#[derive(Debug, Clone, Serialize)]
pub struct FolderStatus {
    /// Storage reports zero images in the folder
    pub is_empty: bool,
    /// Pending actions targeting the folder
    pub pending_count: usize,
}

impl FolderStatus {
    /// Deletable iff empty and unreferenced by the stack
    pub fn can_delete(&self) -> bool {
        self.is_empty && self.pending_count == 0
    }
}

/// Fresh map of category folder name to derived status
pub fn list_folders(
    storage: &dyn Storage,
    stack: &ActionStack,
) -> Result<BTreeMap<String, FolderStatus>> {
    let mut folders = BTreeMap::new();
    for name in storage.list_folders()? {
        let is_empty = storage.list_images(&name)?.is_empty();
        let pending_count = stack.pending_count_for(&name);
        folders.insert(
            name,
            FolderStatus {
                is_empty,
                pending_count,
            },
        );
    }
    Ok(folders)
}

/// Create a category folder in storage
pub fn create_folder(storage: &dyn Storage, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidName);
    }
    if is_reserved_name(name) {
        return Err(Error::ReservedName(name.to_string()));
    }
    if storage.folder_exists(name) {
        return Err(Error::FolderExists(name.to_string()));
    }
    storage.create_folder(name)
}

/// Delete a category folder from storage
///
/// Refused while the folder holds images or is referenced by a pending
/// action; folders are never deleted implicitly.
pub fn delete_folder(storage: &dyn Storage, stack: &ActionStack, name: &str) -> Result<()> {
    if is_reserved_name(name) {
        return Err(Error::ReservedName(name.to_string()));
    }
    if !storage.folder_exists(name) {
        return Err(Error::FolderNotFound(name.to_string()));
    }

    let status = FolderStatus {
        is_empty: storage.list_images(name)?.is_empty(),
        pending_count: stack.pending_count_for(name),
    };
    if !status.can_delete() {
        return Err(Error::FolderNotDeletable(name.to_string()));
    }

    storage.remove_folder(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::stack::PendingAction;
    use crate::storage::FsStorage;
    use tempfile::TempDir;

    fn setup() -> (TempDir, FsStorage, ActionStack) {
        let dir = TempDir::new().unwrap();
        let storage = FsStorage::new(dir.path()).unwrap();
        (dir, storage, ActionStack::new())
    }

    #[test]
    fn test_create_folder_validations() {
        let (_dir, storage, _stack) = setup();

        assert!(matches!(
            create_folder(&storage, ""),
            Err(Error::InvalidName)
        ));
        assert!(matches!(
            create_folder(&storage, "   "),
            Err(Error::InvalidName)
        ));
        assert!(matches!(
            create_folder(&storage, "Input"),
            Err(Error::ReservedName(_))
        ));

        create_folder(&storage, "cats").unwrap();
        assert!(matches!(
            create_folder(&storage, "cats"),
            Err(Error::FolderExists(_))
        ));
    }

    #[test]
    fn test_folder_names_case_sensitive() {
        let (_dir, storage, _stack) = setup();
        create_folder(&storage, "cats").unwrap();
        create_folder(&storage, "Cats").unwrap();

        assert!(storage.folder_exists("cats"));
        assert!(storage.folder_exists("Cats"));
    }

    #[test]
    fn test_delete_folder_requires_empty_and_unreferenced() {
        let (dir, storage, mut stack) = setup();
        create_folder(&storage, "cats").unwrap();

        // Referenced by a pending action: not deletable
        stack
            .push(PendingAction {
                image_name: "a.jpg".to_string(),
                target_folder: "cats".to_string(),
            })
            .unwrap();
        assert!(matches!(
            delete_folder(&storage, &stack, "cats"),
            Err(Error::FolderNotDeletable(_))
        ));

        // Non-empty: not deletable
        stack.pop().unwrap();
        std::fs::write(dir.path().join("cats/a.jpg"), b"x").unwrap();
        assert!(matches!(
            delete_folder(&storage, &stack, "cats"),
            Err(Error::FolderNotDeletable(_))
        ));

        // Empty and unreferenced: deletable
        std::fs::remove_file(dir.path().join("cats/a.jpg")).unwrap();
        delete_folder(&storage, &stack, "cats").unwrap();
        assert!(!storage.folder_exists("cats"));
    }

    #[test]
    fn test_delete_missing_folder() {
        let (_dir, storage, stack) = setup();
        assert!(matches!(
            delete_folder(&storage, &stack, "ghost"),
            Err(Error::FolderNotFound(_))
        ));
    }

    #[test]
    fn test_list_folders_derived_state() {
        let (dir, storage, mut stack) = setup();
        create_folder(&storage, "cats").unwrap();
        create_folder(&storage, "dogs").unwrap();
        std::fs::write(dir.path().join("dogs/d.jpg"), b"x").unwrap();
        stack
            .push(PendingAction {
                image_name: "a.jpg".to_string(),
                target_folder: "cats".to_string(),
            })
            .unwrap();

        let folders = list_folders(&storage, &stack).unwrap();
        assert_eq!(folders.len(), 2);
        assert!(folders["cats"].is_empty);
        assert_eq!(folders["cats"].pending_count, 1);
        assert!(!folders["cats"].can_delete());
        assert!(!folders["dogs"].is_empty);
        assert_eq!(folders["dogs"].pending_count, 0);
        assert!(!folders["dogs"].can_delete());
    }
}
