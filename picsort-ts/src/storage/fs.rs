//! Filesystem-backed Storage implementation
//!
//! All folders live directly under one working root; the reserved
//! `input` folder holds unsorted images and every other directory is a
//! category. Listings are filtered to accepted image extensions and
//! sorted so image selection stays deterministic.

use super::{is_image_file, Storage, INPUT_FOLDER};
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Storage rooted at a working directory on the local filesystem
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    /// Create storage over `root`, ensuring the root and its input
    /// folder exist
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(root.join(INPUT_FOLDER))?;
        Ok(Self { root })
    }

    /// The working root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn folder_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl Storage for FsStorage {
    fn list_images(&self, folder: &str) -> Result<Vec<String>> {
        let dir = self.folder_path(folder);
        let mut names = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if is_image_file(name) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn read(&self, folder: &str, name: &str) -> Result<Vec<u8>> {
        let path = self.folder_path(folder).join(name);
        if !path.is_file() {
            return Err(Error::ImageNotFound(name.to_string()));
        }
        Ok(fs::read(path)?)
    }

    fn move_image(&self, src_folder: &str, dst_folder: &str, name: &str) -> Result<()> {
        let src = self.folder_path(src_folder).join(name);
        let dst_dir = self.folder_path(dst_folder);
        if !src.is_file() {
            return Err(Error::ImageNotFound(name.to_string()));
        }
        if !dst_dir.is_dir() {
            return Err(Error::FolderNotFound(dst_folder.to_string()));
        }
        fs::rename(src, dst_dir.join(name))?;
        Ok(())
    }

    fn create_folder(&self, name: &str) -> Result<()> {
        fs::create_dir(self.folder_path(name))?;
        Ok(())
    }

    fn remove_folder(&self, name: &str) -> Result<()> {
        // remove_dir refuses non-empty directories; second guard behind
        // the registry's can_delete check
        fs::remove_dir(self.folder_path(name))?;
        Ok(())
    }

    fn list_folders(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if !name.eq_ignore_ascii_case(INPUT_FOLDER) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn folder_exists(&self, name: &str) -> bool {
        self.folder_path(name).is_dir()
    }

    fn image_exists(&self, folder: &str, name: &str) -> bool {
        self.folder_path(folder).join(name).is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage() -> (TempDir, FsStorage) {
        let dir = TempDir::new().unwrap();
        let storage = FsStorage::new(dir.path()).unwrap();
        (dir, storage)
    }

    fn write_image(dir: &TempDir, folder: &str, name: &str, bytes: &[u8]) {
        fs::write(dir.path().join(folder).join(name), bytes).unwrap();
    }

    #[test]
    fn test_new_creates_input_folder() {
        let (dir, _storage) = storage();
        assert!(dir.path().join("input").is_dir());
    }

    #[test]
    fn test_list_images_sorted_and_filtered() {
        let (dir, storage) = storage();
        write_image(&dir, "input", "b.jpg", b"b");
        write_image(&dir, "input", "a.png", b"a");
        write_image(&dir, "input", "notes.txt", b"x");

        let names = storage.list_images("input").unwrap();
        assert_eq!(names, vec!["a.png", "b.jpg"]);
    }

    #[test]
    fn test_list_folders_excludes_input() {
        let (_dir, storage) = storage();
        storage.create_folder("dogs").unwrap();
        storage.create_folder("cats").unwrap();

        assert_eq!(storage.list_folders().unwrap(), vec!["cats", "dogs"]);
    }

    #[test]
    fn test_move_image() {
        let (dir, storage) = storage();
        storage.create_folder("cats").unwrap();
        write_image(&dir, "input", "a.jpg", b"bytes");

        storage.move_image("input", "cats", "a.jpg").unwrap();

        assert!(!dir.path().join("input/a.jpg").exists());
        assert!(dir.path().join("cats/a.jpg").is_file());
    }

    #[test]
    fn test_move_missing_image_fails() {
        let (_dir, storage) = storage();
        storage.create_folder("cats").unwrap();

        let result = storage.move_image("input", "cats", "ghost.jpg");
        assert!(matches!(result, Err(Error::ImageNotFound(_))));
    }

    #[test]
    fn test_remove_folder_refuses_non_empty() {
        let (dir, storage) = storage();
        storage.create_folder("cats").unwrap();
        write_image(&dir, "cats", "a.jpg", b"bytes");

        assert!(storage.remove_folder("cats").is_err());
        assert!(dir.path().join("cats").is_dir());
    }

    #[test]
    fn test_read_returns_bytes() {
        let (dir, storage) = storage();
        write_image(&dir, "input", "a.jpg", b"payload");

        assert_eq!(storage.read("input", "a.jpg").unwrap(), b"payload");
        assert!(matches!(
            storage.read("input", "ghost.jpg"),
            Err(Error::ImageNotFound(_))
        ));
    }
}
