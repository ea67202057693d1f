//! Storage capability: the filesystem as seen by the triage engine
//!
//! The engine never touches `std::fs` directly; everything goes through
//! this trait so the working-folder layout stays in one place. The
//! shipped implementation is [`fs::FsStorage`].

use crate::error::Result;
use sha2::{Digest, Sha256};

pub mod fs;

pub use fs::FsStorage;

/// Reserved name of the unsorted source directory
pub const INPUT_FOLDER: &str = "input";

/// File extensions accepted as images
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Filesystem operations the triage engine depends on
///
/// Folder arguments are names relative to the working root, never paths.
pub trait Storage: Send {
    /// List image filenames in a folder, lexicographically sorted
    fn list_images(&self, folder: &str) -> Result<Vec<String>>;

    /// Read one image's bytes
    fn read(&self, folder: &str, name: &str) -> Result<Vec<u8>>;

    /// Move an image between folders
    fn move_image(&self, src_folder: &str, dst_folder: &str, name: &str) -> Result<()>;

    /// Create a category folder
    fn create_folder(&self, name: &str) -> Result<()>;

    /// Remove a category folder (must be empty)
    fn remove_folder(&self, name: &str) -> Result<()>;

    /// List category folder names (excludes the input folder), sorted
    fn list_folders(&self) -> Result<Vec<String>>;

    /// Whether a folder exists under the working root
    fn folder_exists(&self, name: &str) -> bool;

    /// Whether an image file exists in a folder
    fn image_exists(&self, folder: &str, name: &str) -> bool;
}

/// True when `name` designates the reserved input folder
pub fn is_reserved_name(name: &str) -> bool {
    name.eq_ignore_ascii_case(INPUT_FOLDER)
}

/// True when the filename carries an accepted image extension
pub fn is_image_file(name: &str) -> bool {
    std::path::Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// MIME type derived from the filename extension
pub fn mime_type_for(name: &str) -> &'static str {
    match std::path::Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        _ => "image/jpeg",
    }
}

/// SHA-256 content hash of image bytes, as 64 hex characters
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_name_case_insensitive() {
        assert!(is_reserved_name("input"));
        assert!(is_reserved_name("Input"));
        assert!(is_reserved_name("INPUT"));
        assert!(!is_reserved_name("inputs"));
        assert!(!is_reserved_name("cats"));
    }

    #[test]
    fn test_image_file_extensions() {
        assert!(is_image_file("a.jpg"));
        assert!(is_image_file("b.JPEG"));
        assert!(is_image_file("c.png"));
        assert!(!is_image_file("d.gif"));
        assert!(!is_image_file("notes.txt"));
        assert!(!is_image_file("no_extension"));
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(mime_type_for("a.png"), "image/png");
        assert_eq!(mime_type_for("a.jpg"), "image/jpeg");
        assert_eq!(mime_type_for("a.jpeg"), "image/jpeg");
    }

    #[test]
    fn test_content_hash_is_hex_sha256() {
        let hash = content_hash(b"hello");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));

        // Deterministic, content-sensitive
        assert_eq!(hash, content_hash(b"hello"));
        assert_ne!(hash, content_hash(b"hell0"));
    }
}
