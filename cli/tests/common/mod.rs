//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};
use tempfile::TempDir;

/// A test fixture that provides source and destination directories.
pub struct TestFixture {
    pub src: TempDir,
    pub dst: TempDir,
}

impl TestFixture {
    /// Create a new test fixture with fresh source and destination directories.
    pub fn new() -> Self {
        Self {
            src: TempDir::new().expect("Failed to create temp source dir"),
            dst: TempDir::new().expect("Failed to create temp dest dir"),
        }
    }

    /// Write `content` to `name` under the source directory.
    pub fn src_file(&self, name: &str, content: impl AsRef<[u8]>) -> PathBuf {
        let path = self.src.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create directory");
        }
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Write `content` to `name` under the destination directory.
    pub fn dst_file(&self, name: &str, content: impl AsRef<[u8]>) -> PathBuf {
        let path = self.dst.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create directory");
        }
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Create a nested directory structure with files.
    pub fn create_nested_structure(&self, depth: usize, files_per_level: usize) {
        let mut current_path = self.src.path().to_path_buf();
        for level in 0..depth {
            current_path = current_path.join(format!("level{}", level));
            fs::create_dir_all(&current_path).expect("Failed to create directory");
            for i in 0..files_per_level {
                fs::write(
                    current_path.join(format!("file{}.txt", i)),
                    format!("content at level {}", level),
                )
                .expect("Failed to write file");
            }
        }
    }

    /// Count all files in a directory recursively.
    pub fn count_files_recursive(&self, dir: &Path) -> usize {
        let mut count = 0;
        if dir.is_dir() {
            for entry in fs::read_dir(dir).expect("Failed to read directory") {
                let entry = entry.expect("Failed to read entry");
                let path = entry.path();
                if path.is_dir() {
                    count += self.count_files_recursive(&path);
                } else {
                    count += 1;
                }
            }
        }
        count
    }

    /// Check if a file exists and has the expected content.
    pub fn assert_file_content(&self, path: &Path, expected: &str) {
        assert!(path.exists(), "File does not exist: {:?}", path);
        let actual = fs::read_to_string(path).expect("Failed to read file");
        assert_eq!(actual, expected, "File content mismatch");
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// `path` with a trailing separator, meaning "into this directory".
pub fn into_dir(path: &Path) -> String {
    format!("{}{}", path.display(), MAIN_SEPARATOR)
}

/// Deterministic, non-repeating-looking bytes.
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| ((i * 31) ^ (i >> 8)) as u8).collect()
}
