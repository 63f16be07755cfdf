//! Path utilities for locating test data files.
//!
//! The real IP2Location lite database is not checked in; tests that need it
//! look for it here and skip when it is missing.

use std::path::PathBuf;

/// Returns the workspace root directory.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Searches for a test file in multiple locations.
///
/// Checked in order:
/// 1. Environment variable `TEST_DATA_DIR` (if set)
/// 2. `data/` at the workspace root (where the service expects its database)
/// 3. `testdata/` at the workspace root
pub fn find_test_file(name: &str) -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(test_data_dir) = std::env::var("TEST_DATA_DIR") {
        candidates.push(PathBuf::from(test_data_dir).join(name));
    }

    let root = workspace_root();
    candidates.extend([root.join("data").join(name), root.join("testdata").join(name)]);

    candidates.into_iter().find(|path| path.exists())
}

/// Write `bytes` to a fresh temporary file and return its handle.
///
/// The file is removed when the handle is dropped.
pub fn temp_file_with(bytes: &[u8]) -> tempfile::NamedTempFile {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temporary file");
    file.write_all(bytes).expect("Failed to write temporary file");
    file.flush().expect("Failed to flush temporary file");
    file
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_root_is_valid() {
        let root = workspace_root();
        assert!(
            root.join("Cargo.toml").exists(),
            "Workspace root should contain Cargo.toml: {:?}",
            root
        );
    }

    #[test]
    fn test_missing_file_is_none() {
        assert!(find_test_file("definitely-not-here.bin").is_none());
    }

    #[test]
    fn test_temp_file_with() {
        let file = temp_file_with(b"abc");
        assert_eq!(std::fs::read(file.path()).unwrap(), b"abc");
    }
}
