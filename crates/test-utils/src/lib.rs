//! Shared test utilities for the weather workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Test data path helpers
//! - A skip macro for optional test data
//! - Synthetic IP2Location database images
//! - Location and weather fixtures
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{require_test_file, fixtures};
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

pub use generators::*;
pub use paths::*;

/// Macro to skip a test if the required file is not found.
///
/// Used for tests against the real IP2Location lite database, which is not
/// distributed with the repository.
///
/// # Usage
///
/// ```ignore
/// use test_utils::require_test_file;
///
/// #[test]
/// fn test_lookup_new_york() {
///     let path = require_test_file!("IP2LOCATION-LITE-DB3.BIN");
///     // Test code using path...
/// }
/// ```
///
/// If the file is not found, the test will print a skip message and return early.
#[macro_export]
macro_rules! require_test_file {
    ($name:expr) => {{
        match $crate::find_test_file($name) {
            Some(path) => path,
            None => {
                eprintln!(
                    "SKIPPED: Test file '{}' not found. Download test data or set TEST_DATA_DIR.",
                    $name
                );
                return;
            }
        }
    }};
}
