//! Error conversion helpers for file reads
//!
//! Adds the offending path to I/O errors before they leave the application layer.

use std::io;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    /// Wrap an I/O error as [`ApplicationError::OperationFailed`].
    ///
    /// # Example
    /// ```ignore
    /// std::fs::read_to_string(path).with_path_context("read config", path)?;
    /// ```
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{} {}", action, path.display()),
            source: Box::new(e),
        })
    }
}
