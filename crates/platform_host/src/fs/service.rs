//! File-bridge service contract.
//!
//! Every method is synchronous and reports failure through a sentinel (`None` or `false`) instead
//! of an error: embedded content checks for a falsy result and raises its own exception.

/// Host service backing the `*Sync` file calls made by embedded content.
///
/// Implementations must confine every path they touch to a single storage root.
pub trait FileBridgeService {
    /// Reads a whole file as text. `None` when the file is absent or any I/O error occurs.
    fn read_file(&self, path: &str, encoding: &str) -> Option<String>;

    /// Creates missing parent directories and overwrites the file with the UTF-8 bytes of `data`.
    fn write_file(&self, path: &str, data: &str) -> bool;

    /// Returns whether the resolved path exists.
    fn exists(&self, path: &str) -> bool;

    /// Lists entry names of a directory as a JSON array literal.
    ///
    /// `None` when the path is missing, not a directory, or unreadable.
    fn read_dir(&self, path: &str) -> Option<String>;

    /// Creates a directory and any missing parents. `false` when the target already exists.
    fn mkdir(&self, path: &str) -> bool;

    /// Deletes a single file. Directories are refused.
    fn remove_file(&self, path: &str) -> bool;

    /// Deletes an empty directory.
    fn remove_dir(&self, path: &str) -> bool;

    /// Returns a [`FileRecord`](super::types::FileRecord) JSON object literal, `None` when the
    /// path does not exist.
    fn stat(&self, path: &str) -> Option<String>;

    /// Absolute path of the storage root.
    fn root_path(&self) -> String;

    /// Absolute path a request path resolves to. Diagnostic only.
    fn full_path(&self, path: &str) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
/// File-bridge adapter for hosts without persistent storage; every call returns its sentinel.
pub struct NoopFileBridgeService;

impl FileBridgeService for NoopFileBridgeService {
    fn read_file(&self, _path: &str, _encoding: &str) -> Option<String> {
        None
    }

    fn write_file(&self, _path: &str, _data: &str) -> bool {
        false
    }

    fn exists(&self, _path: &str) -> bool {
        false
    }

    fn read_dir(&self, _path: &str) -> Option<String> {
        None
    }

    fn mkdir(&self, _path: &str) -> bool {
        false
    }

    fn remove_file(&self, _path: &str) -> bool {
        false
    }

    fn remove_dir(&self, _path: &str) -> bool {
        false
    }

    fn stat(&self, _path: &str) -> Option<String> {
        None
    }

    fn root_path(&self) -> String {
        String::new()
    }

    fn full_path(&self, _path: &str) -> String {
        String::new()
    }
}
