//! `std::fs` implementation of the synchronous file bridge.

use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use platform_host::{
    json_string_array, FileBridgeService, FileRecord, StorageRootProvider, TextEncoding,
};

use crate::sandbox::{PathSandbox, ResolvedPath, SandboxError};

/// Signed unix milliseconds, saturating at the `i64` range. Pre-epoch times are negative.
fn unix_millis(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_millis()).unwrap_or(i64::MAX),
        Err(before) => {
            i64::try_from(before.duration().as_millis()).map_or(i64::MIN, |millis| -millis)
        }
    }
}

fn modified_at_unix_ms(metadata: &fs::Metadata) -> i64 {
    metadata.modified().map(unix_millis).unwrap_or(0)
}

fn file_record(metadata: &fs::Metadata) -> FileRecord {
    FileRecord {
        is_file: metadata.is_file(),
        is_directory: metadata.is_dir(),
        size: metadata.len(),
        mtime_ms: modified_at_unix_ms(metadata),
    }
}

fn list_entry_names(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        names.push(entry?.file_name().to_string_lossy().into_owned());
    }
    Ok(names)
}

#[derive(Debug)]
/// File bridge confined to one canonical storage root.
///
/// Every operation resolves its request path through a [`PathSandbox`] first. I/O errors are
/// logged at debug level and turned into the sentinel the boundary expects.
pub struct NativeFileBridge {
    sandbox: PathSandbox,
}

impl NativeFileBridge {
    /// Creates a bridge rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`SandboxError`] when the root cannot be created or canonicalized.
    pub fn from_root(root: impl AsRef<Path>) -> Result<Self, SandboxError> {
        Ok(Self {
            sandbox: PathSandbox::new(root)?,
        })
    }

    /// Creates a bridge rooted wherever `provider` points.
    ///
    /// # Errors
    ///
    /// Returns [`SandboxError`] when the provider fails or the root cannot be prepared.
    pub fn from_storage_roots(provider: &dyn StorageRootProvider) -> Result<Self, SandboxError> {
        let root = provider.storage_root().map_err(SandboxError::Provider)?;
        Self::from_root(root)
    }

    /// Sandbox used to resolve request paths.
    pub fn sandbox(&self) -> &PathSandbox {
        &self.sandbox
    }

    /// Typed stat for a request path.
    pub fn file_record(&self, path: &str) -> Option<FileRecord> {
        let resolved = self.sandbox.resolve(path);
        match fs::metadata(resolved.as_path()) {
            Ok(metadata) => Some(file_record(&metadata)),
            Err(err) => {
                log_io_failure("stat", path, &resolved, &err);
                None
            }
        }
    }

    /// Typed directory listing for a request path, in the order the OS returns entries.
    pub fn list_names(&self, path: &str) -> Option<Vec<String>> {
        let resolved = self.sandbox.resolve(path);
        match fs::metadata(resolved.as_path()) {
            Ok(metadata) if metadata.is_dir() => {}
            Ok(_) => {
                tracing::debug!(request = path, "readdir target is not a directory");
                return None;
            }
            Err(err) => {
                log_io_failure("readdir", path, &resolved, &err);
                return None;
            }
        }
        list_entry_names(resolved.as_path())
            .map_err(|err| log_io_failure("readdir", path, &resolved, &err))
            .ok()
    }
}

fn log_io_failure(op: &str, request: &str, resolved: &ResolvedPath, err: &std::io::Error) {
    tracing::debug!(
        op,
        request,
        resolved = %resolved.as_path().display(),
        error = %err,
        "file bridge operation failed"
    );
}

impl FileBridgeService for NativeFileBridge {
    fn read_file(&self, path: &str, encoding: &str) -> Option<String> {
        let resolved = self.sandbox.resolve(path);
        match fs::read(resolved.as_path()) {
            Ok(bytes) => Some(TextEncoding::parse(encoding).decode(bytes)),
            Err(err) => {
                log_io_failure("read", path, &resolved, &err);
                None
            }
        }
    }

    fn write_file(&self, path: &str, data: &str) -> bool {
        let resolved = self.sandbox.resolve(path);
        if let Some(parent) = resolved.as_path().parent() {
            if !parent.exists() {
                if let Err(err) = fs::create_dir_all(parent) {
                    log_io_failure("write", path, &resolved, &err);
                }
            }
        }
        match fs::write(resolved.as_path(), data.as_bytes()) {
            Ok(()) => true,
            Err(err) => {
                log_io_failure("write", path, &resolved, &err);
                false
            }
        }
    }

    fn exists(&self, path: &str) -> bool {
        self.sandbox.resolve(path).as_path().exists()
    }

    fn read_dir(&self, path: &str) -> Option<String> {
        self.list_names(path).map(json_string_array)
    }

    fn mkdir(&self, path: &str) -> bool {
        let resolved = self.sandbox.resolve(path);
        if resolved.as_path().exists() {
            return false;
        }
        match fs::create_dir_all(resolved.as_path()) {
            Ok(()) => true,
            Err(err) => {
                log_io_failure("mkdir", path, &resolved, &err);
                false
            }
        }
    }

    fn remove_file(&self, path: &str) -> bool {
        let resolved = self.sandbox.resolve(path);
        match fs::remove_file(resolved.as_path()) {
            Ok(()) => true,
            Err(err) => {
                log_io_failure("unlink", path, &resolved, &err);
                false
            }
        }
    }

    fn remove_dir(&self, path: &str) -> bool {
        let resolved = self.sandbox.resolve(path);
        if resolved.is_root() {
            tracing::debug!(request = path, "refusing to remove storage root");
            return false;
        }
        match fs::remove_dir(resolved.as_path()) {
            Ok(()) => true,
            Err(err) => {
                log_io_failure("rmdir", path, &resolved, &err);
                false
            }
        }
    }

    fn stat(&self, path: &str) -> Option<String> {
        self.file_record(path).map(|record| record.to_json())
    }

    fn root_path(&self) -> String {
        self.sandbox.root().to_string_lossy().into_owned()
    }

    fn full_path(&self, path: &str) -> String {
        self.sandbox
            .resolve(path)
            .as_path()
            .to_string_lossy()
            .into_owned()
    }
}
