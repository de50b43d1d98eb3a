//! Storage-root path sandboxing.
//!
//! Untrusted request paths are resolved to canonical absolute paths that always lie inside one
//! storage root. Anything that would land outside, or cannot be canonicalized, collapses to the
//! root itself instead of producing an error.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use platform_host::request_path_remainder;
use thiserror::Error;

#[derive(Debug, Error)]
/// Failures setting up a sandbox. Resolution itself never fails.
pub enum SandboxError {
    /// The storage-root provider could not name a directory.
    #[error("failed to resolve storage root: {0}")]
    Provider(String),
    /// The storage root could not be created.
    #[error("failed to create storage root {}: {source}", path.display())]
    CreateRoot {
        /// Requested root directory.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The storage root could not be canonicalized.
    #[error("failed to canonicalize storage root {}: {source}", path.display())]
    CanonicalizeRoot {
        /// Requested root directory.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Why a request was redirected to the storage root.
pub enum Containment {
    /// The canonical path fell outside the storage root.
    Escape,
    /// Canonicalization failed with an I/O error.
    CanonicalizeFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Canonical absolute path produced by [`PathSandbox::resolve`].
pub struct ResolvedPath {
    path: PathBuf,
    is_root: bool,
    containment: Option<Containment>,
}

impl ResolvedPath {
    /// Resolved absolute path.
    pub fn as_path(&self) -> &Path {
        &self.path
    }

    /// Whether the path is the storage root itself.
    pub fn is_root(&self) -> bool {
        self.is_root
    }

    /// Set when the request was redirected to the storage root.
    pub fn containment(&self) -> Option<Containment> {
        self.containment
    }
}

#[derive(Debug, Default)]
/// Counters for sandbox redirections. Callers never observe these; they exist for diagnostics.
pub struct SandboxDiagnostics {
    containment_hits: AtomicU64,
    canonicalize_failures: AtomicU64,
}

impl SandboxDiagnostics {
    /// Requests whose canonical path escaped the storage root.
    pub fn containment_hits(&self) -> u64 {
        self.containment_hits.load(Ordering::Relaxed)
    }

    /// Requests that could not be canonicalized.
    pub fn canonicalize_failures(&self) -> u64 {
        self.canonicalize_failures.load(Ordering::Relaxed)
    }

    fn record(&self, containment: Containment) {
        let counter = match containment {
            Containment::Escape => &self.containment_hits,
            Containment::CanonicalizeFailed => &self.canonicalize_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

#[derive(Debug)]
/// Resolver confining request paths to a canonical storage root.
pub struct PathSandbox {
    root: PathBuf,
    diagnostics: SandboxDiagnostics,
}

impl PathSandbox {
    /// Creates a sandbox rooted at `root`.
    ///
    /// The root directory is created if needed and canonicalized before use.
    ///
    /// # Errors
    ///
    /// Returns [`SandboxError`] when the root cannot be created or canonicalized.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, SandboxError> {
        let root = root.as_ref();
        fs::create_dir_all(root).map_err(|source| SandboxError::CreateRoot {
            path: root.to_path_buf(),
            source,
        })?;
        let canonical = fs::canonicalize(root).map_err(|source| SandboxError::CanonicalizeRoot {
            path: root.to_path_buf(),
            source,
        })?;
        Ok(Self {
            root: canonical,
            diagnostics: SandboxDiagnostics::default(),
        })
    }

    /// Canonical storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Redirection counters.
    pub fn diagnostics(&self) -> &SandboxDiagnostics {
        &self.diagnostics
    }

    /// Resolves an untrusted request path inside the storage root.
    ///
    /// Leading `.` and `/` characters are stripped, the remainder is joined onto the root and the
    /// result is canonicalized. A result that is neither the root nor a descendant of it, and any
    /// canonicalization failure, resolves to the root.
    pub fn resolve(&self, request: &str) -> ResolvedPath {
        let joined = self.root.join(request_path_remainder(request));
        let resolved = fs::canonicalize(&self.root).and_then(|root| {
            let candidate = canonicalize_lenient(&joined)?;
            Ok((root, candidate))
        });

        match resolved {
            Ok((root, candidate)) if candidate.starts_with(&root) => ResolvedPath {
                is_root: candidate == root,
                path: candidate,
                containment: None,
            },
            Ok((_, candidate)) => {
                tracing::warn!(
                    request,
                    resolved = %candidate.display(),
                    "sandbox containment: request escaped storage root"
                );
                self.contain(Containment::Escape)
            }
            Err(err) => {
                tracing::warn!(
                    request,
                    error = %err,
                    "sandbox containment: request could not be canonicalized"
                );
                self.contain(Containment::CanonicalizeFailed)
            }
        }
    }

    fn contain(&self, containment: Containment) -> ResolvedPath {
        self.diagnostics.record(containment);
        ResolvedPath {
            path: self.root.clone(),
            is_root: true,
            containment: Some(containment),
        }
    }
}

/// Canonicalizes a path that may not exist yet.
///
/// Components are resolved left to right against the file system, so a `..` after a symlink
/// steps out of the link's target rather than out of the link itself. Once a component is
/// missing, the remaining names are appended lexically. A dangling symlink fails
/// canonicalization.
fn canonicalize_lenient(path: &Path) -> io::Result<PathBuf> {
    let mut resolved = PathBuf::new();
    let mut missing: Vec<OsString> = Vec::new();

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => resolved.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if missing.pop().is_none() {
                    resolved.pop();
                }
            }
            Component::Normal(name) if !missing.is_empty() => missing.push(name.to_os_string()),
            Component::Normal(name) => {
                let candidate = resolved.join(name);
                match fs::symlink_metadata(&candidate) {
                    Ok(_) => resolved = fs::canonicalize(&candidate)?,
                    Err(err) if err.kind() == io::ErrorKind::NotFound => {
                        missing.push(name.to_os_string());
                    }
                    Err(err) => return Err(err),
                }
            }
        }
    }

    resolved.extend(missing);
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::canonicalize_lenient;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::PathBuf;
    use std::process;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("{prefix}_{}_{}", process::id(), nanos));
        fs::create_dir_all(&path).expect("create temp dir");
        fs::canonicalize(&path).expect("canonical temp dir")
    }

    #[test]
    fn lenient_canonicalization_resolves_missing_tails() {
        let root = temp_dir("sandbox_lenient");
        fs::create_dir_all(root.join("save")).expect("create save");

        let cases = [
            ("save/./file", "save/file"),
            ("save/../file", "file"),
            ("missing/../save", "save"),
            ("missing/deeper/../../save/x", "save/x"),
            ("save/new/dir/", "save/new/dir"),
        ];

        for (input, expected) in cases {
            assert_eq!(
                canonicalize_lenient(&root.join(input)).expect("canonicalize"),
                root.join(expected),
                "input={input:?}"
            );
        }
    }

    #[test]
    fn lenient_canonicalization_can_climb_above_start() {
        let root = temp_dir("sandbox_climb");
        let parent = root.parent().expect("temp dir has parent").to_path_buf();
        let sibling = format!("sandbox_climb_sibling_{}", process::id());

        assert_eq!(
            canonicalize_lenient(&root.join("..").join(&sibling)).expect("canonicalize"),
            parent.join(sibling)
        );
    }
}
