//! Storage-root selection contracts.

use std::path::PathBuf;

/// Supplies the application-private directory every file-bridge call is confined to.
pub trait StorageRootProvider {
    /// Returns the storage root directory. It may not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error when the host cannot determine any application-private directory.
    fn storage_root(&self) -> Result<PathBuf, String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Prefers external application-private storage and falls back to internal storage.
pub struct PreferredStorageRoot {
    /// External application-private directory, when the host has one mounted.
    pub external: Option<PathBuf>,
    /// Internal application-private directory.
    pub internal: PathBuf,
}

impl StorageRootProvider for PreferredStorageRoot {
    fn storage_root(&self) -> Result<PathBuf, String> {
        Ok(self
            .external
            .clone()
            .unwrap_or_else(|| self.internal.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Single fixed storage root.
pub struct FixedStorageRoot(pub PathBuf);

impl StorageRootProvider for FixedStorageRoot {
    fn storage_root(&self) -> Result<PathBuf, String> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preferred_root_uses_external_when_available() {
        let provider = PreferredStorageRoot {
            external: Some(PathBuf::from("/sdcard/Android/data/app/files")),
            internal: PathBuf::from("/data/data/app/files"),
        };
        assert_eq!(
            provider.storage_root().expect("root"),
            PathBuf::from("/sdcard/Android/data/app/files")
        );
    }

    #[test]
    fn preferred_root_falls_back_to_internal() {
        let provider = PreferredStorageRoot {
            external: None,
            internal: PathBuf::from("/data/data/app/files"),
        };
        assert_eq!(
            provider.storage_root().expect("root"),
            PathBuf::from("/data/data/app/files")
        );
    }
}
