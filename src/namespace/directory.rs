//! Namespace Directory
//!
//! Resolves namespace roots under the configured data directory.

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{MemoriaError, Result};

use super::naming::validate_namespace;

/// Maps namespace names to directories under a base path
#[derive(Debug, Clone)]
pub struct NamespaceDirectory {
    /// Base directory holding one subdirectory per namespace
    base: PathBuf,
}

impl NamespaceDirectory {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// The base data directory
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Root directory of a namespace (not created)
    pub fn root(&self, namespace: &str) -> Result<PathBuf> {
        validate_namespace(namespace)?;
        Ok(self.base.join(namespace))
    }

    /// Resolve a namespace root and create it if needed
    ///
    /// Idempotent. Fails with a storage error if the directory cannot be
    /// created.
    pub async fn ensure(&self, namespace: &str) -> Result<PathBuf> {
        let root = self.root(namespace)?;
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| MemoriaError::storage(&root, e))?;
        Ok(root)
    }

    /// Namespaces present on disk
    ///
    /// Returns an empty set when the base directory does not exist yet.
    /// Hidden and otherwise invalid directory names are skipped.
    pub async fn discover(&self) -> Result<BTreeSet<String>> {
        let mut found = BTreeSet::new();

        let mut entries = match tokio::fs::read_dir(&self.base).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(found),
            Err(e) => return Err(MemoriaError::storage(&self.base, e)),
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| MemoriaError::storage(&self.base, e))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| MemoriaError::storage(entry.path(), e))?;
            if !file_type.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if validate_namespace(name).is_ok() {
                    found.insert(name.to_string());
                }
            }
        }

        Ok(found)
    }
}
