//! Artifact Store
//!
//! Reads and writes the JSON artifact files of one namespace root.

use std::collections::BTreeSet;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::config::Durability;
use crate::document::{decode_document, encode_document, Document, ReadOutcome};
use crate::error::{MemoriaError, Result};
use crate::namespace::{artifact_file_name, parse_artifact_key};

use super::{CorruptArtifact, UnreadableArtifact, VerifyReport};

/// File-per-key storage under a single directory
///
/// ## Concurrency:
/// - Stateless apart from the paths; all methods use `&self`
/// - Callers serialize writes per key (see `KeyLocks`); the rename makes
///   each write all-or-nothing for concurrent readers
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    /// Namespace root holding the artifacts
    root: PathBuf,

    /// Whether to fsync before a write returns
    durability: Durability,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>, durability: Durability) -> Self {
        Self {
            root: root.into(),
            durability,
        }
    }

    /// The namespace root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a key's artifact
    pub fn path(&self, key: &str) -> PathBuf {
        self.root.join(artifact_file_name(key))
    }

    /// Read and parse a key's artifact
    ///
    /// Returns:
    /// - `Ok(Missing)` — no artifact
    /// - `Ok(Found(doc))` — parsed
    /// - `Ok(Corrupt { .. })` — present but unparsable
    /// - `Err(Storage)` — any other I/O failure (permissions, EIO, ...)
    pub async fn read(&self, key: &str) -> Result<ReadOutcome> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(decode_document(&bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(ReadOutcome::Missing),
            Err(e) => Err(MemoriaError::storage(path, e)),
        }
    }

    /// Durably replace a key's artifact
    ///
    /// Either the whole new document is in place when this returns `Ok`, or
    /// the previous artifact (if any) is untouched.
    pub async fn write(&self, key: &str, document: &Document) -> Result<()> {
        // Serialize before touching the disk
        let bytes = encode_document(document)?;

        let root = self.root.clone();
        let path = self.path(key);
        let durability = self.durability;

        tokio::task::spawn_blocking(move || write_atomic(&root, &path, &bytes, durability))
            .await?
    }

    /// Remove a key's artifact
    ///
    /// Returns whether an artifact existed. A missing artifact is not an error.
    pub async fn remove(&self, key: &str) -> Result<bool> {
        let path = self.path(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(MemoriaError::storage(path, e)),
        }

        if self.durability == Durability::Fsync {
            let root = self.root.clone();
            tokio::task::spawn_blocking(move || sync_dir(&root)).await??;
        }

        Ok(true)
    }

    /// Keys currently backed by an artifact
    ///
    /// A root that does not exist yet holds no keys. Symlinks are followed,
    /// matching what `read` sees; dangling ones are skipped, and entries
    /// that cannot be inspected at all are still listed so the failure
    /// surfaces on read.
    pub async fn keys(&self) -> Result<BTreeSet<String>> {
        let mut keys = BTreeSet::new();

        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(keys),
            Err(e) => return Err(MemoriaError::storage(&self.root, e)),
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| MemoriaError::storage(&self.root, e))?
        {
            let file_name = entry.file_name();
            let Some(key) = file_name.to_str().and_then(parse_artifact_key) else {
                continue;
            };

            match tokio::fs::metadata(entry.path()).await {
                Ok(metadata) if !metadata.is_file() => continue,
                Ok(_) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(_) => {}
            }

            keys.insert(key.to_string());
        }

        Ok(keys)
    }

    /// Parse every artifact and classify it
    ///
    /// A read failure on one artifact is recorded and the scan continues.
    pub async fn verify(&self) -> Result<VerifyReport> {
        let mut report = VerifyReport::default();

        for key in self.keys().await? {
            match self.read(&key).await {
                Ok(ReadOutcome::Found(_)) => report.healthy.push(key),
                Ok(ReadOutcome::Corrupt { reason }) => {
                    report.corrupt.push(CorruptArtifact { key, reason })
                }
                Ok(ReadOutcome::Missing) => report.vanished.push(key),
                Err(e) => report.unreadable.push(UnreadableArtifact {
                    key,
                    error: e.to_string(),
                }),
            }
        }

        Ok(report)
    }
}

// =============================================================================
// Blocking Helpers
// =============================================================================

/// Write `bytes` to a hidden temp file in `root`, then rename it over `path`
fn write_atomic(root: &Path, path: &Path, bytes: &[u8], durability: Durability) -> Result<()> {
    let storage_err = |e: std::io::Error| MemoriaError::storage(path, e);

    let mut temp = tempfile::Builder::new()
        .prefix(".")
        .suffix(".tmp")
        .tempfile_in(root)
        .map_err(storage_err)?;

    temp.write_all(bytes).map_err(storage_err)?;

    if durability == Durability::Fsync {
        temp.as_file().sync_all().map_err(storage_err)?;
    }

    // On failure the temp file is dropped and cleaned up
    temp.persist(path).map_err(|e| storage_err(e.error))?;

    if durability == Durability::Fsync {
        sync_dir(root)?;
    }

    Ok(())
}

/// fsync a directory so a rename or unlink inside it survives a crash
#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<()> {
    fs::File::open(dir)
        .and_then(|d| d.sync_all())
        .map_err(|e| MemoriaError::storage(dir, e))
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<()> {
    Ok(())
}
