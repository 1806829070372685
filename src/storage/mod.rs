//! Storage Module
//!
//! Durable, file-per-key persistence for one namespace.
//!
//! ## Responsibilities
//! - Write artifacts atomically (temp file → fsync → rename → fsync dir)
//! - Read artifacts, separating "missing", "found" and "corrupt"
//! - Remove artifacts and enumerate the keys that have one
//! - Verify every artifact without touching any cache
//!
//! ## Layout
//! ```text
//! {data_dir}/{namespace}/
//!   ├── core.json          ← artifact for key "core"
//!   ├── narrative.json
//!   └── .a1B2c3.tmp        ← in-flight write, never listed
//! ```
//!
//! No file locking is performed: the process owning a store is assumed to
//! be the only writer to its root.

mod artifact;

pub use artifact::ArtifactStore;

/// An artifact that exists but does not parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorruptArtifact {
    pub key: String,
    pub reason: String,
}

/// An artifact that could not be read at all (permissions, EIO, ...)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnreadableArtifact {
    pub key: String,
    pub error: String,
}

/// Result of a verification pass over a namespace
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyReport {
    /// Keys whose artifact parsed
    pub healthy: Vec<String>,

    /// Keys whose artifact did not parse
    pub corrupt: Vec<CorruptArtifact>,

    /// Keys whose artifact could not be read
    pub unreadable: Vec<UnreadableArtifact>,

    /// Keys listed but gone by the time they were read
    pub vanished: Vec<String>,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool {
        self.corrupt.is_empty() && self.unreadable.is_empty()
    }

    /// Total artifacts examined
    pub fn total(&self) -> usize {
        self.healthy.len() + self.corrupt.len() + self.unreadable.len() + self.vanished.len()
    }
}
