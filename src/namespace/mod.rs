//! Namespace Module
//!
//! Maps namespace names to on-disk roots and keys to artifact files.
//!
//! ## Responsibilities
//! - Validate namespace names and keys before they touch the filesystem
//! - Resolve `{data_dir}/{namespace}/{key}.json`
//! - Create namespace roots lazily, on first use
//! - Discover namespaces already present under the data directory

mod directory;
mod naming;

pub use directory::NamespaceDirectory;
pub use naming::{
    artifact_file_name, parse_artifact_key, validate_key, validate_namespace, ARTIFACT_EXTENSION,
};

/// The memory namespaces the service layer uses, one per domain module
pub const MEMORY_NAMESPACES: &[&str] = &[
    "identity",
    "relationships",
    "values",
    "thoughts",
    "growth",
    "wonder",
];
