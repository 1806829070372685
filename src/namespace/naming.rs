//! Key and namespace naming rules
//!
//! Both keys and namespace names become single path components, so the
//! same rules apply to each: non-empty, no separators, no NUL, and no
//! leading dot (hidden names are reserved for in-flight temp files).

use crate::error::{MemoriaError, Result};

/// File extension of a key's artifact
pub const ARTIFACT_EXTENSION: &str = "json";

/// Longest accepted name in bytes (leaves room for the extension)
const MAX_NAME_LEN: usize = 250;

fn check_component(name: &str) -> std::result::Result<(), &'static str> {
    if name.is_empty() {
        return Err("must not be empty");
    }
    if name.len() > MAX_NAME_LEN {
        return Err("too long");
    }
    if name.starts_with('.') {
        return Err("must not start with '.'");
    }
    if name.contains(['/', '\\']) {
        return Err("must not contain path separators");
    }
    if name.contains('\0') {
        return Err("must not contain NUL");
    }
    Ok(())
}

/// Validate a document key
pub fn validate_key(key: &str) -> Result<()> {
    check_component(key).map_err(|reason| MemoriaError::InvalidKey {
        key: key.to_string(),
        reason,
    })
}

/// Validate a namespace name
pub fn validate_namespace(name: &str) -> Result<()> {
    check_component(name).map_err(|reason| MemoriaError::InvalidNamespace {
        name: name.to_string(),
        reason,
    })
}

/// Artifact file name for a key
/// "journal" → "journal.json"
pub fn artifact_file_name(key: &str) -> String {
    format!("{}.{}", key, ARTIFACT_EXTENSION)
}

/// Parse the key back out of an artifact file name
/// "journal.json" → Some("journal"), ".tmpXyz.tmp" → None
pub fn parse_artifact_key(file_name: &str) -> Option<&str> {
    let key = file_name.strip_suffix(ARTIFACT_EXTENSION)?.strip_suffix('.')?;
    check_component(key).ok()?;
    Some(key)
}
