//! Document codec
//!
//! Encoding and decoding of artifact contents.
//!
//! ## Artifact Format
//! Pretty-printed JSON (two-space indent), no trailing newline. Any
//! well-formed JSON value is accepted on read, including a bare scalar.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

use super::{Document, ReadOutcome};

/// Encode a document to artifact bytes
pub fn encode_document(document: &Document) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(document)?)
}

/// Decode artifact bytes
///
/// Never fails: unparsable bytes (including invalid UTF-8 and truncated
/// text) are reported as [`ReadOutcome::Corrupt`].
pub fn decode_document(bytes: &[u8]) -> ReadOutcome {
    match serde_json::from_slice::<Document>(bytes) {
        Ok(doc) => ReadOutcome::Found(doc),
        Err(e) => ReadOutcome::Corrupt {
            reason: e.to_string(),
        },
    }
}

/// Convert a typed value into a document
pub fn to_document<T: Serialize>(value: &T) -> Result<Document> {
    Ok(serde_json::to_value(value)?)
}

/// Convert a document into a typed value
pub fn from_document<T: DeserializeOwned>(document: Document) -> Result<T> {
    Ok(serde_json::from_value(document)?)
}
