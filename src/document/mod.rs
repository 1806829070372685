//! Document Module
//!
//! The value type stored under a key, and its on-disk text form.
//!
//! ## Responsibilities
//! - Represent arbitrary nested values (null/bool/number/string/sequence/mapping)
//! - Encode documents as pretty-printed JSON artifacts
//! - Classify raw artifact bytes as parsed or corrupt
//!
//! The store is content-agnostic. Domain code that wants typed shapes
//! converts at its own edge with [`to_document`] / [`from_document`].

mod codec;

pub use codec::{decode_document, encode_document, from_document, to_document};

/// A stored value: a tagged union over JSON's value kinds
pub type Document = serde_json::Value;

/// Result of reading an artifact from disk
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome {
    /// No artifact exists for the key
    Missing,

    /// The artifact parsed into a document
    Found(Document),

    /// The artifact exists but could not be parsed
    Corrupt { reason: String },
}

impl ReadOutcome {
    pub fn is_corrupt(&self) -> bool {
        matches!(self, ReadOutcome::Corrupt { .. })
    }
}
