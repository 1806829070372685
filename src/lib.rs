//! # Memoria
//!
//! A namespaced, cached, file-backed document store with:
//! - One pretty-printed JSON artifact per key, written atomically
//! - An in-memory cache per namespace with read-your-writes semantics
//! - Per-key write serialization (no lost updates under concurrency)
//! - Corrupt artifacts absorbed as missing and reported, never thrown
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Domain Modules                          │
//! │     (identity, relationships, values, thoughts, ...)         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   StoreRegistry                              │
//! │             (one store per namespace)                        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   DocumentStore                              │
//! │          (one writer per key, FIFO admission)                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Cache     │          │  Artifacts  │
//!   │  (RwLock)   │          │ (key.json)  │
//!   └─────────────┘          └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use memoria::{Config, StoreRegistry};
//! use serde_json::json;
//!
//! # async fn demo() -> memoria::Result<()> {
//! let registry = StoreRegistry::new(Config::from_env()?);
//! let wonder = registry.open("wonder").await?;
//!
//! wonder.append("wonders", json!({"question": "huh?"})).await?;
//! let all = wonder.get("wonders").await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Limitations
//! A store assumes it is the only writer to its root. There is no
//! cross-process locking; running two processes over one data directory
//! can lose updates.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod document;
pub mod namespace;
pub mod cache;
pub mod storage;
pub mod stats;
pub mod store;
pub mod registry;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{MemoriaError, Result};
pub use config::{Config, Durability};
pub use document::Document;
pub use registry::StoreRegistry;
pub use stats::StoreStats;
pub use storage::VerifyReport;
pub use store::DocumentStore;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of Memoria
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
