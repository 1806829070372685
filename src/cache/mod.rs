//! Cache Module
//!
//! In-memory state owned by one store instance.
//!
//! ## Responsibilities
//! - Mirror the last durable value of each key ([`DocumentCache`])
//! - Admit one writer per key at a time, in arrival order ([`KeyLocks`])
//!
//! ## Data Structure Choice
//! - Cache: `HashMap` behind a `parking_lot::RwLock`. Readers never hold the
//!   lock across an await point, so a blocking lock is fine.
//! - Writer slots: one `tokio::sync::Mutex<()>` per key. Tokio's mutex is
//!   FIFO-fair, which gives arrival-order admission for free, and its guard
//!   can be held across the awaited durable write.

mod locks;
mod table;

pub use locks::{KeyGuard, KeyLocks};
pub use table::DocumentCache;
