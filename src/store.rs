//! Store Module
//!
//! The document store that every domain module shares.
//!
//! ## Responsibilities
//! - Serve reads from the cache, falling back to disk
//! - Make every write durable before it becomes visible in the cache
//! - Serialize read-modify-write sequences per key (no lost updates)
//! - Absorb corrupt artifacts as missing documents and report them

use std::collections::BTreeSet;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::cache::{DocumentCache, KeyGuard, KeyLocks};
use crate::config::Config;
use crate::document::{Document, ReadOutcome};
use crate::error::{MemoriaError, Result};
use crate::namespace::{validate_key, validate_namespace, NamespaceDirectory};
use crate::stats::{Counters, StoreStats};
use crate::storage::{ArtifactStore, VerifyReport};

/// A namespaced, cached, file-backed key → document store
///
/// ## Concurrency Model: one writer per key
///
/// - **Writes** (set/append/update/get_or_insert/delete): admitted to a key
///   one at a time, in arrival order, via `KeyLocks`. The whole
///   read → compute → durable write → cache update sequence runs inside
///   the slot, on a spawned task, so it completes even if the caller stops
///   waiting for it.
/// - **Reads** (get): a cache hit takes only the cache's read lock. A miss
///   loads from disk inside the key's slot, so a write or delete can never
///   be followed by an older on-disk value landing in the cache.
/// - Distinct keys never wait on each other.
///
/// Cloning is cheap and yields a handle to the same instance (same cache,
/// same writer slots). Keep one instance per namespace per process; two
/// instances over one root do not coordinate.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    inner: Arc<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    /// Namespace this store owns
    namespace: String,

    /// Resolves and creates the namespace root
    directory: NamespaceDirectory,

    /// On-disk artifacts
    artifacts: ArtifactStore,

    /// Last durable value per key
    cache: DocumentCache,

    /// Per-key writer slots
    locks: KeyLocks,

    /// Set once the namespace root is known to exist
    root_ready: OnceCell<()>,

    counters: Counters,
}

impl DocumentStore {
    /// Create a store for `namespace` under `config.data_dir`
    ///
    /// Performs no I/O. The namespace root is created by [`initialize`] or
    /// lazily by the first write.
    ///
    /// [`initialize`]: DocumentStore::initialize
    pub fn new(config: &Config, namespace: &str) -> Result<Self> {
        validate_namespace(namespace)?;

        let directory = NamespaceDirectory::new(&config.data_dir);
        let root = directory.root(namespace)?;

        Ok(Self {
            inner: Arc::new(StoreInner {
                namespace: namespace.to_string(),
                directory,
                artifacts: ArtifactStore::new(root, config.durability),
                cache: DocumentCache::new(),
                locks: KeyLocks::new(),
                root_ready: OnceCell::new(),
                counters: Counters::default(),
            }),
        })
    }

    /// Create a store and make sure its root exists
    pub async fn open(config: &Config, namespace: &str) -> Result<Self> {
        let store = Self::new(config, namespace)?;
        store.initialize().await?;
        Ok(store)
    }

    /// Ensure the namespace root exists
    ///
    /// Idempotent. Fails with a storage error if the directory cannot be
    /// created.
    pub async fn initialize(&self) -> Result<()> {
        let root = self.inner.directory.ensure(&self.inner.namespace).await?;
        let _ = self.inner.root_ready.set(());
        tracing::debug!("Namespace '{}' ready at {}", self.inner.namespace, root.display());
        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Get the document stored under `key`
    ///
    /// Returns `Ok(None)` when no artifact exists, and also when the
    /// artifact exists but cannot be parsed (that case is logged and
    /// counted in [`StoreStats::corrupt_artifacts`]). Other read failures
    /// surface as storage errors.
    pub async fn get(&self, key: &str) -> Result<Option<Document>> {
        validate_key(key)?;
        let inner = &self.inner;

        // Step 1: Cache (most recent durable value)
        if let Some(doc) = inner.cache.get(key) {
            inner.counters.record_read(true);
            return Ok(Some(doc));
        }

        // Step 2: Disk, inside the key's slot
        let _slot = inner.locks.acquire(key).await;
        if let Some(doc) = inner.cache.get(key) {
            // A writer populated it while we queued
            inner.counters.record_read(true);
            return Ok(Some(doc));
        }

        inner.counters.record_read(false);
        inner.load(key).await
    }

    /// Whether `key` currently holds a readable document
    pub async fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }

    /// Every key backed by an artifact, regardless of cache state
    pub async fn list(&self) -> Result<BTreeSet<String>> {
        self.inner.artifacts.keys().await
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Durably store `value` under `key`, replacing any prior document
    ///
    /// On failure the cache is left as it was.
    pub async fn set(&self, key: &str, value: Document) -> Result<()> {
        self.run_exclusive(key, move |inner, key| async move {
            inner.ensure_root().await?;
            inner.commit(&key, value).await?;
            Ok::<_, MemoriaError>(())
        })
        .await
    }

    /// Append `item` to the sequence under `key`, returning the new sequence
    ///
    /// A missing key starts from an empty sequence. Fails with
    /// [`MemoriaError::NotASequence`] (writing nothing) if the key holds
    /// some other kind of document.
    pub async fn append(&self, key: &str, item: Document) -> Result<Document> {
        let owned_key = key.to_string();
        self.update(key, move |current| match current {
            None => Ok(Document::Array(vec![item])),
            Some(Document::Array(mut items)) => {
                items.push(item);
                Ok(Document::Array(items))
            }
            Some(_) => Err(MemoriaError::NotASequence { key: owned_key }),
        })
        .await
    }

    /// Atomically transform the document under `key`
    ///
    /// `f` receives the current document (`None` if missing or corrupt) and
    /// returns the replacement, which is written durably and returned. No
    /// other write to `key` can interleave. If `f` returns an error nothing
    /// is written.
    pub async fn update<F>(&self, key: &str, f: F) -> Result<Document>
    where
        F: FnOnce(Option<Document>) -> Result<Document> + Send + 'static,
    {
        self.run_exclusive(key, move |inner, key| async move {
            inner.ensure_root().await?;
            let current = inner.current(&key).await?;
            let next = f(current)?;
            inner.commit(&key, next).await
        })
        .await
    }

    /// Return the document under `key`, storing `default` first if missing
    pub async fn get_or_insert(&self, key: &str, default: Document) -> Result<Document> {
        self.run_exclusive(key, move |inner, key| async move {
            inner.ensure_root().await?;
            match inner.current(&key).await? {
                Some(doc) => Ok(doc),
                None => inner.commit(&key, default).await,
            }
        })
        .await
    }

    /// Remove the artifact for `key` and evict it from the cache
    ///
    /// Returns whether an artifact existed. Deleting an unknown key is not
    /// an error.
    pub async fn delete(&self, key: &str) -> Result<bool> {
        self.run_exclusive(key, move |inner, key| async move {
            let removed = inner.artifacts.remove(&key).await?;
            inner.cache.evict(&key);
            if removed {
                inner.counters.record_delete();
                tracing::debug!("Deleted '{}/{}'", inner.namespace, key);
            }
            Ok::<_, MemoriaError>(removed)
        })
        .await
    }

    // =========================================================================
    // Maintenance
    // =========================================================================

    /// Parse every artifact in the namespace and report the corrupt ones
    ///
    /// Does not read through or populate the cache.
    pub async fn verify(&self) -> Result<VerifyReport> {
        let report = self.inner.artifacts.verify().await?;
        for corrupt in &report.corrupt {
            tracing::warn!(
                namespace = %self.inner.namespace,
                key = %corrupt.key,
                error = %corrupt.reason,
                "corrupt artifact found during verify"
            );
        }
        for unreadable in &report.unreadable {
            tracing::warn!(
                namespace = %self.inner.namespace,
                key = %unreadable.key,
                error = %unreadable.error,
                "unreadable artifact found during verify"
            );
        }
        Ok(report)
    }

    /// Snapshot of this instance's counters
    pub fn stats(&self) -> StoreStats {
        self.inner.counters.snapshot()
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// The namespace this store owns
    pub fn namespace(&self) -> &str {
        &self.inner.namespace
    }

    /// The namespace root directory
    pub fn root(&self) -> &Path {
        self.inner.artifacts.root()
    }

    /// Number of cached documents
    pub fn cached_len(&self) -> usize {
        self.inner.cache.len()
    }

    /// Whether `key` is currently cached
    pub fn is_cached(&self, key: &str) -> bool {
        self.inner.cache.contains(key)
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Run a write holding the key's slot, on its own task
    ///
    /// The slot is taken here, in the caller, so queue position is fixed
    /// by call order. Once admitted, the write finishes even if the caller
    /// stops waiting.
    async fn run_exclusive<T, F, Fut>(&self, key: &str, op: F) -> Result<T>
    where
        F: FnOnce(Arc<StoreInner>, String) -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        validate_key(key)?;
        let slot: KeyGuard = self.inner.locks.acquire(key).await;

        let write = op(Arc::clone(&self.inner), key.to_string());
        tokio::spawn(async move {
            let result = write.await;
            drop(slot);
            result
        })
        .await?
    }
}

impl StoreInner {
    /// Create the namespace root on first write
    async fn ensure_root(&self) -> Result<()> {
        self.root_ready
            .get_or_try_init(|| async {
                self.directory.ensure(&self.namespace).await.map(|_| ())
            })
            .await?;
        Ok(())
    }

    /// Current value of a key (caller holds the key's slot)
    async fn current(&self, key: &str) -> Result<Option<Document>> {
        match self.cache.get(key) {
            Some(doc) => Ok(Some(doc)),
            None => self.load(key).await,
        }
    }

    /// Read a key from disk into the cache (caller holds the key's slot)
    async fn load(&self, key: &str) -> Result<Option<Document>> {
        match self.artifacts.read(key).await? {
            ReadOutcome::Found(doc) => {
                self.cache.insert(key, doc.clone());
                Ok(Some(doc))
            }
            ReadOutcome::Missing => Ok(None),
            ReadOutcome::Corrupt { reason } => {
                self.counters.record_corrupt();
                let path = self.artifacts.path(key);
                tracing::warn!(
                    namespace = %self.namespace,
                    key = %key,
                    path = %path.display(),
                    error = %reason,
                    "corrupt artifact treated as missing"
                );
                Ok(None)
            }
        }
    }

    /// Durably write, then publish to the cache (caller holds the key's slot)
    async fn commit(&self, key: &str, document: Document) -> Result<Document> {
        self.artifacts.write(key, &document).await?;
        self.cache.insert(key, document.clone());
        self.counters.record_write();
        tracing::debug!("Wrote '{}/{}'", self.namespace, key);
        Ok(document)
    }
}
