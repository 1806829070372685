//! Store Registry
//!
//! Hands out exactly one [`DocumentStore`] per namespace for the life of
//! the registry, so every domain module sharing a namespace also shares
//! its cache and writer slots.

use std::collections::{BTreeSet, HashMap};

use parking_lot::Mutex;

use crate::config::Config;
use crate::error::Result;
use crate::namespace::NamespaceDirectory;
use crate::store::DocumentStore;

/// Owns the store instances of one process
pub struct StoreRegistry {
    config: Config,

    /// Namespace discovery under `config.data_dir`
    directory: NamespaceDirectory,

    /// Namespace → its single store instance
    stores: Mutex<HashMap<String, DocumentStore>>,
}

impl StoreRegistry {
    pub fn new(config: Config) -> Self {
        let directory = NamespaceDirectory::new(&config.data_dir);
        Self {
            config,
            directory,
            stores: Mutex::new(HashMap::new()),
        }
    }

    /// Get the store for `namespace`, creating and initializing it on first use
    ///
    /// Every call for the same namespace returns a handle to the same
    /// instance.
    pub async fn open(&self, namespace: &str) -> Result<DocumentStore> {
        let store = {
            let mut stores = self.stores.lock();
            match stores.get(namespace) {
                Some(store) => store.clone(),
                None => {
                    let store = DocumentStore::new(&self.config, namespace)?;
                    stores.insert(namespace.to_string(), store.clone());
                    tracing::debug!("Registered namespace '{}'", namespace);
                    store
                }
            }
        };

        store.initialize().await?;
        Ok(store)
    }

    /// Open several namespaces at once
    pub async fn open_all(&self, namespaces: &[&str]) -> Result<Vec<DocumentStore>> {
        let mut stores = Vec::with_capacity(namespaces.len());
        for namespace in namespaces {
            stores.push(self.open(namespace).await?);
        }
        Ok(stores)
    }

    /// The store for `namespace` if it was already opened
    pub fn get(&self, namespace: &str) -> Option<DocumentStore> {
        self.stores.lock().get(namespace).cloned()
    }

    /// Namespaces opened through this registry
    pub fn opened(&self) -> BTreeSet<String> {
        self.stores.lock().keys().cloned().collect()
    }

    /// Namespaces present on disk, opened or not
    pub async fn discover(&self) -> Result<BTreeSet<String>> {
        self.directory.discover().await
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
