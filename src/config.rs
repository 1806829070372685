//! Configuration for Memoria
//!
//! Centralized configuration with sensible defaults, overridable from the
//! environment.

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{MemoriaError, Result};

/// Environment variable holding the base data directory
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Environment variable selecting the durability policy
pub const DURABILITY_ENV: &str = "MEMORIA_DURABILITY";

/// Main configuration for a Memoria instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Base directory for all namespaces
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── identity/        (one directory per namespace)
    ///     │   ├── core.json    (one artifact per key)
    ///     │   └── narrative.json
    ///     └── wonder/
    pub data_dir: PathBuf,

    /// Whether writes are fsynced before returning
    pub durability: Durability,
}

/// Sync policy for artifact writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Durability {
    /// fsync the artifact and its directory before a write returns
    #[default]
    Fsync,

    /// Rely on the OS page cache. Writes are still atomic, but a power loss
    /// may roll a key back to an earlier value.
    Buffered,
}

impl FromStr for Durability {
    type Err = MemoriaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fsync" | "sync" | "durable" => Ok(Durability::Fsync),
            "buffered" | "none" => Ok(Durability::Buffered),
            other => Err(MemoriaError::Config(format!(
                "unknown durability '{}', expected 'fsync' or 'buffered'",
                other
            ))),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            durability: Durability::Fsync,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Load configuration from the process environment
    ///
    /// Unset variables fall back to the defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(dir) = lookup(DATA_DIR_ENV) {
            if dir.trim().is_empty() {
                return Err(MemoriaError::Config(format!("{} is empty", DATA_DIR_ENV)));
            }
            config.data_dir = PathBuf::from(dir);
        }

        if let Some(durability) = lookup(DURABILITY_ENV) {
            config.durability = durability.parse()?;
        }

        Ok(config)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the base data directory
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the durability policy
    pub fn durability(mut self, durability: Durability) -> Self {
        self.config.durability = durability;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
