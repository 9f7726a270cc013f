// src/config.rs
//
// Storage configuration
//
// Resolved once at startup, either from the environment (after loading a
// `.env` file when present) or from a TOML document.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::db;
use crate::docstore;
use crate::error::{AppError, AppResult};

pub const ENV_ENGINE: &str = "SERIALHUB_ENGINE";
pub const ENV_DATABASE_PATH: &str = "SERIALHUB_DATABASE_PATH";
pub const ENV_POOL_SIZE: &str = "SERIALHUB_POOL_SIZE";
pub const ENV_OPERATION_TIMEOUT: &str = "SERIALHUB_OPERATION_TIMEOUT_SECS";

pub const DEFAULT_POOL_SIZE: u32 = 15;
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Backend family serving every repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineKind {
    #[default]
    Relational,
    Document,
}

impl EngineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::Relational => "relational",
            EngineKind::Document => "document",
        }
    }
}

impl FromStr for EngineKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "relational" | "sqlite" | "sql" => Ok(EngineKind::Relational),
            "document" | "embedded" | "mongo" => Ok(EngineKind::Document),
            other => Err(AppError::Config(format!("Unknown storage engine '{}'", other))),
        }
    }
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StorageConfig {
    pub engine: EngineKind,
    /// `None` resolves to the per-user data directory.
    pub database_path: Option<PathBuf>,
    pub pool_size: u32,
    pub operation_timeout: Duration,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::default(),
            database_path: None,
            pool_size: DEFAULT_POOL_SIZE,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }
}

/// On-disk shape, every key optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawStorageConfig {
    engine: Option<String>,
    database_path: Option<PathBuf>,
    pool_size: Option<u32>,
    operation_timeout_secs: Option<u64>,
}

impl RawStorageConfig {
    fn resolve(self) -> AppResult<StorageConfig> {
        let defaults = StorageConfig::default();

        let engine = match self.engine {
            Some(name) => name.parse()?,
            None => defaults.engine,
        };

        let pool_size = self.pool_size.unwrap_or(defaults.pool_size);
        if pool_size == 0 {
            return Err(AppError::Config("Pool size must be at least 1".to_string()));
        }

        let operation_timeout = match self.operation_timeout_secs {
            Some(0) => {
                return Err(AppError::Config(
                    "Operation timeout must be greater than zero".to_string(),
                ))
            }
            Some(secs) => Duration::from_secs(secs),
            None => defaults.operation_timeout,
        };

        Ok(StorageConfig {
            engine,
            database_path: self.database_path,
            pool_size,
            operation_timeout,
        })
    }
}

impl StorageConfig {
    /// Read `SERIALHUB_*` variables, loading `.env` first if present.
    pub fn from_env() -> AppResult<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, over an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pool_size = match lookup(ENV_POOL_SIZE) {
            Some(raw) => Some(raw.trim().parse::<u32>().map_err(|e| {
                AppError::Config(format!("{} must be a positive integer: {}", ENV_POOL_SIZE, e))
            })?),
            None => None,
        };

        let operation_timeout_secs = match lookup(ENV_OPERATION_TIMEOUT) {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|e| {
                AppError::Config(format!("{} must be a number of seconds: {}", ENV_OPERATION_TIMEOUT, e))
            })?),
            None => None,
        };

        RawStorageConfig {
            engine: lookup(ENV_ENGINE),
            database_path: lookup(ENV_DATABASE_PATH).map(PathBuf::from),
            pool_size,
            operation_timeout_secs,
        }
        .resolve()
    }

    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        let raw: RawStorageConfig = toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Invalid storage configuration: {}", e)))?;
        raw.resolve()
    }

    /// Configured path, or the engine's default data-directory location.
    pub fn resolved_database_path(&self) -> AppResult<PathBuf> {
        match &self.database_path {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                Ok(path.clone())
            }
            None => match self.engine {
                EngineKind::Relational => db::get_database_path(),
                EngineKind::Document => docstore::get_store_path(),
            },
        }
    }
}
