// src/docstore/mod.rs
//
// Document store
//
// Collections of JSON documents behind the `DocumentStore` trait:
// opaque object ids, filters, atomic field updates, a match/group
// aggregation pipeline, unique indexes and named sequences.
// `EmbeddedDocumentStore` is the in-process engine, persisted to a JSON
// snapshot file.

pub mod collections;
pub mod embedded;
pub mod filter;

use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{AppError, AppResult};

pub use collections::initialize_collections;
pub use embedded::EmbeddedDocumentStore;
pub use filter::{contains_pattern, Filter};

/// Get the default document snapshot path
///
/// Path structure: {APP_DATA}/serialhub/serialhub.docs.json
pub fn get_store_path() -> AppResult<PathBuf> {
    let app_data_dir = dirs::data_dir()
        .ok_or_else(|| AppError::Config("Could not determine app data directory".to_string()))?;

    let serialhub_dir = app_data_dir.join("serialhub");
    std::fs::create_dir_all(&serialhub_dir)?;

    Ok(serialhub_dir.join("serialhub.docs.json"))
}

/// A stored document: a JSON object.
pub type Document = serde_json::Map<String, Value>;

/// Shared document store handle, cloned into every document repository.
pub type DocumentHandle = Arc<dyn DocumentStore>;

/// Field holding the opaque identifier inside each document.
pub const OBJECT_ID_FIELD: &str = "_id";

/// Opaque 12-byte document identifier. Never exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    pub fn new() -> Self {
        let mut bytes = [0u8; 12];
        bytes.copy_from_slice(&uuid::Uuid::new_v4().as_bytes()[..12]);
        Self(bytes)
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }

    pub fn parse_str(hex: &str) -> AppResult<Self> {
        if hex.len() != 24 || !hex.is_ascii() {
            return Err(AppError::InvalidIdentifier(hex.to_string()));
        }
        let mut bytes = [0u8; 12];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
                .map_err(|_| AppError::InvalidIdentifier(hex.to_string()))?;
        }
        Ok(Self(bytes))
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    pub sort: Option<(String, SortOrder)>,
    pub limit: Option<usize>,
}

impl FindOptions {
    pub fn sorted_by(field: &str) -> Self {
        Self {
            sort: Some((field.to_string(), SortOrder::Ascending)),
            limit: None,
        }
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Single-document modification applied atomically.
#[derive(Debug, Clone)]
pub enum Update {
    /// Overwrite the listed fields.
    Set(Document),
    /// Add to an integer field; a missing field counts as 0.
    Inc(String, i64),
}

#[derive(Debug, Clone)]
pub enum Accumulator {
    Sum(String),
    Count,
}

/// Aggregation pipeline stage.
#[derive(Debug, Clone)]
pub enum Stage {
    Match(Filter),
    /// Groups by `key` (None groups everything together). The output
    /// document carries the key under `_id` plus one field per accumulator.
    Group {
        key: Option<String>,
        accumulators: Vec<(String, Accumulator)>,
    },
}

/// Capability surface every document engine offers.
///
/// All operations are bounded by the engine's operation timeout and fail
/// with `AppError::Timeout` once it elapses.
pub trait DocumentStore: Send + Sync {
    fn insert_one(&self, collection: &str, doc: Document) -> AppResult<ObjectId>;

    fn find(&self, collection: &str, filter: &Filter, options: &FindOptions) -> AppResult<Vec<Document>>;

    fn find_one(&self, collection: &str, filter: &Filter) -> AppResult<Option<Document>> {
        let mut docs = self.find(collection, filter, &FindOptions::default().limit(1))?;
        Ok(docs.pop())
    }

    /// Replaces the first match, keeping its object id. Returns the match count.
    fn replace_one(&self, collection: &str, filter: &Filter, doc: Document) -> AppResult<u64>;

    fn update_one(&self, collection: &str, filter: &Filter, update: &Update) -> AppResult<u64>;

    fn delete_one(&self, collection: &str, filter: &Filter) -> AppResult<u64>;

    fn delete_many(&self, collection: &str, filter: &Filter) -> AppResult<u64>;

    fn count_documents(&self, collection: &str, filter: &Filter, limit: Option<u64>) -> AppResult<u64>;

    fn aggregate(&self, collection: &str, pipeline: &[Stage]) -> AppResult<Vec<Document>>;

    /// Atomically advances the named sequence and returns the new value,
    /// starting at 1.
    fn next_sequence(&self, name: &str) -> AppResult<i64>;

    /// Idempotent. Fails with `Duplicate` if existing documents already clash.
    fn create_unique_index(&self, collection: &str, field: &str) -> AppResult<()>;
}
