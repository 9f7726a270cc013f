// src/docstore/embedded.rs
//
// In-process document engine.
//
// One `RwLock` guards every collection; each operation acquires it with
// the configured timeout, so a stalled writer turns into `Timeout` for
// everyone waiting behind it rather than an unbounded wait.
//
// A store opened on a file keeps a JSON snapshot of every collection and
// sequence there. Each state-changing operation rewrites the snapshot
// (temporary file, then rename) before it releases the write lock.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::filter::{compare_values, values_equal};
use super::{
    Accumulator, Document, DocumentStore, Filter, FindOptions, ObjectId, SortOrder, Stage, Update,
    OBJECT_ID_FIELD,
};
use crate::error::{AppError, AppResult};

#[derive(Default)]
struct Collection {
    docs: Vec<(ObjectId, Document)>,
    unique_fields: Vec<String>,
}

impl Collection {
    /// Rejects `candidate` if it repeats a uniquely indexed value held by
    /// any document other than the one at `skip`.
    fn check_unique(&self, name: &str, candidate: &Document, skip: Option<usize>) -> AppResult<()> {
        for field in &self.unique_fields {
            let Some(value) = candidate.get(field) else {
                continue;
            };
            let clash = self.docs.iter().enumerate().any(|(i, (_, doc))| {
                Some(i) != skip && doc.get(field).map_or(false, |v| values_equal(v, value))
            });
            if clash {
                return Err(AppError::Duplicate(format!("{}.{} = {}", name, field, value)));
            }
        }
        Ok(())
    }

    fn position(&self, filter: &Filter) -> Option<usize> {
        self.docs.iter().position(|(_, doc)| filter.matches(doc))
    }
}

#[derive(Default)]
struct EngineState {
    collections: HashMap<String, Collection>,
    counters: HashMap<String, i64>,
}

/// On-disk form of one collection.
#[derive(Serialize, Deserialize)]
struct StoredCollection<D> {
    #[serde(default)]
    unique_fields: Vec<String>,
    #[serde(default)]
    documents: Vec<D>,
}

/// On-disk form of the whole engine. Written from borrowed state, read
/// back into owned documents.
#[derive(Serialize, Deserialize)]
struct Snapshot<D, C> {
    #[serde(default)]
    collections: BTreeMap<String, StoredCollection<D>>,
    #[serde(default)]
    counters: C,
}

impl EngineState {
    fn load(path: &Path) -> AppResult<Self> {
        let raw = fs::read_to_string(path)?;
        let snapshot: Snapshot<Document, HashMap<String, i64>> = serde_json::from_str(&raw)
            .map_err(|e| AppError::Document(format!("unreadable snapshot {}: {}", path.display(), e)))?;

        let mut collections = HashMap::new();
        for (name, stored) in snapshot.collections {
            let docs = stored
                .documents
                .into_iter()
                .map(|mut doc| -> AppResult<(ObjectId, Document)> {
                    let stored = doc
                        .get(OBJECT_ID_FIELD)
                        .and_then(Value::as_str)
                        .map(ObjectId::parse_str)
                        .transpose()?;
                    let id = match stored {
                        Some(id) => id,
                        None => {
                            let id = ObjectId::new();
                            doc.insert(OBJECT_ID_FIELD.to_string(), Value::from(id.to_hex()));
                            id
                        }
                    };
                    Ok((id, doc))
                })
                .collect::<AppResult<Vec<_>>>()?;
            collections.insert(
                name,
                Collection {
                    docs,
                    unique_fields: stored.unique_fields,
                },
            );
        }

        Ok(Self {
            collections,
            counters: snapshot.counters,
        })
    }

    fn save(&self, path: &Path) -> AppResult<()> {
        let snapshot = Snapshot {
            collections: self
                .collections
                .iter()
                .map(|(name, coll)| {
                    let stored = StoredCollection {
                        unique_fields: coll.unique_fields.clone(),
                        documents: coll.docs.iter().map(|(_, doc)| doc).collect::<Vec<_>>(),
                    };
                    (name.clone(), stored)
                })
                .collect(),
            counters: &self.counters,
        };
        let bytes = serde_json::to_vec(&snapshot)?;

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let mut file = File::create(&tmp)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

pub struct EmbeddedDocumentStore {
    state: RwLock<EngineState>,
    timeout: Duration,
    path: Option<PathBuf>,
}

impl EmbeddedDocumentStore {
    /// A store that lives in memory only.
    pub fn new(timeout: Duration) -> Self {
        Self {
            state: RwLock::new(EngineState::default()),
            timeout,
            path: None,
        }
    }

    /// A store persisted at `path`. An existing snapshot is loaded; a
    /// missing one starts an empty store. Parent directories are created.
    pub fn open(path: &Path, timeout: Duration) -> AppResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let state = if path.exists() {
            EngineState::load(path)?
        } else {
            EngineState::default()
        };
        log::debug!(
            "docstore opened {} ({} collections)",
            path.display(),
            state.collections.len()
        );

        Ok(Self {
            state: RwLock::new(state),
            timeout,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Writes the snapshot of a changed state. Callers hold the write lock.
    fn persist(&self, state: &EngineState) -> AppResult<()> {
        match &self.path {
            Some(path) => state.save(path).map_err(|e| {
                log::error!("docstore: snapshot to {} failed: {}", path.display(), e);
                e
            }),
            None => Ok(()),
        }
    }

    fn read(&self, op: &str) -> AppResult<RwLockReadGuard<'_, EngineState>> {
        self.state
            .try_read_for(self.timeout)
            .ok_or_else(|| AppError::Timeout(format!("document store {} after {:?}", op, self.timeout)))
    }

    fn write(&self, op: &str) -> AppResult<RwLockWriteGuard<'_, EngineState>> {
        self.state
            .try_write_for(self.timeout)
            .ok_or_else(|| AppError::Timeout(format!("document store {} after {:?}", op, self.timeout)))
    }
}

fn sort_documents(docs: &mut [Document], field: &str, order: SortOrder) {
    docs.sort_by(|a, b| {
        let ord = match (a.get(field), b.get(field)) {
            (Some(x), Some(y)) => compare_values(x, y).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        match order {
            SortOrder::Ascending => ord,
            SortOrder::Descending => ord.reverse(),
        }
    });
}

fn apply_update(doc: &mut Document, update: &Update) -> AppResult<()> {
    match update {
        Update::Set(fields) => {
            for (key, value) in fields {
                doc.insert(key.clone(), value.clone());
            }
        }
        Update::Inc(field, delta) => {
            let current = match doc.get(field) {
                None | Some(Value::Null) => 0,
                Some(value) => value.as_i64().ok_or_else(|| {
                    AppError::Document(format!("cannot increment non-integer field {}", field))
                })?,
            };
            doc.insert(field.clone(), Value::from(current + delta));
        }
    }
    Ok(())
}

fn group_documents(
    docs: Vec<Document>,
    key: &Option<String>,
    accumulators: &[(String, Accumulator)],
) -> Vec<Document> {
    let mut groups: Vec<(Value, Vec<Document>)> = Vec::new();
    for doc in docs {
        let group_key = key
            .as_ref()
            .and_then(|field| doc.get(field).cloned())
            .unwrap_or(Value::Null);
        match groups.iter_mut().find(|(k, _)| values_equal(k, &group_key)) {
            Some((_, members)) => members.push(doc),
            None => groups.push((group_key, vec![doc])),
        }
    }

    groups
        .into_iter()
        .map(|(group_key, members)| {
            let mut out = Document::new();
            out.insert(OBJECT_ID_FIELD.to_string(), group_key);
            for (name, accumulator) in accumulators {
                let value = match accumulator {
                    Accumulator::Count => Value::from(members.len() as i64),
                    Accumulator::Sum(field) => sum_field(&members, field),
                };
                out.insert(name.clone(), value);
            }
            out
        })
        .collect()
}

/// Integer sum while every value is an integer, float sum otherwise.
/// Non-numeric and missing values are skipped.
fn sum_field(docs: &[Document], field: &str) -> Value {
    let numbers: Vec<&serde_json::Number> = docs
        .iter()
        .filter_map(|d| match d.get(field) {
            Some(Value::Number(n)) => Some(n),
            _ => None,
        })
        .collect();

    if numbers.iter().all(|n| n.is_i64()) {
        Value::from(numbers.iter().filter_map(|n| n.as_i64()).sum::<i64>())
    } else {
        Value::from(numbers.iter().filter_map(|n| n.as_f64()).sum::<f64>())
    }
}

impl DocumentStore for EmbeddedDocumentStore {
    fn insert_one(&self, collection: &str, mut doc: Document) -> AppResult<ObjectId> {
        let mut state = self.write("insert")?;
        let coll = state.collections.entry(collection.to_string()).or_default();

        coll.check_unique(collection, &doc, None)?;

        let id = ObjectId::new();
        doc.insert(OBJECT_ID_FIELD.to_string(), Value::from(id.to_hex()));
        coll.docs.push((id, doc));
        self.persist(&state)?;

        log::debug!("docstore insert {} -> {}", collection, id);
        Ok(id)
    }

    fn find(&self, collection: &str, filter: &Filter, options: &FindOptions) -> AppResult<Vec<Document>> {
        let state = self.read("find")?;
        let Some(coll) = state.collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut docs: Vec<Document> = coll
            .docs
            .iter()
            .filter(|(_, doc)| filter.matches(doc))
            .map(|(_, doc)| doc.clone())
            .collect();
        drop(state);

        if let Some((field, order)) = &options.sort {
            sort_documents(&mut docs, field, *order);
        }
        if let Some(limit) = options.limit {
            docs.truncate(limit);
        }
        Ok(docs)
    }

    fn replace_one(&self, collection: &str, filter: &Filter, mut doc: Document) -> AppResult<u64> {
        let mut state = self.write("replace")?;
        let Some(coll) = state.collections.get_mut(collection) else {
            return Ok(0);
        };
        let Some(index) = coll.position(filter) else {
            return Ok(0);
        };

        coll.check_unique(collection, &doc, Some(index))?;

        let (id, slot) = &mut coll.docs[index];
        doc.insert(OBJECT_ID_FIELD.to_string(), Value::from(id.to_hex()));
        *slot = doc;
        self.persist(&state)?;
        Ok(1)
    }

    fn update_one(&self, collection: &str, filter: &Filter, update: &Update) -> AppResult<u64> {
        let mut state = self.write("update")?;
        let Some(coll) = state.collections.get_mut(collection) else {
            return Ok(0);
        };
        let Some(index) = coll.position(filter) else {
            return Ok(0);
        };

        let mut updated = coll.docs[index].1.clone();
        apply_update(&mut updated, update)?;
        coll.check_unique(collection, &updated, Some(index))?;
        coll.docs[index].1 = updated;
        self.persist(&state)?;
        Ok(1)
    }

    fn delete_one(&self, collection: &str, filter: &Filter) -> AppResult<u64> {
        let mut state = self.write("delete")?;
        let Some(coll) = state.collections.get_mut(collection) else {
            return Ok(0);
        };
        match coll.position(filter) {
            Some(index) => {
                coll.docs.remove(index);
                self.persist(&state)?;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn delete_many(&self, collection: &str, filter: &Filter) -> AppResult<u64> {
        let mut state = self.write("delete")?;
        let Some(coll) = state.collections.get_mut(collection) else {
            return Ok(0);
        };
        let before = coll.docs.len();
        coll.docs.retain(|(_, doc)| !filter.matches(doc));
        let removed = (before - coll.docs.len()) as u64;
        if removed > 0 {
            self.persist(&state)?;
        }
        Ok(removed)
    }

    fn count_documents(&self, collection: &str, filter: &Filter, limit: Option<u64>) -> AppResult<u64> {
        let state = self.read("count")?;
        let Some(coll) = state.collections.get(collection) else {
            return Ok(0);
        };
        let matching = coll.docs.iter().filter(|(_, doc)| filter.matches(doc));
        let count = match limit {
            Some(limit) => matching.take(limit as usize).count(),
            None => matching.count(),
        };
        Ok(count as u64)
    }

    fn aggregate(&self, collection: &str, pipeline: &[Stage]) -> AppResult<Vec<Document>> {
        let mut docs = self.find(collection, &Filter::All, &FindOptions::default())?;

        for stage in pipeline {
            docs = match stage {
                Stage::Match(filter) => docs.into_iter().filter(|d| filter.matches(d)).collect(),
                Stage::Group { key, accumulators } => group_documents(docs, key, accumulators),
            };
        }
        Ok(docs)
    }

    fn next_sequence(&self, name: &str) -> AppResult<i64> {
        let mut state = self.write("sequence")?;
        let counter = state.counters.entry(name.to_string()).or_insert(0);
        *counter += 1;
        let value = *counter;
        self.persist(&state)?;
        Ok(value)
    }

    fn create_unique_index(&self, collection: &str, field: &str) -> AppResult<()> {
        let mut state = self.write("index")?;
        let coll = state.collections.entry(collection.to_string()).or_default();
        if coll.unique_fields.iter().any(|f| f == field) {
            return Ok(());
        }

        for (i, (_, doc)) in coll.docs.iter().enumerate() {
            if let Some(value) = doc.get(field) {
                let clash = coll.docs[i + 1..]
                    .iter()
                    .any(|(_, other)| other.get(field).map_or(false, |v| values_equal(v, value)));
                if clash {
                    return Err(AppError::Duplicate(format!("{}.{} = {}", collection, field, value)));
                }
            }
        }

        coll.unique_fields.push(field.to_string());
        self.persist(&state)?;
        log::debug!("docstore unique index {}.{}", collection, field);
        Ok(())
    }
}
