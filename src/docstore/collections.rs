// src/docstore/collections.rs
//
// Collection layout of the catalog, mirroring schema.sql.

use serde_json::Value;

use super::{Document, DocumentStore, Filter};
use crate::domain::{StatisticBucket, STATISTIC_ID};
use crate::error::{AppError, AppResult};

pub const ACTORS: &str = "actors";
pub const PRODUCERS: &str = "producers";
pub const SERIALS: &str = "serials";
pub const SEASONS: &str = "seasons";
pub const EPISODES: &str = "episodes";
pub const COMMENTS: &str = "comments";
pub const FAVOURITES: &str = "favourites";
pub const USERS: &str = "users";
pub const SERIALS_ACTORS: &str = "serials_actors";
pub const SERIALS_FAVOURITES: &str = "serials_favourites";
pub const SERIALS_USERS: &str = "serials_users";
pub const STATISTIC: &str = "statistic";

/// Numeric identifier field of each collection.
pub const ID_FIELDS: [(&str, &str); 12] = [
    (ACTORS, "a_id"),
    (PRODUCERS, "p_id"),
    (SERIALS, "s_id"),
    (SEASONS, "ss_id"),
    (EPISODES, "e_id"),
    (COMMENTS, "c_id"),
    (FAVOURITES, "f_id"),
    (USERS, "u_id"),
    (SERIALS_ACTORS, "sa_id"),
    (SERIALS_FAVOURITES, "sf_id"),
    (SERIALS_USERS, "su_id"),
    (STATISTIC, "st_id"),
];

/// Natural keys that must stay unique.
pub const NATURAL_KEYS: [(&str, &str); 2] = [(USERS, "u_login"), (SERIALS, "s_name")];

/// Declares every unique index and seeds the Statistic singleton.
/// Safe to call on every startup.
pub fn initialize_collections(store: &dyn DocumentStore) -> AppResult<()> {
    for (collection, field) in ID_FIELDS.iter().chain(NATURAL_KEYS.iter()) {
        store.create_unique_index(collection, field)?;
    }

    let seeded = store.count_documents(STATISTIC, &Filter::eq("st_id", STATISTIC_ID), Some(1))?;
    if seeded == 0 {
        let mut doc = Document::new();
        doc.insert("st_id".to_string(), Value::from(STATISTIC_ID));
        for bucket in StatisticBucket::ALL {
            doc.insert(bucket.column().to_string(), Value::from(0_i64));
        }
        match store.insert_one(STATISTIC, doc) {
            Ok(_) | Err(AppError::Duplicate(_)) => {}
            Err(e) => return Err(e),
        }
        log::info!("Seeded statistic singleton");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docstore::EmbeddedDocumentStore;
    use std::time::Duration;

    #[test]
    fn test_initialize_is_idempotent() {
        let store = EmbeddedDocumentStore::new(Duration::from_secs(5));
        initialize_collections(&store).unwrap();
        initialize_collections(&store).unwrap();

        assert_eq!(store.count_documents(STATISTIC, &Filter::All, None).unwrap(), 1);
    }

    #[test]
    fn test_second_statistic_is_rejected() {
        let store = EmbeddedDocumentStore::new(Duration::from_secs(5));
        initialize_collections(&store).unwrap();

        let mut doc = Document::new();
        doc.insert("st_id".to_string(), Value::from(STATISTIC_ID));
        assert!(matches!(store.insert_one(STATISTIC, doc), Err(AppError::Duplicate(_))));
    }
}
