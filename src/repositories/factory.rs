// src/repositories/factory.rs
//
// Repository factory
//
// The backend family is chosen once from configuration. Each entity has a
// dispatch function returning its trait object for the selected family.

use std::sync::Arc;

use super::document::{
    DocumentActorRepository, DocumentCommentRepository, DocumentEpisodeRepository,
    DocumentFavouriteRepository, DocumentProducerRepository, DocumentSeasonRepository,
    DocumentSerialActorRepository, DocumentSerialFavouriteRepository, DocumentSerialRepository,
    DocumentSerialUserRepository, DocumentStatisticRepository, DocumentUserRepository,
};
use super::*;
use crate::config::{EngineKind, StorageConfig};
use crate::db::{self, RelationalHandle};
use crate::docstore::{self, DocumentHandle, EmbeddedDocumentStore};
use crate::error::AppResult;

/// Connected store of the configured family.
#[derive(Clone)]
pub enum StoreHandle {
    Relational(RelationalHandle),
    Document(DocumentHandle),
}

impl StoreHandle {
    /// Opens the store described by `config`. Does not touch the schema.
    pub fn connect(config: &StorageConfig) -> AppResult<Self> {
        match config.engine {
            EngineKind::Relational => {
                let path = config.resolved_database_path()?;
                log::info!("Opening relational store at {}", path.display());
                let pool = db::create_connection_pool(&path, config.pool_size, config.operation_timeout)?;
                Ok(StoreHandle::Relational(RelationalHandle::new(
                    Arc::new(pool),
                    config.operation_timeout,
                )))
            }
            EngineKind::Document => {
                let path = config.resolved_database_path()?;
                log::info!("Opening document store at {}", path.display());
                let store = EmbeddedDocumentStore::open(&path, config.operation_timeout)?;
                Ok(StoreHandle::Document(Arc::new(store)))
            }
        }
    }

    /// Creates tables or indexes and seeds the Statistic singleton.
    /// Idempotent.
    pub fn initialize(&self) -> AppResult<()> {
        match self {
            StoreHandle::Relational(handle) => {
                let conn = handle.connection()?;
                db::initialize_database(&conn)
            }
            StoreHandle::Document(store) => docstore::initialize_collections(store.as_ref()),
        }
    }

    pub fn engine(&self) -> EngineKind {
        match self {
            StoreHandle::Relational(_) => EngineKind::Relational,
            StoreHandle::Document(_) => EngineKind::Document,
        }
    }
}

pub fn actor_repository(store: &StoreHandle) -> Arc<dyn ActorRepository> {
    match store {
        StoreHandle::Relational(db) => Arc::new(SqliteActorRepository::new(db.clone())),
        StoreHandle::Document(doc) => Arc::new(DocumentActorRepository::new(doc.clone())),
    }
}

pub fn producer_repository(store: &StoreHandle) -> Arc<dyn ProducerRepository> {
    match store {
        StoreHandle::Relational(db) => Arc::new(SqliteProducerRepository::new(db.clone())),
        StoreHandle::Document(doc) => Arc::new(DocumentProducerRepository::new(doc.clone())),
    }
}

pub fn serial_repository(store: &StoreHandle) -> Arc<dyn SerialRepository> {
    match store {
        StoreHandle::Relational(db) => Arc::new(SqliteSerialRepository::new(db.clone())),
        StoreHandle::Document(doc) => Arc::new(DocumentSerialRepository::new(doc.clone())),
    }
}

pub fn season_repository(store: &StoreHandle) -> Arc<dyn SeasonRepository> {
    match store {
        StoreHandle::Relational(db) => Arc::new(SqliteSeasonRepository::new(db.clone())),
        StoreHandle::Document(doc) => Arc::new(DocumentSeasonRepository::new(doc.clone())),
    }
}

pub fn episode_repository(store: &StoreHandle) -> Arc<dyn EpisodeRepository> {
    match store {
        StoreHandle::Relational(db) => Arc::new(SqliteEpisodeRepository::new(db.clone())),
        StoreHandle::Document(doc) => Arc::new(DocumentEpisodeRepository::new(doc.clone())),
    }
}

pub fn comment_repository(store: &StoreHandle) -> Arc<dyn CommentRepository> {
    match store {
        StoreHandle::Relational(db) => Arc::new(SqliteCommentRepository::new(db.clone())),
        StoreHandle::Document(doc) => Arc::new(DocumentCommentRepository::new(doc.clone())),
    }
}

pub fn favourite_repository(store: &StoreHandle) -> Arc<dyn FavouriteRepository> {
    match store {
        StoreHandle::Relational(db) => Arc::new(SqliteFavouriteRepository::new(db.clone())),
        StoreHandle::Document(doc) => Arc::new(DocumentFavouriteRepository::new(doc.clone())),
    }
}

pub fn user_repository(store: &StoreHandle) -> Arc<dyn UserRepository> {
    match store {
        StoreHandle::Relational(db) => Arc::new(SqliteUserRepository::new(db.clone())),
        StoreHandle::Document(doc) => Arc::new(DocumentUserRepository::new(doc.clone())),
    }
}

pub fn serial_actor_repository(store: &StoreHandle) -> Arc<dyn SerialActorRepository> {
    match store {
        StoreHandle::Relational(db) => Arc::new(SqliteSerialActorRepository::new(db.clone())),
        StoreHandle::Document(doc) => Arc::new(DocumentSerialActorRepository::new(doc.clone())),
    }
}

pub fn serial_favourite_repository(store: &StoreHandle) -> Arc<dyn SerialFavouriteRepository> {
    match store {
        StoreHandle::Relational(db) => Arc::new(SqliteSerialFavouriteRepository::new(db.clone())),
        StoreHandle::Document(doc) => Arc::new(DocumentSerialFavouriteRepository::new(doc.clone())),
    }
}

pub fn serial_user_repository(store: &StoreHandle) -> Arc<dyn SerialUserRepository> {
    match store {
        StoreHandle::Relational(db) => Arc::new(SqliteSerialUserRepository::new(db.clone())),
        StoreHandle::Document(doc) => Arc::new(DocumentSerialUserRepository::new(doc.clone())),
    }
}

pub fn statistic_repository(store: &StoreHandle) -> Arc<dyn StatisticRepository> {
    match store {
        StoreHandle::Relational(db) => Arc::new(SqliteStatisticRepository::new(db.clone())),
        StoreHandle::Document(doc) => Arc::new(DocumentStatisticRepository::new(doc.clone())),
    }
}

/// Every repository of one backend family, ready for injection.
#[derive(Clone)]
pub struct Repositories {
    pub actors: Arc<dyn ActorRepository>,
    pub producers: Arc<dyn ProducerRepository>,
    pub serials: Arc<dyn SerialRepository>,
    pub seasons: Arc<dyn SeasonRepository>,
    pub episodes: Arc<dyn EpisodeRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub favourites: Arc<dyn FavouriteRepository>,
    pub users: Arc<dyn UserRepository>,
    pub serial_actors: Arc<dyn SerialActorRepository>,
    pub serial_favourites: Arc<dyn SerialFavouriteRepository>,
    pub serial_users: Arc<dyn SerialUserRepository>,
    pub statistic: Arc<dyn StatisticRepository>,
}

impl Repositories {
    pub fn from_handle(store: &StoreHandle) -> Self {
        log::debug!("Resolving repositories for the {} engine", store.engine());
        Self {
            actors: actor_repository(store),
            producers: producer_repository(store),
            serials: serial_repository(store),
            seasons: season_repository(store),
            episodes: episode_repository(store),
            comments: comment_repository(store),
            favourites: favourite_repository(store),
            users: user_repository(store),
            serial_actors: serial_actor_repository(store),
            serial_favourites: serial_favourite_repository(store),
            serial_users: serial_user_repository(store),
            statistic: statistic_repository(store),
        }
    }
}
