// src/lib.rs
// SerialHub - Media catalog storage layer
//
// Architecture:
// - Domain: entities, field rules, derived-state helpers
// - Repositories: one contract per entity, relational and document adapters
// - Factory: backend family chosen once from configuration
// - Services: flows that maintain derived state (durations, statistics)

// ============================================================================
// FOUNDATION
// ============================================================================

pub mod config;
pub mod db;
pub mod docstore;
pub mod domain;
pub mod error;
pub mod logging;
pub mod repositories;
pub mod services;

// ============================================================================
// PUBLIC API - Domain Entities
// ============================================================================

pub use domain::{
    Actor,
    CatalogDate,
    Comment,
    DomainError,
    DurationTotal,
    EntityId,
    Episode,
    Favourite,
    Producer,
    Season,
    Serial,
    SerialActor,
    SerialFavourite,
    SerialUser,
    Statistic,
    StatisticBucket,
    User,
    Validate,
    STATISTIC_ID,
};

// ============================================================================
// PUBLIC API - Error Types
// ============================================================================

pub use error::{AppError, AppResult};

// ============================================================================
// PUBLIC API - Configuration & Storage
// ============================================================================

pub use config::{EngineKind, StorageConfig};
pub use db::{create_connection_pool, initialize_database, ConnectionPool, RelationalHandle};
pub use docstore::{DocumentHandle, DocumentStore, EmbeddedDocumentStore};

// ============================================================================
// PUBLIC API - Repositories
// ============================================================================

pub use repositories::{
    ActorRepository,
    CommentRepository,
    EpisodeRepository,
    FavouriteRepository,
    ProducerRepository,
    Repositories,
    SeasonRepository,
    SerialActorRepository,
    SerialFavouriteRepository,
    SerialRepository,
    SerialUserRepository,
    StatisticRepository,
    StoreHandle,
    UserRepository,
};

// ============================================================================
// PUBLIC API - Services
// ============================================================================

pub use services::{AggregateService, NewUser, SerialService, Services, UserService};
