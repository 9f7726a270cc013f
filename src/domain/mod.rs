// src/domain/mod.rs
//
// Domain Root
//
// Declares every catalog entity and re-exports the public domain API.
// Other modules import from `crate::domain::*`.

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod actor;
pub mod comment;
pub mod date;
pub mod episode;
pub mod favourite;
pub mod links;
pub mod producer;
pub mod rules;
pub mod season;
pub mod serial;
pub mod statistic;
pub mod user;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

pub use actor::Actor;
pub use comment::Comment;
pub use date::CatalogDate;
pub use episode::Episode;
pub use favourite::Favourite;
pub use links::{SerialActor, SerialFavourite, SerialUser};
pub use producer::Producer;
pub use season::Season;
pub use serial::{DurationTotal, Serial};
pub use statistic::{Statistic, StatisticBucket, STATISTIC_ID};
pub use user::User;

/// Store-issued identifier, shared by both backends.
pub type EntityId = i64;

// ============================================================================
// VALIDATION CONTRACT
// ============================================================================

/// Validation predicate every persisted record carries.
///
/// `validate` covers the field rules that hold before a create;
/// `validate_for_update` additionally requires a store-issued identifier.
pub trait Validate {
    /// Entity name used in error messages and logs.
    const ENTITY: &'static str;

    fn id(&self) -> EntityId;

    fn validate(&self) -> DomainResult<()>;

    fn validate_for_update(&self) -> DomainResult<()> {
        rules::ensure_id(Self::ENTITY, "id", self.id())?;
        self.validate()
    }

    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

// ============================================================================
// DOMAIN ERROR TYPES
// ============================================================================

use thiserror::Error;

/// Domain-level errors
/// These represent violations of field rules and invariants
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Invalid date '{0}'")]
    InvalidDate(String),

    #[error("Counter {bucket} would become negative ({value})")]
    NegativeCounter { bucket: String, value: i64 },
}

/// Domain result type
pub type DomainResult<T> = Result<T, DomainError>;
