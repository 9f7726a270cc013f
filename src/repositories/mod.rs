// src/repositories/mod.rs
//
// Repository layer
//
// RULES:
// - Repositories are DUMB data mappers
// - NO business logic beyond field validation before a write
// - NO cross-repository calls
// - Explicit SQL / explicit filters only
//
// Every entity has one trait and two adapters: `Sqlite*` here and
// `Document*` under `document/`. `factory` picks the adapter family once.

pub mod actor_repository;
pub mod comment_repository;
pub mod episode_repository;
pub mod favourite_repository;
pub mod producer_repository;
pub mod season_repository;
pub mod serial_actor_repository;
pub mod serial_favourite_repository;
pub mod serial_repository;
pub mod serial_user_repository;
pub mod statistic_repository;
pub mod user_repository;

pub mod document;
pub mod factory;

pub use actor_repository::{ActorRepository, SqliteActorRepository};
pub use comment_repository::{CommentRepository, SqliteCommentRepository};
pub use episode_repository::{EpisodeRepository, SqliteEpisodeRepository};
pub use favourite_repository::{FavouriteRepository, SqliteFavouriteRepository};
pub use producer_repository::{ProducerRepository, SqliteProducerRepository};
pub use season_repository::{SeasonRepository, SqliteSeasonRepository};
pub use serial_actor_repository::{SerialActorRepository, SqliteSerialActorRepository};
pub use serial_favourite_repository::{SerialFavouriteRepository, SqliteSerialFavouriteRepository};
pub use serial_repository::{SerialRepository, SqliteSerialRepository};
pub use serial_user_repository::{SerialUserRepository, SqliteSerialUserRepository};
pub use statistic_repository::{SqliteStatisticRepository, StatisticRepository};
pub use user_repository::{SqliteUserRepository, UserRepository};

pub use factory::{Repositories, StoreHandle};

use crate::domain::Validate;
use crate::error::AppResult;

/// Gate for `create`: the record must satisfy its field rules.
/// A rejected record never reaches the store.
pub(crate) fn check_new<E: Validate>(entity: &E) -> AppResult<()> {
    entity.validate().map_err(|e| {
        log::warn!("{}: rejected create: {}", E::ENTITY, e);
        e.into()
    })
}

/// Gate for `update`: field rules plus a store-issued identifier.
pub(crate) fn check_persisted<E: Validate>(entity: &E) -> AppResult<()> {
    entity.validate_for_update().map_err(|e| {
        log::warn!("{}: rejected update of {}: {}", E::ENTITY, entity.id(), e);
        e.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Favourite, Producer};
    use crate::error::AppError;

    #[test]
    fn test_check_new_accepts_valid_record() {
        assert!(check_new(&Favourite::empty()).is_ok());
    }

    #[test]
    fn test_check_new_rejects_invalid_record() {
        let mut favourite = Favourite::empty();
        favourite.cnt_serials = -1;

        assert!(matches!(check_new(&favourite), Err(AppError::InvalidModel(_))));
    }

    #[test]
    fn test_check_persisted_requires_id() {
        let producer = Producer::new("Vince", "Gilligan");
        assert!(matches!(check_persisted(&producer), Err(AppError::InvalidModel(_))));

        let stored = Producer { id: 4, ..producer };
        assert!(check_persisted(&stored).is_ok());
    }
}
