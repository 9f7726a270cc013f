use super::entity::Episode;
use crate::domain::rules::{ensure_id, ensure_non_negative, ensure_not_blank};
use crate::domain::{DomainResult, EntityId, Validate};

/// Validates all Episode invariants
pub fn validate_episode(episode: &Episode) -> DomainResult<()> {
    ensure_id("episode", "season_id", episode.season_id)?;
    ensure_not_blank("episode", "name", &episode.name)?;
    ensure_non_negative("episode", "num", episode.num)?;
    ensure_non_negative("episode", "duration", episode.duration)?;
    Ok(())
}

impl Validate for Episode {
    const ENTITY: &'static str = "episode";

    fn id(&self) -> EntityId {
        self.id
    }

    fn validate(&self) -> DomainResult<()> {
        validate_episode(self)
    }
}

/// Invariants that must hold true for Episode domain:
///
/// 1. Episode belongs to exactly ONE Season
/// 2. Duration is counted in whole minutes and never negative
/// 3. Identity is issued by the store and never changes
