use super::entity::Season;
use crate::domain::rules::{ensure_id, ensure_non_negative, ensure_not_blank};
use crate::domain::{DomainResult, EntityId, Validate};

pub fn validate_season(season: &Season) -> DomainResult<()> {
    ensure_id("season", "serial_id", season.serial_id)?;
    ensure_not_blank("season", "name", &season.name)?;
    ensure_non_negative("season", "num", season.num)?;
    ensure_non_negative("season", "cnt_episodes", season.cnt_episodes)?;
    Ok(())
}

impl Validate for Season {
    const ENTITY: &'static str = "season";

    fn id(&self) -> EntityId {
        self.id
    }

    fn validate(&self) -> DomainResult<()> {
        validate_season(self)
    }
}
