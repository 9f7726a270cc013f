use serde::{Deserialize, Serialize};

use crate::domain::{CatalogDate, EntityId};

/// A single episode belonging to a Season
/// Episodes are the source of a serial's duration roll-up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    /// Store-issued identifier
    pub id: EntityId,

    /// Reference to parent Season (REQUIRED)
    pub season_id: EntityId,

    pub name: String,

    /// Position inside the season
    pub num: i32,

    /// Length in minutes
    pub duration: i64,

    /// Air date
    pub date: CatalogDate,
}

impl Episode {
    /// Create a new Episode
    /// season_id MUST be valid (checked by caller)
    pub fn new(season_id: EntityId, num: i32, name: impl Into<String>, duration: i64, date: CatalogDate) -> Self {
        Self {
            id: 0,
            season_id,
            name: name.into(),
            num,
            duration,
            date,
        }
    }
}
