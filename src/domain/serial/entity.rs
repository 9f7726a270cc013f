use serde::{Deserialize, Serialize};

use crate::domain::EntityId;

/// A series in the catalog.
/// `duration` is derived: the sum of its episodes' minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Serial {
    pub id: EntityId,
    pub producer_id: EntityId,
    pub name: String,
    pub description: String,
    pub year: i32,
    pub genre: String,
    pub rating: f64,
    pub seasons: i32,
    pub state: String,
    pub img: String,
    pub duration: i64,
}

impl Serial {
    /// A serial not yet persisted; the store issues the id.
    pub fn new(producer_id: EntityId, name: impl Into<String>, year: i32) -> Self {
        Self {
            id: 0,
            producer_id,
            name: name.into(),
            description: String::new(),
            year,
            genre: String::new(),
            rating: 0.0,
            seasons: 0,
            state: String::new(),
            img: String::new(),
            duration: 0,
        }
    }
}

/// Result of the episode-duration roll-up for one serial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DurationTotal {
    pub episodes: i64,
    pub minutes: i64,
}
