use serde::{Deserialize, Serialize};

use crate::domain::{CatalogDate, EntityId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Season {
    pub id: EntityId,
    pub serial_id: EntityId,
    pub name: String,
    pub num: i32,
    pub cnt_episodes: i32,
    pub date: CatalogDate,
}

impl Season {
    pub fn new(serial_id: EntityId, num: i32, name: impl Into<String>, date: CatalogDate) -> Self {
        Self {
            id: 0,
            serial_id,
            name: name.into(),
            num,
            cnt_episodes: 0,
            date,
        }
    }
}
