// src/domain/favourite.rs

use serde::{Deserialize, Serialize};

use crate::domain::rules::ensure_non_negative;
use crate::domain::{DomainResult, EntityId, Validate};

/// A user's favourites container.
/// `cnt_serials` mirrors the number of SerialFavourite rows pointing at it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favourite {
    pub id: EntityId,
    pub cnt_serials: i64,
}

impl Favourite {
    pub fn empty() -> Self {
        Self { id: 0, cnt_serials: 0 }
    }
}

impl Validate for Favourite {
    const ENTITY: &'static str = "favourite";

    fn id(&self) -> EntityId {
        self.id
    }

    fn validate(&self) -> DomainResult<()> {
        ensure_non_negative(Self::ENTITY, "cnt_serials", self.cnt_serials)
    }
}
