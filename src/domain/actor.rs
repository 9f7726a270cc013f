// src/domain/actor.rs
//
// Actor Entity
//
// People appearing in serials. Linked to serials through SerialActor.

use serde::{Deserialize, Serialize};

use crate::domain::rules::ensure_not_blank;
use crate::domain::{CatalogDate, DomainResult, EntityId, Validate};

/// An actor record.
/// Two actors are the same person when name, surname, gender and birth
/// date all match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: EntityId,
    pub name: String,
    pub surname: String,
    pub gender: String,
    pub bdate: CatalogDate,
}

impl Actor {
    pub fn new(
        name: impl Into<String>,
        surname: impl Into<String>,
        gender: impl Into<String>,
        bdate: CatalogDate,
    ) -> Self {
        Self {
            id: 0,
            name: name.into(),
            surname: surname.into(),
            gender: gender.into(),
            bdate,
        }
    }
}

impl Validate for Actor {
    const ENTITY: &'static str = "actor";

    fn id(&self) -> EntityId {
        self.id
    }

    fn validate(&self) -> DomainResult<()> {
        ensure_not_blank(Self::ENTITY, "name", &self.name)?;
        ensure_not_blank(Self::ENTITY, "surname", &self.surname)?;
        ensure_not_blank(Self::ENTITY, "gender", &self.gender)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_requires_surname() {
        let bdate = CatalogDate::from_ymd(1976, 4, 5).unwrap();
        assert!(Actor::new("Louis", "Hofmann", "male", bdate).is_valid());
        assert!(!Actor::new("Louis", "", "male", bdate).is_valid());
    }
}
