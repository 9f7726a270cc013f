// src/domain/producer.rs

use serde::{Deserialize, Serialize};

use crate::domain::rules::ensure_not_blank;
use crate::domain::{DomainResult, EntityId, Validate};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Producer {
    pub id: EntityId,
    pub name: String,
    pub surname: String,
}

impl Producer {
    pub fn new(name: impl Into<String>, surname: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            surname: surname.into(),
        }
    }
}

impl Validate for Producer {
    const ENTITY: &'static str = "producer";

    fn id(&self) -> EntityId {
        self.id
    }

    fn validate(&self) -> DomainResult<()> {
        ensure_not_blank(Self::ENTITY, "name", &self.name)?;
        ensure_not_blank(Self::ENTITY, "surname", &self.surname)
    }
}
