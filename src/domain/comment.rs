// src/domain/comment.rs
//
// Comment Entity
//
// A user's text about a serial. One comment per (user, serial) pair is
// what callers check for before creating.

use serde::{Deserialize, Serialize};

use crate::domain::rules::{ensure_id, ensure_not_blank};
use crate::domain::{CatalogDate, DomainResult, EntityId, Validate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: EntityId,
    pub text: String,
    pub date: CatalogDate,
    pub user_id: EntityId,
    pub serial_id: EntityId,
}

impl Comment {
    pub fn new(user_id: EntityId, serial_id: EntityId, text: impl Into<String>, date: CatalogDate) -> Self {
        Self {
            id: 0,
            text: text.into(),
            date,
            user_id,
            serial_id,
        }
    }
}

impl Validate for Comment {
    const ENTITY: &'static str = "comment";

    fn id(&self) -> EntityId {
        self.id
    }

    fn validate(&self) -> DomainResult<()> {
        ensure_not_blank(Self::ENTITY, "text", &self.text)?;
        ensure_id(Self::ENTITY, "user_id", self.user_id)?;
        ensure_id(Self::ENTITY, "serial_id", self.serial_id)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_needs_both_parents() {
        let date = CatalogDate::from_ymd(2024, 2, 2).unwrap();
        assert!(Comment::new(1, 2, "great", date).is_valid());
        assert!(!Comment::new(0, 2, "great", date).is_valid());
        assert!(!Comment::new(1, 2, "  ", date).is_valid());
    }
}
