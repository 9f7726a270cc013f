// src/domain/links.rs
//
// Join Entities
//
// Many-to-many relationships between a Serial and another parent.
// Each row carries a surrogate id, but existence is always asked by the
// parent pair.

use serde::{Deserialize, Serialize};

use crate::domain::rules::ensure_id;
use crate::domain::{CatalogDate, DomainResult, EntityId, Validate};

/// Serial N-M Actor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialActor {
    pub id: EntityId,
    pub serial_id: EntityId,
    pub actor_id: EntityId,
}

/// Serial N-M Favourite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialFavourite {
    pub id: EntityId,
    pub serial_id: EntityId,
    pub favourite_id: EntityId,
}

/// Serial N-M User. `last_seen` is the watch progress marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerialUser {
    pub id: EntityId,
    pub serial_id: EntityId,
    pub user_id: EntityId,
    pub last_seen: CatalogDate,
}

impl SerialActor {
    pub fn new(serial_id: EntityId, actor_id: EntityId) -> Self {
        Self { id: 0, serial_id, actor_id }
    }
}

impl SerialFavourite {
    pub fn new(serial_id: EntityId, favourite_id: EntityId) -> Self {
        Self { id: 0, serial_id, favourite_id }
    }
}

impl SerialUser {
    pub fn new(serial_id: EntityId, user_id: EntityId, last_seen: CatalogDate) -> Self {
        Self {
            id: 0,
            serial_id,
            user_id,
            last_seen,
        }
    }
}

impl Validate for SerialActor {
    const ENTITY: &'static str = "serial_actor";

    fn id(&self) -> EntityId {
        self.id
    }

    fn validate(&self) -> DomainResult<()> {
        ensure_id(Self::ENTITY, "serial_id", self.serial_id)?;
        ensure_id(Self::ENTITY, "actor_id", self.actor_id)
    }
}

impl Validate for SerialFavourite {
    const ENTITY: &'static str = "serial_favourite";

    fn id(&self) -> EntityId {
        self.id
    }

    fn validate(&self) -> DomainResult<()> {
        ensure_id(Self::ENTITY, "serial_id", self.serial_id)?;
        ensure_id(Self::ENTITY, "favourite_id", self.favourite_id)
    }
}

impl Validate for SerialUser {
    const ENTITY: &'static str = "serial_user";

    fn id(&self) -> EntityId {
        self.id
    }

    fn validate(&self) -> DomainResult<()> {
        ensure_id(Self::ENTITY, "serial_id", self.serial_id)?;
        ensure_id(Self::ENTITY, "user_id", self.user_id)
    }
}
