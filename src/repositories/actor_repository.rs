// src/repositories/actor_repository.rs

use rusqlite::{params, Row};

use super::{check_new, check_persisted};
use crate::db::RelationalHandle;
use crate::domain::{Actor, EntityId};
use crate::error::{AppError, AppResult};

#[cfg_attr(test, mockall::automock)]
pub trait ActorRepository: Send + Sync {
    fn list_all(&self) -> AppResult<Vec<Actor>>;
    fn get_by_id(&self, id: EntityId) -> AppResult<Actor>;
    fn create(&self, actor: &Actor) -> AppResult<EntityId>;
    fn update(&self, actor: &Actor) -> AppResult<()>;
    fn delete(&self, id: EntityId) -> AppResult<()>;
    /// True if an actor with the same name, surname, gender and birth date exists.
    fn check_exists(&self, actor: &Actor) -> AppResult<bool>;
}

pub struct SqliteActorRepository {
    db: RelationalHandle,
}

impl SqliteActorRepository {
    pub fn new(db: RelationalHandle) -> Self {
        Self { db }
    }

    fn row_to_actor(row: &Row) -> Result<Actor, rusqlite::Error> {
        Ok(Actor {
            id: row.get("a_id")?,
            name: row.get("a_name")?,
            surname: row.get("a_surname")?,
            gender: row.get("a_gender")?,
            bdate: row.get("a_bdate")?,
        })
    }
}

impl ActorRepository for SqliteActorRepository {
    fn list_all(&self) -> AppResult<Vec<Actor>> {
        log::info!("actors: list all");
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare("SELECT * FROM actors ORDER BY a_id")?;

        let actors = stmt
            .query_map([], Self::row_to_actor)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(actors)
    }

    fn get_by_id(&self, id: EntityId) -> AppResult<Actor> {
        log::info!("actors: get {}", id);
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare("SELECT * FROM actors WHERE a_id = ?1")?;

        match stmt.query_row(params![id], Self::row_to_actor) {
            Ok(actor) => Ok(actor),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(AppError::not_found("actor", id)),
            Err(e) => Err(e.into()),
        }
    }

    fn create(&self, actor: &Actor) -> AppResult<EntityId> {
        check_new(actor)?;
        let conn = self.db.connection()?;

        let id: EntityId = conn.query_row(
            "INSERT INTO actors (a_name, a_surname, a_gender, a_bdate)
             VALUES (?1, ?2, ?3, ?4) RETURNING a_id",
            params![actor.name, actor.surname, actor.gender, actor.bdate],
            |row| row.get(0),
        )?;

        log::info!("actors: created {}", id);
        Ok(id)
    }

    fn update(&self, actor: &Actor) -> AppResult<()> {
        check_persisted(actor)?;
        let conn = self.db.connection()?;

        conn.execute(
            "UPDATE actors SET a_name = ?2, a_surname = ?3, a_gender = ?4, a_bdate = ?5
             WHERE a_id = ?1",
            params![actor.id, actor.name, actor.surname, actor.gender, actor.bdate],
        )?;

        log::info!("actors: updated {}", actor.id);
        Ok(())
    }

    fn delete(&self, id: EntityId) -> AppResult<()> {
        let conn = self.db.connection()?;
        conn.execute("DELETE FROM actors WHERE a_id = ?1", params![id])?;
        log::info!("actors: deleted {}", id);
        Ok(())
    }

    fn check_exists(&self, actor: &Actor) -> AppResult<bool> {
        let conn = self.db.connection()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM actors
                WHERE a_name = ?1 AND a_surname = ?2 AND a_gender = ?3 AND date(a_bdate) = ?4)",
            params![actor.name, actor.surname, actor.gender, actor.bdate],
            |row| row.get(0),
        )?;
        Ok(exists)
    }
}
