// src/repositories/serial_actor_repository.rs

use rusqlite::{params, Row};

use super::{check_new, check_persisted};
use crate::db::RelationalHandle;
use crate::domain::{EntityId, SerialActor};
use crate::error::{AppError, AppResult};

#[cfg_attr(test, mockall::automock)]
pub trait SerialActorRepository: Send + Sync {
    fn list_all(&self) -> AppResult<Vec<SerialActor>>;
    fn get_by_id(&self, id: EntityId) -> AppResult<SerialActor>;
    fn list_by_actor(&self, actor_id: EntityId) -> AppResult<Vec<SerialActor>>;
    fn list_by_serial(&self, serial_id: EntityId) -> AppResult<Vec<SerialActor>>;
    fn exists(&self, serial_id: EntityId, actor_id: EntityId) -> AppResult<bool>;
    fn create(&self, link: &SerialActor) -> AppResult<EntityId>;
    fn update(&self, link: &SerialActor) -> AppResult<()>;
    fn delete(&self, id: EntityId) -> AppResult<()>;
    fn delete_by_serial(&self, serial_id: EntityId) -> AppResult<()>;
}

pub struct SqliteSerialActorRepository {
    db: RelationalHandle,
}

impl SqliteSerialActorRepository {
    pub fn new(db: RelationalHandle) -> Self {
        Self { db }
    }

    fn row_to_link(row: &Row) -> Result<SerialActor, rusqlite::Error> {
        Ok(SerialActor {
            id: row.get("sa_id")?,
            serial_id: row.get("sa_idSerial")?,
            actor_id: row.get("sa_idActor")?,
        })
    }

    fn list_where(&self, column: &str, value: EntityId) -> AppResult<Vec<SerialActor>> {
        let conn = self.db.connection()?;
        let sql = format!("SELECT * FROM serials_actors WHERE {} = ?1 ORDER BY sa_id", column);
        let mut stmt = conn.prepare(&sql)?;

        let links = stmt
            .query_map(params![value], Self::row_to_link)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(links)
    }
}

impl SerialActorRepository for SqliteSerialActorRepository {
    fn list_all(&self) -> AppResult<Vec<SerialActor>> {
        log::info!("serials_actors: list all");
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare("SELECT * FROM serials_actors ORDER BY sa_id")?;

        let links = stmt
            .query_map([], Self::row_to_link)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(links)
    }

    fn get_by_id(&self, id: EntityId) -> AppResult<SerialActor> {
        log::info!("serials_actors: get {}", id);
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare("SELECT * FROM serials_actors WHERE sa_id = ?1")?;

        match stmt.query_row(params![id], Self::row_to_link) {
            Ok(link) => Ok(link),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(AppError::not_found("serial_actor", id)),
            Err(e) => Err(e.into()),
        }
    }

    fn list_by_actor(&self, actor_id: EntityId) -> AppResult<Vec<SerialActor>> {
        log::info!("serials_actors: list by actor {}", actor_id);
        self.list_where("sa_idActor", actor_id)
    }

    fn list_by_serial(&self, serial_id: EntityId) -> AppResult<Vec<SerialActor>> {
        log::info!("serials_actors: list by serial {}", serial_id);
        self.list_where("sa_idSerial", serial_id)
    }

    fn exists(&self, serial_id: EntityId, actor_id: EntityId) -> AppResult<bool> {
        let conn = self.db.connection()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM serials_actors WHERE sa_idSerial = ?1 AND sa_idActor = ?2)",
            params![serial_id, actor_id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn create(&self, link: &SerialActor) -> AppResult<EntityId> {
        check_new(link)?;
        let conn = self.db.connection()?;

        let id: EntityId = conn.query_row(
            "INSERT INTO serials_actors (sa_idSerial, sa_idActor) VALUES (?1, ?2) RETURNING sa_id",
            params![link.serial_id, link.actor_id],
            |row| row.get(0),
        )?;

        log::info!("serials_actors: linked actor {} to serial {}", link.actor_id, link.serial_id);
        Ok(id)
    }

    fn update(&self, link: &SerialActor) -> AppResult<()> {
        check_persisted(link)?;
        let conn = self.db.connection()?;
        conn.execute(
            "UPDATE serials_actors SET sa_idSerial = ?2, sa_idActor = ?3 WHERE sa_id = ?1",
            params![link.id, link.serial_id, link.actor_id],
        )?;
        log::info!("serials_actors: updated {}", link.id);
        Ok(())
    }

    fn delete(&self, id: EntityId) -> AppResult<()> {
        let conn = self.db.connection()?;
        conn.execute("DELETE FROM serials_actors WHERE sa_id = ?1", params![id])?;
        log::info!("serials_actors: deleted {}", id);
        Ok(())
    }

    fn delete_by_serial(&self, serial_id: EntityId) -> AppResult<()> {
        let conn = self.db.connection()?;
        conn.execute("DELETE FROM serials_actors WHERE sa_idSerial = ?1", params![serial_id])?;
        log::info!("serials_actors: cleared serial {}", serial_id);
        Ok(())
    }
}
