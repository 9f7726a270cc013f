// src/repositories/producer_repository.rs

use rusqlite::{params, Row};

use super::{check_new, check_persisted};
use crate::db::RelationalHandle;
use crate::domain::{EntityId, Producer};
use crate::error::{AppError, AppResult};

#[cfg_attr(test, mockall::automock)]
pub trait ProducerRepository: Send + Sync {
    fn list_all(&self) -> AppResult<Vec<Producer>>;
    fn get_by_id(&self, id: EntityId) -> AppResult<Producer>;
    fn create(&self, producer: &Producer) -> AppResult<EntityId>;
    fn update(&self, producer: &Producer) -> AppResult<()>;
    fn delete(&self, id: EntityId) -> AppResult<()>;
}

pub struct SqliteProducerRepository {
    db: RelationalHandle,
}

impl SqliteProducerRepository {
    pub fn new(db: RelationalHandle) -> Self {
        Self { db }
    }

    fn row_to_producer(row: &Row) -> Result<Producer, rusqlite::Error> {
        Ok(Producer {
            id: row.get("p_id")?,
            name: row.get("p_name")?,
            surname: row.get("p_surname")?,
        })
    }
}

impl ProducerRepository for SqliteProducerRepository {
    fn list_all(&self) -> AppResult<Vec<Producer>> {
        log::info!("producers: list all");
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare("SELECT * FROM producers ORDER BY p_id")?;

        let producers = stmt
            .query_map([], Self::row_to_producer)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(producers)
    }

    fn get_by_id(&self, id: EntityId) -> AppResult<Producer> {
        log::info!("producers: get {}", id);
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare("SELECT * FROM producers WHERE p_id = ?1")?;

        match stmt.query_row(params![id], Self::row_to_producer) {
            Ok(producer) => Ok(producer),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(AppError::not_found("producer", id)),
            Err(e) => Err(e.into()),
        }
    }

    fn create(&self, producer: &Producer) -> AppResult<EntityId> {
        check_new(producer)?;
        let conn = self.db.connection()?;

        let id: EntityId = conn.query_row(
            "INSERT INTO producers (p_name, p_surname) VALUES (?1, ?2) RETURNING p_id",
            params![producer.name, producer.surname],
            |row| row.get(0),
        )?;

        log::info!("producers: created {}", id);
        Ok(id)
    }

    fn update(&self, producer: &Producer) -> AppResult<()> {
        check_persisted(producer)?;
        let conn = self.db.connection()?;
        conn.execute(
            "UPDATE producers SET p_name = ?2, p_surname = ?3 WHERE p_id = ?1",
            params![producer.id, producer.name, producer.surname],
        )?;
        log::info!("producers: updated {}", producer.id);
        Ok(())
    }

    fn delete(&self, id: EntityId) -> AppResult<()> {
        let conn = self.db.connection()?;
        conn.execute("DELETE FROM producers WHERE p_id = ?1", params![id])?;
        log::info!("producers: deleted {}", id);
        Ok(())
    }
}
