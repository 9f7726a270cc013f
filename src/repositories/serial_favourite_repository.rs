// src/repositories/serial_favourite_repository.rs

use rusqlite::{params, Row};

use super::{check_new, check_persisted};
use crate::db::RelationalHandle;
use crate::domain::{EntityId, SerialFavourite};
use crate::error::{AppError, AppResult};

#[cfg_attr(test, mockall::automock)]
pub trait SerialFavouriteRepository: Send + Sync {
    fn list_all(&self) -> AppResult<Vec<SerialFavourite>>;
    fn get_by_id(&self, id: EntityId) -> AppResult<SerialFavourite>;
    fn list_by_favourite(&self, favourite_id: EntityId) -> AppResult<Vec<SerialFavourite>>;
    fn list_by_serial(&self, serial_id: EntityId) -> AppResult<Vec<SerialFavourite>>;
    fn exists(&self, serial_id: EntityId, favourite_id: EntityId) -> AppResult<bool>;
    fn create(&self, link: &SerialFavourite) -> AppResult<EntityId>;
    fn update(&self, link: &SerialFavourite) -> AppResult<()>;
    fn delete(&self, id: EntityId) -> AppResult<()>;
    /// Removes every row of the pair. Returns how many were removed.
    fn delete_by_pair(&self, favourite_id: EntityId, serial_id: EntityId) -> AppResult<u64>;
    fn delete_by_favourite(&self, favourite_id: EntityId) -> AppResult<()>;
    fn delete_by_serial(&self, serial_id: EntityId) -> AppResult<()>;
}

pub struct SqliteSerialFavouriteRepository {
    db: RelationalHandle,
}

impl SqliteSerialFavouriteRepository {
    pub fn new(db: RelationalHandle) -> Self {
        Self { db }
    }

    fn row_to_link(row: &Row) -> Result<SerialFavourite, rusqlite::Error> {
        Ok(SerialFavourite {
            id: row.get("sf_id")?,
            serial_id: row.get("sf_idSerial")?,
            favourite_id: row.get("sf_idFavourite")?,
        })
    }

    fn list_where(&self, column: &str, value: EntityId) -> AppResult<Vec<SerialFavourite>> {
        let conn = self.db.connection()?;
        let sql = format!("SELECT * FROM serials_favourites WHERE {} = ?1 ORDER BY sf_id", column);
        let mut stmt = conn.prepare(&sql)?;

        let links = stmt
            .query_map(params![value], Self::row_to_link)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(links)
    }
}

impl SerialFavouriteRepository for SqliteSerialFavouriteRepository {
    fn list_all(&self) -> AppResult<Vec<SerialFavourite>> {
        log::info!("serials_favourites: list all");
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare("SELECT * FROM serials_favourites ORDER BY sf_id")?;

        let links = stmt
            .query_map([], Self::row_to_link)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(links)
    }

    fn get_by_id(&self, id: EntityId) -> AppResult<SerialFavourite> {
        log::info!("serials_favourites: get {}", id);
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare("SELECT * FROM serials_favourites WHERE sf_id = ?1")?;

        match stmt.query_row(params![id], Self::row_to_link) {
            Ok(link) => Ok(link),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                Err(AppError::not_found("serial_favourite", id))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn list_by_favourite(&self, favourite_id: EntityId) -> AppResult<Vec<SerialFavourite>> {
        log::info!("serials_favourites: list by favourite {}", favourite_id);
        self.list_where("sf_idFavourite", favourite_id)
    }

    fn list_by_serial(&self, serial_id: EntityId) -> AppResult<Vec<SerialFavourite>> {
        log::info!("serials_favourites: list by serial {}", serial_id);
        self.list_where("sf_idSerial", serial_id)
    }

    fn exists(&self, serial_id: EntityId, favourite_id: EntityId) -> AppResult<bool> {
        let conn = self.db.connection()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM serials_favourites
                WHERE sf_idSerial = ?1 AND sf_idFavourite = ?2)",
            params![serial_id, favourite_id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn create(&self, link: &SerialFavourite) -> AppResult<EntityId> {
        check_new(link)?;
        let conn = self.db.connection()?;

        let id: EntityId = conn.query_row(
            "INSERT INTO serials_favourites (sf_idSerial, sf_idFavourite)
             VALUES (?1, ?2) RETURNING sf_id",
            params![link.serial_id, link.favourite_id],
            |row| row.get(0),
        )?;

        log::info!(
            "serials_favourites: linked serial {} to favourite {}",
            link.serial_id,
            link.favourite_id
        );
        Ok(id)
    }

    fn update(&self, link: &SerialFavourite) -> AppResult<()> {
        check_persisted(link)?;
        let conn = self.db.connection()?;
        conn.execute(
            "UPDATE serials_favourites SET sf_idSerial = ?2, sf_idFavourite = ?3 WHERE sf_id = ?1",
            params![link.id, link.serial_id, link.favourite_id],
        )?;
        log::info!("serials_favourites: updated {}", link.id);
        Ok(())
    }

    fn delete(&self, id: EntityId) -> AppResult<()> {
        let conn = self.db.connection()?;
        conn.execute("DELETE FROM serials_favourites WHERE sf_id = ?1", params![id])?;
        log::info!("serials_favourites: deleted {}", id);
        Ok(())
    }

    fn delete_by_pair(&self, favourite_id: EntityId, serial_id: EntityId) -> AppResult<u64> {
        let conn = self.db.connection()?;
        let removed = conn.execute(
            "DELETE FROM serials_favourites WHERE sf_idFavourite = ?1 AND sf_idSerial = ?2",
            params![favourite_id, serial_id],
        )?;
        log::info!(
            "serials_favourites: unlinked serial {} from favourite {} ({} rows)",
            serial_id,
            favourite_id,
            removed
        );
        Ok(removed as u64)
    }

    fn delete_by_favourite(&self, favourite_id: EntityId) -> AppResult<()> {
        let conn = self.db.connection()?;
        conn.execute(
            "DELETE FROM serials_favourites WHERE sf_idFavourite = ?1",
            params![favourite_id],
        )?;
        log::info!("serials_favourites: cleared favourite {}", favourite_id);
        Ok(())
    }

    fn delete_by_serial(&self, serial_id: EntityId) -> AppResult<()> {
        let conn = self.db.connection()?;
        conn.execute("DELETE FROM serials_favourites WHERE sf_idSerial = ?1", params![serial_id])?;
        log::info!("serials_favourites: cleared serial {}", serial_id);
        Ok(())
    }
}
