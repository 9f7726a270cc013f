// src/repositories/favourite_repository.rs

use rusqlite::{params, Row};

use super::{check_new, check_persisted};
use crate::db::RelationalHandle;
use crate::domain::{EntityId, Favourite};
use crate::error::{AppError, AppResult};

#[cfg_attr(test, mockall::automock)]
pub trait FavouriteRepository: Send + Sync {
    fn list_all(&self) -> AppResult<Vec<Favourite>>;
    fn get_by_id(&self, id: EntityId) -> AppResult<Favourite>;
    fn create(&self, favourite: &Favourite) -> AppResult<EntityId>;
    fn update(&self, favourite: &Favourite) -> AppResult<()>;
    fn delete(&self, id: EntityId) -> AppResult<()>;
}

pub struct SqliteFavouriteRepository {
    db: RelationalHandle,
}

impl SqliteFavouriteRepository {
    pub fn new(db: RelationalHandle) -> Self {
        Self { db }
    }

    fn row_to_favourite(row: &Row) -> Result<Favourite, rusqlite::Error> {
        Ok(Favourite {
            id: row.get("f_id")?,
            cnt_serials: row.get("f_cntSerials")?,
        })
    }
}

impl FavouriteRepository for SqliteFavouriteRepository {
    fn list_all(&self) -> AppResult<Vec<Favourite>> {
        log::info!("favourites: list all");
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare("SELECT * FROM favourites ORDER BY f_id")?;

        let favourites = stmt
            .query_map([], Self::row_to_favourite)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(favourites)
    }

    fn get_by_id(&self, id: EntityId) -> AppResult<Favourite> {
        log::info!("favourites: get {}", id);
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare("SELECT * FROM favourites WHERE f_id = ?1")?;

        match stmt.query_row(params![id], Self::row_to_favourite) {
            Ok(favourite) => Ok(favourite),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(AppError::not_found("favourite", id)),
            Err(e) => Err(e.into()),
        }
    }

    fn create(&self, favourite: &Favourite) -> AppResult<EntityId> {
        check_new(favourite)?;
        let conn = self.db.connection()?;

        let id: EntityId = conn.query_row(
            "INSERT INTO favourites (f_cntSerials) VALUES (?1) RETURNING f_id",
            params![favourite.cnt_serials],
            |row| row.get(0),
        )?;

        log::info!("favourites: created {}", id);
        Ok(id)
    }

    fn update(&self, favourite: &Favourite) -> AppResult<()> {
        check_persisted(favourite)?;
        let conn = self.db.connection()?;
        conn.execute(
            "UPDATE favourites SET f_cntSerials = ?2 WHERE f_id = ?1",
            params![favourite.id, favourite.cnt_serials],
        )?;
        log::info!("favourites: updated {}", favourite.id);
        Ok(())
    }

    fn delete(&self, id: EntityId) -> AppResult<()> {
        let conn = self.db.connection()?;
        conn.execute("DELETE FROM favourites WHERE f_id = ?1", params![id])?;
        log::info!("favourites: deleted {}", id);
        Ok(())
    }
}
