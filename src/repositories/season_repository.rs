// src/repositories/season_repository.rs

use rusqlite::{params, Row};

use super::{check_new, check_persisted};
use crate::db::RelationalHandle;
use crate::domain::{EntityId, Season};
use crate::error::{AppError, AppResult};

#[cfg_attr(test, mockall::automock)]
pub trait SeasonRepository: Send + Sync {
    fn list_all(&self) -> AppResult<Vec<Season>>;
    fn get_by_id(&self, id: EntityId) -> AppResult<Season>;
    fn list_by_serial(&self, serial_id: EntityId) -> AppResult<Vec<Season>>;
    fn create(&self, season: &Season) -> AppResult<EntityId>;
    fn update(&self, season: &Season) -> AppResult<()>;
    fn delete(&self, id: EntityId) -> AppResult<()>;
}

pub struct SqliteSeasonRepository {
    db: RelationalHandle,
}

impl SqliteSeasonRepository {
    pub fn new(db: RelationalHandle) -> Self {
        Self { db }
    }

    fn row_to_season(row: &Row) -> Result<Season, rusqlite::Error> {
        Ok(Season {
            id: row.get("ss_id")?,
            serial_id: row.get("ss_idSerial")?,
            name: row.get("ss_name")?,
            num: row.get("ss_num")?,
            cnt_episodes: row.get("ss_cntEpisodes")?,
            date: row.get("ss_date")?,
        })
    }
}

impl SeasonRepository for SqliteSeasonRepository {
    fn list_all(&self) -> AppResult<Vec<Season>> {
        log::info!("seasons: list all");
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare("SELECT * FROM seasons ORDER BY ss_id")?;

        let seasons = stmt
            .query_map([], Self::row_to_season)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(seasons)
    }

    fn get_by_id(&self, id: EntityId) -> AppResult<Season> {
        log::info!("seasons: get {}", id);
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare("SELECT * FROM seasons WHERE ss_id = ?1")?;

        match stmt.query_row(params![id], Self::row_to_season) {
            Ok(season) => Ok(season),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(AppError::not_found("season", id)),
            Err(e) => Err(e.into()),
        }
    }

    fn list_by_serial(&self, serial_id: EntityId) -> AppResult<Vec<Season>> {
        log::info!("seasons: list by serial {}", serial_id);
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare("SELECT * FROM seasons WHERE ss_idSerial = ?1 ORDER BY ss_id")?;

        let seasons = stmt
            .query_map(params![serial_id], Self::row_to_season)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(seasons)
    }

    fn create(&self, season: &Season) -> AppResult<EntityId> {
        check_new(season)?;
        let conn = self.db.connection()?;

        let id: EntityId = conn.query_row(
            "INSERT INTO seasons (ss_idSerial, ss_name, ss_num, ss_cntEpisodes, ss_date)
             VALUES (?1, ?2, ?3, ?4, ?5) RETURNING ss_id",
            params![season.serial_id, season.name, season.num, season.cnt_episodes, season.date],
            |row| row.get(0),
        )?;

        log::info!("seasons: created {}", id);
        Ok(id)
    }

    fn update(&self, season: &Season) -> AppResult<()> {
        check_persisted(season)?;
        let conn = self.db.connection()?;

        conn.execute(
            "UPDATE seasons SET ss_idSerial = ?2, ss_name = ?3, ss_num = ?4, ss_cntEpisodes = ?5,
                    ss_date = ?6
             WHERE ss_id = ?1",
            params![
                season.id,
                season.serial_id,
                season.name,
                season.num,
                season.cnt_episodes,
                season.date
            ],
        )?;

        log::info!("seasons: updated {}", season.id);
        Ok(())
    }

    fn delete(&self, id: EntityId) -> AppResult<()> {
        let conn = self.db.connection()?;
        conn.execute("DELETE FROM seasons WHERE ss_id = ?1", params![id])?;
        log::info!("seasons: deleted {}", id);
        Ok(())
    }
}
