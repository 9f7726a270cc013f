// src/repositories/episode_repository.rs

use rusqlite::{params, Row};

use super::{check_new, check_persisted};
use crate::db::RelationalHandle;
use crate::domain::{EntityId, Episode};
use crate::error::{AppError, AppResult};

#[cfg_attr(test, mockall::automock)]
pub trait EpisodeRepository: Send + Sync {
    fn list_all(&self) -> AppResult<Vec<Episode>>;
    fn get_by_id(&self, id: EntityId) -> AppResult<Episode>;
    fn list_by_season(&self, season_id: EntityId) -> AppResult<Vec<Episode>>;
    /// Number of stored episodes of the season, counted by the store.
    fn count_by_season(&self, season_id: EntityId) -> AppResult<u64>;
    fn create(&self, episode: &Episode) -> AppResult<EntityId>;
    fn update(&self, episode: &Episode) -> AppResult<()>;
    fn delete(&self, id: EntityId) -> AppResult<()>;
}

pub struct SqliteEpisodeRepository {
    db: RelationalHandle,
}

impl SqliteEpisodeRepository {
    pub fn new(db: RelationalHandle) -> Self {
        Self { db }
    }

    fn row_to_episode(row: &Row) -> Result<Episode, rusqlite::Error> {
        Ok(Episode {
            id: row.get("e_id")?,
            season_id: row.get("e_idSeason")?,
            name: row.get("e_name")?,
            num: row.get("e_num")?,
            duration: row.get("e_duration")?,
            date: row.get("e_date")?,
        })
    }
}

impl EpisodeRepository for SqliteEpisodeRepository {
    fn list_all(&self) -> AppResult<Vec<Episode>> {
        log::info!("episodes: list all");
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare("SELECT * FROM episodes ORDER BY e_id")?;

        let episodes = stmt
            .query_map([], Self::row_to_episode)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(episodes)
    }

    fn get_by_id(&self, id: EntityId) -> AppResult<Episode> {
        log::info!("episodes: get {}", id);
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare("SELECT * FROM episodes WHERE e_id = ?1")?;

        match stmt.query_row(params![id], Self::row_to_episode) {
            Ok(episode) => Ok(episode),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(AppError::not_found("episode", id)),
            Err(e) => Err(e.into()),
        }
    }

    fn list_by_season(&self, season_id: EntityId) -> AppResult<Vec<Episode>> {
        log::info!("episodes: list by season {}", season_id);
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare("SELECT * FROM episodes WHERE e_idSeason = ?1 ORDER BY e_id")?;

        let episodes = stmt
            .query_map(params![season_id], Self::row_to_episode)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(episodes)
    }

    fn count_by_season(&self, season_id: EntityId) -> AppResult<u64> {
        let conn = self.db.connection()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM episodes WHERE e_idSeason = ?1",
            params![season_id],
            |row| row.get(0),
        )?;
        log::debug!("episodes: season {} has {}", season_id, count);
        Ok(count as u64)
    }

    fn create(&self, episode: &Episode) -> AppResult<EntityId> {
        check_new(episode)?;
        let conn = self.db.connection()?;

        let id: EntityId = conn.query_row(
            "INSERT INTO episodes (e_idSeason, e_name, e_num, e_duration, e_date)
             VALUES (?1, ?2, ?3, ?4, ?5) RETURNING e_id",
            params![episode.season_id, episode.name, episode.num, episode.duration, episode.date],
            |row| row.get(0),
        )?;

        log::info!("episodes: created {} in season {}", id, episode.season_id);
        Ok(id)
    }

    fn update(&self, episode: &Episode) -> AppResult<()> {
        check_persisted(episode)?;
        let conn = self.db.connection()?;

        conn.execute(
            "UPDATE episodes SET e_idSeason = ?2, e_name = ?3, e_num = ?4, e_duration = ?5, e_date = ?6
             WHERE e_id = ?1",
            params![
                episode.id,
                episode.season_id,
                episode.name,
                episode.num,
                episode.duration,
                episode.date
            ],
        )?;

        log::info!("episodes: updated {}", episode.id);
        Ok(())
    }

    fn delete(&self, id: EntityId) -> AppResult<()> {
        let conn = self.db.connection()?;
        conn.execute("DELETE FROM episodes WHERE e_id = ?1", params![id])?;
        log::info!("episodes: deleted {}", id);
        Ok(())
    }
}
