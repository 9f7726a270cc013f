// src/repositories/serial_repository.rs

use rusqlite::{params, Row};

use super::{check_new, check_persisted};
use crate::db::RelationalHandle;
use crate::docstore::contains_pattern;
use crate::domain::{DurationTotal, EntityId, Serial};
use crate::error::{AppError, AppResult};

#[cfg_attr(test, mockall::automock)]
pub trait SerialRepository: Send + Sync {
    fn list_all(&self) -> AppResult<Vec<Serial>>;
    fn get_by_id(&self, id: EntityId) -> AppResult<Serial>;
    /// Case-insensitive substring match on the title.
    fn list_by_title(&self, fragment: &str) -> AppResult<Vec<Serial>>;
    fn create(&self, serial: &Serial) -> AppResult<EntityId>;
    fn update(&self, serial: &Serial) -> AppResult<()>;
    fn delete(&self, id: EntityId) -> AppResult<()>;
    /// Episode count and summed minutes over every season of the serial,
    /// computed by the store.
    fn episode_duration_total(&self, serial_id: EntityId) -> AppResult<DurationTotal>;
}

pub struct SqliteSerialRepository {
    db: RelationalHandle,
}

impl SqliteSerialRepository {
    pub fn new(db: RelationalHandle) -> Self {
        Self { db }
    }

    fn row_to_serial(row: &Row) -> Result<Serial, rusqlite::Error> {
        Ok(Serial {
            id: row.get("s_id")?,
            producer_id: row.get("s_idProducer")?,
            name: row.get("s_name")?,
            description: row.get("s_description")?,
            year: row.get("s_year")?,
            genre: row.get("s_genre")?,
            rating: row.get("s_rating")?,
            seasons: row.get("s_seasons")?,
            state: row.get("s_state")?,
            img: row.get("s_img")?,
            duration: row.get("s_duration")?,
        })
    }
}

impl SerialRepository for SqliteSerialRepository {
    fn list_all(&self) -> AppResult<Vec<Serial>> {
        log::info!("serials: list all");
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare("SELECT * FROM serials ORDER BY s_id")?;

        let serials = stmt
            .query_map([], Self::row_to_serial)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(serials)
    }

    fn get_by_id(&self, id: EntityId) -> AppResult<Serial> {
        log::info!("serials: get {}", id);
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare("SELECT * FROM serials WHERE s_id = ?1")?;

        match stmt.query_row(params![id], Self::row_to_serial) {
            Ok(serial) => Ok(serial),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(AppError::not_found("serial", id)),
            Err(e) => Err(e.into()),
        }
    }

    fn list_by_title(&self, fragment: &str) -> AppResult<Vec<Serial>> {
        log::info!("serials: list by title '{}'", fragment);
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare("SELECT * FROM serials WHERE s_name REGEXP ?1 ORDER BY s_id")?;

        let serials = stmt
            .query_map(params![contains_pattern(fragment)], Self::row_to_serial)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(serials)
    }

    fn create(&self, serial: &Serial) -> AppResult<EntityId> {
        check_new(serial)?;
        let conn = self.db.connection()?;

        let id: EntityId = conn.query_row(
            "INSERT INTO serials (s_idProducer, s_name, s_description, s_year, s_genre,
                                  s_rating, s_seasons, s_state, s_img, s_duration)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10) RETURNING s_id",
            params![
                serial.producer_id,
                serial.name,
                serial.description,
                serial.year,
                serial.genre,
                serial.rating,
                serial.seasons,
                serial.state,
                serial.img,
                serial.duration,
            ],
            |row| row.get(0),
        )?;

        log::info!("serials: created {} '{}'", id, serial.name);
        Ok(id)
    }

    fn update(&self, serial: &Serial) -> AppResult<()> {
        check_persisted(serial)?;
        let conn = self.db.connection()?;

        conn.execute(
            "UPDATE serials SET s_idProducer = ?2, s_name = ?3, s_description = ?4, s_year = ?5,
                    s_genre = ?6, s_rating = ?7, s_seasons = ?8, s_state = ?9, s_img = ?10,
                    s_duration = ?11
             WHERE s_id = ?1",
            params![
                serial.id,
                serial.producer_id,
                serial.name,
                serial.description,
                serial.year,
                serial.genre,
                serial.rating,
                serial.seasons,
                serial.state,
                serial.img,
                serial.duration,
            ],
        )?;

        log::info!("serials: updated {}", serial.id);
        Ok(())
    }

    fn delete(&self, id: EntityId) -> AppResult<()> {
        let conn = self.db.connection()?;
        conn.execute("DELETE FROM serials WHERE s_id = ?1", params![id])?;
        log::info!("serials: deleted {}", id);
        Ok(())
    }

    fn episode_duration_total(&self, serial_id: EntityId) -> AppResult<DurationTotal> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(
            "SELECT episodes, minutes FROM serial_episode_durations WHERE serial_id = ?1",
        )?;

        let total = match stmt.query_row(params![serial_id], |row| {
            Ok(DurationTotal {
                episodes: row.get(0)?,
                minutes: row.get(1)?,
            })
        }) {
            Ok(total) => total,
            Err(rusqlite::Error::QueryReturnedNoRows) => DurationTotal::default(),
            Err(e) => return Err(e.into()),
        };

        log::debug!(
            "serials: duration of {} = {} min over {} episodes",
            serial_id,
            total.minutes,
            total.episodes
        );
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_connection_pool, initialize_database};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    fn repository() -> (TempDir, SqliteSerialRepository) {
        let dir = TempDir::new().unwrap();
        let timeout = Duration::from_secs(5);
        let pool = create_connection_pool(&dir.path().join("serials.db"), 2, timeout).unwrap();
        let handle = RelationalHandle::new(Arc::new(pool), timeout);
        initialize_database(&handle.connection().unwrap()).unwrap();
        (dir, SqliteSerialRepository::new(handle))
    }

    #[test]
    fn test_title_search_folds_non_ascii_case() {
        let (_dir, repo) = repository();
        repo.create(&Serial::new(1, "Тёмный Лес", 2019)).unwrap();
        repo.create(&Serial::new(1, "Dark", 2017)).unwrap();

        let found = repo.list_by_title("тёмный").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Тёмный Лес");
        assert_eq!(repo.list_by_title("ЛЕС").unwrap().len(), 1);
        assert_eq!(repo.list_by_title("DARK").unwrap().len(), 1);
    }

    #[test]
    fn test_title_search_is_literal() {
        let (_dir, repo) = repository();
        repo.create(&Serial::new(1, "100% Wolf", 2020)).unwrap();
        repo.create(&Serial::new(1, "What If...?", 2021)).unwrap();

        assert_eq!(repo.list_by_title("100%").unwrap().len(), 1);
        assert_eq!(repo.list_by_title("if...?").unwrap().len(), 1);
        assert!(repo.list_by_title("if.x").unwrap().is_empty());
        assert!(repo.list_by_title("_").unwrap().is_empty());
    }
}
