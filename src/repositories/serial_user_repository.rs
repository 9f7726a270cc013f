// src/repositories/serial_user_repository.rs

use rusqlite::{params, Row};

use super::{check_new, check_persisted};
use crate::db::RelationalHandle;
use crate::domain::{EntityId, SerialUser};
use crate::error::{AppError, AppResult};

#[cfg_attr(test, mockall::automock)]
pub trait SerialUserRepository: Send + Sync {
    fn list_all(&self) -> AppResult<Vec<SerialUser>>;
    fn get_by_id(&self, id: EntityId) -> AppResult<SerialUser>;
    fn list_by_user(&self, user_id: EntityId) -> AppResult<Vec<SerialUser>>;
    fn list_by_serial(&self, serial_id: EntityId) -> AppResult<Vec<SerialUser>>;
    fn get_by_pair(&self, serial_id: EntityId, user_id: EntityId) -> AppResult<SerialUser>;
    fn exists(&self, serial_id: EntityId, user_id: EntityId) -> AppResult<bool>;
    fn create(&self, link: &SerialUser) -> AppResult<EntityId>;
    fn update(&self, link: &SerialUser) -> AppResult<()>;
    fn delete(&self, id: EntityId) -> AppResult<()>;
    fn delete_by_user(&self, user_id: EntityId) -> AppResult<()>;
    fn delete_by_serial(&self, serial_id: EntityId) -> AppResult<()>;
}

pub struct SqliteSerialUserRepository {
    db: RelationalHandle,
}

impl SqliteSerialUserRepository {
    pub fn new(db: RelationalHandle) -> Self {
        Self { db }
    }

    fn row_to_link(row: &Row) -> Result<SerialUser, rusqlite::Error> {
        Ok(SerialUser {
            id: row.get("su_id")?,
            serial_id: row.get("su_idSerial")?,
            user_id: row.get("su_idUser")?,
            last_seen: row.get("su_lastSeen")?,
        })
    }

    fn list_where(&self, column: &str, value: EntityId) -> AppResult<Vec<SerialUser>> {
        let conn = self.db.connection()?;
        let sql = format!("SELECT * FROM serials_users WHERE {} = ?1 ORDER BY su_id", column);
        let mut stmt = conn.prepare(&sql)?;

        let links = stmt
            .query_map(params![value], Self::row_to_link)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(links)
    }
}

impl SerialUserRepository for SqliteSerialUserRepository {
    fn list_all(&self) -> AppResult<Vec<SerialUser>> {
        log::info!("serials_users: list all");
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare("SELECT * FROM serials_users ORDER BY su_id")?;

        let links = stmt
            .query_map([], Self::row_to_link)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(links)
    }

    fn get_by_id(&self, id: EntityId) -> AppResult<SerialUser> {
        log::info!("serials_users: get {}", id);
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare("SELECT * FROM serials_users WHERE su_id = ?1")?;

        match stmt.query_row(params![id], Self::row_to_link) {
            Ok(link) => Ok(link),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(AppError::not_found("serial_user", id)),
            Err(e) => Err(e.into()),
        }
    }

    fn list_by_user(&self, user_id: EntityId) -> AppResult<Vec<SerialUser>> {
        log::info!("serials_users: list by user {}", user_id);
        self.list_where("su_idUser", user_id)
    }

    fn list_by_serial(&self, serial_id: EntityId) -> AppResult<Vec<SerialUser>> {
        log::info!("serials_users: list by serial {}", serial_id);
        self.list_where("su_idSerial", serial_id)
    }

    fn get_by_pair(&self, serial_id: EntityId, user_id: EntityId) -> AppResult<SerialUser> {
        log::info!("serials_users: get serial {} / user {}", serial_id, user_id);
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(
            "SELECT * FROM serials_users WHERE su_idSerial = ?1 AND su_idUser = ?2
             ORDER BY su_id LIMIT 1",
        )?;

        match stmt.query_row(params![serial_id, user_id], Self::row_to_link) {
            Ok(link) => Ok(link),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(AppError::not_found(
                "serial_user",
                format!("serial {} / user {}", serial_id, user_id),
            )),
            Err(e) => Err(e.into()),
        }
    }

    fn exists(&self, serial_id: EntityId, user_id: EntityId) -> AppResult<bool> {
        let conn = self.db.connection()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM serials_users WHERE su_idSerial = ?1 AND su_idUser = ?2)",
            params![serial_id, user_id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn create(&self, link: &SerialUser) -> AppResult<EntityId> {
        check_new(link)?;
        let conn = self.db.connection()?;

        let id: EntityId = conn.query_row(
            "INSERT INTO serials_users (su_idSerial, su_idUser, su_lastSeen)
             VALUES (?1, ?2, ?3) RETURNING su_id",
            params![link.serial_id, link.user_id, link.last_seen],
            |row| row.get(0),
        )?;

        log::info!("serials_users: user {} started serial {}", link.user_id, link.serial_id);
        Ok(id)
    }

    fn update(&self, link: &SerialUser) -> AppResult<()> {
        check_persisted(link)?;
        let conn = self.db.connection()?;
        conn.execute(
            "UPDATE serials_users SET su_idSerial = ?2, su_idUser = ?3, su_lastSeen = ?4
             WHERE su_id = ?1",
            params![link.id, link.serial_id, link.user_id, link.last_seen],
        )?;
        log::info!("serials_users: updated {}", link.id);
        Ok(())
    }

    fn delete(&self, id: EntityId) -> AppResult<()> {
        let conn = self.db.connection()?;
        conn.execute("DELETE FROM serials_users WHERE su_id = ?1", params![id])?;
        log::info!("serials_users: deleted {}", id);
        Ok(())
    }

    fn delete_by_user(&self, user_id: EntityId) -> AppResult<()> {
        let conn = self.db.connection()?;
        conn.execute("DELETE FROM serials_users WHERE su_idUser = ?1", params![user_id])?;
        log::info!("serials_users: cleared user {}", user_id);
        Ok(())
    }

    fn delete_by_serial(&self, serial_id: EntityId) -> AppResult<()> {
        let conn = self.db.connection()?;
        conn.execute("DELETE FROM serials_users WHERE su_idSerial = ?1", params![serial_id])?;
        log::info!("serials_users: cleared serial {}", serial_id);
        Ok(())
    }
}
