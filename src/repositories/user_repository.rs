// src/repositories/user_repository.rs

use rusqlite::{params, Row};

use super::{check_new, check_persisted};
use crate::db::RelationalHandle;
use crate::domain::{EntityId, User};
use crate::error::{AppError, AppResult};

#[cfg_attr(test, mockall::automock)]
pub trait UserRepository: Send + Sync {
    fn list_all(&self) -> AppResult<Vec<User>>;
    fn get_by_id(&self, id: EntityId) -> AppResult<User>;
    fn get_by_login(&self, login: &str) -> AppResult<User>;
    fn check_exists(&self, login: &str) -> AppResult<bool>;
    /// Fails with `Duplicate` when the login is taken.
    fn create(&self, user: &User) -> AppResult<EntityId>;
    fn update(&self, user: &User) -> AppResult<()>;
    fn delete(&self, id: EntityId) -> AppResult<()>;
}

pub struct SqliteUserRepository {
    db: RelationalHandle,
}

impl SqliteUserRepository {
    pub fn new(db: RelationalHandle) -> Self {
        Self { db }
    }

    fn row_to_user(row: &Row) -> Result<User, rusqlite::Error> {
        Ok(User {
            id: row.get("u_id")?,
            login: row.get("u_login")?,
            password: row.get("u_password")?,
            role: row.get("u_role")?,
            name: row.get("u_name")?,
            surname: row.get("u_surname")?,
            gender: row.get("u_gender")?,
            bdate: row.get("u_bdate")?,
            favourites_id: row.get("u_idFavourites")?,
            age_bucket: row.get("u_ageBucket")?,
        })
    }
}

impl UserRepository for SqliteUserRepository {
    fn list_all(&self) -> AppResult<Vec<User>> {
        log::info!("users: list all");
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare("SELECT * FROM users ORDER BY u_id")?;

        let users = stmt
            .query_map([], Self::row_to_user)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(users)
    }

    fn get_by_id(&self, id: EntityId) -> AppResult<User> {
        log::info!("users: get {}", id);
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare("SELECT * FROM users WHERE u_id = ?1")?;

        match stmt.query_row(params![id], Self::row_to_user) {
            Ok(user) => Ok(user),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(AppError::not_found("user", id)),
            Err(e) => Err(e.into()),
        }
    }

    fn get_by_login(&self, login: &str) -> AppResult<User> {
        log::info!("users: get by login '{}'", login);
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare("SELECT * FROM users WHERE u_login = ?1")?;

        match stmt.query_row(params![login], Self::row_to_user) {
            Ok(user) => Ok(user),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(AppError::not_found("user", login)),
            Err(e) => Err(e.into()),
        }
    }

    fn check_exists(&self, login: &str) -> AppResult<bool> {
        let conn = self.db.connection()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE u_login = ?1)",
            params![login],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn create(&self, user: &User) -> AppResult<EntityId> {
        check_new(user)?;
        let conn = self.db.connection()?;

        let id: EntityId = conn.query_row(
            "INSERT INTO users (u_login, u_password, u_role, u_name, u_surname, u_gender,
                                u_bdate, u_idFavourites, u_ageBucket)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9) RETURNING u_id",
            params![
                user.login,
                user.password,
                user.role,
                user.name,
                user.surname,
                user.gender,
                user.bdate,
                user.favourites_id,
                user.age_bucket
            ],
            |row| row.get(0),
        )?;

        log::info!("users: created {} '{}'", id, user.login);
        Ok(id)
    }

    fn update(&self, user: &User) -> AppResult<()> {
        check_persisted(user)?;
        let conn = self.db.connection()?;

        conn.execute(
            "UPDATE users SET u_login = ?2, u_password = ?3, u_role = ?4, u_name = ?5,
                    u_surname = ?6, u_gender = ?7, u_bdate = ?8, u_idFavourites = ?9,
                    u_ageBucket = ?10
             WHERE u_id = ?1",
            params![
                user.id,
                user.login,
                user.password,
                user.role,
                user.name,
                user.surname,
                user.gender,
                user.bdate,
                user.favourites_id,
                user.age_bucket
            ],
        )?;

        log::info!("users: updated {}", user.id);
        Ok(())
    }

    fn delete(&self, id: EntityId) -> AppResult<()> {
        let conn = self.db.connection()?;
        conn.execute("DELETE FROM users WHERE u_id = ?1", params![id])?;
        log::info!("users: deleted {}", id);
        Ok(())
    }
}
