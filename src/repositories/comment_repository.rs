// src/repositories/comment_repository.rs

use rusqlite::{params, Row};

use super::{check_new, check_persisted};
use crate::db::RelationalHandle;
use crate::domain::{Comment, EntityId};
use crate::error::{AppError, AppResult};

#[cfg_attr(test, mockall::automock)]
pub trait CommentRepository: Send + Sync {
    fn list_all(&self) -> AppResult<Vec<Comment>>;
    fn get_by_id(&self, id: EntityId) -> AppResult<Comment>;
    fn list_by_serial(&self, serial_id: EntityId) -> AppResult<Vec<Comment>>;
    fn list_by_user(&self, user_id: EntityId) -> AppResult<Vec<Comment>>;
    fn get_by_serial_and_user(&self, serial_id: EntityId, user_id: EntityId) -> AppResult<Comment>;
    fn check_exists(&self, user_id: EntityId, serial_id: EntityId) -> AppResult<bool>;
    fn create(&self, comment: &Comment) -> AppResult<EntityId>;
    fn update(&self, comment: &Comment) -> AppResult<()>;
    fn delete(&self, id: EntityId) -> AppResult<()>;
    fn delete_by_serial(&self, serial_id: EntityId) -> AppResult<()>;
    fn delete_by_user(&self, user_id: EntityId) -> AppResult<()>;
}

pub struct SqliteCommentRepository {
    db: RelationalHandle,
}

impl SqliteCommentRepository {
    pub fn new(db: RelationalHandle) -> Self {
        Self { db }
    }

    fn row_to_comment(row: &Row) -> Result<Comment, rusqlite::Error> {
        Ok(Comment {
            id: row.get("c_id")?,
            text: row.get("c_text")?,
            date: row.get("c_date")?,
            user_id: row.get("c_idUser")?,
            serial_id: row.get("c_idSerial")?,
        })
    }

    fn list_where(&self, column: &str, value: EntityId) -> AppResult<Vec<Comment>> {
        let conn = self.db.connection()?;
        let sql = format!("SELECT * FROM comments WHERE {} = ?1 ORDER BY c_id", column);
        let mut stmt = conn.prepare(&sql)?;

        let comments = stmt
            .query_map(params![value], Self::row_to_comment)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(comments)
    }
}

impl CommentRepository for SqliteCommentRepository {
    fn list_all(&self) -> AppResult<Vec<Comment>> {
        log::info!("comments: list all");
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare("SELECT * FROM comments ORDER BY c_id")?;

        let comments = stmt
            .query_map([], Self::row_to_comment)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(comments)
    }

    fn get_by_id(&self, id: EntityId) -> AppResult<Comment> {
        log::info!("comments: get {}", id);
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare("SELECT * FROM comments WHERE c_id = ?1")?;

        match stmt.query_row(params![id], Self::row_to_comment) {
            Ok(comment) => Ok(comment),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(AppError::not_found("comment", id)),
            Err(e) => Err(e.into()),
        }
    }

    fn list_by_serial(&self, serial_id: EntityId) -> AppResult<Vec<Comment>> {
        log::info!("comments: list by serial {}", serial_id);
        self.list_where("c_idSerial", serial_id)
    }

    fn list_by_user(&self, user_id: EntityId) -> AppResult<Vec<Comment>> {
        log::info!("comments: list by user {}", user_id);
        self.list_where("c_idUser", user_id)
    }

    fn get_by_serial_and_user(&self, serial_id: EntityId, user_id: EntityId) -> AppResult<Comment> {
        log::info!("comments: get by serial {} and user {}", serial_id, user_id);
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(
            "SELECT * FROM comments WHERE c_idSerial = ?1 AND c_idUser = ?2 ORDER BY c_id LIMIT 1",
        )?;

        match stmt.query_row(params![serial_id, user_id], Self::row_to_comment) {
            Ok(comment) => Ok(comment),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(AppError::not_found(
                "comment",
                format!("serial {} / user {}", serial_id, user_id),
            )),
            Err(e) => Err(e.into()),
        }
    }

    fn check_exists(&self, user_id: EntityId, serial_id: EntityId) -> AppResult<bool> {
        let conn = self.db.connection()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM comments WHERE c_idUser = ?1 AND c_idSerial = ?2)",
            params![user_id, serial_id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn create(&self, comment: &Comment) -> AppResult<EntityId> {
        check_new(comment)?;
        let conn = self.db.connection()?;

        let id: EntityId = conn.query_row(
            "INSERT INTO comments (c_text, c_date, c_idUser, c_idSerial)
             VALUES (?1, ?2, ?3, ?4) RETURNING c_id",
            params![comment.text, comment.date, comment.user_id, comment.serial_id],
            |row| row.get(0),
        )?;

        log::info!("comments: created {}", id);
        Ok(id)
    }

    fn update(&self, comment: &Comment) -> AppResult<()> {
        check_persisted(comment)?;
        let conn = self.db.connection()?;
        conn.execute(
            "UPDATE comments SET c_text = ?2, c_date = ?3, c_idUser = ?4, c_idSerial = ?5
             WHERE c_id = ?1",
            params![comment.id, comment.text, comment.date, comment.user_id, comment.serial_id],
        )?;
        log::info!("comments: updated {}", comment.id);
        Ok(())
    }

    fn delete(&self, id: EntityId) -> AppResult<()> {
        let conn = self.db.connection()?;
        conn.execute("DELETE FROM comments WHERE c_id = ?1", params![id])?;
        log::info!("comments: deleted {}", id);
        Ok(())
    }

    fn delete_by_serial(&self, serial_id: EntityId) -> AppResult<()> {
        let conn = self.db.connection()?;
        let removed = conn.execute("DELETE FROM comments WHERE c_idSerial = ?1", params![serial_id])?;
        log::info!("comments: deleted {} of serial {}", removed, serial_id);
        Ok(())
    }

    fn delete_by_user(&self, user_id: EntityId) -> AppResult<()> {
        let conn = self.db.connection()?;
        let removed = conn.execute("DELETE FROM comments WHERE c_idUser = ?1", params![user_id])?;
        log::info!("comments: deleted {} of user {}", removed, user_id);
        Ok(())
    }
}
