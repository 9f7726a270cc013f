// src/repositories/document/comment.rs

use serde_json::json;

use super::{into_document, DocReader};
use crate::docstore::collections::COMMENTS;
use crate::docstore::{Document, DocumentHandle, Filter, FindOptions};
use crate::domain::{Comment, EntityId};
use crate::error::{AppError, AppResult};
use crate::repositories::{check_new, check_persisted, CommentRepository};

const ID: &str = "c_id";

pub struct DocumentCommentRepository {
    store: DocumentHandle,
}

impl DocumentCommentRepository {
    pub fn new(store: DocumentHandle) -> Self {
        Self { store }
    }

    fn to_document(id: EntityId, comment: &Comment) -> Document {
        into_document(json!({
            ID: id,
            "c_text": comment.text,
            "c_date": comment.date.to_document(),
            "c_idUser": comment.user_id,
            "c_idSerial": comment.serial_id,
        }))
    }

    fn from_document(doc: &Document) -> AppResult<Comment> {
        let r = DocReader::new(COMMENTS, doc);
        Ok(Comment {
            id: r.i64(ID)?,
            text: r.string("c_text")?,
            date: r.date("c_date")?,
            user_id: r.i64("c_idUser")?,
            serial_id: r.i64("c_idSerial")?,
        })
    }

    fn find_all(&self, filter: &Filter) -> AppResult<Vec<Comment>> {
        self.store
            .find(COMMENTS, filter, &FindOptions::sorted_by(ID))?
            .iter()
            .map(Self::from_document)
            .collect()
    }

    fn pair(serial_id: EntityId, user_id: EntityId) -> Filter {
        Filter::and(vec![
            Filter::eq("c_idSerial", serial_id),
            Filter::eq("c_idUser", user_id),
        ])
    }
}

impl CommentRepository for DocumentCommentRepository {
    fn list_all(&self) -> AppResult<Vec<Comment>> {
        log::info!("comments: list all");
        self.find_all(&Filter::All)
    }

    fn get_by_id(&self, id: EntityId) -> AppResult<Comment> {
        log::info!("comments: get {}", id);
        match self.store.find_one(COMMENTS, &Filter::eq(ID, id))? {
            Some(doc) => Self::from_document(&doc),
            None => Err(AppError::not_found("comment", id)),
        }
    }

    fn list_by_serial(&self, serial_id: EntityId) -> AppResult<Vec<Comment>> {
        log::info!("comments: list by serial {}", serial_id);
        self.find_all(&Filter::eq("c_idSerial", serial_id))
    }

    fn list_by_user(&self, user_id: EntityId) -> AppResult<Vec<Comment>> {
        log::info!("comments: list by user {}", user_id);
        self.find_all(&Filter::eq("c_idUser", user_id))
    }

    fn get_by_serial_and_user(&self, serial_id: EntityId, user_id: EntityId) -> AppResult<Comment> {
        log::info!("comments: get by serial {} and user {}", serial_id, user_id);
        let found = self.store.find(
            COMMENTS,
            &Self::pair(serial_id, user_id),
            &FindOptions::sorted_by(ID).limit(1),
        )?;
        match found.first() {
            Some(doc) => Self::from_document(doc),
            None => Err(AppError::not_found(
                "comment",
                format!("serial {} / user {}", serial_id, user_id),
            )),
        }
    }

    fn check_exists(&self, user_id: EntityId, serial_id: EntityId) -> AppResult<bool> {
        let count = self
            .store
            .count_documents(COMMENTS, &Self::pair(serial_id, user_id), Some(1))?;
        Ok(count > 0)
    }

    fn create(&self, comment: &Comment) -> AppResult<EntityId> {
        check_new(comment)?;
        let id = self.store.next_sequence(COMMENTS)?;
        self.store.insert_one(COMMENTS, Self::to_document(id, comment))?;
        log::info!("comments: created {}", id);
        Ok(id)
    }

    fn update(&self, comment: &Comment) -> AppResult<()> {
        check_persisted(comment)?;
        self.store.replace_one(
            COMMENTS,
            &Filter::eq(ID, comment.id),
            Self::to_document(comment.id, comment),
        )?;
        log::info!("comments: updated {}", comment.id);
        Ok(())
    }

    fn delete(&self, id: EntityId) -> AppResult<()> {
        self.store.delete_one(COMMENTS, &Filter::eq(ID, id))?;
        log::info!("comments: deleted {}", id);
        Ok(())
    }

    fn delete_by_serial(&self, serial_id: EntityId) -> AppResult<()> {
        let removed = self
            .store
            .delete_many(COMMENTS, &Filter::eq("c_idSerial", serial_id))?;
        log::info!("comments: deleted {} of serial {}", removed, serial_id);
        Ok(())
    }

    fn delete_by_user(&self, user_id: EntityId) -> AppResult<()> {
        let removed = self.store.delete_many(COMMENTS, &Filter::eq("c_idUser", user_id))?;
        log::info!("comments: deleted {} of user {}", removed, user_id);
        Ok(())
    }
}
