// src/repositories/document/user.rs

use serde_json::json;

use super::{into_document, DocReader};
use crate::docstore::collections::USERS;
use crate::docstore::{Document, DocumentHandle, Filter, FindOptions};
use crate::domain::{EntityId, User};
use crate::error::{AppError, AppResult};
use crate::repositories::{check_new, check_persisted, UserRepository};

const ID: &str = "u_id";

pub struct DocumentUserRepository {
    store: DocumentHandle,
}

impl DocumentUserRepository {
    pub fn new(store: DocumentHandle) -> Self {
        Self { store }
    }

    fn to_document(id: EntityId, user: &User) -> Document {
        into_document(json!({
            ID: id,
            "u_login": user.login,
            "u_password": user.password,
            "u_role": user.role,
            "u_name": user.name,
            "u_surname": user.surname,
            "u_gender": user.gender,
            "u_bdate": user.bdate.to_document(),
            "u_idFavourites": user.favourites_id,
            "u_ageBucket": user.age_bucket.map(|bucket| bucket.column()),
        }))
    }

    fn from_document(doc: &Document) -> AppResult<User> {
        let r = DocReader::new(USERS, doc);
        Ok(User {
            id: r.i64(ID)?,
            login: r.string("u_login")?,
            password: r.string("u_password")?,
            role: r.string("u_role")?,
            name: r.string("u_name")?,
            surname: r.optional_string("u_surname")?,
            gender: r.string("u_gender")?,
            bdate: r.date("u_bdate")?,
            favourites_id: r.i64("u_idFavourites")?,
            age_bucket: r.bucket("u_ageBucket")?,
        })
    }
}

impl UserRepository for DocumentUserRepository {
    fn list_all(&self) -> AppResult<Vec<User>> {
        log::info!("users: list all");
        self.store
            .find(USERS, &Filter::All, &FindOptions::sorted_by(ID))?
            .iter()
            .map(Self::from_document)
            .collect()
    }

    fn get_by_id(&self, id: EntityId) -> AppResult<User> {
        log::info!("users: get {}", id);
        match self.store.find_one(USERS, &Filter::eq(ID, id))? {
            Some(doc) => Self::from_document(&doc),
            None => Err(AppError::not_found("user", id)),
        }
    }

    fn get_by_login(&self, login: &str) -> AppResult<User> {
        log::info!("users: get by login '{}'", login);
        match self.store.find_one(USERS, &Filter::eq("u_login", login))? {
            Some(doc) => Self::from_document(&doc),
            None => Err(AppError::not_found("user", login)),
        }
    }

    fn check_exists(&self, login: &str) -> AppResult<bool> {
        let count = self
            .store
            .count_documents(USERS, &Filter::eq("u_login", login), Some(1))?;
        Ok(count > 0)
    }

    fn create(&self, user: &User) -> AppResult<EntityId> {
        check_new(user)?;
        let id = self.store.next_sequence(USERS)?;
        self.store.insert_one(USERS, Self::to_document(id, user))?;
        log::info!("users: created {} '{}'", id, user.login);
        Ok(id)
    }

    fn update(&self, user: &User) -> AppResult<()> {
        check_persisted(user)?;
        self.store
            .replace_one(USERS, &Filter::eq(ID, user.id), Self::to_document(user.id, user))?;
        log::info!("users: updated {}", user.id);
        Ok(())
    }

    fn delete(&self, id: EntityId) -> AppResult<()> {
        self.store.delete_one(USERS, &Filter::eq(ID, id))?;
        log::info!("users: deleted {}", id);
        Ok(())
    }
}
