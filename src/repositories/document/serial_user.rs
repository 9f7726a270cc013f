// src/repositories/document/serial_user.rs

use serde_json::json;

use super::{into_document, DocReader};
use crate::docstore::collections::SERIALS_USERS;
use crate::docstore::{Document, DocumentHandle, Filter, FindOptions};
use crate::domain::{EntityId, SerialUser};
use crate::error::{AppError, AppResult};
use crate::repositories::{check_new, check_persisted, SerialUserRepository};

const ID: &str = "su_id";
const SERIAL: &str = "su_idSerial";
const USER: &str = "su_idUser";

pub struct DocumentSerialUserRepository {
    store: DocumentHandle,
}

impl DocumentSerialUserRepository {
    pub fn new(store: DocumentHandle) -> Self {
        Self { store }
    }

    fn to_document(id: EntityId, link: &SerialUser) -> Document {
        into_document(json!({
            ID: id,
            SERIAL: link.serial_id,
            USER: link.user_id,
            "su_lastSeen": link.last_seen.to_document(),
        }))
    }

    fn from_document(doc: &Document) -> AppResult<SerialUser> {
        let r = DocReader::new(SERIALS_USERS, doc);
        Ok(SerialUser {
            id: r.i64(ID)?,
            serial_id: r.i64(SERIAL)?,
            user_id: r.i64(USER)?,
            last_seen: r.date("su_lastSeen")?,
        })
    }

    fn find_all(&self, filter: &Filter) -> AppResult<Vec<SerialUser>> {
        self.store
            .find(SERIALS_USERS, filter, &FindOptions::sorted_by(ID))?
            .iter()
            .map(Self::from_document)
            .collect()
    }

    fn pair(serial_id: EntityId, user_id: EntityId) -> Filter {
        Filter::and(vec![Filter::eq(SERIAL, serial_id), Filter::eq(USER, user_id)])
    }
}

impl SerialUserRepository for DocumentSerialUserRepository {
    fn list_all(&self) -> AppResult<Vec<SerialUser>> {
        log::info!("serials_users: list all");
        self.find_all(&Filter::All)
    }

    fn get_by_id(&self, id: EntityId) -> AppResult<SerialUser> {
        log::info!("serials_users: get {}", id);
        match self.store.find_one(SERIALS_USERS, &Filter::eq(ID, id))? {
            Some(doc) => Self::from_document(&doc),
            None => Err(AppError::not_found("serial_user", id)),
        }
    }

    fn list_by_user(&self, user_id: EntityId) -> AppResult<Vec<SerialUser>> {
        log::info!("serials_users: list by user {}", user_id);
        self.find_all(&Filter::eq(USER, user_id))
    }

    fn list_by_serial(&self, serial_id: EntityId) -> AppResult<Vec<SerialUser>> {
        log::info!("serials_users: list by serial {}", serial_id);
        self.find_all(&Filter::eq(SERIAL, serial_id))
    }

    fn get_by_pair(&self, serial_id: EntityId, user_id: EntityId) -> AppResult<SerialUser> {
        log::info!("serials_users: get serial {} / user {}", serial_id, user_id);
        let found = self.store.find(
            SERIALS_USERS,
            &Self::pair(serial_id, user_id),
            &FindOptions::sorted_by(ID).limit(1),
        )?;
        match found.first() {
            Some(doc) => Self::from_document(doc),
            None => Err(AppError::not_found(
                "serial_user",
                format!("serial {} / user {}", serial_id, user_id),
            )),
        }
    }

    fn exists(&self, serial_id: EntityId, user_id: EntityId) -> AppResult<bool> {
        let count = self
            .store
            .count_documents(SERIALS_USERS, &Self::pair(serial_id, user_id), Some(1))?;
        Ok(count > 0)
    }

    fn create(&self, link: &SerialUser) -> AppResult<EntityId> {
        check_new(link)?;
        let id = self.store.next_sequence(SERIALS_USERS)?;
        self.store.insert_one(SERIALS_USERS, Self::to_document(id, link))?;
        log::info!("serials_users: user {} started serial {}", link.user_id, link.serial_id);
        Ok(id)
    }

    fn update(&self, link: &SerialUser) -> AppResult<()> {
        check_persisted(link)?;
        self.store.replace_one(
            SERIALS_USERS,
            &Filter::eq(ID, link.id),
            Self::to_document(link.id, link),
        )?;
        log::info!("serials_users: updated {}", link.id);
        Ok(())
    }

    fn delete(&self, id: EntityId) -> AppResult<()> {
        self.store.delete_one(SERIALS_USERS, &Filter::eq(ID, id))?;
        log::info!("serials_users: deleted {}", id);
        Ok(())
    }

    fn delete_by_user(&self, user_id: EntityId) -> AppResult<()> {
        self.store.delete_many(SERIALS_USERS, &Filter::eq(USER, user_id))?;
        log::info!("serials_users: cleared user {}", user_id);
        Ok(())
    }

    fn delete_by_serial(&self, serial_id: EntityId) -> AppResult<()> {
        self.store.delete_many(SERIALS_USERS, &Filter::eq(SERIAL, serial_id))?;
        log::info!("serials_users: cleared serial {}", serial_id);
        Ok(())
    }
}
