// src/repositories/document/serial_actor.rs

use serde_json::json;

use super::{into_document, DocReader};
use crate::docstore::collections::SERIALS_ACTORS;
use crate::docstore::{Document, DocumentHandle, Filter, FindOptions};
use crate::domain::{EntityId, SerialActor};
use crate::error::{AppError, AppResult};
use crate::repositories::{check_new, check_persisted, SerialActorRepository};

const ID: &str = "sa_id";
const SERIAL: &str = "sa_idSerial";
const ACTOR: &str = "sa_idActor";

pub struct DocumentSerialActorRepository {
    store: DocumentHandle,
}

impl DocumentSerialActorRepository {
    pub fn new(store: DocumentHandle) -> Self {
        Self { store }
    }

    fn to_document(id: EntityId, link: &SerialActor) -> Document {
        into_document(json!({
            ID: id,
            SERIAL: link.serial_id,
            ACTOR: link.actor_id,
        }))
    }

    fn from_document(doc: &Document) -> AppResult<SerialActor> {
        let r = DocReader::new(SERIALS_ACTORS, doc);
        Ok(SerialActor {
            id: r.i64(ID)?,
            serial_id: r.i64(SERIAL)?,
            actor_id: r.i64(ACTOR)?,
        })
    }

    fn find_all(&self, filter: &Filter) -> AppResult<Vec<SerialActor>> {
        self.store
            .find(SERIALS_ACTORS, filter, &FindOptions::sorted_by(ID))?
            .iter()
            .map(Self::from_document)
            .collect()
    }
}

impl SerialActorRepository for DocumentSerialActorRepository {
    fn list_all(&self) -> AppResult<Vec<SerialActor>> {
        log::info!("serials_actors: list all");
        self.find_all(&Filter::All)
    }

    fn get_by_id(&self, id: EntityId) -> AppResult<SerialActor> {
        log::info!("serials_actors: get {}", id);
        match self.store.find_one(SERIALS_ACTORS, &Filter::eq(ID, id))? {
            Some(doc) => Self::from_document(&doc),
            None => Err(AppError::not_found("serial_actor", id)),
        }
    }

    fn list_by_actor(&self, actor_id: EntityId) -> AppResult<Vec<SerialActor>> {
        log::info!("serials_actors: list by actor {}", actor_id);
        self.find_all(&Filter::eq(ACTOR, actor_id))
    }

    fn list_by_serial(&self, serial_id: EntityId) -> AppResult<Vec<SerialActor>> {
        log::info!("serials_actors: list by serial {}", serial_id);
        self.find_all(&Filter::eq(SERIAL, serial_id))
    }

    fn exists(&self, serial_id: EntityId, actor_id: EntityId) -> AppResult<bool> {
        let pair = Filter::and(vec![Filter::eq(SERIAL, serial_id), Filter::eq(ACTOR, actor_id)]);
        Ok(self.store.count_documents(SERIALS_ACTORS, &pair, Some(1))? > 0)
    }

    fn create(&self, link: &SerialActor) -> AppResult<EntityId> {
        check_new(link)?;
        let id = self.store.next_sequence(SERIALS_ACTORS)?;
        self.store.insert_one(SERIALS_ACTORS, Self::to_document(id, link))?;
        log::info!("serials_actors: linked actor {} to serial {}", link.actor_id, link.serial_id);
        Ok(id)
    }

    fn update(&self, link: &SerialActor) -> AppResult<()> {
        check_persisted(link)?;
        self.store.replace_one(
            SERIALS_ACTORS,
            &Filter::eq(ID, link.id),
            Self::to_document(link.id, link),
        )?;
        log::info!("serials_actors: updated {}", link.id);
        Ok(())
    }

    fn delete(&self, id: EntityId) -> AppResult<()> {
        self.store.delete_one(SERIALS_ACTORS, &Filter::eq(ID, id))?;
        log::info!("serials_actors: deleted {}", id);
        Ok(())
    }

    fn delete_by_serial(&self, serial_id: EntityId) -> AppResult<()> {
        self.store.delete_many(SERIALS_ACTORS, &Filter::eq(SERIAL, serial_id))?;
        log::info!("serials_actors: cleared serial {}", serial_id);
        Ok(())
    }
}
