// src/repositories/document/actor.rs

use serde_json::json;

use super::{into_document, DocReader};
use crate::docstore::collections::ACTORS;
use crate::docstore::{Document, DocumentHandle, Filter, FindOptions};
use crate::domain::{Actor, EntityId};
use crate::error::{AppError, AppResult};
use crate::repositories::{check_new, check_persisted, ActorRepository};

const ID: &str = "a_id";

pub struct DocumentActorRepository {
    store: DocumentHandle,
}

impl DocumentActorRepository {
    pub fn new(store: DocumentHandle) -> Self {
        Self { store }
    }

    fn to_document(id: EntityId, actor: &Actor) -> Document {
        into_document(json!({
            ID: id,
            "a_name": actor.name,
            "a_surname": actor.surname,
            "a_gender": actor.gender,
            "a_bdate": actor.bdate.to_document(),
        }))
    }

    fn from_document(doc: &Document) -> AppResult<Actor> {
        let r = DocReader::new(ACTORS, doc);
        Ok(Actor {
            id: r.i64(ID)?,
            name: r.string("a_name")?,
            surname: r.string("a_surname")?,
            gender: r.string("a_gender")?,
            bdate: r.date("a_bdate")?,
        })
    }
}

impl ActorRepository for DocumentActorRepository {
    fn list_all(&self) -> AppResult<Vec<Actor>> {
        log::info!("actors: list all");
        self.store
            .find(ACTORS, &Filter::All, &FindOptions::sorted_by(ID))?
            .iter()
            .map(Self::from_document)
            .collect()
    }

    fn get_by_id(&self, id: EntityId) -> AppResult<Actor> {
        log::info!("actors: get {}", id);
        match self.store.find_one(ACTORS, &Filter::eq(ID, id))? {
            Some(doc) => Self::from_document(&doc),
            None => Err(AppError::not_found("actor", id)),
        }
    }

    fn create(&self, actor: &Actor) -> AppResult<EntityId> {
        check_new(actor)?;
        let id = self.store.next_sequence(ACTORS)?;
        self.store.insert_one(ACTORS, Self::to_document(id, actor))?;
        log::info!("actors: created {}", id);
        Ok(id)
    }

    fn update(&self, actor: &Actor) -> AppResult<()> {
        check_persisted(actor)?;
        let matched = self.store.replace_one(
            ACTORS,
            &Filter::eq(ID, actor.id),
            Self::to_document(actor.id, actor),
        )?;
        log::info!("actors: updated {} (matched {})", actor.id, matched);
        Ok(())
    }

    fn delete(&self, id: EntityId) -> AppResult<()> {
        self.store.delete_one(ACTORS, &Filter::eq(ID, id))?;
        log::info!("actors: deleted {}", id);
        Ok(())
    }

    /// Birth dates compare as dates, whichever form the document holds.
    fn check_exists(&self, actor: &Actor) -> AppResult<bool> {
        let filter = Filter::and(vec![
            Filter::eq("a_name", actor.name.as_str()),
            Filter::eq("a_surname", actor.surname.as_str()),
            Filter::eq("a_gender", actor.gender.as_str()),
        ]);
        for doc in self.store.find(ACTORS, &filter, &FindOptions::default())? {
            if DocReader::new(ACTORS, &doc).date("a_bdate")? == actor.bdate {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
