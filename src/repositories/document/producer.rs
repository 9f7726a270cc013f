// src/repositories/document/producer.rs

use serde_json::json;

use super::{into_document, DocReader};
use crate::docstore::collections::PRODUCERS;
use crate::docstore::{Document, DocumentHandle, Filter, FindOptions};
use crate::domain::{EntityId, Producer};
use crate::error::{AppError, AppResult};
use crate::repositories::{check_new, check_persisted, ProducerRepository};

const ID: &str = "p_id";

pub struct DocumentProducerRepository {
    store: DocumentHandle,
}

impl DocumentProducerRepository {
    pub fn new(store: DocumentHandle) -> Self {
        Self { store }
    }

    fn to_document(id: EntityId, producer: &Producer) -> Document {
        into_document(json!({
            ID: id,
            "p_name": producer.name,
            "p_surname": producer.surname,
        }))
    }

    fn from_document(doc: &Document) -> AppResult<Producer> {
        let r = DocReader::new(PRODUCERS, doc);
        Ok(Producer {
            id: r.i64(ID)?,
            name: r.string("p_name")?,
            surname: r.string("p_surname")?,
        })
    }
}

impl ProducerRepository for DocumentProducerRepository {
    fn list_all(&self) -> AppResult<Vec<Producer>> {
        log::info!("producers: list all");
        self.store
            .find(PRODUCERS, &Filter::All, &FindOptions::sorted_by(ID))?
            .iter()
            .map(Self::from_document)
            .collect()
    }

    fn get_by_id(&self, id: EntityId) -> AppResult<Producer> {
        log::info!("producers: get {}", id);
        match self.store.find_one(PRODUCERS, &Filter::eq(ID, id))? {
            Some(doc) => Self::from_document(&doc),
            None => Err(AppError::not_found("producer", id)),
        }
    }

    fn create(&self, producer: &Producer) -> AppResult<EntityId> {
        check_new(producer)?;
        let id = self.store.next_sequence(PRODUCERS)?;
        self.store.insert_one(PRODUCERS, Self::to_document(id, producer))?;
        log::info!("producers: created {}", id);
        Ok(id)
    }

    fn update(&self, producer: &Producer) -> AppResult<()> {
        check_persisted(producer)?;
        self.store.replace_one(
            PRODUCERS,
            &Filter::eq(ID, producer.id),
            Self::to_document(producer.id, producer),
        )?;
        log::info!("producers: updated {}", producer.id);
        Ok(())
    }

    fn delete(&self, id: EntityId) -> AppResult<()> {
        self.store.delete_one(PRODUCERS, &Filter::eq(ID, id))?;
        log::info!("producers: deleted {}", id);
        Ok(())
    }
}
