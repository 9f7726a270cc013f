// src/repositories/document/serial_favourite.rs

use serde_json::json;

use super::{into_document, DocReader};
use crate::docstore::collections::SERIALS_FAVOURITES;
use crate::docstore::{Document, DocumentHandle, Filter, FindOptions};
use crate::domain::{EntityId, SerialFavourite};
use crate::error::{AppError, AppResult};
use crate::repositories::{check_new, check_persisted, SerialFavouriteRepository};

const ID: &str = "sf_id";
const SERIAL: &str = "sf_idSerial";
const FAVOURITE: &str = "sf_idFavourite";

pub struct DocumentSerialFavouriteRepository {
    store: DocumentHandle,
}

impl DocumentSerialFavouriteRepository {
    pub fn new(store: DocumentHandle) -> Self {
        Self { store }
    }

    fn to_document(id: EntityId, link: &SerialFavourite) -> Document {
        into_document(json!({
            ID: id,
            SERIAL: link.serial_id,
            FAVOURITE: link.favourite_id,
        }))
    }

    fn from_document(doc: &Document) -> AppResult<SerialFavourite> {
        let r = DocReader::new(SERIALS_FAVOURITES, doc);
        Ok(SerialFavourite {
            id: r.i64(ID)?,
            serial_id: r.i64(SERIAL)?,
            favourite_id: r.i64(FAVOURITE)?,
        })
    }

    fn find_all(&self, filter: &Filter) -> AppResult<Vec<SerialFavourite>> {
        self.store
            .find(SERIALS_FAVOURITES, filter, &FindOptions::sorted_by(ID))?
            .iter()
            .map(Self::from_document)
            .collect()
    }

    fn pair(serial_id: EntityId, favourite_id: EntityId) -> Filter {
        Filter::and(vec![
            Filter::eq(SERIAL, serial_id),
            Filter::eq(FAVOURITE, favourite_id),
        ])
    }
}

impl SerialFavouriteRepository for DocumentSerialFavouriteRepository {
    fn list_all(&self) -> AppResult<Vec<SerialFavourite>> {
        log::info!("serials_favourites: list all");
        self.find_all(&Filter::All)
    }

    fn get_by_id(&self, id: EntityId) -> AppResult<SerialFavourite> {
        log::info!("serials_favourites: get {}", id);
        match self.store.find_one(SERIALS_FAVOURITES, &Filter::eq(ID, id))? {
            Some(doc) => Self::from_document(&doc),
            None => Err(AppError::not_found("serial_favourite", id)),
        }
    }

    fn list_by_favourite(&self, favourite_id: EntityId) -> AppResult<Vec<SerialFavourite>> {
        log::info!("serials_favourites: list by favourite {}", favourite_id);
        self.find_all(&Filter::eq(FAVOURITE, favourite_id))
    }

    fn list_by_serial(&self, serial_id: EntityId) -> AppResult<Vec<SerialFavourite>> {
        log::info!("serials_favourites: list by serial {}", serial_id);
        self.find_all(&Filter::eq(SERIAL, serial_id))
    }

    fn exists(&self, serial_id: EntityId, favourite_id: EntityId) -> AppResult<bool> {
        let count = self.store.count_documents(
            SERIALS_FAVOURITES,
            &Self::pair(serial_id, favourite_id),
            Some(1),
        )?;
        Ok(count > 0)
    }

    fn create(&self, link: &SerialFavourite) -> AppResult<EntityId> {
        check_new(link)?;
        let id = self.store.next_sequence(SERIALS_FAVOURITES)?;
        self.store.insert_one(SERIALS_FAVOURITES, Self::to_document(id, link))?;
        log::info!(
            "serials_favourites: linked serial {} to favourite {}",
            link.serial_id,
            link.favourite_id
        );
        Ok(id)
    }

    fn update(&self, link: &SerialFavourite) -> AppResult<()> {
        check_persisted(link)?;
        self.store.replace_one(
            SERIALS_FAVOURITES,
            &Filter::eq(ID, link.id),
            Self::to_document(link.id, link),
        )?;
        log::info!("serials_favourites: updated {}", link.id);
        Ok(())
    }

    fn delete(&self, id: EntityId) -> AppResult<()> {
        self.store.delete_one(SERIALS_FAVOURITES, &Filter::eq(ID, id))?;
        log::info!("serials_favourites: deleted {}", id);
        Ok(())
    }

    fn delete_by_pair(&self, favourite_id: EntityId, serial_id: EntityId) -> AppResult<u64> {
        let removed = self
            .store
            .delete_many(SERIALS_FAVOURITES, &Self::pair(serial_id, favourite_id))?;
        log::info!(
            "serials_favourites: unlinked serial {} from favourite {} ({} rows)",
            serial_id,
            favourite_id,
            removed
        );
        Ok(removed)
    }

    fn delete_by_favourite(&self, favourite_id: EntityId) -> AppResult<()> {
        self.store
            .delete_many(SERIALS_FAVOURITES, &Filter::eq(FAVOURITE, favourite_id))?;
        log::info!("serials_favourites: cleared favourite {}", favourite_id);
        Ok(())
    }

    fn delete_by_serial(&self, serial_id: EntityId) -> AppResult<()> {
        self.store
            .delete_many(SERIALS_FAVOURITES, &Filter::eq(SERIAL, serial_id))?;
        log::info!("serials_favourites: cleared serial {}", serial_id);
        Ok(())
    }
}
