// src/repositories/document/favourite.rs

use serde_json::json;

use super::{into_document, DocReader};
use crate::docstore::collections::FAVOURITES;
use crate::docstore::{Document, DocumentHandle, Filter, FindOptions};
use crate::domain::{EntityId, Favourite};
use crate::error::{AppError, AppResult};
use crate::repositories::{check_new, check_persisted, FavouriteRepository};

const ID: &str = "f_id";

pub struct DocumentFavouriteRepository {
    store: DocumentHandle,
}

impl DocumentFavouriteRepository {
    pub fn new(store: DocumentHandle) -> Self {
        Self { store }
    }

    fn to_document(id: EntityId, favourite: &Favourite) -> Document {
        into_document(json!({
            ID: id,
            "f_cntSerials": favourite.cnt_serials,
        }))
    }

    fn from_document(doc: &Document) -> AppResult<Favourite> {
        let r = DocReader::new(FAVOURITES, doc);
        Ok(Favourite {
            id: r.i64(ID)?,
            cnt_serials: r.i64("f_cntSerials")?,
        })
    }
}

impl FavouriteRepository for DocumentFavouriteRepository {
    fn list_all(&self) -> AppResult<Vec<Favourite>> {
        log::info!("favourites: list all");
        self.store
            .find(FAVOURITES, &Filter::All, &FindOptions::sorted_by(ID))?
            .iter()
            .map(Self::from_document)
            .collect()
    }

    fn get_by_id(&self, id: EntityId) -> AppResult<Favourite> {
        log::info!("favourites: get {}", id);
        match self.store.find_one(FAVOURITES, &Filter::eq(ID, id))? {
            Some(doc) => Self::from_document(&doc),
            None => Err(AppError::not_found("favourite", id)),
        }
    }

    fn create(&self, favourite: &Favourite) -> AppResult<EntityId> {
        check_new(favourite)?;
        let id = self.store.next_sequence(FAVOURITES)?;
        self.store.insert_one(FAVOURITES, Self::to_document(id, favourite))?;
        log::info!("favourites: created {}", id);
        Ok(id)
    }

    fn update(&self, favourite: &Favourite) -> AppResult<()> {
        check_persisted(favourite)?;
        self.store.replace_one(
            FAVOURITES,
            &Filter::eq(ID, favourite.id),
            Self::to_document(favourite.id, favourite),
        )?;
        log::info!("favourites: updated {}", favourite.id);
        Ok(())
    }

    fn delete(&self, id: EntityId) -> AppResult<()> {
        self.store.delete_one(FAVOURITES, &Filter::eq(ID, id))?;
        log::info!("favourites: deleted {}", id);
        Ok(())
    }
}
