// src/repositories/document/season.rs

use serde_json::json;

use super::{into_document, DocReader};
use crate::docstore::collections::SEASONS;
use crate::docstore::{Document, DocumentHandle, Filter, FindOptions};
use crate::domain::{EntityId, Season};
use crate::error::{AppError, AppResult};
use crate::repositories::{check_new, check_persisted, SeasonRepository};

const ID: &str = "ss_id";

pub struct DocumentSeasonRepository {
    store: DocumentHandle,
}

impl DocumentSeasonRepository {
    pub fn new(store: DocumentHandle) -> Self {
        Self { store }
    }

    fn to_document(id: EntityId, season: &Season) -> Document {
        into_document(json!({
            ID: id,
            "ss_idSerial": season.serial_id,
            "ss_name": season.name,
            "ss_num": season.num,
            "ss_cntEpisodes": season.cnt_episodes,
            "ss_date": season.date.to_document(),
        }))
    }

    fn from_document(doc: &Document) -> AppResult<Season> {
        let r = DocReader::new(SEASONS, doc);
        Ok(Season {
            id: r.i64(ID)?,
            serial_id: r.i64("ss_idSerial")?,
            name: r.string("ss_name")?,
            num: r.i32("ss_num")?,
            cnt_episodes: r.i32("ss_cntEpisodes")?,
            date: r.date("ss_date")?,
        })
    }

    fn find_all(&self, filter: &Filter) -> AppResult<Vec<Season>> {
        self.store
            .find(SEASONS, filter, &FindOptions::sorted_by(ID))?
            .iter()
            .map(Self::from_document)
            .collect()
    }
}

impl SeasonRepository for DocumentSeasonRepository {
    fn list_all(&self) -> AppResult<Vec<Season>> {
        log::info!("seasons: list all");
        self.find_all(&Filter::All)
    }

    fn get_by_id(&self, id: EntityId) -> AppResult<Season> {
        log::info!("seasons: get {}", id);
        match self.store.find_one(SEASONS, &Filter::eq(ID, id))? {
            Some(doc) => Self::from_document(&doc),
            None => Err(AppError::not_found("season", id)),
        }
    }

    fn list_by_serial(&self, serial_id: EntityId) -> AppResult<Vec<Season>> {
        log::info!("seasons: list by serial {}", serial_id);
        self.find_all(&Filter::eq("ss_idSerial", serial_id))
    }

    fn create(&self, season: &Season) -> AppResult<EntityId> {
        check_new(season)?;
        let id = self.store.next_sequence(SEASONS)?;
        self.store.insert_one(SEASONS, Self::to_document(id, season))?;
        log::info!("seasons: created {}", id);
        Ok(id)
    }

    fn update(&self, season: &Season) -> AppResult<()> {
        check_persisted(season)?;
        self.store.replace_one(
            SEASONS,
            &Filter::eq(ID, season.id),
            Self::to_document(season.id, season),
        )?;
        log::info!("seasons: updated {}", season.id);
        Ok(())
    }

    fn delete(&self, id: EntityId) -> AppResult<()> {
        self.store.delete_one(SEASONS, &Filter::eq(ID, id))?;
        log::info!("seasons: deleted {}", id);
        Ok(())
    }
}
