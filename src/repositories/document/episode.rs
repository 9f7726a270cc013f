// src/repositories/document/episode.rs

use serde_json::json;

use super::{into_document, DocReader};
use crate::docstore::collections::EPISODES;
use crate::docstore::{Document, DocumentHandle, Filter, FindOptions};
use crate::domain::{EntityId, Episode};
use crate::error::{AppError, AppResult};
use crate::repositories::{check_new, check_persisted, EpisodeRepository};

const ID: &str = "e_id";

pub struct DocumentEpisodeRepository {
    store: DocumentHandle,
}

impl DocumentEpisodeRepository {
    pub fn new(store: DocumentHandle) -> Self {
        Self { store }
    }

    fn to_document(id: EntityId, episode: &Episode) -> Document {
        into_document(json!({
            ID: id,
            "e_idSeason": episode.season_id,
            "e_name": episode.name,
            "e_num": episode.num,
            "e_duration": episode.duration,
            "e_date": episode.date.to_document(),
        }))
    }

    fn from_document(doc: &Document) -> AppResult<Episode> {
        let r = DocReader::new(EPISODES, doc);
        Ok(Episode {
            id: r.i64(ID)?,
            season_id: r.i64("e_idSeason")?,
            name: r.string("e_name")?,
            num: r.i32("e_num")?,
            duration: r.i64("e_duration")?,
            date: r.date("e_date")?,
        })
    }

    fn find_all(&self, filter: &Filter) -> AppResult<Vec<Episode>> {
        self.store
            .find(EPISODES, filter, &FindOptions::sorted_by(ID))?
            .iter()
            .map(Self::from_document)
            .collect()
    }
}

impl EpisodeRepository for DocumentEpisodeRepository {
    fn list_all(&self) -> AppResult<Vec<Episode>> {
        log::info!("episodes: list all");
        self.find_all(&Filter::All)
    }

    fn get_by_id(&self, id: EntityId) -> AppResult<Episode> {
        log::info!("episodes: get {}", id);
        match self.store.find_one(EPISODES, &Filter::eq(ID, id))? {
            Some(doc) => Self::from_document(&doc),
            None => Err(AppError::not_found("episode", id)),
        }
    }

    fn list_by_season(&self, season_id: EntityId) -> AppResult<Vec<Episode>> {
        log::info!("episodes: list by season {}", season_id);
        self.find_all(&Filter::eq("e_idSeason", season_id))
    }

    fn count_by_season(&self, season_id: EntityId) -> AppResult<u64> {
        let count = self
            .store
            .count_documents(EPISODES, &Filter::eq("e_idSeason", season_id), None)?;
        log::debug!("episodes: season {} has {}", season_id, count);
        Ok(count)
    }

    fn create(&self, episode: &Episode) -> AppResult<EntityId> {
        check_new(episode)?;
        let id = self.store.next_sequence(EPISODES)?;
        self.store.insert_one(EPISODES, Self::to_document(id, episode))?;
        log::info!("episodes: created {} in season {}", id, episode.season_id);
        Ok(id)
    }

    fn update(&self, episode: &Episode) -> AppResult<()> {
        check_persisted(episode)?;
        self.store.replace_one(
            EPISODES,
            &Filter::eq(ID, episode.id),
            Self::to_document(episode.id, episode),
        )?;
        log::info!("episodes: updated {}", episode.id);
        Ok(())
    }

    fn delete(&self, id: EntityId) -> AppResult<()> {
        self.store.delete_one(EPISODES, &Filter::eq(ID, id))?;
        log::info!("episodes: deleted {}", id);
        Ok(())
    }
}
