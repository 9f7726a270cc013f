// src/repositories/document/serial.rs

use serde_json::json;

use super::{into_document, DocReader};
use crate::docstore::collections::{EPISODES, SEASONS, SERIALS};
use crate::docstore::{Accumulator, Document, DocumentHandle, Filter, FindOptions, Stage};
use crate::domain::{DurationTotal, EntityId, Serial};
use crate::error::{AppError, AppResult};
use crate::repositories::{check_new, check_persisted, SerialRepository};

const ID: &str = "s_id";

pub struct DocumentSerialRepository {
    store: DocumentHandle,
}

impl DocumentSerialRepository {
    pub fn new(store: DocumentHandle) -> Self {
        Self { store }
    }

    fn to_document(id: EntityId, serial: &Serial) -> Document {
        into_document(json!({
            ID: id,
            "s_idProducer": serial.producer_id,
            "s_name": serial.name,
            "s_description": serial.description,
            "s_year": serial.year,
            "s_genre": serial.genre,
            "s_rating": serial.rating,
            "s_seasons": serial.seasons,
            "s_state": serial.state,
            "s_img": serial.img,
            "s_duration": serial.duration,
        }))
    }

    fn from_document(doc: &Document) -> AppResult<Serial> {
        let r = DocReader::new(SERIALS, doc);
        Ok(Serial {
            id: r.i64(ID)?,
            producer_id: r.i64("s_idProducer")?,
            name: r.string("s_name")?,
            description: r.optional_string("s_description")?,
            year: r.i32("s_year")?,
            genre: r.optional_string("s_genre")?,
            rating: r.f64("s_rating")?,
            seasons: r.i32("s_seasons")?,
            state: r.optional_string("s_state")?,
            img: r.optional_string("s_img")?,
            duration: r.i64("s_duration")?,
        })
    }

    fn find_all(&self, filter: &Filter) -> AppResult<Vec<Serial>> {
        self.store
            .find(SERIALS, filter, &FindOptions::sorted_by(ID))?
            .iter()
            .map(Self::from_document)
            .collect()
    }
}

impl SerialRepository for DocumentSerialRepository {
    fn list_all(&self) -> AppResult<Vec<Serial>> {
        log::info!("serials: list all");
        self.find_all(&Filter::All)
    }

    fn get_by_id(&self, id: EntityId) -> AppResult<Serial> {
        log::info!("serials: get {}", id);
        match self.store.find_one(SERIALS, &Filter::eq(ID, id))? {
            Some(doc) => Self::from_document(&doc),
            None => Err(AppError::not_found("serial", id)),
        }
    }

    fn list_by_title(&self, fragment: &str) -> AppResult<Vec<Serial>> {
        log::info!("serials: list by title '{}'", fragment);
        self.find_all(&Filter::contains_ci("s_name", fragment)?)
    }

    fn create(&self, serial: &Serial) -> AppResult<EntityId> {
        check_new(serial)?;
        let id = self.store.next_sequence(SERIALS)?;
        self.store.insert_one(SERIALS, Self::to_document(id, serial))?;
        log::info!("serials: created {} '{}'", id, serial.name);
        Ok(id)
    }

    fn update(&self, serial: &Serial) -> AppResult<()> {
        check_persisted(serial)?;
        self.store.replace_one(
            SERIALS,
            &Filter::eq(ID, serial.id),
            Self::to_document(serial.id, serial),
        )?;
        log::info!("serials: updated {}", serial.id);
        Ok(())
    }

    fn delete(&self, id: EntityId) -> AppResult<()> {
        self.store.delete_one(SERIALS, &Filter::eq(ID, id))?;
        log::info!("serials: deleted {}", id);
        Ok(())
    }

    fn episode_duration_total(&self, serial_id: EntityId) -> AppResult<DurationTotal> {
        let season_ids = self
            .store
            .find(SEASONS, &Filter::eq("ss_idSerial", serial_id), &FindOptions::default())?
            .iter()
            .map(|doc| DocReader::new(SEASONS, doc).i64("ss_id"))
            .collect::<AppResult<Vec<_>>>()?;

        if season_ids.is_empty() {
            return Ok(DurationTotal::default());
        }

        let pipeline = [
            Stage::Match(Filter::is_in("e_idSeason", season_ids)),
            Stage::Group {
                key: None,
                accumulators: vec![
                    ("minutes".to_string(), Accumulator::Sum("e_duration".to_string())),
                    ("episodes".to_string(), Accumulator::Count),
                ],
            },
        ];

        let total = match self.store.aggregate(EPISODES, &pipeline)?.first() {
            Some(doc) => {
                let r = DocReader::new(EPISODES, doc);
                DurationTotal {
                    episodes: r.i64("episodes")?,
                    minutes: r.i64("minutes")?,
                }
            }
            None => DurationTotal::default(),
        };

        log::debug!(
            "serials: duration of {} = {} min over {} episodes",
            serial_id,
            total.minutes,
            total.episodes
        );
        Ok(total)
    }
}
