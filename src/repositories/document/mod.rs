// src/repositories/document/mod.rs
//
// Document-store adapters
//
// One adapter per entity, each with a hand-written mapping to and from
// its documents. Numeric identifiers come from a per-collection sequence
// and live in the `<prefix>_id` field; the store's object id is never
// read back.

pub mod actor;
pub mod comment;
pub mod episode;
pub mod favourite;
pub mod producer;
pub mod season;
pub mod serial;
pub mod serial_actor;
pub mod serial_favourite;
pub mod serial_user;
pub mod statistic;
pub mod user;

pub use actor::DocumentActorRepository;
pub use comment::DocumentCommentRepository;
pub use episode::DocumentEpisodeRepository;
pub use favourite::DocumentFavouriteRepository;
pub use producer::DocumentProducerRepository;
pub use season::DocumentSeasonRepository;
pub use serial::DocumentSerialRepository;
pub use serial_actor::DocumentSerialActorRepository;
pub use serial_favourite::DocumentSerialFavouriteRepository;
pub use serial_user::DocumentSerialUserRepository;
pub use statistic::DocumentStatisticRepository;
pub use user::DocumentUserRepository;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::docstore::Document;
use crate::domain::{CatalogDate, StatisticBucket};
use crate::error::{AppError, AppResult};

/// Typed field access over a stored document.
pub(crate) struct DocReader<'a> {
    collection: &'static str,
    doc: &'a Document,
}

impl<'a> DocReader<'a> {
    pub fn new(collection: &'static str, doc: &'a Document) -> Self {
        Self { collection, doc }
    }

    fn field(&self, name: &str) -> AppResult<&'a Value> {
        self.doc
            .get(name)
            .ok_or_else(|| AppError::Document(format!("{}: missing field {}", self.collection, name)))
    }

    fn mismatch(&self, name: &str, expected: &str) -> AppError {
        AppError::Document(format!(
            "{}: field {} is not {}",
            self.collection, name, expected
        ))
    }

    /// Integers, and floats without a fractional part.
    pub fn i64(&self, name: &str) -> AppResult<i64> {
        let value = self.field(name)?;
        value
            .as_i64()
            .or_else(|| {
                value
                    .as_f64()
                    .filter(|f| f.fract() == 0.0)
                    .map(|f| f as i64)
            })
            .ok_or_else(|| self.mismatch(name, "an integer"))
    }

    pub fn i32(&self, name: &str) -> AppResult<i32> {
        i32::try_from(self.i64(name)?).map_err(|_| self.mismatch(name, "a 32-bit integer"))
    }

    pub fn f64(&self, name: &str) -> AppResult<f64> {
        self.field(name)?
            .as_f64()
            .ok_or_else(|| self.mismatch(name, "a number"))
    }

    pub fn string(&self, name: &str) -> AppResult<String> {
        self.field(name)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.mismatch(name, "a string"))
    }

    /// Missing and null read as an empty string.
    pub fn optional_string(&self, name: &str) -> AppResult<String> {
        match self.doc.get(name) {
            None | Some(Value::Null) => Ok(String::new()),
            Some(_) => self.string(name),
        }
    }

    /// A statistic column name; missing and null read as `None`.
    pub fn bucket(&self, name: &str) -> AppResult<Option<StatisticBucket>> {
        match self.doc.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(_) => StatisticBucket::from_column(&self.string(name)?)
                .map(Some)
                .ok_or_else(|| self.mismatch(name, "a statistic bucket")),
        }
    }

    /// Accepts date text in any native form, or extended JSON
    /// `{"$date": <RFC 3339 text | epoch millis>}`.
    pub fn date(&self, name: &str) -> AppResult<CatalogDate> {
        match self.field(name)? {
            Value::String(raw) => CatalogDate::parse(raw).map_err(|_| self.mismatch(name, "a date")),
            Value::Object(inner) => match inner.get("$date") {
                Some(Value::String(raw)) => {
                    CatalogDate::parse(raw).map_err(|_| self.mismatch(name, "a date"))
                }
                Some(Value::Number(millis)) => millis
                    .as_i64()
                    .and_then(DateTime::<Utc>::from_timestamp_millis)
                    .map(|moment| CatalogDate::new(moment.date_naive()))
                    .ok_or_else(|| self.mismatch(name, "a date")),
                _ => Err(self.mismatch(name, "a date")),
            },
            _ => Err(self.mismatch(name, "a date")),
        }
    }
}

/// Unwraps a `json!` object literal.
pub(crate) fn into_document(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        _ => Document::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reader_accepts_whole_floats() {
        let doc = into_document(json!({"n": 45.0, "x": 4.5}));
        let r = DocReader::new("episodes", &doc);
        assert_eq!(r.i64("n").unwrap(), 45);
        assert!(r.i64("x").is_err());
    }

    #[test]
    fn test_reader_dates() {
        let doc = into_document(json!({
            "text": "2023-05-01T00:00:00Z",
            "ext": {"$date": "2023-05-01T00:00:00Z"},
            "millis": {"$date": 1682899200000_i64},
            "bad": 7
        }));
        let r = DocReader::new("seasons", &doc);
        for field in ["text", "ext", "millis"] {
            assert_eq!(r.date(field).unwrap().to_string(), "01.05.2023", "field {}", field);
        }
        assert!(matches!(r.date("bad"), Err(AppError::Document(_))));
    }

    #[test]
    fn test_missing_field_is_reported() {
        let doc = into_document(json!({}));
        let r = DocReader::new("users", &doc);
        assert!(matches!(r.string("u_login"), Err(AppError::Document(_))));
        assert_eq!(r.optional_string("u_surname").unwrap(), "");
    }

    #[test]
    fn test_reader_buckets() {
        let doc = into_document(json!({
            "set": "st_age_0_18",
            "null": null,
            "bad": "st_age_0_17"
        }));
        let r = DocReader::new("users", &doc);
        assert_eq!(r.bucket("set").unwrap(), Some(StatisticBucket::Age0To18));
        assert_eq!(r.bucket("null").unwrap(), None);
        assert_eq!(r.bucket("missing").unwrap(), None);
        assert!(matches!(r.bucket("bad"), Err(AppError::Document(_))));
    }
}
