// src/domain/date.rs
//
// Calendar dates as the catalog presents them.
//
// Every read path turns the backend's native value into a `CatalogDate`,
// whose display form is DD.MM.YYYY. Writes go through `to_relational` or
// `to_document` exactly once.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::{DomainError, DomainResult};

/// Presentation format on every read path.
pub const DISPLAY_FORMAT: &str = "%d.%m.%Y";

const RELATIONAL_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CatalogDate(NaiveDate);

impl CatalogDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn today() -> Self {
        Self(Utc::now().date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Parses the display form or any native form either backend stores:
    /// `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` and RFC 3339.
    pub fn parse(input: &str) -> DomainResult<Self> {
        let raw = input.trim();

        if let Ok(date) = NaiveDate::parse_from_str(raw, DISPLAY_FORMAT) {
            return Ok(Self(date));
        }
        if let Ok(date) = NaiveDate::parse_from_str(raw, RELATIONAL_FORMAT) {
            return Ok(Self(date));
        }
        if let Ok(moment) = DateTime::parse_from_rfc3339(raw) {
            return Ok(Self(moment.with_timezone(&Utc).date_naive()));
        }
        for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(moment) = NaiveDateTime::parse_from_str(raw, format) {
                return Ok(Self(moment.date()));
            }
        }

        Err(DomainError::InvalidDate(input.to_string()))
    }

    /// Native relational form (SQL date text).
    pub fn to_relational(&self) -> String {
        self.0.format(RELATIONAL_FORMAT).to_string()
    }

    /// Native document form: midnight UTC, RFC 3339.
    pub fn to_document(&self) -> String {
        format!("{}T00:00:00Z", self.0.format(RELATIONAL_FORMAT))
    }

    /// Whole years elapsed between this date and `on`.
    pub fn years_until(&self, on: NaiveDate) -> i32 {
        let mut years = on.year() - self.0.year();
        if (on.month(), on.day()) < (self.0.month(), self.0.day()) {
            years -= 1;
        }
        years
    }
}

impl fmt::Display for CatalogDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DISPLAY_FORMAT))
    }
}

impl FromStr for CatalogDate {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<NaiveDate> for CatalogDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl Serialize for CatalogDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CatalogDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
