// tests/common/mod.rs
//
// Shared fixtures: one initialized store per backend family.

#![allow(dead_code)]

use std::time::Duration;

use tempfile::TempDir;

use serialhub::{
    CatalogDate, EngineKind, Episode, Producer, Repositories, Season, Serial, StatisticBucket,
    StorageConfig, StoreHandle, User,
};

pub struct Backend {
    pub name: &'static str,
    pub store: StoreHandle,
    pub repos: Repositories,
    // keeps the database files alive for the test
    _dir: TempDir,
}

fn config(engine: EngineKind, dir: &TempDir) -> StorageConfig {
    let file = match engine {
        EngineKind::Relational => "catalog.db",
        EngineKind::Document => "catalog.docs.json",
    };
    StorageConfig {
        engine,
        database_path: Some(dir.path().join(file)),
        pool_size: 4,
        operation_timeout: Duration::from_secs(10),
    }
}

fn open(engine: EngineKind, dir: TempDir) -> Backend {
    let store = StoreHandle::connect(&config(engine, &dir)).unwrap();
    store.initialize().unwrap();
    let repos = Repositories::from_handle(&store);

    Backend {
        name: engine.as_str(),
        store,
        repos,
        _dir: dir,
    }
}

impl Backend {
    /// Drops this connection and connects again to the same files.
    pub fn reopen(self) -> Backend {
        let engine = self.store.engine();
        let Backend {
            store,
            repos,
            _dir: dir,
            ..
        } = self;
        drop(repos);
        drop(store);
        open(engine, dir)
    }
}

pub fn relational() -> Backend {
    open(EngineKind::Relational, tempfile::tempdir().unwrap())
}

pub fn document() -> Backend {
    open(EngineKind::Document, tempfile::tempdir().unwrap())
}

/// Both backend families, freshly initialized.
pub fn backends() -> Vec<Backend> {
    vec![relational(), document()]
}

pub fn date(y: i32, m: u32, d: u32) -> CatalogDate {
    CatalogDate::from_ymd(y, m, d).unwrap()
}

pub fn user(login: &str, favourites_id: i64) -> User {
    User {
        id: 0,
        login: login.to_string(),
        password: "secret".to_string(),
        role: "user".to_string(),
        name: "Dana".to_string(),
        surname: "Scully".to_string(),
        gender: "female".to_string(),
        bdate: date(1964, 2, 23),
        favourites_id,
        age_bucket: Some(StatisticBucket::Age51To100),
    }
}

/// A producer, a serial and one season; returns (serial_id, season_id).
pub fn seed_serial(repos: &Repositories, name: &str) -> (i64, i64) {
    let producer_id = repos.producers.create(&Producer::new("Chris", "Carter")).unwrap();
    let serial_id = repos
        .serials
        .create(&Serial::new(producer_id, name, 1993))
        .unwrap();
    let season_id = repos
        .seasons
        .create(&Season::new(serial_id, 1, "Season 1", date(1993, 9, 10)))
        .unwrap();
    (serial_id, season_id)
}

pub fn episode(season_id: i64, num: i32, duration: i64) -> Episode {
    Episode::new(season_id, num, format!("Episode {}", num), duration, date(1993, 9, 10))
}
