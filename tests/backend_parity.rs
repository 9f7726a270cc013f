// tests/backend_parity.rs
//
// The same contract checks against both backend families.

mod common;

use serde_json::{json, Value};

use common::{backends, date, episode, seed_serial, user, Backend};
use serialhub::docstore::collections::{ACTORS, COMMENTS, EPISODES, SEASONS, SERIALS_USERS, USERS};
use serialhub::docstore::DocumentStore;
use serialhub::{
    Actor, AppError, Comment, DomainError, Episode, Favourite, Producer, Season, Serial,
    SerialActor, SerialFavourite, SerialUser, Statistic, StatisticBucket, StoreHandle, User,
    STATISTIC_ID,
};

/// Creates `$value` through `$repo`, then checks that `get_by_id` and
/// `list_all` return it field for field under the issued id.
macro_rules! assert_round_trip {
    ($b:expr, $repo:ident, $value:expr) => {{
        let mut expected = $value;
        let id = $b.repos.$repo.create(&expected).unwrap();
        expected.id = id;

        let stored = $b.repos.$repo.get_by_id(id).unwrap();
        assert_eq!(stored, expected, "{}: {}", $b.name, stringify!($repo));
        let listed = $b.repos.$repo.list_all().unwrap();
        assert_eq!(listed.last(), Some(&expected), "{}: {}", $b.name, stringify!($repo));
        id
    }};
}

#[test]
fn test_create_then_get_is_field_equal_for_every_entity() {
    for b in backends() {
        let actor_id = assert_round_trip!(
            b,
            actors,
            Actor::new("Gillian", "Anderson", "female", date(1968, 8, 9))
        );
        let producer_id = assert_round_trip!(b, producers, Producer::new("Chris", "Carter"));
        let serial_id = assert_round_trip!(
            b,
            serials,
            Serial {
                description: "Two agents, one basement office".to_string(),
                genre: "Drama".to_string(),
                rating: 8.6,
                seasons: 11,
                state: "finished".to_string(),
                img: "x-files.png".to_string(),
                duration: 9270,
                ..Serial::new(producer_id, "The X-Files", 1993)
            }
        );
        let season_id = assert_round_trip!(
            b,
            seasons,
            Season {
                cnt_episodes: 24,
                ..Season::new(serial_id, 1, "Season 1", date(1993, 9, 10))
            }
        );
        assert_round_trip!(
            b,
            episodes,
            Episode::new(season_id, 1, "Pilot", 48, date(1993, 9, 10))
        );
        let favourite_id = assert_round_trip!(b, favourites, Favourite { id: 0, cnt_serials: 3 });
        let user_id = assert_round_trip!(b, users, user("mulder", favourite_id));
        assert_round_trip!(
            b,
            users,
            User {
                age_bucket: None,
                surname: String::new(),
                ..user("skinner", favourite_id)
            }
        );
        assert_round_trip!(
            b,
            comments,
            Comment::new(user_id, serial_id, "The truth is out there", date(1994, 1, 7))
        );
        assert_round_trip!(b, serial_actors, SerialActor::new(serial_id, actor_id));
        assert_round_trip!(b, serial_favourites, SerialFavourite::new(serial_id, favourite_id));
        assert_round_trip!(
            b,
            serial_users,
            SerialUser::new(serial_id, user_id, date(2024, 2, 29))
        );

        let statistic = Statistic {
            gender_male: 1,
            gender_female: 2,
            role_user: 3,
            role_admin: 4,
            age_0_18: 5,
            age_19_30: 6,
            age_31_50: 7,
            age_51_100: 8,
            ..Statistic::default()
        };
        b.repos.statistic.update(&statistic).unwrap();
        assert_eq!(b.repos.statistic.get().unwrap(), statistic, "{}", b.name);
    }
}

/// Stores a row straight through the engine, with `date_field` holding
/// 2023-05-01 in a form only the engine itself produces: SQL datetime text
/// on the relational side, extended JSON epoch millis on the document side.
fn insert_native(b: &Backend, table: &str, id_field: &str, date_field: &str, fields: Value) -> i64 {
    let mut fields = fields.as_object().cloned().unwrap();
    match &b.store {
        StoreHandle::Relational(db) => {
            fields.insert(date_field.to_string(), json!("2023-05-01 00:00:00"));
            let columns: Vec<&str> = fields.keys().map(String::as_str).collect();
            let marks: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
                table,
                columns.join(", "),
                marks.join(", "),
                id_field
            );
            let values: Vec<rusqlite::types::Value> = fields
                .values()
                .map(|value| match value {
                    Value::Number(n) => rusqlite::types::Value::Integer(n.as_i64().unwrap()),
                    Value::String(text) => rusqlite::types::Value::Text(text.clone()),
                    _ => rusqlite::types::Value::Null,
                })
                .collect();
            let conn = db.connection().unwrap();
            conn.query_row(&sql, rusqlite::params_from_iter(values), |row| row.get(0))
                .unwrap()
        }
        StoreHandle::Document(store) => {
            let id = store.next_sequence(table).unwrap();
            fields.insert(id_field.to_string(), json!(id));
            fields.insert(date_field.to_string(), json!({ "$date": 1682899200000_i64 }));
            store.insert_one(table, fields).unwrap();
            id
        }
    }
}

const NATIVE_DAY: &str = "01.05.2023";

#[test]
fn test_native_actor_birth_date_reads_back() {
    for b in backends() {
        let id = insert_native(
            &b,
            ACTORS,
            "a_id",
            "a_bdate",
            json!({"a_name": "David", "a_surname": "Duchovny", "a_gender": "male"}),
        );

        let one = b.repos.actors.get_by_id(id).unwrap();
        assert_eq!(one.bdate.to_string(), NATIVE_DAY, "{}", b.name);
        assert_eq!(b.repos.actors.list_all().unwrap()[0].bdate.to_string(), NATIVE_DAY);

        let same_day = Actor::new("David", "Duchovny", "male", date(2023, 5, 1));
        assert!(b.repos.actors.check_exists(&same_day).unwrap(), "{}", b.name);
        let other_day = Actor::new("David", "Duchovny", "male", date(2023, 5, 2));
        assert!(!b.repos.actors.check_exists(&other_day).unwrap(), "{}", b.name);
    }
}

#[test]
fn test_native_season_date_reads_back() {
    for b in backends() {
        let (serial_id, _) = seed_serial(&b.repos, "Twin Peaks");
        let id = insert_native(
            &b,
            SEASONS,
            "ss_id",
            "ss_date",
            json!({"ss_idSerial": serial_id, "ss_name": "The Return", "ss_num": 3, "ss_cntEpisodes": 0}),
        );

        assert_eq!(b.repos.seasons.get_by_id(id).unwrap().date.to_string(), NATIVE_DAY, "{}", b.name);
        let by_serial = b.repos.seasons.list_by_serial(serial_id).unwrap();
        let native = by_serial.iter().find(|s| s.id == id).unwrap();
        assert_eq!(native.date.to_string(), NATIVE_DAY, "{}", b.name);
        assert!(b.repos.seasons.list_all().unwrap().iter().any(|s| s.id == id));
    }
}

#[test]
fn test_native_comment_date_reads_back() {
    for b in backends() {
        let (serial_id, _) = seed_serial(&b.repos, "Twin Peaks");
        let id = insert_native(
            &b,
            COMMENTS,
            "c_id",
            "c_date",
            json!({"c_text": "Damn fine coffee", "c_idUser": 7, "c_idSerial": serial_id}),
        );

        assert_eq!(b.repos.comments.get_by_id(id).unwrap().date.to_string(), NATIVE_DAY);
        let pair = b.repos.comments.get_by_serial_and_user(serial_id, 7).unwrap();
        assert_eq!(pair.date.to_string(), NATIVE_DAY, "{}", b.name);
        assert_eq!(b.repos.comments.list_by_serial(serial_id).unwrap()[0].date.to_string(), NATIVE_DAY);
        assert_eq!(b.repos.comments.list_by_user(7).unwrap()[0].date.to_string(), NATIVE_DAY);
        assert_eq!(b.repos.comments.list_all().unwrap()[0].date.to_string(), NATIVE_DAY);
    }
}

#[test]
fn test_native_user_birth_date_reads_back() {
    for b in backends() {
        let fav = b.repos.favourites.create(&Favourite::empty()).unwrap();
        let id = insert_native(
            &b,
            USERS,
            "u_id",
            "u_bdate",
            json!({
                "u_login": "cooper",
                "u_password": "secret",
                "u_role": "user",
                "u_name": "Dale",
                "u_surname": "Cooper",
                "u_gender": "male",
                "u_idFavourites": fav,
            }),
        );

        let one = b.repos.users.get_by_id(id).unwrap();
        assert_eq!(one.bdate.to_string(), NATIVE_DAY, "{}", b.name);
        assert_eq!(one.age_bucket, None, "{}", b.name);
        let by_login = b.repos.users.get_by_login("cooper").unwrap();
        assert_eq!(by_login.bdate.to_string(), NATIVE_DAY, "{}", b.name);
        assert_eq!(b.repos.users.list_all().unwrap()[0].bdate.to_string(), NATIVE_DAY);
    }
}

#[test]
fn test_native_last_seen_reads_back() {
    for b in backends() {
        let (serial_id, _) = seed_serial(&b.repos, "Twin Peaks");
        let id = insert_native(
            &b,
            SERIALS_USERS,
            "su_id",
            "su_lastSeen",
            json!({"su_idSerial": serial_id, "su_idUser": 5}),
        );

        assert_eq!(b.repos.serial_users.get_by_id(id).unwrap().last_seen.to_string(), NATIVE_DAY);
        let pair = b.repos.serial_users.get_by_pair(serial_id, 5).unwrap();
        assert_eq!(pair.last_seen.to_string(), NATIVE_DAY, "{}", b.name);
        assert_eq!(b.repos.serial_users.list_by_user(5).unwrap()[0].last_seen.to_string(), NATIVE_DAY);
        assert_eq!(
            b.repos.serial_users.list_by_serial(serial_id).unwrap()[0].last_seen.to_string(),
            NATIVE_DAY
        );
    }
}

#[test]
fn test_records_survive_reconnect() {
    for b in backends() {
        let name = b.name;
        let (serial_id, season_id) = seed_serial(&b.repos, "Lost");
        b.repos.episodes.create(&episode(season_id, 1, 42)).unwrap();
        b.repos.statistic.apply_delta(StatisticBucket::RoleAdmin, 1).unwrap();

        let b = b.reopen();
        assert_eq!(b.repos.serials.get_by_id(serial_id).unwrap().name, "Lost", "{}", name);
        assert_eq!(b.repos.episodes.count_by_season(season_id).unwrap(), 1, "{}", name);
        assert_eq!(b.repos.statistic.get().unwrap().role_admin, 1, "{}", name);

        let (next_serial, _) = seed_serial(&b.repos, "Lost: Missing Pieces");
        assert!(next_serial > serial_id, "{}", name);
        let err = b.repos.serials.create(&Serial::new(1, "Lost", 2004)).unwrap_err();
        assert!(matches!(err, AppError::Duplicate(_)), "{}: {:?}", name, err);
    }
}

#[test]
fn test_identifiers_are_issued_in_order() {
    for b in backends() {
        let first = b.repos.favourites.create(&Favourite::empty()).unwrap();
        let second = b.repos.favourites.create(&Favourite::empty()).unwrap();
        assert!(first > 0 && second > first, "{}", b.name);

        let listed: Vec<i64> = b.repos.favourites.list_all().unwrap().iter().map(|f| f.id).collect();
        assert_eq!(listed, vec![first, second], "{}", b.name);
    }
}

#[test]
fn test_missing_record_is_not_found() {
    for b in backends() {
        let err = b.repos.serials.get_by_id(404).unwrap_err();
        assert!(err.is_not_found(), "{}: {:?}", b.name, err);
    }
}

#[test]
fn test_duplicate_login_is_rejected() {
    for b in backends() {
        let fav = b.repos.favourites.create(&Favourite::empty()).unwrap();
        b.repos.users.create(&user("fox", fav)).unwrap();

        let err = b.repos.users.create(&user("fox", fav)).unwrap_err();
        assert!(matches!(err, AppError::Duplicate(_)), "{}: {:?}", b.name, err);
        assert_eq!(b.repos.users.list_all().unwrap().len(), 1, "{}", b.name);
    }
}

#[test]
fn test_duplicate_serial_name_is_rejected() {
    for b in backends() {
        let (_, _) = seed_serial(&b.repos, "The X-Files");

        let err = b
            .repos
            .serials
            .create(&Serial::new(1, "The X-Files", 2016))
            .unwrap_err();
        assert!(matches!(err, AppError::Duplicate(_)), "{}: {:?}", b.name, err);
    }
}

#[test]
fn test_invalid_record_never_reaches_store() {
    for b in backends() {
        let blank = Actor::new("", "Nobody", "male", date(1990, 1, 1));
        let err = b.repos.actors.create(&blank).unwrap_err();
        assert!(matches!(err, AppError::InvalidModel(_)), "{}", b.name);
        assert!(b.repos.actors.list_all().unwrap().is_empty(), "{}", b.name);

        let unsaved = Favourite::empty();
        assert!(matches!(
            b.repos.favourites.update(&unsaved),
            Err(AppError::InvalidModel(_))
        ));
    }
}

#[test]
fn test_update_and_delete_are_idempotent() {
    for b in backends() {
        let (serial_id, _) = seed_serial(&b.repos, "Millennium");
        let mut serial = b.repos.serials.get_by_id(serial_id).unwrap();
        serial.genre = "Thriller".to_string();
        serial.rating = 8.1;

        b.repos.serials.update(&serial).unwrap();
        b.repos.serials.update(&serial).unwrap();
        assert_eq!(b.repos.serials.get_by_id(serial_id).unwrap(), serial, "{}", b.name);

        b.repos.serials.delete(serial_id).unwrap();
        b.repos.serials.delete(serial_id).unwrap();
        assert!(b.repos.serials.get_by_id(serial_id).unwrap_err().is_not_found());
    }
}

#[test]
fn test_update_of_unknown_id_is_silent() {
    for b in backends() {
        let ghost = Favourite { id: 77, cnt_serials: 3 };
        b.repos.favourites.update(&ghost).unwrap();
        assert!(b.repos.favourites.get_by_id(77).unwrap_err().is_not_found(), "{}", b.name);
    }
}

#[test]
fn test_duration_roll_up() {
    for b in backends() {
        let (serial_id, season_id) = seed_serial(&b.repos, "Fringe");
        let other_season = b
            .repos
            .seasons
            .create(&serialhub::Season::new(serial_id, 2, "Season 2", date(2009, 9, 17)))
            .unwrap();

        b.repos.episodes.create(&episode(season_id, 1, 30)).unwrap();
        b.repos.episodes.create(&episode(season_id, 2, 45)).unwrap();
        b.repos.episodes.create(&episode(other_season, 1, 50)).unwrap();

        let total = b.repos.serials.episode_duration_total(serial_id).unwrap();
        assert_eq!(total.episodes, 3, "{}", b.name);
        assert_eq!(total.minutes, 125, "{}", b.name);

        assert_eq!(b.repos.episodes.count_by_season(season_id).unwrap(), 2, "{}", b.name);
        assert_eq!(b.repos.episodes.count_by_season(other_season).unwrap(), 1, "{}", b.name);
        assert_eq!(b.repos.episodes.count_by_season(404).unwrap(), 0, "{}", b.name);
    }
}

#[test]
fn test_duration_roll_up_without_episodes_is_empty() {
    for b in backends() {
        let (serial_id, _) = seed_serial(&b.repos, "Empty");
        let total = b.repos.serials.episode_duration_total(serial_id).unwrap();
        assert_eq!(total, Default::default(), "{}", b.name);
    }
}

#[test]
fn test_native_timestamp_reads_back_as_display_date() {
    for b in backends() {
        let (_, season_id) = seed_serial(&b.repos, "Twin Peaks");

        match &b.store {
            StoreHandle::Relational(db) => {
                let conn = db.connection().unwrap();
                conn.execute(
                    "INSERT INTO episodes (e_idSeason, e_name, e_num, e_duration, e_date)
                     VALUES (?1, 'Pilot', 1, 94, '2023-05-01T00:00:00Z')",
                    [season_id],
                )
                .unwrap();
            }
            StoreHandle::Document(store) => {
                let id = store.next_sequence(EPISODES).unwrap();
                let doc = json!({
                    "e_id": id,
                    "e_idSeason": season_id,
                    "e_name": "Pilot",
                    "e_num": 1,
                    "e_duration": 94,
                    "e_date": { "$date": "2023-05-01T00:00:00Z" },
                });
                let doc = doc.as_object().cloned().unwrap();
                store.insert_one(EPISODES, doc).unwrap();
            }
        }

        let by_season = b.repos.episodes.list_by_season(season_id).unwrap();
        assert_eq!(by_season.len(), 1, "{}", b.name);
        assert_eq!(by_season[0].date.to_string(), "01.05.2023", "{}", b.name);

        let all = b.repos.episodes.list_all().unwrap();
        assert_eq!(all[0].date.to_string(), "01.05.2023", "{}", b.name);

        let one = b.repos.episodes.get_by_id(by_season[0].id).unwrap();
        assert_eq!(one.date.to_string(), "01.05.2023", "{}", b.name);
    }
}

#[test]
fn test_existence_flips_at_creation() {
    for b in backends() {
        let (serial_id, _) = seed_serial(&b.repos, "Lost");
        let fav = b.repos.favourites.create(&Favourite::empty()).unwrap();
        let user_id = b.repos.users.create(&user("kate", fav)).unwrap();
        let actor_id = b
            .repos
            .actors
            .create(&Actor::new("Evangeline", "Lilly", "female", date(1979, 8, 3)))
            .unwrap();

        assert!(!b.repos.users.check_exists("jack").unwrap(), "{}", b.name);
        assert!(b.repos.users.check_exists("kate").unwrap(), "{}", b.name);

        assert!(!b.repos.serial_actors.exists(serial_id, actor_id).unwrap());
        b.repos.serial_actors.create(&SerialActor::new(serial_id, actor_id)).unwrap();
        assert!(b.repos.serial_actors.exists(serial_id, actor_id).unwrap(), "{}", b.name);

        assert!(!b.repos.serial_favourites.exists(serial_id, fav).unwrap());
        b.repos
            .serial_favourites
            .create(&SerialFavourite::new(serial_id, fav))
            .unwrap();
        assert!(b.repos.serial_favourites.exists(serial_id, fav).unwrap(), "{}", b.name);

        assert!(!b.repos.serial_users.exists(serial_id, user_id).unwrap());
        b.repos
            .serial_users
            .create(&SerialUser::new(serial_id, user_id, date(2024, 3, 1)))
            .unwrap();
        assert!(b.repos.serial_users.exists(serial_id, user_id).unwrap(), "{}", b.name);

        assert!(!b.repos.comments.check_exists(user_id, serial_id).unwrap());
        b.repos
            .comments
            .create(&Comment::new(user_id, serial_id, "We have to go back", date(2024, 3, 2)))
            .unwrap();
        assert!(b.repos.comments.check_exists(user_id, serial_id).unwrap(), "{}", b.name);
    }
}

#[test]
fn test_title_search_is_case_insensitive_substring() {
    for b in backends() {
        seed_serial(&b.repos, "Breaking Bad");
        seed_serial(&b.repos, "Better Call Saul");
        seed_serial(&b.repos, "100% Human");

        let found = b.repos.serials.list_by_title("bad").unwrap();
        assert_eq!(found.len(), 1, "{}", b.name);
        assert_eq!(found[0].name, "Breaking Bad");

        let literal = b.repos.serials.list_by_title("100%").unwrap();
        assert_eq!(literal.len(), 1, "{}", b.name);

        assert_eq!(b.repos.serials.list_by_title("").unwrap().len(), 3, "{}", b.name);
    }
}

#[test]
fn test_title_search_folds_non_ascii_case_alike() {
    for b in backends() {
        seed_serial(&b.repos, "Тёмный Лес");
        seed_serial(&b.repos, "Élite");

        for fragment in ["тёмный", "ТЁМНЫЙ", "лес", "élite", "ÉLITE"] {
            let found: Vec<String> = b
                .repos
                .serials
                .list_by_title(fragment)
                .unwrap()
                .into_iter()
                .map(|s| s.name)
                .collect();
            assert_eq!(found.len(), 1, "{}: '{}' -> {:?}", b.name, fragment, found);
        }
        assert!(b.repos.serials.list_by_title("темный").unwrap().is_empty(), "{}", b.name);
    }
}

#[test]
fn test_user_lookup_by_login() {
    for b in backends() {
        let fav = b.repos.favourites.create(&Favourite::empty()).unwrap();
        let id = b.repos.users.create(&user("walter", fav)).unwrap();

        let found = b.repos.users.get_by_login("walter").unwrap();
        assert_eq!(found.id, id, "{}", b.name);
        assert_eq!(found.bdate.to_string(), "23.02.1964");
        assert!(b.repos.users.get_by_login("jesse").unwrap_err().is_not_found());
    }
}

#[test]
fn test_join_cleanup_by_parent() {
    for b in backends() {
        let (serial_id, _) = seed_serial(&b.repos, "Dexter");
        let fav = b.repos.favourites.create(&Favourite::empty()).unwrap();
        b.repos
            .serial_favourites
            .create(&SerialFavourite::new(serial_id, fav))
            .unwrap();
        b.repos
            .serial_favourites
            .create(&SerialFavourite::new(serial_id, fav))
            .unwrap();

        assert_eq!(b.repos.serial_favourites.delete_by_pair(fav, serial_id).unwrap(), 2, "{}", b.name);
        assert_eq!(b.repos.serial_favourites.delete_by_pair(fav, serial_id).unwrap(), 0);
        assert!(b.repos.serial_favourites.list_by_favourite(fav).unwrap().is_empty());
    }
}

#[test]
fn test_statistic_singleton() {
    for b in backends() {
        let stat = b.repos.statistic.get().unwrap();
        assert_eq!(stat, Statistic::default(), "{}", b.name);

        let replaced = Statistic {
            gender_male: 4,
            role_user: 4,
            ..Statistic::default()
        };
        b.repos.statistic.update(&replaced).unwrap();
        b.repos.statistic.update(&replaced).unwrap();
        assert_eq!(b.repos.statistic.get().unwrap(), replaced, "{}", b.name);

        b.store.initialize().unwrap();
        assert_eq!(b.repos.statistic.get().unwrap().id, STATISTIC_ID, "{}", b.name);
        assert_eq!(b.repos.statistic.get().unwrap(), replaced, "{}", b.name);
    }
}

#[test]
fn test_statistic_rejects_negative_replacement() {
    for b in backends() {
        let bad = Statistic {
            age_0_18: -1,
            ..Statistic::default()
        };
        assert!(matches!(b.repos.statistic.update(&bad), Err(AppError::InvalidModel(_))));
        assert_eq!(b.repos.statistic.get().unwrap().age_0_18, 0, "{}", b.name);
    }
}

#[test]
fn test_statistic_delta_is_guarded() {
    for b in backends() {
        b.repos.statistic.apply_delta(StatisticBucket::Age19To30, 2).unwrap();
        b.repos.statistic.apply_delta(StatisticBucket::Age19To30, -1).unwrap();
        assert_eq!(b.repos.statistic.get().unwrap().age_19_30, 1, "{}", b.name);

        let err = b
            .repos
            .statistic
            .apply_delta(StatisticBucket::Age19To30, -2)
            .unwrap_err();
        assert!(
            matches!(err, AppError::InvalidModel(DomainError::NegativeCounter { .. })),
            "{}: {:?}",
            b.name,
            err
        );
        assert_eq!(b.repos.statistic.get().unwrap().age_19_30, 1, "{}", b.name);
    }
}

#[test]
fn test_concurrent_increments_are_not_lost() {
    for b in backends() {
        let stats = b.repos.statistic.clone();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let stats = stats.clone();
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        stats.apply_delta(StatisticBucket::RoleUser, 1).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(b.repos.statistic.get().unwrap().role_user, 100, "{}", b.name);
    }
}
