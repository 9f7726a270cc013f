// src/services/user_service.rs
//
// User lifecycle: registration, profile changes, removal, favourites and
// watch progress. Keeps the Statistic demographics in step with the users.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::domain::{
    CatalogDate, EntityId, Favourite, SerialFavourite, SerialUser, StatisticBucket, User,
};
use crate::error::{AppError, AppResult};
use crate::repositories::{
    CommentRepository, FavouriteRepository, SerialFavouriteRepository, SerialRepository,
    SerialUserRepository, UserRepository,
};
use crate::services::AggregateService;

#[derive(Debug, Clone)]
pub struct NewUser {
    pub login: String,
    pub password: String,
    pub role: String,
    pub name: String,
    pub surname: String,
    pub gender: String,
    pub bdate: CatalogDate,
}

pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    favourite_repo: Arc<dyn FavouriteRepository>,
    serial_repo: Arc<dyn SerialRepository>,
    serial_favourite_repo: Arc<dyn SerialFavouriteRepository>,
    serial_user_repo: Arc<dyn SerialUserRepository>,
    comment_repo: Arc<dyn CommentRepository>,
    aggregates: Arc<AggregateService>,
    today: fn() -> NaiveDate,
}

fn system_today() -> NaiveDate {
    CatalogDate::today().date()
}

/// Demographic buckets a stored user is counted in, in gender / role / age
/// order. The age bracket is the one recorded on the user, not today's.
fn counted_buckets(user: &User) -> [Option<StatisticBucket>; 3] {
    [
        StatisticBucket::for_gender(&user.gender),
        StatisticBucket::for_role(&user.role),
        user.age_bucket,
    ]
}

fn deltas(buckets: [Option<StatisticBucket>; 3], delta: i64) -> Vec<(StatisticBucket, i64)> {
    buckets.into_iter().flatten().map(|bucket| (bucket, delta)).collect()
}

/// Counter moves taking `before` to `after`, one pair per changed bucket.
fn moves(before: &User, after: &User) -> Vec<(StatisticBucket, i64)> {
    let mut moves = Vec::new();
    for (old, new) in counted_buckets(before).into_iter().zip(counted_buckets(after)) {
        if old == new {
            continue;
        }
        moves.extend(old.map(|bucket| (bucket, -1)));
        moves.extend(new.map(|bucket| (bucket, 1)));
    }
    moves
}

impl UserService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        favourite_repo: Arc<dyn FavouriteRepository>,
        serial_repo: Arc<dyn SerialRepository>,
        serial_favourite_repo: Arc<dyn SerialFavouriteRepository>,
        serial_user_repo: Arc<dyn SerialUserRepository>,
        comment_repo: Arc<dyn CommentRepository>,
        aggregates: Arc<AggregateService>,
    ) -> Self {
        Self {
            user_repo,
            favourite_repo,
            serial_repo,
            serial_favourite_repo,
            serial_user_repo,
            comment_repo,
            aggregates,
            today: system_today,
        }
    }

    /// Replaces the clock that age brackets are evaluated against.
    pub fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    fn age_bucket(&self, bdate: CatalogDate) -> Option<StatisticBucket> {
        StatisticBucket::for_birth_date(bdate, (self.today)())
    }

    /// Creates the user together with its favourites container and counts
    /// it in the demographics. The age bracket counted is stored on the user.
    pub fn register(&self, request: NewUser) -> AppResult<User> {
        if self.user_repo.check_exists(&request.login)? {
            log::warn!("register: login {} already taken", request.login);
            return Err(AppError::Duplicate(format!("login {}", request.login)));
        }

        let favourites_id = self.favourite_repo.create(&Favourite::empty())?;

        let mut user = User {
            id: 0,
            age_bucket: self.age_bucket(request.bdate),
            login: request.login,
            password: request.password,
            role: request.role,
            name: request.name,
            surname: request.surname,
            gender: request.gender,
            bdate: request.bdate,
            favourites_id,
        };

        user.id = match self.user_repo.create(&user) {
            Ok(id) => id,
            Err(e) => {
                // the container has no owner yet
                self.favourite_repo.delete(favourites_id)?;
                return Err(e);
            }
        };

        if let Err(e) = self.aggregates.apply_deltas(&deltas(counted_buckets(&user), 1)) {
            log::warn!("register: counting user {} failed, rolling back", user.id);
            self.user_repo.delete(user.id)?;
            self.favourite_repo.delete(favourites_id)?;
            return Err(e);
        }

        log::info!("Registered user {} ({})", user.id, user.login);
        Ok(user)
    }

    /// Whole-entity update. The age bracket is evaluated again on today's
    /// date, and every bucket that changed is moved before the user is
    /// stored. Returns the user as stored.
    pub fn update_profile(&self, user: &User) -> AppResult<User> {
        let previous = self.user_repo.get_by_id(user.id)?;

        let mut updated = user.clone();
        updated.age_bucket = self.age_bucket(user.bdate);

        let moves = moves(&previous, &updated);
        self.aggregates.apply_deltas(&moves)?;

        if let Err(e) = self.user_repo.update(&updated) {
            self.aggregates.revert(&moves);
            return Err(e);
        }

        log::info!("Updated profile of user {}", user.id);
        Ok(updated)
    }

    /// Removes the user and everything that hangs off it. Returns `false`
    /// when no such user exists.
    ///
    /// The counters the user was counted in are lowered first; when that
    /// is rejected nothing is deleted. When a later delete fails the
    /// counters are restored and the removal can be retried.
    pub fn remove(&self, user_id: EntityId) -> AppResult<bool> {
        let user = match self.user_repo.get_by_id(user_id) {
            Ok(user) => user,
            Err(e) if e.is_not_found() => return Ok(false),
            Err(e) => return Err(e),
        };

        let counted = deltas(counted_buckets(&user), -1);
        self.aggregates.apply_deltas(&counted)?;

        if let Err(e) = self.delete_with_dependents(&user) {
            log::warn!("remove: user {} only partly removed: {}", user.id, e);
            self.aggregates.revert(&counted);
            return Err(e);
        }

        log::info!("Removed user {} ({})", user.id, user.login);
        Ok(true)
    }

    fn delete_with_dependents(&self, user: &User) -> AppResult<()> {
        self.serial_user_repo.delete_by_user(user.id)?;
        self.serial_favourite_repo.delete_by_favourite(user.favourites_id)?;
        self.comment_repo.delete_by_user(user.id)?;
        self.favourite_repo.delete(user.favourites_id)?;
        self.user_repo.delete(user.id)
    }

    /// Returns `false` if the serial was already a favourite.
    pub fn add_favourite(&self, user_id: EntityId, serial_id: EntityId) -> AppResult<bool> {
        let user = self.user_repo.get_by_id(user_id)?;
        self.serial_repo.get_by_id(serial_id)?;

        if self.serial_favourite_repo.exists(serial_id, user.favourites_id)? {
            return Ok(false);
        }

        self.serial_favourite_repo
            .create(&SerialFavourite::new(serial_id, user.favourites_id))?;

        let mut favourite = self.favourite_repo.get_by_id(user.favourites_id)?;
        favourite.cnt_serials += 1;
        self.favourite_repo.update(&favourite)?;

        log::info!("User {} added serial {} to favourites", user_id, serial_id);
        Ok(true)
    }

    /// Returns `false` if the serial was not a favourite.
    pub fn remove_favourite(&self, user_id: EntityId, serial_id: EntityId) -> AppResult<bool> {
        let user = self.user_repo.get_by_id(user_id)?;

        let removed = self
            .serial_favourite_repo
            .delete_by_pair(user.favourites_id, serial_id)?;
        if removed == 0 {
            return Ok(false);
        }

        let mut favourite = self.favourite_repo.get_by_id(user.favourites_id)?;
        favourite.cnt_serials = (favourite.cnt_serials - removed as i64).max(0);
        self.favourite_repo.update(&favourite)?;

        log::info!("User {} removed serial {} from favourites", user_id, serial_id);
        Ok(true)
    }

    /// Upserts the watch progress marker for the pair.
    pub fn record_watch(
        &self,
        user_id: EntityId,
        serial_id: EntityId,
        seen: CatalogDate,
    ) -> AppResult<EntityId> {
        match self.serial_user_repo.get_by_pair(serial_id, user_id) {
            Ok(mut link) => {
                link.last_seen = seen;
                self.serial_user_repo.update(&link)?;
                log::debug!("User {} watched serial {} on {}", user_id, serial_id, seen);
                Ok(link.id)
            }
            Err(e) if e.is_not_found() => {
                let id = self
                    .serial_user_repo
                    .create(&SerialUser::new(serial_id, user_id, seen))?;
                log::info!("User {} started serial {}", user_id, serial_id);
                Ok(id)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DomainError, Serial};
    use crate::repositories::comment_repository::MockCommentRepository;
    use crate::repositories::favourite_repository::MockFavouriteRepository;
    use crate::repositories::serial_favourite_repository::MockSerialFavouriteRepository;
    use crate::repositories::serial_repository::MockSerialRepository;
    use crate::repositories::serial_user_repository::MockSerialUserRepository;
    use crate::repositories::statistic_repository::MockStatisticRepository;
    use crate::repositories::user_repository::MockUserRepository;
    use mockall::predicate::eq;
    use mockall::Sequence;

    #[derive(Default)]
    struct Mocks {
        users: MockUserRepository,
        favourites: MockFavouriteRepository,
        serials: MockSerialRepository,
        serial_favourites: MockSerialFavouriteRepository,
        serial_users: MockSerialUserRepository,
        comments: MockCommentRepository,
        stats: MockStatisticRepository,
    }

    impl Mocks {
        fn into_service(self) -> UserService {
            let aggregates = Arc::new(AggregateService::new(
                Arc::new(MockSerialRepository::new()),
                Arc::new(self.stats),
            ));
            UserService::new(
                Arc::new(self.users),
                Arc::new(self.favourites),
                Arc::new(self.serials),
                Arc::new(self.serial_favourites),
                Arc::new(self.serial_users),
                Arc::new(self.comments),
                aggregates,
            )
            .with_today(new_year_2024)
        }
    }

    fn new_year_2024() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn midsummer_2025() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
    }

    fn request() -> NewUser {
        NewUser {
            login: "neo".to_string(),
            password: "redpill".to_string(),
            role: "admin".to_string(),
            name: "Thomas".to_string(),
            surname: "Anderson".to_string(),
            gender: "male".to_string(),
            bdate: CatalogDate::from_ymd(1980, 6, 15).unwrap(),
        }
    }

    fn stored_user() -> User {
        let r = request();
        User {
            id: 3,
            login: r.login,
            password: r.password,
            role: r.role,
            name: r.name,
            surname: r.surname,
            gender: r.gender,
            bdate: r.bdate,
            favourites_id: 9,
            age_bucket: Some(StatisticBucket::Age31To50),
        }
    }

    /// Counted as 18 at the start of 2024, 19 by the middle of 2025.
    fn teenager() -> User {
        User {
            bdate: CatalogDate::from_ymd(2005, 6, 15).unwrap(),
            age_bucket: Some(StatisticBucket::Age0To18),
            ..stored_user()
        }
    }

    fn negative(bucket: StatisticBucket, delta: i64) -> AppResult<()> {
        Err(DomainError::NegativeCounter {
            bucket: bucket.to_string(),
            value: delta,
        }
        .into())
    }

    #[test]
    fn test_register_creates_favourite_then_user_then_counts() {
        let mut m = Mocks::default();
        let mut seq = Sequence::new();

        m.users
            .expect_check_exists()
            .with(eq("neo"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(false));
        m.favourites
            .expect_create()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(9));
        m.users
            .expect_create()
            .withf(|u: &User| {
                u.favourites_id == 9
                    && u.login == "neo"
                    && u.age_bucket == Some(StatisticBucket::Age31To50)
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(3));
        m.stats
            .expect_apply_delta()
            .withf(|bucket, delta| {
                *delta == 1
                    && matches!(
                        bucket,
                        StatisticBucket::GenderMale
                            | StatisticBucket::RoleAdmin
                            | StatisticBucket::Age31To50
                    )
            })
            .times(3)
            .returning(|_, _| Ok(()));

        let user = m.into_service().register(request()).unwrap();
        assert_eq!(user.id, 3);
        assert_eq!(user.favourites_id, 9);
        assert_eq!(user.age_bucket, Some(StatisticBucket::Age31To50));
    }

    #[test]
    fn test_register_rejects_taken_login() {
        let mut m = Mocks::default();
        m.users.expect_check_exists().returning(|_| Ok(true));
        m.favourites.expect_create().never();
        m.stats.expect_apply_delta().never();

        let result = m.into_service().register(request());
        assert!(matches!(result, Err(AppError::Duplicate(_))));
    }

    #[test]
    fn test_register_drops_favourite_when_user_create_fails() {
        let mut m = Mocks::default();
        m.users.expect_check_exists().returning(|_| Ok(false));
        m.favourites.expect_create().returning(|_| Ok(9));
        m.users
            .expect_create()
            .returning(|_| Err(AppError::Duplicate("login neo".to_string())));
        m.favourites
            .expect_delete()
            .with(eq(9))
            .times(1)
            .returning(|_| Ok(()));
        m.stats.expect_apply_delta().never();

        assert!(m.into_service().register(request()).is_err());
    }

    #[test]
    fn test_register_rolls_back_when_counting_fails() {
        let mut m = Mocks::default();
        m.users.expect_check_exists().returning(|_| Ok(false));
        m.favourites.expect_create().returning(|_| Ok(9));
        m.users.expect_create().returning(|_| Ok(3));
        m.stats
            .expect_apply_delta()
            .returning(|_, _| Err(AppError::Timeout("busy".to_string())));
        m.users.expect_delete().with(eq(3)).times(1).returning(|_| Ok(()));
        m.favourites.expect_delete().with(eq(9)).times(1).returning(|_| Ok(()));

        let err = m.into_service().register(request()).unwrap_err();
        assert!(matches!(err, AppError::Timeout(_)));
    }

    #[test]
    fn test_update_profile_moves_changed_buckets_only() {
        let mut m = Mocks::default();
        m.users.expect_get_by_id().with(eq(3)).returning(|_| Ok(stored_user()));
        m.users.expect_update().times(1).returning(|_| Ok(()));
        m.stats
            .expect_apply_delta()
            .with(eq(StatisticBucket::RoleAdmin), eq(-1))
            .times(1)
            .returning(|_, _| Ok(()));
        m.stats
            .expect_apply_delta()
            .with(eq(StatisticBucket::RoleUser), eq(1))
            .times(1)
            .returning(|_, _| Ok(()));

        let mut changed = stored_user();
        changed.role = "user".to_string();
        changed.name = "Neo".to_string();

        let stored = m.into_service().update_profile(&changed).unwrap();
        assert_eq!(stored.age_bucket, Some(StatisticBucket::Age31To50));
    }

    #[test]
    fn test_update_profile_records_aging_into_next_bracket() {
        let mut m = Mocks::default();
        m.users.expect_get_by_id().returning(|_| Ok(teenager()));
        m.stats
            .expect_apply_delta()
            .with(eq(StatisticBucket::Age0To18), eq(-1))
            .times(1)
            .returning(|_, _| Ok(()));
        m.stats
            .expect_apply_delta()
            .with(eq(StatisticBucket::Age19To30), eq(1))
            .times(1)
            .returning(|_, _| Ok(()));
        m.users
            .expect_update()
            .withf(|u: &User| u.age_bucket == Some(StatisticBucket::Age19To30))
            .times(1)
            .returning(|_| Ok(()));

        let svc = m.into_service().with_today(midsummer_2025);
        let stored = svc.update_profile(&teenager()).unwrap();
        assert_eq!(stored.age_bucket, Some(StatisticBucket::Age19To30));
    }

    #[test]
    fn test_update_profile_keeps_user_when_counter_rejects() {
        let mut m = Mocks::default();
        m.users.expect_get_by_id().returning(|_| Ok(stored_user()));
        m.stats
            .expect_apply_delta()
            .with(eq(StatisticBucket::RoleAdmin), eq(-1))
            .returning(negative);
        m.users.expect_update().never();

        let mut changed = stored_user();
        changed.role = "user".to_string();

        let err = m.into_service().update_profile(&changed).unwrap_err();
        assert!(matches!(err, AppError::InvalidModel(DomainError::NegativeCounter { .. })));
    }

    #[test]
    fn test_remove_cascades_and_decrements() {
        let mut m = Mocks::default();
        let mut seq = Sequence::new();
        m.users.expect_get_by_id().returning(|_| Ok(stored_user()));
        m.stats
            .expect_apply_delta()
            .withf(|_, delta| *delta == -1)
            .times(3)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        m.serial_users
            .expect_delete_by_user()
            .with(eq(3))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        m.serial_favourites
            .expect_delete_by_favourite()
            .with(eq(9))
            .times(1)
            .returning(|_| Ok(()));
        m.comments
            .expect_delete_by_user()
            .with(eq(3))
            .times(1)
            .returning(|_| Ok(()));
        m.favourites.expect_delete().with(eq(9)).times(1).returning(|_| Ok(()));
        m.users.expect_delete().with(eq(3)).times(1).returning(|_| Ok(()));

        assert!(m.into_service().remove(3).unwrap());
    }

    #[test]
    fn test_remove_decrements_bracket_counted_at_registration() {
        let mut m = Mocks::default();
        m.users.expect_get_by_id().returning(|_| Ok(teenager()));
        m.stats
            .expect_apply_delta()
            .with(eq(StatisticBucket::Age0To18), eq(-1))
            .times(1)
            .returning(|_, _| Ok(()));
        m.stats
            .expect_apply_delta()
            .with(eq(StatisticBucket::Age19To30), eq(-1))
            .never();
        m.stats
            .expect_apply_delta()
            .withf(|bucket, delta| !bucket.is_age() && *delta == -1)
            .times(2)
            .returning(|_, _| Ok(()));
        m.serial_users.expect_delete_by_user().returning(|_| Ok(()));
        m.serial_favourites.expect_delete_by_favourite().returning(|_| Ok(()));
        m.comments.expect_delete_by_user().returning(|_| Ok(()));
        m.favourites.expect_delete().returning(|_| Ok(()));
        m.users.expect_delete().times(1).returning(|_| Ok(()));

        let svc = m.into_service().with_today(midsummer_2025);
        assert!(svc.remove(3).unwrap());
    }

    #[test]
    fn test_rejected_decrement_leaves_user_in_place() {
        let mut m = Mocks::default();
        m.users.expect_get_by_id().returning(|_| Ok(stored_user()));
        m.stats
            .expect_apply_delta()
            .with(eq(StatisticBucket::GenderMale), eq(-1))
            .times(1)
            .returning(|_, _| Ok(()));
        m.stats
            .expect_apply_delta()
            .with(eq(StatisticBucket::RoleAdmin), eq(-1))
            .times(1)
            .returning(negative);
        m.stats
            .expect_apply_delta()
            .with(eq(StatisticBucket::GenderMale), eq(1))
            .times(1)
            .returning(|_, _| Ok(()));
        m.serial_users.expect_delete_by_user().never();
        m.serial_favourites.expect_delete_by_favourite().never();
        m.comments.expect_delete_by_user().never();
        m.favourites.expect_delete().never();
        m.users.expect_delete().never();

        let err = m.into_service().remove(3).unwrap_err();
        assert!(matches!(err, AppError::InvalidModel(DomainError::NegativeCounter { .. })));
    }

    #[test]
    fn test_failed_delete_restores_counters() {
        let mut m = Mocks::default();
        m.users.expect_get_by_id().returning(|_| Ok(stored_user()));
        m.stats
            .expect_apply_delta()
            .withf(|_, delta| *delta == -1)
            .times(3)
            .returning(|_, _| Ok(()));
        m.stats
            .expect_apply_delta()
            .withf(|_, delta| *delta == 1)
            .times(3)
            .returning(|_, _| Ok(()));
        m.serial_users
            .expect_delete_by_user()
            .returning(|_| Err(AppError::Timeout("busy".to_string())));
        m.users.expect_delete().never();

        let err = m.into_service().remove(3).unwrap_err();
        assert!(matches!(err, AppError::Timeout(_)));
    }

    #[test]
    fn test_remove_missing_user_is_noop() {
        let mut m = Mocks::default();
        m.users
            .expect_get_by_id()
            .returning(|id| Err(AppError::not_found("user", id)));
        m.users.expect_delete().never();
        m.stats.expect_apply_delta().never();

        assert!(!m.into_service().remove(42).unwrap());
    }

    #[test]
    fn test_add_favourite_bumps_counter_once() {
        let mut m = Mocks::default();
        m.users.expect_get_by_id().returning(|_| Ok(stored_user()));
        m.serials
            .expect_get_by_id()
            .returning(|id| Ok(Serial { id, ..Serial::new(1, "Lost", 2004) }));
        m.serial_favourites
            .expect_exists()
            .with(eq(5), eq(9))
            .returning(|_, _| Ok(false));
        m.serial_favourites
            .expect_create()
            .withf(|link: &SerialFavourite| link.serial_id == 5 && link.favourite_id == 9)
            .times(1)
            .returning(|_| Ok(1));
        m.favourites
            .expect_get_by_id()
            .returning(|id| Ok(Favourite { id, cnt_serials: 2 }));
        m.favourites
            .expect_update()
            .withf(|f: &Favourite| f.cnt_serials == 3)
            .times(1)
            .returning(|_| Ok(()));

        assert!(m.into_service().add_favourite(3, 5).unwrap());
    }

    #[test]
    fn test_add_favourite_twice_is_noop() {
        let mut m = Mocks::default();
        m.users.expect_get_by_id().returning(|_| Ok(stored_user()));
        m.serials
            .expect_get_by_id()
            .returning(|id| Ok(Serial { id, ..Serial::new(1, "Lost", 2004) }));
        m.serial_favourites.expect_exists().returning(|_, _| Ok(true));
        m.serial_favourites.expect_create().never();
        m.favourites.expect_update().never();

        assert!(!m.into_service().add_favourite(3, 5).unwrap());
    }

    #[test]
    fn test_remove_favourite_decrements_counter() {
        let mut m = Mocks::default();
        m.users.expect_get_by_id().returning(|_| Ok(stored_user()));
        m.serial_favourites
            .expect_delete_by_pair()
            .with(eq(9), eq(5))
            .returning(|_, _| Ok(1));
        m.favourites
            .expect_get_by_id()
            .returning(|id| Ok(Favourite { id, cnt_serials: 1 }));
        m.favourites
            .expect_update()
            .withf(|f: &Favourite| f.cnt_serials == 0)
            .times(1)
            .returning(|_| Ok(()));

        assert!(m.into_service().remove_favourite(3, 5).unwrap());
    }

    #[test]
    fn test_record_watch_updates_existing_link() {
        let seen = CatalogDate::from_ymd(2024, 2, 29).unwrap();
        let mut m = Mocks::default();
        m.serial_users.expect_get_by_pair().with(eq(5), eq(3)).returning(|s, u| {
            Ok(SerialUser {
                id: 11,
                ..SerialUser::new(s, u, CatalogDate::from_ymd(2024, 1, 1).unwrap())
            })
        });
        m.serial_users
            .expect_update()
            .withf(move |link: &SerialUser| link.id == 11 && link.last_seen == seen)
            .times(1)
            .returning(|_| Ok(()));
        m.serial_users.expect_create().never();

        assert_eq!(m.into_service().record_watch(3, 5, seen).unwrap(), 11);
    }

    #[test]
    fn test_record_watch_creates_missing_link() {
        let seen = CatalogDate::from_ymd(2024, 2, 29).unwrap();
        let mut m = Mocks::default();
        m.serial_users
            .expect_get_by_pair()
            .returning(|_, _| Err(AppError::not_found("serial_user", "5/3")));
        m.serial_users.expect_create().times(1).returning(|_| Ok(12));

        assert_eq!(m.into_service().record_watch(3, 5, seen).unwrap(), 12);
    }
}
