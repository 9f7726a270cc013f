use super::entity::User;
use crate::domain::rules::{ensure_id, ensure_not_blank};
use crate::domain::{DomainError, DomainResult, EntityId, Validate};

pub fn validate_user(user: &User) -> DomainResult<()> {
    ensure_not_blank("user", "login", &user.login)?;
    ensure_not_blank("user", "password", &user.password)?;
    ensure_not_blank("user", "role", &user.role)?;
    ensure_not_blank("user", "name", &user.name)?;
    ensure_not_blank("user", "gender", &user.gender)?;
    ensure_id("user", "favourites_id", user.favourites_id)?;
    if let Some(bucket) = user.age_bucket.filter(|b| !b.is_age()) {
        return Err(DomainError::InvariantViolation(format!(
            "user: age_bucket {} is not an age bracket",
            bucket
        )));
    }
    Ok(())
}

impl Validate for User {
    const ENTITY: &'static str = "user";

    fn id(&self) -> EntityId {
        self.id
    }

    fn validate(&self) -> DomainResult<()> {
        validate_user(self)
    }
}
