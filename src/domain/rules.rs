// src/domain/rules.rs
//
// Field rules shared by every entity's validation.

use super::{DomainError, DomainResult, EntityId};

/// Identifiers and references must be positive.
pub fn ensure_id(entity: &str, field: &str, value: EntityId) -> DomainResult<()> {
    if value <= 0 {
        return Err(DomainError::InvariantViolation(format!(
            "{}.{} must be positive, got {}",
            entity, field, value
        )));
    }
    Ok(())
}

pub fn ensure_non_negative<T>(entity: &str, field: &str, value: T) -> DomainResult<()>
where
    T: PartialOrd + Default + std::fmt::Display,
{
    if value < T::default() {
        return Err(DomainError::InvariantViolation(format!(
            "{}.{} cannot be negative, got {}",
            entity, field, value
        )));
    }
    Ok(())
}

pub fn ensure_not_blank(entity: &str, field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::InvariantViolation(format!(
            "{}.{} cannot be empty",
            entity, field
        )));
    }
    Ok(())
}
