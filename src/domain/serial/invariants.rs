use super::entity::Serial;
use crate::domain::rules::{ensure_id, ensure_non_negative, ensure_not_blank};
use crate::domain::{DomainResult, EntityId, Validate};

/// Validates all Serial field rules
pub fn validate_serial(serial: &Serial) -> DomainResult<()> {
    ensure_id("serial", "producer_id", serial.producer_id)?;
    ensure_not_blank("serial", "name", &serial.name)?;
    ensure_non_negative("serial", "year", serial.year)?;
    ensure_non_negative("serial", "rating", serial.rating)?;
    ensure_non_negative("serial", "seasons", serial.seasons)?;
    ensure_non_negative("serial", "duration", serial.duration)?;
    Ok(())
}

impl Validate for Serial {
    const ENTITY: &'static str = "serial";

    fn id(&self) -> EntityId {
        self.id
    }

    fn validate(&self) -> DomainResult<()> {
        validate_serial(self)
    }
}
