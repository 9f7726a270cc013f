use serde::{Deserialize, Serialize};

use super::bucket::StatisticBucket;
use crate::domain::rules::{ensure_id, ensure_non_negative};
use crate::domain::{DomainError, DomainResult, EntityId, Validate};

/// Identifier of the singleton record.
pub const STATISTIC_ID: EntityId = 1;

/// Demographic counters over all users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistic {
    pub id: EntityId,
    pub gender_male: i64,
    pub gender_female: i64,
    pub role_user: i64,
    pub role_admin: i64,
    pub age_0_18: i64,
    pub age_19_30: i64,
    pub age_31_50: i64,
    pub age_51_100: i64,
}

impl Default for Statistic {
    fn default() -> Self {
        Self {
            id: STATISTIC_ID,
            gender_male: 0,
            gender_female: 0,
            role_user: 0,
            role_admin: 0,
            age_0_18: 0,
            age_19_30: 0,
            age_31_50: 0,
            age_51_100: 0,
        }
    }
}

impl Statistic {
    pub fn counter(&self, bucket: StatisticBucket) -> i64 {
        match bucket {
            StatisticBucket::GenderMale => self.gender_male,
            StatisticBucket::GenderFemale => self.gender_female,
            StatisticBucket::RoleUser => self.role_user,
            StatisticBucket::RoleAdmin => self.role_admin,
            StatisticBucket::Age0To18 => self.age_0_18,
            StatisticBucket::Age19To30 => self.age_19_30,
            StatisticBucket::Age31To50 => self.age_31_50,
            StatisticBucket::Age51To100 => self.age_51_100,
        }
    }

    fn counter_mut(&mut self, bucket: StatisticBucket) -> &mut i64 {
        match bucket {
            StatisticBucket::GenderMale => &mut self.gender_male,
            StatisticBucket::GenderFemale => &mut self.gender_female,
            StatisticBucket::RoleUser => &mut self.role_user,
            StatisticBucket::RoleAdmin => &mut self.role_admin,
            StatisticBucket::Age0To18 => &mut self.age_0_18,
            StatisticBucket::Age19To30 => &mut self.age_19_30,
            StatisticBucket::Age31To50 => &mut self.age_31_50,
            StatisticBucket::Age51To100 => &mut self.age_51_100,
        }
    }

    /// Adds `delta` to one counter, refusing to go below zero.
    pub fn apply(&mut self, bucket: StatisticBucket, delta: i64) -> DomainResult<()> {
        let counter = self.counter_mut(bucket);
        let value = *counter + delta;
        if value < 0 {
            return Err(DomainError::NegativeCounter {
                bucket: bucket.to_string(),
                value,
            });
        }
        *counter = value;
        Ok(())
    }
}

impl Validate for Statistic {
    const ENTITY: &'static str = "statistic";

    fn id(&self) -> EntityId {
        self.id
    }

    /// The id is required even for the initial write.
    fn validate(&self) -> DomainResult<()> {
        ensure_id(Self::ENTITY, "id", self.id)?;
        for bucket in StatisticBucket::ALL {
            ensure_non_negative(Self::ENTITY, bucket.column(), self.counter(bucket))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_singleton() {
        let stat = Statistic::default();
        assert_eq!(stat.id, STATISTIC_ID);
        assert!(stat.is_valid());
    }

    #[test]
    fn test_zero_id_is_invalid() {
        let stat = Statistic {
            id: 0,
            ..Statistic::default()
        };
        assert!(!stat.is_valid());
    }

    #[test]
    fn test_apply_increments_and_decrements() {
        let mut stat = Statistic::default();
        stat.apply(StatisticBucket::RoleAdmin, 2).unwrap();
        stat.apply(StatisticBucket::RoleAdmin, -1).unwrap();
        assert_eq!(stat.role_admin, 1);
    }

    #[test]
    fn test_apply_refuses_negative() {
        let mut stat = Statistic::default();
        let err = stat.apply(StatisticBucket::Age0To18, -1).unwrap_err();
        assert!(matches!(err, DomainError::NegativeCounter { value: -1, .. }));
        assert_eq!(stat.age_0_18, 0);
    }
}
