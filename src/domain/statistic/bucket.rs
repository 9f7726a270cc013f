use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::CatalogDate;

/// One demographic counter of the Statistic record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatisticBucket {
    GenderMale,
    GenderFemale,
    RoleUser,
    RoleAdmin,
    Age0To18,
    Age19To30,
    Age31To50,
    Age51To100,
}

impl StatisticBucket {
    pub const ALL: [StatisticBucket; 8] = [
        StatisticBucket::GenderMale,
        StatisticBucket::GenderFemale,
        StatisticBucket::RoleUser,
        StatisticBucket::RoleAdmin,
        StatisticBucket::Age0To18,
        StatisticBucket::Age19To30,
        StatisticBucket::Age31To50,
        StatisticBucket::Age51To100,
    ];

    /// Stored field name, identical on both backends.
    pub fn column(&self) -> &'static str {
        match self {
            StatisticBucket::GenderMale => "st_gender_male",
            StatisticBucket::GenderFemale => "st_gender_female",
            StatisticBucket::RoleUser => "st_role_user",
            StatisticBucket::RoleAdmin => "st_role_admin",
            StatisticBucket::Age0To18 => "st_age_0_18",
            StatisticBucket::Age19To30 => "st_age_19_30",
            StatisticBucket::Age31To50 => "st_age_31_50",
            StatisticBucket::Age51To100 => "st_age_51_100",
        }
    }

    /// Inverse of [`StatisticBucket::column`].
    pub fn from_column(column: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|bucket| bucket.column() == column)
    }

    pub fn is_age(&self) -> bool {
        matches!(
            self,
            StatisticBucket::Age0To18
                | StatisticBucket::Age19To30
                | StatisticBucket::Age31To50
                | StatisticBucket::Age51To100
        )
    }

    pub fn for_gender(gender: &str) -> Option<Self> {
        match gender.trim().to_lowercase().as_str() {
            "male" | "m" => Some(StatisticBucket::GenderMale),
            "female" | "f" => Some(StatisticBucket::GenderFemale),
            _ => None,
        }
    }

    pub fn for_role(role: &str) -> Option<Self> {
        match role.trim().to_lowercase().as_str() {
            "user" => Some(StatisticBucket::RoleUser),
            "admin" => Some(StatisticBucket::RoleAdmin),
            _ => None,
        }
    }

    pub fn for_age(age: i32) -> Option<Self> {
        match age {
            0..=18 => Some(StatisticBucket::Age0To18),
            19..=30 => Some(StatisticBucket::Age19To30),
            31..=50 => Some(StatisticBucket::Age31To50),
            51..=100 => Some(StatisticBucket::Age51To100),
            _ => None,
        }
    }

    pub fn for_birth_date(bdate: CatalogDate, today: NaiveDate) -> Option<Self> {
        Self::for_age(bdate.years_until(today))
    }
}

impl fmt::Display for StatisticBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}
