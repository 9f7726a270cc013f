// src/repositories/statistic_repository.rs

use rusqlite::{params, Row};

use super::check_persisted;
use crate::db::RelationalHandle;
use crate::domain::{DomainError, Statistic, StatisticBucket, STATISTIC_ID};
use crate::error::{AppError, AppResult};

/// Access to the Statistic singleton.
#[cfg_attr(test, mockall::automock)]
pub trait StatisticRepository: Send + Sync {
    fn get(&self) -> AppResult<Statistic>;
    /// Replaces every counter at once.
    fn update(&self, statistic: &Statistic) -> AppResult<()>;
    /// Atomically adds `delta` to one counter. A result below zero is
    /// rejected and nothing is written.
    fn apply_delta(&self, bucket: StatisticBucket, delta: i64) -> AppResult<()>;
}

pub struct SqliteStatisticRepository {
    db: RelationalHandle,
}

impl SqliteStatisticRepository {
    pub fn new(db: RelationalHandle) -> Self {
        Self { db }
    }

    fn row_to_statistic(row: &Row) -> Result<Statistic, rusqlite::Error> {
        Ok(Statistic {
            id: row.get("st_id")?,
            gender_male: row.get("st_gender_male")?,
            gender_female: row.get("st_gender_female")?,
            role_user: row.get("st_role_user")?,
            role_admin: row.get("st_role_admin")?,
            age_0_18: row.get("st_age_0_18")?,
            age_19_30: row.get("st_age_19_30")?,
            age_31_50: row.get("st_age_31_50")?,
            age_51_100: row.get("st_age_51_100")?,
        })
    }
}

impl StatisticRepository for SqliteStatisticRepository {
    fn get(&self) -> AppResult<Statistic> {
        log::info!("statistic: get");
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare("SELECT * FROM statistic WHERE st_id = ?1")?;

        match stmt.query_row(params![STATISTIC_ID], Self::row_to_statistic) {
            Ok(statistic) => Ok(statistic),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                Err(AppError::not_found("statistic", STATISTIC_ID))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn update(&self, statistic: &Statistic) -> AppResult<()> {
        check_persisted(statistic)?;
        let conn = self.db.connection()?;

        conn.execute(
            "UPDATE statistic SET st_gender_male = ?2, st_gender_female = ?3, st_role_user = ?4,
                    st_role_admin = ?5, st_age_0_18 = ?6, st_age_19_30 = ?7, st_age_31_50 = ?8,
                    st_age_51_100 = ?9
             WHERE st_id = ?1",
            params![
                statistic.id,
                statistic.gender_male,
                statistic.gender_female,
                statistic.role_user,
                statistic.role_admin,
                statistic.age_0_18,
                statistic.age_19_30,
                statistic.age_31_50,
                statistic.age_51_100
            ],
        )?;

        log::info!("statistic: replaced");
        Ok(())
    }

    fn apply_delta(&self, bucket: StatisticBucket, delta: i64) -> AppResult<()> {
        let column = bucket.column();
        let conn = self.db.connection()?;

        let sql = format!(
            "UPDATE statistic SET {col} = {col} + ?2 WHERE st_id = ?1 AND {col} + ?2 >= 0",
            col = column
        );
        let changed = conn.execute(&sql, params![STATISTIC_ID, delta])?;

        if changed == 0 {
            let select = format!("SELECT {} FROM statistic WHERE st_id = ?1", column);
            let current: i64 = match conn.query_row(&select, params![STATISTIC_ID], |row| row.get(0)) {
                Ok(value) => value,
                Err(rusqlite::Error::QueryReturnedNoRows) => {
                    return Err(AppError::not_found("statistic", STATISTIC_ID))
                }
                Err(e) => return Err(e.into()),
            };
            log::warn!("statistic: refused {} {:+}", bucket, delta);
            return Err(DomainError::NegativeCounter {
                bucket: bucket.to_string(),
                value: current + delta,
            }
            .into());
        }

        log::info!("statistic: {} {:+}", bucket, delta);
        Ok(())
    }
}
