// src/services/aggregate_service.rs
//
// Derived state: serial durations and the Statistic counters.

use std::sync::Arc;

use crate::domain::{DurationTotal, Serial, Statistic, StatisticBucket};
use crate::error::{AppError, AppResult};
use crate::repositories::{SerialRepository, StatisticRepository};

pub struct AggregateService {
    serial_repo: Arc<dyn SerialRepository>,
    statistic_repo: Arc<dyn StatisticRepository>,
}

impl AggregateService {
    pub fn new(
        serial_repo: Arc<dyn SerialRepository>,
        statistic_repo: Arc<dyn StatisticRepository>,
    ) -> Self {
        Self {
            serial_repo,
            statistic_repo,
        }
    }

    /// Recomputes `serial.duration` from its episodes and persists the serial.
    ///
    /// Fails with `NoData` when the serial has no episodes at all; the
    /// serial is left untouched in that case.
    pub fn calculate_duration(&self, serial: &mut Serial) -> AppResult<DurationTotal> {
        let total = self.serial_repo.episode_duration_total(serial.id)?;

        if total.episodes == 0 {
            log::warn!("serial {}: no episodes to roll up", serial.id);
            return Err(AppError::NoData(format!("serial {} has no episodes", serial.id)));
        }

        serial.duration = total.minutes;
        self.serial_repo.update(serial)?;

        log::info!(
            "serial {}: duration {} min over {} episodes",
            serial.id,
            total.minutes,
            total.episodes
        );
        Ok(total)
    }

    pub fn read_statistic(&self) -> AppResult<Statistic> {
        self.statistic_repo.get()
    }

    /// Whole replacement of every counter.
    pub fn write_statistic(&self, statistic: &Statistic) -> AppResult<()> {
        self.statistic_repo.update(statistic)
    }

    pub fn apply_delta(&self, bucket: StatisticBucket, delta: i64) -> AppResult<()> {
        if delta == 0 {
            return Ok(());
        }
        self.statistic_repo.apply_delta(bucket, delta)
    }

    pub fn increment(&self, bucket: StatisticBucket) -> AppResult<()> {
        self.apply_delta(bucket, 1)
    }

    pub fn decrement(&self, bucket: StatisticBucket) -> AppResult<()> {
        self.apply_delta(bucket, -1)
    }

    /// Applies every delta or none of them: when one is rejected, the ones
    /// already applied are reverted before the error is returned.
    pub fn apply_deltas(&self, deltas: &[(StatisticBucket, i64)]) -> AppResult<()> {
        for (done, &(bucket, delta)) in deltas.iter().enumerate() {
            if let Err(e) = self.apply_delta(bucket, delta) {
                self.revert(&deltas[..done]);
                return Err(e);
            }
        }
        Ok(())
    }

    /// Undoes deltas that were applied, newest first. Failures are logged.
    pub fn revert(&self, deltas: &[(StatisticBucket, i64)]) {
        for &(bucket, delta) in deltas.iter().rev() {
            if let Err(e) = self.apply_delta(bucket, -delta) {
                log::error!("statistic: could not revert {} by {}: {}", bucket, -delta, e);
            }
        }
    }
}
