//! Statistic Invariants:
//!
//! 1. Exactly one record exists, with id 1
//! 2. Every counter is non-negative
//! 3. Updates replace every counter at once; increments go through buckets

pub mod bucket;
pub mod entity;

pub use bucket::StatisticBucket;
pub use entity::{Statistic, STATISTIC_ID};
