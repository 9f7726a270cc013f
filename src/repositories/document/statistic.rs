// src/repositories/document/statistic.rs

use serde_json::json;

use super::{into_document, DocReader};
use crate::docstore::collections::STATISTIC;
use crate::docstore::{Document, DocumentHandle, Filter, Update};
use crate::domain::{DomainError, Statistic, StatisticBucket, STATISTIC_ID};
use crate::error::{AppError, AppResult};
use crate::repositories::{check_persisted, StatisticRepository};

const ID: &str = "st_id";

pub struct DocumentStatisticRepository {
    store: DocumentHandle,
}

impl DocumentStatisticRepository {
    pub fn new(store: DocumentHandle) -> Self {
        Self { store }
    }

    fn to_document(statistic: &Statistic) -> Document {
        into_document(json!({
            ID: statistic.id,
            "st_gender_male": statistic.gender_male,
            "st_gender_female": statistic.gender_female,
            "st_role_user": statistic.role_user,
            "st_role_admin": statistic.role_admin,
            "st_age_0_18": statistic.age_0_18,
            "st_age_19_30": statistic.age_19_30,
            "st_age_31_50": statistic.age_31_50,
            "st_age_51_100": statistic.age_51_100,
        }))
    }

    fn from_document(doc: &Document) -> AppResult<Statistic> {
        let r = DocReader::new(STATISTIC, doc);
        Ok(Statistic {
            id: r.i64(ID)?,
            gender_male: r.i64("st_gender_male")?,
            gender_female: r.i64("st_gender_female")?,
            role_user: r.i64("st_role_user")?,
            role_admin: r.i64("st_role_admin")?,
            age_0_18: r.i64("st_age_0_18")?,
            age_19_30: r.i64("st_age_19_30")?,
            age_31_50: r.i64("st_age_31_50")?,
            age_51_100: r.i64("st_age_51_100")?,
        })
    }
}

impl StatisticRepository for DocumentStatisticRepository {
    fn get(&self) -> AppResult<Statistic> {
        log::info!("statistic: get");
        match self.store.find_one(STATISTIC, &Filter::eq(ID, STATISTIC_ID))? {
            Some(doc) => Self::from_document(&doc),
            None => Err(AppError::not_found("statistic", STATISTIC_ID)),
        }
    }

    fn update(&self, statistic: &Statistic) -> AppResult<()> {
        check_persisted(statistic)?;
        self.store.replace_one(
            STATISTIC,
            &Filter::eq(ID, statistic.id),
            Self::to_document(statistic),
        )?;
        log::info!("statistic: replaced");
        Ok(())
    }

    fn apply_delta(&self, bucket: StatisticBucket, delta: i64) -> AppResult<()> {
        let column = bucket.column();
        let guard = Filter::and(vec![Filter::eq(ID, STATISTIC_ID), Filter::gte(column, -delta)]);

        let matched = self
            .store
            .update_one(STATISTIC, &guard, &Update::Inc(column.to_string(), delta))?;

        if matched == 0 {
            let current = self.get()?;
            log::warn!("statistic: refused {} {:+}", bucket, delta);
            return Err(DomainError::NegativeCounter {
                bucket: bucket.to_string(),
                value: current.counter(bucket) + delta,
            }
            .into());
        }

        log::info!("statistic: {} {:+}", bucket, delta);
        Ok(())
    }
}
