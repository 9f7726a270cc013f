use serde::{Deserialize, Serialize};

use crate::domain::{CatalogDate, EntityId, StatisticBucket};

/// A catalog account.
/// `login` is the natural key; every user owns exactly one Favourite.
/// `age_bucket` is the age bracket the user is counted in, fixed when the
/// bracket was last evaluated; `None` when the age fit no bracket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: EntityId,
    pub login: String,
    pub password: String,
    pub role: String,
    pub name: String,
    pub surname: String,
    pub gender: String,
    pub bdate: CatalogDate,
    pub favourites_id: EntityId,
    #[serde(default)]
    pub age_bucket: Option<StatisticBucket>,
}
