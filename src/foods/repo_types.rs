use std::collections::BTreeMap;

use anyhow::anyhow;
use serde::Serialize;
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::nutrition::{CustomConversions, Food, Nutrients, ServingUnit};

/// Food row as stored in the database.
#[derive(Debug, FromRow)]
pub struct FoodRow {
    pub id: Uuid,
    pub name_en: String,
    pub names: Json<BTreeMap<String, String>>,
    pub brand: Option<String>,
    pub category: String,
    pub food_type: String,
    pub nutrition_per_100: Json<Nutrients>,
    pub custom_conversions: Json<CustomConversions>,
    pub available_units: Option<Json<Vec<ServingUnit>>>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// A food together with its bookkeeping timestamps.
#[derive(Debug, Clone, Serialize)]
pub struct FoodRecord {
    #[serde(flatten)]
    pub food: Food,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl FoodRow {
    pub fn into_record(self) -> anyhow::Result<FoodRecord> {
        let food = Food {
            id: self.id,
            name_en: self.name_en,
            names: self.names.0,
            brand: self.brand,
            category: self.category.parse().map_err(|e: String| anyhow!(e))?,
            food_type: self.food_type.parse().map_err(|e: String| anyhow!(e))?,
            nutrition_per_100: self.nutrition_per_100.0,
            custom_conversions: self.custom_conversions.0,
            available_units: self.available_units.map(|u| u.0),
        };
        Ok(FoodRecord {
            food,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
