use std::collections::BTreeMap;

use serde::Serialize;
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::nutrition::{BaseNutrition, MealFoodEntry};

#[derive(Debug, FromRow)]
pub struct MealRow {
    pub id: Uuid,
    pub name_en: String,
    pub names: Json<BTreeMap<String, String>>,
    pub tags: Json<Vec<String>>,
    pub cuisine: Option<String>,
    pub foods: Json<Vec<MealFoodEntry>>,
    pub base_calories: f64,
    pub base_protein: f64,
    pub base_carbs: f64,
    pub base_fat: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct Meal {
    pub id: Uuid,
    pub name_en: String,
    pub names: BTreeMap<String, String>,
    pub tags: Vec<String>,
    pub cuisine: Option<String>,
    pub foods: Vec<MealFoodEntry>,
    pub base_nutrition: BaseNutrition,
    pub min_scale: f64,
    pub max_scale: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<MealRow> for Meal {
    fn from(r: MealRow) -> Self {
        Self {
            id: r.id,
            name_en: r.name_en,
            names: r.names.0,
            tags: r.tags.0,
            cuisine: r.cuisine,
            foods: r.foods.0,
            base_nutrition: BaseNutrition {
                calories: r.base_calories,
                protein: r.base_protein,
                carbs: r.base_carbs,
                fat: r.base_fat,
            },
            min_scale: r.min_scale,
            max_scale: r.max_scale,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}
