use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::Meal;
use crate::nutrition::{BaseNutrition, MealFoodEntry};

/// Body of `POST /meals`, `PUT /meals/:id` and `POST /meals/preview`.
///
/// Base nutrition is not part of the payload; it is always derived.
#[derive(Debug, Clone, Deserialize)]
pub struct MealPayload {
    pub name_en: String,
    #[serde(default)]
    pub names: BTreeMap<String, String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub cuisine: Option<String>,
    pub foods: Vec<MealFoodEntry>,
    #[serde(default = "default_min_scale")]
    pub min_scale: f64,
    #[serde(default = "default_max_scale")]
    pub max_scale: f64,
}
fn default_min_scale() -> f64 { 0.5 }
fn default_max_scale() -> f64 { 2.5 }

#[derive(Debug, Serialize)]
pub struct MealResponse {
    #[serde(flatten)]
    pub meal: Meal,
    /// Food ids that no longer exist; they contributed nothing to `base_nutrition`.
    pub unresolved_food_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct MealPreviewResponse {
    pub base_nutrition: BaseNutrition,
    pub unresolved_food_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}
fn default_limit() -> i64 { 20 }

#[derive(Debug, Deserialize)]
pub struct ScaleQuery {
    #[serde(default = "default_scale")]
    pub scale: f64,
}
fn default_scale() -> f64 { 1.0 }

#[derive(Debug, Serialize)]
pub struct ScaledMealNutrition {
    pub meal_id: Uuid,
    pub scale: f64,
    pub nutrition: BaseNutrition,
    pub unresolved_food_ids: Vec<Uuid>,
}
