use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::nutrition::{
    ConversionError, CustomConversions, Food, FoodCategory, FoodType, Nutrients, ResolvedServing,
    Serving, ServingUnit,
};

/// Body of `POST /foods` and `PUT /foods/:id`.
#[derive(Debug, Clone, Deserialize)]
pub struct FoodPayload {
    pub name_en: String,
    #[serde(default)]
    pub names: BTreeMap<String, String>,
    #[serde(default)]
    pub brand: Option<String>,
    pub category: FoodCategory,
    pub food_type: FoodType,
    pub nutrition_per_100: Nutrients,
    #[serde(default)]
    pub custom_conversions: CustomConversions,
    #[serde(default)]
    pub available_units: Option<Vec<ServingUnit>>,
}

impl FoodPayload {
    pub fn into_food(self, id: Uuid) -> Food {
        Food {
            id,
            name_en: self.name_en.trim().to_string(),
            names: self.names,
            brand: self.brand.filter(|b| !b.trim().is_empty()),
            category: self.category,
            food_type: self.food_type,
            nutrition_per_100: self.nutrition_per_100,
            custom_conversions: self.custom_conversions,
            available_units: self.available_units,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FoodListQuery {
    #[serde(default)]
    pub category: Option<FoodCategory>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}
fn default_limit() -> i64 { 20 }

/// A serving given either as `{quantity, unit}` or as text: `{serving: "1 cup"}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServingRequest {
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub serving: Option<String>,
}

impl ServingRequest {
    pub fn to_serving(&self) -> Result<Serving, ConversionError> {
        if let Some(text) = &self.serving {
            return text.parse();
        }
        match (self.quantity, self.unit.as_deref()) {
            (Some(quantity), Some(unit)) => Ok(Serving::new(quantity, unit.parse()?)),
            _ => Err(ConversionError::InvalidServing(
                "expected `serving` or both `quantity` and `unit`".into(),
            )),
        }
    }
}

/// Body of `POST /nutrition/preview`: an unsaved food and a serving.
#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub food: FoodPayload,
    #[serde(flatten)]
    pub serving: ServingRequest,
}

#[derive(Debug, Serialize)]
pub struct ServingResponse {
    pub food_id: Uuid,
    pub serving: ResolvedServing,
    pub ratio: f64,
    pub nutrients: Nutrients,
    /// False when the food restricts its units and this one is not among them.
    pub unit_listed: bool,
}

#[derive(Debug, Serialize)]
pub struct FoodUpdatedResponse {
    #[serde(flatten)]
    pub food: super::repo_types::FoodRecord,
    /// Meals whose base nutrition was recomputed after this change.
    pub meals_recomputed: usize,
}
