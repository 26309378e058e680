use std::{collections::BTreeMap, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::units::{FoodType, ServingUnit};

/// Nutrient amounts. On a food this is the per-100 basis (100 g or 100 ml);
/// scaled copies describe a concrete serving.
///
/// Optional nutrients stay `None` when unknown. `None` and `Some(0.0)` are
/// different facts and are kept apart through scaling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrients {
    pub calories: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiber: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugar: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturated_fat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cholesterol: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sodium: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub potassium: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calcium: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iron: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vitamin_a: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vitamin_c: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vitamin_d: Option<f64>,
}

/// Applies `$apply` to every optional nutrient field of `$src`, writing into `$dst`.
macro_rules! each_optional_nutrient {
    ($dst:ident, $src:expr, $apply:expr) => {
        $dst.protein = $src.protein.map($apply);
        $dst.carbs = $src.carbs.map($apply);
        $dst.fat = $src.fat.map($apply);
        $dst.fiber = $src.fiber.map($apply);
        $dst.sugar = $src.sugar.map($apply);
        $dst.saturated_fat = $src.saturated_fat.map($apply);
        $dst.cholesterol = $src.cholesterol.map($apply);
        $dst.sodium = $src.sodium.map($apply);
        $dst.potassium = $src.potassium.map($apply);
        $dst.calcium = $src.calcium.map($apply);
        $dst.iron = $src.iron.map($apply);
        $dst.vitamin_a = $src.vitamin_a.map($apply);
        $dst.vitamin_c = $src.vitamin_c.map($apply);
        $dst.vitamin_d = $src.vitamin_d.map($apply);
    };
}
pub(crate) use each_optional_nutrient;

impl Nutrients {
    /// Name/value pairs of every present optional nutrient, for validation.
    pub fn present_optional(&self) -> Vec<(&'static str, f64)> {
        [
            ("protein", self.protein),
            ("carbs", self.carbs),
            ("fat", self.fat),
            ("fiber", self.fiber),
            ("sugar", self.sugar),
            ("saturated_fat", self.saturated_fat),
            ("cholesterol", self.cholesterol),
            ("sodium", self.sodium),
            ("potassium", self.potassium),
            ("calcium", self.calcium),
            ("iron", self.iron),
            ("vitamin_a", self.vitamin_a),
            ("vitamin_c", self.vitamin_c),
            ("vitamin_d", self.vitamin_d),
        ]
        .into_iter()
        .filter_map(|(name, v)| v.map(|v| (name, v)))
        .collect()
    }
}

/// Per-food overrides of fuzzy units, in base units per one unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomConversions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cup: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "tablespoon")]
    pub tbsp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "teaspoon")]
    pub tsp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fist: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub piece: Option<f64>,
}

impl CustomConversions {
    pub fn get(&self, unit: ServingUnit) -> Option<f64> {
        match unit {
            ServingUnit::Cup => self.cup,
            ServingUnit::Tbsp => self.tbsp,
            ServingUnit::Tsp => self.tsp,
            ServingUnit::Plate => self.plate,
            ServingUnit::Fist => self.fist,
            ServingUnit::Piece => self.piece,
            ServingUnit::G | ServingUnit::Ml | ServingUnit::L => None,
        }
    }

    pub fn entries(&self) -> Vec<(ServingUnit, f64)> {
        ServingUnit::ALL
            .iter()
            .filter_map(|&u| self.get(u).map(|v| (u, v)))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FoodCategory {
    Fruits,
    Vegetables,
    Grains,
    Proteins,
    Dairy,
    Beverages,
    Snacks,
    Condiments,
    ProteinSupplements,
    Other,
}

impl FoodCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            FoodCategory::Fruits => "fruits",
            FoodCategory::Vegetables => "vegetables",
            FoodCategory::Grains => "grains",
            FoodCategory::Proteins => "proteins",
            FoodCategory::Dairy => "dairy",
            FoodCategory::Beverages => "beverages",
            FoodCategory::Snacks => "snacks",
            FoodCategory::Condiments => "condiments",
            FoodCategory::ProteinSupplements => "protein_supplements",
            FoodCategory::Other => "other",
        }
    }
}

impl FromStr for FoodCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let category = match s {
            "fruits" => FoodCategory::Fruits,
            "vegetables" => FoodCategory::Vegetables,
            "grains" => FoodCategory::Grains,
            "proteins" => FoodCategory::Proteins,
            "dairy" => FoodCategory::Dairy,
            "beverages" => FoodCategory::Beverages,
            "snacks" => FoodCategory::Snacks,
            "condiments" => FoodCategory::Condiments,
            "protein_supplements" => FoodCategory::ProteinSupplements,
            "other" => FoodCategory::Other,
            other => return Err(format!("unknown food category '{other}'")),
        };
        Ok(category)
    }
}

/// A nutritional reference entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub id: Uuid,
    pub name_en: String,
    /// Localized display names keyed by language code.
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

impl Food {
    /// Whether `unit` is listed for this food. Foods without a list accept any unit.
    pub fn lists_unit(&self, unit: ServingUnit) -> bool {
        self.available_units
            .as_ref()
            .map_or(true, |units| units.contains(&unit))
    }
}

/// Function a food plays inside a meal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FoodRole {
    ProteinPrimary,
    ProteinSecondary,
    CarbPrimary,
    CarbSecondary,
    Vegetable,
    FatSource,
    Sauce,
    Garnish,
    Filler,
}

/// One composed food of a meal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealFoodEntry {
    pub food_id: Uuid,
    pub base_portion_grams: f64,
    pub role: FoodRole,
    /// Discrete portions (grams) a consumer may pick instead of the base portion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portion_options: Option<Vec<f64>>,
}

/// The four nutrition fields a meal tracks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseNutrition {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}
