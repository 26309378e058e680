use tracing::debug;

use super::dto::{ServingRequest, ServingResponse};
use crate::error::ValidationError;
use crate::nutrition::{serving_nutrition, ConversionError, Food};

/// Checks a food before it is stored.
pub fn validate_food(food: &Food) -> Result<(), ValidationError> {
    if food.name_en.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }

    let basis = &food.nutrition_per_100;
    check_nutrient("calories", basis.calories)?;
    for (field, value) in basis.present_optional() {
        check_nutrient(field, value)?;
    }

    for (unit, value) in food.custom_conversions.entries() {
        if !value.is_finite() || value <= 0.0 {
            return Err(ValidationError::NonPositiveConversion { unit, value });
        }
    }
    Ok(())
}

fn check_nutrient(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::NegativeNutrient { field, value });
    }
    Ok(())
}

/// Nutrition of one serving of `food`.
pub fn serving_for(food: &Food, req: &ServingRequest) -> Result<ServingResponse, ConversionError> {
    let serving = req.to_serving()?;
    let result = serving_nutrition(food, serving.quantity, serving.unit)?;
    debug!(
        food_id = %food.id,
        unit = %serving.unit,
        amount = result.serving.amount,
        source = ?result.serving.source,
        "serving resolved"
    );
    Ok(ServingResponse {
        food_id: food.id,
        serving: result.serving,
        ratio: result.ratio,
        nutrients: result.nutrients,
        unit_listed: food.lists_unit(serving.unit),
    })
}
