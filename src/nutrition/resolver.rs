use serde::Serialize;

use super::{
    error::ConversionError,
    model::Food,
    tables::{generic_default, keyword_match},
    units::ServingUnit,
};

/// Size of the nutrition basis, in base units.
pub const NUTRITION_BASIS: f64 = 100.0;

/// Which tier produced a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "tier", content = "keyword", rename_all = "snake_case")]
pub enum ConversionSource {
    Exact,
    Custom,
    Keyword(&'static str),
    Default,
}

/// A serving expressed in the food's base unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedServing {
    pub quantity: f64,
    pub unit: ServingUnit,
    /// Equivalent amount in `base_unit`.
    pub amount: f64,
    pub base_unit: ServingUnit,
    pub source: ConversionSource,
}

impl ResolvedServing {
    /// Multiplier against the per-100 nutrition basis.
    pub fn ratio(&self) -> f64 {
        self.amount / NUTRITION_BASIS
    }
}

/// Base units per one `unit` of `food`.
///
/// Exact units never look anything up. Fuzzy units go through the per-food
/// override, then the keyword table, then the generic default.
pub fn amount_per_unit(
    food: &Food,
    unit: ServingUnit,
) -> Result<(f64, ConversionSource), ConversionError> {
    if let Some(factor) = unit.exact_factor() {
        return Ok((factor, ConversionSource::Exact));
    }

    if let Some(custom) = food.custom_conversions.get(unit) {
        return Ok((custom, ConversionSource::Custom));
    }

    if let Some((keyword, table)) = keyword_match(&food.name_en) {
        if let Some(amount) = table.get(unit) {
            return Ok((amount, ConversionSource::Keyword(keyword)));
        }
    }

    generic_default(unit, food.food_type)
        .map(|amount| (amount, ConversionSource::Default))
        .ok_or_else(|| ConversionError::UnitNotResolvable {
            unit,
            food: food.name_en.clone(),
        })
}

/// Converts `quantity` x `unit` of `food` into its base unit.
pub fn resolve_serving(
    food: &Food,
    quantity: f64,
    unit: ServingUnit,
) -> Result<ResolvedServing, ConversionError> {
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(ConversionError::InvalidQuantity(quantity));
    }

    let (per_unit, source) = amount_per_unit(food, unit)?;
    Ok(ResolvedServing {
        quantity,
        unit,
        amount: quantity * per_unit,
        base_unit: food.food_type.base_unit(),
        source,
    })
}
