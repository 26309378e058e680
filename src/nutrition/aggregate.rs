use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use super::{
    error::ConversionError,
    model::{each_optional_nutrient, BaseNutrition, Food, MealFoodEntry, Nutrients},
    resolver::{resolve_serving, ResolvedServing, NUTRITION_BASIS},
    units::ServingUnit,
};

/// Rounds half away from zero to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Scales `value` (per 100 base units) by `ratio`.
///
/// Multiplies by the serving amount before dividing by the basis so decimal
/// half-way results such as 4.3 x 1.5 = 6.45 land on the value they are written as.
fn scale(value: f64, ratio: f64) -> f64 {
    value * (ratio * NUTRITION_BASIS) / NUTRITION_BASIS
}

/// Per-serving nutrients for `ratio` x the per-100 basis.
///
/// Calories come back as a whole number, every other present nutrient with at
/// most one decimal. Absent nutrients stay absent.
pub fn scale_nutrients(per_100: &Nutrients, ratio: f64) -> Nutrients {
    let mut out = Nutrients {
        calories: scale(per_100.calories, ratio).round(),
        ..Default::default()
    };
    each_optional_nutrient!(out, per_100, |v| round1(scale(v, ratio)));
    out
}

/// A resolved serving together with its nutrients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServingNutrition {
    pub serving: ResolvedServing,
    pub ratio: f64,
    pub nutrients: Nutrients,
}

/// Resolves `quantity` x `unit` of `food` and scales its nutrition.
pub fn serving_nutrition(
    food: &Food,
    quantity: f64,
    unit: ServingUnit,
) -> Result<ServingNutrition, ConversionError> {
    let serving = resolve_serving(food, quantity, unit)?;
    let ratio = serving.ratio();
    Ok(ServingNutrition {
        serving,
        ratio,
        nutrients: scale_nutrients(&food.nutrition_per_100, ratio),
    })
}

/// Result of summing a meal's foods.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MealAggregate {
    pub base: BaseNutrition,
    /// Entries whose food could not be found; they contribute nothing.
    pub unresolved_food_ids: Vec<Uuid>,
}

impl MealAggregate {
    pub fn is_complete(&self) -> bool {
        self.unresolved_food_ids.is_empty()
    }
}

/// Sums the base nutrition of a meal's entries.
///
/// Each entry contributes its food scaled by `base_portion_grams / 100`,
/// rounded like a single serving. Missing optional values count as zero in the
/// sum. Entries whose food `lookup` cannot find are skipped and reported.
pub fn aggregate_meal<'f, F>(entries: &[MealFoodEntry], lookup: F) -> MealAggregate
where
    F: Fn(&Uuid) -> Option<&'f Food>,
{
    let mut sum = BaseNutrition::default();
    let mut unresolved = Vec::new();

    for entry in entries {
        let Some(food) = lookup(&entry.food_id) else {
            if !unresolved.contains(&entry.food_id) {
                unresolved.push(entry.food_id);
            }
            continue;
        };

        let part = scale_nutrients(
            &food.nutrition_per_100,
            entry.base_portion_grams / NUTRITION_BASIS,
        );
        sum.calories += part.calories;
        sum.protein += part.protein.unwrap_or(0.0);
        sum.carbs += part.carbs.unwrap_or(0.0);
        sum.fat += part.fat.unwrap_or(0.0);
    }

    if !unresolved.is_empty() {
        debug!(missing = unresolved.len(), "meal references unknown foods");
    }

    MealAggregate {
        base: BaseNutrition {
            calories: sum.calories.round(),
            protein: round1(sum.protein),
            carbs: round1(sum.carbs),
            fat: round1(sum.fat),
        },
        unresolved_food_ids: unresolved,
    }
}

impl BaseNutrition {
    /// Multiplies the whole meal by `factor`, with the usual rounding.
    pub fn scaled(&self, factor: f64) -> BaseNutrition {
        BaseNutrition {
            calories: (self.calories * factor).round(),
            protein: round1(self.protein * factor),
            carbs: round1(self.carbs * factor),
            fat: round1(self.fat * factor),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::nutrition::{
        model::FoodRole,
        resolver::tests::food,
        units::FoodType,
    };

    fn entry(food_id: Uuid, grams: f64) -> MealFoodEntry {
        MealFoodEntry {
            food_id,
            base_portion_grams: grams,
            role: FoodRole::Filler,
            portion_options: None,
        }
    }

    fn decimals_at_most_one(v: f64) -> bool {
        (v * 10.0 - (v * 10.0).round()).abs() < 1e-9
    }

    #[test]
    fn scales_150_grams_of_rice() {
        let f = food("Cooked rice", FoodType::Solid);
        let s = serving_nutrition(&f, 150.0, ServingUnit::G).unwrap();
        assert_eq!(s.ratio, 1.5);
        assert_eq!(s.nutrients.calories, 308.0);
        assert_eq!(s.nutrients.protein, Some(6.5));
        assert_eq!(s.nutrients.carbs, Some(67.5));
        assert_eq!(s.nutrients.fat, Some(0.6));
    }

    #[test]
    fn one_cup_of_rice_uses_the_keyword_table() {
        let f = food("Cooked rice", FoodType::Solid);
        let s = serving_nutrition(&f, 1.0, ServingUnit::Cup).unwrap();
        assert_eq!(s.serving.amount, 185.0);
        assert_eq!(s.nutrients.calories, 379.0);
    }

    #[test]
    fn absent_nutrients_stay_absent_at_every_ratio() {
        let f = food("Cooked rice", FoodType::Solid);
        assert!(f.nutrition_per_100.sugar.is_none());
        for ratio in [0.0, 0.37, 1.0, 2.5, 40.0] {
            let n = scale_nutrients(&f.nutrition_per_100, ratio);
            assert_eq!(n.sugar, None);
            assert_eq!(n.fiber, None);
            assert!(n.protein.is_some());
        }
    }

    #[test]
    fn rounding_law_holds() {
        let per_100 = Nutrients {
            calories: 123.456,
            protein: Some(7.777),
            sodium: Some(0.333),
            vitamin_c: Some(51.05),
            ..Default::default()
        };
        for ratio in [0.01, 0.33, 1.0, 1.234, 3.7, 12.0] {
            let n = scale_nutrients(&per_100, ratio);
            assert_eq!(n.calories, n.calories.trunc());
            for (_, v) in n.present_optional() {
                assert!(decimals_at_most_one(v), "{v} has more than one decimal");
            }
        }
    }

    #[test]
    fn zero_ratio_zeroes_present_fields_only() {
        let f = food("Cooked rice", FoodType::Solid);
        let n = scale_nutrients(&f.nutrition_per_100, 0.0);
        assert_eq!(n.calories, 0.0);
        assert_eq!(n.protein, Some(0.0));
        assert_eq!(n.sugar, None);
    }

    #[test]
    fn sums_meal_contributions() {
        let a = food("Rice", FoodType::Solid);
        let mut b = food("Side dish", FoodType::Solid);
        b.nutrition_per_100 = Nutrients {
            calories: 100.0,
            protein: None,
            carbs: Some(10.0),
            fat: Some(5.0),
            ..Default::default()
        };
        let foods: HashMap<Uuid, Food> = [(a.id, a.clone()), (b.id, b.clone())].into();
        let entries = vec![entry(a.id, 100.0), entry(b.id, 50.0)];

        let agg = aggregate_meal(&entries, |id| foods.get(id));
        assert!(agg.is_complete());
        assert_eq!(agg.base.calories, 255.0);
        assert_eq!(agg.base.protein, 4.3);
        assert_eq!(agg.base.carbs, 50.0);
        assert_eq!(agg.base.fat, 2.9);
    }

    #[test]
    fn missing_foods_are_skipped_and_reported() {
        let a = food("Rice", FoodType::Solid);
        let gone = Uuid::new_v4();
        let foods: HashMap<Uuid, Food> = [(a.id, a.clone())].into();
        let entries = vec![entry(gone, 80.0), entry(a.id, 100.0), entry(gone, 20.0)];

        let agg = aggregate_meal(&entries, |id| foods.get(id));
        assert_eq!(agg.base.calories, 205.0);
        assert_eq!(agg.unresolved_food_ids, vec![gone]);
        assert!(!agg.is_complete());
    }

    #[test]
    fn empty_meal_is_all_zero() {
        let agg = aggregate_meal(&[], |_| None);
        assert_eq!(agg.base, BaseNutrition::default());
    }

    #[test]
    fn aggregation_is_repeatable() {
        let a = food("Rice", FoodType::Solid);
        let foods: HashMap<Uuid, Food> = [(a.id, a.clone())].into();
        let entries = vec![entry(a.id, 133.3)];
        let first = aggregate_meal(&entries, |id| foods.get(id));
        let second = aggregate_meal(&entries, |id| foods.get(id));
        assert_eq!(first, second);
        assert_eq!(first.base.calories.to_bits(), second.base.calories.to_bits());
    }

    #[test]
    fn meal_scaling_rounds_like_servings() {
        let base = BaseNutrition {
            calories: 255.0,
            protein: 4.3,
            carbs: 50.0,
            fat: 2.9,
        };
        let half = base.scaled(0.5);
        assert_eq!(half.calories, 128.0);
        assert_eq!(half.carbs, 25.0);
        assert!(decimals_at_most_one(half.protein));
    }
}
