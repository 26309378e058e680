use std::collections::HashMap;

use sqlx::PgConnection;
use tracing::{info, warn};
use uuid::Uuid;

use super::dto::{MealPayload, MealResponse};
use super::repo;
use super::repo_types::Meal;
use crate::catalog::FoodCatalog;
use crate::error::{AppError, ValidationError};
use crate::foods;
use crate::nutrition::{aggregate_meal, BaseNutrition, Food, MealAggregate, MealFoodEntry};

/// Checks a meal before it is stored.
pub fn validate_meal(meal: &MealPayload) -> Result<(), ValidationError> {
    if meal.name_en.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if meal.foods.is_empty() {
        return Err(ValidationError::EmptyMeal);
    }

    validate_entries(&meal.foods)?;

    let (min, max) = (meal.min_scale, meal.max_scale);
    if !min.is_finite() || !max.is_finite() || min <= 0.0 || min > max {
        return Err(ValidationError::InvalidScaleBounds { min, max });
    }
    Ok(())
}

/// Every base portion and portion option must be a positive number of grams.
pub fn validate_entries(entries: &[MealFoodEntry]) -> Result<(), ValidationError> {
    for entry in entries {
        let options = entry.portion_options.iter().flatten();
        for &grams in std::iter::once(&entry.base_portion_grams).chain(options) {
            if !grams.is_finite() || grams <= 0.0 {
                return Err(ValidationError::NonPositivePortion {
                    food_id: entry.food_id,
                    grams,
                });
            }
        }
    }
    Ok(())
}

fn unique_food_ids<'a>(entries: impl IntoIterator<Item = &'a MealFoodEntry>) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = entries.into_iter().map(|e| e.food_id).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Loads the referenced foods and sums the meal's base nutrition.
///
/// Foods missing from the catalog are skipped and reported in the result.
pub async fn compute_base_nutrition(
    catalog: &dyn FoodCatalog,
    entries: &[MealFoodEntry],
) -> anyhow::Result<MealAggregate> {
    let ids = unique_food_ids(entries);
    let foods: HashMap<Uuid, _> = catalog
        .foods_by_ids(&ids)
        .await?
        .into_iter()
        .map(|f| (f.id, f))
        .collect();

    let aggregate = aggregate_meal(entries, |id| foods.get(id));
    if !aggregate.is_complete() {
        warn!(unresolved = ?aggregate.unresolved_food_ids, "meal references missing foods");
    }
    Ok(aggregate)
}

/// Base nutrition of `meal` multiplied by `scale`, if the meal allows it.
pub fn scaled_nutrition(meal: &Meal, scale: f64) -> Result<BaseNutrition, AppError> {
    if !scale.is_finite() || scale < meal.min_scale || scale > meal.max_scale {
        return Err(AppError::ScaleOutOfRange {
            scale,
            min: meal.min_scale,
            max: meal.max_scale,
        });
    }
    Ok(meal.base_nutrition.scaled(scale))
}

/// Re-derives a stored meal's base nutrition from the current catalog.
pub async fn refresh_meal(
    catalog: &dyn FoodCatalog,
    mut meal: Meal,
) -> anyhow::Result<MealResponse> {
    let aggregate = compute_base_nutrition(catalog, &meal.foods).await?;
    meal.base_nutrition = aggregate.base;
    Ok(MealResponse {
        meal,
        unresolved_food_ids: aggregate.unresolved_food_ids,
    })
}

/// Aggregates each meal against `lookup`, keyed by meal id.
pub fn recompute_bases<'f, F>(meals: &[Meal], lookup: F) -> Vec<(Uuid, MealAggregate)>
where
    F: Fn(&Uuid) -> Option<&'f Food>,
{
    meals
        .iter()
        .map(|meal| (meal.id, aggregate_meal(&meal.foods, &lookup)))
        .collect()
}

/// Recomputes the base nutrition of every meal that uses `food_id`.
///
/// Runs on the caller's connection so a food write and the meal updates it
/// triggers commit or roll back together. Foods are read through the same
/// connection and therefore see the uncommitted write.
pub async fn recompute_meals_using_food(
    conn: &mut PgConnection,
    food_id: Uuid,
) -> anyhow::Result<usize> {
    let meals: Vec<Meal> = repo::list_using_food(&mut *conn, food_id)
        .await?
        .into_iter()
        .map(Meal::from)
        .collect();
    if meals.is_empty() {
        return Ok(0);
    }

    let ids = unique_food_ids(meals.iter().flat_map(|m| &m.foods));
    let by_id: HashMap<Uuid, Food> = foods::repo::get_many(&mut *conn, &ids)
        .await?
        .into_iter()
        .map(|row| row.into_record().map(|r| (r.food.id, r.food)))
        .collect::<anyhow::Result<_>>()?;

    let updates = recompute_bases(&meals, |id| by_id.get(id));
    for (meal_id, aggregate) in &updates {
        if !aggregate.is_complete() {
            warn!(
                %meal_id,
                unresolved = ?aggregate.unresolved_food_ids,
                "meal references missing foods"
            );
        }
        repo::update_base_nutrition(&mut *conn, *meal_id, &aggregate.base).await?;
    }
    info!(%food_id, meals = updates.len(), "meal nutrition recomputed");
    Ok(updates.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::memory::MemoryFoodCatalog;
    use crate::nutrition::resolver::tests::food;
    use crate::nutrition::model::FoodRole;
    use crate::nutrition::{FoodType, Nutrients};
    use time::OffsetDateTime;

    fn entry(food_id: Uuid, grams: f64) -> MealFoodEntry {
        MealFoodEntry {
            food_id,
            base_portion_grams: grams,
            role: FoodRole::CarbPrimary,
            portion_options: None,
        }
    }

    fn payload(foods: Vec<MealFoodEntry>) -> MealPayload {
        MealPayload {
            name_en: "Rice bowl".into(),
            names: Default::default(),
            tags: vec!["lunch".into()],
            cuisine: None,
            foods,
            min_scale: 0.5,
            max_scale: 2.5,
        }
    }

    fn meal(base: BaseNutrition) -> Meal {
        let now = OffsetDateTime::now_utc();
        Meal {
            id: Uuid::new_v4(),
            name_en: "Rice bowl".into(),
            names: Default::default(),
            tags: vec![],
            cuisine: None,
            foods: vec![],
            base_nutrition: base,
            min_scale: 0.5,
            max_scale: 2.5,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn validates_meal_payloads() {
        let id = Uuid::new_v4();
        assert!(validate_meal(&payload(vec![entry(id, 100.0)])).is_ok());
        assert_eq!(validate_meal(&payload(vec![])), Err(ValidationError::EmptyMeal));

        let mut bad = payload(vec![entry(id, 0.0)]);
        assert!(matches!(
            validate_meal(&bad),
            Err(ValidationError::NonPositivePortion { .. })
        ));

        bad.foods = vec![MealFoodEntry {
            portion_options: Some(vec![50.0, -10.0]),
            ..entry(id, 100.0)
        }];
        assert!(matches!(
            validate_meal(&bad),
            Err(ValidationError::NonPositivePortion { grams, .. }) if grams == -10.0
        ));

        let mut bounds = payload(vec![entry(id, 100.0)]);
        bounds.min_scale = 3.0;
        assert!(matches!(
            validate_meal(&bounds),
            Err(ValidationError::InvalidScaleBounds { .. })
        ));
    }

    #[tokio::test]
    async fn computes_base_nutrition_from_the_catalog() {
        let a = food("Rice", FoodType::Solid);
        let mut b = food("Side", FoodType::Solid);
        b.nutrition_per_100 = Nutrients {
            calories: 100.0,
            ..Default::default()
        };
        let catalog = MemoryFoodCatalog::with_foods([a.clone(), b.clone()]);

        let agg = compute_base_nutrition(&catalog, &[entry(a.id, 100.0), entry(b.id, 50.0)])
            .await
            .unwrap();
        assert_eq!(agg.base.calories, 255.0);
        assert!(agg.is_complete());
    }

    #[tokio::test]
    async fn deleted_food_degrades_instead_of_failing() {
        let a = food("Rice", FoodType::Solid);
        let b = food("Chicken", FoodType::Solid);
        let catalog = MemoryFoodCatalog::with_foods([a.clone(), b.clone()]);
        catalog.remove(&b.id);

        let agg = compute_base_nutrition(&catalog, &[entry(a.id, 100.0), entry(b.id, 150.0)])
            .await
            .unwrap();
        assert_eq!(agg.base.calories, 205.0);
        assert_eq!(agg.unresolved_food_ids, vec![b.id]);
    }

    #[test]
    fn entries_are_checked_without_a_name() {
        let id = Uuid::new_v4();
        assert!(validate_entries(&[entry(id, 150.0)]).is_ok());
        assert_eq!(
            validate_entries(&[entry(id, 150.0), entry(id, -200.0)]),
            Err(ValidationError::NonPositivePortion {
                food_id: id,
                grams: -200.0
            })
        );
    }

    #[test]
    fn recompute_uses_the_edited_food() {
        let mut rice = food("Rice", FoodType::Solid);
        let mut m = meal(BaseNutrition::default());
        m.foods = vec![entry(rice.id, 200.0)];

        let meals = std::slice::from_ref(&m);
        let before = recompute_bases(meals, |id| (*id == rice.id).then_some(&rice));
        assert_eq!(before[0].1.base.calories, 410.0);

        rice.nutrition_per_100.calories = 300.0;
        let after = recompute_bases(meals, |id| (*id == rice.id).then_some(&rice));
        assert_eq!(after[0].0, m.id);
        assert_eq!(after[0].1.base.calories, 600.0);
        assert_eq!(after[0].1.base.carbs, 90.0);
        assert!(after[0].1.is_complete());
    }

    #[test]
    fn recompute_after_delete_drops_the_food_and_reports_it() {
        let rice = food("Rice", FoodType::Solid);
        let chicken = food("Chicken", FoodType::Solid);
        let mut m = meal(BaseNutrition {
            calories: 615.0,
            protein: 13.0,
            carbs: 135.0,
            fat: 1.2,
        });
        m.foods = vec![entry(rice.id, 200.0), entry(chicken.id, 100.0)];

        let remaining: HashMap<Uuid, Food> = [(rice.id, rice.clone())].into();
        let updates = recompute_bases(&[m], |id| remaining.get(id));
        let (_, aggregate) = &updates[0];
        assert_eq!(aggregate.base.calories, 410.0);
        assert_eq!(aggregate.base.protein, 8.6);
        assert_eq!(aggregate.unresolved_food_ids, vec![chicken.id]);
    }

    #[tokio::test]
    async fn refresh_replaces_a_stale_stored_base() {
        let rice = food("Rice", FoodType::Solid);
        let gone = Uuid::new_v4();
        let catalog = MemoryFoodCatalog::with_foods([rice.clone()]);
        let mut stale = meal(BaseNutrition {
            calories: 999.0,
            protein: 99.0,
            carbs: 99.0,
            fat: 99.0,
        });
        stale.foods = vec![entry(rice.id, 200.0), entry(gone, 120.0)];

        let resp = refresh_meal(&catalog, stale).await.unwrap();
        assert_eq!(resp.meal.base_nutrition.calories, 410.0);
        assert_eq!(resp.meal.base_nutrition.fat, 0.8);
        assert_eq!(resp.unresolved_food_ids, vec![gone]);
    }

    #[test]
    fn scale_must_stay_within_meal_bounds() {
        let m = meal(BaseNutrition {
            calories: 400.0,
            protein: 30.0,
            carbs: 50.0,
            fat: 10.0,
        });
        let doubled = scaled_nutrition(&m, 2.0).unwrap();
        assert_eq!(doubled.calories, 800.0);
        assert_eq!(doubled.protein, 60.0);

        assert!(matches!(
            scaled_nutrition(&m, 3.0),
            Err(AppError::ScaleOutOfRange { .. })
        ));
        assert!(matches!(
            scaled_nutrition(&m, 0.25),
            Err(AppError::ScaleOutOfRange { .. })
        ));
    }
}
