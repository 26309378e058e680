use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{
    MealPayload, MealPreviewResponse, MealResponse, Pagination, ScaleQuery, ScaledMealNutrition,
};
use super::repo;
use super::repo_types::Meal;
use super::services::{
    compute_base_nutrition, refresh_meal, scaled_nutrition, validate_entries, validate_meal,
};
use crate::{catalog::FoodCatalog, error::AppError, state::AppState};

const MAX_PAGE: i64 = 100;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals))
        .route("/meals/:id", get(get_meal))
        .route("/meals/:id/nutrition", get(meal_nutrition))
        .route("/meals/preview", post(preview_meal))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", post(create_meal))
        .route("/meals/:id", put(update_meal).delete(delete_meal))
}

#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<Meal>>, AppError> {
    let rows = repo::list(&state.db, p.limit.clamp(1, MAX_PAGE), p.offset.max(0)).await?;
    Ok(Json(rows.into_iter().map(Meal::from).collect()))
}

/// Base nutrition is recomputed from the current foods on every read.
#[instrument(skip(state))]
pub async fn get_meal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MealResponse>, AppError> {
    let meal = load_meal(&state, id).await?;
    Ok(Json(refresh_meal(state.catalog.as_ref(), meal).await?))
}

/// Base nutrition of a stored meal at the requested scale.
#[instrument(skip(state))]
pub async fn meal_nutrition(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(q): Query<ScaleQuery>,
) -> Result<Json<ScaledMealNutrition>, AppError> {
    let meal = load_meal(&state, id).await?;
    scaled_meal(state.catalog.as_ref(), meal, q.scale).await.map(Json)
}

async fn scaled_meal(
    catalog: &dyn FoodCatalog,
    meal: Meal,
    scale: f64,
) -> Result<ScaledMealNutrition, AppError> {
    let fresh = refresh_meal(catalog, meal).await?;
    let nutrition = scaled_nutrition(&fresh.meal, scale)?;
    Ok(ScaledMealNutrition {
        meal_id: fresh.meal.id,
        scale,
        nutrition,
        unresolved_food_ids: fresh.unresolved_food_ids,
    })
}

/// Aggregates an unsaved food list; called by editors on every list change.
/// The draft may still be nameless, but its portions must be valid.
#[instrument(skip(state, payload))]
pub async fn preview_meal(
    State(state): State<AppState>,
    Json(payload): Json<MealPayload>,
) -> Result<Json<MealPreviewResponse>, AppError> {
    if let Err(e) = validate_entries(&payload.foods) {
        warn!(error = %e, "meal preview rejected");
        return Err(e.into());
    }

    let aggregate = compute_base_nutrition(state.catalog.as_ref(), &payload.foods).await?;
    Ok(Json(MealPreviewResponse {
        base_nutrition: aggregate.base,
        unresolved_food_ids: aggregate.unresolved_food_ids,
    }))
}

#[instrument(skip(state, payload))]
pub async fn create_meal(
    State(state): State<AppState>,
    Json(payload): Json<MealPayload>,
) -> Result<(StatusCode, HeaderMap, Json<MealResponse>), AppError> {
    if let Err(e) = validate_meal(&payload) {
        warn!(error = %e, "meal rejected");
        return Err(e.into());
    }

    let aggregate = compute_base_nutrition(state.catalog.as_ref(), &payload.foods).await?;
    let meal_id = Uuid::new_v4();
    let meal = Meal::from(repo::insert(&state.db, meal_id, &payload, &aggregate.base).await?);
    info!(
        %meal_id,
        calories = meal.base_nutrition.calories,
        unresolved = aggregate.unresolved_food_ids.len(),
        "meal created"
    );

    let mut headers = HeaderMap::new();
    if let Ok(location) = format!("/api/v1/meals/{}", meal_id).parse() {
        headers.insert(header::LOCATION, location);
    }
    Ok((
        StatusCode::CREATED,
        headers,
        Json(MealResponse {
            meal,
            unresolved_food_ids: aggregate.unresolved_food_ids,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_meal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MealPayload>,
) -> Result<Json<MealResponse>, AppError> {
    if let Err(e) = validate_meal(&payload) {
        warn!(error = %e, %id, "meal update rejected");
        return Err(e.into());
    }

    let aggregate = compute_base_nutrition(state.catalog.as_ref(), &payload.foods).await?;
    let row = repo::update(&state.db, id, &payload, &aggregate.base)
        .await?
        .ok_or(AppError::NotFound("meal"))?;
    info!(meal_id = %id, "meal updated");

    Ok(Json(MealResponse {
        meal: Meal::from(row),
        unresolved_food_ids: aggregate.unresolved_food_ids,
    }))
}

#[instrument(skip(state))]
pub async fn delete_meal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !repo::delete(&state.db, id).await? {
        return Err(AppError::NotFound("meal"));
    }
    info!(meal_id = %id, "meal deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn load_meal(state: &AppState, id: Uuid) -> Result<Meal, AppError> {
    repo::get(&state.db, id)
        .await?
        .map(Meal::from)
        .ok_or(AppError::NotFound("meal"))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::catalog::memory::MemoryFoodCatalog;
    use crate::error::ValidationError;
    use crate::nutrition::resolver::tests::food;
    use crate::nutrition::model::FoodRole;
    use crate::nutrition::{FoodType, MealFoodEntry};

    fn payload(foods: Vec<MealFoodEntry>) -> MealPayload {
        MealPayload {
            name_en: "Chicken rice".into(),
            names: Default::default(),
            tags: vec![],
            cuisine: Some("asian".into()),
            foods,
            min_scale: 0.5,
            max_scale: 2.5,
        }
    }

    #[tokio::test]
    async fn preview_reports_dangling_food_ids() {
        let rice = food("Rice", FoodType::Solid);
        let gone = Uuid::new_v4();
        let state = AppState::fake(Arc::new(MemoryFoodCatalog::with_foods([rice.clone()])));
        let foods = vec![
            MealFoodEntry {
                food_id: rice.id,
                base_portion_grams: 200.0,
                role: FoodRole::CarbPrimary,
                portion_options: Some(vec![150.0, 200.0, 250.0]),
            },
            MealFoodEntry {
                food_id: gone,
                base_portion_grams: 120.0,
                role: FoodRole::ProteinPrimary,
                portion_options: None,
            },
        ];

        let Json(resp) = preview_meal(State(state), Json(payload(foods))).await.unwrap();
        assert_eq!(resp.base_nutrition.calories, 410.0);
        assert_eq!(resp.base_nutrition.carbs, 90.0);
        assert_eq!(resp.unresolved_food_ids, vec![gone]);
    }

    #[tokio::test]
    async fn preview_rejects_a_negative_portion() {
        let rice = food("Rice", FoodType::Solid);
        let state = AppState::fake(Arc::new(MemoryFoodCatalog::with_foods([rice.clone()])));
        let foods = vec![MealFoodEntry {
            food_id: rice.id,
            base_portion_grams: -200.0,
            role: FoodRole::CarbPrimary,
            portion_options: None,
        }];

        let err = preview_meal(State(state), Json(payload(foods))).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::NonPositivePortion { grams, .. })
                if grams == -200.0
        ));
    }

    #[tokio::test]
    async fn preview_accepts_a_nameless_draft() {
        let rice = food("Rice", FoodType::Solid);
        let state = AppState::fake(Arc::new(MemoryFoodCatalog::with_foods([rice.clone()])));
        let mut draft = payload(vec![MealFoodEntry {
            food_id: rice.id,
            base_portion_grams: 100.0,
            role: FoodRole::CarbPrimary,
            portion_options: None,
        }]);
        draft.name_en = String::new();

        let Json(resp) = preview_meal(State(state), Json(draft)).await.unwrap();
        assert_eq!(resp.base_nutrition.calories, 205.0);
    }

    #[tokio::test]
    async fn scaled_nutrition_follows_current_foods() {
        let rice = food("Rice", FoodType::Solid);
        let gone = Uuid::new_v4();
        let catalog = MemoryFoodCatalog::with_foods([rice.clone()]);
        let now = time::OffsetDateTime::now_utc();
        let stored = Meal {
            id: Uuid::new_v4(),
            name_en: "Chicken rice".into(),
            names: Default::default(),
            tags: vec![],
            cuisine: None,
            foods: vec![
                MealFoodEntry {
                    food_id: rice.id,
                    base_portion_grams: 200.0,
                    role: FoodRole::CarbPrimary,
                    portion_options: None,
                },
                MealFoodEntry {
                    food_id: gone,
                    base_portion_grams: 120.0,
                    role: FoodRole::ProteinPrimary,
                    portion_options: None,
                },
            ],
            base_nutrition: Default::default(),
            min_scale: 0.5,
            max_scale: 2.5,
            created_at: now,
            updated_at: now,
        };

        let resp = scaled_meal(&catalog, stored, 1.5).await.unwrap();
        assert_eq!(resp.nutrition.calories, 615.0);
        assert_eq!(resp.nutrition.carbs, 135.0);
        assert_eq!(resp.unresolved_food_ids, vec![gone]);
    }

    #[tokio::test]
    async fn create_rejects_an_empty_meal() {
        let state = AppState::fake(Arc::new(MemoryFoodCatalog::default()));
        let err = create_meal(State(state), Json(payload(vec![])))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ValidationError::EmptyMeal)));
    }
}
