use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use anyhow::Context;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{
    FoodListQuery, FoodPayload, FoodUpdatedResponse, PreviewRequest, ServingRequest,
    ServingResponse,
};
use super::repo;
use super::repo_types::FoodRecord;
use super::services::{serving_for, validate_food};
use crate::{error::AppError, meals, state::AppState};

const MAX_PAGE: i64 = 100;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/foods", get(list_foods))
        .route("/foods/:id", get(get_food))
        .route("/foods/:id/serving", post(food_serving))
        .route("/nutrition/preview", post(preview_serving))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/foods", post(create_food))
        .route("/foods/:id", put(update_food).delete(delete_food))
}

#[instrument(skip(state))]
pub async fn list_foods(
    State(state): State<AppState>,
    Query(q): Query<FoodListQuery>,
) -> Result<Json<Vec<FoodRecord>>, AppError> {
    let limit = q.limit.clamp(1, MAX_PAGE);
    let offset = q.offset.max(0);
    let rows = repo::list(&state.db, q.category, limit, offset).await?;
    let foods = rows
        .into_iter()
        .map(|r| r.into_record())
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(Json(foods))
}

#[instrument(skip(state))]
pub async fn get_food(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FoodRecord>, AppError> {
    Ok(Json(load_food(&state, id).await?))
}

#[instrument(skip(state, payload))]
pub async fn create_food(
    State(state): State<AppState>,
    Json(payload): Json<FoodPayload>,
) -> Result<(StatusCode, HeaderMap, Json<FoodRecord>), AppError> {
    let food = payload.into_food(Uuid::new_v4());
    if let Err(e) = validate_food(&food) {
        warn!(error = %e, "food rejected");
        return Err(e.into());
    }

    let record = repo::insert(&state.db, &food).await?.into_record()?;
    info!(food_id = %record.food.id, name = %record.food.name_en, "food created");

    let mut headers = HeaderMap::new();
    if let Ok(location) = format!("/api/v1/foods/{}", record.food.id).parse() {
        headers.insert(header::LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(record)))
}

/// Replaces a food and refreshes the base nutrition of every meal using it.
#[instrument(skip(state, payload))]
pub async fn update_food(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<FoodPayload>,
) -> Result<Json<FoodUpdatedResponse>, AppError> {
    let food = payload.into_food(id);
    if let Err(e) = validate_food(&food) {
        warn!(error = %e, %id, "food update rejected");
        return Err(e.into());
    }

    let mut tx = state.db.begin().await.context("begin food update")?;
    let record = repo::update(&mut *tx, &food)
        .await?
        .ok_or(AppError::NotFound("food"))?
        .into_record()?;
    let meals_recomputed = meals::services::recompute_meals_using_food(&mut *tx, id).await?;
    tx.commit().await.context("commit food update")?;
    info!(food_id = %id, meals_recomputed, "food updated");

    Ok(Json(FoodUpdatedResponse {
        food: record,
        meals_recomputed,
    }))
}

/// Meals keep their references; their base nutrition drops the food's share
/// and they report it as unresolved from now on.
#[instrument(skip(state))]
pub async fn delete_food(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let mut tx = state.db.begin().await.context("begin food delete")?;
    if !repo::delete(&mut *tx, id).await? {
        return Err(AppError::NotFound("food"));
    }
    let meals_recomputed = meals::services::recompute_meals_using_food(&mut *tx, id).await?;
    tx.commit().await.context("commit food delete")?;
    info!(food_id = %id, meals_recomputed, "food deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn food_serving(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ServingRequest>,
) -> Result<Json<ServingResponse>, AppError> {
    let record = load_food(&state, id).await?;
    Ok(Json(serving_for(&record.food, &req)?))
}

/// Nutrition for a food that is still being edited and has no id yet.
#[instrument(skip_all)]
pub async fn preview_serving(
    Json(req): Json<PreviewRequest>,
) -> Result<Json<ServingResponse>, AppError> {
    let food = req.food.into_food(Uuid::nil());
    validate_food(&food)?;
    Ok(Json(serving_for(&food, &req.serving)?))
}

async fn load_food(state: &AppState, id: Uuid) -> Result<FoodRecord, AppError> {
    let row = repo::get(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("food"))?;
    Ok(row.into_record()?)
}
