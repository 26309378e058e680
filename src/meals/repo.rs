use serde_json::json;
use sqlx::{types::Json, PgExecutor};
use uuid::Uuid;

use super::dto::MealPayload;
use super::repo_types::MealRow;
use crate::nutrition::BaseNutrition;

const MEAL_COLUMNS: &str = "id, name_en, names, tags, cuisine, foods, base_calories, base_protein, \
                            base_carbs, base_fat, min_scale, max_scale, created_at, updated_at";

pub async fn list<'e, E: PgExecutor<'e>>(
    db: E,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<MealRow>> {
    let sql = format!(
        r#"
        SELECT {MEAL_COLUMNS}
        FROM meals
        ORDER BY updated_at DESC
        LIMIT $1 OFFSET $2
        "#
    );
    let rows = sqlx::query_as::<_, MealRow>(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn get<'e, E: PgExecutor<'e>>(db: E, id: Uuid) -> anyhow::Result<Option<MealRow>> {
    let sql = format!("SELECT {MEAL_COLUMNS} FROM meals WHERE id = $1");
    let row = sqlx::query_as::<_, MealRow>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn insert<'e, E: PgExecutor<'e>>(
    db: E,
    id: Uuid,
    meal: &MealPayload,
    base: &BaseNutrition,
) -> anyhow::Result<MealRow> {
    let sql = format!(
        r#"
        INSERT INTO meals (id, name_en, names, tags, cuisine, foods,
                           base_calories, base_protein, base_carbs, base_fat,
                           min_scale, max_scale)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING {MEAL_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, MealRow>(&sql)
        .bind(id)
        .bind(meal.name_en.trim())
        .bind(Json(&meal.names))
        .bind(Json(&meal.tags))
        .bind(&meal.cuisine)
        .bind(Json(&meal.foods))
        .bind(base.calories)
        .bind(base.protein)
        .bind(base.carbs)
        .bind(base.fat)
        .bind(meal.min_scale)
        .bind(meal.max_scale)
        .fetch_one(db)
        .await?;
    Ok(row)
}

pub async fn update<'e, E: PgExecutor<'e>>(
    db: E,
    id: Uuid,
    meal: &MealPayload,
    base: &BaseNutrition,
) -> anyhow::Result<Option<MealRow>> {
    let sql = format!(
        r#"
        UPDATE meals
        SET name_en = $2, names = $3, tags = $4, cuisine = $5, foods = $6,
            base_calories = $7, base_protein = $8, base_carbs = $9, base_fat = $10,
            min_scale = $11, max_scale = $12, updated_at = now()
        WHERE id = $1
        RETURNING {MEAL_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, MealRow>(&sql)
        .bind(id)
        .bind(meal.name_en.trim())
        .bind(Json(&meal.names))
        .bind(Json(&meal.tags))
        .bind(&meal.cuisine)
        .bind(Json(&meal.foods))
        .bind(base.calories)
        .bind(base.protein)
        .bind(base.carbs)
        .bind(base.fat)
        .bind(meal.min_scale)
        .bind(meal.max_scale)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn update_base_nutrition<'e, E: PgExecutor<'e>>(
    db: E,
    id: Uuid,
    base: &BaseNutrition,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE meals
        SET base_calories = $2, base_protein = $3, base_carbs = $4, base_fat = $5,
            updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(base.calories)
    .bind(base.protein)
    .bind(base.carbs)
    .bind(base.fat)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn delete<'e, E: PgExecutor<'e>>(db: E, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM meals WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Meals with at least one entry pointing at `food_id`.
pub async fn list_using_food<'e, E: PgExecutor<'e>>(
    db: E,
    food_id: Uuid,
) -> anyhow::Result<Vec<MealRow>> {
    let sql = format!("SELECT {MEAL_COLUMNS} FROM meals WHERE foods @> $1");
    let rows = sqlx::query_as::<_, MealRow>(&sql)
        .bind(Json(json!([{ "food_id": food_id }])))
        .fetch_all(db)
        .await?;
    Ok(rows)
}
