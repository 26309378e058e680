use sqlx::{types::Json, PgExecutor};
use uuid::Uuid;

use super::repo_types::FoodRow;
use crate::nutrition::{Food, FoodCategory};

const FOOD_COLUMNS: &str = "id, name_en, names, brand, category, food_type, nutrition_per_100, \
                            custom_conversions, available_units, created_at, updated_at";

pub async fn list<'e, E: PgExecutor<'e>>(
    db: E,
    category: Option<FoodCategory>,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<FoodRow>> {
    let sql = format!(
        r#"
        SELECT {FOOD_COLUMNS}
        FROM foods
        WHERE ($1::text IS NULL OR category = $1)
        ORDER BY updated_at DESC
        LIMIT $2 OFFSET $3
        "#
    );
    let rows = sqlx::query_as::<_, FoodRow>(&sql)
        .bind(category.map(FoodCategory::as_str))
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn get<'e, E: PgExecutor<'e>>(db: E, id: Uuid) -> anyhow::Result<Option<FoodRow>> {
    let sql = format!("SELECT {FOOD_COLUMNS} FROM foods WHERE id = $1");
    let row = sqlx::query_as::<_, FoodRow>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn get_many<'e, E: PgExecutor<'e>>(db: E, ids: &[Uuid]) -> anyhow::Result<Vec<FoodRow>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!("SELECT {FOOD_COLUMNS} FROM foods WHERE id = ANY($1)");
    let rows = sqlx::query_as::<_, FoodRow>(&sql)
        .bind(ids)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn insert<'e, E: PgExecutor<'e>>(db: E, food: &Food) -> anyhow::Result<FoodRow> {
    let sql = format!(
        r#"
        INSERT INTO foods (id, name_en, names, brand, category, food_type,
                           nutrition_per_100, custom_conversions, available_units)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {FOOD_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, FoodRow>(&sql)
        .bind(food.id)
        .bind(&food.name_en)
        .bind(Json(&food.names))
        .bind(&food.brand)
        .bind(food.category.as_str())
        .bind(food.food_type.as_str())
        .bind(Json(&food.nutrition_per_100))
        .bind(Json(&food.custom_conversions))
        .bind(food.available_units.as_ref().map(Json))
        .fetch_one(db)
        .await?;
    Ok(row)
}

/// Replaces every editable field and bumps `updated_at`. Last write wins.
pub async fn update<'e, E: PgExecutor<'e>>(db: E, food: &Food) -> anyhow::Result<Option<FoodRow>> {
    let sql = format!(
        r#"
        UPDATE foods
        SET name_en = $2, names = $3, brand = $4, category = $5, food_type = $6,
            nutrition_per_100 = $7, custom_conversions = $8, available_units = $9,
            updated_at = now()
        WHERE id = $1
        RETURNING {FOOD_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, FoodRow>(&sql)
        .bind(food.id)
        .bind(&food.name_en)
        .bind(Json(&food.names))
        .bind(&food.brand)
        .bind(food.category.as_str())
        .bind(food.food_type.as_str())
        .bind(Json(&food.nutrition_per_100))
        .bind(Json(&food.custom_conversions))
        .bind(food.available_units.as_ref().map(Json))
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn delete<'e, E: PgExecutor<'e>>(db: E, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM foods WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
