//! Category queries

use sqlx::SqlitePool;

use crate::models::{Category, CategoryCreate, CategoryUpdate};

pub async fn list(pool: &SqlitePool) -> Result<Vec<Category>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM categories ORDER BY name")
        .fetch_all(pool)
        .await
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM categories WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Case-insensitive name lookup (name column is COLLATE NOCASE)
pub async fn find_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM categories WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await
}

pub async fn create(
    pool: &SqlitePool,
    id: &str,
    data: &CategoryCreate,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO categories (id, name, display_name, description, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.display_name)
    .bind(&data.description)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}

/// Partial update: `None` fields keep their stored value via COALESCE.
/// `description` cannot be reset to NULL through here.
pub async fn update(
    pool: &SqlitePool,
    id: &str,
    data: &CategoryUpdate,
    now: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE categories SET
             name = COALESCE(?, name),
             display_name = COALESCE(?, display_name),
             description = COALESCE(?, description),
             updated_at = ?
         WHERE id = ?",
    )
    .bind(&data.name)
    .bind(&data.display_name)
    .bind(&data.description)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete(pool: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Number of menu items referencing this category (delete guard)
pub async fn menu_item_count(pool: &SqlitePool, id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM menu_items WHERE category_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await
}
