//! Menu item (catalog) queries
//!
//! Order intake uses [`find_by_ids`] for the single batch existence/price
//! lookup; analytics uses [`find_all`] for the live catalog join.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::models::{MenuItemCreate, MenuItemRow};

pub async fn list(
    pool: &SqlitePool,
    category_id: Option<&str>,
) -> Result<Vec<MenuItemRow>, sqlx::Error> {
    match category_id {
        Some(category) => {
            sqlx::query_as("SELECT * FROM menu_items WHERE category_id = ? ORDER BY name")
                .bind(category)
                .fetch_all(pool)
                .await
        }
        None => {
            sqlx::query_as("SELECT * FROM menu_items ORDER BY name")
                .fetch_all(pool)
                .await
        }
    }
}

/// Full catalog scan. The catalog is small; analytics trades a full fetch
/// for a single round trip.
pub async fn find_all(pool: &SqlitePool) -> Result<Vec<MenuItemRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM menu_items").fetch_all(pool).await
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<MenuItemRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM menu_items WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Batch lookup by id. Returns only the rows that exist; the caller compares
/// set sizes to detect unknown ids.
pub async fn find_by_ids(
    pool: &SqlitePool,
    ids: &[String],
) -> Result<Vec<MenuItemRow>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT * FROM menu_items WHERE id IN (");
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(id);
    }
    builder.push(")");
    builder.build_query_as().fetch_all(pool).await
}

pub async fn create(
    pool: &SqlitePool,
    id: &str,
    data: &MenuItemCreate,
    price_cents: i64,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO menu_items (id, name, price_cents, category_id, image_url, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(price_cents)
    .bind(&data.category_id)
    .bind(&data.image_url)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}

/// Partial update: `None` fields keep their stored value via COALESCE.
/// Optional columns like `image_url` cannot be reset to NULL through here.
#[allow(clippy::too_many_arguments)]
pub async fn update(
    pool: &SqlitePool,
    id: &str,
    name: Option<&str>,
    price_cents: Option<i64>,
    category_id: Option<&str>,
    image_url: Option<&str>,
    now: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE menu_items SET
             name = COALESCE(?, name),
             price_cents = COALESCE(?, price_cents),
             category_id = COALESCE(?, category_id),
             image_url = COALESCE(?, image_url),
             updated_at = ?
         WHERE id = ?",
    )
    .bind(name)
    .bind(price_cents)
    .bind(category_id)
    .bind(image_url)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Delete a menu item. Historical orders keep referencing the id; analytics
/// silently drops unresolvable line items.
pub async fn delete(pool: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM menu_items WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
