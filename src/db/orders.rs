//! Order queries
//!
//! Orders are append-only: one transactional insert at creation, then status
//! updates only. The range scan feeds the analytics aggregator.

use std::collections::HashMap;

use sqlx::SqlitePool;

use crate::models::{LineItem, OrderRow, OrderStatus};

/// Insert an order and its line items in one transaction.
pub async fn insert(
    pool: &SqlitePool,
    order: &OrderRow,
    items: &[LineItem],
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO orders (id, total_cents, payment_method, status, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&order.id)
    .bind(order.total_cents)
    .bind(order.payment_method)
    .bind(order.status)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(&mut *tx)
    .await?;

    for (line_no, item) in items.iter().enumerate() {
        sqlx::query(
            "INSERT INTO order_items (order_id, line_no, item_id, quantity) VALUES (?, ?, ?, ?)",
        )
        .bind(&order.id)
        .bind(line_no as i64)
        .bind(&item.item_id)
        .bind(item.quantity)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await
}

pub async fn find_by_id(
    pool: &SqlitePool,
    id: &str,
) -> Result<Option<(OrderRow, Vec<LineItem>)>, sqlx::Error> {
    let Some(row) = sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
    else {
        return Ok(None);
    };

    let items = sqlx::query_as(
        "SELECT item_id, quantity FROM order_items WHERE order_id = ? ORDER BY line_no",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(Some((row, items)))
}

/// Paginated listing, newest first, optionally filtered by status.
pub async fn list(
    pool: &SqlitePool,
    status: Option<OrderStatus>,
    limit: i64,
    offset: i64,
) -> Result<Vec<(OrderRow, Vec<LineItem>)>, sqlx::Error> {
    let rows: Vec<OrderRow> = match status {
        Some(status) => {
            sqlx::query_as(
                "SELECT * FROM orders WHERE status = ? ORDER BY created_at DESC LIMIT ? OFFSET ?",
            )
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as("SELECT * FROM orders ORDER BY created_at DESC LIMIT ? OFFSET ?")
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
        }
    };

    attach_items(pool, rows, None).await
}

pub async fn count(pool: &SqlitePool, status: Option<OrderStatus>) -> Result<i64, sqlx::Error> {
    match status {
        Some(status) => {
            sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE status = ?")
                .bind(status)
                .fetch_one(pool)
                .await
        }
        None => {
            sqlx::query_scalar("SELECT COUNT(*) FROM orders")
                .fetch_one(pool)
                .await
        }
    }
}

/// Bump status and updated_at. Returns false when the order does not exist.
/// Transition rules are enforced by the caller against the fetched order.
pub async fn update_status(
    pool: &SqlitePool,
    id: &str,
    status: OrderStatus,
    now: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE orders SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// All orders created within `[start_ms, end_ms]`, with line items, oldest
/// first. Used by the analytics range scan.
pub async fn find_in_range(
    pool: &SqlitePool,
    start_ms: i64,
    end_ms: i64,
) -> Result<Vec<(OrderRow, Vec<LineItem>)>, sqlx::Error> {
    let rows: Vec<OrderRow> = sqlx::query_as(
        "SELECT * FROM orders WHERE created_at BETWEEN ? AND ? ORDER BY created_at",
    )
    .bind(start_ms)
    .bind(end_ms)
    .fetch_all(pool)
    .await?;

    attach_items(pool, rows, Some((start_ms, end_ms))).await
}

/// Load line items for a batch of orders with a single query and zip them
/// back onto their rows.
async fn attach_items(
    pool: &SqlitePool,
    rows: Vec<OrderRow>,
    range: Option<(i64, i64)>,
) -> Result<Vec<(OrderRow, Vec<LineItem>)>, sqlx::Error> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    #[derive(sqlx::FromRow)]
    struct ItemRow {
        order_id: String,
        item_id: String,
        quantity: i64,
    }

    // A time-range join keeps bind counts flat for large scans; the paginated
    // path (<= 100 rows) binds ids directly.
    let item_rows: Vec<ItemRow> = match range {
        Some((start_ms, end_ms)) => {
            sqlx::query_as(
                "SELECT oi.order_id, oi.item_id, oi.quantity
                 FROM order_items oi
                 JOIN orders o ON o.id = oi.order_id
                 WHERE o.created_at BETWEEN ? AND ?
                 ORDER BY oi.order_id, oi.line_no",
            )
            .bind(start_ms)
            .bind(end_ms)
            .fetch_all(pool)
            .await?
        }
        None => {
            let mut builder: sqlx::QueryBuilder<sqlx::Sqlite> = sqlx::QueryBuilder::new(
                "SELECT order_id, item_id, quantity FROM order_items WHERE order_id IN (",
            );
            let mut separated = builder.separated(", ");
            for row in &rows {
                separated.push_bind(&row.id);
            }
            builder.push(") ORDER BY order_id, line_no");
            builder.build_query_as().fetch_all(pool).await?
        }
    };

    let mut by_order: HashMap<String, Vec<LineItem>> = HashMap::new();
    for item in item_rows {
        by_order.entry(item.order_id).or_default().push(LineItem {
            item_id: item.item_id,
            quantity: item.quantity,
        });
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let items = by_order.remove(&row.id).unwrap_or_default();
            (row, items)
        })
        .collect())
}
