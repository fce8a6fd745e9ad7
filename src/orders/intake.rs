//! Order intake & reconciliation pipeline
//!
//! Steps, in order, with no side effects before the insert:
//! 1. structural validation of the cart
//! 2. batch existence check against the catalog
//! 3. authoritative total recomputation from current catalog prices
//! 4. reconciliation of the client-submitted total (1 cent tolerance)
//! 5. transactional persist (order + line items)
//! 6. response annotated with resolved catalog details
//!
//! The client-supplied total is used solely for step 4; only the recomputed
//! total is ever persisted. A failed attempt is reported immediately — no
//! automatic retry, so a duplicate order can only come from a deliberate
//! client resubmission.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::{CreatedOrder, MenuItemRow, OrderRequest, OrderRow, OrderStatus,
    ResolvedLineItem};
use crate::money;
use crate::validation;

/// Create an order from a proposed cart. See module docs for the pipeline.
pub async fn create_order(pool: &SqlitePool, request: OrderRequest) -> AppResult<CreatedOrder> {
    validate_request(&request)?;

    // One batch lookup covers both the existence check and the
    // authoritative prices.
    let distinct_ids: HashSet<&str> = request.items.iter().map(|i| i.item_id.as_str()).collect();
    let ids: Vec<String> = distinct_ids.iter().map(|s| s.to_string()).collect();
    let found = db::catalog::find_by_ids(pool, &ids)
        .await
        .map_err(AppError::create)?;

    if found.len() != distinct_ids.len() {
        let known: HashSet<&str> = found.iter().map(|item| item.id.as_str()).collect();
        let mut missing: Vec<&str> = distinct_ids.difference(&known).copied().collect();
        missing.sort_unstable();
        return Err(AppError::InvalidItems(format!(
            "menu items do not exist: {}",
            missing.join(", ")
        )));
    }

    let catalog: HashMap<&str, &MenuItemRow> =
        found.iter().map(|item| (item.id.as_str(), item)).collect();

    // Authoritative recomputation: current catalog price × quantity, summed
    // in integer cents.
    let mut computed_cents: i64 = 0;
    for line in &request.items {
        let item = catalog[line.item_id.as_str()];
        computed_cents = item
            .price_cents
            .checked_mul(line.quantity)
            .and_then(|cents| computed_cents.checked_add(cents))
            .ok_or_else(|| AppError::validation("order total out of range"))?;
    }

    // Reconciliation: reject when the client total strays beyond the
    // tolerance. Guards against stale catalog caches and tampering without
    // trusting client arithmetic. Compared in decimal before any rounding,
    // so sub-cent drift past 0.01 does not slip through.
    let computed_total = money::to_decimal(computed_cents);
    if (computed_total - request.total).abs() > money::TOLERANCE {
        return Err(AppError::TotalMismatch {
            expected: computed_total,
            received: request.total,
        });
    }

    let now = db::now_millis();
    let row = OrderRow {
        id: Uuid::new_v4().to_string(),
        total_cents: computed_cents,
        payment_method: request.payment_method,
        status: OrderStatus::Pending,
        created_at: now,
        updated_at: now,
    };

    db::orders::insert(pool, &row, &request.items)
        .await
        .map_err(AppError::create)?;

    info!(
        order_id = %row.id,
        total = %money::to_decimal(computed_cents),
        method = ?request.payment_method,
        "Order created"
    );

    let resolved = request
        .items
        .iter()
        .map(|line| {
            let item = catalog[line.item_id.as_str()];
            ResolvedLineItem {
                item_id: line.item_id.clone(),
                quantity: line.quantity,
                name: item.name.clone(),
                price: money::to_decimal(item.price_cents),
                category_id: item.category_id.clone(),
            }
        })
        .collect();

    Ok(CreatedOrder {
        id: row.id,
        items: resolved,
        total: money::to_decimal(row.total_cents),
        payment_method: row.payment_method,
        status: row.status,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// Structural validation. Catches everything that can be rejected without
/// touching the store.
fn validate_request(request: &OrderRequest) -> AppResult<()> {
    if request.items.is_empty() {
        return Err(AppError::validation("items must not be empty"));
    }
    for line in &request.items {
        validation::validate_required_text(&line.item_id, "itemId", validation::MAX_ID_LEN)?;
        validation::validate_quantity(line.quantity, "quantity")?;
    }
    if request.total < Decimal::ZERO {
        return Err(AppError::validation("total must not be negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LineItem, PaymentMethod};

    async fn seeded_pool() -> SqlitePool {
        let pool = db::memory_pool().await;
        sqlx::raw_sql(
            "INSERT INTO categories (id, name, display_name, created_at, updated_at)
             VALUES ('cat-1', 'drinks', 'Drinks', 0, 0);
             INSERT INTO menu_items (id, name, price_cents, category_id, created_at, updated_at)
             VALUES ('item-a', 'Espresso', 4500, 'cat-1', 0, 0),
                    ('item-b', 'Latte', 350, 'cat-1', 0, 0);",
        )
        .execute(&pool)
        .await
        .expect("seed");
        pool
    }

    fn request(items: Vec<LineItem>, total: Decimal) -> OrderRequest {
        OrderRequest {
            items,
            total,
            payment_method: PaymentMethod::Cash,
        }
    }

    fn line(item_id: &str, quantity: i64) -> LineItem {
        LineItem {
            item_id: item_id.into(),
            quantity,
        }
    }

    #[tokio::test]
    async fn persists_recomputed_total() {
        let pool = seeded_pool().await;
        let order = create_order(
            &pool,
            request(vec![line("item-a", 2)], Decimal::new(9000, 2)),
        )
        .await
        .unwrap();

        assert_eq!(order.total, Decimal::new(9000, 2));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].name, "Espresso");

        let (row, items) = db::orders::find_by_id(&pool, &order.id).await.unwrap().unwrap();
        assert_eq!(row.total_cents, 9000);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);
    }

    #[tokio::test]
    async fn tolerates_one_cent_drift() {
        let pool = seeded_pool().await;
        // True total is 90.00; 89.99 is within tolerance, and the persisted
        // total is still the recomputed one.
        let order = create_order(
            &pool,
            request(vec![line("item-a", 2)], Decimal::new(8999, 2)),
        )
        .await
        .unwrap();
        assert_eq!(order.total, Decimal::new(9000, 2));
    }

    #[tokio::test]
    async fn rejects_sub_cent_drift_beyond_tolerance() {
        let pool = seeded_pool().await;
        // True total is 90.00. 90.014 rounds to within a cent but its real
        // distance is 0.014 > 0.01, so it must be rejected before rounding.
        let err = create_order(
            &pool,
            request(vec![line("item-a", 2)], Decimal::new(90014, 3)),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::TotalMismatch { .. }));
        assert_eq!(db::orders::count(&pool, None).await.unwrap(), 0);

        // Exactly 0.01 away is still within tolerance
        let order = create_order(
            &pool,
            request(vec![line("item-a", 2)], Decimal::new(9001, 2)),
        )
        .await
        .unwrap();
        assert_eq!(order.total, Decimal::new(9000, 2));
    }

    #[tokio::test]
    async fn rejects_total_mismatch_without_persisting() {
        let pool = seeded_pool().await;
        let err = create_order(
            &pool,
            request(vec![line("item-a", 2)], Decimal::new(8000, 2)),
        )
        .await
        .unwrap_err();

        match err {
            AppError::TotalMismatch { expected, received } => {
                assert_eq!(expected, Decimal::new(9000, 2));
                assert_eq!(received, Decimal::new(8000, 2));
            }
            other => panic!("expected TotalMismatch, got {other:?}"),
        }
        assert_eq!(db::orders::count(&pool, None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn rejects_unknown_items_without_persisting() {
        let pool = seeded_pool().await;
        let err = create_order(&pool, request(vec![line("ghost", 1)], Decimal::ONE))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidItems(_)));
        assert_eq!(db::orders::count(&pool, None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn rejects_structurally_invalid_carts() {
        let pool = seeded_pool().await;

        let empty = create_order(&pool, request(vec![], Decimal::ZERO)).await;
        assert!(matches!(empty, Err(AppError::Validation(_))));

        let zero_qty = create_order(
            &pool,
            request(vec![line("item-a", 0)], Decimal::new(4500, 2)),
        )
        .await;
        assert!(matches!(zero_qty, Err(AppError::Validation(_))));

        let negative = create_order(
            &pool,
            request(vec![line("item-a", 1)], Decimal::new(-100, 2)),
        )
        .await;
        assert!(matches!(negative, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn duplicate_line_items_sum_per_line() {
        let pool = seeded_pool().await;
        // Same item on two lines: 45.00 + 2 × 45.00 = 135.00. The existence
        // check deduplicates ids but every line contributes to the total.
        let order = create_order(
            &pool,
            request(
                vec![line("item-a", 1), line("item-a", 2)],
                Decimal::new(13500, 2),
            ),
        )
        .await
        .unwrap();
        assert_eq!(order.total, Decimal::new(13500, 2));
        assert_eq!(order.items.len(), 2);
    }

    #[tokio::test]
    async fn later_price_change_does_not_touch_stored_total() {
        let pool = seeded_pool().await;
        let order = create_order(
            &pool,
            request(vec![line("item-a", 2)], Decimal::new(9000, 2)),
        )
        .await
        .unwrap();

        sqlx::query("UPDATE menu_items SET price_cents = 9999 WHERE id = 'item-a'")
            .execute(&pool)
            .await
            .unwrap();

        let (row, _) = db::orders::find_by_id(&pool, &order.id).await.unwrap().unwrap();
        assert_eq!(row.total_cents, 9000);
    }
}
