//! Sales analytics aggregator
//!
//! Scans persisted orders over an inclusive date range and produces per-day
//! and per-item rollups. Line items are re-joined against the *live* catalog
//! (current names/categories, even for old sales); items deleted since an
//! order was placed silently drop out of the item rollups while the order's
//! total still counts toward revenue. Analytics are best-effort over
//! historical data, not a strict ledger.
//!
//! Day buckets use the server's UTC calendar day. All revenue summation is
//! done in integer cents; two-digit rounding happens only when the response
//! is built.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::{MenuItemRow, PaymentMethod};
use crate::money;

/// Trailing window used when no dates are supplied
const DEFAULT_RANGE_DAYS: u64 = 30;

/// Bound on the top-sellers list
const TOP_ITEMS_LIMIT: usize = 10;

// ============================================================================
// Response types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_revenue: Decimal,
    pub total_transactions: u64,
    /// 0 when there are no transactions
    pub average_order_value: Decimal,
    pub date_range: DateRange,
}

/// Payment-method mix for one day
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PaymentMix {
    pub cash: u64,
    pub debit: u64,
    pub ewallet: u64,
}

impl PaymentMix {
    fn record(&mut self, method: PaymentMethod) {
        match method {
            PaymentMethod::Cash => self.cash += 1,
            PaymentMethod::Debit => self.debit += 1,
            PaymentMethod::Ewallet => self.ewallet += 1,
        }
    }
}

/// Per-item rollup (per-day or across the whole range)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSales {
    pub item_id: String,
    pub name: String,
    pub quantity: i64,
    pub revenue: Decimal,
    pub category: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySales {
    pub date: NaiveDate,
    pub transactions: u64,
    pub revenue: Decimal,
    pub payment_methods: PaymentMix,
    pub items: Vec<ItemSales>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAnalytics {
    pub summary: Summary,
    pub daily_sales: Vec<DaySales>,
    pub top_items: Vec<ItemSales>,
    /// Number of days in range with at least one order
    pub total_days: usize,
}

// ============================================================================
// Range resolution
// ============================================================================

/// Resolve the requested `[start, end]` dates, defaulting to the trailing
/// 30 days. Start is clamped to 00:00:00.000 and end to 23:59:59.999 of
/// their calendar days.
pub fn resolve_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> AppResult<(NaiveDate, NaiveDate)> {
    let end = end.unwrap_or(today);
    let start = match start {
        Some(date) => date,
        None => end
            .checked_sub_days(Days::new(DEFAULT_RANGE_DAYS - 1))
            .ok_or_else(|| AppError::validation("date range out of bounds"))?,
    };
    if start > end {
        return Err(AppError::validation("startDate must not be after endDate"));
    }
    Ok((start, end))
}

fn range_millis(start: NaiveDate, end: NaiveDate) -> (i64, i64) {
    let start_ms = start.and_hms_opt(0, 0, 0).expect("valid").and_utc().timestamp_millis();
    let end_ms = end
        .and_hms_milli_opt(23, 59, 59, 999)
        .expect("valid")
        .and_utc()
        .timestamp_millis();
    (start_ms, end_ms)
}

// ============================================================================
// Aggregation
// ============================================================================

#[derive(Default)]
struct ItemAccumulator {
    name: String,
    category: String,
    quantity: i64,
    revenue_cents: i64,
}

#[derive(Default)]
struct DayAccumulator {
    transactions: u64,
    revenue_cents: i64,
    payment_methods: PaymentMix,
    items: HashMap<String, ItemAccumulator>,
}

/// Aggregate daily sales over `[start, end]` (inclusive calendar days).
///
/// Either underlying fetch failing aborts the whole aggregation; partial
/// results are never returned as if complete.
pub async fn daily_sales(
    pool: &SqlitePool,
    start: NaiveDate,
    end: NaiveDate,
) -> AppResult<DailyAnalytics> {
    let (start_ms, end_ms) = range_millis(start, end);

    let orders = db::orders::find_in_range(pool, start_ms, end_ms)
        .await
        .map_err(AppError::analytics)?;
    let catalog_rows = db::catalog::find_all(pool).await.map_err(AppError::analytics)?;
    let catalog: HashMap<&str, &MenuItemRow> = catalog_rows
        .iter()
        .map(|item| (item.id.as_str(), item))
        .collect();

    let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();
    let mut totals: HashMap<String, ItemAccumulator> = HashMap::new();
    let mut revenue_cents: i64 = 0;
    let mut transactions: u64 = 0;

    for (order, items) in &orders {
        let date = DateTime::<Utc>::from_timestamp_millis(order.created_at)
            .map(|dt| dt.date_naive())
            .unwrap_or(start);

        let day = days.entry(date).or_default();
        day.transactions += 1;
        day.revenue_cents += order.total_cents;
        day.payment_methods.record(order.payment_method);
        revenue_cents += order.total_cents;
        transactions += 1;

        for line in items {
            // Items deleted since the order was placed are skipped rather
            // than failing the aggregation.
            let Some(item) = catalog.get(line.item_id.as_str()) else {
                continue;
            };
            let line_cents = item.price_cents * line.quantity;

            for bucket in [
                day.items.entry(line.item_id.clone()).or_default(),
                totals.entry(line.item_id.clone()).or_default(),
            ] {
                bucket.name = item.name.clone();
                bucket.category = item.category_id.clone();
                bucket.quantity += line.quantity;
                bucket.revenue_cents += line_cents;
            }
        }
    }

    let total_days = days.len();
    let daily_sales: Vec<DaySales> = days
        .into_iter()
        .rev() // descending by date
        .map(|(date, day)| DaySales {
            date,
            transactions: day.transactions,
            revenue: money::to_decimal(day.revenue_cents),
            payment_methods: day.payment_methods,
            items: rank_items(day.items, usize::MAX),
        })
        .collect();

    let top_items = rank_items(totals, TOP_ITEMS_LIMIT);

    let average_order_value = if transactions == 0 {
        Decimal::ZERO
    } else {
        (money::to_decimal(revenue_cents) / Decimal::from(transactions)).round_dp(2)
    };

    Ok(DailyAnalytics {
        summary: Summary {
            total_revenue: money::to_decimal(revenue_cents),
            total_transactions: transactions,
            average_order_value,
            date_range: DateRange {
                start_date: start,
                end_date: end,
            },
        },
        daily_sales,
        top_items,
        total_days,
    })
}

/// Rank item rollups by quantity sold (descending), ties broken by revenue
/// then name, truncated to `limit`.
fn rank_items(items: HashMap<String, ItemAccumulator>, limit: usize) -> Vec<ItemSales> {
    let mut ranked: Vec<ItemSales> = items
        .into_iter()
        .map(|(item_id, acc)| ItemSales {
            item_id,
            name: acc.name,
            quantity: acc.quantity,
            revenue: money::to_decimal(acc.revenue_cents),
            category: acc.category,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.quantity
            .cmp(&a.quantity)
            .then(b.revenue.cmp(&a.revenue))
            .then(a.name.cmp(&b.name))
    });
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LineItem, OrderRow, OrderStatus};

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn millis(s: &str) -> i64 {
        millis_at(&format!("{s}T12:00:00Z"))
    }

    fn millis_at(s: &str) -> i64 {
        s.parse::<DateTime<Utc>>().unwrap().timestamp_millis()
    }

    async fn seed_order(
        pool: &SqlitePool,
        id: &str,
        total_cents: i64,
        method: PaymentMethod,
        created_at: i64,
        items: &[LineItem],
    ) {
        let row = OrderRow {
            id: id.into(),
            total_cents,
            payment_method: method,
            status: OrderStatus::Pending,
            created_at,
            updated_at: created_at,
        };
        db::orders::insert(pool, &row, items).await.unwrap();
    }

    async fn seeded_pool() -> SqlitePool {
        let pool = db::memory_pool().await;
        sqlx::raw_sql(
            "INSERT INTO categories (id, name, display_name, created_at, updated_at)
             VALUES ('cat-1', 'drinks', 'Drinks', 0, 0);
             INSERT INTO menu_items (id, name, price_cents, category_id, created_at, updated_at)
             VALUES ('item-a', 'Espresso', 5000, 'cat-1', 0, 0),
                    ('item-b', 'Latte', 3000, 'cat-1', 0, 0);",
        )
        .execute(&pool)
        .await
        .unwrap();
        pool
    }

    fn line(item_id: &str, quantity: i64) -> LineItem {
        LineItem {
            item_id: item_id.into(),
            quantity,
        }
    }

    #[test]
    fn resolve_range_defaults_to_trailing_window() {
        let today = date("2024-06-30");
        let (start, end) = resolve_range(None, None, today).unwrap();
        assert_eq!(end, today);
        assert_eq!(start, date("2024-06-01"));

        let (start, end) =
            resolve_range(Some(date("2024-06-10")), Some(date("2024-06-12")), today).unwrap();
        assert_eq!((start, end), (date("2024-06-10"), date("2024-06-12")));
    }

    #[test]
    fn resolve_range_rejects_inverted_dates() {
        let err = resolve_range(
            Some(date("2024-06-12")),
            Some(date("2024-06-10")),
            date("2024-06-30"),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn empty_range_yields_zeroed_summary() {
        let pool = seeded_pool().await;
        let report = daily_sales(&pool, date("2024-06-01"), date("2024-06-30"))
            .await
            .unwrap();
        assert_eq!(report.summary.total_transactions, 0);
        assert_eq!(report.summary.total_revenue, Decimal::ZERO);
        assert_eq!(report.summary.average_order_value, Decimal::ZERO);
        assert!(report.daily_sales.is_empty());
        assert!(report.top_items.is_empty());
        assert_eq!(report.total_days, 0);
    }

    #[tokio::test]
    async fn buckets_by_day_with_payment_mix() {
        let pool = seeded_pool().await;
        // Two orders on the same day: 50.00 cash + 30.00 debit
        seed_order(
            &pool,
            "o1",
            5000,
            PaymentMethod::Cash,
            millis("2024-06-10"),
            &[line("item-a", 1)],
        )
        .await;
        seed_order(
            &pool,
            "o2",
            3000,
            PaymentMethod::Debit,
            millis("2024-06-10"),
            &[line("item-b", 1)],
        )
        .await;

        let report = daily_sales(&pool, date("2024-06-01"), date("2024-06-30"))
            .await
            .unwrap();

        assert_eq!(report.summary.total_revenue, Decimal::new(8000, 2));
        assert_eq!(report.summary.total_transactions, 2);
        assert_eq!(report.summary.average_order_value, Decimal::new(4000, 2));
        assert_eq!(report.total_days, 1);

        let day = &report.daily_sales[0];
        assert_eq!(day.date, date("2024-06-10"));
        assert_eq!(day.transactions, 2);
        assert_eq!(day.revenue, Decimal::new(8000, 2));
        assert_eq!(day.payment_methods.cash, 1);
        assert_eq!(day.payment_methods.debit, 1);
        assert_eq!(day.payment_methods.ewallet, 0);
    }

    #[tokio::test]
    async fn daily_sales_sorted_descending_by_date() {
        let pool = seeded_pool().await;
        seed_order(&pool, "o1", 5000, PaymentMethod::Cash, millis("2024-06-08"), &[]).await;
        seed_order(&pool, "o2", 3000, PaymentMethod::Cash, millis("2024-06-12"), &[]).await;
        seed_order(&pool, "o3", 1000, PaymentMethod::Cash, millis("2024-06-10"), &[]).await;

        let report = daily_sales(&pool, date("2024-06-01"), date("2024-06-30"))
            .await
            .unwrap();
        let dates: Vec<NaiveDate> = report.daily_sales.iter().map(|d| d.date).collect();
        assert_eq!(
            dates,
            vec![date("2024-06-12"), date("2024-06-10"), date("2024-06-08")]
        );
        assert_eq!(report.total_days, 3);
    }

    #[tokio::test]
    async fn range_bounds_are_inclusive_calendar_days() {
        let pool = seeded_pool().await;
        seed_order(&pool, "before", 1000, PaymentMethod::Cash, millis("2024-06-09"), &[]).await;
        seed_order(&pool, "inside", 2000, PaymentMethod::Cash, millis("2024-06-10"), &[]).await;
        seed_order(&pool, "edge", 3000, PaymentMethod::Cash, millis("2024-06-11"), &[]).await;
        seed_order(&pool, "after", 4000, PaymentMethod::Cash, millis("2024-06-12"), &[]).await;

        let report = daily_sales(&pool, date("2024-06-10"), date("2024-06-11"))
            .await
            .unwrap();
        assert_eq!(report.summary.total_transactions, 2);
        assert_eq!(report.summary.total_revenue, Decimal::new(5000, 2));
    }

    #[tokio::test]
    async fn range_edges_cut_at_exact_millisecond() {
        let pool = seeded_pool().await;
        // One millisecond either side of the window: the last instant of the
        // day before and the first instant of the day after stay out, the
        // window's own first and last instants stay in.
        seed_order(
            &pool,
            "last-ms-before",
            1000,
            PaymentMethod::Cash,
            millis_at("2024-06-09T23:59:59.999Z"),
            &[],
        )
        .await;
        seed_order(
            &pool,
            "first-ms-inside",
            2000,
            PaymentMethod::Cash,
            millis_at("2024-06-10T00:00:00Z"),
            &[],
        )
        .await;
        seed_order(
            &pool,
            "last-ms-inside",
            3000,
            PaymentMethod::Cash,
            millis_at("2024-06-11T23:59:59.999Z"),
            &[],
        )
        .await;
        seed_order(
            &pool,
            "first-ms-after",
            4000,
            PaymentMethod::Cash,
            millis_at("2024-06-12T00:00:00Z"),
            &[],
        )
        .await;

        let report = daily_sales(&pool, date("2024-06-10"), date("2024-06-11"))
            .await
            .unwrap();
        assert_eq!(report.summary.total_transactions, 2);
        assert_eq!(report.summary.total_revenue, Decimal::new(5000, 2));
        assert_eq!(report.daily_sales[0].date, date("2024-06-11"));
        assert_eq!(report.daily_sales[1].date, date("2024-06-10"));
    }

    #[tokio::test]
    async fn ranks_top_items_by_quantity() {
        let pool = seeded_pool().await;
        // item-b sells 5 units (revenue 150.00), item-a sells 2 (revenue 100.00)
        seed_order(
            &pool,
            "o1",
            19000,
            PaymentMethod::Cash,
            millis("2024-06-10"),
            &[line("item-a", 2), line("item-b", 3)],
        )
        .await;
        seed_order(
            &pool,
            "o2",
            6000,
            PaymentMethod::Cash,
            millis("2024-06-11"),
            &[line("item-b", 2)],
        )
        .await;

        let report = daily_sales(&pool, date("2024-06-01"), date("2024-06-30"))
            .await
            .unwrap();

        assert_eq!(report.top_items.len(), 2);
        assert_eq!(report.top_items[0].item_id, "item-b");
        assert_eq!(report.top_items[0].quantity, 5);
        assert_eq!(report.top_items[0].revenue, Decimal::new(15000, 2));
        assert_eq!(report.top_items[0].name, "Latte");
        assert_eq!(report.top_items[1].item_id, "item-a");
        assert_eq!(report.top_items[1].quantity, 2);
    }

    #[tokio::test]
    async fn deleted_items_are_skipped_but_revenue_is_kept() {
        let pool = seeded_pool().await;
        seed_order(
            &pool,
            "o1",
            5000,
            PaymentMethod::Cash,
            millis("2024-06-10"),
            &[line("item-a", 1), line("ghost", 4)],
        )
        .await;

        let report = daily_sales(&pool, date("2024-06-01"), date("2024-06-30"))
            .await
            .unwrap();

        // The order's total still counts; the unresolvable line item does not
        // appear in the rollups.
        assert_eq!(report.summary.total_revenue, Decimal::new(5000, 2));
        assert_eq!(report.top_items.len(), 1);
        assert_eq!(report.top_items[0].item_id, "item-a");
    }

    #[tokio::test]
    async fn top_items_truncated_to_ten() {
        let pool = seeded_pool().await;
        for n in 0..12 {
            sqlx::query(
                "INSERT INTO menu_items (id, name, price_cents, category_id, created_at, updated_at)
                 VALUES (?, ?, 100, 'cat-1', 0, 0)",
            )
            .bind(format!("bulk-{n}"))
            .bind(format!("Bulk {n}"))
            .execute(&pool)
            .await
            .unwrap();
        }
        let items: Vec<LineItem> = (0..12).map(|n| line(&format!("bulk-{n}"), n + 1)).collect();
        seed_order(&pool, "o1", 7800, PaymentMethod::Cash, millis("2024-06-10"), &items).await;

        let report = daily_sales(&pool, date("2024-06-01"), date("2024-06-30"))
            .await
            .unwrap();
        assert_eq!(report.top_items.len(), 10);
        // Highest quantity first
        assert_eq!(report.top_items[0].quantity, 12);
    }
}
