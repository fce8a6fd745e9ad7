//! Order API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::analytics;
use crate::api::extract::Json;
use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::{CreatedOrder, Order, OrderRequest, OrderStatus, StatusUpdate};
use crate::orders;
use crate::response::{ApiResponse, PagedResponse};
use crate::state::AppState;

const DEFAULT_LIMIT: u32 = 20;
const MAX_LIMIT: u32 = 100;

/// POST /api/orders — submit a proposed cart
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<OrderRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<CreatedOrder>>)> {
    let order = orders::create_order(&state.pool, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(order, "Order created")),
    ))
}

/// Query params for listing orders
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default = "default_page")]
    pub page: u32,
    pub status: Option<OrderStatus>,
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

fn default_page() -> u32 {
    1
}

/// GET /api/orders — paginated listing, newest first
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<PagedResponse<Order>>> {
    let limit = query.limit.clamp(1, MAX_LIMIT);
    let page = query.page.max(1);
    let offset = (page - 1) as i64 * limit as i64;

    let rows = db::orders::list(&state.pool, query.status, limit as i64, offset)
        .await
        .map_err(AppError::fetch)?;
    let total = db::orders::count(&state.pool, query.status)
        .await
        .map_err(AppError::fetch)?;

    let orders: Vec<Order> = rows
        .into_iter()
        .map(|(row, items)| Order::from_parts(row, items))
        .collect();

    Ok(Json(PagedResponse::new(orders, page, limit, total as u64)))
}

/// GET /api/orders/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let (row, items) = db::orders::find_by_id(&state.pool, &id)
        .await
        .map_err(AppError::fetch)?
        .ok_or_else(|| AppError::not_found(format!("Order {id} not found")))?;
    Ok(Json(ApiResponse::ok(Order::from_parts(row, items))))
}

/// PUT /api/orders/:id/status
///
/// Only pending → completed and pending → cancelled are accepted.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<StatusUpdate>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let (row, items) = db::orders::find_by_id(&state.pool, &id)
        .await
        .map_err(AppError::fetch)?
        .ok_or_else(|| AppError::not_found(format!("Order {id} not found")))?;

    if !row.status.can_transition_to(payload.status) {
        return Err(AppError::conflict(format!(
            "Cannot transition order from {} to {}",
            row.status.as_str(),
            payload.status.as_str()
        )));
    }

    let now = db::now_millis();
    db::orders::update_status(&state.pool, &id, payload.status, now)
        .await
        .map_err(AppError::update)?;

    let mut order = Order::from_parts(row, items);
    order.status = payload.status;
    order.updated_at = now;
    Ok(Json(ApiResponse::ok_with_message(order, "Order status updated")))
}

/// Query params for daily analytics (ISO-8601 dates, inclusive)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// GET /api/orders/analytics/daily
pub async fn daily_analytics(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> AppResult<Json<ApiResponse<analytics::DailyAnalytics>>> {
    let start = parse_date(query.start_date.as_deref(), "startDate")?;
    let end = parse_date(query.end_date.as_deref(), "endDate")?;
    let (start, end) = analytics::resolve_range(start, end, Utc::now().date_naive())?;

    let report = analytics::daily_sales(&state.pool, start, end).await?;
    Ok(Json(ApiResponse::ok(report)))
}

fn parse_date(value: Option<&str>, field: &str) -> AppResult<Option<NaiveDate>> {
    value
        .map(|raw| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                AppError::validation(format!("{field} must be an ISO date (YYYY-MM-DD)"))
            })
        })
        .transpose()
}
