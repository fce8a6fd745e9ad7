//! Menu item API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::extract::Json;
use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::{ALL_CATEGORY, MenuItemCreate, MenuItemUpdate, MenuItemView};
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::validation;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Category id filter; absent or `all` means no filter
    pub category: Option<String>,
}

/// GET /api/menu
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<Vec<MenuItemView>>>> {
    let filter = query
        .category
        .as_deref()
        .filter(|c| !c.eq_ignore_ascii_case(ALL_CATEGORY));
    let items = db::catalog::list(&state.pool, filter)
        .await
        .map_err(AppError::fetch)?;
    Ok(Json(ApiResponse::ok(
        items.into_iter().map(MenuItemView::from).collect(),
    )))
}

/// GET /api/menu/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<MenuItemView>>> {
    let item = db::catalog::find_by_id(&state.pool, &id)
        .await
        .map_err(AppError::fetch)?
        .ok_or_else(|| AppError::not_found(format!("Menu item {id} not found")))?;
    Ok(Json(ApiResponse::ok(item.into())))
}

/// POST /api/menu
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<MenuItemCreate>,
) -> AppResult<(StatusCode, Json<ApiResponse<MenuItemView>>)> {
    validation::validate_name(&payload.name, "name")?;
    validation::validate_optional_text(&payload.image_url, "imageUrl", validation::MAX_URL_LEN)?;
    let price_cents = validation::validate_price(payload.price, "price")?;
    require_category(&state, &payload.category_id).await?;

    let id = Uuid::new_v4().to_string();
    let now = db::now_millis();
    db::catalog::create(&state.pool, &id, &payload, price_cents, now)
        .await
        .map_err(AppError::create)?;

    let item = db::catalog::find_by_id(&state.pool, &id)
        .await
        .map_err(AppError::fetch)?
        .ok_or_else(|| AppError::Internal("created menu item vanished".into()))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(item.into(), "Menu item created")),
    ))
}

/// PUT /api/menu/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<MenuItemUpdate>,
) -> AppResult<Json<ApiResponse<MenuItemView>>> {
    if let Some(name) = &payload.name {
        validation::validate_name(name, "name")?;
    }
    validation::validate_optional_text(&payload.image_url, "imageUrl", validation::MAX_URL_LEN)?;
    let price_cents = match payload.price {
        Some(price) => Some(validation::validate_price(price, "price")?),
        None => None,
    };
    if let Some(category_id) = &payload.category_id {
        require_category(&state, category_id).await?;
    }

    let updated = db::catalog::update(
        &state.pool,
        &id,
        payload.name.as_deref(),
        price_cents,
        payload.category_id.as_deref(),
        payload.image_url.as_deref(),
        db::now_millis(),
    )
    .await
    .map_err(AppError::update)?;
    if !updated {
        return Err(AppError::not_found(format!("Menu item {id} not found")));
    }

    let item = db::catalog::find_by_id(&state.pool, &id)
        .await
        .map_err(AppError::fetch)?
        .ok_or_else(|| AppError::not_found(format!("Menu item {id} not found")))?;
    Ok(Json(ApiResponse::ok_with_message(item.into(), "Menu item updated")))
}

/// DELETE /api/menu/:id
///
/// Deletion is allowed even when historical orders reference the item;
/// analytics silently drops unresolvable line items.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<bool>>> {
    let deleted = db::catalog::delete(&state.pool, &id)
        .await
        .map_err(AppError::delete)?;
    if !deleted {
        return Err(AppError::not_found(format!("Menu item {id} not found")));
    }
    Ok(Json(ApiResponse::ok_with_message(deleted, "Menu item deleted")))
}

async fn require_category(state: &AppState, category_id: &str) -> AppResult<()> {
    if db::categories::find_by_id(&state.pool, category_id)
        .await
        .map_err(AppError::fetch)?
        .is_none()
    {
        return Err(AppError::validation(format!(
            "Category {category_id} does not exist"
        )));
    }
    Ok(())
}
