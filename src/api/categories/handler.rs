//! Category API handlers
//!
//! Category names are unique case-insensitively. The literal name `all` is a
//! reserved pseudo-category ("no filter") and can be neither created nor
//! deleted; a category referenced by menu items cannot be deleted either.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::api::extract::Json;
use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::{ALL_CATEGORY, Category, CategoryCreate, CategoryUpdate};
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::validation;

/// GET /api/categories
pub async fn list(State(state): State<AppState>) -> AppResult<Json<ApiResponse<Vec<Category>>>> {
    let categories = db::categories::list(&state.pool)
        .await
        .map_err(AppError::fetch)?;
    Ok(Json(ApiResponse::ok(categories)))
}

/// GET /api/categories/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let category = db::categories::find_by_id(&state.pool, &id)
        .await
        .map_err(AppError::fetch)?
        .ok_or_else(|| AppError::not_found(format!("Category {id} not found")))?;
    Ok(Json(ApiResponse::ok(category)))
}

/// POST /api/categories
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CategoryCreate>,
) -> AppResult<(StatusCode, Json<ApiResponse<Category>>)> {
    validate_name(&payload.name)?;
    validation::validate_required_text(
        &payload.display_name,
        "displayName",
        validation::MAX_NAME_LEN,
    )?;
    validation::validate_optional_text(
        &payload.description,
        "description",
        validation::MAX_TEXT_LEN,
    )?;

    if db::categories::find_by_name(&state.pool, &payload.name)
        .await
        .map_err(AppError::fetch)?
        .is_some()
    {
        return Err(AppError::conflict(format!(
            "Category name '{}' already exists",
            payload.name
        )));
    }

    let id = Uuid::new_v4().to_string();
    let now = db::now_millis();
    db::categories::create(&state.pool, &id, &payload, now)
        .await
        .map_err(AppError::create)?;

    let category = db::categories::find_by_id(&state.pool, &id)
        .await
        .map_err(AppError::fetch)?
        .ok_or_else(|| AppError::Internal("created category vanished".into()))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(category, "Category created")),
    ))
}

/// PUT /api/categories/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<CategoryUpdate>,
) -> AppResult<Json<ApiResponse<Category>>> {
    if let Some(name) = &payload.name {
        validate_name(name)?;
        if let Some(existing) = db::categories::find_by_name(&state.pool, name)
            .await
            .map_err(AppError::fetch)?
            && existing.id != id
        {
            return Err(AppError::conflict(format!(
                "Category name '{name}' already exists"
            )));
        }
    }
    if let Some(display_name) = &payload.display_name {
        validation::validate_required_text(display_name, "displayName", validation::MAX_NAME_LEN)?;
    }
    validation::validate_optional_text(
        &payload.description,
        "description",
        validation::MAX_TEXT_LEN,
    )?;

    let updated = db::categories::update(&state.pool, &id, &payload, db::now_millis())
        .await
        .map_err(AppError::update)?;
    if !updated {
        return Err(AppError::not_found(format!("Category {id} not found")));
    }

    let category = db::categories::find_by_id(&state.pool, &id)
        .await
        .map_err(AppError::fetch)?
        .ok_or_else(|| AppError::not_found(format!("Category {id} not found")))?;
    Ok(Json(ApiResponse::ok_with_message(category, "Category updated")))
}

/// DELETE /api/categories/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<bool>>> {
    let category = db::categories::find_by_id(&state.pool, &id)
        .await
        .map_err(AppError::fetch)?
        .ok_or_else(|| AppError::not_found(format!("Category {id} not found")))?;

    if category.name.eq_ignore_ascii_case(ALL_CATEGORY) {
        return Err(AppError::conflict("Category 'all' is reserved and cannot be deleted"));
    }

    let referenced = db::categories::menu_item_count(&state.pool, &id)
        .await
        .map_err(AppError::fetch)?;
    if referenced > 0 {
        return Err(AppError::conflict(format!(
            "Category {id} is referenced by {referenced} menu item(s)"
        )));
    }

    let deleted = db::categories::delete(&state.pool, &id)
        .await
        .map_err(AppError::delete)?;
    Ok(Json(ApiResponse::ok_with_message(deleted, "Category deleted")))
}

fn validate_name(name: &str) -> AppResult<()> {
    validation::validate_name(name, "name")?;
    if name.eq_ignore_ascii_case(ALL_CATEGORY) {
        return Err(AppError::validation("Category name 'all' is reserved"));
    }
    Ok(())
}
