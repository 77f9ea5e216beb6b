//! Stored food listing and deletion.

use axum::extract::{Path, State};
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::db;
use crate::errors::ApiError;
use crate::routes::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_user_foods))
        .route("/:food_id", delete(delete_food))
}

/// All of the caller's foods, newest first
async fn get_user_foods(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let foods = db::list_foods(&state.pool, user.user_id).await?;

    Ok(Json(json!({
        "success": true,
        "count": foods.len(),
        "data": foods,
    })))
}

/// Delete one of the caller's foods
async fn delete_food(
    State(state): State<AppState>,
    user: AuthUser,
    Path(food_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let deleted = db::delete_food(&state.pool, user.user_id, food_id).await?;

    if !deleted {
        return Err(ApiError::not_found("Food not found"));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Food deleted successfully",
    })))
}
