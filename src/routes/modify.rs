//! Editing and bulk-deleting stored food entries.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::db::{self, FoodPayload};
use crate::errors::ApiError;
use crate::routes::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/edit-food", post(edit_food))
        .route("/delete-log", post(delete_log))
}

#[derive(Debug, Deserialize)]
pub struct EditFoodRequest {
    pub food_id: Uuid,
    #[serde(flatten)]
    pub fields: FoodPayload,
}

/// Overwrite the nutrition fields of one of the caller's entries
async fn edit_food(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<EditFoodRequest>,
) -> Result<Json<Value>, ApiError> {
    let entry = db::update_food(&state.pool, user.user_id, body.food_id, &body.fields)
        .await?
        .ok_or_else(|| ApiError::not_found("Food not found"))?;

    Ok(Json(json!({
        "success": true,
        "message": "Food edited successfully",
        "data": entry,
    })))
}

/// Delete a batch of the caller's entries by id
async fn delete_log(
    State(state): State<AppState>,
    user: AuthUser,
    Json(food_ids): Json<Vec<Uuid>>,
) -> Result<Json<Value>, ApiError> {
    let deleted = db::delete_foods(&state.pool, user.user_id, &food_ids).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Log deleted successfully",
        "deleted": deleted,
    })))
}
