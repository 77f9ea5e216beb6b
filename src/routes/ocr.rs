//! Label scanning endpoints: OCR a photographed nutrition label and save
//! the extracted facts.

use axum::extract::{Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use log::info;
use serde_json::{json, Value};

use crate::auth::AuthUser;
use crate::db::{self, FoodPayload};
use crate::errors::ApiError;
use crate::label_parser::parse_nutrition_label;
use crate::ocr_client::validate_upload;
use crate::routes::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/scan-label", post(scan_label))
        .route("/save-food", post(save_food))
}

/// Upload a nutrition label image, run it through the OCR provider, and
/// return the parsed nutrition facts with a confidence tier.
async fn scan_label(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let image = read_file_field(&mut multipart).await?;
    validate_upload(&image, &state.config.ocr)?;

    info!(
        "Scanning label for user {} ({} byte image)",
        user.user_id,
        image.len()
    );

    let raw_text = state.ocr.extract_text(image).await?;
    let record = parse_nutrition_label(&raw_text);

    Ok(Json(json!({
        "success": true,
        "raw_text": raw_text,
        "nutrition_data": record,
        "confidence": record.confidence(),
        "fields_found": record.fields_found(),
    })))
}

/// Persist parsed nutrition data for the caller
async fn save_food(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<FoodPayload>,
) -> Result<Json<Value>, ApiError> {
    let entry = db::insert_food(&state.pool, user.user_id, &payload).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Food saved successfully",
        "data": entry,
    })))
}

/// Pull the uploaded image bytes out of the multipart body's `file` field
async fn read_file_field(multipart: &mut Multipart) -> Result<Vec<u8>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid upload: {e}")))?
    {
        if field.name() == Some("file") {
            return field
                .bytes()
                .await
                .map(|bytes| bytes.to_vec())
                .map_err(|e| ApiError::bad_request(format!("Could not read upload: {e}")));
        }
    }

    Err(ApiError::bad_request("Missing 'file' field in upload"))
}
