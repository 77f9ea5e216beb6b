//! Signup and signin endpoints.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use log::{error, info};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{hash_password, issue_token, verify_password};
use crate::db::{self, CreateUserError, User};
use crate::errors::ApiError;
use crate::routes::AppState;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 20;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(sign_up))
        .route("/signin", post(sign_in))
}

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Public view of a user, safe to return to clients
fn user_json(user: &User) -> Value {
    json!({
        "id": user.id,
        "email": user.email,
        "username": user.username,
        "created_at": user.created_at,
    })
}

async fn sign_up(
    State(state): State<AppState>,
    Json(body): Json<SignUpRequest>,
) -> Result<Json<Value>, ApiError> {
    if !body.email.contains('@') {
        return Err(ApiError::bad_request("Invalid email format"));
    }

    if body.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(
            "Password must be at least 6 characters",
        ));
    }

    let username_len = body.username.chars().count();
    if !(MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&username_len) {
        return Err(ApiError::bad_request("Username must be 3-20 characters"));
    }

    let password_hash = hash_password(&body.password)?;

    let user = db::create_user(&state.pool, &body.email, &body.username, &password_hash)
        .await
        .map_err(|e| match e {
            CreateUserError::DuplicateEmail => {
                ApiError::bad_request("This email address already exists")
            }
            CreateUserError::DuplicateUsername => {
                ApiError::bad_request("This username is already taken")
            }
            CreateUserError::Database(e) => {
                error!("Signup failed: {}", e);
                ApiError::bad_request("Signup failed. Please try again")
            }
        })?;

    info!("New user signed up: {}", user.id);

    Ok(Json(json!({
        "message": "User created successfully",
        "user": user_json(&user),
    })))
}

async fn sign_in(
    State(state): State<AppState>,
    Json(body): Json<SignInRequest>,
) -> Result<Json<Value>, ApiError> {
    let invalid = || ApiError::unauthorized("Invalid email or password");

    let user = db::find_user_by_email(&state.pool, &body.email)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&body.password, &user.password_hash) {
        return Err(invalid());
    }

    let access_token = issue_token(user.id, &user.email, &state.config.jwt_secret)?;

    info!("User signed in: {}", user.id);

    Ok(Json(json!({
        "access_token": access_token,
        "user": user_json(&user),
    })))
}
