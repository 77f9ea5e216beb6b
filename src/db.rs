//! # Database Module
//!
//! Postgres persistence for users and stored food entries. The schema is
//! initialized at startup with idempotent DDL; everything else is small
//! per-operation async functions over a shared [`PgPool`].

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A registered user
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A stored food entry: parsed nutrition fields plus a source tag
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct FoodEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub food_name: Option<String>,
    pub serving_size: Option<f64>,
    pub serving_unit: Option<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub sugars: Option<f64>,
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Nutrition fields as accepted from clients when saving or editing a food
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodPayload {
    pub food_name: Option<String>,
    pub serving_size: Option<f64>,
    pub serving_unit: Option<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub sugars: Option<f64>,
    pub source: Option<String>,
}

/// Why creating a user failed
#[derive(Debug)]
pub enum CreateUserError {
    DuplicateEmail,
    DuplicateUsername,
    Database(sqlx::Error),
}

impl std::fmt::Display for CreateUserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CreateUserError::DuplicateEmail => write!(f, "email already registered"),
            CreateUserError::DuplicateUsername => write!(f, "username already taken"),
            CreateUserError::Database(e) => write!(f, "database error: {e}"),
        }
    }
}

impl std::error::Error for CreateUserError {}

/// Initialize the database schema
pub async fn init_database_schema(pool: &PgPool) -> Result<()> {
    info!("Initializing database schema...");

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create users table")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS foods (
            id UUID PRIMARY KEY,
            user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            food_name TEXT,
            serving_size DOUBLE PRECISION,
            serving_unit TEXT,
            calories DOUBLE PRECISION,
            protein DOUBLE PRECISION,
            carbs DOUBLE PRECISION,
            sugars DOUBLE PRECISION,
            source TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create foods table")?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS foods_user_created_idx
         ON foods (user_id, created_at DESC)",
    )
    .execute(pool)
    .await
    .context("Failed to create foods index")?;

    info!("Database schema initialized successfully");
    Ok(())
}

/// Create a new user, reporting duplicate email/username distinctly
pub async fn create_user(
    pool: &PgPool,
    email: &str,
    username: &str,
    password_hash: &str,
) -> Result<User, CreateUserError> {
    info!("Creating user for email: {}", email);

    let result = sqlx::query_as::<_, User>(
        "INSERT INTO users (id, email, username, password_hash)
         VALUES ($1, $2, $3, $4)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(username)
    .bind(password_hash)
    .fetch_one(pool)
    .await;

    match result {
        Ok(user) => {
            info!("User created with id: {}", user.id);
            Ok(user)
        }
        Err(e) => match e.as_database_error().and_then(|db| db.constraint()) {
            Some("users_email_key") => Err(CreateUserError::DuplicateEmail),
            Some("users_username_key") => Err(CreateUserError::DuplicateUsername),
            _ => Err(CreateUserError::Database(e)),
        },
    }
}

/// Look up a user by email
pub async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
        .context("Failed to look up user by email")
}

/// Insert a food entry for a user
pub async fn insert_food(
    pool: &PgPool,
    user_id: Uuid,
    payload: &FoodPayload,
) -> Result<FoodEntry> {
    info!("Inserting food entry for user: {}", user_id);

    let entry = sqlx::query_as::<_, FoodEntry>(
        "INSERT INTO foods (id, user_id, food_name, serving_size, serving_unit,
                            calories, protein, carbs, sugars, source)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(&payload.food_name)
    .bind(payload.serving_size)
    .bind(&payload.serving_unit)
    .bind(payload.calories)
    .bind(payload.protein)
    .bind(payload.carbs)
    .bind(payload.sugars)
    .bind(&payload.source)
    .fetch_one(pool)
    .await
    .context("Failed to insert food entry")?;

    info!("Food entry created with id: {}", entry.id);
    Ok(entry)
}

/// List a user's food entries, newest first
pub async fn list_foods(pool: &PgPool, user_id: Uuid) -> Result<Vec<FoodEntry>> {
    sqlx::query_as::<_, FoodEntry>(
        "SELECT * FROM foods WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("Failed to list food entries")
}

/// Update the nutrition fields of one of the user's food entries.
///
/// Returns the updated entry, or `None` if the entry does not exist or
/// belongs to another user.
pub async fn update_food(
    pool: &PgPool,
    user_id: Uuid,
    food_id: Uuid,
    payload: &FoodPayload,
) -> Result<Option<FoodEntry>> {
    info!("Updating food entry {} for user {}", food_id, user_id);

    sqlx::query_as::<_, FoodEntry>(
        "UPDATE foods
         SET food_name = $1, serving_size = $2, serving_unit = $3, calories = $4,
             protein = $5, carbs = $6, sugars = $7, source = $8
         WHERE id = $9 AND user_id = $10
         RETURNING *",
    )
    .bind(&payload.food_name)
    .bind(payload.serving_size)
    .bind(&payload.serving_unit)
    .bind(payload.calories)
    .bind(payload.protein)
    .bind(payload.carbs)
    .bind(payload.sugars)
    .bind(&payload.source)
    .bind(food_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .context("Failed to update food entry")
}

/// Delete one of the user's food entries; `true` if a row was removed
pub async fn delete_food(pool: &PgPool, user_id: Uuid, food_id: Uuid) -> Result<bool> {
    info!("Deleting food entry {} for user {}", food_id, user_id);

    let result = sqlx::query("DELETE FROM foods WHERE id = $1 AND user_id = $2")
        .bind(food_id)
        .bind(user_id)
        .execute(pool)
        .await
        .context("Failed to delete food entry")?;

    Ok(result.rows_affected() > 0)
}

/// Bulk-delete the user's food entries by id; returns how many were removed
pub async fn delete_foods(pool: &PgPool, user_id: Uuid, food_ids: &[Uuid]) -> Result<u64> {
    info!(
        "Deleting {} food entries for user {}",
        food_ids.len(),
        user_id
    );

    let result = sqlx::query("DELETE FROM foods WHERE user_id = $1 AND id = ANY($2)")
        .bind(user_id)
        .bind(food_ids.to_vec())
        .execute(pool)
        .await
        .context("Failed to bulk-delete food entries")?;

    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_food_payload_deserializes_partial_body() {
        let payload: FoodPayload = serde_json::from_str(
            r#"{ "calories": 120.0, "serving_unit": "g", "source": "scan" }"#,
        )
        .unwrap();

        assert_eq!(payload.calories, Some(120.0));
        assert_eq!(payload.serving_unit, Some("g".to_string()));
        assert_eq!(payload.source, Some("scan".to_string()));
        assert_eq!(payload.food_name, None);
        assert_eq!(payload.protein, None);
    }

    #[test]
    fn test_create_user_error_display() {
        assert_eq!(
            CreateUserError::DuplicateEmail.to_string(),
            "email already registered"
        );
        assert_eq!(
            CreateUserError::DuplicateUsername.to_string(),
            "username already taken"
        );
    }
}
