use anyhow::Result;
use log::info;
use sqlx::postgres::PgPoolOptions;

use nutrition_wallet::config::AppConfig;
use nutrition_wallet::ocr_client::OcrClient;
use nutrition_wallet::routes::{self, AppState};
use nutrition_wallet::db;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    info!("Starting Nutrition Wallet backend");

    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let config = AppConfig::from_env()?;

    info!("Connecting to database");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    db::init_database_schema(&pool).await?;

    let ocr = OcrClient::new(
        &config.vision_endpoint,
        &config.vision_key,
        config.ocr.clone(),
    );

    let bind_addr = config.bind_addr.clone();
    let app = routes::build_router(AppState { pool, ocr, config });

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
