use std::sync::Arc;

use storefront_api::catalog::ProductService;
use storefront_api::config::AppConfig;
use storefront_api::handlers::{router, AppState};
use storefront_api::imaging::cloudinary::CloudinaryHost;
use storefront_api::orders::OrderService;
use storefront_api::store::postgres::{self, PostgresOrderStore, PostgresProductStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env();

    let pool = postgres::connect(&config.database).await?;
    let images = Arc::new(CloudinaryHost::new(&config.imaging));
    let products = ProductService::new(
        Arc::new(PostgresProductStore::new(pool.clone())),
        images,
        &config,
    );
    let orders = OrderService::new(Arc::new(PostgresOrderStore::new(pool.clone())), &config);

    let app = router(AppState {
        pool,
        products,
        orders,
    });

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("storefront API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
