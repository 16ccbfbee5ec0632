use address_book::{ Config, Result };
use axum::{ Router, routing::{ get, post } };
use migration::{ Migrator, MigratorTrait };
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{ layer::SubscriberExt, util::SubscriberInitExt };

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber
        ::registry()
        .with(
            tracing_subscriber::EnvFilter
                ::try_from_default_env()
                .unwrap_or_else(|_| "address_book=debug,tower_http=debug".into())
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| address_book::AppError::Config(e.to_string()))?;

    tracing::info!("Starting address-book API");

    // Initialize database connection
    let db = sea_orm::Database
        ::connect(&config.database_url).await
        .map_err(address_book::AppError::Database)?;

    tracing::info!("Database connected successfully");

    // Ensure the schema exists before serving requests
    Migrator::up(&db, None).await.map_err(address_book::AppError::Database)?;

    tracing::info!("Migrations completed successfully");

    // Initialize service
    let address_service = Arc::new(
        address_book::services::AddressService::new(Arc::new(db))
    );

    // Create app state
    let app_state = address_book::api::AppState::new(address_service);

    // Build application router; /addresses/nearby is a static segment and
    // wins over the {id} capture
    let app = Router::new()
        .route("/health", get(health_check))
        .route(
            "/addresses",
            post(address_book::api::address::create_address).get(
                address_book::api::address::list_addresses
            )
        )
        .route("/addresses/nearby", get(address_book::api::address::find_nearby_addresses))
        .route(
            "/addresses/{id}",
            get(address_book::api::address::get_address)
                .put(address_book::api::address::update_address)
                .delete(address_book::api::address::delete_address)
        )
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = format!("{}:{}", config.server_host, config.server_port);
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener
        ::bind(&addr).await
        .map_err(|e| address_book::AppError::Internal(e.to_string()))?;

    axum::serve(listener, app).await.map_err(|e| address_book::AppError::Internal(e.to_string()))?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
