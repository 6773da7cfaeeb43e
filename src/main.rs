mod models;
mod service;
mod config;
mod dtos;
mod error;
mod db;
mod utils;
mod middleware;
mod handler;
mod routes;

use std::{net::SocketAddr, sync::Arc};

use axum::http::{header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE}, HeaderValue, Method};
use config::Config;
use db::{cache::connect_redis, memory::MemoryStore, DBClient, Store};
use dotenv::dotenv;
use redis::aio::ConnectionManager;
use routes::create_router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::EnvFilter;

use service::{
    property_service::PropertySearchService,
    reference_data::{ReferenceData, REFERENCE_DATA_TTL},
    view_service::PropertyViewService,
};

#[derive(Debug, Clone)]
pub struct AppState {
    pub env: Config,
    pub store: Arc<dyn Store>,
    pub search_service: Arc<PropertySearchService>,
    pub view_service: Arc<PropertyViewService>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn Store>, cache: Option<Arc<ConnectionManager>>) -> Self {
        let reference = Arc::new(ReferenceData::new(store.clone(), REFERENCE_DATA_TTL));
        let search_service = Arc::new(PropertySearchService::new(store.clone(), reference, cache));
        let view_service = Arc::new(PropertyViewService::new(store.clone()));

        Self {
            env: config,
            store,
            search_service,
            view_service,
        }
    }
}

async fn connect_store(config: &Config) -> Arc<dyn Store> {
    let Some(database_url) = &config.database_url else {
        tracing::warn!("DATABASE_URL not set - running on the in-memory store");
        return match &config.seed_file {
            Some(path) => match MemoryStore::load_seed_file(path) {
                Ok(store) => {
                    tracing::info!("Seeded in-memory store from {}", path);
                    Arc::new(store)
                }
                Err(e) => {
                    tracing::error!("🔥 {}", e);
                    std::process::exit(1);
                }
            },
            None => Arc::new(MemoryStore::new()),
        };
    };

    match PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(database_url)
        .await
    {
        Ok(pool) => {
            tracing::info!("✅ Connection to the database is successful!");
            Arc::new(DBClient::new(pool))
        }
        Err(err) => {
            tracing::error!("🔥 Failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match Config::init() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("🔥 Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let store = connect_store(&config).await;

    let cache = match &config.redis_url {
        Some(redis_url) => connect_redis(redis_url).await,
        None => {
            tracing::info!("Redis not configured - facets are computed on every request");
            None
        }
    };

    let allowed_origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT]);

    let app_state = Arc::new(AppState::new(config.clone(), store, cache));

    let app = create_router(app_state.clone()).layer(cors);

    tracing::info!(
        "🚀 Server is running on http://localhost:{} ({} store)",
        config.port,
        app_state.store.backend_name()
    );

    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{}", &config.port)).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("🔥 Failed to bind port {}: {}", config.port, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await {
        tracing::error!("Server error: {}", e);
    }
}
