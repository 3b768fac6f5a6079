use actix_cors::Cors;
use actix_web::{http::header, web, App, HttpServer};
use dotenvy::dotenv;
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_actix_web::TracingLogger;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use ledgerkeep::config::{AppConfig, StoreKind};
use ledgerkeep::extractors::ApiCredentials;
use ledgerkeep::orchestrator::QueryOrchestrator;
use ledgerkeep::store::{LedgerStore, MemoryLedgerStore, PgLedgerStore};
use ledgerkeep::{openapi, routes};

fn startup_error(e: impl std::fmt::Display) -> std::io::Error {
    error!("Startup failed: {e}");
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
}

async fn connect_store(config: &AppConfig) -> std::io::Result<Arc<dyn LedgerStore>> {
    match (config.store, &config.database_url) {
        (StoreKind::Postgres, Some(url)) => {
            // Configure connection pool with production-ready settings
            let pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .min_connections(1)
                .acquire_timeout(Duration::from_secs(3))
                .idle_timeout(Duration::from_secs(600))
                .max_lifetime(Duration::from_secs(1800))
                .connect(url.expose_secret())
                .await
                .map_err(startup_error)?;

            let store = PgLedgerStore::new(pool);
            store.migrate().await.map_err(startup_error)?;
            store.ping().await.map_err(startup_error)?;
            info!("Connected to PostgreSQL store");
            Ok(Arc::new(store))
        }
        (StoreKind::Postgres, None) => Err(startup_error("DATABASE_URL must be set")),
        (StoreKind::Memory, _) => {
            info!("Using in-memory store; data is lost on exit");
            Ok(Arc::new(MemoryLedgerStore::new()))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    // Initialize tracing subscriber for structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().map_err(startup_error)?;

    let store = connect_store(&config).await?;
    let orchestrator = web::Data::new(QueryOrchestrator::new(store, config.operation_timeout));
    let credentials = web::Data::new(ApiCredentials::new(
        &config.auth_username,
        &config.auth_password,
    ));
    let allowed_origins = config.cors_allowed_origins.clone();

    info!(
        addr = %config.http_addr,
        timeout_secs = config.operation_timeout.as_secs(),
        "Starting server"
    );

    HttpServer::new(move || {
        let allowed_origins = allowed_origins.clone();

        // Configure CORS
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _req_head| {
                let origin_str = origin.to_str().unwrap_or("");
                allowed_origins.iter().any(|allowed| allowed == origin_str)
            })
            .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE])
            .expose_headers(vec![header::HeaderName::from_static("x-total-count")])
            .max_age(3600);

        App::new()
            // Middleware (order matters: outer to inner)
            .wrap(TracingLogger::default())
            .wrap(cors)
            // Shared state
            .app_data(orchestrator.clone())
            .app_data(credentials.clone())
            // Swagger UI
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
            )
            .configure(routes::configure)
    })
    .bind(config.http_addr.as_str())?
    .run()
    .await
}
