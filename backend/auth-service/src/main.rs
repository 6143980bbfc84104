/// Arclight Auth Service - Main entry point
/// Provides both a REST API and a gRPC validation endpoint
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use chrono::Duration;
use redis::aio::ConnectionManager;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tonic::transport::Server as GrpcServer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use auth_service::{
    arclight::auth::v1::token_validation_server::TokenValidationServer,
    config::Config,
    grpc::TokenValidationService,
    handlers::{deactivate_user, get_me, list_users, login, logout, refresh_token, register},
    services::NotificationDispatcher,
    AppState,
};
use token_core::{RedisRevocationStore, TokenCodec, TokenLifetimes, TokenService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;

    tracing::info!(
        "Starting Arclight Auth Service on {}:{}",
        config.server_host,
        config.server_port
    );

    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Database connection pool initialized");

    let redis_client = redis::Client::open(config.redis_url.clone())?;
    let redis_conn = ConnectionManager::new(redis_client).await?;

    tracing::info!("Redis connection initialized");

    // The signing key is loaded once here and immutable for the process
    // lifetime; both transports share this single TokenService.
    let codec = TokenCodec::new(&config.jwt_secret)?;
    let lifetimes = TokenLifetimes {
        access: Duration::seconds(config.access_token_ttl_secs),
        refresh: Duration::seconds(config.refresh_token_ttl_secs),
    };
    let tokens = Arc::new(TokenService::new(
        codec,
        Arc::new(RedisRevocationStore::new(redis_conn.clone())),
        lifetimes,
    ));

    let notifications = NotificationDispatcher::new(redis_conn, config.notification_stream.clone());

    let app_state = AppState {
        db: db_pool,
        tokens: Arc::clone(&tokens),
        notifications,
    };

    let rest_router = Router::new()
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/logout", post(logout))
        .route("/api/v1/auth/refresh", post(refresh_token))
        .route("/api/v1/users/me", get(get_me))
        .route("/api/v1/admin/users", get(list_users))
        .route("/api/v1/admin/users/:id/deactivate", post(deactivate_user))
        .route("/health", get(health_check))
        .route("/readiness", get(readiness_check))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let grpc_service = TokenValidationServer::new(TokenValidationService::new(tokens));

    let rest_addr: SocketAddr =
        format!("{}:{}", config.server_host, config.server_port).parse()?;
    let grpc_addr: SocketAddr = format!("{}:{}", config.server_host, config.grpc_port).parse()?;

    let rest_listener = TcpListener::bind(&rest_addr).await?;
    tracing::info!("REST API listening on {}", rest_addr);

    let rest_handle = tokio::spawn(async move {
        axum::serve(rest_listener, rest_router)
            .await
            .expect("REST server failed");
    });

    tracing::info!("gRPC server listening on {}", grpc_addr);
    let grpc_handle = tokio::spawn(async move {
        GrpcServer::builder()
            .add_service(grpc_service)
            .serve(grpc_addr)
            .await
            .expect("gRPC server failed");
    });

    tokio::select! {
        _ = rest_handle => {
            tracing::error!("REST server stopped");
        }
        _ = grpc_handle => {
            tracing::error!("gRPC server stopped");
        }
    }

    Ok(())
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Readiness check endpoint
async fn readiness_check() -> &'static str {
    "READY"
}
