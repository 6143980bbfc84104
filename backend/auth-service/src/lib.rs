// Arclight Auth Service Library

pub mod config;
pub mod db;
pub mod error;
pub mod grpc;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod security;
pub mod services;

pub use error::{ApiError, Result};

use std::sync::Arc;

use token_core::TokenService;

use services::NotificationDispatcher;

/// Generated gRPC types for the validation endpoint.
pub mod arclight {
    pub mod auth {
        pub mod v1 {
            tonic::include_proto!("arclight.auth.v1");
        }
    }
}

/// Shared application state for HTTP handlers and the gRPC service.
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub tokens: Arc<TokenService>,
    pub notifications: NotificationDispatcher,
}
