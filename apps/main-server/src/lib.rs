//! TaskFlow Server
//!
//! REST backend for TaskFlow: accounts, projects with role-based team
//! membership, tasks and user preferences. Every mutating endpoint loads the
//! affected project, asks the membership model whether the requester may act,
//! and only then writes to the store.

pub mod api;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod services;
pub mod state;

use auth::JwtManager;
use axum::{
    Router,
    http::{
        HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
};
use task_store::TaskStore;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::state::{SharedState, create_shared_state};

/// Creates the application router with all routes configured.
pub fn create_app<S: TaskStore + 'static>(state: SharedState<S>) -> Router {
    let cors = cors_layer(state.config.cors_origin.as_deref());

    api::create_router(state.clone())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Allows a single configured origin with credentials, or any origin.
fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let origin = origin.and_then(|origin| match origin.parse::<HeaderValue>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(origin, "Ignoring invalid CORS origin");
            None
        }
    });

    match origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([AUTHORIZATION, CONTENT_TYPE]),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    }
}

/// Creates the application state with the given configuration and store.
pub fn create_state<S: TaskStore>(config: Config, store: S) -> SharedState<S> {
    let jwt_manager = JwtManager::new(config.jwt_config());
    create_shared_state(config, store, jwt_manager)
}

/// Initializes tracing with the given log level.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
