use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{audit, health, mail, users};
use crate::services::email::EmailService;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub email: Arc<EmailService>,
}

pub fn create_app(config: Config, pool: PgPool, email: EmailService) -> Router {
    create_app_with_state(AppState {
        pool,
        config: Arc::new(config),
        email: Arc::new(email),
    })
}

pub fn create_app_with_state(state: AppState) -> Router {
    let config = state.config.clone();

    let cors = if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let admin_routes = Router::new()
        // Audit
        .route("/admin/audit/list", get(audit::list))
        .route("/admin/audit/file-transfer-list", get(audit::file_transfer_list))
        // Users
        .route("/admin/users/list", get(users::list))
        .route("/admin/users/add", post(users::add))
        .route("/admin/users/edit", post(users::edit))
        .route("/admin/users/delete", post(users::delete))
        .route("/admin/users/totp", post(users::totp))
        // Mail
        .route("/admin/mail/send", post(mail::send))
        .route("/admin/mail/logs/list", get(mail::logs_list))
        .route("/admin/mail/logs/info", get(mail::logs_info));

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        // Bottom layers run first
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
