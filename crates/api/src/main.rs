use anyhow::{Context, Result};
use persistence::repositories::UserRepository;
use rustdesk_admin_api::{
    app, config,
    middleware::{init_metrics, logging::init_logging},
    services::{admin_bootstrap::bootstrap_admin, email::EmailService},
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = config::Config::load().context("failed to load configuration")?;

    init_logging(&config.logging).context("failed to initialize logging")?;
    init_metrics().context("failed to install metrics recorder")?;

    info!("Starting RustDesk admin API v{}", env!("CARGO_PKG_VERSION"));

    let pool = persistence::db::create_pool(&config.database.pool_settings()).await?;

    info!("Running database migrations...");
    sqlx::migrate!("../persistence/src/migrations")
        .run(&pool)
        .await?;
    info!("Migrations completed");

    bootstrap_admin(&UserRepository::new(pool.clone()), &config.admin).await?;

    let email = EmailService::from_config(pool.clone(), &config.smtp)?;
    info!(provider = email.provider(), "Mail transport ready");

    let addr = config.socket_addr()?;
    let app = app::create_app(config, pool, email);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
