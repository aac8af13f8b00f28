use axum::extract::DefaultBodyLimit;
use lawn_quote_backend::{
    config::{get_config, init_config},
    database::pool::{create_pool, run_migrations},
    middleware::cors::site_cors,
    routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,tower_http=info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    run_migrations(&pool).await?;

    let app_state = AppState::new(pool)?;

    if let Some(email) = config.bootstrap_admin_email.as_deref() {
        match app_state.user_service.promote_to_admin(email).await {
            Ok(true) => info!("promoted {} to admin", email),
            Ok(false) => info!("bootstrap admin {} already admin or not registered", email),
            Err(e) => tracing::warn!(error = %e, "could not promote bootstrap admin"),
        }
    }

    if config.stripe_secret_key.is_empty() || config.stripe_webhook_secret.is_empty() {
        tracing::warn!("Stripe keys not configured; checkout and webhooks will fail");
    }

    let app = routes::router(app_state)
        .layer(site_cors(&config.public_base_url))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(1024 * 1024));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
