use portfolio_client::{
    api::ApiClient, carousel::Carousel, router, ui::SLIDES, AppState, Config, LocalCache,
    SessionController,
};
use std::net::SocketAddr;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env()?;

    let mut cache = LocalCache::load(&config.cache_path).await;
    if cache.ensure_defaults() {
        if let Err(err) = cache.persist().await {
            error!("failed to write cache defaults: {err}");
        }
    }

    let api = ApiClient::new(config.api_url.clone())?;
    let session = SessionController::new(api, cache);
    session.initialize().await;

    let state = AppState::new(session, Carousel::new(SLIDES.len()));
    let rotation = state.carousel.spawn_rotation(config.carousel_interval);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    info!("talking to {}; listening on http://{addr}", config.api_url);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    rotation.abort();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
