use chrono::{Local, Timelike};
use lumo::handlers::opening_mood;
use lumo::rollover::today;
use lumo::{AppState, Config, Repository, router};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    let repo = Repository::open(config.data_path.clone()).await;
    info!(path = %config.data_path.display(), keys = repo.keys().len(), "store loaded");

    let mood = opening_mood(&repo, today(), Local::now().hour());
    let state = AppState::new(repo, config.bridge(), config.mood_revert, mood);
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
