use backend::{
    build_rocket,
    config::Config,
    persist::{flush, run_persist_task},
    routes::AppState,
    store::PollStore,
};
use tokio::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[rocket::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🚀 Starting live poll server");
    let config = Config::load();

    let store = PollStore::load(&config.data_file)?;
    let state = AppState::new(store, &config);
    let store = state.store.clone();

    tokio::spawn(run_persist_task(
        store.clone(),
        config.data_file.clone(),
        Duration::from_secs(config.persist_interval_secs.max(1)),
    ));

    let _rocket = build_rocket(state).launch().await?;

    info!("Shutting down, flushing polls");
    if let Err(e) = flush(&store, &config.data_file).await {
        error!("Final flush failed: {}", e);
    }
    Ok(())
}
