use std::sync::Arc;

use mockfile::{
    build_app, config::Config, domain::validation::DefaultValidator, logging,
    storage::LocalFileStore, AppState,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging();

    let config = Config::from_env()?;
    let store = LocalFileStore::open(config.data_dir.clone()).await?;

    let bind_socket = config.bind_socket()?;
    let state = AppState::new(
        Arc::new(store),
        Arc::new(DefaultValidator),
        config.management_path.clone(),
    );
    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(bind_socket).await?;

    info!(
        bind_addr = %config.bind_addr,
        bind_port = config.bind_port,
        data_dir = %config.data_dir.display(),
        "server starting"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
