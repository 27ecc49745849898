use std::sync::Arc;

use axum::{
    middleware,
    routing::{any, get},
    Router,
};

pub mod config;
pub mod domain;
pub mod errors;
pub mod http;
pub mod logging;
pub mod storage;

use domain::validation::EntityValidator;
use storage::MockStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MockStore>,
    pub validator: Arc<dyn EntityValidator>,
    pub management_path: Arc<str>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn MockStore>,
        validator: Arc<dyn EntityValidator>,
        management_path: String,
    ) -> Self {
        Self {
            store,
            validator,
            management_path: Arc::<str>::from(management_path),
        }
    }
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(http::handlers::health))
        .route("/mock/api/mock", any(http::handlers::mock_collection))
        .route(
            "/mock/api/mock/data/{name}",
            get(http::handlers::read_content),
        )
        .route("/mock/api/mock/{name}", any(http::handlers::mock_crud))
        .layer(middleware::from_fn(logging::request_logging_middleware))
        .with_state(state)
}
