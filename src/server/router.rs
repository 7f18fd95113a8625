use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{
    Router,
    routing::{get, post},
};

use super::catalog::catalog_router;
use super::{login, pages};
use crate::config::{ServerConfig, SessionConfig};
use crate::store::Store;
use crate::types::DeletePolicy;

/// Shared state handed to every handler. Built once at startup.
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub session: SessionConfig,
    pub delete_policy: DeletePolicy,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: &ServerConfig) -> Self {
        Self {
            store,
            session: config.session.clone(),
            delete_policy: config.delete_policy,
        }
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(pages::landing))
        .route("/health", get(health))
        .route("/login", get(login::login_form).post(login::login))
        .route("/logout", post(login::logout))
        .merge(catalog_router())
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
