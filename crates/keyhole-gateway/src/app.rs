use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::future::Future;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::handlers::{
    create_handler, health_handler, resolve_file, resolve_image, resolve_link, resolve_text,
};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        let body_limit = state.max_upload_bytes();

        Router::new()
            .route("/health", get(health_handler))
            .route("/create", post(create_handler))
            .route("/link/{id}", get(resolve_link))
            .route("/l/{id}", get(resolve_link))
            .route("/text/{id}", get(resolve_text))
            .route("/t/{id}", get(resolve_text))
            .route("/image/{filename}", get(resolve_image))
            .route("/i/{filename}", get(resolve_image))
            .route("/file/{filename}", get(resolve_file))
            .route("/f/{filename}", get(resolve_file))
            .layer(DefaultBodyLimit::max(body_limit))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}

/// Resolves on ctrl-c. If the handler cannot be installed the server keeps running.
pub async fn shutdown_signal() {
    wait_for_shutdown(tokio::signal::ctrl_c()).await
}

async fn wait_for_shutdown<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(err) = signal.await {
        error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn shutdown_follows_the_signal() {
        tokio::time::timeout(Duration::from_secs(1), wait_for_shutdown(async { Ok(()) }))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn broken_signal_handler_does_not_shut_down() {
        let broken = async { Err(std::io::Error::other("no signal handler")) };

        let outcome = tokio::time::timeout(Duration::from_millis(50), wait_for_shutdown(broken)).await;
        assert!(outcome.is_err());
    }
}
