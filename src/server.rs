//! HTTP transport for Telegram webhook deliveries.

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::bot::Dispatcher;
use crate::error::Error;
use crate::store::StoreOpener;
use crate::telegram::Messenger;
use crate::translation::Translator;

/// Builds the webhook router.
///
/// `POST /webhook` answers `200` once the reply was sent and also for updates
/// without a text message, which get no reply. Bodies that are not an update
/// at all get `400` and collaborator failures `500`. Telegram redelivers every
/// non-`2xx` answer, so only those two cases are retried.
pub fn router<O, T, M>(dispatcher: Arc<Dispatcher<O, T, M>>) -> Router
where
    O: StoreOpener,
    T: Translator,
    M: Messenger,
{
    Router::new()
        .route("/webhook", post(webhook::<O, T, M>))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(dispatcher)
}

async fn webhook<O, T, M>(
    State(dispatcher): State<Arc<Dispatcher<O, T, M>>>,
    body: Bytes,
) -> StatusCode
where
    O: StoreOpener,
    T: Translator,
    M: Messenger,
{
    match dispatcher.dispatch(&body).await {
        Ok(_) => StatusCode::OK,
        Err(e @ Error::Payload(_)) => {
            error!(error = %e, "Rejected webhook update");
            StatusCode::BAD_REQUEST
        }
        Err(e) => {
            error!(error = %e, "Failed to handle webhook update");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

async fn health() -> &'static str {
    "ok"
}
