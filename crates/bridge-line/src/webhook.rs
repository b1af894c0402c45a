//! Webhook server for LINE Bot
//!
//! Handles incoming webhooks from LINE Messaging API

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use futures::future::join_all;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::error::{LineError, Result};
use crate::handler::{EventOutcome, MessageHandler};
use crate::types::WebhookBody;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the request signature
pub const SIGNATURE_HEADER: &str = "x-line-signature";

/// Webhook server state
#[derive(Clone)]
pub struct WebhookState {
    pub channel_secret: String,
    pub handler: Arc<MessageHandler>,
}

/// Create webhook router
pub fn create_webhook_router(state: WebhookState) -> Router {
    Router::new()
        .route("/", get(keep_alive))
        .route("/webhook", post(handle_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Keep-alive endpoint for uptime pingers
async fn keep_alive() -> &'static str {
    "OK"
}

/// Handle incoming webhook
async fn handle_webhook(
    State(state): State<Arc<WebhookState>>,
    headers: HeaderMap,
    body: Bytes,
) -> std::result::Result<Json<Vec<EventOutcome>>, StatusCode> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            warn!("Missing {} header", SIGNATURE_HEADER);
            StatusCode::BAD_REQUEST
        })?;

    if verify_signature(&state.channel_secret, &body, signature).is_err() {
        warn!("Invalid signature");
        return Err(StatusCode::UNAUTHORIZED);
    }

    let webhook: WebhookBody = serde_json::from_slice(&body).map_err(|e| {
        error!("Failed to parse webhook body: {:?}", e);
        StatusCode::BAD_REQUEST
    })?;

    debug!(
        "Received {} event(s) for destination: {}",
        webhook.events.len(),
        webhook.destination
    );

    let outcomes = join_all(
        webhook
            .events
            .iter()
            .map(|event| state.handler.process_event(event)),
    )
    .await;

    Ok(Json(outcomes))
}

/// Verify LINE signature (base64 HMAC-SHA256 of the raw body)
pub fn verify_signature(channel_secret: &str, body: &[u8], signature: &str) -> Result<()> {
    let expected = STANDARD
        .decode(signature)
        .map_err(|_| LineError::InvalidSignature)?;

    let mut mac = HmacSha256::new_from_slice(channel_secret.as_bytes())
        .map_err(|_| LineError::InvalidSignature)?;
    mac.update(body);
    mac.verify_slice(&expected)
        .map_err(|_| LineError::InvalidSignature)
}

/// Start webhook server, serving until `shutdown` resolves
pub async fn start_webhook_server<F>(state: WebhookState, port: u16, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_webhook_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| LineError::Webhook(e.to_string()))?;

    info!("LINE webhook server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| LineError::Webhook(e.to_string()))?;

    Ok(())
}
