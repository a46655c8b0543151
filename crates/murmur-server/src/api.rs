use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use murmur_relay::{Relay, Transport};
use murmur_shared::protocol::InboundEvent;

use crate::error::ApiError;

pub struct AppState<T> {
    pub relay: Arc<Relay<T>>,
    pub webhook_token: Option<Arc<str>>,
}

impl<T> Clone for AppState<T> {
    fn clone(&self) -> Self {
        Self {
            relay: self.relay.clone(),
            webhook_token: self.webhook_token.clone(),
        }
    }
}

pub fn build_router<T: Transport>(state: AppState<T>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/events", post(receive_event::<T>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Accept one event from the gateway and process it before answering.
async fn receive_event<T: Transport>(
    headers: HeaderMap,
    State(state): State<AppState<T>>,
    Json(event): Json<InboundEvent>,
) -> Result<StatusCode, ApiError> {
    verify_webhook_token(&headers, state.webhook_token.as_deref())?;

    debug!(user = %event.actor.id, "inbound event");
    state.relay.handle(event).await?;
    Ok(StatusCode::ACCEPTED)
}

fn verify_webhook_token(headers: &HeaderMap, expected: Option<&str>) -> Result<(), ApiError> {
    let Some(expected) = expected else {
        return Ok(());
    };

    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or(auth);

    use subtle::ConstantTimeEq;
    let token_bytes = token.as_bytes();
    let expected_bytes = expected.as_bytes();
    if token_bytes.len() != expected_bytes.len()
        || token_bytes.ct_eq(expected_bytes).unwrap_u8() != 1
    {
        return Err(ApiError::Unauthorized);
    }

    Ok(())
}

pub async fn serve<T: Transport>(state: AppState<T>, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting webhook server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
