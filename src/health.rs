//! Liveness endpoint.
//!
//! `GET /health` reports 200 while the gateway connection is healthy,
//! 500 otherwise.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Shared state for the liveness endpoint.
#[derive(Clone)]
pub struct HealthState {
    /// Set by the gateway handler while the shard is connected.
    pub connected: Arc<AtomicBool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Liveness {
    pub ok: bool,
}

async fn health_handler(State(state): State<HealthState>) -> (StatusCode, Json<Liveness>) {
    let ok = state.connected.load(Ordering::Relaxed);
    let status = if ok {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(Liveness { ok }))
}

/// Create the liveness router.
pub fn router(state: HealthState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Serve the liveness endpoint on the given port.
pub async fn serve(state: HealthState, port: u16) -> anyhow::Result<()> {
    let app = router(state);
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Liveness endpoint listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_liveness_body_shape() {
        assert_eq!(
            serde_json::to_string(&Liveness { ok: true }).unwrap(),
            r#"{"ok":true}"#
        );
        assert_eq!(
            serde_json::to_string(&Liveness { ok: false }).unwrap(),
            r#"{"ok":false}"#
        );
    }

    #[tokio::test]
    async fn test_handler_reports_connection_flag() {
        let state = HealthState {
            connected: Arc::new(AtomicBool::new(false)),
        };

        let (status, Json(body)) = health_handler(State(state.clone())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.ok);

        state.connected.store(true, Ordering::Relaxed);
        let (status, Json(body)) = health_handler(State(state)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.ok);
    }
}
