use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::api;
use crate::state::{AppState, Engine, EngineHandle};

/// Options for [`start_server`].
#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub host: String,
    pub port: u16,
    pub cors: bool,
}

impl Default for ServeOptions {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors: true,
        }
    }
}

/// Build the full application router around an engine.
pub fn build_router(engine: Engine, cors: bool) -> Router {
    let state = Arc::new(AppState {
        engine: EngineHandle::new(engine),
    });

    let mut app = api::api_router()
        .fallback(not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if cors {
        app = app.layer(CorsLayer::permissive());
    }
    app
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({"error": "Not found"})))
}

/// Bind and serve until Ctrl+C.
pub async fn start_server(engine: Engine, options: ServeOptions) -> Result<()> {
    let app = build_router(engine, options.cors);

    let addr = format!("{}:{}", options.host, options.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    let local_addr = listener.local_addr()?;
    info!(%local_addr, cors = options.cors, "BugSage API listening");
    println!("BugSage API running at http://{local_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // Without a handler there is no shutdown trigger; keep serving.
        warn!(error = %e, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, header};
    use tower::ServiceExt;

    use bugsage_lifecycle::{EngineSettings, LifecycleEngine};
    use bugsage_storage::SqliteStore;

    fn test_router(cors: bool) -> Router {
        let store = SqliteStore::open_in_memory().unwrap();
        build_router(LifecycleEngine::new(store, EngineSettings::default()), cors)
    }

    #[tokio::test]
    async fn health_via_full_router() {
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let resp = test_router(false).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_route_is_json_404() {
        let req = Request::builder()
            .uri("/no/such/route")
            .body(Body::empty())
            .unwrap();
        let resp = test_router(false).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn cors_headers_only_when_enabled() {
        let request = || {
            Request::builder()
                .uri("/health")
                .header(header::ORIGIN, "http://localhost:3000")
                .body(Body::empty())
                .unwrap()
        };

        let resp = test_router(true).oneshot(request()).await.unwrap();
        assert!(resp.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));

        let resp = test_router(false).oneshot(request()).await.unwrap();
        assert!(!resp.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }
}
