//! Shared application state and the blocking-pool bridge to the engine.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use bugsage_core::user::CallerContext;
use bugsage_lifecycle::LifecycleEngine;
use bugsage_storage::SqliteStore;

use crate::error::ApiError;

/// Header carrying the authenticated user's id.
pub const USER_HEADER: &str = "x-bugsage-user";

pub type Engine = LifecycleEngine<SqliteStore>;

/// Runs engine calls on tokio's blocking pool so SQLite I/O never stalls
/// the async workers.
#[derive(Clone)]
pub struct EngineHandle {
    inner: Arc<Engine>,
}

impl EngineHandle {
    pub fn new(engine: Engine) -> Self {
        Self {
            inner: Arc::new(engine),
        }
    }

    /// Run a closure against the engine on a blocking thread.
    /// All data passed into `f` must be owned (`'static`).
    pub async fn call<F, R>(&self, f: F) -> Result<R, ApiError>
    where
        F: FnOnce(&Engine) -> bugsage_lifecycle::Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let engine = self.inner.clone();
        tokio::task::spawn_blocking(move || f(&engine))
            .await
            .map_err(|e| ApiError::Internal(format!("engine task panicked: {e}")))?
            .map_err(ApiError::from)
    }

    /// Like [`call`](Self::call) for the infallible dashboard reads.
    pub async fn read<F, R>(&self, f: F) -> Result<R, ApiError>
    where
        F: FnOnce(&Engine) -> R + Send + 'static,
        R: Send + 'static,
    {
        self.call(move |engine| Ok(f(engine))).await
    }
}

pub struct AppState {
    pub engine: EngineHandle,
}

pub type SharedState = Arc<AppState>;

/// The caller, resolved from the [`USER_HEADER`] header against the user
/// table. Missing, malformed or unknown ids are rejected with 401.
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub CallerContext);

impl FromRequestParts<SharedState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<i64>().ok())
            .ok_or(ApiError::Unauthorized)?;

        match state.engine.call(move |engine| engine.get_user(user_id)).await {
            Ok(user) => Ok(Caller(CallerContext::from(&user))),
            Err(ApiError::NotFound(_)) => Err(ApiError::Unauthorized),
            Err(e) => Err(e),
        }
    }
}
