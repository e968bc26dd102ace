//! HTTP (JSON) front end for BugSage.
//!
//! Every route is a thin adapter: it resolves the caller from the
//! `X-BugSage-User` header, hands owned inputs to the lifecycle engine on
//! the blocking pool, and maps [`LifecycleError`](bugsage_lifecycle::LifecycleError)
//! kinds onto status codes.

pub mod api;
pub mod error;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use server::{ServeOptions, build_router, start_server};
pub use state::{AppState, Caller, EngineHandle, SharedState, USER_HEADER};
