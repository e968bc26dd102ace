//! The BugSage lifecycle engine.
//!
//! [`LifecycleEngine`] sits between the front ends (HTTP, CLI) and a
//! [`BugStore`](bugsage_storage::BugStore). It owns the rules for creating
//! and changing bugs: validation, duplicate detection, reference checks and
//! the field-level history written alongside every update. Read queries and
//! dashboard aggregates pass through it as well so callers only ever talk to
//! one type.

mod accounts;
mod attachments;
pub mod engine;
pub mod error;
mod queries;
pub mod settings;

#[cfg(test)]
pub(crate) mod testutil;

pub use engine::{CreateOutcome, LifecycleEngine};
pub use error::{ErrorKind, LifecycleError, Result};
pub use settings::EngineSettings;
