//! SQLite-backed storage implementation.

mod bugs;
mod comments;
mod queries;
pub mod schema;
mod store;
mod users;

pub use store::SqliteStore;
