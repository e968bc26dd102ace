//! Terminal output helpers for the `bugsage` CLI.
//!
//! Colour is applied only when stdout supports it; every renderer falls back
//! to plain text so piped output stays clean.

pub mod styles;
pub mod terminal;
