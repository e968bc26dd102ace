//! Core domain types for BugSage.
//!
//! Bugs, their append-only history, comments, attachments, users and
//! projects, plus the validation rules and dashboard shapes shared by the
//! storage layer, the lifecycle engine and the front ends.

pub mod attachment;
pub mod bug;
pub mod comment;
pub mod credential;
pub mod dashboard;
pub mod enums;
pub mod filter;
pub mod history;
pub mod user;
pub mod validation;
