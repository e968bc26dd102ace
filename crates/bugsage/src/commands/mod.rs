//! Command handlers, one module per subcommand.

pub mod attach;
pub mod comment;
pub mod completion;
pub mod create;
pub mod dashboard;
pub mod history;
pub mod init;
pub mod list;
pub mod project;
pub mod search;
pub mod serve;
pub mod show;
pub mod status_cmd;
pub mod update;
pub mod user;
