//! Clap CLI definitions for the `bugsage` command.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// bugsage -- bug tracking with duplicate detection and a full audit trail.
#[derive(Parser, Debug)]
#[command(
    name = "bugsage",
    about = "Bug tracker with duplicate detection and field-level history",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Global flags available to all subcommands.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Config file (default: .bugsage/config.yaml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database path (overrides database.path from the config).
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Id of the acting user.
    #[arg(long, global = true, env = "BUGSAGE_USER")]
    pub user: Option<i64>,

    /// Output in JSON format.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output (errors only).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// All available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a .bugsage directory with a default config and database.
    Init(InitArgs),

    /// Manage users.
    User(UserArgs),

    /// Manage projects.
    Project(ProjectArgs),

    // ===== Working with bugs =====
    /// Report a new bug.
    #[command(alias = "new")]
    Create(CreateArgs),

    /// Change fields of a bug.
    Update(UpdateArgs),

    /// Set the status of a bug.
    Status(StatusArgs),

    /// Add a comment to a bug.
    Comment(CommentArgs),

    /// Attach a file to a bug.
    Attach(AttachArgs),

    // ===== Views =====
    /// Show a bug with comments, attachments and history.
    #[command(alias = "view")]
    Show(IdArgs),

    /// Show the change history of a bug.
    History(IdArgs),

    /// List bugs.
    List(ListArgs),

    /// Search titles and descriptions.
    Search(SearchArgs),

    /// Dashboard aggregates.
    Dashboard(DashboardArgs),

    // ===== Server & utilities =====
    /// Serve the JSON API over HTTP.
    Serve(ServeArgs),

    /// Generate shell completions.
    Completion(CompletionArgs),
}

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing config file with the defaults.
    #[arg(long)]
    pub force: bool,
}

// ---------------------------------------------------------------------------
// Users & projects
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommands,
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Register a user.
    Add {
        /// Display name.
        name: String,

        /// Email address (unique, case-insensitive).
        email: String,

        /// Password (at least 6 characters).
        #[arg(long, env = "BUGSAGE_PASSWORD")]
        password: String,

        /// Developer, Tester or Admin.
        #[arg(long)]
        role: Option<String>,
    },

    /// List users.
    List,
}

#[derive(Args, Debug)]
pub struct ProjectArgs {
    #[command(subcommand)]
    pub command: ProjectCommands,
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// Create a project.
    Add {
        /// Project name.
        name: String,

        #[arg(short = 'd', long, default_value = "")]
        description: String,
    },

    /// List projects.
    List,
}

// ---------------------------------------------------------------------------
// Bugs
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Bug title.
    pub title: String,

    /// What happens and how to reproduce it.
    #[arg(short = 'd', long, default_value = "")]
    pub description: String,

    /// Low, Medium, High or Critical (default: Medium).
    #[arg(short = 'p', long)]
    pub priority: Option<String>,

    /// Project id.
    #[arg(long)]
    pub project: Option<i64>,

    /// Assignee user id.
    #[arg(short = 'a', long)]
    pub assignee: Option<i64>,

    /// Create even when similar bugs exist.
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Bug id.
    pub id: i64,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(short = 'd', long)]
    pub description: Option<String>,

    #[arg(short = 'p', long)]
    pub priority: Option<String>,

    #[arg(short = 's', long)]
    pub status: Option<String>,

    /// Assignee user id, or `none` to unassign.
    #[arg(short = 'a', long)]
    pub assignee: Option<String>,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Bug id.
    pub id: i64,

    /// New, "In Progress", Resolved or Closed (in_progress also works).
    pub status: String,
}

#[derive(Args, Debug)]
pub struct CommentArgs {
    /// Bug id.
    pub id: i64,

    /// Comment text.
    pub text: String,
}

#[derive(Args, Debug)]
pub struct AttachArgs {
    /// Bug id.
    pub id: i64,

    /// File to attach.
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct IdArgs {
    /// Bug id.
    pub id: i64,
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    #[arg(short = 's', long)]
    pub status: Option<String>,

    #[arg(short = 'p', long)]
    pub priority: Option<String>,

    /// Assignee user id, or `me`.
    #[arg(short = 'a', long)]
    pub assignee: Option<String>,

    /// Project id.
    #[arg(long)]
    pub project: Option<i64>,

    /// Page number, starting at 1.
    #[arg(long)]
    pub page: Option<u32>,

    #[arg(long)]
    pub per_page: Option<u32>,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Text to look for in titles and descriptions.
    pub query: String,
}

#[derive(Args, Debug)]
pub struct DashboardArgs {
    #[command(subcommand)]
    pub command: DashboardCommands,
}

#[derive(Subcommand, Debug)]
pub enum DashboardCommands {
    /// Headline counters.
    Stats,
    /// Most recently created bugs.
    Recent,
    /// Chart series.
    Charts,
}

// ---------------------------------------------------------------------------
// Serve & completion
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Listen address (default: server.host from the config).
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port (default: server.port from the config).
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(Args, Debug)]
pub struct CompletionArgs {
    /// Target shell.
    #[arg(value_enum)]
    pub shell: Shell,
}
