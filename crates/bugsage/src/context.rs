//! Runtime context for command execution.
//!
//! The [`RuntimeContext`] holds the global flags and knows how to turn them
//! into a loaded config, an opened engine and the acting user.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::debug;

use bugsage_config::bugsage_dir::{find_bugsage_dir, project_root};
use bugsage_config::config::{figment_for, load_config, load_config_file};
use bugsage_config::{BugSageConfig, ConfigError};
use bugsage_core::user::CallerContext;
use bugsage_lifecycle::{EngineSettings, LifecycleEngine};
use bugsage_storage::SqliteStore;

use crate::cli::GlobalArgs;

pub type Engine = LifecycleEngine<SqliteStore>;

/// Runtime context passed to every command handler.
///
/// Constructed once in `main` after CLI parsing, before command dispatch.
#[derive(Debug, Clone)]
pub struct RuntimeContext {
    /// Explicit config file from `--config`.
    pub config_path: Option<PathBuf>,

    /// Database file from `--db`; wins over `database.path`.
    pub db_path: Option<PathBuf>,

    /// Acting user id (`--user` / `BUGSAGE_USER`).
    pub user: Option<i64>,

    pub json: bool,
    pub verbose: bool,
    pub quiet: bool,
}

/// A config together with the directory its relative paths resolve against.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub root: PathBuf,
    pub config: BugSageConfig,
}

impl Workspace {
    pub fn database_path(&self, db_override: Option<&Path>) -> PathBuf {
        match db_override {
            Some(path) => path.to_path_buf(),
            None => BugSageConfig::resolve(&self.root, &self.config.database.path),
        }
    }

    /// Engine tunables with paths made absolute.
    pub fn engine_settings(&self) -> EngineSettings {
        let cfg = &self.config;
        EngineSettings {
            per_page: cfg.pagination.per_page,
            max_per_page: cfg.pagination.max_per_page,
            max_candidates: cfg.duplicates.max_candidates,
            recent_days: cfg.dashboard.recent_days,
            chart_days: cfg.dashboard.chart_days,
            recent_limit: cfg.dashboard.recent_limit,
            upload_dir: BugSageConfig::resolve(&self.root, &cfg.uploads.dir),
            max_file_size: cfg.uploads.max_file_size,
            allowed_extensions: cfg
                .uploads
                .allowed_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            ..EngineSettings::default()
        }
    }
}

impl RuntimeContext {
    pub fn from_global_args(global: &GlobalArgs) -> Self {
        Self {
            config_path: global.config.clone(),
            db_path: global.db.clone(),
            user: global.user,
            json: global.json,
            verbose: global.verbose,
            quiet: global.quiet,
        }
    }

    /// Loads the layered config and locates the project root.
    ///
    /// Precedence for the file: `--config`, then `.bugsage/config.yaml`
    /// found by walking up from the working directory. With only `--db`
    /// given, defaults plus environment overrides are used.
    pub fn workspace(&self) -> Result<Workspace> {
        let cwd = env::current_dir().context("failed to get current directory")?;
        let dir = find_bugsage_dir(&cwd);
        let root = dir.as_deref().map(project_root).unwrap_or_else(|| cwd.clone());

        let config = match (&self.config_path, &dir) {
            (Some(path), _) => load_config_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            (None, Some(dir)) => load_config(dir)
                .with_context(|| format!("failed to load config from {}", dir.display()))?,
            (None, None) if self.db_path.is_some() => {
                let config: BugSageConfig = figment_for(None)?
                    .extract()
                    .map_err(ConfigError::from)?;
                config.validate()?;
                config
            }
            (None, None) => return Err(ConfigError::DirNotFound.into()),
        };

        debug!(root = %root.display(), "workspace resolved");
        Ok(Workspace { root, config })
    }

    /// The configured log filter, or `warn` when no config can be loaded.
    pub fn log_filter(&self) -> String {
        self.workspace()
            .map(|ws| ws.config.logging.filter)
            .unwrap_or_else(|_| "warn".to_string())
    }

    /// Opens the database and wraps it in the lifecycle engine.
    pub fn open_engine(&self) -> Result<(Engine, Workspace)> {
        let workspace = self.workspace()?;
        let db_path = workspace.database_path(self.db_path.as_deref());
        let store = SqliteStore::open(&db_path)
            .with_context(|| format!("failed to open database: {}", db_path.display()))?;
        let engine = LifecycleEngine::new(store, workspace.engine_settings());
        Ok((engine, workspace))
    }

    /// Resolves `--user` against the user table.
    pub fn caller(&self, engine: &Engine) -> Result<CallerContext> {
        let Some(user_id) = self.user else {
            bail!("no acting user: pass --user <id> or set BUGSAGE_USER");
        };
        let user = engine
            .get_user(user_id)
            .with_context(|| format!("unknown user id {user_id}"))?;
        Ok(CallerContext::from(&user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn workspace(root: &str) -> Workspace {
        Workspace {
            root: PathBuf::from(root),
            config: BugSageConfig::default(),
        }
    }

    #[test]
    fn database_path_resolves_against_root() {
        let ws = workspace("/work/app");
        assert_eq!(
            ws.database_path(None),
            PathBuf::from("/work/app/.bugsage/bugsage.db")
        );
        assert_eq!(
            ws.database_path(Some(Path::new("/tmp/other.db"))),
            PathBuf::from("/tmp/other.db")
        );
    }

    #[test]
    fn engine_settings_follow_config() {
        let mut ws = workspace("/work/app");
        ws.config.pagination.per_page = 5;
        ws.config.duplicates.max_candidates = 2;
        ws.config.uploads.allowed_extensions = vec![".PNG".into(), "txt".into()];

        let settings = ws.engine_settings();
        assert_eq!(settings.per_page, 5);
        assert_eq!(settings.max_candidates, 2);
        assert_eq!(settings.upload_dir, PathBuf::from("/work/app/.bugsage/uploads"));
        assert_eq!(settings.allowed_extensions, vec!["png", "txt"]);
    }

    #[test]
    fn caller_requires_user_flag() {
        let ctx = RuntimeContext::from_global_args(&GlobalArgs::default());
        let engine = LifecycleEngine::new(
            SqliteStore::open_in_memory().unwrap(),
            EngineSettings::default(),
        );
        let err = ctx.caller(&engine).unwrap_err();
        assert!(err.to_string().contains("--user"));
    }
}
