//! Configuration types and loading.
//!
//! The main entry point is [`BugSageConfig`], normally read from
//! `.bugsage/config.yaml`. Values are layered with `figment`: built-in
//! defaults, then the file, then `BUGSAGE_*` environment variables (nested
//! keys use `__`, e.g. `BUGSAGE_SERVER__PORT=9000`).

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File name looked up inside the `.bugsage/` directory.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "BUGSAGE_";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read or written.
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// YAML (de)serialization failed.
    #[error("failed to parse config file: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// TOML serialization failed.
    #[error("failed to write TOML config: {0}")]
    TomlError(#[from] toml::ser::Error),

    /// Merging or extracting the layered configuration failed.
    #[error("invalid configuration: {0}")]
    Figment(Box<figment::Error>),

    /// The `.bugsage/` directory was not found.
    #[error("no .bugsage directory found (run 'bugsage init' first)")]
    DirNotFound,

    /// A configuration value was invalid.
    #[error("invalid configuration value for key '{key}': {reason}")]
    InvalidValue {
        /// The configuration key that had an invalid value.
        key: String,
        /// A description of why the value is invalid.
        reason: String,
    },
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        Self::Figment(Box::new(e))
    }
}

/// A specialized `Result` type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file. Relative paths are resolved against the project root.
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".bugsage/bugsage.db"),
        }
    }
}

/// HTTP listener settings for `bugsage serve`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Send permissive CORS headers.
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub per_page: u32,
    pub max_per_page: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            per_page: 20,
            max_per_page: 100,
        }
    }
}

/// Where attachments go and what is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadsConfig {
    pub dir: PathBuf,
    /// Bytes.
    pub max_file_size: u64,
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(".bugsage/uploads"),
            max_file_size: 5 * 1024 * 1024,
            allowed_extensions: ["jpg", "jpeg", "png", "gif", "pdf", "doc", "docx", "txt"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuplicatesConfig {
    pub max_candidates: u32,
}

impl Default for DuplicatesConfig {
    fn default() -> Self {
        Self { max_candidates: 5 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub recent_days: u32,
    pub chart_days: u32,
    pub recent_limit: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            recent_days: 7,
            chart_days: 30,
            recent_limit: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when neither `-v` nor `RUST_LOG` is set.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// The full BugSage configuration. Every section is optional in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BugSageConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub pagination: PaginationConfig,
    pub uploads: UploadsConfig,
    pub duplicates: DuplicatesConfig,
    pub dashboard: DashboardConfig,
    pub logging: LoggingConfig,
}

impl BugSageConfig {
    /// Rejects values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.pagination.per_page == 0 {
            return Err(invalid("pagination.per_page", "must be at least 1"));
        }
        if self.pagination.per_page > self.pagination.max_per_page {
            return Err(invalid(
                "pagination.per_page",
                &format!(
                    "{} exceeds pagination.max_per_page ({})",
                    self.pagination.per_page, self.pagination.max_per_page
                ),
            ));
        }
        if self.duplicates.max_candidates == 0 {
            return Err(invalid("duplicates.max_candidates", "must be at least 1"));
        }
        if self.dashboard.chart_days == 0 {
            return Err(invalid("dashboard.chart_days", "must be at least 1"));
        }
        Ok(())
    }

    /// Resolves `path` against `root` unless it is already absolute.
    pub fn resolve(root: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        }
    }
}

fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Loading / saving
// ---------------------------------------------------------------------------

/// The layered provider chain for `file`: defaults, then the file (YAML, or
/// TOML for a `.toml` extension) if present and non-empty, then the
/// environment.
pub fn figment_for(file: Option<&Path>) -> Result<Figment> {
    let mut figment = Figment::from(Serialized::defaults(BugSageConfig::default()));

    if let Some(path) = file.filter(|p| p.exists()) {
        // An empty file is valid and contributes nothing.
        if !std::fs::read_to_string(path)?.trim().is_empty() {
            figment = if is_toml(path) {
                figment.merge(Toml::file(path))
            } else {
                figment.merge(Yaml::file(path))
            };
        }
    }

    Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
}

/// Loads `config.yaml` from the given `.bugsage/` directory. A missing file
/// yields the defaults (still subject to environment overrides).
pub fn load_config(bugsage_dir: &Path) -> Result<BugSageConfig> {
    load_config_file(&bugsage_dir.join(CONFIG_FILE_NAME))
}

/// Loads an explicit config file.
pub fn load_config_file(path: &Path) -> Result<BugSageConfig> {
    let config: BugSageConfig = figment_for(Some(path))?.extract()?;
    config.validate()?;
    Ok(config)
}

/// Writes `config` to `path`, as TOML if the extension says so, otherwise
/// YAML. Parent directories are created.
pub fn save_config_file(path: &Path, config: &BugSageConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let text = if is_toml(path) {
        toml::to_string_pretty(config)?
    } else {
        serde_yaml::to_string(config)?
    };
    std::fs::write(path, text)?;
    Ok(())
}

/// Saves `config.yaml` inside the given `.bugsage/` directory.
pub fn save_config(bugsage_dir: &Path, config: &BugSageConfig) -> Result<()> {
    save_config_file(&bugsage_dir.join(CONFIG_FILE_NAME), config)
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("toml"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = BugSageConfig::default();
        assert_eq!(cfg.database.path, PathBuf::from(".bugsage/bugsage.db"));
        assert_eq!(cfg.server.port, 8080);
        assert!(cfg.server.cors);
        assert_eq!(cfg.pagination.per_page, 20);
        assert_eq!(cfg.uploads.max_file_size, 5_242_880);
        assert_eq!(cfg.uploads.allowed_extensions.len(), 8);
        assert_eq!(cfg.duplicates.max_candidates, 5);
        assert_eq!(cfg.dashboard.chart_days, 30);
        assert_eq!(cfg.logging.filter, "warn");
        cfg.validate().unwrap();
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg: BugSageConfig = figment_for(Some(&dir.path().join("absent.yaml")))
            .unwrap()
            .extract()
            .unwrap();
        assert_eq!(cfg.pagination, PaginationConfig::default());
    }

    #[test]
    fn empty_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "  \n").unwrap();
        let cfg: BugSageConfig = figment_for(Some(&path)).unwrap().extract().unwrap();
        assert_eq!(cfg.server, ServerConfig::default());
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "server:\n  port: 9001\npagination:\n  per_page: 50\n").unwrap();

        let cfg: BugSageConfig = figment_for(Some(&path)).unwrap().extract().unwrap();
        assert_eq!(cfg.server.port, 9001);
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.pagination.per_page, 50);
        assert_eq!(cfg.pagination.max_per_page, 100);
    }

    #[test]
    fn toml_file_is_read_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bugsage.toml");
        std::fs::write(&path, "[dashboard]\nrecent_limit = 3\n").unwrap();
        let cfg: BugSageConfig = figment_for(Some(&path)).unwrap().extract().unwrap();
        assert_eq!(cfg.dashboard.recent_limit, 3);
    }

    #[test]
    fn save_then_load_yaml_and_toml() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = BugSageConfig::default();
        cfg.uploads.max_file_size = 1024;
        cfg.logging.filter = "bugsage=info".into();

        save_config(dir.path(), &cfg).unwrap();
        let loaded: BugSageConfig = figment_for(Some(&dir.path().join(CONFIG_FILE_NAME)))
            .unwrap()
            .extract()
            .unwrap();
        assert_eq!(loaded, cfg);

        let toml_path = dir.path().join("nested").join("bugsage.toml");
        save_config_file(&toml_path, &cfg).unwrap();
        let loaded: BugSageConfig = figment_for(Some(&toml_path)).unwrap().extract().unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn validation_rejects_bad_paging() {
        let mut cfg = BugSageConfig::default();
        cfg.pagination.per_page = 0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "pagination.per_page"
        ));

        cfg.pagination.per_page = 500;
        assert!(cfg.validate().is_err());

        let mut cfg = BugSageConfig::default();
        cfg.duplicates.max_candidates = 0;
        let err = cfg.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid configuration value for key 'duplicates.max_candidates': must be at least 1"
        );
    }

    #[test]
    fn load_config_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "pagination:\n  per_page: 0\n",
        )
        .unwrap();
        assert!(load_config(dir.path()).is_err());
    }

    #[test]
    fn relative_paths_resolve_against_root() {
        let root = Path::new("/srv/project");
        assert_eq!(
            BugSageConfig::resolve(root, Path::new(".bugsage/bugsage.db")),
            PathBuf::from("/srv/project/.bugsage/bugsage.db")
        );
        assert_eq!(
            BugSageConfig::resolve(root, Path::new("/var/db.sqlite")),
            PathBuf::from("/var/db.sqlite")
        );
    }
}
