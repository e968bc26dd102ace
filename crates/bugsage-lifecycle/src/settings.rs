//! Tunables the engine reads on every operation.

use std::path::PathBuf;

/// Limits and locations used by [`LifecycleEngine`](crate::LifecycleEngine).
///
/// Front ends build this from their configuration; [`Default`] mirrors the
/// shipped defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Page size when the caller does not ask for one.
    pub per_page: u32,
    /// Upper clamp for a caller-requested page size.
    pub max_per_page: u32,
    /// Duplicate candidates returned instead of creating a bug.
    pub max_candidates: u32,
    pub search_limit: u32,
    /// Window for the dashboard's "recent bugs" counter.
    pub recent_days: u32,
    /// Days covered by the `bugs_over_time` chart.
    pub chart_days: u32,
    pub recent_limit: u32,
    pub upload_dir: PathBuf,
    /// Bytes.
    pub max_file_size: u64,
    /// Lower-case extensions without the dot.
    pub allowed_extensions: Vec<String>,
}

/// Extensions accepted when nothing else is configured.
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] =
    &["jpg", "jpeg", "png", "gif", "pdf", "doc", "docx", "txt"];

/// 5 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            per_page: 20,
            max_per_page: 100,
            max_candidates: 5,
            search_limit: 20,
            recent_days: 7,
            chart_days: 30,
            recent_limit: 10,
            upload_dir: PathBuf::from(".bugsage/uploads"),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

impl EngineSettings {
    /// Whether `ext` (any case) is on the allow-list.
    pub fn extension_allowed(&self, ext: &str) -> bool {
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext))
    }
}
