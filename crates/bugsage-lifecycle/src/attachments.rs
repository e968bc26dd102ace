//! File attachments: validation, copy into the upload directory, record.

use std::fs;
use std::path::Path;

use chrono::Utc;
use tracing::{info, warn};

use bugsage_core::attachment::{Attachment, NewAttachment, file_extension};
use bugsage_core::user::CallerContext;
use bugsage_core::validation::ValidationError;
use bugsage_storage::BugStore;

use crate::engine::LifecycleEngine;
use crate::error::{LifecycleError, Result};

impl<S: BugStore> LifecycleEngine<S> {
    /// Copies `source` under `<upload_dir>/<bug_id>/` and records it.
    pub fn attach_file(
        &self,
        caller: &CallerContext,
        bug_id: i64,
        source: &Path,
    ) -> Result<Attachment> {
        self.store.get_bug(bug_id)?;

        let filename = source
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                LifecycleError::Validation(format!("Not a file: {}", source.display()))
            })?
            .to_string();

        let ext = file_extension(&filename).unwrap_or_default();
        if !self.settings.extension_allowed(&ext) {
            return Err(ValidationError::ExtensionNotAllowed(ext).into());
        }

        let meta = fs::metadata(source).map_err(|_| {
            LifecycleError::Validation(format!("File not found: {}", source.display()))
        })?;
        if !meta.is_file() {
            return Err(LifecycleError::Validation(format!(
                "Not a file: {}",
                source.display()
            )));
        }
        if meta.len() > self.settings.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size: meta.len(),
                limit: self.settings.max_file_size,
            }
            .into());
        }

        let dir = self.settings.upload_dir.join(bug_id.to_string());
        fs::create_dir_all(&dir)?;
        let stored_name = format!("{}_{}", Utc::now().format("%Y%m%d%H%M%S%3f"), filename);
        let dest = dir.join(stored_name);
        fs::copy(source, &dest)?;

        let recorded = self.store.add_attachment(&NewAttachment {
            bug_id,
            filename,
            file_path: dest.to_string_lossy().into_owned(),
            file_size: i64::try_from(meta.len()).unwrap_or(i64::MAX),
            uploaded_by: caller.user_id,
        });
        let attachment = match recorded {
            Ok(attachment) => attachment,
            Err(e) => {
                // No row points at the copy; don't leave it behind.
                if let Err(rm) = fs::remove_file(&dest) {
                    warn!(path = %dest.display(), error = %rm, "failed to remove orphaned upload");
                }
                return Err(e.into());
            }
        };
        info!(bug_id, attachment_id = attachment.attachment_id, "file attached");
        Ok(attachment)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use bugsage_core::enums::Role;
    use bugsage_core::user::CallerContext;

    use crate::ErrorKind;
    use crate::settings::EngineSettings;
    use crate::testutil::TestEnv;
    use pretty_assertions::assert_eq;

    fn env_with_uploads(dir: &std::path::Path) -> TestEnv {
        TestEnv::with_settings(EngineSettings {
            upload_dir: dir.join("uploads"),
            max_file_size: 16,
            ..Default::default()
        })
    }

    #[test]
    fn copies_and_records() {
        let tmp = tempfile::TempDir::new().unwrap();
        let env = env_with_uploads(tmp.path());
        let id = env.seed_bug("t", "d");
        let src = tmp.path().join("Trace.TXT");
        std::fs::write(&src, "stack").unwrap();

        let att = env.engine.attach_file(&env.caller, id, &src).unwrap();
        assert_eq!(att.filename, "Trace.TXT");
        assert_eq!(att.file_size, 5);
        let stored = PathBuf::from(&att.file_path);
        assert!(stored.starts_with(tmp.path().join("uploads").join(id.to_string())));
        assert_eq!(std::fs::read_to_string(stored).unwrap(), "stack");

        let detail = env.engine.bug_detail(id).unwrap();
        assert_eq!(detail.attachments.len(), 1);
        assert!(detail.history.is_empty());
    }

    #[test]
    fn rejects_disallowed_extension() {
        let tmp = tempfile::TempDir::new().unwrap();
        let env = env_with_uploads(tmp.path());
        let id = env.seed_bug("t", "d");
        let src = tmp.path().join("run.exe");
        std::fs::write(&src, "x").unwrap();

        let err = env.engine.attach_file(&env.caller, id, &src).unwrap_err();
        assert_eq!(err.to_string(), "File type .exe is not allowed");
    }

    #[test]
    fn rejects_oversized_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let env = env_with_uploads(tmp.path());
        let id = env.seed_bug("t", "d");
        let src = tmp.path().join("big.txt");
        std::fs::write(&src, [b'a'; 17]).unwrap();

        let err = env.engine.attach_file(&env.caller, id, &src).unwrap_err();
        assert!(matches!(err, crate::LifecycleError::Validation(_)));
        assert!(!tmp.path().join("uploads").exists());
    }

    #[test]
    fn failed_record_removes_copied_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let env = env_with_uploads(tmp.path());
        let id = env.seed_bug("t", "d");
        let src = tmp.path().join("log.txt");
        std::fs::write(&src, "trace").unwrap();

        // No such user: the attachment row violates its foreign key.
        let ghost = CallerContext::new(999, Role::Developer);
        let err = env.engine.attach_file(&ghost, id, &src).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);

        let bug_dir = tmp.path().join("uploads").join(id.to_string());
        assert_eq!(std::fs::read_dir(&bug_dir).unwrap().count(), 0);
        assert!(env.engine.bug_detail(id).unwrap().attachments.is_empty());
    }

    #[test]
    fn missing_bug_checked_first() {
        let tmp = tempfile::TempDir::new().unwrap();
        let env = env_with_uploads(tmp.path());
        let err = env
            .engine
            .attach_file(&env.caller, 9, &tmp.path().join("nope.txt"))
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
