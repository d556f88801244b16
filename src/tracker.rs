//! Stale-file detection for attached files.
//!
//! Each [`FileReference`] remembers the modification time its file had when
//! it was last reconciled. Reconciliation compares that against the file on
//! disk, resolved relative to a base directory that can move between runs
//! (the model is saved somewhere else, the repository is cloned elsewhere).
//!
//! Paths are joined onto the base directory as-is. A `..` that climbs out of
//! it is followed; no sandboxing is done here.

use crate::error::FileError;
use crate::id::generate_id;
use crate::notify::Notifier;
use crate::repository::FileRepository;
use crate::store::StoreError;
use crate::types::FileReference;
use chrono::{DateTime, Local, TimeZone, Utc};
use eyre::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// What reconciliation found for a single reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    /// On-disk mtime matches the recorded one.
    Unchanged,
    /// File exists but its mtime (whole seconds) differs.
    Changed { on_disk: i64 },
    /// Nothing at the resolved path.
    Missing,
}

/// Summary of one reconciliation pass.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    /// Number of references examined.
    pub checked: usize,
    /// IDs whose file changed on disk.
    pub changed: Vec<String>,
    /// IDs whose file is gone, with the path that was looked up.
    pub missing: Vec<(String, PathBuf)>,
    /// IDs skipped because their path is empty.
    pub skipped: Vec<String>,
    /// Per-reference failures (id, error message).
    pub errors: Vec<(String, String)>,
}

impl ReconcileReport {
    /// IDs flagged as modified by this pass, changed first.
    pub fn flagged(&self) -> impl Iterator<Item = &str> {
        self.changed
            .iter()
            .map(String::as_str)
            .chain(self.missing.iter().map(|(id, _)| id.as_str()))
    }
}

/// Read a file's modification time, truncated to whole seconds.
pub fn modified_secs(path: &Path) -> Result<i64, FileError> {
    let metadata = fs::metadata(path).map_err(|e| FileError::from_io(path, e))?;
    let mtime = metadata.modified().map_err(|e| FileError::from_io(path, e))?;
    Ok(DateTime::<Utc>::from(mtime).timestamp())
}

/// Resolve a reference's path against the base directory.
pub fn resolve(reference: &FileReference, base_dir: &Path) -> Result<PathBuf, FileError> {
    if reference.path.trim().is_empty() {
        return Err(FileError::InvalidPath(reference.path.clone()));
    }
    Ok(base_dir.join(&reference.path))
}

/// Compare a reference against the file on disk without changing it.
pub fn inspect(reference: &FileReference, base_dir: &Path) -> Result<FileState, FileError> {
    let path = resolve(reference, base_dir)?;
    match modified_secs(&path) {
        Ok(on_disk) if on_disk == reference.last_modified => Ok(FileState::Unchanged),
        Ok(on_disk) => Ok(FileState::Changed { on_disk }),
        Err(FileError::FileNotFound(_)) => Ok(FileState::Missing),
        Err(e) => Err(e),
    }
}

/// Accept the current on-disk state of a reference.
///
/// On success `last_modified` holds the file's current mtime and `modified`
/// is cleared. On failure the reference is left untouched.
pub fn acknowledge(reference: &mut FileReference, base_dir: &Path) -> Result<(), FileError> {
    let path = resolve(reference, base_dir)?;
    let on_disk = modified_secs(&path)?;
    reference.last_modified = on_disk;
    reference.modified = false;
    Ok(())
}

/// Path to store for a file picked by the user: relative to the model
/// directory when it lies inside it, unchanged otherwise.
pub fn relative_path(selected: &Path, model_dir: &Path) -> String {
    match selected.strip_prefix(model_dir) {
        Ok(rel) => rel.to_string_lossy().into_owned(),
        Err(_) => selected.to_string_lossy().into_owned(),
    }
}

/// Format a timestamp the way the property view shows it.
pub fn format_timestamp(secs: i64) -> String {
    match Local.timestamp_opt(secs, 0).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => secs.to_string(),
    }
}

/// Human-readable view of a reference and its file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDetails {
    pub path: String,
    /// Recorded timestamp, "Unknown" if never set.
    pub last_modified: String,
    /// On-disk timestamp, "File not found" if the file is gone.
    pub current_modified: String,
    pub modified: bool,
}

/// Describe a reference against its file on disk.
pub fn describe(reference: &FileReference, base_dir: &Path) -> FileDetails {
    let last_modified = if reference.last_modified != 0 {
        format_timestamp(reference.last_modified)
    } else {
        "Unknown".to_string()
    };

    let current_modified = match resolve(reference, base_dir).and_then(|p| modified_secs(&p)) {
        Ok(secs) => format_timestamp(secs),
        Err(FileError::FileNotFound(_)) => "File not found".to_string(),
        Err(FileError::InvalidPath(_)) => "No file selected".to_string(),
        Err(e) => e.to_string(),
    };

    FileDetails {
        path: reference.path.clone(),
        last_modified,
        current_modified,
        modified: reference.modified,
    }
}

/// Reconciles a repository of file references against the filesystem.
pub struct Tracker<'a> {
    base_dir: PathBuf,
    notifier: &'a dyn Notifier,
    notify_missing: bool,
}

impl<'a> Tracker<'a> {
    /// Create a tracker resolving paths against `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>, notifier: &'a dyn Notifier) -> Self {
        Self {
            base_dir: base_dir.into(),
            notifier,
            notify_missing: true,
        }
    }

    /// Whether missing files are also pushed to the notifier (they are always logged).
    pub fn notify_missing(mut self, notify: bool) -> Self {
        self.notify_missing = notify;
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Flag every reference whose file changed or disappeared.
    ///
    /// Each flag is written in its own transaction. A failure is logged and
    /// reported, and the pass moves on to the next reference.
    pub fn reconcile<R: FileRepository>(&self, repo: &mut R) -> Result<ReconcileReport> {
        let references = repo
            .select_files(&|_| true)
            .context("Failed to select file references")?;

        let mut report = ReconcileReport {
            checked: references.len(),
            ..Default::default()
        };

        for reference in references {
            let state = match inspect(&reference, &self.base_dir) {
                Ok(state) => state,
                Err(FileError::InvalidPath(_)) => {
                    log::warn!("File reference {} has no path, skipping", reference.id);
                    report.skipped.push(reference.id);
                    continue;
                }
                Err(e) => {
                    log::error!("Failed to check file for {}: {}", reference.id, e);
                    self.notifier.notify(&e.to_string());
                    report.errors.push((reference.id, e.to_string()));
                    continue;
                }
            };

            let path = self.base_dir.join(&reference.path);
            match state {
                FileState::Unchanged => continue,
                FileState::Changed { on_disk } => {
                    log::info!(
                        "File '{}' modified (recorded {}, on disk {})",
                        path.display(),
                        reference.last_modified,
                        on_disk
                    );
                }
                FileState::Missing => {
                    log::warn!("File '{}' not found. Marking element as modified.", path.display());
                    if self.notify_missing {
                        self.notifier.notify(&format!("File not found: {}", path.display()));
                    }
                }
            }

            if let Err(e) = self.flag(repo, &reference) {
                log::error!("Error updating element for file '{}': {:#}", path.display(), e);
                self.notifier
                    .notify(&format!("Failed to update element for file '{}'", path.display()));
                report.errors.push((reference.id, e.to_string()));
                continue;
            }

            match state {
                FileState::Missing => report.missing.push((reference.id, path)),
                _ => report.changed.push(reference.id),
            }
        }

        log::info!(
            "Reconciled {} file reference(s) in {}: {} changed, {} missing, {} skipped, {} failed",
            report.checked,
            self.base_dir.display(),
            report.changed.len(),
            report.missing.len(),
            report.skipped.len(),
            report.errors.len()
        );

        Ok(report)
    }

    fn flag<R: FileRepository>(&self, repo: &mut R, reference: &FileReference) -> Result<()> {
        if reference.modified {
            return Ok(());
        }
        let flagged = FileReference {
            modified: true,
            ..reference.clone()
        };
        repo.transaction(|w| w.save_file(&flagged))
    }

    /// Accept the current on-disk state of the reference with the given ID.
    ///
    /// Failures are sent to the notifier and leave the stored reference as it was.
    pub fn acknowledge<R: FileRepository>(&self, repo: &mut R, id: &str) -> Result<FileReference> {
        let mut reference = find_file(repo, id)?;

        if let Err(e) = acknowledge(&mut reference, &self.base_dir) {
            log::error!("Cannot acknowledge {}: {}", id, e);
            match &e {
                FileError::FileNotFound(path) => self.notifier.notify(&format!(
                    "The system cannot find the file specified:\n{}\n",
                    path.display()
                )),
                other => self.notifier.notify(&other.to_string()),
            }
            return Err(eyre::eyre!(e));
        }

        if let Err(e) = repo.transaction(|w| w.save_file(&reference)) {
            self.notifier
                .notify(&format!("Failed to save changes for '{}'", reference.path));
            return Err(e.wrap_err(format!("Failed to acknowledge {}", id)));
        }

        log::info!("Acknowledged changes to '{}' ({})", reference.path, reference.last_modified);
        Ok(reference)
    }

    /// Attach a file picked by the user.
    pub fn attach<R: FileRepository>(&self, repo: &mut R, selected: &Path) -> Result<FileReference> {
        let last_modified = modified_secs(selected).map_err(|e| eyre::eyre!(e))?;
        let path = relative_path(selected, &self.base_dir);
        let name = selected
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.clone());

        let reference = FileReference {
            id: generate_id(&path, last_modified),
            name,
            path,
            last_modified,
            modified: false,
        };
        reference
            .validate()
            .map_err(|e| eyre::eyre!(StoreError::Validation(e)))?;

        repo.transaction(|w| w.save_file(&reference))
            .context("Failed to persist file reference")?;

        log::info!("Attached '{}' as {}", reference.path, reference.id);
        Ok(reference)
    }
}

fn find_file<R: FileRepository>(repo: &R, id: &str) -> Result<FileReference> {
    repo.select_files(&|f| f.id == id)?
        .into_iter()
        .next()
        .ok_or_else(|| eyre::eyre!(StoreError::FileReferenceNotFound(id.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingNotifier;
    use crate::repository::MemoryRepository;
    use std::fs::File;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, mtime: i64) -> PathBuf {
        let path = dir.join(name);
        let file = File::create(&path).unwrap();
        file.set_modified(UNIX_EPOCH + Duration::from_secs(mtime as u64))
            .unwrap();
        path
    }

    fn reference(id: &str, path: &str, last_modified: i64) -> FileReference {
        FileReference {
            id: id.to_string(),
            name: path.to_string(),
            path: path.to_string(),
            last_modified,
            modified: false,
        }
    }

    #[test]
    fn test_modified_secs_truncates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.txt");
        let file = File::create(&path).unwrap();
        file.set_modified(UNIX_EPOCH + Duration::from_millis(1_500_900))
            .unwrap();

        assert_eq!(modified_secs(&path).unwrap(), 1500);
    }

    #[test]
    fn test_inspect_states() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "img.png", 1000);

        assert_eq!(
            inspect(&reference("a", "img.png", 1000), dir.path()).unwrap(),
            FileState::Unchanged
        );
        assert_eq!(
            inspect(&reference("a", "img.png", 999), dir.path()).unwrap(),
            FileState::Changed { on_disk: 1000 }
        );
        assert_eq!(
            inspect(&reference("a", "gone.png", 1000), dir.path()).unwrap(),
            FileState::Missing
        );
    }

    #[test]
    fn test_inspect_empty_path_is_invalid() {
        let dir = TempDir::new().unwrap();
        let result = inspect(&reference("a", "", 1000), dir.path());
        assert!(matches!(result, Err(FileError::InvalidPath(_))));
    }

    #[test]
    fn test_acknowledge_refreshes_timestamp() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "img.png", 2000);

        let mut r = reference("a", "img.png", 1000);
        r.modified = true;
        acknowledge(&mut r, dir.path()).unwrap();

        assert_eq!(r.last_modified, 2000);
        assert!(!r.modified);
    }

    #[test]
    fn test_acknowledge_missing_leaves_state() {
        let dir = TempDir::new().unwrap();
        let mut r = reference("a", "img.png", 1000);
        r.modified = true;
        let before = r.clone();

        let err = acknowledge(&mut r, dir.path()).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(r, before);
    }

    #[test]
    fn test_relative_path_inside_and_outside() {
        let model_dir = Path::new("/models/c4");
        assert_eq!(
            relative_path(Path::new("/models/c4/docs/ctx.png"), model_dir),
            Path::new("docs").join("ctx.png").to_string_lossy()
        );
        assert_eq!(
            relative_path(Path::new("/elsewhere/ctx.png"), model_dir),
            "/elsewhere/ctx.png"
        );
    }

    #[test]
    fn test_describe_missing_and_unknown() {
        let dir = TempDir::new().unwrap();
        let details = describe(&reference("a", "gone.png", 0), dir.path());
        assert_eq!(details.last_modified, "Unknown");
        assert_eq!(details.current_modified, "File not found");
    }

    #[test]
    fn test_describe_formats_timestamps() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "img.png", 1000);
        let details = describe(&reference("a", "img.png", 1000), dir.path());
        assert_eq!(details.current_modified, format_timestamp(1000));
        assert_eq!(details.current_modified.len(), "1970-01-01 00:16:40".len());
    }

    #[test]
    fn test_reconcile_flags_changed_and_missing() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "same.png", 1000);
        write_file(dir.path(), "changed.png", 2000);

        let mut repo = MemoryRepository::new(vec![
            reference("same", "same.png", 1000),
            reference("changed", "changed.png", 1000),
            reference("missing", "missing.png", 1000),
            reference("blank", "", 1000),
        ]);
        let notifier = RecordingNotifier::new();
        let report = Tracker::new(dir.path(), &notifier).reconcile(&mut repo).unwrap();

        assert_eq!(report.checked, 4);
        assert_eq!(report.changed, vec!["changed"]);
        assert_eq!(report.missing.len(), 1);
        assert_eq!(report.missing[0].0, "missing");
        assert_eq!(report.skipped, vec!["blank"]);
        assert!(report.errors.is_empty());

        assert!(!repo.get("same").unwrap().modified);
        assert!(repo.get("changed").unwrap().modified);
        assert!(repo.get("missing").unwrap().modified);
        assert!(!repo.get("blank").unwrap().modified);

        // Only the missing file is notified
        assert_eq!(notifier.messages().len(), 1);
    }

    #[test]
    fn test_reconcile_quiet_about_missing_when_disabled() {
        let dir = TempDir::new().unwrap();
        let mut repo = MemoryRepository::new(vec![reference("missing", "missing.png", 1000)]);
        let notifier = RecordingNotifier::new();

        Tracker::new(dir.path(), &notifier)
            .notify_missing(false)
            .reconcile(&mut repo)
            .unwrap();

        assert!(notifier.is_empty());
        assert!(repo.get("missing").unwrap().modified);
    }

    #[test]
    fn test_attach_records_relative_path_and_mtime() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("docs")).unwrap();
        let selected = write_file(&dir.path().join("docs"), "ctx.png", 1234);

        let mut repo = MemoryRepository::default();
        let notifier = RecordingNotifier::new();
        let attached = Tracker::new(dir.path(), &notifier)
            .attach(&mut repo, &selected)
            .unwrap();

        assert_eq!(attached.name, "ctx.png");
        assert_eq!(attached.path, Path::new("docs").join("ctx.png").to_string_lossy());
        assert_eq!(attached.last_modified, 1234);
        assert!(!attached.modified);
        assert_eq!(repo.files().len(), 1);
    }

    #[test]
    fn test_attach_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let mut repo = MemoryRepository::default();
        let notifier = RecordingNotifier::new();

        let result = Tracker::new(dir.path(), &notifier).attach(&mut repo, &dir.path().join("nope.png"));
        assert!(result.is_err());
        assert!(repo.files().is_empty());
    }

    #[test]
    fn test_tracker_acknowledge_unknown_id() {
        let dir = TempDir::new().unwrap();
        let mut repo = MemoryRepository::default();
        let notifier = RecordingNotifier::new();

        let err = Tracker::new(dir.path(), &notifier)
            .acknowledge(&mut repo, "sf-missing")
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::FileReferenceNotFound(_))
        ));
    }

    #[test]
    fn test_modified_secs_of_fresh_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fresh.txt");
        File::create(&path).unwrap();
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64;
        assert!((modified_secs(&path).unwrap() - now).abs() < 60);
    }
}
