/// Undo support for reverting the most recent organization batch.
///
/// Every successful real move is recorded in an in-memory [`UndoLog`] owned
/// by the [`Organizer`](crate::organizer::Organizer) that performed it.
/// Undoing replays the log in reverse (last move first) and always empties
/// it afterwards, even when individual reversals fail.
use crate::organizer::move_file;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Final log line of every undo, including one with nothing to revert.
pub const UNDO_COMPLETE: &str = "Undo completed.";

/// A single reversible move: where the file is now and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoAction {
    /// Location the file was moved to.
    pub new_path: PathBuf,
    /// Location the file was moved from.
    pub original_path: PathBuf,
}

/// Ordered record of the moves performed by one run.
#[derive(Debug, Clone, Default)]
pub struct UndoLog {
    actions: Vec<UndoAction>,
}

/// Represents the result of an undo operation.
#[derive(Debug, Default)]
pub struct UndoReport {
    /// Number of files successfully restored.
    pub restored_files: usize,
    /// Files that could not be moved back, with the reason.
    pub failed_restores: Vec<(PathBuf, String)>,
    /// Files that were no longer at their recorded location.
    pub skipped_files: Vec<(PathBuf, String)>,
}

impl UndoReport {
    /// Returns the total number of actions processed.
    pub fn total_processed(&self) -> usize {
        self.restored_files + self.failed_restores.len() + self.skipped_files.len()
    }

    /// Returns true if every recorded move was reverted.
    pub fn is_complete_success(&self) -> bool {
        self.failed_restores.is_empty() && self.skipped_files.is_empty()
    }
}

impl UndoLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a completed move.
    pub fn record(&mut self, new_path: PathBuf, original_path: PathBuf) {
        self.actions.push(UndoAction {
            new_path,
            original_path,
        });
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Recorded actions in chronological order.
    pub fn actions(&self) -> &[UndoAction] {
        &self.actions
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }

    /// Moves every recorded file back to where it came from, newest first.
    ///
    /// Each reversal is attempted independently; a failure is reported
    /// through `on_log` and in the returned [`UndoReport`] but does not stop
    /// the remaining ones. The log is empty when this returns, and the last
    /// line reported is always `Undo completed.`.
    ///
    /// If something now occupies an original location, it is renamed to
    /// `<name>.bak.<timestamp>` before the file is restored.
    pub fn undo<L>(&mut self, mut on_log: L) -> UndoReport
    where
        L: FnMut(&str),
    {
        let mut report = UndoReport::default();

        if self.actions.is_empty() {
            info!("No actions to undo");
            on_log("No actions to undo");
            on_log(UNDO_COMPLETE);
            return report;
        }

        for action in self.actions.iter().rev() {
            match restore_file(action) {
                Ok(()) => {
                    info!(from = %action.new_path.display(), to = %action.original_path.display(), "Restored file");
                    on_log(&format!(
                        "Moved {} back to {}",
                        action.new_path.display(),
                        action.original_path.display()
                    ));
                    report.restored_files += 1;
                }
                Err(failure) => {
                    error!(
                        from = %action.new_path.display(),
                        to = %action.original_path.display(),
                        reason = %failure.reason(),
                        "Failed to undo move"
                    );
                    on_log(&format!(
                        "Error undoing move from {} to {}: {}",
                        action.new_path.display(),
                        action.original_path.display(),
                        failure.reason()
                    ));
                    match failure {
                        RestoreFailure::Missing(reason) => {
                            report.skipped_files.push((action.new_path.clone(), reason))
                        }
                        RestoreFailure::Failed(reason) => {
                            report.failed_restores.push((action.new_path.clone(), reason))
                        }
                    }
                }
            }
        }

        self.actions.clear();
        on_log(UNDO_COMPLETE);
        report
    }
}

enum RestoreFailure {
    Missing(String),
    Failed(String),
}

impl RestoreFailure {
    fn reason(&self) -> &str {
        match self {
            RestoreFailure::Missing(reason) | RestoreFailure::Failed(reason) => reason,
        }
    }
}

/// Restores a single file to its original location.
fn restore_file(action: &UndoAction) -> Result<(), RestoreFailure> {
    if !action.new_path.exists() {
        return Err(RestoreFailure::Missing(
            "File not found at expected location".to_string(),
        ));
    }

    if let Some(parent) = action.original_path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            RestoreFailure::Failed(format!("Could not recreate {}: {}", parent.display(), e))
        })?;
    }

    if action.original_path.exists() {
        let backup_path = generate_backup_path(&action.original_path);
        fs::rename(&action.original_path, &backup_path).map_err(|e| {
            RestoreFailure::Failed(format!("Could not backup conflicting file: {}", e))
        })?;
    }

    move_file(&action.new_path, &action.original_path)
        .map_err(|e| RestoreFailure::Failed(format!("Failed to restore file: {}", e)))
}

/// Generates a backup path for a file by appending a timestamp.
///
/// Example: `file.txt` becomes `file.txt.bak.20251109-143052`
fn generate_backup_path(original_path: &Path) -> PathBuf {
    let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let filename = original_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string());

    let backup_name = format!("{}.bak.{}", filename, timestamp);

    match original_path.parent() {
        Some(parent) => parent.join(backup_name),
        None => PathBuf::from(backup_name),
    }
}
