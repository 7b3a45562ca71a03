/// Rule-driven organization engine.
///
/// An [`Organizer`] walks a directory tree, classifies every eligible file
/// with the [`resolver`](crate::resolver), and moves it into its category
/// folder (or only reports what it would do in a dry run). Real moves are
/// recorded in an [`UndoLog`] so the most recent batch can be reverted.
///
/// Progress, log lines and final statistics are delivered through three
/// caller-supplied callbacks, all invoked synchronously on the thread
/// executing [`Organizer::run`].
use crate::resolver::{ResolveError, resolve};
use crate::rules::{RuleSet, UNORGANIZED};
use crate::undo::{UndoLog, UndoReport};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// Log line emitted when a run is rejected before any work starts.
pub const VALIDATION_FAILED: &str = "Validation failed. Please check your directory and rules.";
/// Final log line of a real run.
pub const ORGANIZATION_COMPLETE: &str = "Organization complete!";
/// Final log line of a dry run.
pub const DRY_RUN_COMPLETE: &str = "Dry run complete. No files were actually moved.";

/// Number of files assigned to each category during one run.
pub type Stats = BTreeMap<String, usize>;

/// Everything needed to describe one organization run.
#[derive(Debug, Clone)]
pub struct OrganizationTask {
    /// Directory to organize. Category folders are created directly under it.
    pub root: PathBuf,
    /// Ordered extension rules.
    pub rules: RuleSet,
    /// Organize files in subdirectories too, not only those directly in `root`.
    pub recursive: bool,
    /// Report what would happen without touching the filesystem.
    pub dry_run: bool,
}

impl OrganizationTask {
    pub fn new(root: impl Into<PathBuf>, rules: RuleSet) -> Self {
        Self {
            root: root.into(),
            rules,
            recursive: false,
            dry_run: false,
        }
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Reasons a task is rejected before any file is touched.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The root does not exist or is not a directory.
    #[error("Invalid directory: {}", .0.display())]
    InvalidDirectory(PathBuf),
    /// The root could not be turned into an absolute path.
    #[error("Invalid directory {}: {source}", .path.display())]
    UnresolvableDirectory { path: PathBuf, source: io::Error },
    /// The rule set is empty.
    #[error("No rules provided")]
    NoRules,
}

/// Failure while handling one file. Never fatal to the run.
#[derive(Debug, Error)]
enum FileError {
    #[error("{0}")]
    Resolve(#[from] ResolveError),
    #[error("could not create {}: {source}", .path.display())]
    CreateDir { path: PathBuf, source: io::Error },
}

/// Organizes files into category subdirectories and remembers how to undo it.
///
/// One instance owns its task and its undo log. Runs take `&mut self`, so a
/// single instance can never be driven by two runs at once; organize
/// independent trees with independent instances.
#[derive(Debug)]
pub struct Organizer {
    task: OrganizationTask,
    undo_log: UndoLog,
}

impl Organizer {
    pub fn new(task: OrganizationTask) -> Self {
        Self {
            task,
            undo_log: UndoLog::new(),
        }
    }

    pub fn task(&self) -> &OrganizationTask {
        &self.task
    }

    /// Moves recorded by the most recent real run that have not been undone.
    pub fn undo_log(&self) -> &UndoLog {
        &self.undo_log
    }

    /// Checks the task and returns the absolute organization root.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the root is not an existing
    /// directory or the rule set is empty.
    pub fn validate(&self) -> Result<PathBuf, ValidationError> {
        if !self.task.root.is_dir() {
            error!(path = %self.task.root.display(), "Invalid directory");
            return Err(ValidationError::InvalidDirectory(self.task.root.clone()));
        }
        if self.task.rules.is_empty() {
            error!("No rules provided");
            return Err(ValidationError::NoRules);
        }
        std::path::absolute(&self.task.root).map_err(|source| {
            ValidationError::UnresolvableDirectory {
                path: self.task.root.clone(),
                source,
            }
        })
    }

    /// Organizes the task's directory.
    ///
    /// `on_progress` receives an integer percentage after every enumerated
    /// file, `on_log` receives one human-readable line per event, and
    /// `on_stats` is called once with the final per-category counts. When
    /// validation fails, a single log line is emitted, neither progress nor
    /// stats are reported, and the error is returned.
    ///
    /// A real run replaces the previous undo batch; a dry run leaves it
    /// alone. Per-file failures are logged, counted as `Unorganized`, and
    /// never abort the run.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use ruletidy::organizer::{OrganizationTask, Organizer};
    /// use ruletidy::rules::{Rule, RuleSet};
    ///
    /// let rules = RuleSet::new(vec![Rule::new("Images", [".jpg", ".png"])]);
    /// let mut organizer = Organizer::new(OrganizationTask::new("/path/to/downloads", rules));
    /// let stats = organizer.run(
    ///     |percent| println!("{}%", percent),
    ///     |line| println!("{}", line),
    ///     |stats| println!("{:?}", stats),
    /// );
    /// ```
    pub fn run<P, L, S>(
        &mut self,
        mut on_progress: P,
        mut on_log: L,
        on_stats: S,
    ) -> Result<Stats, ValidationError>
    where
        P: FnMut(u8),
        L: FnMut(&str),
        S: FnOnce(&Stats),
    {
        let root = match self.validate() {
            Ok(root) => root,
            Err(e) => {
                on_log(VALIDATION_FAILED);
                return Err(e);
            }
        };

        let dry_run = self.task.dry_run;
        if !dry_run {
            self.undo_log.clear();
        }

        let mut stats: Stats = self
            .task
            .rules
            .iter()
            .map(|rule| (rule.name().to_string(), 0))
            .collect();
        stats.insert(UNORGANIZED.to_string(), 0);

        let files = collect_files(&root);
        let total_files = files.len();
        info!(root = %root.display(), total_files, dry_run, recursive = self.task.recursive, "Starting organization");

        for (index, file_path) in files.iter().enumerate() {
            if self.task.recursive || file_path.parent() == Some(root.as_path()) {
                let category = match self.process_file(&root, file_path, &mut on_log) {
                    Ok(category) => category,
                    Err(e) => {
                        let name = file_path
                            .file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_else(|| file_path.display().to_string());
                        error!(path = %file_path.display(), error = %e, "Unexpected error while processing file");
                        on_log(&format!(
                            "An unexpected error occurred while processing {}: {}. Skipping.",
                            name, e
                        ));
                        UNORGANIZED.to_string()
                    }
                };
                *stats.entry(category).or_insert(0) += 1;
            } else {
                debug!(path = %file_path.display(), "Skipping file outside root (not recursive)");
            }

            if total_files > 0 {
                let percent = (index + 1) * 100 / total_files;
                on_progress(percent as u8);
            }
        }

        on_log(if dry_run {
            DRY_RUN_COMPLETE
        } else {
            ORGANIZATION_COMPLETE
        });
        info!(moved = self.undo_log.len(), "Organization finished");
        on_stats(&stats);
        Ok(stats)
    }

    /// Handles one eligible file and returns the category it counts toward.
    fn process_file<L>(
        &mut self,
        root: &Path,
        file_path: &Path,
        on_log: &mut L,
    ) -> Result<String, FileError>
    where
        L: FnMut(&str),
    {
        let resolution = resolve(file_path, root, &self.task.rules)?;
        let relative = relative_display(file_path, root);

        let Some(destination) = resolution.destination else {
            on_log(&format!("Unrecognized file type: {}", relative));
            return Ok(UNORGANIZED.to_string());
        };
        let relative_destination = relative_display(&destination, root);

        if self.task.dry_run {
            on_log(&format!(
                "Would move {} to {}",
                relative, relative_destination
            ));
            return Ok(resolution.category);
        }

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|source| FileError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        match move_file(file_path, &destination) {
            Ok(()) => {
                self.undo_log
                    .record(destination.clone(), file_path.to_path_buf());
                on_log(&format!("Moved {} to {}", relative, relative_destination));
                Ok(resolution.category)
            }
            Err(e) => {
                warn!(
                    from = %file_path.display(),
                    to = %destination.display(),
                    error = %e,
                    "Failed to move file"
                );
                on_log(&move_error_line(&relative, &e));
                Ok(UNORGANIZED.to_string())
            }
        }
    }

    /// Reverts the most recent real run. See [`UndoLog::undo`].
    pub fn undo<L>(&mut self, on_log: L) -> UndoReport
    where
        L: FnMut(&str),
    {
        self.undo_log.undo(on_log)
    }
}

/// Lists every file under `root`, sorted by name within each directory.
///
/// Symlinks whose target is a regular file are listed too; the link itself
/// is what gets moved. Symlinked directories are not descended into.
/// Unreadable entries are logged and left out.
pub(crate) fn collect_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry");
                None
            }
        })
        .filter(|entry| {
            entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
        })
        .map(|entry| entry.into_path())
        .collect()
}

/// Moves a file, falling back to copy and delete across filesystems.
pub(crate) fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            debug!(from = %from.display(), to = %to.display(), "Rename crossed devices, copying instead");
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
        Err(e) => Err(e),
    }
}

fn move_error_line(relative: &str, error: &io::Error) -> String {
    match error.kind() {
        io::ErrorKind::NotFound => format!("Error: File not found {}. Skipping.", relative),
        io::ErrorKind::PermissionDenied => {
            format!("Error: Permission denied for {}. Skipping.", relative)
        }
        _ => format!("Error moving file {}: {}. Skipping.", relative, error),
    }
}

fn relative_display(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
