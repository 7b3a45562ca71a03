/// Read-only preview of an organization run.
///
/// Produces the same classification an [`Organizer`] would apply, without
/// creating folders, moving files, or invoking any callbacks.
use crate::organizer::{Organizer, ValidationError, collect_files};
use crate::resolver::resolve;
use crate::rules::UNORGANIZED;
use std::fmt;
use std::path::PathBuf;
use tracing::error;

/// Where a previewed file would end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewTarget {
    /// The file would be moved here.
    Destination(PathBuf),
    /// No rule matches the file.
    Unorganized,
    /// The file could not be classified.
    Error(String),
}

impl fmt::Display for PreviewTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreviewTarget::Destination(path) => write!(f, "{}", path.display()),
            PreviewTarget::Unorganized => f.write_str(UNORGANIZED),
            PreviewTarget::Error(reason) => write!(f, "Error processing: {}", reason),
        }
    }
}

/// One file in a preview: its current absolute path and its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewEntry {
    pub source: PathBuf,
    pub target: PreviewTarget,
}

impl Organizer {
    /// Computes where every eligible file would go, without touching disk.
    ///
    /// Files skipped by the non-recursive policy are left out of the result
    /// entirely. A file that cannot be classified is reported with a
    /// [`PreviewTarget::Error`] instead of aborting the preview.
    ///
    /// # Errors
    ///
    /// Returns the same [`ValidationError`] as [`Organizer::run`].
    pub fn preview(&self) -> Result<Vec<PreviewEntry>, ValidationError> {
        let root = self.validate()?;
        let task = self.task();

        let entries = collect_files(&root)
            .into_iter()
            .filter(|path| task.recursive || path.parent() == Some(root.as_path()))
            .map(|source| {
                let target = match resolve(&source, &root, &task.rules) {
                    Ok(resolution) => match resolution.destination {
                        Some(destination) => PreviewTarget::Destination(destination),
                        None => PreviewTarget::Unorganized,
                    },
                    Err(e) => {
                        error!(path = %source.display(), error = %e, "Error generating preview");
                        PreviewTarget::Error(e.to_string())
                    }
                };
                PreviewEntry { source, target }
            })
            .collect();

        Ok(entries)
    }
}
