/// Destination resolution for classified files.
///
/// Given a file under an organization root and a [`RuleSet`], this module
/// computes the file's category and a destination path under
/// `root/<category>/`, keeping the file's subdirectory structure and picking
/// a name that does not collide with anything already on disk.
///
/// The only side effect is querying whether candidate paths exist.
use crate::rules::{RuleSet, UNORGANIZED};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that prevent a destination from being computed for one file.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The file does not live under the organization root.
    #[error("{} is not inside {}", .path.display(), .root.display())]
    OutsideRoot { path: PathBuf, root: PathBuf },
    /// The path has no final file name component.
    #[error("{} has no file name", .0.display())]
    MissingFileName(PathBuf),
}

/// The outcome of classifying a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Matched rule name, or [`UNORGANIZED`].
    pub category: String,
    /// Collision-free destination, `None` when no rule matched.
    pub destination: Option<PathBuf>,
}

impl Resolution {
    fn unorganized() -> Self {
        Self {
            category: UNORGANIZED.to_string(),
            destination: None,
        }
    }
}

/// Classifies `file_path` and computes where it should be moved.
///
/// A file at `root/sub/a.jpg` matched by rule `Images` maps to
/// `root/Images/sub/a.jpg`, or to a disambiguated sibling name when that
/// path is already taken.
///
/// # Errors
///
/// Returns [`ResolveError`] if `file_path` is not under `root` or has no
/// file name. Files that simply match no rule are not an error.
///
/// # Examples
///
/// ```no_run
/// use ruletidy::resolver::resolve;
/// use ruletidy::rules::{Rule, RuleSet};
/// use std::path::Path;
///
/// let rules = RuleSet::new(vec![Rule::new("Images", [".jpg"])]);
/// let resolution = resolve(Path::new("/data/sub/a.jpg"), Path::new("/data"), &rules).unwrap();
/// assert_eq!(resolution.category, "Images");
/// ```
pub fn resolve(file_path: &Path, root: &Path, rules: &RuleSet) -> Result<Resolution, ResolveError> {
    let relative_path = file_path
        .strip_prefix(root)
        .map_err(|_| ResolveError::OutsideRoot {
            path: file_path.to_path_buf(),
            root: root.to_path_buf(),
        })?;

    let Some(rule) = rules.match_path(file_path) else {
        return Ok(Resolution::unorganized());
    };

    let destination_path = root.join(rule.name()).join(relative_path);
    let file_name = destination_path
        .file_name()
        .ok_or_else(|| ResolveError::MissingFileName(file_path.to_path_buf()))?
        .to_os_string();
    let parent = destination_path
        .parent()
        .ok_or_else(|| ResolveError::MissingFileName(file_path.to_path_buf()))?;

    let unique_name = unique_file_name(parent, &file_name);
    Ok(Resolution {
        category: rule.name().to_string(),
        destination: Some(parent.join(unique_name)),
    })
}

/// Returns a name for `file_name` that does not exist yet in `directory`.
///
/// The original name is returned untouched when it is free. Otherwise a
/// counter is inserted before the last `.` segment (`file.jpg` becomes
/// `file_1.jpg`, `archive.tar.gz` becomes `archive.tar_1.gz`) or appended
/// when there is no `.` at all (`README` becomes `README_1`).
pub fn unique_file_name(directory: &Path, file_name: &OsStr) -> OsString {
    let mut candidate = file_name.to_os_string();
    let mut counter: u64 = 1;
    while directory.join(&candidate).exists() {
        candidate = numbered_name(file_name, counter);
        counter += 1;
    }
    candidate
}

fn numbered_name(file_name: &OsStr, counter: u64) -> OsString {
    match file_name.to_str() {
        Some(name) => match name.rsplit_once('.') {
            Some((base, extension)) => format!("{}_{}.{}", base, counter, extension).into(),
            None => format!("{}_{}", name, counter).into(),
        },
        // Non UTF-8 names keep their bytes and get the counter appended.
        None => {
            let mut numbered = file_name.to_os_string();
            numbered.push(format!("_{}", counter));
            numbered
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Rule;
    use std::fs;
    use tempfile::TempDir;

    fn sample_rules() -> RuleSet {
        RuleSet::new(vec![
            Rule::new("Images", [".jpg", ".jpeg", ".png"]),
            Rule::new("Documents", [".pdf", ".docx", ".txt"]),
            Rule::new("Archives", [".gz", ".zip"]),
        ])
    }

    #[test]
    fn test_unique_file_name_no_collision() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let name = unique_file_name(temp_dir.path(), OsStr::new("file.jpg"));
        assert_eq!(name, "file.jpg");
    }

    #[test]
    fn test_unique_file_name_one_collision() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(temp_dir.path().join("file.jpg"), "x").expect("Failed to write file");

        let name = unique_file_name(temp_dir.path(), OsStr::new("file.jpg"));
        assert_eq!(name, "file_1.jpg");
    }

    #[test]
    fn test_unique_file_name_multiple_collisions() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        for existing in ["file.jpg", "file_1.jpg", "file_2.jpg"] {
            fs::write(temp_dir.path().join(existing), "x").expect("Failed to write file");
        }

        let name = unique_file_name(temp_dir.path(), OsStr::new("file.jpg"));
        assert_eq!(name, "file_3.jpg");
    }

    #[test]
    fn test_unique_file_name_multiple_dots() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(temp_dir.path().join("archive.tar.gz"), "x").expect("Failed to write file");

        let name = unique_file_name(temp_dir.path(), OsStr::new("archive.tar.gz"));
        assert_eq!(name, "archive.tar_1.gz");
    }

    #[test]
    fn test_unique_file_name_no_extension() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(temp_dir.path().join("README"), "x").expect("Failed to write file");

        assert_eq!(
            unique_file_name(temp_dir.path(), OsStr::new("README")),
            "README_1"
        );
        assert_eq!(
            unique_file_name(temp_dir.path(), OsStr::new("LICENSE")),
            "LICENSE"
        );
    }

    #[test]
    fn test_unique_file_name_counts_existing_directories() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::create_dir(temp_dir.path().join("photo.png")).expect("Failed to create dir");

        let name = unique_file_name(temp_dir.path(), OsStr::new("photo.png"));
        assert_eq!(name, "photo_1.png");
    }

    #[test]
    fn test_resolve_matches_rule() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        let file = root.join("holiday.JPG");

        let resolution = resolve(&file, root, &sample_rules()).expect("resolve failed");
        assert_eq!(resolution.category, "Images");
        assert_eq!(
            resolution.destination,
            Some(root.join("Images").join("holiday.JPG"))
        );
    }

    #[test]
    fn test_resolve_preserves_subdirectories() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        let file = root.join("sub").join("deeper").join("a.jpg");

        let resolution = resolve(&file, root, &sample_rules()).expect("resolve failed");
        assert_eq!(
            resolution.destination,
            Some(root.join("Images").join("sub").join("deeper").join("a.jpg"))
        );
    }

    #[test]
    fn test_resolve_unmatched_is_unorganized() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();

        let resolution =
            resolve(&root.join("song.mp3"), root, &sample_rules()).expect("resolve failed");
        assert_eq!(resolution.category, UNORGANIZED);
        assert!(resolution.destination.is_none());
    }

    #[test]
    fn test_resolve_disambiguates_against_existing_destination() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::create_dir_all(root.join("Archives")).expect("Failed to create dir");
        fs::write(root.join("Archives").join("backup.tar.gz"), "x").expect("Failed to write");

        let resolution =
            resolve(&root.join("backup.tar.gz"), root, &sample_rules()).expect("resolve failed");
        assert_eq!(
            resolution.destination,
            Some(root.join("Archives").join("backup.tar_1.gz"))
        );
    }

    #[test]
    fn test_resolve_outside_root_is_error() {
        let rules = sample_rules();
        let result = resolve(Path::new("/elsewhere/a.jpg"), Path::new("/data"), &rules);
        assert!(matches!(result, Err(ResolveError::OutsideRoot { .. })));
    }

    #[test]
    fn test_resolve_does_not_create_directories() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();

        resolve(&root.join("a.pdf"), root, &sample_rules()).expect("resolve failed");
        assert!(!root.join("Documents").exists());
    }
}
