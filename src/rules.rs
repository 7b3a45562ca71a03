/// Extension rules for classifying files into categories.
///
/// A [`RuleSet`] is an ordered list of [`Rule`]s. Each rule names a category
/// (which doubles as the destination folder name) and the set of file
/// extensions that belong to it. The first rule containing a file's extension
/// wins.
///
/// # Examples
///
/// ```
/// use ruletidy::rules::{Rule, RuleSet};
/// use std::path::Path;
///
/// let rules = RuleSet::new(vec![
///     Rule::new("Images", [".jpg", ".png"]),
///     Rule::new("Documents", [".pdf"]),
/// ]);
/// assert_eq!(rules.match_path(Path::new("holiday.JPG")).map(|r| r.name()), Some("Images"));
/// assert!(rules.match_path(Path::new("notes.md")).is_none());
/// ```
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Reserved category for files that match no rule or could not be moved.
pub const UNORGANIZED: &str = "Unorganized";

/// A named set of extensions mapping files to a destination subfolder.
///
/// Extensions are stored lower-cased with a leading `.`, so `"JPG"`,
/// `"jpg"` and `".jpg"` all describe the same extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    name: String,
    #[serde(deserialize_with = "deserialize_extensions")]
    extensions: BTreeSet<String>,
}

impl Rule {
    /// Creates a rule, normalizing every extension.
    pub fn new<I, S>(name: impl Into<String>, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.into(),
            extensions: extensions
                .into_iter()
                .map(|ext| normalize_extension(ext.as_ref()))
                .collect(),
        }
    }

    /// The category label, also used as the destination folder name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The normalized extensions, in sorted order.
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }

    /// Returns true if `extension` (with leading `.`) belongs to this rule.
    pub fn contains(&self, extension: &str) -> bool {
        self.extensions.contains(&extension.to_lowercase())
    }
}

/// An ordered collection of rules; earlier rules take priority.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    /// Finds the first rule whose extension set contains `extension`.
    pub fn match_extension(&self, extension: &str) -> Option<&Rule> {
        let extension = extension.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.extensions.contains(&extension))
    }

    /// Finds the rule for a path by its last extension component.
    ///
    /// Files without an extension (including dot-files such as `.bashrc`)
    /// never match.
    pub fn match_path(&self, path: &Path) -> Option<&Rule> {
        file_extension(path).and_then(|ext| self.match_extension(&ext))
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<T: IntoIterator<Item = Rule>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Returns the lower-cased suffix of `path` including its leading `.`.
pub fn file_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
}

/// Lower-cases an extension and makes sure it starts with a `.`.
pub fn normalize_extension(extension: &str) -> String {
    let trimmed = extension.trim().to_lowercase();
    if trimmed.starts_with('.') {
        trimmed
    } else {
        format!(".{}", trimmed)
    }
}

fn deserialize_extensions<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Vec::<String>::deserialize(deserializer)?;
    Ok(raw.iter().map(|ext| normalize_extension(ext)).collect())
}
