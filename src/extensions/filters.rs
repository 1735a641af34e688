use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::trace;

static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,\s]+").expect("static regex"));

pub const DEFAULT_EXTENSION_CATEGORIES: &[&str] = &["Text Files", "Code Files"];

/// Parses a free-text list of extensions separated by commas, spaces or newlines.
///
/// Every entry gets a leading dot and is lowercased; first-seen order is kept.
pub fn parse_extensions(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut extensions = Vec::new();
    for raw in SEPARATORS.split(text) {
        let item = raw.trim();
        if item.is_empty() || item == "." {
            continue;
        }
        let normalized = if item.starts_with('.') {
            item.to_lowercase()
        } else {
            format!(".{}", item.to_lowercase())
        };
        if seen.insert(normalized.clone()) {
            extensions.push(normalized);
        }
    }
    trace!("Parsed extensions {:?} from {:?}", extensions, text);
    extensions
}

pub fn parse_categories(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Named extension groups used by the simple group-based filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionGroups {
    groups: BTreeMap<String, Vec<String>>,
}

impl Default for ExtensionGroups {
    fn default() -> Self {
        let defaults: [(&str, &[&str]); 3] = [
            (
                "Text Files",
                &[".txt", ".md", ".asc", ".dok", ".text", ".rtf", ".rst", ".tex"],
            ),
            (
                "Data Files",
                &[
                    ".csv", ".log", ".xlog", ".lst", ".tsv", ".json", ".xml", ".yml", ".yaml",
                    ".ini",
                ],
            ),
            (
                "Code Files",
                &[
                    ".py", ".cs", ".rs", ".html", ".htm", ".js", ".ts", ".c", ".cpp", ".java",
                    ".bat", ".sh", ".ps1", ".css", ".go", ".rb", ".php",
                ],
            ),
        ];
        let groups = defaults
            .into_iter()
            .map(|(name, exts)| {
                (
                    name.to_owned(),
                    exts.iter().map(|e| (*e).to_owned()).collect(),
                )
            })
            .collect();
        ExtensionGroups { groups }
    }
}

impl ExtensionGroups {
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.groups.get(name).map(Vec::as_slice)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }
}

/// Union of the named groups, sorted. `allow_all` means no filtering at all.
pub fn build_extension_filters(
    categories: &[String],
    allow_all: bool,
    groups: &ExtensionGroups,
) -> Vec<String> {
    if allow_all {
        return Vec::new();
    }
    let mut extensions = BTreeSet::new();
    for name in categories {
        if let Some(group) = groups.get(name) {
            extensions.extend(group.iter().cloned());
        }
    }
    extensions.into_iter().collect()
}
