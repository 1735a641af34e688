use crate::ClipError;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

const DIFFERENT_DRIVES_WARNING: &str = "Cannot calculate relative path because the file and root path are on different drives or filesystems. Displaying the absolute path instead.";

pub fn normalize_path(path: &str) -> String {
    let stripped = path.strip_prefix("./").unwrap_or(path);
    stripped.replace('\\', "/")
}

pub fn strip_quotes(text: &str) -> &str {
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        &text[1..text.len() - 1]
    } else {
        text
    }
}

/// Final path component, or the path itself when it has none.
pub fn basename(path: &str) -> String {
    let trimmed = path.trim_end_matches(['/', '\\']);
    trimmed
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or(path)
        .to_owned()
}

/// Collapses `.` and `..` without touching the filesystem.
pub fn lexical_normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

enum RelpathError {
    DifferentDrives,
    Io(std::io::Error),
}

impl From<std::io::Error> for RelpathError {
    fn from(err: std::io::Error) -> Self {
        RelpathError::Io(err)
    }
}

fn absolutize(path: &Path) -> Result<PathBuf, std::io::Error> {
    if path.is_absolute() {
        Ok(lexical_normalize(path))
    } else {
        let cwd = std::env::current_dir()?;
        Ok(lexical_normalize(&cwd.join(path)))
    }
}

fn drive_prefix(path: &Path) -> Option<Component<'_>> {
    match path.components().next() {
        Some(prefix @ Component::Prefix(_)) => Some(prefix),
        _ => None,
    }
}

fn relative_path(path: &Path, start: &Path) -> Result<PathBuf, RelpathError> {
    if path.as_os_str().is_empty() {
        return Err(RelpathError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "no path specified",
        )));
    }
    let path = absolutize(path)?;
    let start = absolutize(start)?;

    if drive_prefix(&path) != drive_prefix(&start) {
        return Err(RelpathError::DifferentDrives);
    }

    let path_parts: Vec<Component> = path.components().collect();
    let start_parts: Vec<Component> = start.components().collect();
    let common = path_parts
        .iter()
        .zip(&start_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..start_parts.len() {
        relative.push("..");
    }
    for part in &path_parts[common..] {
        relative.push(part.as_os_str());
    }
    if relative.as_os_str().is_empty() {
        relative.push(".");
    }
    Ok(relative)
}

/// Display path for `path`: relative to `start` when possible, with a warning
/// message when it has to fall back to the absolute path.
///
/// The root itself is shown as `.`; an empty path is an error and comes back
/// unchanged with a warning.
pub fn safe_relpath(path: &str, start: Option<&str>) -> (String, Option<String>) {
    let start = match start {
        Some(start) if !start.is_empty() => start,
        _ => return (basename(path), None),
    };
    match relative_path(Path::new(path), Path::new(start)) {
        Ok(relative) => (relative.to_string_lossy().into_owned(), None),
        Err(RelpathError::DifferentDrives) => {
            debug!("{} and {} are on different drives", path, start);
            (path.to_owned(), Some(DIFFERENT_DRIVES_WARNING.to_owned()))
        }
        Err(RelpathError::Io(e)) => (
            path.to_owned(),
            Some(format!(
                "Failed to calculate relative path:\n{}\nDisplaying the absolute path instead.",
                e
            )),
        ),
    }
}

/// Deepest directory containing every path, compared component-wise.
pub fn common_root<P: AsRef<Path>>(paths: &[P]) -> Option<PathBuf> {
    let mut iter = paths.iter();
    let first = lexical_normalize(iter.next()?.as_ref());
    let mut common: Vec<Component> = first.components().collect();
    let others: Vec<PathBuf> = iter.map(|p| lexical_normalize(p.as_ref())).collect();
    for other in &others {
        let shared = common
            .iter()
            .zip(other.components())
            .take_while(|(a, b)| *a == b)
            .count();
        common.truncate(shared);
    }
    if common.is_empty() {
        return None;
    }
    let root: PathBuf = common.iter().map(|c| c.as_os_str()).collect();
    Some(root)
}

/// Expands a glob pattern into the existing files it matches.
pub fn expand_glob(pattern: &str) -> Result<Vec<String>, ClipError> {
    let mut files = Vec::new();
    for entry in glob::glob(pattern)? {
        match entry {
            Ok(path) if path.is_file() => files.push(path.to_string_lossy().into_owned()),
            Err(e) => warn!("Error processing pattern {}: {:?}", pattern, e),
            _ => {}
        }
    }
    Ok(files)
}

pub fn looks_like_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}
