use crate::ignore::IgnoreFilter;
use crate::remote::RemoteFs;
use crate::ClipError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};
use walkdir::{DirEntry, WalkDir};

fn extension_allowed(name: &str, allowed: &HashSet<String>) -> bool {
    if allowed.is_empty() {
        return true;
    }
    match Path::new(name).extension() {
        Some(ext) => allowed.contains(&format!(".{}", ext.to_string_lossy().to_lowercase())),
        None => false,
    }
}

fn allowed_set(extensions: Option<&[String]>) -> HashSet<String> {
    extensions
        .unwrap_or_default()
        .iter()
        .map(|e| e.to_lowercase())
        .collect()
}

/// Regular files, and symlinks that resolve to one. Symlinked directories are
/// not followed.
fn is_listed_file(entry: &DirEntry) -> bool {
    if entry.file_type().is_file() {
        return true;
    }
    entry.path_is_symlink()
        && std::fs::metadata(entry.path()).is_ok_and(|meta| meta.is_file())
}

/// Recursively lists files below `root`.
///
/// Ignored directories are never entered. An empty or absent extension list
/// keeps every file.
pub fn list_files(
    root: &Path,
    extensions: Option<&[String]>,
    ignore: Option<&IgnoreFilter>,
) -> Result<Vec<PathBuf>, ClipError> {
    if !root.is_dir() {
        return Err(ClipError::NotFound(root.display().to_string()));
    }
    let allowed = allowed_set(extensions);
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            let Some(ignore) = ignore else {
                return true;
            };
            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
            let pruned = ignore.is_ignored_dir(relative);
            if pruned {
                trace!("Pruning ignored directory {}", entry.path().display());
            }
            !pruned
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };
        if is_listed_file(&entry)
            && extension_allowed(&entry.file_name().to_string_lossy(), &allowed)
        {
            files.push(entry.into_path());
        }
    }

    debug!("Listed {} files under {}", files.len(), root.display());
    Ok(files)
}

/// Remote counterpart of [`list_files`], returning POSIX paths.
pub async fn list_remote_files(
    remote: &dyn RemoteFs,
    root: &str,
    extensions: Option<&[String]>,
    ignore: Option<&IgnoreFilter>,
) -> Result<Vec<String>, ClipError> {
    let allowed = allowed_set(extensions);
    let empty = IgnoreFilter::default();
    let ignore = ignore.unwrap_or(&empty);
    let root_prefix = format!("{}/", root.trim_end_matches('/'));

    let mut files: Vec<String> = remote
        .list_tree(root, ignore)
        .await?
        .into_iter()
        .filter(|path| {
            let relative = path.strip_prefix(&root_prefix).unwrap_or(path);
            let (parent, name) = relative.rsplit_once('/').unwrap_or(("", relative));
            let mut dir = String::new();
            for segment in parent.split('/').filter(|s| !s.is_empty()) {
                if !dir.is_empty() {
                    dir.push('/');
                }
                dir.push_str(segment);
                if ignore.is_ignored_posix(&dir) {
                    return false;
                }
            }
            extension_allowed(name, &allowed)
        })
        .collect();
    files.sort();

    debug!("Listed {} remote files under {}", files.len(), root);
    Ok(files)
}
