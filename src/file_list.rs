use crate::ignore::IgnoreFilter;
use crate::listing::{list_files, list_remote_files};
use crate::remote::RemoteFs;
use crate::utils::{common_root, safe_relpath, strip_quotes};
use crate::wsl::convert_wsl_path;
use crate::ClipError;
use std::path::Path;
use tracing::{debug, warn};

/// Ordered, duplicate-free selection of files plus the root used for display.
#[derive(Debug, Clone, Default)]
pub struct FileList {
    files: Vec<String>,
    root: Option<String>,
}

impl FileList {
    pub fn new() -> Self {
        FileList::default()
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.iter().any(|f| f == path)
    }

    /// Appends `path` unless it is already present.
    pub fn add_file(&mut self, path: impl Into<String>) -> bool {
        let path = path.into();
        if self.contains(&path) {
            debug!("{} is already in the list", path);
            return false;
        }
        self.files.push(path);
        true
    }

    /// Adds every file below `folder`. Returns how many were new.
    pub fn add_folder(
        &mut self,
        folder: &Path,
        extensions: Option<&[String]>,
        ignore: Option<&IgnoreFilter>,
    ) -> Result<usize, ClipError> {
        let found = list_files(folder, extensions, ignore)?;
        let added = found
            .into_iter()
            .filter(|path| self.add_file(path.to_string_lossy().into_owned()))
            .count();
        debug!("Added {} files from {}", added, folder.display());
        Ok(added)
    }

    /// Remote counterpart of [`FileList::add_folder`].
    pub async fn add_remote_folder(
        &mut self,
        remote: &dyn RemoteFs,
        folder: &str,
        extensions: Option<&[String]>,
        ignore: Option<&IgnoreFilter>,
    ) -> Result<usize, ClipError> {
        let found = list_remote_files(remote, folder, extensions, ignore).await?;
        Ok(found.into_iter().filter(|path| self.add_file(path.clone())).count())
    }

    /// Adds one path per line; surrounding quotes are stripped and WSL paths
    /// converted. Lines naming missing files are returned instead.
    pub fn add_from_text(&mut self, text: &str) -> Vec<String> {
        let mut not_found = Vec::new();
        for line in text.lines() {
            let line = strip_quotes(line.trim());
            if line.is_empty() {
                continue;
            }
            let path = convert_wsl_path(line, None);
            if Path::new(&path).is_file() {
                self.add_file(path);
            } else {
                warn!("File not found: {}", line);
                not_found.push(line.to_owned());
            }
        }
        not_found
    }

    pub fn remove(&mut self, index: usize) -> Option<String> {
        (index < self.files.len()).then(|| self.files.remove(index))
    }

    /// Moves the entry at `from` to position `to`. Out-of-range indices are ignored.
    pub fn move_item(&mut self, from: usize, to: usize) -> bool {
        if from >= self.files.len() || to >= self.files.len() {
            return false;
        }
        let item = self.files.remove(from);
        self.files.insert(to, item);
        true
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn root(&self) -> Option<&str> {
        self.root.as_deref()
    }

    pub fn set_root(&mut self, root: impl Into<String>) {
        let root = root.into();
        self.root = (!root.is_empty()).then_some(root);
    }

    pub fn clear_root(&mut self) {
        self.root = None;
    }

    /// Paths as they appear in the copied text, with any relpath warnings.
    pub fn display_names(&self) -> (Vec<String>, Vec<String>) {
        let mut names = Vec::with_capacity(self.files.len());
        let mut warnings = Vec::new();
        for file in &self.files {
            let (name, warning) = safe_relpath(file, self.root.as_deref());
            names.push(name);
            if let Some(warning) = warning {
                if !warnings.contains(&warning) {
                    warnings.push(warning);
                }
            }
        }
        (names, warnings)
    }

    /// Deepest common directory of the selection.
    pub fn suggested_root(&self) -> Option<String> {
        let root = common_root(&self.files)?;
        let root = if self.files.len() == 1 || root.is_file() {
            root.parent().map(Path::to_path_buf)?
        } else {
            root
        };
        Some(root.to_string_lossy().into_owned())
    }
}
