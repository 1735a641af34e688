pub mod ssh;

use crate::ignore::IgnoreFilter;
use crate::ClipError;
use async_trait::async_trait;

pub use ssh::{shell_quote, CommandOutput, CommandRunner, SshSession, SystemRunner};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteFileType {
    File,
    Directory,
    Other,
}

/// Read-only view of a remote filesystem.
#[async_trait]
pub trait RemoteFs: Send + Sync {
    fn is_connected(&self) -> bool;

    /// `Ok(None)` when the path does not exist.
    async fn stat(&self, path: &str) -> Result<Option<RemoteFileType>, ClipError>;

    async fn read_bytes(&self, path: &str) -> Result<Vec<u8>, ClipError>;

    /// Every regular file below `root`, skipping ignored directories.
    async fn list_tree(&self, root: &str, ignore: &IgnoreFilter)
        -> Result<Vec<String>, ClipError>;
}

/// Remote paths are absolute POSIX paths; anything else is local.
pub fn is_remote_path(path: &str) -> bool {
    path.starts_with('/')
}

/// The remote to use for `path`, if any: only a connected remote and only for
/// absolute POSIX paths.
pub fn remote_for<'a>(path: &str, remote: Option<&'a dyn RemoteFs>) -> Option<&'a dyn RemoteFs> {
    remote.filter(|r| r.is_connected() && is_remote_path(path))
}
