//! Local-versus-remote path resolution.

use crate::remote::{remote_for, RemoteFileType, RemoteFs};
use crate::wsl::convert_wsl_path;
use tokio::fs as async_fs;
use tracing::trace;

async fn remote_type(path: &str, remote: &dyn RemoteFs) -> Option<RemoteFileType> {
    match remote.stat(path).await {
        Ok(file_type) => file_type,
        Err(e) => {
            trace!("Remote stat of {} failed: {}", path, e);
            None
        }
    }
}

pub async fn is_file(path: &str, remote: Option<&dyn RemoteFs>) -> bool {
    if let Some(remote) = remote_for(path, remote) {
        return remote_type(path, remote).await == Some(RemoteFileType::File);
    }
    async_fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

pub async fn is_dir(path: &str, remote: Option<&dyn RemoteFs>) -> bool {
    if let Some(remote) = remote_for(path, remote) {
        return remote_type(path, remote).await == Some(RemoteFileType::Directory);
    }
    async_fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

/// Resolves special paths: remote paths that exist on the connected host are
/// kept as-is, everything else goes through WSL conversion.
pub async fn convert_path(path: &str, remote: Option<&dyn RemoteFs>) -> String {
    if let Some(remote) = remote_for(path, remote) {
        if matches!(
            remote_type(path, remote).await,
            Some(RemoteFileType::File | RemoteFileType::Directory)
        ) {
            return path.to_owned();
        }
    }
    convert_wsl_path(path, None)
}
