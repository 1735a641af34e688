//! Translation of WSL2 paths into Windows UNC paths.

use std::path::Path;
use std::process::Command;
use tracing::{debug, warn};

/// Name of the default WSL distribution, read from `wsl -l -q`.
///
/// `wsl.exe` prints UTF-16LE with embedded NULs, so the output is decoded
/// explicitly and the first non-empty line is taken.
pub fn get_default_wsl_distro() -> Option<String> {
    let output = match Command::new("wsl").args(["-l", "-q"]).output() {
        Ok(output) if output.status.success() => output.stdout,
        Ok(output) => {
            warn!(
                "Encountered absolute Unix filepath in Windows. wsl -l exited with {}",
                output.status
            );
            return None;
        }
        Err(e) => {
            warn!(
                "Encountered absolute Unix filepath in Windows. Error retrieving WSL distros: {}",
                e
            );
            return None;
        }
    };
    parse_distro_list(&output)
}

/// First distribution name from raw `wsl -l -q` output.
pub fn parse_distro_list(raw: &[u8]) -> Option<String> {
    let units: Vec<u16> = raw
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    let decoded = String::from_utf16_lossy(&units);
    decoded
        .lines()
        .map(|line| {
            line.trim_matches(|c: char| c.is_whitespace() || c == '\0' || c == '\u{feff}')
        })
        .find(|line| !line.is_empty())
        .map(str::to_owned)
}

pub fn to_unc_path(distro: &str, filepath: &str) -> String {
    format!("\\\\wsl.localhost\\{}{}", distro, filepath.replace('/', "\\"))
}

/// Pure core of [`convert_wsl_path`] with every environment lookup injected.
pub fn convert_wsl_path_with<F>(
    filepath: &str,
    is_windows: bool,
    distro: Option<&str>,
    exists: F,
) -> String
where
    F: Fn(&Path) -> bool,
{
    if !is_windows || !filepath.starts_with('/') {
        return filepath.to_owned();
    }
    if let Some(distro) = distro {
        let windows_path = to_unc_path(distro, filepath);
        if exists(Path::new(&windows_path)) {
            debug!("Converted {} to {}", filepath, windows_path);
            return windows_path;
        }
    }
    filepath.to_owned()
}

/// Converts a WSL2 path to a Windows-compatible path.
///
/// When a network host is given the path is assumed to live on that host and
/// is returned untouched.
pub fn convert_wsl_path(filepath: &str, network_host: Option<&str>) -> String {
    if network_host.is_some_and(|host| !host.is_empty()) {
        return filepath.to_owned();
    }
    let is_windows = cfg!(windows);
    if !is_windows || !filepath.starts_with('/') {
        return filepath.to_owned();
    }
    let distro = get_default_wsl_distro();
    convert_wsl_path_with(filepath, is_windows, distro.as_deref(), |p| p.exists())
}
