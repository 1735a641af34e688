use super::{RemoteFileType, RemoteFs};
use crate::ignore::IgnoreFilter;
use crate::ClipError;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, trace, warn};

const SSH_PROGRAM: &str = "ssh";
const CONNECT_TIMEOUT_SECS: u32 = 10;
const KEEPALIVE_SECS: u32 = 30;
const CONTROL_PERSIST_SECS: u32 = 60;
const SSH_FAILURE_CODE: i32 = 255;
const FILE_TEST: &str = "\\( -type f -o -type l -xtype f \\)";

#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_owned()
    }

    fn is_ssh_failure(&self) -> bool {
        self.code == Some(SSH_FAILURE_CODE)
    }

    fn is_auth_failure(&self) -> bool {
        let stderr = self.stderr_text();
        self.is_ssh_failure()
            && (stderr.contains("Permission denied")
                || stderr.contains("Too many authentication failures"))
    }
}

/// Runs external programs. Interactive runs share the terminal so `ssh` can prompt.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        interactive: bool,
    ) -> std::io::Result<CommandOutput>;
}

pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        interactive: bool,
    ) -> std::io::Result<CommandOutput> {
        let mut command = Command::new(program);
        command.args(args).kill_on_drop(true);
        if interactive {
            command.stdin(Stdio::inherit()).stderr(Stdio::inherit());
        } else {
            command.stdin(Stdio::null());
        }
        let output = command.output().await?;
        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// Single-quotes a string for a POSIX shell on the remote side.
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}

/// `find` invocation listing regular files, and symlinks to regular files,
/// below `root` while pruning ignored directories on the remote side.
pub fn build_find_command(root: &str, ignore: &IgnoreFilter) -> String {
    let tests: Vec<String> = ignore
        .names()
        .iter()
        .map(|entry| {
            if entry.contains('/') {
                format!("-path {}", shell_quote(&format!("*/{}", entry)))
            } else {
                format!("-name {}", shell_quote(entry))
            }
        })
        .collect();

    if tests.is_empty() {
        format!("find {} {} -print", shell_quote(root), FILE_TEST)
    } else {
        format!(
            "find {} -mindepth 1 -type d \\( {} \\) -prune -o {} -print",
            shell_quote(root),
            tests.join(" -o "),
            FILE_TEST
        )
    }
}

/// A connection to a remote host through the system `ssh` client.
///
/// All commands share one control socket, so only `connect` pays for the
/// handshake and authentication.
pub struct SshSession<R: CommandRunner = SystemRunner> {
    host: Option<String>,
    username: Option<String>,
    connected: bool,
    control_path: PathBuf,
    runner: R,
}

impl SshSession<SystemRunner> {
    pub fn new(host: Option<String>, username: Option<String>) -> Self {
        SshSession::with_runner(host, username, SystemRunner)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl<R: CommandRunner> SshSession<R> {
    pub fn with_runner(host: Option<String>, username: Option<String>, runner: R) -> Self {
        SshSession {
            host: non_empty(host),
            username: non_empty(username),
            connected: false,
            control_path: std::env::temp_dir().join("code2clip-ssh-%r@%h:%p"),
            runner,
        }
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn is_configured(&self) -> bool {
        self.host.is_some() && self.username.is_some()
    }

    fn destination(&self) -> Result<String, ClipError> {
        match (&self.host, &self.username) {
            (Some(host), Some(user)) => Ok(format!("{}@{}", user, host)),
            _ => Err(ClipError::SshNotConfigured),
        }
    }

    fn ssh_args(&self, batch_mode: bool) -> Vec<String> {
        let options = [
            "ControlMaster=auto".to_owned(),
            format!("ControlPath={}", self.control_path.display()),
            format!("ControlPersist={}", CONTROL_PERSIST_SECS),
            format!("ConnectTimeout={}", CONNECT_TIMEOUT_SECS),
            format!("ServerAliveInterval={}", KEEPALIVE_SECS),
            "StrictHostKeyChecking=accept-new".to_owned(),
            format!("BatchMode={}", if batch_mode { "yes" } else { "no" }),
        ];
        options
            .into_iter()
            .flat_map(|option| ["-o".to_owned(), option])
            .collect()
    }

    /// Changes the target and drops any existing session.
    pub async fn configure(&mut self, host: &str, username: &str) {
        self.close().await;
        self.host = non_empty(Some(host.to_owned()));
        self.username = non_empty(Some(username.to_owned()));
        debug!(
            "SSH configured for {:?}@{:?}",
            self.username.as_deref(),
            self.host.as_deref()
        );
    }

    /// Opens the shared connection. Key-based authentication is tried first;
    /// when it is rejected and `allow_interactive` is set, `ssh` is re-run on the
    /// terminal so it can ask for a password.
    pub async fn connect(&mut self, allow_interactive: bool) -> Result<(), ClipError> {
        let destination = self.destination()?;
        if self.connected {
            return Ok(());
        }

        let mut args = self.ssh_args(true);
        args.push(destination.clone());
        args.push("true".to_owned());
        let output = self
            .runner
            .run(SSH_PROGRAM, &args, false)
            .await
            .map_err(|e| ClipError::SshError(format!("Could not run ssh: {}", e)))?;

        if output.success {
            info!("Connected to {}", destination);
            self.connected = true;
            return Ok(());
        }
        if !output.is_auth_failure() {
            return Err(ClipError::SshError(format!(
                "SSH connection to '{}' failed: {}",
                destination,
                output.stderr_text()
            )));
        }
        if !allow_interactive {
            return Err(ClipError::SshAuthError(
                "Authentication required but interactive login is disabled.".to_owned(),
            ));
        }

        debug!("Key authentication rejected for {}, retrying interactively", destination);
        let mut args = self.ssh_args(false);
        args.push(destination.clone());
        args.push("true".to_owned());
        let output = self
            .runner
            .run(SSH_PROGRAM, &args, true)
            .await
            .map_err(|e| ClipError::SshError(format!("Could not run ssh: {}", e)))?;

        if output.success {
            info!("Connected to {}", destination);
            self.connected = true;
            Ok(())
        } else if output.is_ssh_failure() {
            Err(ClipError::SshAuthError(format!(
                "Authentication to '{}' failed: {}",
                destination,
                output.stderr_text()
            )))
        } else {
            Err(ClipError::Cancelled("Authentication canceled.".to_owned()))
        }
    }

    pub async fn close(&mut self) {
        if !self.connected {
            return;
        }
        self.connected = false;
        let Ok(destination) = self.destination() else {
            return;
        };
        let mut args = self.ssh_args(true);
        args.extend(["-O".to_owned(), "exit".to_owned(), destination]);
        match self.runner.run(SSH_PROGRAM, &args, false).await {
            Ok(_) => debug!("Closed SSH control connection"),
            Err(e) => warn!("Failed to close SSH control connection: {}", e),
        }
    }

    async fn exec(&self, remote_command: String) -> Result<CommandOutput, ClipError> {
        if !self.connected {
            return Err(ClipError::SshError("Not connected".to_owned()));
        }
        let mut args = self.ssh_args(true);
        args.push(self.destination()?);
        trace!("Running remote command: {}", remote_command);
        args.push(remote_command);
        let output = self
            .runner
            .run(SSH_PROGRAM, &args, false)
            .await
            .map_err(|e| ClipError::SshError(format!("Could not run ssh: {}", e)))?;
        if output.is_ssh_failure() {
            return Err(ClipError::SshError(output.stderr_text()));
        }
        Ok(output)
    }

    pub async fn path_exists(&self, path: &str) -> bool {
        matches!(self.stat(path).await, Ok(Some(_)))
    }
}

#[async_trait]
impl<R: CommandRunner> RemoteFs for SshSession<R> {
    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn stat(&self, path: &str) -> Result<Option<RemoteFileType>, ClipError> {
        let output = self
            .exec(format!("stat -L -c %F {}", shell_quote(path)))
            .await?;
        if !output.success {
            return Ok(None);
        }
        let kind = String::from_utf8_lossy(&output.stdout).trim().to_owned();
        let file_type = match kind.as_str() {
            "regular file" | "regular empty file" => RemoteFileType::File,
            "directory" => RemoteFileType::Directory,
            _ => RemoteFileType::Other,
        };
        Ok(Some(file_type))
    }

    async fn read_bytes(&self, path: &str) -> Result<Vec<u8>, ClipError> {
        let output = self.exec(format!("cat -- {}", shell_quote(path))).await?;
        if !output.success {
            return Err(ClipError::FileReadError(
                path.to_owned(),
                output.stderr_text(),
            ));
        }
        Ok(output.stdout)
    }

    async fn list_tree(
        &self,
        root: &str,
        ignore: &IgnoreFilter,
    ) -> Result<Vec<String>, ClipError> {
        let output = self.exec(build_find_command(root, ignore)).await?;
        if !output.success {
            return Err(ClipError::SshError(format!(
                "Failed to list remote files: {}",
                output.stderr_text()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect())
    }
}
