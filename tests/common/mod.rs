#![allow(dead_code)]

use async_trait::async_trait;
use code2clip::ignore::IgnoreFilter;
use code2clip::remote::{CommandOutput, CommandRunner, RemoteFileType, RemoteFs};
use code2clip::ClipError;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Mutex;

/// In-memory remote filesystem.
#[derive(Default)]
pub struct FakeRemote {
    pub connected: bool,
    pub files: BTreeMap<String, Vec<u8>>,
    pub dirs: BTreeSet<String>,
    /// Paths whose stat call fails outright.
    pub broken: BTreeSet<String>,
}

impl FakeRemote {
    pub fn connected() -> Self {
        FakeRemote {
            connected: true,
            ..FakeRemote::default()
        }
    }

    pub fn with_file(mut self, path: &str, content: &str) -> Self {
        let mut parent = path;
        while let Some((dir, _)) = parent.rsplit_once('/') {
            if dir.is_empty() {
                break;
            }
            self.dirs.insert(dir.to_string());
            parent = dir;
        }
        self.files.insert(path.to_string(), content.as_bytes().to_vec());
        self
    }
}

#[async_trait]
impl RemoteFs for FakeRemote {
    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn stat(&self, path: &str) -> Result<Option<RemoteFileType>, ClipError> {
        if self.broken.contains(path) {
            return Err(ClipError::SshError("stat failed".to_string()));
        }
        if self.files.contains_key(path) {
            Ok(Some(RemoteFileType::File))
        } else if self.dirs.contains(path) {
            Ok(Some(RemoteFileType::Directory))
        } else {
            Ok(None)
        }
    }

    async fn read_bytes(&self, path: &str) -> Result<Vec<u8>, ClipError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| ClipError::FileReadError(path.to_string(), "No such file".to_string()))
    }

    async fn list_tree(
        &self,
        root: &str,
        _ignore: &IgnoreFilter,
    ) -> Result<Vec<String>, ClipError> {
        let prefix = format!("{}/", root.trim_end_matches('/'));
        Ok(self
            .files
            .keys()
            .filter(|path| path.starts_with(&prefix))
            .cloned()
            .collect())
    }
}

/// Records every command and answers from a queue of canned outputs.
#[derive(Default)]
pub struct FakeRunner {
    pub calls: Mutex<Vec<(String, Vec<String>, bool)>>,
    pub responses: Mutex<VecDeque<CommandOutput>>,
}

impl FakeRunner {
    pub fn with_responses(responses: Vec<CommandOutput>) -> Self {
        FakeRunner {
            calls: Mutex::new(Vec::new()),
            responses: Mutex::new(responses.into()),
        }
    }

    pub fn calls(&self) -> Vec<(String, Vec<String>, bool)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        interactive: bool,
    ) -> std::io::Result<CommandOutput> {
        self.calls
            .lock()
            .unwrap()
            .push((program.to_string(), args.to_vec(), interactive));
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| ok_output("")))
    }
}

pub fn ok_output(stdout: &str) -> CommandOutput {
    CommandOutput {
        success: true,
        code: Some(0),
        stdout: stdout.as_bytes().to_vec(),
        stderr: Vec::new(),
    }
}

pub fn failed_output(code: i32, stderr: &str) -> CommandOutput {
    CommandOutput {
        success: false,
        code: Some(code),
        stdout: Vec::new(),
        stderr: stderr.as_bytes().to_vec(),
    }
}
