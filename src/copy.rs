use crate::decode::decode_text;
use crate::remote::{remote_for, RemoteFs};
use crate::template::Template;
use crate::utils::safe_relpath;
use crate::ClipError;
use arboard::Clipboard;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tokio::fs as async_fs;
use tracing::{debug, info, trace, warn};

/// Destination of the assembled text.
pub trait TextSink {
    fn set_text(&mut self, text: &str) -> Result<(), ClipError>;
}

impl<T: TextSink + ?Sized> TextSink for Box<T> {
    fn set_text(&mut self, text: &str) -> Result<(), ClipError> {
        (**self).set_text(text)
    }
}

pub struct SystemClipboard {
    clipboard: Clipboard,
}

impl SystemClipboard {
    pub fn new() -> Result<Self, ClipError> {
        debug!("Initializing clipboard");
        let clipboard =
            Clipboard::new().map_err(|e| ClipError::ClipboardInitError(e.to_string()))?;
        Ok(SystemClipboard { clipboard })
    }

    pub fn get_text(&mut self) -> Result<String, ClipError> {
        self.clipboard
            .get_text()
            .map_err(|e| ClipError::ClipboardReadError(e.to_string()))
    }
}

impl TextSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipError> {
        self.clipboard
            .set_text(text.to_owned())
            .map_err(|e| ClipError::ClipboardWriteError(e.to_string()))
    }
}

/// Writes the text to standard output instead of the clipboard.
pub struct StdoutSink;

impl TextSink for StdoutSink {
    fn set_text(&mut self, text: &str) -> Result<(), ClipError> {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}

/// Keeps the text in memory; clones share the same buffer.
#[derive(Clone, Default)]
pub struct MemorySink {
    text: Arc<Mutex<String>>,
}

impl MemorySink {
    pub fn contents(&self) -> String {
        self.text
            .lock()
            .map(|text| text.clone())
            .unwrap_or_default()
    }
}

impl TextSink for MemorySink {
    fn set_text(&mut self, text: &str) -> Result<(), ClipError> {
        let mut guard = self
            .text
            .lock()
            .map_err(|e| ClipError::ClipboardWriteError(e.to_string()))?;
        *guard = text.to_owned();
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ClipboardCopierConfig {
    /// Directory file paths are shown relative to; `None` shows bare file names.
    pub root_path: Option<String>,
    pub template: Template,
    pub interpret_escape_sequences: bool,
}

impl Default for ClipboardCopierConfig {
    fn default() -> Self {
        ClipboardCopierConfig {
            root_path: None,
            template: Template::default(),
            interpret_escape_sequences: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStats {
    pub path: String,
    pub display_path: String,
    pub lines: usize,
    pub bytes: usize,
    pub encoding: &'static str,
}

#[derive(Debug, Clone, Default)]
pub struct Concatenation {
    pub text: String,
    /// Path warnings, deduplicated and sorted.
    pub warnings: Vec<String>,
    pub stats: Vec<FileStats>,
}

async fn read_source(path: &str, remote: Option<&dyn RemoteFs>) -> Result<Vec<u8>, ClipError> {
    match remote_for(path, remote) {
        Some(remote) => {
            trace!("Reading {} from remote host", path);
            remote.read_bytes(path).await
        }
        None => async_fs::read(path)
            .await
            .map_err(|e| ClipError::FileReadError(path.to_owned(), e.to_string())),
    }
}

/// Wraps every file in the rendered prefix/suffix and joins them in order.
///
/// The first unreadable or undecodable file aborts the whole operation.
pub async fn concatenate_files(
    files: &[String],
    config: &ClipboardCopierConfig,
    remote: Option<&dyn RemoteFs>,
) -> Result<Concatenation, ClipError> {
    if files.is_empty() {
        return Err(ClipError::NoFiles);
    }

    let template = if config.interpret_escape_sequences {
        config.template.interpreted()?
    } else {
        config.template.clone()
    };

    let mut text = String::new();
    let mut warnings = BTreeSet::new();
    let mut stats = Vec::with_capacity(files.len());

    for file in files {
        debug!("Processing file: {}", file);
        let (display_path, warning) = safe_relpath(file, config.root_path.as_deref());
        if let Some(warning) = warning {
            warnings.insert(warning);
        }

        let raw = read_source(file, remote).await?;
        let decoded =
            decode_text(&raw).map_err(|reason| ClipError::DecodeError(file.clone(), reason))?;
        trace!(
            "Decoded {} bytes of {} as {}",
            raw.len(),
            file,
            decoded.encoding
        );

        let prefix = template.render_prefix(&display_path);
        text.push_str(&prefix);
        text.push('\n');
        text.push_str(&decoded.text);
        text.push('\n');
        text.push_str(&template.suffix);
        text.push('\n');

        stats.push(FileStats {
            path: file.clone(),
            display_path,
            lines: decoded.text.lines().count(),
            bytes: raw.len(),
            encoding: decoded.encoding,
        });
    }

    trace!("Final content length: {}", text.len());
    Ok(Concatenation {
        text,
        warnings: warnings.into_iter().collect(),
        stats,
    })
}

#[async_trait(?Send)]
pub trait ClipboardCopier {
    async fn copy_files_to_clipboard(&mut self, files: &[String])
        -> Result<Concatenation, ClipError>;
}

pub struct BasicClipboardCopier<'a, S: TextSink> {
    config: ClipboardCopierConfig,
    sink: S,
    remote: Option<&'a dyn RemoteFs>,
}

impl<'a, S: TextSink> BasicClipboardCopier<'a, S> {
    pub fn new(config: ClipboardCopierConfig, sink: S) -> Self {
        BasicClipboardCopier {
            config,
            sink,
            remote: None,
        }
    }

    pub fn with_remote(mut self, remote: &'a dyn RemoteFs) -> Self {
        self.remote = Some(remote);
        self
    }
}

#[async_trait(?Send)]
impl<'a, S: TextSink> ClipboardCopier for BasicClipboardCopier<'a, S> {
    async fn copy_files_to_clipboard(
        &mut self,
        files: &[String],
    ) -> Result<Concatenation, ClipError> {
        let result = concatenate_files(files, &self.config, self.remote).await?;
        self.sink.set_text(&result.text)?;
        for warning in &result.warnings {
            warn!("Path Error: {}", warning);
        }
        info!("Concatenated {} files.", result.stats.len());
        Ok(result)
    }
}
