use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClipError {
    #[error("Clipboard initialization failed: {0}")]
    ClipboardInitError(String),

    #[error("Clipboard read failed: {0}")]
    ClipboardReadError(String),

    #[error("Clipboard write failed: {0}")]
    ClipboardWriteError(String),

    #[error("No files to concatenate")]
    NoFiles,

    #[error("Failed to read {0}: {1}")]
    FileReadError(String, String),

    #[error("Failed to decode {0}: {1}")]
    DecodeError(String, String),

    #[error("Failed to process escape sequences: {0}")]
    EscapeError(String),

    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("IO Error: {0}")]
    IoError(String),

    #[error("Invalid pattern: {0}")]
    PatternError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Please enter an SSH host and username before connecting.")]
    SshNotConfigured,

    #[error("SSH authentication failed: {0}")]
    SshAuthError(String),

    #[error("SSH error: {0}")]
    SshError(String),

    #[error("Operation cancelled: {0}")]
    Cancelled(String),
}

impl From<std::io::Error> for ClipError {
    fn from(err: std::io::Error) -> Self {
        ClipError::IoError(err.to_string())
    }
}

impl From<glob::PatternError> for ClipError {
    fn from(err: glob::PatternError) -> Self {
        ClipError::PatternError(err.to_string())
    }
}

impl From<serde_json::Error> for ClipError {
    fn from(err: serde_json::Error) -> Self {
        ClipError::ConfigError(err.to_string())
    }
}
