use std::path::PathBuf;

/// Errors raised by a browser driver.
#[derive(thiserror::Error, Debug, Clone)]
pub enum BrowserError {
    #[error("Browser launch failed: {0}")]
    Launch(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Selector {selector} failed: {reason}")]
    Selector { selector: String, reason: String },

    #[error("Storage state error: {0}")]
    Storage(String),

    #[error("Script execution error: {0}")]
    ScriptError(String),

    #[error("Not ready")]
    NotReady,

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("Browser error: {0}")]
    Other(String),
}

impl From<serde_json::Error> for BrowserError {
    fn from(e: serde_json::Error) -> Self {
        BrowserError::Storage(e.to_string())
    }
}

/// Errors reading or writing the session file.
#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("{} not found. Please save the session first.", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to access session file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Session file {} is malformed: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors from the generation HTTP API.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    /// Any response other than 200. The raw body is kept for the operator.
    #[error("HTTP {code}: {body}")]
    Status { code: u16, body: String },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Unexpected response body: {0}")]
    Decode(String),

    #[error("Response did not contain a song_uuid")]
    MissingJobId,
}

impl ApiError {
    /// Body to show the operator: the raw response for HTTP failures,
    /// the error description otherwise.
    pub fn response_text(&self) -> String {
        match self {
            ApiError::Status { body, .. } => body.clone(),
            other => other.to_string(),
        }
    }
}
