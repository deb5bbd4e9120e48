use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
pub use tunesmith_common::error::SessionError;
use tunesmith_common::protocol::StorageState;

/// A captured login session, loaded once per run and shared by every stage.
///
/// The browser path consumes [`Session::storage_state`] while the HTTP path
/// consumes [`Session::cookie_header`]; both come from the same parsed file.
#[derive(Debug, Clone)]
pub struct Session {
    path: PathBuf,
    state: StorageState,
}

impl Session {
    pub fn new(path: impl Into<PathBuf>, state: StorageState) -> Self {
        Self {
            path: path.into(),
            state,
        }
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let path = path.as_ref();
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SessionError::NotFound(path.to_path_buf()));
            }
            Err(source) => {
                return Err(SessionError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let state: StorageState =
            serde_json::from_str(&content).map_err(|source| SessionError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;

        debug!(
            "Loaded session from {} ({} cookies, {} origins)",
            path.display(),
            state.cookies.len(),
            state.origins.len()
        );
        Ok(Self::new(path, state))
    }

    /// Write the session file, replacing whatever was there.
    pub async fn save(&self) -> Result<(), SessionError> {
        let content =
            serde_json::to_string_pretty(&self.state).map_err(|source| SessionError::Malformed {
                path: self.path.clone(),
                source,
            })?;
        tokio::fs::write(&self.path, content)
            .await
            .map_err(|source| SessionError::Io {
                path: self.path.clone(),
                source,
            })?;
        info!(
            "Wrote session to {} ({} cookies)",
            self.path.display(),
            self.state.cookies.len()
        );
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn storage_state(&self) -> &StorageState {
        &self.state
    }

    pub fn cookie_map(&self) -> BTreeMap<String, String> {
        self.state.cookie_map()
    }

    /// `Cookie` request header value, or `None` when the session has no cookies.
    pub fn cookie_header(&self) -> Option<String> {
        let map = self.cookie_map();
        if map.is_empty() {
            return None;
        }
        Some(
            map.iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}
