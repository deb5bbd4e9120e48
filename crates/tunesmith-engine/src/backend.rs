use async_trait::async_trait;
pub use tunesmith_common::error::BrowserError;
use tunesmith_common::protocol::StorageState;

#[derive(Debug, Clone)]
pub struct NavigationResult {
    pub url: String,
    pub title: String,
}

/// The interface a browser driver must implement to take part in session
/// capture and replay.
#[async_trait]
pub trait Browser: Send + Sync {
    /// Launch the browser and open a fresh page.
    async fn launch(&mut self) -> Result<(), BrowserError>;

    /// Close the browser and cleanup resources.
    async fn close(&mut self) -> Result<(), BrowserError>;

    /// Check if the browser is ready to accept commands.
    async fn is_ready(&self) -> bool;

    /// Navigate the current page to a URL.
    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, BrowserError>;

    /// URL of the current page after any client-side redirects.
    async fn current_url(&mut self) -> Result<String, BrowserError>;

    /// Text content of the first element matching `selector`, if any.
    async fn text_content(&mut self, selector: &str) -> Result<Option<String>, BrowserError>;

    /// Export cookies and local storage of the current browser context.
    ///
    /// Cookies cover every domain the context holds. Local storage is read
    /// only for the origin of the page loaded at the time of the call, so
    /// entries written on an origin the login flow passed through earlier
    /// (for example a separate accounts host) are not exported.
    async fn storage_state(&mut self) -> Result<StorageState, BrowserError>;

    /// Load a previously exported storage state into the current context.
    /// Must be called before the first navigation that should see it.
    async fn restore_storage_state(&mut self, _state: &StorageState) -> Result<(), BrowserError> {
        Err(BrowserError::NotSupported("restore_storage_state".into()))
    }
}
