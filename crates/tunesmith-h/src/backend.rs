use crate::cdp::{CdpClient, LaunchOptions};
use crate::storage::{
    READ_LOCAL_STORAGE, cookie_from_cdp, cookie_to_cdp, restore_local_storage_script,
    text_content_expression,
};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::{GetAllCookiesParams, SetCookiesParams};
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use serde::Deserialize;
use tracing::{debug, info, warn};
use tunesmith_engine::backend::{Browser, BrowserError, NavigationResult};
use tunesmith_engine::protocol::{OriginState, StorageState};

/// Chromium driven over the DevTools protocol.
pub struct ChromiumBrowser {
    client: Option<CdpClient>,
    options: LaunchOptions,
}

impl ChromiumBrowser {
    pub fn new(options: LaunchOptions) -> Self {
        Self {
            client: None,
            options,
        }
    }

    fn client(&self) -> Result<&CdpClient, BrowserError> {
        self.client.as_ref().ok_or(BrowserError::NotReady)
    }

    async fn evaluate_string(&self, expression: String) -> Result<String, BrowserError> {
        let client = self.client()?;
        client
            .page
            .evaluate(expression)
            .await
            .map_err(|e| BrowserError::ScriptError(e.to_string()))?
            .into_value::<String>()
            .map_err(|e| BrowserError::ScriptError(e.to_string()))
    }
}

impl Default for ChromiumBrowser {
    fn default() -> Self {
        Self::new(LaunchOptions::default())
    }
}

#[derive(Deserialize)]
struct TextContent {
    text: Option<String>,
}

#[async_trait]
impl Browser for ChromiumBrowser {
    async fn launch(&mut self) -> Result<(), BrowserError> {
        info!("Launching Chromium...");
        let client = CdpClient::launch(&self.options)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;
        self.client = Some(client);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        if let Some(client) = self.client.take() {
            client
                .close()
                .await
                .map_err(|e| BrowserError::Other(e.to_string()))?;
        }
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        self.client.is_some()
    }

    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, BrowserError> {
        let client = self.client()?;

        info!("Navigating to: {}", url);
        client
            .page
            .goto(url)
            .await
            .map_err(|e| BrowserError::Navigation(e.to_string()))?;

        let title = client
            .page
            .get_title()
            .await
            .unwrap_or_default()
            .unwrap_or_default();
        let url = self.current_url().await?;
        Ok(NavigationResult { url, title })
    }

    async fn current_url(&mut self) -> Result<String, BrowserError> {
        let client = self.client()?;
        Ok(client
            .page
            .url()
            .await
            .map_err(|e| BrowserError::Navigation(e.to_string()))?
            .unwrap_or_default())
    }

    async fn text_content(&mut self, selector: &str) -> Result<Option<String>, BrowserError> {
        let raw = self
            .evaluate_string(text_content_expression(selector)?)
            .await
            .map_err(|e| BrowserError::Selector {
                selector: selector.to_string(),
                reason: e.to_string(),
            })?;
        let content: TextContent = serde_json::from_str(&raw)?;
        Ok(content.text)
    }

    /// Cookies come from the whole browser; local storage only from the
    /// origin of the page currently loaded.
    async fn storage_state(&mut self) -> Result<StorageState, BrowserError> {
        let client = self.client()?;
        let cookies = client
            .page
            .execute(GetAllCookiesParams::default())
            .await
            .map_err(|e| BrowserError::Storage(format!("Get cookies failed: {}", e)))?
            .result
            .cookies
            .into_iter()
            .map(cookie_from_cdp)
            .collect::<Vec<_>>();

        let raw = self.evaluate_string(READ_LOCAL_STORAGE.to_string()).await?;
        let origin: OriginState = serde_json::from_str(&raw)?;
        let origins = if origin.origin == "null" || origin.local_storage.is_empty() {
            Vec::new()
        } else {
            vec![origin]
        };

        debug!(
            "Exported {} cookies and {} origins",
            cookies.len(),
            origins.len()
        );
        Ok(StorageState { cookies, origins })
    }

    async fn restore_storage_state(&mut self, state: &StorageState) -> Result<(), BrowserError> {
        let client = self.client()?;

        let mut params = Vec::with_capacity(state.cookies.len());
        for cookie in &state.cookies {
            match cookie_to_cdp(cookie)? {
                Some(param) => params.push(param),
                None => warn!("Skipping cookie {} without a domain", cookie.name),
            }
        }
        if !params.is_empty() {
            client
                .page
                .execute(SetCookiesParams::new(params))
                .await
                .map_err(|e| BrowserError::Storage(format!("Set cookies failed: {}", e)))?;
        }

        for origin in &state.origins {
            let script = restore_local_storage_script(origin)?;
            client
                .page
                .execute(AddScriptToEvaluateOnNewDocumentParams::new(script))
                .await
                .map_err(|e| {
                    BrowserError::Storage(format!(
                        "Local storage for {} failed: {}",
                        origin.origin, e
                    ))
                })?;
        }

        info!(
            "Restored {} cookies and {} origins",
            state.cookies.len(),
            state.origins.len()
        );
        Ok(())
    }
}
