//! The capture, replay, submit and poll stages.
//!
//! Stages take an already launched [`Browser`] and an explicitly loaded
//! [`Session`]; nothing here reads the session file behind the caller's back.

use crate::api::{ApiError, GenerationClient};
use crate::auth::AuthCheck;
use crate::backend::{Browser, BrowserError};
use crate::cli::OutputHandlers;
use crate::config::schema::TunesmithConfig;
use crate::poll::{PollOutcome, PollSettings, poll_job};
use crate::session::{Session, SessionError};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};
use tunesmith_common::protocol::{GenerationRequest, JobId};

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Browser(#[from] BrowserError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("Automatic login failed (ended at {url}). Please check your session data.")]
    AuthCheckFailed { url: String },
}

#[derive(Debug, Clone)]
pub struct CaptureSettings {
    pub login_url: String,
    pub wait: Duration,
    pub session_path: PathBuf,
}

impl CaptureSettings {
    pub fn from_config(config: &TunesmithConfig) -> Self {
        Self {
            login_url: config.site.login_url.clone(),
            wait: config.timing.capture_wait(),
            session_path: config.session.path.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReplaySettings {
    pub login_url: String,
    pub generate_page_url: String,
    pub heading_selector: String,
    pub settle: Duration,
    pub auth_check: AuthCheck,
}

impl ReplaySettings {
    pub fn from_config(config: &TunesmithConfig) -> Self {
        Self {
            login_url: config.site.login_url.clone(),
            generate_page_url: config.site.generate_page_url.clone(),
            heading_selector: config.site.heading_selector.clone(),
            settle: config.timing.redirect_settle(),
            auth_check: config.site.auth_check.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReplayReport {
    pub authenticated_url: String,
    pub heading: Option<String>,
}

/// Open the login page, give the operator a fixed window to sign in, then
/// save whatever the browser context holds.
///
/// The login itself is not verified: if nobody signs in, an unauthenticated
/// session is written.
pub async fn capture_session<B: Browser + ?Sized>(
    browser: &mut B,
    settings: &CaptureSettings,
    output: OutputHandlers,
) -> Result<Session, WorkflowError> {
    browser.navigate(&settings.login_url).await?;

    (output.out)("Please log in manually via the browser window.");
    (output.out)(&format!(
        "The session will be saved automatically in {} seconds.",
        settings.wait.as_secs()
    ));
    tokio::time::sleep(settings.wait).await;

    let state = browser.storage_state().await?;
    if state.cookies.is_empty() {
        warn!("Captured session has no cookies; login probably did not complete");
    }
    let session = Session::new(&settings.session_path, state);
    session.save().await?;

    (output.out)(&format!(
        "Session saved successfully to {}.",
        settings.session_path.display()
    ));
    Ok(session)
}

/// Load the session file, printing the operator-facing message on failure.
pub async fn load_session(path: &Path, output: OutputHandlers) -> Result<Session, WorkflowError> {
    match Session::load(path).await {
        Ok(session) => Ok(session),
        Err(e) => {
            match &e {
                SessionError::NotFound(_) => (output.err)(&e.to_string()),
                other => (output.err)(&format!("Error loading session data: {}", other)),
            }
            Err(e.into())
        }
    }
}

/// Restore the session into the browser and check that it is still logged in.
pub async fn replay_session<B: Browser + ?Sized>(
    browser: &mut B,
    session: &Session,
    settings: &ReplaySettings,
    output: OutputHandlers,
) -> Result<ReplayReport, WorkflowError> {
    if let Err(e) = browser.restore_storage_state(session.storage_state()).await {
        (output.err)(&format!("Error loading session data: {}", e));
        return Err(e.into());
    }

    browser.navigate(&settings.login_url).await?;
    tokio::time::sleep(settings.settle).await;

    let url = browser.current_url().await?;
    if !settings
        .auth_check
        .is_authenticated(&url, &settings.login_url)
    {
        (output.err)("Automatic login failed. Please check your session data.");
        return Err(WorkflowError::AuthCheckFailed { url });
    }
    (output.out)("Logged in successfully using the saved session!");
    info!("Session accepted, landed on {}", url);

    (output.out)("Navigating to the song generation page...");
    browser.navigate(&settings.generate_page_url).await?;

    let heading = browser.text_content(&settings.heading_selector).await?;
    (output.out)(&format!(
        "Page heading: {}",
        heading.as_deref().unwrap_or("None")
    ));

    Ok(ReplayReport {
        authenticated_url: url,
        heading,
    })
}

/// Submit the generation request. A failed submission never reaches polling.
pub async fn submit_job(
    client: &GenerationClient,
    session: &Session,
    request: &GenerationRequest,
    output: OutputHandlers,
) -> Result<JobId, WorkflowError> {
    (output.out)("Performing song generation request via API...");
    match client.submit(session, request).await {
        Ok(job) => {
            (output.out)(&format!(
                "Song generation requested successfully. UUID: {}",
                job
            ));
            Ok(job)
        }
        Err(e) => {
            (output.err)(&format!(
                "Failed to generate song. Response: {}",
                e.response_text()
            ));
            Err(e.into())
        }
    }
}

/// Submit a request and poll it to a terminal status.
pub async fn run_generation(
    client: &GenerationClient,
    session: &Session,
    request: &GenerationRequest,
    poll: &PollSettings,
    output: OutputHandlers,
) -> Result<PollOutcome, WorkflowError> {
    let job = submit_job(client, session, request, output).await?;
    let outcome = poll_job(client, session, &job, poll, output).await?;
    Ok(outcome)
}

/// HTTP-only path: load the session file, then submit and poll. Nothing is
/// sent when the session cannot be loaded.
pub async fn submit_from_file(
    path: &Path,
    client: &GenerationClient,
    request: &GenerationRequest,
    poll: &PollSettings,
    output: OutputHandlers,
) -> Result<PollOutcome, WorkflowError> {
    let session = load_session(path, output).await?;
    run_generation(client, &session, request, poll, output).await
}

/// Replay, submit and poll, in that order, with one session for all stages.
pub async fn run_pipeline<B: Browser + ?Sized>(
    browser: &mut B,
    client: &GenerationClient,
    session: &Session,
    config: &TunesmithConfig,
    output: OutputHandlers,
) -> Result<PollOutcome, WorkflowError> {
    replay_session(browser, session, &ReplaySettings::from_config(config), output).await?;
    run_generation(
        client,
        session,
        &config.song.request(),
        &config.polling.settings(),
        output,
    )
    .await
}
