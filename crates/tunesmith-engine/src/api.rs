use crate::config::schema::ApiConfig;
use crate::session::Session;
use reqwest::StatusCode;
use reqwest::header::COOKIE;
use std::time::Duration;
use tracing::{debug, warn};
pub use tunesmith_common::error::ApiError;
use tunesmith_common::protocol::{
    GenerationRequest, JobId, JobStatus, StatusResponse, SubmitResponse,
};

/// Cookie-authenticated client for the song generation API.
#[derive(Debug, Clone)]
pub struct GenerationClient {
    http: reqwest::Client,
    base_url: String,
    submit_path: String,
    status_path: String,
}

impl GenerationClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            submit_path: config.submit_path.clone(),
            status_path: config.status_path.clone(),
        })
    }

    pub fn submit_url(&self) -> String {
        format!("{}{}", self.base_url, self.submit_path)
    }

    pub fn status_url(&self, job: &JobId) -> String {
        format!(
            "{}{}",
            self.base_url,
            self.status_path.replace("{uuid}", job.as_str())
        )
    }

    /// Request a new song. Only a 200 carrying a `song_uuid` counts as success.
    pub async fn submit(
        &self,
        session: &Session,
        request: &GenerationRequest,
    ) -> Result<JobId, ApiError> {
        let url = self.submit_url();
        debug!("POST {}", url);
        let builder = with_session_cookies(self.http.post(&url), session).json(request);
        let response = send(builder).await?;
        let body: SubmitResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        body.song_uuid.map(JobId::new).ok_or(ApiError::MissingJobId)
    }

    /// Fetch the current status of a job once.
    pub async fn status(&self, session: &Session, job: &JobId) -> Result<JobStatus, ApiError> {
        let url = self.status_url(job);
        debug!("GET {}", url);
        let response = send(with_session_cookies(self.http.get(&url), session)).await?;
        let body: StatusResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        Ok(JobStatus::from_wire(body.status.as_deref()))
    }
}

fn with_session_cookies(
    builder: reqwest::RequestBuilder,
    session: &Session,
) -> reqwest::RequestBuilder {
    match session.cookie_header() {
        Some(header) => builder.header(COOKIE, header),
        None => {
            warn!(
                "Session {} has no cookies; sending request unauthenticated",
                session.path().display()
            );
            builder
        }
    }
}

async fn send(builder: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
    let response = builder
        .send()
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))?;

    let status = response.status();
    if status != StatusCode::OK {
        let body = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<unreadable body: {}>", e));
        return Err(ApiError::Status {
            code: status.as_u16(),
            body,
        });
    }
    Ok(response)
}
