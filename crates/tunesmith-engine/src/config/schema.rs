use crate::auth::AuthCheck;
use crate::poll::PollSettings;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tunesmith_common::protocol::GenerationRequest;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TunesmithConfig {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub song: SongConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_path")]
    pub path: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: default_session_path(),
        }
    }
}

fn default_session_path() -> PathBuf {
    PathBuf::from("auth.json")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_login_url")]
    pub login_url: String,
    #[serde(default = "default_generate_page_url")]
    pub generate_page_url: String,
    #[serde(default = "default_heading_selector")]
    pub heading_selector: String,
    #[serde(default)]
    pub auth_check: AuthCheck,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            login_url: default_login_url(),
            generate_page_url: default_generate_page_url(),
            heading_selector: default_heading_selector(),
            auth_check: AuthCheck::default(),
        }
    }
}

fn default_login_url() -> String {
    "https://suno.com/login".to_string()
}

fn default_generate_page_url() -> String {
    "https://suno.com/song/generate".to_string()
}

fn default_heading_selector() -> String {
    "h1".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_submit_path")]
    pub submit_path: String,
    /// `{uuid}` is replaced by the job identifier.
    #[serde(default = "default_status_path")]
    pub status_path: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            submit_path: default_submit_path(),
            status_path: default_status_path(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://suno.com".to_string()
}

fn default_submit_path() -> String {
    "/api/song/generate".to_string()
}

fn default_status_path() -> String {
    "/api/song/status/{uuid}".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SongConfig {
    #[serde(default = "default_song_name")]
    pub song_name: String,
    #[serde(default = "default_artist")]
    pub artist: String,
    #[serde(default = "default_genre")]
    pub genre: String,
}

impl Default for SongConfig {
    fn default() -> Self {
        Self {
            song_name: default_song_name(),
            artist: default_artist(),
            genre: default_genre(),
        }
    }
}

impl SongConfig {
    pub fn request(&self) -> GenerationRequest {
        GenerationRequest {
            song_name: self.song_name.clone(),
            artist: self.artist.clone(),
            genre: self.genre.clone(),
        }
    }
}

fn default_song_name() -> String {
    "My Test Song".to_string()
}

fn default_artist() -> String {
    "Test Artist".to_string()
}

fn default_genre() -> String {
    "Pop".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// How long the capture window stays open for manual login.
    #[serde(default = "default_capture_wait_secs")]
    pub capture_wait_secs: u64,
    /// Settle time after replay navigation before the URL is inspected.
    #[serde(default = "default_redirect_settle_secs")]
    pub redirect_settle_secs: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            capture_wait_secs: default_capture_wait_secs(),
            redirect_settle_secs: default_redirect_settle_secs(),
        }
    }
}

impl TimingConfig {
    pub fn capture_wait(&self) -> Duration {
        Duration::from_secs(self.capture_wait_secs)
    }

    pub fn redirect_settle(&self) -> Duration {
        Duration::from_secs(self.redirect_settle_secs)
    }
}

fn default_capture_wait_secs() -> u64 {
    60
}

fn default_redirect_settle_secs() -> u64 {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// No limit when unset.
    #[serde(default)]
    pub max_polls: Option<u32>,
    /// No limit when unset.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            max_polls: None,
            timeout_secs: None,
        }
    }
}

impl PollingConfig {
    pub fn settings(&self) -> PollSettings {
        PollSettings {
            interval: Duration::from_secs(self.interval_secs),
            max_polls: self.max_polls,
            timeout: self.timeout_secs.map(Duration::from_secs),
        }
    }
}

fn default_interval_secs() -> u64 {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub chrome_bin: Option<PathBuf>,
    #[serde(default)]
    pub user_data_dir: Option<PathBuf>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            visible: default_visible(),
            chrome_bin: None,
            user_data_dir: None,
        }
    }
}

fn default_visible() -> bool {
    true
}
