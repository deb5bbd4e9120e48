use std::process::ExitCode;
use tracing::warn;
use tunesmith_engine::api::GenerationClient;
use tunesmith_engine::backend::Browser;
use tunesmith_engine::cli::OutputHandlers;
use tunesmith_engine::config::schema::TunesmithConfig;
use tunesmith_engine::poll::{PollOutcome, poll_job};
use tunesmith_engine::protocol::{JobId, JobStatus};
use tunesmith_engine::workflow::{
    CaptureSettings, capture_session, load_session, run_pipeline, submit_from_file,
};
use tunesmith_h::backend::ChromiumBrowser;
use tunesmith_h::cdp::LaunchOptions;

const JOB_FAILED: u8 = 2;
const POLLING_EXHAUSTED: u8 = 3;

fn launch_options(config: &TunesmithConfig, visible: bool) -> LaunchOptions {
    LaunchOptions {
        visible,
        chrome_bin: config.browser.chrome_bin.clone(),
        user_data_dir: config.browser.user_data_dir.clone(),
    }
}

fn exit_code(outcome: &PollOutcome) -> ExitCode {
    match outcome {
        PollOutcome::Completed => ExitCode::SUCCESS,
        PollOutcome::Failed => ExitCode::from(JOB_FAILED),
        PollOutcome::Exhausted { .. } => ExitCode::from(POLLING_EXHAUSTED),
    }
}

async fn close_quietly(browser: &mut ChromiumBrowser) {
    if let Err(e) = browser.close().await {
        warn!("Failed to close browser: {}", e);
    }
}

pub async fn capture(config: &TunesmithConfig) -> anyhow::Result<ExitCode> {
    if !config.browser.visible {
        warn!("Ignoring headless setting: capture needs a visible window for manual login");
    }
    let mut browser = ChromiumBrowser::new(launch_options(config, true));
    browser.launch().await?;

    let result = capture_session(
        &mut browser,
        &CaptureSettings::from_config(config),
        OutputHandlers::console(),
    )
    .await;
    close_quietly(&mut browser).await;

    result?;
    Ok(ExitCode::SUCCESS)
}

pub async fn run(config: &TunesmithConfig) -> anyhow::Result<ExitCode> {
    let output = OutputHandlers::console();
    (output.out)("Step 1: Restore session and log in automatically");
    let session = load_session(&config.session.path, output).await?;
    let client = GenerationClient::new(&config.api)?;

    let mut browser = ChromiumBrowser::new(launch_options(config, config.browser.visible));
    browser.launch().await?;
    let result = run_pipeline(&mut browser, &client, &session, config, output).await;
    close_quietly(&mut browser).await;

    Ok(exit_code(&result?))
}

pub async fn submit(config: &TunesmithConfig) -> anyhow::Result<ExitCode> {
    let client = GenerationClient::new(&config.api)?;
    let outcome = submit_from_file(
        &config.session.path,
        &client,
        &config.song.request(),
        &config.polling.settings(),
        OutputHandlers::console(),
    )
    .await?;
    Ok(exit_code(&outcome))
}

pub async fn status(config: &TunesmithConfig, uuid: &str, watch: bool) -> anyhow::Result<ExitCode> {
    let output = OutputHandlers::console();
    let session = load_session(&config.session.path, output).await?;
    let client = GenerationClient::new(&config.api)?;
    let job = JobId::new(uuid);

    if watch {
        let outcome = poll_job(&client, &session, &job, &config.polling.settings(), output).await?;
        return Ok(exit_code(&outcome));
    }

    match client.status(&session, &job).await {
        Ok(status) => {
            (output.out)(&format!("Song status: {}", status));
            Ok(match status {
                JobStatus::Failed => ExitCode::from(JOB_FAILED),
                _ => ExitCode::SUCCESS,
            })
        }
        Err(e) => {
            (output.err)(&format!("Error checking song status: {}", e.response_text()));
            Err(e.into())
        }
    }
}
