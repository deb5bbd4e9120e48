mod commands;

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tunesmith_engine::config::loader::ConfigLoader;
use tunesmith_engine::config::schema::TunesmithConfig;

#[derive(Parser, Debug)]
#[command(
    name = "tunesmith",
    version,
    about = "Capture a login session once, then reuse it to request and track song generation"
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Config file (defaults to ./tunesmith.yaml, then ~/.tunesmith/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Session file to write or read
    #[arg(long, global = true)]
    session: Option<PathBuf>,

    /// Run the replay browser headless
    #[arg(long, global = true, conflicts_with = "visible")]
    headless: bool,

    /// Run the replay browser with a visible window
    #[arg(long, global = true)]
    visible: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the login page and save the session after a fixed wait
    Capture {
        /// Seconds to wait for manual login before saving
        #[arg(long)]
        wait_secs: Option<u64>,
    },
    /// Replay the saved session in the browser, then submit and poll
    Run(SongArgs),
    /// Submit and poll over HTTP only, without a browser
    Submit(SongArgs),
    /// Check the status of an existing job
    Status {
        /// Job UUID returned by a previous submission
        uuid: String,
        /// Keep polling until the job reaches a terminal status
        #[arg(long)]
        watch: bool,
        #[command(flatten)]
        limits: PollArgs,
    },
}

#[derive(ClapArgs, Debug)]
struct SongArgs {
    #[arg(long)]
    song_name: Option<String>,
    #[arg(long)]
    artist: Option<String>,
    #[arg(long)]
    genre: Option<String>,
    #[command(flatten)]
    limits: PollArgs,
}

#[derive(ClapArgs, Debug)]
struct PollArgs {
    /// Give up after this many status checks
    #[arg(long)]
    max_polls: Option<u32>,
    /// Give up after this many seconds of polling
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl Args {
    fn apply(&self, config: &mut TunesmithConfig) {
        if let Some(path) = &self.session {
            config.session.path = path.clone();
        }
        if self.headless {
            config.browser.visible = false;
        }
        if self.visible {
            config.browser.visible = true;
        }

        match &self.command {
            Command::Capture { wait_secs } => {
                if let Some(secs) = wait_secs {
                    config.timing.capture_wait_secs = *secs;
                }
            }
            Command::Run(song) | Command::Submit(song) => {
                if let Some(name) = &song.song_name {
                    config.song.song_name = name.clone();
                }
                if let Some(artist) = &song.artist {
                    config.song.artist = artist.clone();
                }
                if let Some(genre) = &song.genre {
                    config.song.genre = genre.clone();
                }
                song.limits.apply(config);
            }
            Command::Status { limits, .. } => limits.apply(config),
        }
    }
}

impl PollArgs {
    fn apply(&self, config: &mut TunesmithConfig) {
        if self.max_polls.is_some() {
            config.polling.max_polls = self.max_polls;
        }
        if self.timeout_secs.is_some() {
            config.polling.timeout_secs = self.timeout_secs;
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr; stdout carries the progress lines
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<ExitCode> {
    let mut config = match &args.config {
        Some(path) => ConfigLoader::load_from(path).await?,
        None => ConfigLoader::load_default().await?,
    };
    args.apply(&mut config);

    match args.command {
        Command::Capture { .. } => commands::capture(&config).await,
        Command::Run(_) => commands::run(&config).await,
        Command::Submit(_) => commands::submit(&config).await,
        Command::Status { uuid, watch, .. } => commands::status(&config, &uuid, watch).await,
    }
}
