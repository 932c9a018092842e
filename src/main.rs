use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use red_trul::analysis::FfprobeProber;
use red_trul::cli_style::get_styles;
use red_trul::config;
use red_trul::pipeline::{Collaborators, Pipeline, RunOutcome, RunSettings};
use red_trul::process::TokioProcessRunner;
use red_trul::torrent::MetainfoBuilder;
use red_trul::tracker::{RedactedClient, DEFAULT_API_URL};

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")");

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s.trim_end_matches('/'));
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(format!("Error resolving path '{}': {}", s, msg));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(original_path))
}

/// Transcode a 24-bit FLAC release to FLAC16, V0 and 320 and upload the
/// encodings missing from its edition.
#[derive(Parser, Debug)]
#[command(styles = get_styles(), version, long_version = LONG_VERSION)]
struct CliArgs {
    /// Directory holding the FLAC release.
    #[clap(value_parser = parse_path)]
    pub input_dir: PathBuf,

    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Info hash of the source torrent. Takes precedence over --torrent-id and origin.yaml.
    #[clap(short, long)]
    pub info_hash: Option<String>,

    /// Id of the source torrent.
    #[clap(long)]
    pub torrent_id: Option<u64>,

    /// Tracker API key.
    #[clap(long, env = "RED_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Tracker ajax endpoint.
    #[clap(long, env = "RED_API", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Announce URL. Built from the account passkey when omitted.
    #[clap(short, long)]
    pub announce: Option<String>,

    /// Where transcode directories are created. Defaults to the parent of INPUT_DIR.
    #[clap(short, long, value_parser = parse_path)]
    pub transcode_dir: Option<PathBuf>,

    /// Where .torrent files are written.
    #[clap(short = 'o', long, default_value = ".", value_parser = parse_path)]
    pub torrent_dir: PathBuf,

    #[clap(long, env = "SOX_PATH", default_value = "sox")]
    pub sox_path: PathBuf,

    #[clap(long, env = "FFPROBE_PATH", default_value = "ffprobe")]
    pub ffprobe_path: PathBuf,

    #[clap(long, env = "FLAC2MP3_PATH", default_value = "flac2mp3")]
    pub flac2mp3_path: PathBuf,

    /// Don't make a FLAC16 transcode.
    #[clap(long)]
    pub no_flac: bool,

    /// Don't make a V0 transcode.
    #[clap(long)]
    pub no_v0: bool,

    /// Don't make a 320 transcode.
    #[clap(long)]
    pub no_320: bool,

    /// Transcode and write torrents, but don't upload.
    #[clap(long)]
    pub no_upload: bool,

    /// Transcode even when the encoding already exists. Existing encodings are not uploaded.
    #[clap(long)]
    pub always_transcode: bool,

    /// Debug logging, including the output of external tools.
    #[clap(short, long)]
    pub verbose: bool,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            input_dir: args.input_dir.clone(),
            info_hash: args.info_hash.clone(),
            torrent_id: args.torrent_id,
            api_key: args.api_key.clone(),
            api_url: args.api_url.clone(),
            announce_url: args.announce.clone(),
            transcode_dir: args.transcode_dir.clone(),
            torrent_dir: args.torrent_dir.clone(),
            sox_path: args.sox_path.clone(),
            ffprobe_path: args.ffprobe_path.clone(),
            flac2mp3_path: args.flac2mp3_path.clone(),
            no_flac: args.no_flac,
            no_v0: args.no_v0,
            no_320: args.no_320,
            no_upload: args.no_upload,
            always_transcode: args.always_transcode,
        }
    }
}

async fn run(cli_args: &CliArgs) -> Result<RunOutcome> {
    // Load TOML config if provided
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    // Resolve final configuration (TOML overrides CLI)
    let cli_config: config::CliConfig = cli_args.into();
    let app_config = config::AppConfig::resolve(&cli_config, file_config)?;

    info!("Configuration:");
    info!("  input_dir: {:?}", app_config.input_dir);
    info!("  transcode_dir: {:?}", app_config.transcode_dir);
    info!("  torrent_dir: {:?}", app_config.torrent_dir);
    info!("  api_url: {}", app_config.api_url);

    let runner = Arc::new(TokioProcessRunner);
    let collaborators = Collaborators {
        tracker: Arc::new(RedactedClient::new(
            app_config.api_url.clone(),
            app_config.api_key.clone(),
        )),
        prober: Arc::new(FfprobeProber::new(
            runner.clone(),
            app_config.tools.ffprobe.clone(),
        )),
        runner,
        torrents: Arc::new(MetainfoBuilder),
    };

    let settings = RunSettings::from_config(&app_config);
    Ok(Pipeline::new(collaborators).run(&settings).await?)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli_args = CliArgs::parse();

    let default_level = if cli_args.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    match run(&cli_args).await {
        Ok(outcome) => {
            info!("{:?}", outcome);
            ExitCode::SUCCESS
        }
        Err(e) => match e.downcast_ref::<red_trul::error::PipelineError>() {
            Some(rejection) if rejection.is_expected_rejection() => {
                warn!("{}", rejection);
                ExitCode::SUCCESS
            }
            _ => {
                error!("{:#}", e);
                ExitCode::FAILURE
            }
        },
    }
}
