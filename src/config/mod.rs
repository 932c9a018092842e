mod file_config;

pub use file_config::{FileConfig, NormalizationConfig};

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

use crate::edition::NormalizationPolicy;
use crate::plan::PlanOptions;
use crate::release::ReleaseIdentifiers;
use crate::tracker::DEFAULT_API_URL;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub input_dir: PathBuf,
    pub info_hash: Option<String>,
    pub torrent_id: Option<u64>,
    pub api_key: Option<String>,
    pub api_url: String,
    pub announce_url: Option<String>,
    pub transcode_dir: Option<PathBuf>,
    pub torrent_dir: PathBuf,
    pub sox_path: PathBuf,
    pub ffprobe_path: PathBuf,
    pub flac2mp3_path: PathBuf,
    pub no_flac: bool,
    pub no_v0: bool,
    pub no_320: bool,
    pub no_upload: bool,
    pub always_transcode: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::new(),
            info_hash: None,
            torrent_id: None,
            api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            announce_url: None,
            transcode_dir: None,
            torrent_dir: PathBuf::from("."),
            sox_path: PathBuf::from("sox"),
            ffprobe_path: PathBuf::from("ffprobe"),
            flac2mp3_path: PathBuf::from("flac2mp3"),
            no_flac: false,
            no_v0: false,
            no_320: false,
            no_upload: false,
            always_transcode: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub sox: PathBuf,
    pub ffprobe: PathBuf,
    pub flac2mp3: PathBuf,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub input_dir: PathBuf,
    pub identifiers: ReleaseIdentifiers,

    // Tracker
    pub api_key: String,
    pub api_url: String,
    /// Discovered from the account passkey when not set.
    pub announce_url: Option<String>,

    // Output locations
    pub transcode_dir: PathBuf,
    pub torrent_dir: PathBuf,

    pub tools: ToolPaths,

    // Plan switches
    pub no_flac: bool,
    pub no_v0: bool,
    pub no_320: bool,
    pub no_upload: bool,
    pub always_transcode: bool,

    pub normalization: NormalizationPolicy,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let input_dir = cli.input_dir.clone();
        if !input_dir.is_dir() {
            bail!("Input directory does not exist: {:?}", input_dir);
        }

        let api_key = file
            .api_key
            .or_else(|| cli.api_key.clone())
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "api_key must be specified via --api-key, RED_API_KEY or in config file"
                )
            })?;

        let api_url = file.api_url.unwrap_or_else(|| cli.api_url.clone());
        let announce_url = file.announce_url.or_else(|| cli.announce_url.clone());

        let torrent_dir = file
            .torrent_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.torrent_dir.clone());
        ensure_dir("torrent_dir", &torrent_dir)?;

        let transcode_dir = match file
            .transcode_dir
            .map(PathBuf::from)
            .or_else(|| cli.transcode_dir.clone())
        {
            Some(dir) => {
                ensure_dir("transcode_dir", &dir)?;
                dir
            }
            None => parent_or_current(&input_dir),
        };

        let tools = ToolPaths {
            sox: file
                .sox_path
                .map(PathBuf::from)
                .unwrap_or_else(|| cli.sox_path.clone()),
            ffprobe: file
                .ffprobe_path
                .map(PathBuf::from)
                .unwrap_or_else(|| cli.ffprobe_path.clone()),
            flac2mp3: file
                .flac2mp3_path
                .map(PathBuf::from)
                .unwrap_or_else(|| cli.flac2mp3_path.clone()),
        };

        let defaults = NormalizationPolicy::default();
        let norm_file = file.normalization.unwrap_or_default();
        let normalization = NormalizationPolicy {
            remaster_title: norm_file
                .remaster_title
                .unwrap_or(defaults.remaster_title),
            record_label: norm_file.record_label.unwrap_or(defaults.record_label),
            catalogue_number: norm_file
                .catalogue_number
                .unwrap_or(defaults.catalogue_number),
        };

        Ok(Self {
            input_dir,
            identifiers: ReleaseIdentifiers {
                info_hash: cli.info_hash.clone(),
                torrent_id: cli.torrent_id,
            },
            api_key,
            api_url,
            announce_url,
            transcode_dir,
            torrent_dir,
            tools,
            no_flac: file.no_flac.unwrap_or(cli.no_flac),
            no_v0: file.no_v0.unwrap_or(cli.no_v0),
            no_320: file.no_320.unwrap_or(cli.no_320),
            no_upload: file.no_upload.unwrap_or(cli.no_upload),
            always_transcode: file.always_transcode.unwrap_or(cli.always_transcode),
            normalization,
        })
    }

    pub fn plan_options(&self) -> PlanOptions {
        PlanOptions {
            no_flac: self.no_flac,
            no_v0: self.no_v0,
            no_320: self.no_320,
            no_upload: self.no_upload,
            always_transcode: self.always_transcode,
            transcode_dir: self.transcode_dir.clone(),
            sox_path: self.tools.sox.clone(),
            flac2mp3_path: self.tools.flac2mp3.clone(),
        }
    }
}

fn ensure_dir(name: &str, dir: &Path) -> Result<()> {
    if !dir.exists() {
        bail!("{} does not exist: {:?}", name, dir);
    }
    if !dir.is_dir() {
        bail!("{} is not a directory: {:?}", name, dir);
    }
    Ok(())
}

/// Transcodes land beside the input directory by default.
fn parent_or_current(dir: &Path) -> PathBuf {
    match dir.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
