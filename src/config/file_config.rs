use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Tracker
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub announce_url: Option<String>,

    // Output locations
    pub transcode_dir: Option<String>,
    pub torrent_dir: Option<String>,

    // External tools
    pub sox_path: Option<String>,
    pub ffprobe_path: Option<String>,
    pub flac2mp3_path: Option<String>,

    // Plan switches
    pub no_flac: Option<bool>,
    pub no_v0: Option<bool>,
    pub no_320: Option<bool>,
    pub no_upload: Option<bool>,
    pub always_transcode: Option<bool>,

    pub normalization: Option<NormalizationConfig>,
}

/// Which edition text fields are entity-decoded before comparing.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct NormalizationConfig {
    pub remaster_title: Option<bool>,
    pub record_label: Option<bool>,
    pub catalogue_number: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::parse(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
