//! Audio stream inspection with ffprobe.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::process::{run_checked, ProcessError, ProcessRunner};

/// Errors that can occur while probing a file.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("ffprobe failed: {0}")]
    Process(#[from] ProcessError),

    #[error("Invalid ffprobe output: {0}")]
    InvalidOutput(String),

    #[error("No FLAC stream found")]
    NoFlacStream,
}

/// What the validator needs to know about one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeInfo {
    pub bit_depth: u32,
    pub sample_rate: u32,
    pub channels: u32,
    /// Tag keys exactly as reported; casing is inconsistent between encoders.
    pub tag_keys: Vec<String>,
}

/// Reads stream properties and tags of an audio file.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait AudioProber: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<ProbeInfo, ProbeError>;
}

/// [`AudioProber`] that shells out to `ffprobe`.
pub struct FfprobeProber {
    runner: Arc<dyn ProcessRunner>,
    ffprobe_path: PathBuf,
}

impl FfprobeProber {
    pub fn new(runner: Arc<dyn ProcessRunner>, ffprobe_path: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            ffprobe_path: ffprobe_path.into(),
        }
    }
}

#[async_trait]
impl AudioProber for FfprobeProber {
    async fn probe(&self, path: &Path) -> Result<ProbeInfo, ProbeError> {
        let args: Vec<String> = [
            "-v",
            "quiet",
            "-show_streams",
            "-show_format",
            "-print_format",
            "json",
        ]
        .iter()
        .map(|s| s.to_string())
        .chain(std::iter::once(path.to_string_lossy().to_string()))
        .collect();

        let output = run_checked(
            self.runner.as_ref(),
            &self.ffprobe_path.to_string_lossy(),
            &args,
        )
        .await?;
        parse_probe_output(&output.stdout)
    }
}

/// ffprobe JSON output structure.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeFormat {
    #[serde(default)]
    tags: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_name: Option<String>,
    sample_rate: Option<String>,
    channels: Option<u32>,
    bits_per_raw_sample: Option<String>,
}

pub fn parse_probe_output(json: &str) -> Result<ProbeInfo, ProbeError> {
    let probe: FfprobeOutput = serde_json::from_str(json)
        .map_err(|e| ProbeError::InvalidOutput(format!("JSON parse error: {}", e)))?;

    let flac = probe
        .streams
        .iter()
        .find(|s| s.codec_name.as_deref() == Some("flac"))
        .ok_or(ProbeError::NoFlacStream)?;

    let parse_num = |field: &str, value: &Option<String>| -> Result<u32, ProbeError> {
        value
            .as_deref()
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| ProbeError::InvalidOutput(format!("missing or bad {}", field)))
    };

    let mut tag_keys: Vec<String> = probe.format.tags.into_keys().collect();
    tag_keys.sort();

    Ok(ProbeInfo {
        bit_depth: parse_num("bits_per_raw_sample", &flac.bits_per_raw_sample)?,
        sample_rate: parse_num("sample_rate", &flac.sample_rate)?,
        channels: flac.channels.unwrap_or(2),
        tag_keys,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ProcessOutput;
    use std::sync::Mutex;

    const FLAC_24: &str = r#"{
        "streams": [
            { "codec_name": "mjpeg", "codec_type": "video" },
            {
                "codec_name": "flac",
                "codec_type": "audio",
                "sample_rate": "96000",
                "channels": 2,
                "bits_per_raw_sample": "24"
            }
        ],
        "format": {
            "format_name": "flac",
            "tags": {
                "TITLE": "Pointbreak",
                "ARTIST": "Vanilla",
                "ALBUM": "Pointbreak",
                "track": "1"
            }
        }
    }"#;

    #[test]
    fn test_parse_flac_stream() {
        let info = parse_probe_output(FLAC_24).unwrap();
        assert_eq!(info.bit_depth, 24);
        assert_eq!(info.sample_rate, 96000);
        assert_eq!(info.channels, 2);
        assert_eq!(info.tag_keys, vec!["ALBUM", "ARTIST", "TITLE", "track"]);
    }

    #[test]
    fn test_parse_without_tags() {
        let json = r#"{
            "streams": [{ "codec_name": "flac", "sample_rate": "44100", "channels": 6, "bits_per_raw_sample": "16" }],
            "format": {}
        }"#;
        let info = parse_probe_output(json).unwrap();
        assert_eq!(info.channels, 6);
        assert!(info.tag_keys.is_empty());
    }

    #[test]
    fn test_parse_no_flac_stream() {
        let json = r#"{ "streams": [{ "codec_name": "mp3" }], "format": {} }"#;
        assert!(matches!(
            parse_probe_output(json),
            Err(ProbeError::NoFlacStream)
        ));
    }

    #[test]
    fn test_parse_bad_json() {
        assert!(matches!(
            parse_probe_output("not json"),
            Err(ProbeError::InvalidOutput(_))
        ));
    }

    #[test]
    fn test_parse_missing_bit_depth() {
        let json = r#"{ "streams": [{ "codec_name": "flac", "sample_rate": "44100" }] }"#;
        assert!(matches!(
            parse_probe_output(json),
            Err(ProbeError::InvalidOutput(_))
        ));
    }

    struct CannedRunner {
        calls: Mutex<Vec<(String, Vec<String>)>>,
    }

    #[async_trait]
    impl ProcessRunner for CannedRunner {
        async fn run(&self, program: &str, args: &[String]) -> Result<ProcessOutput, ProcessError> {
            self.calls
                .lock()
                .unwrap()
                .push((program.to_string(), args.to_vec()));
            Ok(ProcessOutput {
                stdout: FLAC_24.to_string(),
                stderr: String::new(),
                exit_code: Some(0),
            })
        }
    }

    #[tokio::test]
    async fn test_ffprobe_prober_invocation() {
        let runner = Arc::new(CannedRunner {
            calls: Mutex::new(Vec::new()),
        });
        let prober = FfprobeProber::new(runner.clone(), "ffprobe");
        let info = prober.probe(Path::new("/music/01.flac")).await.unwrap();
        assert_eq!(info.bit_depth, 24);

        let calls = runner.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "ffprobe");
        assert_eq!(calls[0].1.last().unwrap(), "/music/01.flac");
        assert!(calls[0].1.contains(&"-show_format".to_string()));
    }
}
