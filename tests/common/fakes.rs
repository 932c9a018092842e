//! Hand-written recording fakes for the pipeline collaborators.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use red_trul::analysis::{AudioProber, ProbeError, ProbeInfo};
use red_trul::process::{ProcessError, ProcessOutput, ProcessRunner};
use red_trul::torrent::{TorrentBuilder, TorrentError, TorrentOptions};
use red_trul::tracker::{
    ApiGroup, ApiTorrent, IndexResponse, TorrentGroupResponse, TorrentQuery, TorrentResponse,
    TrackerApi, TrackerError, UploadForm, UploadResponse,
};

use super::constants::*;

// =============================================================================
// Tracker
// =============================================================================

/// In-memory tracker serving one group. Records every call.
pub struct FakeTracker {
    pub group: ApiGroup,
    /// The torrent served by `fetch_torrent`, whatever the query.
    pub torrent: ApiTorrent,
    /// Listing of `fetch_torrent_group`; should include `torrent`.
    pub group_torrents: Vec<ApiTorrent>,
    /// When set, `submit_upload` fails with this message.
    pub reject_upload: Option<String>,

    pub index_calls: AtomicUsize,
    pub group_calls: AtomicUsize,
    pub torrent_queries: Mutex<Vec<TorrentQuery>>,
    pub uploads: Mutex<Vec<UploadForm>>,
}

impl FakeTracker {
    pub fn new(group: ApiGroup, torrent: ApiTorrent, siblings: Vec<ApiTorrent>) -> Self {
        let mut group_torrents = vec![torrent.clone()];
        group_torrents.extend(siblings);
        Self {
            group,
            torrent,
            group_torrents,
            reject_upload: None,
            index_calls: AtomicUsize::new(0),
            group_calls: AtomicUsize::new(0),
            torrent_queries: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
        }
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub fn last_upload(&self) -> Option<UploadForm> {
        self.uploads.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl TrackerApi for FakeTracker {
    async fn fetch_index(&self) -> Result<IndexResponse, TrackerError> {
        self.index_calls.fetch_add(1, Ordering::SeqCst);
        Ok(IndexResponse {
            username: "tester".to_string(),
            passkey: PASSKEY.to_string(),
        })
    }

    async fn fetch_torrent(&self, query: &TorrentQuery) -> Result<TorrentResponse, TrackerError> {
        self.torrent_queries.lock().unwrap().push(query.clone());
        Ok(TorrentResponse {
            group: self.group.clone(),
            torrent: self.torrent.clone(),
        })
    }

    async fn fetch_torrent_group(
        &self,
        _query: &TorrentQuery,
    ) -> Result<TorrentGroupResponse, TrackerError> {
        self.group_calls.fetch_add(1, Ordering::SeqCst);
        Ok(TorrentGroupResponse {
            group: self.group.clone(),
            torrents: self.group_torrents.clone(),
        })
    }

    async fn submit_upload(&self, form: &UploadForm) -> Result<UploadResponse, TrackerError> {
        self.uploads.lock().unwrap().push(form.clone());
        if let Some(message) = &self.reject_upload {
            return Err(TrackerError::Api {
                action: "upload",
                status: "failure".to_string(),
                message: message.clone(),
            });
        }
        Ok(UploadResponse {
            torrent_id: Some(UPLOADED_TORRENT_ID),
            group_id: Some(self.group.id),
        })
    }
}

// =============================================================================
// Process runner
// =============================================================================

/// Records every command. Simulates the transcoders by writing their output:
/// sox writes the destination file, flac2mp3 writes one mp3 into its
/// output directory.
#[derive(Default)]
pub struct RecordingRunner {
    pub calls: Mutex<Vec<(String, Vec<String>)>>,
    /// Programs whose invocation exits with status 1.
    pub failing: Vec<String>,
}

impl RecordingRunner {
    pub fn failing_on(program: &str) -> Self {
        Self {
            failing: vec![program.to_string()],
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_to(&self, program: &str) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == program)
            .map(|(_, args)| args.clone())
            .collect()
    }
}

#[async_trait]
impl ProcessRunner for RecordingRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<ProcessOutput, ProcessError> {
        self.calls
            .lock()
            .unwrap()
            .push((program.to_string(), args.to_vec()));

        if self.failing.iter().any(|p| p == program) {
            return Ok(ProcessOutput {
                stderr: format!("{} exploded", program),
                exit_code: Some(1),
                ..Default::default()
            });
        }

        if program.ends_with("sox") {
            if let Some(dst) = args.get(5) {
                std::fs::write(dst, b"flac16").unwrap();
            }
        } else if program.ends_with("flac2mp3") {
            if let Some(out_dir) = args.last() {
                std::fs::create_dir_all(out_dir).unwrap();
                std::fs::write(Path::new(out_dir).join("01 Pointbreak.mp3"), b"mp3").unwrap();
            }
        }

        Ok(ProcessOutput {
            exit_code: Some(0),
            ..Default::default()
        })
    }
}

// =============================================================================
// Prober
// =============================================================================

/// Answers from a table keyed by file name, falling back to `default`.
pub struct FakeProber {
    pub default: ProbeInfo,
    pub overrides: HashMap<String, ProbeInfo>,
    pub calls: AtomicUsize,
}

impl FakeProber {
    /// Tagged, stereo, 24-bit/96 kHz.
    pub fn hires() -> Self {
        Self::with_default(probe_info(24, 96000, 2, &["TITLE", "ARTIST", "ALBUM", "TRACK"]))
    }

    pub fn with_default(default: ProbeInfo) -> Self {
        Self {
            default,
            overrides: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_file(mut self, file_name: &str, info: ProbeInfo) -> Self {
        self.overrides.insert(file_name.to_string(), info);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn probe_info(bit_depth: u32, sample_rate: u32, channels: u32, tags: &[&str]) -> ProbeInfo {
    ProbeInfo {
        bit_depth,
        sample_rate,
        channels,
        tag_keys: tags.iter().map(|t| t.to_string()).collect(),
    }
}

#[async_trait]
impl AudioProber for FakeProber {
    async fn probe(&self, path: &Path) -> Result<ProbeInfo, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(self
            .overrides
            .get(&name)
            .cloned()
            .unwrap_or_else(|| self.default.clone()))
    }
}

// =============================================================================
// Torrent builder
// =============================================================================

/// Returns a tiny metainfo naming the directory; records the options used.
#[derive(Default)]
pub struct FakeTorrentBuilder {
    pub builds: Mutex<Vec<(PathBuf, TorrentOptions)>>,
}

impl FakeTorrentBuilder {
    pub fn built_dirs(&self) -> Vec<PathBuf> {
        self.builds
            .lock()
            .unwrap()
            .iter()
            .map(|(dir, _)| dir.clone())
            .collect()
    }
}

#[async_trait]
impl TorrentBuilder for FakeTorrentBuilder {
    async fn build(&self, dir: &Path, options: &TorrentOptions) -> Result<Vec<u8>, TorrentError> {
        self.builds
            .lock()
            .unwrap()
            .push((dir.to_path_buf(), options.clone()));
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(format!("d4:infod4:name{}:{}ee", name.len(), name).into_bytes())
    }
}
