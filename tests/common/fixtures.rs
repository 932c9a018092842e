//! A release on disk plus matching tracker data.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use red_trul::edition::NormalizationPolicy;
use red_trul::pipeline::{Collaborators, Pipeline, RunSettings};
use red_trul::plan::PlanOptions;
use red_trul::release::ReleaseIdentifiers;
use red_trul::tracker::{ApiArtist, ApiGroup, ApiTorrent, MusicInfo};

use super::constants::*;
use super::fakes::{FakeProber, FakeTorrentBuilder, FakeTracker, RecordingRunner};

pub fn group() -> ApiGroup {
    ApiGroup {
        id: GROUP_ID,
        name: GROUP_NAME.to_string(),
        year: GROUP_YEAR,
        music_info: Some(MusicInfo {
            artists: vec![ApiArtist {
                id: 1,
                name: ARTIST_NAME.to_string(),
            }],
        }),
    }
}

/// The 24-bit WEB source. The second track name arrives entity-encoded.
pub fn source_torrent() -> ApiTorrent {
    ApiTorrent {
        id: SOURCE_TORRENT_ID,
        media: SOURCE_MEDIA.to_string(),
        format: "FLAC".to_string(),
        encoding: "24bit Lossless".to_string(),
        remaster_year: SOURCE_REMASTER_YEAR,
        remaster_title: String::new(),
        remaster_record_label: SOURCE_RECORD_LABEL.to_string(),
        remaster_catalogue_number: String::new(),
        file_list: format!(
            "{}{{{{{{1000}}}}}}|||02 L&oslash;msk.flac{{{{{{2000}}}}}}|||{}{{{{{{30}}}}}}",
            TRACK_1, COVER
        ),
        file_path: "Vanilla - Lomsk (2021) [WEB FLAC 24]".to_string(),
    }
}

/// Another torrent of the source's edition.
pub fn sibling(id: u64, format: &str, encoding: &str) -> ApiTorrent {
    ApiTorrent {
        id,
        format: format.to_string(),
        encoding: encoding.to_string(),
        file_list: String::new(),
        ..source_torrent()
    }
}

/// Temp workspace: `in/<release>` with two tracks and a cover, plus empty
/// `out` and `torrents` directories.
pub struct TestEnv {
    pub dir: TempDir,
    pub input_dir: PathBuf,
    pub transcode_dir: PathBuf,
    pub torrent_dir: PathBuf,

    pub tracker: Arc<FakeTracker>,
    pub prober: Arc<FakeProber>,
    pub runner: Arc<RecordingRunner>,
    pub torrents: Arc<FakeTorrentBuilder>,
}

impl TestEnv {
    /// Source with no siblings, hi-res tagged files.
    pub fn new() -> Self {
        Self::with_tracker(FakeTracker::new(group(), source_torrent(), Vec::new()))
    }

    pub fn with_siblings(siblings: Vec<ApiTorrent>) -> Self {
        Self::with_tracker(FakeTracker::new(group(), source_torrent(), siblings))
    }

    pub fn with_tracker(tracker: FakeTracker) -> Self {
        let dir = TempDir::new().unwrap();
        let input_dir = dir.path().join("in").join("Vanilla - Lomsk (2021) [WEB FLAC 24]");
        let transcode_dir = dir.path().join("out");
        let torrent_dir = dir.path().join("torrents");
        fs::create_dir_all(&input_dir).unwrap();
        fs::create_dir_all(&transcode_dir).unwrap();
        fs::create_dir_all(&torrent_dir).unwrap();

        fs::write(input_dir.join(TRACK_1), b"flac24").unwrap();
        fs::write(input_dir.join(TRACK_2), b"flac24").unwrap();
        fs::write(input_dir.join(COVER), b"jpeg").unwrap();
        fs::write(input_dir.join("notes.txt"), b"web notes").unwrap();

        Self {
            dir,
            input_dir,
            transcode_dir,
            torrent_dir,
            tracker: Arc::new(tracker),
            prober: Arc::new(FakeProber::hires()),
            runner: Arc::new(RecordingRunner::default()),
            torrents: Arc::new(FakeTorrentBuilder::default()),
        }
    }

    pub fn with_prober(mut self, prober: FakeProber) -> Self {
        self.prober = Arc::new(prober);
        self
    }

    pub fn with_runner(mut self, runner: RecordingRunner) -> Self {
        self.runner = Arc::new(runner);
        self
    }

    /// Explicit info hash, fixed announce, everything enabled.
    pub fn settings(&self) -> RunSettings {
        RunSettings {
            input_dir: self.input_dir.clone(),
            identifiers: ReleaseIdentifiers {
                info_hash: Some(SOURCE_INFO_HASH.to_string()),
                torrent_id: None,
            },
            announce_url: Some("https://flacsfor.me/fixed/announce".to_string()),
            torrent_dir: self.torrent_dir.clone(),
            plan: PlanOptions {
                no_flac: false,
                no_v0: false,
                no_320: false,
                no_upload: false,
                always_transcode: false,
                transcode_dir: self.transcode_dir.clone(),
                sox_path: PathBuf::from("sox"),
                flac2mp3_path: PathBuf::from("flac2mp3"),
            },
            normalization: NormalizationPolicy::default(),
            processes: 4,
            show_plan: false,
        }
    }

    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(Collaborators {
            tracker: self.tracker.clone(),
            prober: self.prober.clone(),
            runner: self.runner.clone(),
            torrents: self.torrents.clone(),
        })
    }

    pub fn output_dir(&self, format_label: &str) -> PathBuf {
        self.transcode_dir
            .join(format!("{}[{} {}]", OUTPUT_BASE, SOURCE_MEDIA, format_label))
    }

    pub fn written_torrents(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(&self.torrent_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }
}
