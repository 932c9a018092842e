//! Error taxonomy for a single transcode run.

use std::path::PathBuf;
use thiserror::Error;

use crate::process::ProcessError;
use crate::torrent::TorrentError;
use crate::tracker::TrackerError;

/// Errors that end a run.
///
/// `Resolution` and `Format` are expected rejections: the input is simply not
/// something we transcode, so the binary logs them and exits cleanly. All the
/// other variants are fatal.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Unable to find an info hash or torrent id for {0:?}")]
    Resolution(PathBuf),

    #[error("Source is {found}, not {expected}")]
    Format { expected: String, found: String },

    #[error("Required tags (TITLE, ARTIST, ALBUM, TRACK) missing in {0:?}")]
    Tag(PathBuf),

    #[error("Edition group of torrent {torrent_id} does not contain the torrent itself")]
    Consistency { torrent_id: u64 },

    #[error("External tool failed: {0}")]
    Tool(#[from] ProcessError),

    #[error("Failed to probe {path:?}: {reason}")]
    Probe { path: PathBuf, reason: String },

    #[error("Failed to build torrent: {0}")]
    Torrent(#[from] TorrentError),

    #[error("Tracker error: {0}")]
    Tracker(#[from] TrackerError),

    #[error("Upload rejected: {0}")]
    Upload(String),

    #[error("Too many upload files: {0} (max 3)")]
    TooManyFiles(usize),

    #[error("Invalid origin file {path:?}: {reason}")]
    Origin { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Whether this is a normal rejection of the input rather than a failure.
    pub fn is_expected_rejection(&self) -> bool {
        matches!(
            self,
            PipelineError::Resolution(_) | PipelineError::Format { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
