//! Tracker JSON API: the remote calls the pipeline depends on.

mod client;
mod models;

pub use client::{unwrap_envelope, RedactedClient, DEFAULT_API_URL};
pub use models::{
    ApiArtist, ApiEnvelope, ApiGroup, ApiTorrent, FormValue, IndexResponse, MusicInfo,
    TorrentGroupResponse, TorrentQuery, TorrentResponse, UploadForm, UploadResponse,
};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the tracker API. All of them are fatal to a run.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{action}: {status} ({message})")]
    Api {
        action: &'static str,
        status: String,
        message: String,
    },

    #[error("{action}: success without a response body")]
    EmptyResponse { action: &'static str },
}

/// Operations the pipeline needs from the tracker.
///
/// Implementations own any retry policy; callers treat every error as final.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait TrackerApi: Send + Sync {
    async fn fetch_index(&self) -> Result<IndexResponse, TrackerError>;

    async fn fetch_torrent(&self, query: &TorrentQuery) -> Result<TorrentResponse, TrackerError>;

    async fn fetch_torrent_group(
        &self,
        query: &TorrentQuery,
    ) -> Result<TorrentGroupResponse, TrackerError>;

    async fn submit_upload(&self, form: &UploadForm) -> Result<UploadResponse, TrackerError>;
}

/// Announce URL built from the account passkey.
pub fn announce_url(passkey: &str) -> String {
    format!("https://flacsfor.me/{}/announce", passkey)
}

/// Permalink of a torrent on the site.
pub fn torrent_permalink(torrent_id: u64) -> String {
    format!("https://redacted.ch/torrents.php?torrentid={}", torrent_id)
}

/// Permalink of a torrent group on the site.
pub fn group_permalink(group_id: u64) -> String {
    format!("https://redacted.ch/torrents.php?id={}", group_id)
}
