//! Release Descriptor Resolver: from user input to a single source release.

use std::path::Path;
use tracing::{debug, info};

use super::origin::{origin_path, OriginFile};
use super::{ReleaseGroup, ResolvedRelease, SourceRelease};
use crate::error::{PipelineError, Result};
use crate::tracker::{TorrentQuery, TrackerApi};

/// The only format we transcode from.
pub const REQUIRED_FORMAT: &str = "FLAC";

/// Identifiers given explicitly on the command line.
#[derive(Debug, Clone, Default)]
pub struct ReleaseIdentifiers {
    pub info_hash: Option<String>,
    pub torrent_id: Option<u64>,
}

/// Pick the torrent query: explicit hash, then explicit id, then `origin.yaml`.
///
/// The origin file is only read when no explicit identifier is given, and its
/// `Format` is checked right away so non-FLAC folders are rejected without
/// touching the tracker.
pub async fn resolve_query(ids: &ReleaseIdentifiers, input_dir: &Path) -> Result<TorrentQuery> {
    if let Some(hash) = ids.info_hash.as_deref().filter(|h| !h.trim().is_empty()) {
        debug!("Using explicit info hash {}", hash);
        return Ok(TorrentQuery::Hash(hash.trim().to_string()));
    }

    if let Some(id) = ids.torrent_id {
        debug!("Using explicit torrent id {}", id);
        return Ok(TorrentQuery::Id(id));
    }

    let Some(origin) = OriginFile::load(input_dir).await? else {
        return Err(PipelineError::Resolution(input_dir.to_path_buf()));
    };

    if origin.format() != REQUIRED_FORMAT {
        return Err(PipelineError::Format {
            expected: REQUIRED_FORMAT.to_string(),
            found: origin.format().to_string(),
        });
    }

    if origin.info_hash().is_empty() {
        return Err(PipelineError::Origin {
            path: origin_path(input_dir),
            reason: "no info hash".to_string(),
        });
    }

    info!("Using info hash from {:?}", origin_path(input_dir));
    Ok(TorrentQuery::Hash(origin.info_hash().to_string()))
}

/// Fetch the torrent behind `query`. This is the only tracker call made here.
pub async fn resolve_release(api: &dyn TrackerApi, query: &TorrentQuery) -> Result<ResolvedRelease> {
    info!("Fetching torrent info ({})...", query);
    let response = api.fetch_torrent(query).await?;

    if response.torrent.format != REQUIRED_FORMAT {
        return Err(PipelineError::Format {
            expected: REQUIRED_FORMAT.to_string(),
            found: response.torrent.format.clone(),
        });
    }

    let group = ReleaseGroup::from_api(&response.group);
    let release = SourceRelease::from_api(group.id, &response.torrent);
    Ok(ResolvedRelease { group, release })
}
