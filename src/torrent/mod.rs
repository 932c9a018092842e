//! Torrent metainfo for produced output directories.

pub mod bencode;
mod builder;

use std::path::PathBuf;
use thiserror::Error;

pub use bencode::BencodeError;
pub use builder::{info_hash, piece_length, MetainfoBuilder, TorrentBuilder, TorrentOptions};

#[cfg(feature = "mock")]
pub use builder::MockTorrentBuilder;

/// Tag the tracker expects in the info dictionary of uploaded torrents.
pub const SOURCE_TAG: &str = "RED";

#[derive(Debug, Error)]
pub enum TorrentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("No files to include in torrent for {0:?}")]
    Empty(PathBuf),

    #[error("Malformed torrent: {0}")]
    Bencode(#[from] BencodeError),

    #[error("Torrent has no info dictionary")]
    MissingInfo,
}
