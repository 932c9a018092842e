//! Metainfo (`.torrent`) construction for an output directory.

use async_trait::async_trait;
use sha1::{Digest, Sha1};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use super::bencode::{self, Value};
use super::TorrentError;

const MIN_PIECE_EXPONENT: i32 = 15;
const MAX_PIECE_EXPONENT: i32 = 28;
const READ_BUFFER_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentOptions {
    pub private: bool,
    pub created_by: String,
    pub announce_url: String,
    /// Tracker-specific tag stored in the info dictionary.
    pub source_tag: String,
}

#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait TorrentBuilder: Send + Sync {
    /// Bencoded metainfo for every file below `dir`.
    async fn build(&self, dir: &Path, options: &TorrentOptions) -> Result<Vec<u8>, TorrentError>;
}

/// Hashes files on the blocking pool and emits a multi-file metainfo.
pub struct MetainfoBuilder;

#[async_trait]
impl TorrentBuilder for MetainfoBuilder {
    async fn build(&self, dir: &Path, options: &TorrentOptions) -> Result<Vec<u8>, TorrentError> {
        let dir = dir.to_path_buf();
        let options = options.clone();
        tokio::task::spawn_blocking(move || build_metainfo(&dir, &options))
            .await
            .map_err(|e| TorrentError::Io(std::io::Error::other(e)))?
    }
}

/// Aim for roughly a thousand pieces, within 32 KiB..256 MiB.
pub fn piece_length(total_size: u64) -> u64 {
    let ideal = (total_size as f64 / 1280.0).max(1.0).log2().round() as i32;
    1u64 << ideal.clamp(MIN_PIECE_EXPONENT, MAX_PIECE_EXPONENT)
}

struct PayloadFile {
    path: PathBuf,
    components: Vec<String>,
    length: u64,
}

fn collect_files(dir: &Path) -> Result<Vec<PayloadFile>, TorrentError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(dir)
            .map_err(|_| TorrentError::Empty(dir.to_path_buf()))?;
        let components = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();
        files.push(PayloadFile {
            path: entry.path().to_path_buf(),
            components,
            length: entry.metadata()?.len(),
        });
    }
    Ok(files)
}

/// Concatenate the files in order and SHA-1 each fixed-size piece.
fn hash_pieces(files: &[PayloadFile], piece_len: usize) -> Result<Vec<u8>, TorrentError> {
    let mut pieces = Vec::new();
    let mut hasher = Sha1::new();
    let mut in_piece = 0usize;
    let mut buf = vec![0u8; READ_BUFFER_SIZE];

    for file in files {
        let mut f = File::open(&file.path)?;
        loop {
            let n = f.read(&mut buf)?;
            if n == 0 {
                break;
            }
            let mut chunk = &buf[..n];
            while !chunk.is_empty() {
                let take = (piece_len - in_piece).min(chunk.len());
                hasher.update(&chunk[..take]);
                in_piece += take;
                chunk = &chunk[take..];
                if in_piece == piece_len {
                    pieces.extend_from_slice(&hasher.finalize_reset());
                    in_piece = 0;
                }
            }
        }
    }
    if in_piece > 0 {
        pieces.extend_from_slice(&hasher.finalize());
    }
    Ok(pieces)
}

fn build_metainfo(dir: &Path, options: &TorrentOptions) -> Result<Vec<u8>, TorrentError> {
    let files = collect_files(dir)?;
    if files.is_empty() {
        return Err(TorrentError::Empty(dir.to_path_buf()));
    }

    let total: u64 = files.iter().map(|f| f.length).sum();
    let piece_len = piece_length(total);
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| TorrentError::Empty(dir.to_path_buf()))?;
    debug!(
        "Hashing {} files in {:?}, piece length {:#}",
        files.len(),
        dir,
        byte_unit::Byte::from(piece_len)
    );

    let pieces = hash_pieces(&files, piece_len as usize)?;

    let file_list = files
        .iter()
        .map(|f| {
            let mut entry = BTreeMap::new();
            entry.insert(b"length".to_vec(), Value::Int(f.length as i64));
            entry.insert(
                b"path".to_vec(),
                Value::List(f.components.iter().map(Value::string).collect()),
            );
            Value::Dict(entry)
        })
        .collect();

    let mut info_dict = BTreeMap::new();
    info_dict.insert(b"files".to_vec(), Value::List(file_list));
    info_dict.insert(b"name".to_vec(), Value::string(&name));
    info_dict.insert(b"piece length".to_vec(), Value::Int(piece_len as i64));
    info_dict.insert(b"pieces".to_vec(), Value::Bytes(pieces));
    if options.private {
        info_dict.insert(b"private".to_vec(), Value::Int(1));
    }
    if !options.source_tag.is_empty() {
        info_dict.insert(b"source".to_vec(), Value::string(&options.source_tag));
    }

    let mut root = BTreeMap::new();
    root.insert(b"announce".to_vec(), Value::string(&options.announce_url));
    root.insert(b"created by".to_vec(), Value::string(&options.created_by));
    root.insert(
        b"creation date".to_vec(),
        Value::Int(chrono::Utc::now().timestamp()),
    );
    root.insert(b"info".to_vec(), Value::Dict(info_dict));

    info!(
        "Created torrent for {} ({:#})",
        name,
        byte_unit::Byte::from(total)
    );
    Ok(bencode::encode(&Value::Dict(root)))
}

/// Upper-case hex SHA-1 of the raw `info` dictionary.
pub fn info_hash(torrent: &[u8]) -> Result<String, TorrentError> {
    let span = bencode::dict_value_span(torrent, "info")?.ok_or(TorrentError::MissingInfo)?;
    let digest = Sha1::digest(&torrent[span]);
    Ok(digest.iter().map(|b| format!("{:02X}", b)).collect())
}
