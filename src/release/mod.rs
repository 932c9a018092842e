//! The source release being transcoded and how it is resolved.

mod origin;
mod resolver;

pub use origin::{origin_path, OriginFile, ORIGIN_FILE_NAME};
pub use resolver::{resolve_query, resolve_release, ReleaseIdentifiers, REQUIRED_FORMAT};

use crate::tracker::{ApiGroup, ApiTorrent};

/// One entry of a torrent's file list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path relative to the torrent root, e.g. `CD1/01 Intro.flac`.
    pub relative_path: String,
    pub size_bytes: u64,
}

impl FileEntry {
    pub fn is_flac(&self) -> bool {
        self.relative_path.to_lowercase().ends_with(".flac")
    }
}

/// The lossless torrent we transcode from. Never modified after it is fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRelease {
    pub id: u64,
    pub group_id: u64,
    pub media: String,
    pub encoding: String,
    pub format: String,
    pub remaster_title: String,
    pub remaster_year: Option<u32>,
    pub remaster_catalogue_number: String,
    pub remaster_record_label: String,
    pub file_list: Vec<FileEntry>,
}

impl SourceRelease {
    pub fn from_api(group_id: u64, torrent: &ApiTorrent) -> Self {
        Self {
            id: torrent.id,
            group_id,
            media: torrent.media.clone(),
            encoding: torrent.encoding.clone(),
            format: torrent.format.clone(),
            remaster_title: torrent.remaster_title.clone(),
            remaster_year: non_zero(torrent.remaster_year),
            remaster_catalogue_number: torrent.remaster_catalogue_number.clone(),
            remaster_record_label: torrent.remaster_record_label.clone(),
            file_list: parse_file_list(&torrent.file_list),
        }
    }

    pub fn flac_files(&self) -> impl Iterator<Item = &FileEntry> {
        self.file_list.iter().filter(|f| f.is_flac())
    }
}

/// Group-level metadata shared by every torrent of a release.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseGroup {
    pub id: u64,
    pub name: String,
    pub year: Option<u32>,
    /// Main artists, in tracker order.
    pub artists: Vec<String>,
}

impl ReleaseGroup {
    pub fn from_api(group: &ApiGroup) -> Self {
        Self {
            id: group.id,
            name: group.name.clone(),
            year: non_zero(group.year),
            artists: group
                .music_info
                .as_ref()
                .map(|m| m.artists.iter().map(|a| a.name.clone()).collect())
                .unwrap_or_default(),
        }
    }
}

/// Output of the resolver: the source torrent and its group.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRelease {
    pub group: ReleaseGroup,
    pub release: SourceRelease,
}

fn non_zero(year: u32) -> Option<u32> {
    (year != 0).then_some(year)
}

/// Parse the tracker's `name{{{size}}}|||name{{{size}}}` file list encoding.
///
/// Entries without a size suffix are kept with size 0.
pub fn parse_file_list(encoded: &str) -> Vec<FileEntry> {
    encoded
        .split("|||")
        .filter(|e| !e.is_empty())
        .map(|entry| {
            let entry = html_escape::decode_html_entities(entry);
            match entry.strip_suffix("}}}").and_then(|e| e.rsplit_once("{{{")) {
                Some((name, size)) => FileEntry {
                    relative_path: name.to_string(),
                    size_bytes: size.parse().unwrap_or(0),
                },
                None => FileEntry {
                    relative_path: entry.to_string(),
                    size_bytes: 0,
                },
            }
        })
        .collect()
}
