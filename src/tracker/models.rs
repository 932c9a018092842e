//! Wire types of the tracker's JSON API (`ajax.php`).
//!
//! Text fields arrive HTML-entity encoded (e.g. `L&oslash;msk`); decoding is
//! left to the consumers.

use serde::{Deserialize, Serialize};

/// Identifies a torrent on the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TorrentQuery {
    Id(u64),
    Hash(String),
}

impl TorrentQuery {
    /// Query-string pair understood by `action=torrent` and `action=torrentgroup`.
    pub fn query_pair(&self) -> (&'static str, String) {
        match self {
            TorrentQuery::Id(id) => ("id", id.to_string()),
            TorrentQuery::Hash(hash) => ("hash", hash.to_uppercase()),
        }
    }
}

impl std::fmt::Display for TorrentQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TorrentQuery::Id(id) => write!(f, "id={}", id),
            TorrentQuery::Hash(hash) => write!(f, "hash={}", hash),
        }
    }
}

/// Common `{status, response, error}` wrapper of every API reply.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub status: String,
    pub response: Option<T>,
    pub error: Option<String>,
}

/// `action=index`
#[derive(Debug, Clone, Deserialize)]
pub struct IndexResponse {
    #[serde(default)]
    pub username: String,
    pub passkey: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ApiArtist {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct MusicInfo {
    #[serde(default)]
    pub artists: Vec<ApiArtist>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiGroup {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub year: u32,
    #[serde(default)]
    pub music_info: Option<MusicInfo>,
}

/// A torrent as listed by `action=torrent` and `action=torrentgroup`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiTorrent {
    pub id: u64,
    #[serde(default)]
    pub media: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub encoding: String,
    #[serde(default)]
    pub remaster_year: u32,
    #[serde(default)]
    pub remaster_title: String,
    #[serde(default)]
    pub remaster_record_label: String,
    #[serde(default)]
    pub remaster_catalogue_number: String,
    /// `name{{{size}}}|||name{{{size}}}...`
    #[serde(default)]
    pub file_list: String,
    #[serde(default)]
    pub file_path: String,
}

/// `action=torrent`
#[derive(Debug, Clone, Deserialize)]
pub struct TorrentResponse {
    pub group: ApiGroup,
    pub torrent: ApiTorrent,
}

/// `action=torrentgroup`
#[derive(Debug, Clone, Deserialize)]
pub struct TorrentGroupResponse {
    pub group: ApiGroup,
    #[serde(default)]
    pub torrents: Vec<ApiTorrent>,
}

/// `action=upload`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    #[serde(default, alias = "torrentid")]
    pub torrent_id: Option<u64>,
    #[serde(default, alias = "groupid")]
    pub group_id: Option<u64>,
}

/// Value of one multipart field.
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Text(String),
    File { file_name: String, bytes: Vec<u8> },
}

/// Ordered multipart form submitted to `action=upload`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadForm {
    pub fields: Vec<(String, FormValue)>,
}

impl UploadForm {
    pub fn text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), FormValue::Text(value.into())));
    }

    pub fn file(&mut self, name: impl Into<String>, file_name: impl Into<String>, bytes: Vec<u8>) {
        self.fields.push((
            name.into(),
            FormValue::File {
                file_name: file_name.into(),
                bytes,
            },
        ));
    }

    /// All text values sent under `name`.
    pub fn texts(&self, name: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(n, _)| n == name)
            .filter_map(|(_, v)| match v {
                FormValue::Text(t) => Some(t.as_str()),
                FormValue::File { .. } => None,
            })
            .collect()
    }

    /// File name of the file part sent under `name`, if any.
    pub fn file_name(&self, name: &str) -> Option<&str> {
        self.fields.iter().find_map(|(n, v)| match v {
            FormValue::File { file_name, .. } if n == name => Some(file_name.as_str()),
            _ => None,
        })
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|(n, _)| n == name)
    }
}
