//! `origin.yaml` sidecar files left in a download directory by gazelle-origin.

use serde_yaml::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};

pub const ORIGIN_FILE_NAME: &str = "origin.yaml";

/// Fields of an origin file, keyed by snake_case name
/// (`"Info hash"` becomes `info_hash`, `"Edition year"` becomes `edition_year`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OriginFile {
    fields: HashMap<String, String>,
}

impl OriginFile {
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let parsed: HashMap<String, Value> =
            serde_yaml::from_str(content).map_err(|e| PipelineError::Origin {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let fields = parsed
            .into_iter()
            .filter_map(|(k, v)| scalar_to_string(&v).map(|s| (to_snake_case(&k), s)))
            .collect();
        Ok(Self { fields })
    }

    pub async fn load(dir: &Path) -> Result<Option<Self>> {
        let path = origin_path(dir);
        if !tokio::fs::try_exists(&path).await? {
            return Ok(None);
        }
        let content = tokio::fs::read_to_string(&path).await?;
        Self::parse(&content, &path).map(Some)
    }

    /// Missing keys read as empty strings, like explicit nulls do.
    pub fn get(&self, key: &str) -> &str {
        self.fields.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn info_hash(&self) -> &str {
        self.get("info_hash")
    }

    pub fn format(&self) -> &str {
        self.get("format")
    }

    pub fn permalink(&self) -> &str {
        self.get("permalink")
    }
}

pub fn origin_path(dir: &Path) -> PathBuf {
    dir.join(ORIGIN_FILE_NAME)
}

fn to_snake_case(key: &str) -> String {
    key.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Nulls become empty strings; sequences and maps (the file listing) are dropped.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
Artist:         Vanilla
Name:           Pointbreak
Edition:        ~
Edition year:   2021
Media:          WEB
Catalog number: ~
Record label:   Self-Released
Original year:  2021
Format:         FLAC
Encoding:       24bit Lossless
Info hash:      0123456789ABCDEF0123456789ABCDEF01234567
Permalink:      https://redacted.ch/torrents.php?torrentid=456
Files:
- Name: 01 Pointbreak.flac
  Size: 1234
"#;

    #[test]
    fn test_parse_normalizes_keys() {
        let origin = OriginFile::parse(SAMPLE, Path::new("origin.yaml")).unwrap();
        assert_eq!(origin.info_hash(), "0123456789ABCDEF0123456789ABCDEF01234567");
        assert_eq!(origin.format(), "FLAC");
        assert_eq!(origin.get("edition_year"), "2021");
        assert_eq!(origin.get("record_label"), "Self-Released");
        assert_eq!(
            origin.permalink(),
            "https://redacted.ch/torrents.php?torrentid=456"
        );
    }

    #[test]
    fn test_nulls_become_empty() {
        let origin = OriginFile::parse(SAMPLE, Path::new("origin.yaml")).unwrap();
        assert_eq!(origin.get("edition"), "");
        assert_eq!(origin.get("catalog_number"), "");
        assert_eq!(origin.get("does_not_exist"), "");
        assert_eq!(origin.get("files"), "");
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let err = OriginFile::parse("- just\n- a list", Path::new("/x/origin.yaml")).unwrap_err();
        assert!(matches!(err, PipelineError::Origin { .. }));
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(to_snake_case("Info hash"), "info_hash");
        assert_eq!(to_snake_case("Edition  Year"), "edition_year");
        assert_eq!(to_snake_case("Format"), "format");
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(OriginFile::load(dir.path()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_load_existing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(origin_path(dir.path()), SAMPLE).unwrap();
        let origin = OriginFile::load(dir.path()).await.unwrap().unwrap();
        assert_eq!(origin.format(), "FLAC");
    }
}
