//! Source Validator: transcoding preconditions of the local FLAC files.

use std::collections::BTreeSet;
use std::path::Path;
use tracing::{error, info, warn};

use super::probe::{AudioProber, ProbeInfo};
use crate::error::{PipelineError, Result};
use crate::release::FileEntry;

/// Encoding label of a 24-bit lossless source.
pub const ENCODING_24BIT_LOSSLESS: &str = "24bit Lossless";

/// Tags every FLAC file must carry before we transcode it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RequiredTag {
    Title,
    Artist,
    Album,
    Track,
}

impl RequiredTag {
    pub const ALL: [RequiredTag; 4] = [
        RequiredTag::Title,
        RequiredTag::Artist,
        RequiredTag::Album,
        RequiredTag::Track,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequiredTag::Title => "TITLE",
            RequiredTag::Artist => "ARTIST",
            RequiredTag::Album => "ALBUM",
            RequiredTag::Track => "TRACK",
        }
    }

    /// Required tags found among `keys`, compared upper-cased.
    pub fn present_in(keys: &[String]) -> BTreeSet<RequiredTag> {
        let upper: BTreeSet<String> = keys.iter().map(|k| k.to_uppercase()).collect();
        Self::ALL
            .into_iter()
            .filter(|t| upper.contains(t.as_str()))
            .collect()
    }
}

/// Probe results for one FLAC file of the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzedFile {
    /// Relative to the input directory.
    pub relative_path: String,
    pub bit_depth: u32,
    pub sample_rate: u32,
    pub channel_count: u32,
    pub tags_present: BTreeSet<RequiredTag>,
}

impl AnalyzedFile {
    pub fn from_probe(relative_path: impl Into<String>, info: &ProbeInfo) -> Self {
        Self {
            relative_path: relative_path.into(),
            bit_depth: info.bit_depth,
            sample_rate: info.sample_rate,
            channel_count: info.channels,
            tags_present: RequiredTag::present_in(&info.tag_keys),
        }
    }

    pub fn has_required_tags(&self) -> bool {
        self.tags_present.len() == RequiredTag::ALL.len()
    }
}

/// Probe every FLAC in `file_list`, in order, failing on the first file
/// missing a required tag.
///
/// Probing is sequential; running ffprobe in parallel over large releases
/// has proven flaky.
pub async fn analyze(
    prober: &dyn AudioProber,
    local_dir: &Path,
    file_list: &[FileEntry],
) -> Result<Vec<AnalyzedFile>> {
    let flacs: Vec<&FileEntry> = file_list.iter().filter(|f| f.is_flac()).collect();
    if flacs.is_empty() {
        return Err(PipelineError::Probe {
            path: local_dir.to_path_buf(),
            reason: "file list contains no FLAC files".to_string(),
        });
    }

    info!("ffprobe ({} flacs)...", flacs.len());
    let mut results = Vec::with_capacity(flacs.len());

    for entry in flacs {
        let path = local_dir.join(&entry.relative_path);
        let info = prober
            .probe(&path)
            .await
            .map_err(|e| PipelineError::Probe {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        let analyzed = AnalyzedFile::from_probe(&entry.relative_path, &info);
        if !analyzed.has_required_tags() {
            error!("Required tags are not present! check {:?}", path);
            return Err(PipelineError::Tag(path));
        }
        results.push(analyzed);
    }

    info!("Required tags are present");
    Ok(results)
}

/// True only for a 24-bit lossless source whose files are all 24-bit.
///
/// A single file of another depth disqualifies the whole batch; the offending
/// files are logged.
pub fn is_eligible_for_flac16(source_encoding: &str, files: &[AnalyzedFile]) -> bool {
    if source_encoding != ENCODING_24BIT_LOSSLESS || files.is_empty() {
        return false;
    }

    let bad: Vec<&AnalyzedFile> = files.iter().filter(|f| f.bit_depth != 24).collect();
    for f in &bad {
        warn!(
            "{} is {}-bit, not 24-bit. Won't transcode to FLAC16",
            f.relative_path, f.bit_depth
        );
    }
    bad.is_empty()
}

/// True if any file has more than two channels; the MP3 pipeline never downmixes.
pub fn is_mp3_incompatible(files: &[AnalyzedFile]) -> bool {
    files.iter().any(|f| f.channel_count > 2)
}
