//! Upload Assembler: packs completed transcodes into one upload request.

use futures::future::try_join_all;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::edition::EditionKey;
use crate::error::{PipelineError, Result};
use crate::plan::MAX_UPLOAD_FILES;
use crate::release::SourceRelease;
use crate::transcode::CompletedTask;
use crate::tracker::{TrackerApi, TrackerError, UploadForm, UploadResponse};

/// One torrent in the upload form.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub format: String,
    pub bitrate_label: String,
    pub release_description: String,
    pub torrent_bytes: Vec<u8>,
}

impl UploadFile {
    fn from_completed(done: &CompletedTask) -> Self {
        Self {
            file_name: done.file_name.clone(),
            format: done.task.target_format.as_str().to_string(),
            bitrate_label: done.task.bitrate_label.clone(),
            release_description: done.task.release_description.clone(),
            torrent_bytes: done.torrent_bytes.clone(),
        }
    }
}

/// A single submission: one primary file plus up to two extras, all in the
/// source's group and edition.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadRequest {
    pub group_id: u64,
    pub edition: EditionKey,
    files: Vec<UploadFile>,
}

impl UploadRequest {
    pub fn files(&self) -> &[UploadFile] {
        &self.files
    }

    /// Form fields in the shape `action=upload` expects.
    ///
    /// The primary file is unprefixed. Extras go to `extra_file_N` with
    /// their format, bitrate and description appended to parallel arrays.
    pub fn to_form(&self) -> UploadForm {
        let mut form = UploadForm::default();
        // `scene` and `unknown` are checked for presence, so they are never sent
        form.text("groupid", self.group_id.to_string());

        let edition = &self.edition;
        let optional = [
            ("media", edition.media.clone()),
            (
                "remaster_year",
                edition
                    .remaster_year
                    .map(|y| y.to_string())
                    .unwrap_or_default(),
            ),
            ("remaster_title", edition.remaster_title.clone()),
            ("remaster_record_label", edition.remaster_record_label.clone()),
            (
                "remaster_catalogue_number",
                edition.remaster_catalogue_number.clone(),
            ),
        ];
        for (name, value) in optional {
            if !value.is_empty() {
                form.text(name, value);
            }
        }

        let mut files = self.files.iter();
        if let Some(primary) = files.next() {
            form.file("file_input", &primary.file_name, primary.torrent_bytes.clone());
            form.text("format", &primary.format);
            form.text("bitrate", &primary.bitrate_label);
            form.text("release_desc", &primary.release_description);
        }

        for (i, extra) in files.enumerate() {
            form.file(
                format!("extra_file_{}", i + 1),
                &extra.file_name,
                extra.torrent_bytes.clone(),
            );
            form.text("extra_format[]", &extra.format);
            form.text("extra_bitrate[]", &extra.bitrate_label);
            form.text("extra_release_desc[]", &extra.release_description);
        }
        form
    }
}

/// Build the request from completed tasks, in plan order.
///
/// Tasks flagged `skip_upload` are dropped before slots are assigned.
/// Returns `None` when nothing is left to upload.
pub fn assemble_upload(
    source: &SourceRelease,
    edition: &EditionKey,
    completed: &[CompletedTask],
) -> Result<Option<UploadRequest>> {
    let files: Vec<UploadFile> = completed
        .iter()
        .filter(|done| !done.task.skip_upload)
        .map(UploadFile::from_completed)
        .collect();

    if files.len() > MAX_UPLOAD_FILES {
        return Err(PipelineError::TooManyFiles(files.len()));
    }
    if files.is_empty() {
        return Ok(None);
    }

    Ok(Some(UploadRequest {
        group_id: source.group_id,
        edition: edition.clone(),
        files,
    }))
}

/// Submit once. Tracker rejections surface as [`PipelineError::Upload`].
pub async fn submit(api: &dyn TrackerApi, request: &UploadRequest) -> Result<UploadResponse> {
    info!("Uploading {} torrents...", request.files.len());
    match api.submit_upload(&request.to_form()).await {
        Ok(response) => Ok(response),
        Err(TrackerError::Api { message, .. }) => {
            warn!("Upload rejected: {}", message);
            Err(PipelineError::Upload(message))
        }
        Err(e) => Err(e.into()),
    }
}

/// Write each torrent as `{torrent_dir}/{file_name}`.
pub async fn persist_torrents<'a>(
    torrent_dir: &Path,
    torrents: impl IntoIterator<Item = (&'a str, &'a [u8])>,
) -> Result<Vec<PathBuf>> {
    info!("Write torrents to {:?}", torrent_dir);
    let writes = torrents.into_iter().map(|(file_name, bytes)| {
        let path = torrent_dir.join(file_name);
        async move {
            tokio::fs::write(&path, bytes).await?;
            Ok::<PathBuf, std::io::Error>(path)
        }
    });
    Ok(try_join_all(writes).await?)
}
