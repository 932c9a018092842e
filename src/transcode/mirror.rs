//! Copies artwork and liner files from the source tree into an output tree.

use futures::future::try_join_all;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Directories already created during one run.
///
/// Owned by a single run and handed explicitly to whatever creates output
/// directories, so repeated `mkdir -p` calls on the same path are skipped.
#[derive(Debug, Default)]
pub struct DirMemo {
    created: HashSet<PathBuf>,
}

impl DirMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `dir` and its parents unless this memo already did.
    pub async fn ensure(&mut self, dir: &Path) -> io::Result<()> {
        if self.created.contains(dir) {
            return Ok(());
        }
        tokio::fs::create_dir_all(dir).await?;
        self.created.insert(dir.to_path_buf());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.created.len()
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
    }
}

/// Whether a non-audio file travels with the transcode.
///
/// Cover art and PDFs always do. Text files only for physical media other
/// than CD, where they usually carry lineage information.
pub fn should_mirror(relative: &Path, media: &str) -> bool {
    let Some(ext) = relative.extension().map(|e| e.to_string_lossy().to_lowercase()) else {
        return false;
    };
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) || ext == "pdf" {
        return true;
    }
    ext == "txt" && media != "CD" && media != "WEB"
}

/// Mirror eligible files from `input_dir` into `output_dir`, keeping the
/// relative layout. Copies run concurrently; returns once all are done.
pub async fn mirror_auxiliary_files(
    input_dir: &Path,
    output_dir: &Path,
    media: &str,
    dirs: &mut DirMemo,
) -> io::Result<usize> {
    let mut copies = Vec::new();

    for entry in WalkDir::new(input_dir).sort_by_file_name() {
        let entry = entry.map_err(io::Error::other)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(input_dir) else {
            continue;
        };
        if !should_mirror(relative, media) {
            continue;
        }

        let dst = output_dir.join(relative);
        if let Some(parent) = dst.parent() {
            dirs.ensure(parent).await?;
        }
        debug!("Copy {:?}", relative);
        copies.push(tokio::fs::copy(entry.path().to_path_buf(), dst));
    }

    let copied = try_join_all(copies).await?;
    Ok(copied.len())
}
