//! One run: resolve, validate, plan, transcode, upload.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::analysis::{analyze, AudioProber};
use crate::config::AppConfig;
use crate::edition::{EditionGroup, EditionKey, NormalizationPolicy};
use crate::error::Result;
use crate::plan::{build_plan, PlanContext, PlanOptions};
use crate::process::ProcessRunner;
use crate::release::{resolve_query, resolve_release, ReleaseIdentifiers};
use crate::torrent::{TorrentBuilder, TorrentOptions, SOURCE_TAG};
use crate::tracker::{announce_url, group_permalink, torrent_permalink, TorrentQuery, TrackerApi};
use crate::transcode::{default_processes, TranscodeExecutor};
use crate::upload::{assemble_upload, persist_torrents, submit};

/// Everything the pipeline calls out to.
#[derive(Clone)]
pub struct Collaborators {
    pub tracker: Arc<dyn TrackerApi>,
    pub prober: Arc<dyn AudioProber>,
    /// Runs the transcoders. Probing goes through `prober` only.
    pub runner: Arc<dyn ProcessRunner>,
    pub torrents: Arc<dyn TorrentBuilder>,
}

#[derive(Debug, Clone)]
pub struct RunSettings {
    pub input_dir: PathBuf,
    pub identifiers: ReleaseIdentifiers,
    pub announce_url: Option<String>,
    pub torrent_dir: PathBuf,
    pub plan: PlanOptions,
    pub normalization: NormalizationPolicy,
    pub processes: usize,
    /// Print the plan table before transcoding.
    pub show_plan: bool,
}

impl RunSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            input_dir: config.input_dir.clone(),
            identifiers: config.identifiers.clone(),
            announce_url: config.announce_url.clone(),
            torrent_dir: config.torrent_dir.clone(),
            plan: config.plan_options(),
            normalization: config.normalization.clone(),
            processes: default_processes(),
            show_plan: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Every wanted encoding already exists, or none is allowed.
    NothingToDo,
    /// Submitted; the uploaded torrents were written afterwards.
    Uploaded {
        torrent_id: Option<u64>,
        torrents: Vec<PathBuf>,
    },
    /// Upload disabled; all produced torrents were written for manual upload.
    DryRun { torrents: Vec<PathBuf> },
    /// Transcodes were made for archival only, nothing was eligible for upload.
    LocalOnly { output_dirs: Vec<PathBuf> },
}

pub struct Pipeline {
    collaborators: Collaborators,
}

impl Pipeline {
    pub fn new(collaborators: Collaborators) -> Self {
        Self { collaborators }
    }

    pub async fn run(&self, settings: &RunSettings) -> Result<RunOutcome> {
        let Collaborators {
            tracker,
            prober,
            runner,
            torrents,
        } = &self.collaborators;

        let query = resolve_query(&settings.identifiers, &settings.input_dir).await?;
        let resolved = resolve_release(tracker.as_ref(), &query).await?;
        let (group, source) = (&resolved.group, &resolved.release);
        info!("permalink: {}", torrent_permalink(source.id));
        info!("grouplink: {}", group_permalink(group.id));

        // Tags are checked before anything is fetched or transcoded
        let analyzed = analyze(prober.as_ref(), &settings.input_dir, &source.file_list).await?;

        info!("Fetching torrent group...");
        let listing = tracker
            .fetch_torrent_group(&TorrentQuery::Id(group.id))
            .await?;
        let edition = EditionGroup::build(source, &listing.torrents, &settings.normalization)?;
        info!("Edition has {} torrents", edition.members().len());

        let tasks = build_plan(&PlanContext {
            group,
            source,
            edition: &edition,
            analyzed: &analyzed,
            options: &settings.plan,
        });
        if tasks.is_empty() {
            info!("No files made, nothing to do");
            return Ok(RunOutcome::NothingToDo);
        }
        if settings.show_plan {
            crate::cli_style::print_plan(&tasks);
        }

        let announce = match &settings.announce_url {
            Some(url) => url.clone(),
            None => {
                info!("Fetching passkey...");
                announce_url(&tracker.fetch_index().await?.passkey)
            }
        };
        let torrent_options = TorrentOptions {
            private: true,
            created_by: crate::TOOLCHAIN_SIGNATURE.to_string(),
            announce_url: announce,
            source_tag: SOURCE_TAG.to_string(),
        };

        let executor =
            TranscodeExecutor::new(Arc::clone(runner), Arc::clone(torrents), torrent_options)
                .with_processes(settings.processes);
        let completed = executor
            .execute_all(&settings.input_dir, &source.media, &analyzed, tasks)
            .await?;

        if settings.plan.no_upload {
            info!("Skip upload...");
            let written = persist_torrents(
                &settings.torrent_dir,
                completed
                    .iter()
                    .map(|c| (c.file_name.as_str(), c.torrent_bytes.as_slice())),
            )
            .await?;
            return Ok(RunOutcome::DryRun { torrents: written });
        }

        let Some(request) = assemble_upload(source, &EditionKey::of_release(source), &completed)?
        else {
            info!("Nothing eligible for upload, transcodes kept locally");
            return Ok(RunOutcome::LocalOnly {
                output_dirs: completed.into_iter().map(|c| c.task.output_dir).collect(),
            });
        };

        let response = submit(tracker.as_ref(), &request).await?;
        if let Some(id) = response.torrent_id {
            info!("Uploaded: {}", torrent_permalink(id));
        }

        // Only after the tracker accepted the upload
        let written = persist_torrents(
            &settings.torrent_dir,
            request
                .files()
                .iter()
                .map(|f| (f.file_name.as_str(), f.torrent_bytes.as_slice())),
        )
        .await?;
        info!("Done!");

        Ok(RunOutcome::Uploaded {
            torrent_id: response.torrent_id,
            torrents: written,
        })
    }
}
