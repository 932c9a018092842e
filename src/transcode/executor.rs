//! Transcode Executor: runs planned tasks one after another.

use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use super::mirror::{mirror_auxiliary_files, DirMemo};
use crate::analysis::AnalyzedFile;
use crate::error::Result;
use crate::plan::{CommandSpec, TranscodeTask};
use crate::process::{run_checked, ProcessRunner};
use crate::torrent::{TorrentBuilder, TorrentOptions};

/// A task whose output directory is written and packaged.
#[derive(Debug, Clone)]
pub struct CompletedTask {
    pub task: TranscodeTask,
    /// `{output dir name}.torrent`
    pub file_name: String,
    pub torrent_bytes: Vec<u8>,
}

/// 48 kHz family sources resample to 48000, everything else to 44100.
pub fn target_sample_rate(source_rate: u32) -> u32 {
    if source_rate != 0 && source_rate % 48000 == 0 {
        48000
    } else {
        44100
    }
}

/// Logical CPU count, used as the MP3 encoder's process count.
pub fn default_processes() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

pub struct TranscodeExecutor {
    runner: Arc<dyn ProcessRunner>,
    torrents: Arc<dyn TorrentBuilder>,
    torrent_options: TorrentOptions,
    processes: usize,
}

impl TranscodeExecutor {
    pub fn new(
        runner: Arc<dyn ProcessRunner>,
        torrents: Arc<dyn TorrentBuilder>,
        torrent_options: TorrentOptions,
    ) -> Self {
        Self {
            runner,
            torrents,
            torrent_options,
            processes: default_processes(),
        }
    }

    pub fn with_processes(mut self, processes: usize) -> Self {
        self.processes = processes.max(1);
        self
    }

    /// Execute every task in plan order. The first failure aborts the run and
    /// leaves whatever was already written in place.
    pub async fn execute_all(
        &self,
        input_dir: &Path,
        media: &str,
        analyzed: &[AnalyzedFile],
        tasks: Vec<TranscodeTask>,
    ) -> Result<Vec<CompletedTask>> {
        let mut dirs = DirMemo::new();
        let mut completed = Vec::with_capacity(tasks.len());
        for task in tasks {
            completed.push(self.execute(input_dir, media, analyzed, task, &mut dirs).await?);
        }
        Ok(completed)
    }

    async fn execute(
        &self,
        input_dir: &Path,
        media: &str,
        analyzed: &[AnalyzedFile],
        task: TranscodeTask,
        dirs: &mut DirMemo,
    ) -> Result<CompletedTask> {
        info!("Transcoding {:?}", task.output_dir);
        dirs.ensure(&task.output_dir).await?;

        match &task.command {
            CommandSpec::Resample { .. } => {
                self.resample(input_dir, &task, analyzed, dirs).await?;
            }
            CommandSpec::Mp3 { .. } => {
                let args = task
                    .command
                    .mp3_args(input_dir, &task.output_dir, self.processes);
                run_checked(self.runner.as_ref(), &task.command.program(), &args).await?;
            }
        }

        let copied = mirror_auxiliary_files(input_dir, &task.output_dir, media, dirs).await?;
        debug!("Copied {} auxiliary files", copied);

        let torrent_bytes = self
            .torrents
            .build(&task.output_dir, &self.torrent_options)
            .await?;
        let file_name = torrent_file_name(&task.output_dir);

        Ok(CompletedTask {
            task,
            file_name,
            torrent_bytes,
        })
    }

    /// One sox call per file; the target rate is decided per file.
    async fn resample(
        &self,
        input_dir: &Path,
        task: &TranscodeTask,
        analyzed: &[AnalyzedFile],
        dirs: &mut DirMemo,
    ) -> Result<()> {
        let program = task.command.program();
        for file in analyzed {
            let src = input_dir.join(&file.relative_path);
            let dst = task.output_dir.join(&file.relative_path);
            if let Some(parent) = dst.parent() {
                dirs.ensure(parent).await?;
            }

            let rate = target_sample_rate(file.sample_rate);
            info!("Transcoding {} ({} Hz -> {} Hz)", file.relative_path, file.sample_rate, rate);
            let args = task.command.resample_args(&src, &dst, rate);
            run_checked(self.runner.as_ref(), &program, &args).await?;
        }
        Ok(())
    }
}

pub fn torrent_file_name(output_dir: &Path) -> String {
    let base = output_dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    format!("{}.torrent", base)
}
