//! Transcode Plan Builder.
//!
//! The plan is an ordered rule table. Order is significant: the first
//! uploadable task becomes the primary file of the upload, the next ones
//! `extra_file_1` and `extra_file_2`.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::description::release_description;
use super::naming::output_dir_name;
use crate::analysis::{is_eligible_for_flac16, is_mp3_incompatible, AnalyzedFile};
use crate::edition::EditionGroup;
use crate::release::{ReleaseGroup, SourceRelease};

/// The tracker's upload form takes one primary file and two extras.
pub const MAX_UPLOAD_FILES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFormat {
    Flac,
    Mp3,
}

impl TargetFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetFormat::Flac => "FLAC",
            TargetFormat::Mp3 => "MP3",
        }
    }
}

/// The encodings this tool can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscodeKind {
    Flac16,
    Mp3V0,
    Mp3Cbr320,
}

impl TranscodeKind {
    pub fn format(&self) -> TargetFormat {
        match self {
            TranscodeKind::Flac16 => TargetFormat::Flac,
            TranscodeKind::Mp3V0 | TranscodeKind::Mp3Cbr320 => TargetFormat::Mp3,
        }
    }

    /// Encoding label as the tracker spells it.
    pub fn bitrate_label(&self) -> &'static str {
        match self {
            TranscodeKind::Flac16 => "Lossless",
            TranscodeKind::Mp3V0 => "V0 (VBR)",
            TranscodeKind::Mp3Cbr320 => "320",
        }
    }

    /// Short label used in output directory names.
    pub fn dir_label(&self) -> &'static str {
        match self {
            TranscodeKind::Flac16 => "FLAC",
            TranscodeKind::Mp3V0 => "V0",
            TranscodeKind::Mp3Cbr320 => "320",
        }
    }
}

/// External command a task runs, with the paths of the tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandSpec {
    /// sox resampling to 16 bit, run once per file.
    Resample { sox: PathBuf },
    /// flac2mp3 over the whole directory.
    Mp3 { flac2mp3: PathBuf, preset: &'static str },
}

impl CommandSpec {
    /// Human-readable template quoted in the release description.
    pub fn template(&self) -> String {
        match self {
            CommandSpec::Resample { .. } => {
                "sox -G input.flac -b16 output.flac rate -v -L {sampleRate} dither".to_string()
            }
            CommandSpec::Mp3 { preset, .. } => format!("flac2mp3 --preset={}", preset),
        }
    }

    pub fn program(&self) -> String {
        match self {
            CommandSpec::Resample { sox } => sox.to_string_lossy().to_string(),
            CommandSpec::Mp3 { flac2mp3, .. } => flac2mp3.to_string_lossy().to_string(),
        }
    }

    /// Arguments for resampling one file. Empty for MP3 commands.
    pub fn resample_args(&self, input: &Path, output: &Path, sample_rate: u32) -> Vec<String> {
        match self {
            CommandSpec::Resample { .. } => vec![
                "--multi-threaded".to_string(),
                "--buffer=131072".to_string(),
                "-G".to_string(),
                input.to_string_lossy().to_string(),
                "-b16".to_string(),
                output.to_string_lossy().to_string(),
                "rate".to_string(),
                "-v".to_string(),
                "-L".to_string(),
                sample_rate.to_string(),
                "dither".to_string(),
            ],
            CommandSpec::Mp3 { .. } => Vec::new(),
        }
    }

    /// Arguments for encoding a whole directory. Empty for resample commands.
    pub fn mp3_args(&self, input_dir: &Path, output_dir: &Path, processes: usize) -> Vec<String> {
        match self {
            CommandSpec::Mp3 { preset, .. } => vec![
                "--quiet".to_string(),
                format!("--preset={}", preset),
                format!("--processes={}", processes),
                input_dir.to_string_lossy().to_string(),
                output_dir.to_string_lossy().to_string(),
            ],
            CommandSpec::Resample { .. } => Vec::new(),
        }
    }
}

/// One planned transcode, consumed exactly once by the executor.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscodeTask {
    pub kind: TranscodeKind,
    pub output_dir: PathBuf,
    pub target_format: TargetFormat,
    pub bitrate_label: String,
    pub command: CommandSpec,
    pub release_description: String,
    /// Produce the files locally but leave them out of the upload.
    pub skip_upload: bool,
}

/// Switches and paths that shape the plan.
#[derive(Debug, Clone)]
pub struct PlanOptions {
    pub no_flac: bool,
    pub no_v0: bool,
    pub no_320: bool,
    pub no_upload: bool,
    pub always_transcode: bool,
    /// Output directories are created under this root.
    pub transcode_dir: PathBuf,
    pub sox_path: PathBuf,
    pub flac2mp3_path: PathBuf,
}

/// Everything the rules look at. Borrowed, read-only.
pub struct PlanContext<'a> {
    pub group: &'a ReleaseGroup,
    pub source: &'a SourceRelease,
    pub edition: &'a EditionGroup,
    pub analyzed: &'a [AnalyzedFile],
    pub options: &'a PlanOptions,
}

impl PlanContext<'_> {
    fn exists(&self, kind: TranscodeKind) -> bool {
        self.edition
            .has(kind.format().as_str(), kind.bitrate_label())
    }

    fn wanted(&self, kind: TranscodeKind) -> bool {
        if self.options.always_transcode {
            return true;
        }
        if self.exists(kind) {
            debug!("{} already exists. Skip", kind.bitrate_label());
            return false;
        }
        true
    }
}

/// A row of the decision table.
struct PlanRule {
    kind: TranscodeKind,
    applies: fn(&PlanContext) -> bool,
}

fn flac16_applies(ctx: &PlanContext) -> bool {
    !ctx.options.no_flac
        && is_eligible_for_flac16(&ctx.source.encoding, ctx.analyzed)
        && ctx.wanted(TranscodeKind::Flac16)
}

fn v0_applies(ctx: &PlanContext) -> bool {
    !ctx.options.no_v0 && !is_mp3_incompatible(ctx.analyzed) && ctx.wanted(TranscodeKind::Mp3V0)
}

fn cbr320_applies(ctx: &PlanContext) -> bool {
    !ctx.options.no_320
        && !is_mp3_incompatible(ctx.analyzed)
        && ctx.wanted(TranscodeKind::Mp3Cbr320)
}

const RULES: [PlanRule; 3] = [
    PlanRule {
        kind: TranscodeKind::Flac16,
        applies: flac16_applies,
    },
    PlanRule {
        kind: TranscodeKind::Mp3V0,
        applies: v0_applies,
    },
    PlanRule {
        kind: TranscodeKind::Mp3Cbr320,
        applies: cbr320_applies,
    },
];

fn make_task(ctx: &PlanContext, kind: TranscodeKind) -> TranscodeTask {
    let command = match kind {
        TranscodeKind::Flac16 => CommandSpec::Resample {
            sox: ctx.options.sox_path.clone(),
        },
        TranscodeKind::Mp3V0 => CommandSpec::Mp3 {
            flac2mp3: ctx.options.flac2mp3_path.clone(),
            preset: "V0",
        },
        TranscodeKind::Mp3Cbr320 => CommandSpec::Mp3 {
            flac2mp3: ctx.options.flac2mp3_path.clone(),
            preset: "320",
        },
    };

    let output_dir = ctx
        .options
        .transcode_dir
        .join(output_dir_name(ctx.group, ctx.source, kind.dir_label()));

    TranscodeTask {
        kind,
        output_dir,
        target_format: kind.format(),
        bitrate_label: kind.bitrate_label().to_string(),
        release_description: release_description(ctx.source, &command.template()),
        command,
        skip_upload: ctx.options.no_upload || ctx.exists(kind),
    }
}

/// Evaluate the rule table in order. An empty plan means there is nothing to do.
pub fn build_plan(ctx: &PlanContext) -> Vec<TranscodeTask> {
    if is_mp3_incompatible(ctx.analyzed) {
        warn!("More than two channels found, no MP3 transcodes will be made");
    }
    plan_with_rules(ctx, &RULES)
}

/// Uploadable tasks past [`MAX_UPLOAD_FILES`] are dropped; skip-flagged ones
/// don't take an upload slot.
fn plan_with_rules(ctx: &PlanContext, rules: &[PlanRule]) -> Vec<TranscodeTask> {
    let mut tasks: Vec<TranscodeTask> = Vec::new();
    for rule in rules {
        if !(rule.applies)(ctx) {
            continue;
        }

        let task = make_task(ctx, rule.kind);
        let uploadable = tasks.iter().filter(|t| !t.skip_upload).count();
        if !task.skip_upload && uploadable >= MAX_UPLOAD_FILES {
            warn!(
                "Upload already has {} files, not planning {}",
                MAX_UPLOAD_FILES,
                rule.kind.bitrate_label()
            );
            continue;
        }

        debug!("Will make {}", rule.kind.dir_label());
        tasks.push(task);
    }
    tasks
}
