//! Transcode Plan Builder: which encodings to make and where they go.

mod description;
mod naming;
mod planner;

pub use description::release_description;
pub use naming::{artist_label, output_dir_name, sanitize_filename};
pub use planner::{
    build_plan, CommandSpec, PlanContext, PlanOptions, TargetFormat, TranscodeKind,
    TranscodeTask, MAX_UPLOAD_FILES,
};
