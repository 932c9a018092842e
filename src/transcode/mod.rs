//! Transcode Executor and the auxiliary file mirror it uses.

mod executor;
mod mirror;

pub use executor::{
    default_processes, target_sample_rate, torrent_file_name, CompletedTask, TranscodeExecutor,
};
pub use mirror::{mirror_auxiliary_files, should_mirror, DirMemo};
