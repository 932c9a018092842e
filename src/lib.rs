//! red-trul library
//!
//! Transcodes 24-bit FLAC releases to FLAC16, V0 and 320 and uploads the
//! encodings an edition is missing. Modules are public for the binaries and
//! the integration tests.

pub mod analysis;
pub mod cli_style;
pub mod config;
pub mod edition;
pub mod error;
pub mod pipeline;
pub mod plan;
pub mod process;
pub mod release;
pub mod torrent;
pub mod tracker;
pub mod transcode;
pub mod upload;

pub use error::{PipelineError, Result};
pub use pipeline::{Collaborators, Pipeline, RunOutcome, RunSettings};

/// `name@version`, stamped into torrents, descriptions and the user agent.
pub const TOOLCHAIN_SIGNATURE: &str = concat!(env!("CARGO_PKG_NAME"), "@", env!("CARGO_PKG_VERSION"));
