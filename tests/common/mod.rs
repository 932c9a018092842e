//! Common test infrastructure
//!
//! Recording fakes for every collaborator of the pipeline, plus a release
//! fixture laid out on disk. Tests should only import from this module.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::TestEnv;
//!
//! #[tokio::test]
//! async fn test_plan() {
//!     let env = TestEnv::new();
//!     let outcome = env.pipeline().run(&env.settings()).await.unwrap();
//! }
//! ```

mod constants;
mod fakes;
mod fixtures;

// Public API - this is what tests import
pub use constants::*;
pub use fakes::{probe_info, FakeProber, FakeTorrentBuilder, FakeTracker, RecordingRunner};
pub use fixtures::{group, sibling, source_torrent, TestEnv};
