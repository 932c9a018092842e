//! Test constants shared across integration tests

#![allow(dead_code)]

pub const GROUP_ID: u64 = 72189;
pub const GROUP_NAME: &str = "L&oslash;msk";
pub const ARTIST_NAME: &str = "Vanilla";
pub const GROUP_YEAR: u32 = 2016;

pub const SOURCE_TORRENT_ID: u64 = 1_234_567;
pub const SOURCE_INFO_HASH: &str = "0123456789abcdef0123456789abcdef01234567";
pub const SOURCE_MEDIA: &str = "WEB";
pub const SOURCE_REMASTER_YEAR: u32 = 2021;
pub const SOURCE_RECORD_LABEL: &str = "Self-Released";

pub const PASSKEY: &str = "deadbeefpasskey";
pub const UPLOADED_TORRENT_ID: u64 = 7_654_321;

/// Name the transcodes get, before the `[media format]` suffix.
pub const OUTPUT_BASE: &str = "Vanilla - Lømsk (2021)";

pub const TRACK_1: &str = "01 Pointbreak.flac";
pub const TRACK_2: &str = "02 Lømsk.flac";
pub const COVER: &str = "cover.jpg";
