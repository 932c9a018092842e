//! Output directory naming.
//!
//! Names are deterministic so each encoding of an edition gets its own
//! sibling directory, and the tracker-visible torrent name follows from it.

use crate::edition::decode_entities;
use crate::release::{ReleaseGroup, SourceRelease};

/// Stands in for `/`, which cannot appear in a file name.
const SLASH_LOOKALIKE: char = '\u{2215}';

/// Make `name` safe to use as a single path component.
///
/// Idempotent: sanitizing an already sanitized name returns it unchanged.
pub fn sanitize_filename(name: &str) -> String {
    let mapped: String = name
        .chars()
        .map(|c| match c {
            '/' => SLASH_LOOKALIKE,
            '\\' | '<' | '>' | ':' | '"' | '?' | '*' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let mut s = mapped.as_str();
    loop {
        let next = s.trim().trim_start_matches('~');
        if next.len() == s.len() {
            break;
        }
        s = next;
    }

    let without_dots = s.trim_end_matches('.');
    if without_dots.len() == s.len() {
        s.to_string()
    } else {
        format!("{}_", without_dots)
    }
}

/// One artist by name, two joined with `&`, anything else is "Various Artists".
pub fn artist_label(artists: &[String]) -> String {
    match artists {
        [one] => one.clone(),
        [first, second] => format!("{} & {}", first, second),
        _ => "Various Artists".to_string(),
    }
}

/// `{artists} - {title}[ ({remaster title})][ ({year})][{media} {format}]`
///
/// The year is the remaster year, falling back to the group's original year.
pub fn output_dir_name(group: &ReleaseGroup, source: &SourceRelease, format_label: &str) -> String {
    let artists: Vec<String> = group
        .artists
        .iter()
        .map(|a| decode_entities(a).into_owned())
        .collect();

    let mut name = format!(
        "{} - {}",
        artist_label(&artists),
        decode_entities(&group.name)
    );

    if !source.remaster_title.is_empty() {
        name.push_str(&format!(" ({})", decode_entities(&source.remaster_title)));
    }

    if let Some(year) = source.remaster_year.or(group.year) {
        name.push_str(&format!(" ({})", year));
    }

    name.push_str(&format!("[{} {}]", source.media, format_label));
    sanitize_filename(&name)
}
