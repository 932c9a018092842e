//! Edition Membership Matcher.
//!
//! The tracker groups torrents of the same pressing into an "edition" and
//! rejects a second torrent with the same encoding in it, so before planning we
//! need every sibling that shares the source's edition.

use std::borrow::Cow;

use crate::error::{PipelineError, Result};
use crate::release::SourceRelease;
use crate::tracker::ApiTorrent;

/// The five fields that define an edition. Equality is exact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EditionKey {
    pub media: String,
    pub remaster_title: String,
    pub remaster_catalogue_number: String,
    pub remaster_year: Option<u32>,
    pub remaster_record_label: String,
}

impl EditionKey {
    pub fn of_release(release: &SourceRelease) -> Self {
        Self {
            media: release.media.clone(),
            remaster_title: release.remaster_title.clone(),
            remaster_catalogue_number: release.remaster_catalogue_number.clone(),
            remaster_year: release.remaster_year,
            remaster_record_label: release.remaster_record_label.clone(),
        }
    }

    pub fn of_torrent(torrent: &ApiTorrent) -> Self {
        Self {
            media: torrent.media.clone(),
            remaster_title: torrent.remaster_title.clone(),
            remaster_catalogue_number: torrent.remaster_catalogue_number.clone(),
            remaster_year: (torrent.remaster_year != 0).then_some(torrent.remaster_year),
            remaster_record_label: torrent.remaster_record_label.clone(),
        }
    }

    /// Decode HTML entities in the text fields enabled by `policy`.
    pub fn normalized(&self, policy: &NormalizationPolicy) -> Self {
        let decode_if = |enabled: bool, s: &str| {
            if enabled {
                decode_entities(s).into_owned()
            } else {
                s.to_string()
            }
        };
        Self {
            media: self.media.clone(),
            remaster_title: decode_if(policy.remaster_title, &self.remaster_title),
            remaster_catalogue_number: decode_if(
                policy.catalogue_number,
                &self.remaster_catalogue_number,
            ),
            remaster_year: self.remaster_year,
            remaster_record_label: decode_if(policy.record_label, &self.remaster_record_label),
        }
    }
}

/// Which text fields get entity-decoded before comparison.
///
/// Mismatches like `L&oslash;msk` vs `Lømsk` have been seen in titles and
/// labels. Catalogue numbers have not shown it, so they stay off by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizationPolicy {
    pub remaster_title: bool,
    pub record_label: bool,
    pub catalogue_number: bool,
}

impl Default for NormalizationPolicy {
    fn default() -> Self {
        Self {
            remaster_title: true,
            record_label: true,
            catalogue_number: false,
        }
    }
}

/// Decode HTML entities such as `&amp;` or `&oslash;`.
pub fn decode_entities(s: &str) -> Cow<'_, str> {
    html_escape::decode_html_entities(s)
}

/// Keep the candidates whose normalized key equals the normalized `source`.
pub fn match_edition<'a>(
    source: &EditionKey,
    candidates: &'a [ApiTorrent],
    policy: &NormalizationPolicy,
) -> Vec<&'a ApiTorrent> {
    let source = source.normalized(policy);
    candidates
        .iter()
        .filter(|t| EditionKey::of_torrent(t).normalized(policy) == source)
        .collect()
}

/// A sibling torrent in the source's edition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditionMember {
    pub id: u64,
    pub format: String,
    pub encoding: String,
}

/// Snapshot of the source's edition. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditionGroup {
    members: Vec<EditionMember>,
}

impl EditionGroup {
    /// Filter the group listing down to the source's edition.
    ///
    /// The tracker always lists the source in its own group, so losing it
    /// here means the API and our matching disagree.
    pub fn build(
        source: &SourceRelease,
        group_torrents: &[ApiTorrent],
        policy: &NormalizationPolicy,
    ) -> Result<Self> {
        let key = EditionKey::of_release(source);
        let members: Vec<EditionMember> = match_edition(&key, group_torrents, policy)
            .into_iter()
            .map(|t| EditionMember {
                id: t.id,
                format: t.format.clone(),
                encoding: t.encoding.clone(),
            })
            .collect();

        if !members.iter().any(|m| m.id == source.id) {
            return Err(PipelineError::Consistency {
                torrent_id: source.id,
            });
        }
        Ok(Self { members })
    }

    pub fn members(&self) -> &[EditionMember] {
        &self.members
    }

    pub fn has(&self, format: &str, encoding: &str) -> bool {
        self.members
            .iter()
            .any(|m| m.format == format && m.encoding == encoding)
    }
}
