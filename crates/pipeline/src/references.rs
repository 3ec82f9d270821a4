//! Lookups that need no network access.

use url::Url;

use crate::{LookupError, OpaqueValue, Reference, StoryId};

/// Index of the item id among the `/`-separated segments of an item URL path.
///
/// Item URLs look like `https://app.shortcut.com/<workspace>/story/<id>/<slug>`;
/// splitting the path on `/` yields `["", workspace, "story", id, slug]`.
pub const ITEM_ID_SEGMENT: usize = 3;

/// Resolves an opaque id through the payload's reference table.
///
/// Returns an empty string when no entry matches; callers treat that as an
/// unknown state rather than an error.
pub fn resolve_reference<'a>(id: &OpaqueValue, references: &'a [Reference]) -> &'a str {
    references
        .iter()
        .find(|reference| {
            reference
                .id
                .as_ref()
                .is_some_and(|candidate| candidate.same_identity(id))
        })
        .map(|reference| reference.name.as_str())
        .unwrap_or("")
}

/// Extracts the work-item id from an item or comment URL.
pub fn item_id_from_url(item_url: &str) -> Result<StoryId, LookupError> {
    let invalid = || LookupError::InvalidItemUrl {
        url: item_url.to_string(),
    };
    let parsed = Url::parse(item_url).map_err(|_| invalid())?;
    let segment = parsed.path().split('/').nth(ITEM_ID_SEGMENT).ok_or_else(invalid)?;
    StoryId::new(segment).ok_or_else(invalid)
}
