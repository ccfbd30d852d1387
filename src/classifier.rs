//! Network-record classification.
//!
//! Filters a raw capture down to the script transfers that belong to the
//! primary browsing context, and locates the main document transfer used for
//! inline-content attribution. Both are pure functions over the record list;
//! observation order is always preserved.

use crate::types::{NetworkScriptRecord, RawNetworkRecord, ResourceKind};

/// Keep the script-type transfers of the primary browsing context.
///
/// Records carrying a `session_id` were routed from a nested or
/// out-of-process frame and are dropped. Input order is preserved.
pub fn classify_script_records(records: &[RawNetworkRecord]) -> Vec<NetworkScriptRecord> {
    records
        .iter()
        .filter(|r| r.session_id.is_none())
        .filter(|r| r.resource_type == ResourceKind::Script)
        .map(|r| NetworkScriptRecord {
            transfer_id: r.transfer_id.clone(),
            url: r.url.clone(),
            frame_scoped: false,
        })
        .collect()
}

/// Locate the page's own top-level response among the captured records.
///
/// Prefers the document-type record whose URL equals the requester-visible
/// page URL; falls back to the first document-type record. Returns `None`
/// when the capture holds no document transfer at all (e.g. a cached
/// navigation that produced no network traffic).
pub fn find_main_document<'a>(
    records: &'a [RawNetworkRecord],
    page_url: &str,
) -> Option<&'a RawNetworkRecord> {
    let mut documents = records
        .iter()
        .filter(|r| r.resource_type == ResourceKind::Document);

    let mut first = None;
    for record in &mut documents {
        if record.url == page_url {
            return Some(record);
        }
        first.get_or_insert(record);
    }
    first
}
