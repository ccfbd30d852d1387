//! Correlation of DOM script descriptors with fetched network transfers.
//!
//! This is the merge point of the two observed views. Matching is by exact
//! URL equality — a URL that differs only in its query string is a different
//! URL — and each transfer claims at most the first still-unclaimed DOM slot
//! with its URL. Network transfers with no DOM counterpart (the element was
//! removed before snapshot time, or never existed) produce one synthetic
//! artifact each.

use crate::types::{
    FetchedBody, GatherError, GatherResult, NetworkScriptRecord, ScriptArtifact, ScriptDescriptor,
};
use std::collections::HashMap;

/// Merge the DOM snapshot with the fetched network view.
///
/// Inline descriptors with content are attributed to the main document
/// transfer (their text was physically delivered as part of the page's own
/// response). Each non-empty fetched body then either fills the first
/// unclaimed DOM slot with its URL, or synthesizes a network-only artifact.
/// The output is every DOM descriptor (matched or not) followed by the
/// synthetics, in discovery order.
///
/// Fails fast with [`GatherError::MissingMainDocument`] when an inline script
/// has content but `main_doc_transfer_id` is empty — downstream consumers
/// treat the transfer identity as provenance, so mis-attribution is worse
/// than refusing.
pub fn correlate(
    dom_scripts: Vec<ScriptDescriptor>,
    network_records: &[NetworkScriptRecord],
    fetched_bodies: &[FetchedBody],
    main_doc_transfer_id: &str,
) -> GatherResult<Vec<ScriptArtifact>> {
    let mut artifacts: Vec<ScriptArtifact> = Vec::with_capacity(dom_scripts.len());

    for descriptor in dom_scripts {
        let mut artifact = ScriptArtifact::from_descriptor(descriptor);
        let inline = artifact.src.is_none();
        let has_content = artifact.content.as_deref().is_some_and(|c| !c.is_empty());
        if inline && has_content {
            if main_doc_transfer_id.is_empty() {
                return Err(GatherError::MissingMainDocument(artifact.dom_path));
            }
            artifact.transfer_id = Some(main_doc_transfer_id.to_string());
        }
        artifacts.push(artifact);
    }

    let bodies: HashMap<&str, &str> = fetched_bodies
        .iter()
        .filter(|b| !b.is_empty())
        .map(|b| (b.transfer_id.as_str(), b.body.as_str()))
        .collect();

    for record in network_records {
        // Unretrievable bodies are excluded from correlation entirely.
        let Some(body) = bodies.get(record.transfer_id.as_str()) else {
            continue;
        };

        let slot = artifacts
            .iter_mut()
            .find(|a| a.transfer_id.is_none() && a.src.as_deref() == Some(record.url.as_str()));

        match slot {
            Some(artifact) => {
                artifact.transfer_id = Some(record.transfer_id.clone());
                artifact.content = Some(body.to_string());
            }
            None => artifacts.push(ScriptArtifact::network_only(
                record.url.clone(),
                record.transfer_id.clone(),
                body.to_string(),
            )),
        }
    }

    Ok(artifacts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScriptLocation;

    fn src_descriptor(url: &str) -> ScriptDescriptor {
        ScriptDescriptor {
            mime_type: None,
            src: Some(url.to_string()),
            dom_id: None,
            is_async: false,
            is_deferred: false,
            location: ScriptLocation::Head,
            dom_path: format!("1,HTML,0,HEAD,0,SCRIPT[{url}]"),
            inline_content: None,
            transfer_id: None,
        }
    }

    fn inline_descriptor(text: &str) -> ScriptDescriptor {
        ScriptDescriptor {
            mime_type: None,
            src: None,
            dom_id: None,
            is_async: false,
            is_deferred: false,
            location: ScriptLocation::Body,
            dom_path: "1,HTML,1,BODY,0,SCRIPT".to_string(),
            inline_content: Some(text.to_string()),
            transfer_id: None,
        }
    }

    fn record(id: &str, url: &str) -> NetworkScriptRecord {
        NetworkScriptRecord {
            transfer_id: id.to_string(),
            url: url.to_string(),
            frame_scoped: false,
        }
    }

    fn body(id: &str, text: &str) -> FetchedBody {
        FetchedBody {
            transfer_id: id.to_string(),
            body: text.to_string(),
        }
    }

    #[test]
    fn test_matched_src_script_gains_transfer_and_content() {
        let dom = vec![src_descriptor("https://example.com/a.js")];
        let records = vec![record("T1", "https://example.com/a.js")];
        let bodies = vec![body("T1", "var a = 1;")];

        let out = correlate(dom, &records, &bodies, "T0").unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].transfer_id.as_deref(), Some("T1"));
        assert_eq!(out[0].content.as_deref(), Some("var a = 1;"));
    }

    #[test]
    fn test_duplicate_src_claims_first_unclaimed_slot_only() {
        let dom = vec![
            src_descriptor("https://example.com/a.js"),
            src_descriptor("https://example.com/a.js"),
        ];
        let records = vec![record("T1", "https://example.com/a.js")];
        let bodies = vec![body("T1", "var a = 1;")];

        let out = correlate(dom, &records, &bodies, "T0").unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].transfer_id.as_deref(), Some("T1"));
        assert_eq!(out[0].content.as_deref(), Some("var a = 1;"));
        assert_eq!(out[1].transfer_id, None);
        assert_eq!(out[1].content, None);
    }

    #[test]
    fn test_repeated_includes_each_claim_one_slot() {
        let dom = vec![
            src_descriptor("https://example.com/a.js"),
            src_descriptor("https://example.com/a.js"),
        ];
        let records = vec![
            record("T1", "https://example.com/a.js"),
            record("T2", "https://example.com/a.js"),
        ];
        let bodies = vec![body("T1", "first"), body("T2", "second")];

        let out = correlate(dom, &records, &bodies, "T0").unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].transfer_id.as_deref(), Some("T1"));
        assert_eq!(out[1].transfer_id.as_deref(), Some("T2"));
    }

    #[test]
    fn test_unmatched_record_synthesizes_network_artifact() {
        let dom = vec![src_descriptor("https://example.com/a.js")];
        let records = vec![record("T2", "https://example.com/b.js")];
        let bodies = vec![body("T2", "var b = 2;")];

        let out = correlate(dom, &records, &bodies, "T0").unwrap();
        assert_eq!(out.len(), 2);
        let synthetic = &out[1];
        assert_eq!(synthetic.location, ScriptLocation::Network);
        assert_eq!(synthetic.src.as_deref(), Some("https://example.com/b.js"));
        assert_eq!(synthetic.transfer_id.as_deref(), Some("T2"));
        assert_eq!(synthetic.content.as_deref(), Some("var b = 2;"));
        assert_eq!(synthetic.dom_path, "");
        assert!(!synthetic.is_async && !synthetic.is_deferred);
    }

    #[test]
    fn test_inline_script_attributed_to_main_document() {
        let dom = vec![inline_descriptor("console.log(1)")];
        let out = correlate(dom, &[], &[], "T0").unwrap();
        assert_eq!(out[0].transfer_id.as_deref(), Some("T0"));
        assert_eq!(out[0].content.as_deref(), Some("console.log(1)"));
    }

    #[test]
    fn test_empty_inline_script_is_not_attributed() {
        let dom = vec![inline_descriptor("")];
        let out = correlate(dom, &[], &[], "T0").unwrap();
        assert_eq!(out[0].transfer_id, None);
    }

    #[test]
    fn test_inline_without_main_document_fails_fast() {
        let dom = vec![inline_descriptor("console.log(1)")];
        let err = correlate(dom, &[], &[], "").unwrap_err();
        assert!(matches!(err, GatherError::MissingMainDocument(_)));
    }

    #[test]
    fn test_missing_main_document_ok_without_inline_scripts() {
        let dom = vec![src_descriptor("https://example.com/a.js")];
        let out = correlate(dom, &[], &[], "").unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_failed_fetch_leaves_descriptor_untouched() {
        let dom = vec![src_descriptor("https://example.com/a.js")];
        let records = vec![record("T1", "https://example.com/a.js")];
        let bodies = vec![body("T1", "")];

        let out = correlate(dom, &records, &bodies, "T0").unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].transfer_id, None);
        assert_eq!(out[0].content, None);
    }

    #[test]
    fn test_uncaptured_src_script_keeps_nulls() {
        // Cached or blocked: the tag exists but no transfer was captured.
        let dom = vec![src_descriptor("https://example.com/cached.js")];
        let out = correlate(dom, &[], &[], "T0").unwrap();
        assert_eq!(out[0].transfer_id, None);
        assert_eq!(out[0].content, None);
    }

    #[test]
    fn test_query_strings_are_distinct_urls() {
        let dom = vec![src_descriptor("https://example.com/a.js?v=1")];
        let records = vec![record("T1", "https://example.com/a.js?v=2")];
        let bodies = vec![body("T1", "var a;")];

        let out = correlate(dom, &records, &bodies, "T0").unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].transfer_id, None);
        assert_eq!(out[1].location, ScriptLocation::Network);
    }

    #[test]
    fn test_length_law_and_determinism() {
        let dom = vec![
            inline_descriptor("console.log(1)"),
            src_descriptor("https://example.com/a.js"),
            src_descriptor("https://example.com/gone.js"),
        ];
        let records = vec![
            record("T1", "https://example.com/a.js"),
            record("T2", "https://example.com/network-only.js"),
            record("T3", "https://example.com/failed.js"),
        ];
        let bodies = vec![body("T1", "a"), body("T2", "n"), body("T3", "")];

        let once = correlate(dom.clone(), &records, &bodies, "T0").unwrap();
        let twice = correlate(dom, &records, &bodies, "T0").unwrap();

        // len == DOM descriptors + unmatched records with non-empty bodies
        assert_eq!(once.len(), 3 + 1);
        assert_eq!(once, twice);

        // No transfer claims two DOM slots.
        let mut claimed: Vec<&str> = once
            .iter()
            .filter(|a| a.location != ScriptLocation::Network)
            .filter_map(|a| a.transfer_id.as_deref())
            .collect();
        claimed.sort_unstable();
        let before = claimed.len();
        claimed.dedup();
        assert_eq!(claimed.len(), before);
    }
}
