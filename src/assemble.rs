//! Final shaping of the merged artifact list.
//!
//! Presentational only: optional fields that arrived as empty strings (some
//! DOM attributes serialize that way) become `None`, and the correlator's
//! ordering passes through untouched.

use crate::types::ScriptArtifact;

/// Normalize every artifact into the output contract. Order-preserving.
pub fn assemble(artifacts: Vec<ScriptArtifact>) -> Vec<ScriptArtifact> {
    artifacts
        .into_iter()
        .map(|mut artifact| {
            artifact.mime_type = none_if_empty(artifact.mime_type);
            artifact.src = none_if_empty(artifact.src);
            artifact.dom_id = none_if_empty(artifact.dom_id);
            artifact.transfer_id = none_if_empty(artifact.transfer_id);
            artifact
        })
        .collect()
}

fn none_if_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
