//! Gather pipeline: snapshot → classify → fetch → correlate → assemble.
//!
//! One call per page load; nothing persists across calls. The collaborators
//! (page evaluator, captured records, body fetcher) come from outside — the
//! pipeline only sequences them and absorbs per-transfer failures where the
//! contract says to.

use crate::assemble::assemble;
use crate::classifier::{classify_script_records, find_main_document};
use crate::correlator::correlate;
use crate::fetch::{fetch_bodies, BodyFetcher, FetchMode};
use crate::snapshot::PageEvaluator;
use crate::types::{GatherError, GatherResult, RawNetworkRecord, ScriptArtifact};

/// Gather the unified script-artifact list for one page load.
///
/// `page_url` is the requester-visible URL of the main document, used to
/// locate the primary transfer for inline-content attribution. `mode` is
/// caller policy: series on memory-constrained hosts, parallel otherwise.
pub async fn gather_script_artifacts(
    evaluator: &dyn PageEvaluator,
    records: &[RawNetworkRecord],
    page_url: &str,
    fetcher: &dyn BodyFetcher,
    mode: FetchMode,
) -> GatherResult<Vec<ScriptArtifact>> {
    let dom_scripts = evaluator
        .script_snapshot()
        .await
        .map_err(|e| GatherError::Evaluation(e.to_string()))?;
    tracing::debug!(dom_scripts = dom_scripts.len(), "collected DOM snapshot");

    let script_records = classify_script_records(records);
    tracing::debug!(
        captured = records.len(),
        script_records = script_records.len(),
        "classified network records"
    );

    // A load with no document transfer (fully cached navigation) is only a
    // problem if an inline script needs attribution; correlate decides.
    let main_doc_transfer_id = find_main_document(records, page_url)
        .map(|r| r.transfer_id.clone())
        .unwrap_or_default();

    let bodies = fetch_bodies(&script_records, mode, fetcher).await;
    let failed = bodies.iter().filter(|b| b.is_empty()).count();
    if failed > 0 {
        tracing::warn!(failed, total = bodies.len(), "some script bodies were unretrievable");
    }

    let artifacts = correlate(dom_scripts, &script_records, &bodies, &main_doc_transfer_id)?;
    let artifacts = assemble(artifacts);
    tracing::info!(
        artifacts = artifacts.len(),
        synthetic = artifacts
            .iter()
            .filter(|a| a.location == crate::types::ScriptLocation::Network)
            .count(),
        "gathered script artifacts"
    );

    Ok(artifacts)
}
