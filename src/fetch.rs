//! Fetch scheduler: retrieve transfer bodies under a caller-selected policy.
//!
//! The scheduler is a pure function of its inputs (modulo the external fetch
//! side effect) and holds no state across calls. Individual retrieval
//! failures degrade to an empty body for that slot only — they never cancel
//! sibling retrievals and never surface as errors.

use crate::types::{FetchedBody, NetworkScriptRecord};
use anyhow::Result;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};

/// How to schedule body retrievals.
///
/// `Series` bounds peak concurrent response buffers to one in-flight body at
/// a time, for memory-constrained hosts. `Parallel` issues every retrieval at
/// once and joins on all of them. The mode affects execution strategy only,
/// never result values or result order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    Series,
    Parallel,
}

impl FetchMode {
    /// Concurrency width for a batch of `total` retrievals.
    fn width(self, total: usize) -> usize {
        match self {
            FetchMode::Series => 1,
            FetchMode::Parallel => total.max(1),
        }
    }
}

/// Retrieval primitive: given a transfer identity, return its body.
///
/// Failure here (e.g. the transfer is no longer cached) is expected and is
/// absorbed by [`fetch_bodies`].
#[async_trait]
pub trait BodyFetcher: Send + Sync {
    async fn fetch_body(&self, transfer_id: &str) -> Result<String>;
}

/// Retrieve a body for every record, aligned 1:1 and in input order.
///
/// Result order is the input order regardless of completion order; callers
/// must not assume completion order equals result order. A failed retrieval
/// yields an empty body in its slot.
pub async fn fetch_bodies(
    records: &[NetworkScriptRecord],
    mode: FetchMode,
    fetcher: &dyn BodyFetcher,
) -> Vec<FetchedBody> {
    stream::iter(records.iter().map(|record| async move {
        let body = fetcher
            .fetch_body(&record.transfer_id)
            .await
            .unwrap_or_default();
        FetchedBody {
            transfer_id: record.transfer_id.clone(),
            body,
        }
    }))
    .buffered(mode.width(records.len()))
    .collect()
    .await
}
