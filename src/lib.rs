// Copyright 2026 Scriptlens Contributors
// SPDX-License-Identifier: Apache-2.0

//! Scriptlens — script-artifact gatherer for headless-Chrome page loads.
//!
//! Reconciles two independently-observed views of one page load — the
//! `<script>` elements present in the rendered DOM, and the network transfers
//! classified as script resources — into a single ordered list of
//! [`ScriptArtifact`]s, each annotated with its DOM position (if any), its
//! transfer identity (if any), and its source text (if retrievable).
//!
//! The core is pure and collaborator-driven: any [`PageEvaluator`] can supply
//! the DOM snapshot and any [`BodyFetcher`] can serve transfer bodies. The
//! [`chrome`] module ships a chromiumoxide-backed implementation of both.

pub mod assemble;
pub mod chrome;
pub mod classifier;
pub mod correlator;
pub mod fetch;
pub mod gatherer;
pub mod snapshot;
pub mod types;

pub use fetch::{BodyFetcher, FetchMode};
pub use gatherer::gather_script_artifacts;
pub use snapshot::PageEvaluator;
pub use types::{
    FetchedBody, GatherError, GatherResult, NetworkScriptRecord, RawNetworkRecord, ResourceKind,
    ScriptArtifact, ScriptDescriptor, ScriptLocation,
};
