//! Core data types for script gathering and correlation.

use serde::{Deserialize, Serialize};

/// Where a script artifact was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptLocation {
    /// `<script>` element inside `<head>`.
    Head,
    /// `<script>` element inside `<body>`.
    Body,
    /// No DOM element — the script was only seen as a network transfer.
    Network,
}

/// One `<script>` element as observed in the rendered DOM.
///
/// Produced by the page-evaluation collaborator; field names match the keys
/// returned by the injected page function. `transfer_id` starts `None` and is
/// only ever filled by the correlator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptDescriptor {
    /// Value of the `type` attribute, if present.
    pub mime_type: Option<String>,
    /// Resolved `src` URL; `None` for inline scripts.
    pub src: Option<String>,
    /// Value of the `id` attribute, if present.
    pub dom_id: Option<String>,
    pub is_async: bool,
    pub is_deferred: bool,
    pub location: ScriptLocation,
    /// Stable node path within the document, as generated by the collaborator.
    pub dom_path: String,
    /// Script text for inline scripts; `None` when `src` is set.
    pub inline_content: Option<String>,
    /// Transfer identity, filled during correlation.
    #[serde(default)]
    pub transfer_id: Option<String>,
}

/// Resource type of a captured network transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Document,
    Script,
    Stylesheet,
    Image,
    Xhr,
    Fetch,
    Other,
}

/// One observed network transfer, before classification.
///
/// `session_id` is set on records routed from a nested or out-of-process
/// frame session; such records never belong to the primary browsing context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawNetworkRecord {
    pub transfer_id: String,
    pub url: String,
    pub resource_type: ResourceKind,
    pub session_id: Option<String>,
}

/// A script-type transfer belonging to the primary browsing context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkScriptRecord {
    pub transfer_id: String,
    pub url: String,
    pub frame_scoped: bool,
}

/// A retrieved transfer body, aligned to the record it was fetched for.
///
/// An empty `body` means retrieval failed; that is an expected terminal state,
/// not an error value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedBody {
    pub transfer_id: String,
    pub body: String,
}

impl FetchedBody {
    /// Whether this slot holds retrievable content.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// One unit of the gatherer's output: a script observed in the DOM, on the
/// network, or both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptArtifact {
    pub mime_type: Option<String>,
    pub src: Option<String>,
    pub dom_id: Option<String>,
    pub is_async: bool,
    pub is_deferred: bool,
    pub location: ScriptLocation,
    /// Empty string for network-only synthetic artifacts.
    pub dom_path: String,
    pub transfer_id: Option<String>,
    /// Inline text or fetched body; `None` when the transfer was never
    /// captured or its retrieval failed.
    pub content: Option<String>,
}

impl ScriptArtifact {
    /// Build a DOM-sourced artifact from a descriptor. Inline text becomes
    /// the artifact content; `src` scripts start with no content.
    pub fn from_descriptor(desc: ScriptDescriptor) -> Self {
        Self {
            mime_type: desc.mime_type,
            src: desc.src,
            dom_id: desc.dom_id,
            is_async: desc.is_async,
            is_deferred: desc.is_deferred,
            location: desc.location,
            dom_path: desc.dom_path,
            transfer_id: desc.transfer_id,
            content: desc.inline_content,
        }
    }

    /// Build a network-only synthetic artifact for a transfer with no DOM
    /// counterpart.
    pub fn network_only(url: String, transfer_id: String, content: String) -> Self {
        Self {
            mime_type: None,
            src: Some(url),
            dom_id: None,
            is_async: false,
            is_deferred: false,
            location: ScriptLocation::Network,
            dom_path: String::new(),
            transfer_id: Some(transfer_id),
            content: Some(content),
        }
    }
}

/// Errors that can occur while gathering script artifacts.
///
/// Per-transfer retrieval failures are absorbed by the fetch scheduler and
/// never surface here; only structural and collaborator failures do.
#[derive(thiserror::Error, Debug)]
pub enum GatherError {
    #[error("page evaluation failed: {0}")]
    Evaluation(String),

    #[error("no main document transfer; cannot attribute inline script at '{0}'")]
    MissingMainDocument(String),
}

/// Convenience result type.
pub type GatherResult<T> = Result<T, GatherError>;
