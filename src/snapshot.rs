//! DOM snapshot adapter.
//!
//! The snapshot itself is produced externally by evaluating a function inside
//! the page; this module defines that function's source, the trait the
//! gatherer consumes it through, and the conversion from the raw evaluation
//! result into typed [`ScriptDescriptor`]s. No transformation happens here —
//! descriptors are accepted as observed, one per `<script>` node.

use crate::types::ScriptDescriptor;
use anyhow::{Context, Result};
use async_trait::async_trait;

/// Page function collecting every `<script>` element in document order.
///
/// Returns one object per element with the exact keys `ScriptDescriptor`
/// deserializes from. The node path is an index/node-name pair chain from the
/// document root, stable for a given rendered DOM.
pub const COLLECT_SCRIPTS_JS: &str = r#"(() => {
  const nodePath = (node) => {
    const parts = [];
    let cur = node;
    while (cur && cur.parentNode) {
      const idx = Array.prototype.indexOf.call(cur.parentNode.childNodes, cur);
      parts.unshift(`${idx},${cur.nodeName}`);
      cur = cur.parentNode;
    }
    return parts.join(',');
  };

  return Array.from(document.querySelectorAll('script')).map(script => ({
    mimeType: script.type || null,
    src: script.src || null,
    domId: script.id || null,
    isAsync: script.async,
    isDeferred: script.defer,
    location: script.closest('head') ? 'head' : 'body',
    domPath: nodePath(script),
    inlineContent: script.src ? null : script.text,
    transferId: null,
  }));
})()"#;

/// Convert a raw page-evaluation result into typed descriptors.
pub fn parse_snapshot(value: serde_json::Value) -> Result<Vec<ScriptDescriptor>> {
    serde_json::from_value(value).context("script snapshot has unexpected shape")
}

/// Page-evaluation collaborator: returns the ordered `<script>` descriptor
/// list as observed in the live DOM at evaluation time.
#[async_trait]
pub trait PageEvaluator: Send + Sync {
    async fn script_snapshot(&self) -> Result<Vec<ScriptDescriptor>>;
}
