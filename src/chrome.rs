//! Chromium-backed collaborators using chromiumoxide.
//!
//! One [`ChromeSession`] drives one page load: it records
//! `Network.responseReceived` events as raw network records, evaluates the
//! script-snapshot page function, and serves transfer bodies through
//! `Network.getResponseBody`. The gather core itself never talks to the
//! browser — it only sees the [`PageEvaluator`] and [`BodyFetcher`] traits.

use crate::fetch::BodyFetcher;
use crate::snapshot::{parse_snapshot, PageEvaluator, COLLECT_SCRIPTS_JS};
use crate::types::{RawNetworkRecord, ResourceKind, ScriptDescriptor};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use base64::Engine;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, EventResponseReceived, GetResponseBodyParams, RequestId, ResourceType,
};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. SCRIPTLENS_CHROMIUM_PATH env
    if let Ok(p) = std::env::var("SCRIPTLENS_CHROMIUM_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. ~/.scriptlens/chromium/
    if let Some(home) = dirs::home_dir() {
        let candidates = if cfg!(target_os = "macos") {
            vec![
                home.join(".scriptlens/chromium/chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".scriptlens/chromium/chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".scriptlens/chromium/chrome"),
            ]
        } else {
            vec![
                home.join(".scriptlens/chromium/chrome-linux64/chrome"),
                home.join(".scriptlens/chromium/chrome"),
            ]
        };
        for c in candidates {
            if c.exists() {
                return Some(c);
            }
        }
    }

    // 3. System PATH
    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 4. Common macOS location
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

fn map_resource_type(t: &ResourceType) -> ResourceKind {
    match t {
        ResourceType::Document => ResourceKind::Document,
        ResourceType::Script => ResourceKind::Script,
        ResourceType::Stylesheet => ResourceKind::Stylesheet,
        ResourceType::Image => ResourceKind::Image,
        ResourceType::Xhr => ResourceKind::Xhr,
        ResourceType::Fetch => ResourceKind::Fetch,
        _ => ResourceKind::Other,
    }
}

/// A headless Chromium session observing one page load.
pub struct ChromeSession {
    browser: Browser,
    page: Page,
    records: Arc<Mutex<Vec<RawNetworkRecord>>>,
}

impl ChromeSession {
    /// Launch headless Chromium and start capturing network responses.
    pub async fn launch() -> Result<Self> {
        let chrome_path =
            find_chromium().context("Chromium not found. Set SCRIPTLENS_CHROMIUM_PATH.")?;

        let config = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        // Spawn the handler task
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .context("failed to create page")?;

        page.execute(EnableParams::default())
            .await
            .context("failed to enable network domain")?;

        let records = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&records);
        let mut responses = page
            .event_listener::<EventResponseReceived>()
            .await
            .context("failed to subscribe to network responses")?;

        // Events arrive through the page's own session; traffic from nested
        // out-of-process frames flows through separate sessions and would be
        // tagged with their session id by a capture layer that merges them.
        tokio::spawn(async move {
            while let Some(event) = responses.next().await {
                let record = RawNetworkRecord {
                    transfer_id: event.request_id.inner().clone(),
                    url: event.response.url.clone(),
                    resource_type: map_resource_type(&event.r#type),
                    session_id: None,
                };
                if let Ok(mut guard) = sink.lock() {
                    guard.push(record);
                }
            }
        });

        Ok(Self {
            browser,
            page,
            records,
        })
    }

    /// Navigate to a URL with a timeout, returning the final URL.
    pub async fn navigate(&self, url: &str, timeout_ms: u64) -> Result<String> {
        let start = Instant::now();

        let result = tokio::time::timeout(
            std::time::Duration::from_millis(timeout_ms),
            self.page.goto(url),
        )
        .await;

        match result {
            Ok(Ok(_page)) => {
                let _ = self.page.wait_for_navigation().await;
                tracing::debug!(
                    url,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "navigation settled"
                );

                let final_url = self
                    .page
                    .url()
                    .await
                    .unwrap_or_default()
                    .map(|u| u.to_string())
                    .unwrap_or_else(|| url.to_string());
                Ok(final_url)
            }
            Ok(Err(e)) => bail!("navigation failed: {e}"),
            Err(_) => bail!("navigation timed out after {timeout_ms}ms"),
        }
    }

    /// Network records captured so far, in observation order.
    pub fn network_records(&self) -> Vec<RawNetworkRecord> {
        self.records
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Close the page and shut the browser down.
    pub async fn close(mut self) -> Result<()> {
        let _ = self.page.close().await;
        let _ = self.browser.close().await;
        Ok(())
    }
}

#[async_trait]
impl PageEvaluator for ChromeSession {
    async fn script_snapshot(&self) -> Result<Vec<ScriptDescriptor>> {
        let result = self
            .page
            .evaluate(COLLECT_SCRIPTS_JS)
            .await
            .context("script snapshot evaluation failed")?;

        let value: serde_json::Value = result
            .into_value()
            .map_err(|e| anyhow::anyhow!("failed to convert snapshot result: {e:?}"))?;

        parse_snapshot(value)
    }
}

#[async_trait]
impl BodyFetcher for ChromeSession {
    async fn fetch_body(&self, transfer_id: &str) -> Result<String> {
        let resp = self
            .page
            .execute(GetResponseBodyParams::new(RequestId::new(transfer_id)))
            .await
            .context("getResponseBody failed")?;

        let result = resp.result;
        if result.base64_encoded {
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(result.body.as_bytes())
                .context("response body is not valid base64")?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        } else {
            Ok(result.body)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires Chromium to be installed
    async fn test_snapshot_of_live_page() {
        let session = ChromeSession::launch().await.expect("failed to launch");

        session
            .navigate(
                "data:text/html,<html><head></head><body><script>console.log(1)</script></body></html>",
                10000,
            )
            .await
            .expect("navigation failed");

        let scripts = session.script_snapshot().await.expect("snapshot failed");
        assert_eq!(scripts.len(), 1);
        assert_eq!(scripts[0].src, None);
        assert_eq!(scripts[0].inline_content.as_deref(), Some("console.log(1)"));

        session.close().await.expect("close failed");
    }
}
