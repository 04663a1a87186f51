use crate::actions::{extract_domain, ContextHandle, Element, PageSession};
use crate::error::{BrowserError, Result};
use crate::fingerprint::FingerprintConfig;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::element::Element as CdpElement;
use chromiumoxide::page::Page;
use futures::stream::StreamExt;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use workly_core::BrowserConfig;

/// Browser automation engine
///
/// Owns one Chromium process, a primary tab for the listing and any number of
/// isolated tabs opened for detail pages. Only one tab is active at a time.
pub struct BrowserEngine {
    browser: Mutex<Browser>,
    handler: JoinHandle<()>,
    primary: Page,
    contexts: Mutex<HashMap<ContextHandle, Page>>,
    active: Mutex<Option<ContextHandle>>,
    next_context: AtomicU64,
    navigation_timeout: Duration,
    fingerprint: FingerprintConfig,
}

impl BrowserEngine {
    /// Launch Chromium with the given settings and a randomized fingerprint
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        Self::with_fingerprint(config, FingerprintConfig::randomized()).await
    }

    /// Launch Chromium with a specific fingerprint
    pub async fn with_fingerprint(
        config: &BrowserConfig,
        fingerprint: FingerprintConfig,
    ) -> Result<Self> {
        let mut builder = ChromeConfig::builder()
            .no_sandbox()
            .window_size(config.window_width, config.window_height)
            .request_timeout(Duration::from_secs(config.navigation_timeout_secs))
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--log-level=3")
            .arg(format!("--user-agent={}", fingerprint.user_agent))
            .arg(format!("--lang={}", fingerprint.accept_language));
        if !config.headless {
            builder = builder.with_head();
        }
        let chrome_config = builder.build().map_err(BrowserError::ChromiumError)?;

        let (browser, mut handler) = Browser::launch(chrome_config)
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        // Spawn browser handler
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("Browser handler event error: {}", e);
                }
            }
        });

        let primary = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        tracing::info!(
            "Browser launched (headless: {}, {}x{})",
            config.headless,
            config.window_width,
            config.window_height
        );

        Ok(Self {
            browser: Mutex::new(browser),
            handler,
            primary,
            contexts: Mutex::new(HashMap::new()),
            active: Mutex::new(None),
            next_context: AtomicU64::new(1),
            navigation_timeout: Duration::from_secs(config.navigation_timeout_secs),
            fingerprint,
        })
    }

    /// User agent presented by this session
    pub fn user_agent(&self) -> &str {
        &self.fingerprint.user_agent
    }

    /// Close every tab and terminate the browser process
    pub async fn shutdown(self) {
        let pages: Vec<Page> = self.contexts.lock().await.drain().map(|(_, p)| p).collect();
        for page in pages {
            let _ = page.close().await;
        }
        let mut browser = self.browser.lock().await;
        if let Err(e) = browser.close().await {
            tracing::debug!("Browser close failed: {}", e);
        }
        let _ = browser.wait().await;
        self.handler.abort();
        tracing::info!("Browser shut down");
    }

    async fn active_page(&self) -> Result<Page> {
        let active = *self.active.lock().await;
        match active {
            None => Ok(self.primary.clone()),
            Some(handle) => self
                .contexts
                .lock()
                .await
                .get(&handle)
                .cloned()
                .ok_or(BrowserError::ContextNotFound(handle.0)),
        }
    }
}

#[async_trait::async_trait]
impl PageSession for BrowserEngine {
    type Element = BrowserElement;

    async fn navigate(&self, url: &str) -> Result<()> {
        let domain = extract_domain(url)?;
        let page = self.active_page().await?;
        tracing::debug!("Navigating to {} ({})", url, domain);
        match tokio::time::timeout(self.navigation_timeout, page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(BrowserError::NavigationError(format!("{url}: {e}"))),
            Err(_) => Err(BrowserError::Timeout(format!(
                "navigation to {url} exceeded {:?}",
                self.navigation_timeout
            ))),
        }
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<BrowserElement>> {
        let page = self.active_page().await?;
        let elements = page
            .find_elements(selector)
            .await
            .map_err(|e| BrowserError::SelectorError {
                selector: selector.to_string(),
                reason: e.to_string(),
            })?;
        Ok(elements.into_iter().map(BrowserElement::new).collect())
    }

    async fn open_isolated_context(&self) -> Result<ContextHandle> {
        let page = self
            .browser
            .lock()
            .await
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        let handle = ContextHandle(self.next_context.fetch_add(1, Ordering::SeqCst));
        self.contexts.lock().await.insert(handle, page);
        *self.active.lock().await = Some(handle);
        tracing::debug!("Opened isolated {}", handle);
        Ok(handle)
    }

    async fn close_context(&self, handle: ContextHandle) -> Result<()> {
        let page = self
            .contexts
            .lock()
            .await
            .remove(&handle)
            .ok_or(BrowserError::ContextNotFound(handle.0))?;

        {
            let mut active = self.active.lock().await;
            if *active == Some(handle) {
                *active = None;
            }
        }

        page.close()
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
        tracing::debug!("Closed isolated {}", handle);
        Ok(())
    }

    async fn evaluate_script(&self, script: &str) -> Result<serde_json::Value> {
        let page = self.active_page().await?;
        let result = page
            .evaluate(script)
            .await
            .map_err(|e| BrowserError::ScriptError(e.to_string()))?;
        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn page_html(&self) -> Result<String> {
        let page = self.active_page().await?;
        page.content()
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))
    }
}

/// Element handle inside one of the engine's tabs
pub struct BrowserElement {
    inner: CdpElement,
}

impl BrowserElement {
    fn new(inner: CdpElement) -> Self {
        Self { inner }
    }
}

#[async_trait::async_trait]
impl Element for BrowserElement {
    async fn find_all(&self, selector: &str) -> Result<Vec<Self>> {
        let elements =
            self.inner
                .find_elements(selector)
                .await
                .map_err(|e| BrowserError::SelectorError {
                    selector: selector.to_string(),
                    reason: e.to_string(),
                })?;
        Ok(elements.into_iter().map(Self::new).collect())
    }

    async fn text(&self) -> Result<String> {
        let text = self
            .inner
            .inner_text()
            .await
            .map_err(|e| BrowserError::ElementError(e.to_string()))?;
        Ok(text.unwrap_or_default())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>> {
        self.inner
            .attribute(name)
            .await
            .map_err(|e| BrowserError::ElementError(e.to_string()))
    }

    async fn click(&self) -> Result<()> {
        if let Err(e) = self.inner.click().await {
            // Overlays can intercept native clicks; dispatch from script instead
            tracing::debug!("Native click failed ({}), falling back to script click", e);
            self.inner
                .call_js_fn("function() { this.click(); }", false)
                .await
                .map_err(|e| BrowserError::ElementError(e.to_string()))?;
        }
        Ok(())
    }
}
