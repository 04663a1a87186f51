use crate::error::{BrowserError, Result};
use std::fmt;

/// Identifier of an isolated browsing context (a separate tab).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextHandle(pub u64);

impl fmt::Display for ContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "context-{}", self.0)
    }
}

/// A node in the rendered page.
#[async_trait::async_trait]
pub trait Element: Send + Sync + Sized {
    /// All descendants matching a CSS selector, in document order
    async fn find_all(&self, selector: &str) -> Result<Vec<Self>>;

    /// Rendered text of the element
    async fn text(&self) -> Result<String>;

    /// Attribute value, `None` when absent
    async fn attribute(&self, name: &str) -> Result<Option<String>>;

    /// Activate the element
    async fn click(&self) -> Result<()>;
}

/// One browsing session with a primary context and optional isolated contexts.
///
/// Queries, navigation and scripts always target the active context. Opening an
/// isolated context makes it active; closing it returns to the primary one.
#[async_trait::async_trait]
pub trait PageSession: Send + Sync {
    /// Element type produced by this session
    type Element: Element;

    /// Navigate the active context
    async fn navigate(&self, url: &str) -> Result<()>;

    /// All elements in the active context matching a CSS selector
    async fn find_all(&self, selector: &str) -> Result<Vec<Self::Element>>;

    /// Listing cards currently rendered in the active context
    async fn current_cards(&self, selector: &str) -> Result<Vec<Self::Element>> {
        self.find_all(selector).await
    }

    /// Root element of the active context, `None` before anything is loaded
    async fn document(&self) -> Result<Option<Self::Element>> {
        Ok(self.find_all("html").await?.into_iter().next())
    }

    /// Open a fresh isolated context and make it active
    async fn open_isolated_context(&self) -> Result<ContextHandle>;

    /// Close an isolated context and return to the primary one
    async fn close_context(&self, handle: ContextHandle) -> Result<()>;

    /// Evaluate a JavaScript expression in the active context
    async fn evaluate_script(&self, script: &str) -> Result<serde_json::Value>;

    /// Serialized HTML of the active context
    async fn page_html(&self) -> Result<String>;
}

/// Helper to extract domain from URL
pub fn extract_domain(url: &str) -> Result<String> {
    let url = url::Url::parse(url)
        .map_err(|e| BrowserError::NavigationError(format!("Invalid URL: {}", e)))?;

    url.host_str()
        .ok_or_else(|| BrowserError::NavigationError("No host in URL".to_string()))
        .map(|s| s.to_string())
}
