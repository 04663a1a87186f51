//! In-memory page and element doubles for pipeline tests.
//!
//! Selectors are not evaluated: each element maps selector strings to the
//! elements they should return.

use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use workly_browser::{BrowserError, ContextHandle, Element, PageSession, Result};

type Matches = Arc<Mutex<HashMap<String, Vec<FakeElement>>>>;

#[derive(Clone, Default)]
pub struct FakeElement {
    text: String,
    attrs: HashMap<String, String>,
    matches: Matches,
    failing: HashSet<String>,
    failing_attributes: HashSet<String>,
    reveal: Option<(Matches, String, Vec<FakeElement>)>,
    clicks: Arc<AtomicUsize>,
}

impl FakeElement {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Self::default()
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn child(self, selector: &str, element: FakeElement) -> Self {
        self.matches
            .lock()
            .unwrap()
            .entry(selector.to_string())
            .or_default()
            .push(element);
        self
    }

    pub fn failing(mut self, selector: &str) -> Self {
        self.failing.insert(selector.to_string());
        self
    }

    pub fn failing_attribute(mut self, name: &str) -> Self {
        self.failing_attributes.insert(name.to_string());
        self
    }

    /// Clicking this element makes `elements` match `selector` under `target`.
    pub fn reveals(mut self, target: &FakeElement, selector: &str, elements: Vec<FakeElement>) -> Self {
        self.reveal = Some((target.matches.clone(), selector.to_string(), elements));
        self
    }

    pub fn clicks(&self) -> usize {
        self.clicks.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Element for FakeElement {
    async fn find_all(&self, selector: &str) -> Result<Vec<Self>> {
        if self.failing.contains(selector) {
            return Err(BrowserError::SelectorError {
                selector: selector.to_string(),
                reason: "invalid selector".to_string(),
            });
        }
        Ok(self
            .matches
            .lock()
            .unwrap()
            .get(selector)
            .cloned()
            .unwrap_or_default())
    }

    async fn text(&self) -> Result<String> {
        Ok(self.text.clone())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>> {
        if self.failing_attributes.contains(name) {
            return Err(BrowserError::ElementError("node is detached from document".to_string()));
        }
        Ok(self.attrs.get(name).cloned())
    }

    async fn click(&self) -> Result<()> {
        self.clicks.fetch_add(1, Ordering::SeqCst);
        if let Some((target, selector, elements)) = &self.reveal {
            target
                .lock()
                .unwrap()
                .entry(selector.clone())
                .or_default()
                .extend(elements.iter().cloned());
        }
        Ok(())
    }
}

#[derive(Default)]
struct SessionState {
    primary_url: Option<String>,
    isolated: Option<(ContextHandle, Option<String>)>,
    next_context: u64,
    opened: usize,
    closed: usize,
    navigations: Vec<String>,
    scrolls: usize,
}

/// Session whose pages are keyed by URL; each page is a root [`FakeElement`].
#[derive(Default)]
pub struct FakeSession {
    pages: HashMap<String, FakeElement>,
    html: HashMap<String, String>,
    failing_urls: HashSet<String>,
    heights: Vec<i64>,
    state: Mutex<SessionState>,
}

impl FakeSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, root: FakeElement) -> Self {
        self.pages.insert(url.to_string(), root);
        self
    }

    pub fn html(mut self, url: &str, html: &str) -> Self {
        self.html.insert(url.to_string(), html.to_string());
        self
    }

    pub fn failing_url(mut self, url: &str) -> Self {
        self.failing_urls.insert(url.to_string());
        self
    }

    /// Page heights reported after 0, 1, 2... scrolls; the last one repeats.
    pub fn heights(mut self, heights: &[i64]) -> Self {
        self.heights = heights.to_vec();
        self
    }

    pub fn opened_contexts(&self) -> usize {
        self.state.lock().unwrap().opened
    }

    pub fn closed_contexts(&self) -> usize {
        self.state.lock().unwrap().closed
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().unwrap().navigations.clone()
    }

    pub fn scrolls(&self) -> usize {
        self.state.lock().unwrap().scrolls
    }

    pub fn primary_active(&self) -> bool {
        self.state.lock().unwrap().isolated.is_none()
    }

    fn active_url(&self) -> Option<String> {
        let state = self.state.lock().unwrap();
        match &state.isolated {
            Some((_, url)) => url.clone(),
            None => state.primary_url.clone(),
        }
    }
}

#[async_trait::async_trait]
impl PageSession for FakeSession {
    type Element = FakeElement;

    async fn navigate(&self, url: &str) -> Result<()> {
        let mut guard = self.state.lock().unwrap();
        let state = &mut *guard;
        state.navigations.push(url.to_string());
        if self.failing_urls.contains(url) {
            return Err(BrowserError::NavigationError(format!("{url}: net::ERR_FAILED")));
        }
        match &mut state.isolated {
            Some((_, active)) => *active = Some(url.to_string()),
            None => state.primary_url = Some(url.to_string()),
        }
        Ok(())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<FakeElement>> {
        let Some(root) = self.active_url().and_then(|url| self.pages.get(&url).cloned()) else {
            return Ok(Vec::new());
        };
        if selector == "html" {
            return Ok(vec![root]);
        }
        root.find_all(selector).await
    }

    async fn open_isolated_context(&self) -> Result<ContextHandle> {
        let mut state = self.state.lock().unwrap();
        state.next_context += 1;
        state.opened += 1;
        let handle = ContextHandle(state.next_context);
        state.isolated = Some((handle, None));
        Ok(handle)
    }

    async fn close_context(&self, handle: ContextHandle) -> Result<()> {
        let mut guard = self.state.lock().unwrap();
        let state = &mut *guard;
        match state.isolated.as_ref().map(|(active, _)| *active) {
            Some(active) if active == handle => {
                state.isolated = None;
                state.closed += 1;
                Ok(())
            }
            _ => Err(BrowserError::ContextNotFound(handle.0)),
        }
    }

    async fn evaluate_script(&self, script: &str) -> Result<Value> {
        let mut state = self.state.lock().unwrap();
        if script.contains("scrollTo") {
            state.scrolls += 1;
            return Ok(Value::Null);
        }
        if script.contains("scrollHeight") {
            let index = state.scrolls.min(self.heights.len().saturating_sub(1));
            return Ok(self.heights.get(index).map_or(Value::Null, |h| json!(h)));
        }
        Ok(Value::Null)
    }

    async fn page_html(&self) -> Result<String> {
        Ok(self
            .active_url()
            .and_then(|url| self.html.get(&url).cloned())
            .unwrap_or_default())
    }
}
