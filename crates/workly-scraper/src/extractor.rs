//! Field extraction through ordered selector candidates.
//!
//! A selector that errors is treated exactly like one that matches nothing:
//! the miss is logged at debug and the next candidate is tried.

use workly_browser::Element;

async fn matches<E: Element>(scope: &E, selector: &str) -> Vec<E> {
    match scope.find_all(selector).await {
        Ok(found) => found,
        Err(e) => {
            tracing::debug!("Selector '{}' failed: {}", selector, e);
            Vec::new()
        }
    }
}

async fn trimmed_text<E: Element>(element: &E) -> String {
    match element.text().await {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            tracing::debug!("Reading element text failed: {}", e);
            String::new()
        }
    }
}

/// Trimmed text of the first match of the first selector whose first match is non-empty.
///
/// Returns an empty string when every candidate misses.
pub async fn extract_text<E: Element>(scope: &E, selectors: &[String]) -> String {
    for selector in selectors {
        let found = matches(scope, selector).await;
        if let Some(first) = found.first() {
            let text = trimmed_text(first).await;
            if !text.is_empty() {
                return text;
            }
        }
    }
    String::new()
}

/// All non-empty trimmed texts of the first selector that yields any, in document order.
pub async fn extract_all_texts<E: Element>(scope: &E, selectors: &[String]) -> Vec<String> {
    for selector in selectors {
        let texts = texts_of(&matches(scope, selector).await).await;
        if !texts.is_empty() {
            return texts;
        }
    }
    Vec::new()
}

/// Non-empty trimmed texts of the given elements.
pub async fn texts_of<E: Element>(elements: &[E]) -> Vec<String> {
    let mut texts = Vec::with_capacity(elements.len());
    for element in elements {
        let text = trimmed_text(element).await;
        if !text.is_empty() {
            texts.push(text);
        }
    }
    texts
}

/// Title and raw `href` of a card's title anchor.
///
/// The first selector with any match picks the anchor. A nested `span` carries
/// the full title in its `title` attribute on the current layout; older layouts
/// put the text directly in the anchor.
pub async fn extract_title_and_link<E: Element>(
    card: &E,
    selectors: &[String],
) -> workly_browser::Result<(String, String)> {
    for selector in selectors {
        let Some(anchor) = matches(card, selector).await.into_iter().next() else {
            continue;
        };

        let title = match matches(&anchor, "span").await.first() {
            Some(span) => match span.attribute("title").await? {
                Some(title) if !title.trim().is_empty() => title.trim().to_string(),
                _ => trimmed_text(span).await,
            },
            None => trimmed_text(&anchor).await,
        };
        let link = anchor
            .attribute("href")
            .await?
            .map(|href| href.trim().to_string())
            .unwrap_or_default();

        return Ok((title, link));
    }
    Ok((String::new(), String::new()))
}
