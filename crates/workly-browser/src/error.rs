use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrowserError>;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("chromium error: {0}")]
    ChromiumError(String),

    #[error("navigation failed: {0}")]
    NavigationError(String),

    #[error("selector query failed for '{selector}': {reason}")]
    SelectorError { selector: String, reason: String },

    #[error("element interaction failed: {0}")]
    ElementError(String),

    #[error("script evaluation failed: {0}")]
    ScriptError(String),

    #[error("unknown browsing context: {0}")]
    ContextNotFound(u64),

    #[error("timeout: {0}")]
    Timeout(String),
}
