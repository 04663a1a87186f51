use thiserror::Error;
use workly_browser::BrowserError;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Page session could not be established: {0}")]
    Session(String),

    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    #[error("Card {index} failed: {reason}")]
    Card { index: usize, reason: String },

    #[error("Invalid selector file: {0}")]
    Selectors(String),

    #[error("Fallback export failed: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for ScrapeError {
    fn from(err: csv::Error) -> Self {
        Self::Export(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
