use std::time::Duration;
use thiserror::Error;

/// Failure modes of the page-rendering backends.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("render timed out after {0:?}")]
    Timeout(Duration),

    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("page read failed: {0}")]
    Content(String),

    #[error("upstream returned HTTP {0}")]
    Status(u16),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("render task aborted: {0}")]
    Aborted(String),
}

/// Failures building the extractor tables.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid selector '{selector}': {reason}")]
    Selector { selector: String, reason: String },

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Why a match link could not be built.
#[derive(Debug, Error)]
pub enum SlugError {
    #[error("team name '{0}' has no usable characters")]
    EmptyTeam(String),

    #[error("cannot join slug onto base url: {0}")]
    Url(#[from] url::ParseError),
}

/// Failure of one refresh cycle, as recorded in the snapshot.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("extraction failed: {0}")]
    Extraction(String),
}
