pub mod chrome;
pub mod http;

pub use chrome::ChromeRenderer;
pub use http::HttpRenderer;

use async_trait::async_trait;

use crate::error::RenderError;

/// A fully rendered page.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    pub html: String,
    /// Visible text as laid out by the browser, when the backend can supply it
    pub text: Option<String>,
}

/// Trait that every page-rendering backend must implement.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Load `url`, let it settle, and return its content.
    async fn render(&self, url: &str) -> Result<PageContent, RenderError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}
