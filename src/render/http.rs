use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::{PageContent, PageRenderer};
use crate::error::RenderError;

/// Fetches pages with a plain GET. No scripts run, so it only suits listings
/// that are rendered server-side.
pub struct HttpRenderer {
    http: Client,
    timeout: Duration,
}

impl HttpRenderer {
    pub fn new(user_agent: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;
        Ok(HttpRenderer { http, timeout })
    }
}

#[async_trait]
impl PageRenderer for HttpRenderer {
    fn name(&self) -> &str {
        "http"
    }

    async fn render(&self, url: &str) -> Result<PageContent, RenderError> {
        debug!("Fetching {}", url);

        let resp = self.http.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                RenderError::Timeout(self.timeout)
            } else if e.is_connect() || e.is_request() {
                RenderError::Navigation {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            } else {
                RenderError::Transport(e)
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RenderError::Status(status.as_u16()));
        }

        let html = resp.text().await?;
        Ok(PageContent { html, text: None })
    }
}
