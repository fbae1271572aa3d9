use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};
use std::ffi::OsStr;
use std::time::Duration;
use tokio::task;
use tracing::{debug, info};

use super::{PageContent, PageRenderer};
use crate::error::RenderError;

/// Elements that show the match listing has been rendered.
const READY_SELECTOR: &str = r#"div[class*="bg-match-card"], [class*="match"]"#;

/// Extra wait once the listing elements show up.
pub const AFTER_READY_DELAY: Duration = Duration::from_secs(2);

const CHROME_ARGS: &[&str] = &[
    "--disable-setuid-sandbox",
    "--disable-dev-shm-usage",
    "--disable-accelerated-2d-canvas",
    "--no-first-run",
    "--no-zygote",
    "--disable-gpu",
];

/// Renders pages in a fresh headless Chrome per call.
pub struct ChromeRenderer {
    user_agent: String,
    sandbox: bool,
    timeout: Duration,
    settle_delay: Duration,
    selector_wait: Duration,
}

impl ChromeRenderer {
    pub fn new(
        user_agent: &str,
        sandbox: bool,
        timeout: Duration,
        settle_delay: Duration,
        selector_wait: Duration,
    ) -> Self {
        ChromeRenderer {
            user_agent: user_agent.to_string(),
            sandbox,
            timeout,
            settle_delay,
            selector_wait,
        }
    }
}

#[async_trait]
impl PageRenderer for ChromeRenderer {
    fn name(&self) -> &str {
        "chrome"
    }

    async fn render(&self, url: &str) -> Result<PageContent, RenderError> {
        let url = url.to_string();
        let user_agent = self.user_agent.clone();
        let sandbox = self.sandbox;
        let timeout = self.timeout;
        let settle_delay = self.settle_delay;
        let selector_wait = self.selector_wait;

        let job = task::spawn_blocking(move || -> Result<PageContent, RenderError> {
            let options = LaunchOptions::default_builder()
                .headless(true)
                .sandbox(sandbox)
                .idle_browser_timeout(timeout + Duration::from_secs(5))
                .args(CHROME_ARGS.iter().map(OsStr::new).collect())
                .build()
                .map_err(|e| RenderError::Launch(e.to_string()))?;

            info!("Starting browser...");
            let browser = Browser::new(options).map_err(|e| RenderError::Launch(e.to_string()))?;
            let tab = browser
                .new_tab()
                .map_err(|e| RenderError::Launch(e.to_string()))?;
            tab.set_default_timeout(timeout);
            tab.set_user_agent(&user_agent, None, None)
                .map_err(|e| RenderError::Launch(e.to_string()))?;

            let navigation = |e: anyhow::Error| RenderError::Navigation {
                url: url.clone(),
                reason: e.to_string(),
            };
            info!("Navigating to {}", url);
            tab.navigate_to(&url).map_err(navigation)?;
            tab.wait_until_navigated().map_err(navigation)?;

            debug!("Waiting {:?} for the page to settle", settle_delay);
            std::thread::sleep(settle_delay);

            match tab.wait_for_element_with_custom_timeout(READY_SELECTOR, selector_wait) {
                Ok(_) => {
                    debug!("Match elements detected");
                    std::thread::sleep(AFTER_READY_DELAY);
                }
                Err(e) => debug!("No match elements ({}), scraping the page as-is", e),
            }

            let html = tab
                .get_content()
                .map_err(|e| RenderError::Content(e.to_string()))?;
            let text = tab
                .evaluate("document.body ? document.body.innerText : ''", false)
                .ok()
                .and_then(|obj| obj.value)
                .and_then(|v| v.as_str().map(str::to_string));

            Ok(PageContent { html, text })
        });

        match tokio::time::timeout(self.timeout, job).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(RenderError::Aborted(join_err.to_string())),
            Err(_) => Err(RenderError::Timeout(self.timeout)),
        }
    }
}
