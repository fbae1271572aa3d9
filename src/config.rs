use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::time::Duration;

use crate::render::chrome::AFTER_READY_DELAY;

/// Which page-rendering backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RendererKind {
    /// Headless Chrome, executes the page's JavaScript
    Chrome,
    /// Plain HTTP GET, for pages that render server-side
    Http,
}

/// Football match listing scraper and API
#[derive(Parser, Debug, Clone)]
#[command(name = "matchfeed", version, about)]
pub struct Config {
    /// API listen address
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:3000")]
    pub listen_addr: String,

    /// Port override (replaces the port of LISTEN_ADDR when set)
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Page holding the match listing
    #[arg(long, env = "TARGET_URL", default_value = "https://xaycon.live")]
    pub target_url: String,

    /// Base URL that match slugs are appended to
    #[arg(
        long,
        env = "LINK_BASE_URL",
        default_value = "https://www.xaycon.live/truc-tiep/"
    )]
    pub link_base_url: String,

    /// Seconds between scheduled refresh cycles
    #[arg(long, env = "REFRESH_INTERVAL_SECS", default_value = "60")]
    pub refresh_interval_secs: u64,

    /// Upper bound for one page render, in seconds. Covers navigation plus
    /// the settle delay and selector wait.
    #[arg(long, env = "RENDER_TIMEOUT_SECS", default_value = "50")]
    pub render_timeout_secs: u64,

    /// Seconds to let client-side scripts settle after navigation
    #[arg(long, env = "SETTLE_DELAY_SECS", default_value = "5")]
    pub settle_delay_secs: u64,

    /// Seconds to wait for match-card elements before scraping anyway
    #[arg(long, env = "SELECTOR_WAIT_SECS", default_value = "10")]
    pub selector_wait_secs: u64,

    /// Rendering backend
    #[arg(long, env = "RENDERER", value_enum, default_value = "chrome")]
    pub renderer: RendererKind,

    /// Run Chrome with its sandbox enabled (usually off inside containers)
    #[arg(long, env = "CHROME_SANDBOX", default_value = "false")]
    pub chrome_sandbox: bool,

    /// User-Agent sent by either renderer
    #[arg(
        long,
        env = "USER_AGENT",
        default_value = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
    )]
    pub user_agent: String,

    /// Fold kickoff time into the dedup key (keeps doubleheaders apart)
    #[arg(long, env = "DEDUP_WITH_TIME", default_value = "false")]
    pub dedup_with_time: bool,

    /// Publish only live matches into the snapshot
    #[arg(long, env = "LIVE_ONLY", default_value = "false")]
    pub live_only: bool,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.refresh_interval_secs == 0 {
            anyhow::bail!("refresh_interval_secs must be positive");
        }
        if self.render_timeout_secs == 0 {
            anyhow::bail!("render_timeout_secs must be positive");
        }
        if self.renderer == RendererKind::Chrome {
            let waits = self.chrome_fixed_waits();
            if waits >= self.render_timeout() {
                anyhow::bail!(
                    "render_timeout_secs ({}) must exceed settle delay + selector wait + {}s ({:?})",
                    self.render_timeout_secs,
                    AFTER_READY_DELAY.as_secs(),
                    waits
                );
            }
        }
        url::Url::parse(&self.target_url)
            .map_err(|e| anyhow::anyhow!("invalid TARGET_URL '{}': {}", self.target_url, e))?;
        url::Url::parse(&self.link_base_url)
            .map_err(|e| anyhow::anyhow!("invalid LINK_BASE_URL '{}': {}", self.link_base_url, e))?;
        self.socket_addr()?;
        Ok(())
    }

    /// Listen address with the `PORT` override applied.
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let mut addr: SocketAddr = self
            .listen_addr
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid LISTEN_ADDR '{}': {}", self.listen_addr, e))?;
        if let Some(port) = self.port {
            addr.set_port(port);
        }
        Ok(addr)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.render_timeout_secs)
    }

    /// Time a Chrome render spends waiting regardless of how fast the page loads.
    fn chrome_fixed_waits(&self) -> Duration {
        Duration::from_secs(self.settle_delay_secs + self.selector_wait_secs) + AFTER_READY_DELAY
    }
}
