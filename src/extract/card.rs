//! Structured strategy for the site's match-card markup.
//!
//! Card layout (simplified):
//! ```text
//! div.bg-match-card
//!   .text-primary.font-bold   league name / "23:45" / "01/10"
//!   img[alt=<home>]  img[alt=live]  img[alt=<away>]
//!   .text-status-red          "LIVE"
//!   <parent of img[alt=xay-con-avatar]>   commentator name
//! ```

use scraper::{ElementRef, Selector};
use url::Url;

use super::patterns::Patterns;
use super::{compile_selector, element_text, PartialMatch};
use crate::error::ExtractError;

/// Alt text of the commentator avatar image.
pub const AVATAR_ALT: &str = "xay-con-avatar";

const LIVE_MARKERS: &[&str] = &["LIVE", "Đang diễn ra"];

pub struct CardSelectors {
    highlight: Selector,
    images: Selector,
    status: Selector,
    anchors: Selector,
}

impl CardSelectors {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(CardSelectors {
            highlight: compile_selector(".text-primary.font-bold")?,
            images: compile_selector("img[alt]")?,
            status: compile_selector(r#".text-status-red, [class*="status"]"#)?,
            anchors: compile_selector("a[href]")?,
        })
    }
}

pub fn extract(
    card: ElementRef<'_>,
    selectors: &CardSelectors,
    patterns: &Patterns,
    link_base: &str,
) -> PartialMatch {
    let mut m = PartialMatch {
        raw_text: element_text(card),
        ..Default::default()
    };

    let highlights: Vec<String> = card.select(&selectors.highlight).map(element_text).collect();

    for text in &highlights {
        if m.time_only.is_none() {
            m.time_only = patterns.clock.find(text).map(|c| c.as_str().to_string());
        }
        if m.date.is_none() {
            m.date = patterns.day_month.find(text).map(|d| d.as_str().to_string());
        }
    }
    m.time = match (&m.date, &m.time_only) {
        (Some(d), Some(t)) => Some(format!("{} {}", d, t)),
        (None, Some(t)) => Some(t.clone()),
        (Some(d), None) => Some(d.clone()),
        (None, None) => None,
    };

    m.league = highlights
        .iter()
        .map(|t| t.trim())
        .filter(|t| {
            t.chars().count() > 10 && !patterns.clock.is_match(t) && !patterns.day_month.is_match(t)
        })
        .fold(None::<&str>, |best, t| match best {
            Some(b) if b.chars().count() >= t.chars().count() => Some(b),
            _ => Some(t),
        })
        .map(str::to_string);

    let teams: Vec<(String, Option<String>)> = card
        .select(&selectors.images)
        .filter_map(|img| {
            let alt = img.value().attr("alt")?.trim();
            if alt.is_empty() || alt == "live" || alt == AVATAR_ALT || alt.contains("ic_") {
                return None;
            }
            let logo = img
                .value()
                .attr("src")
                .filter(|s| !s.trim().is_empty())
                .or_else(|| img.value().attr("data-src"))
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());
            Some((alt.to_string(), logo))
        })
        .collect();

    if let [(home, home_logo), (away, away_logo), ..] = teams.as_slice() {
        m.home_team = Some(home.clone());
        m.away_team = Some(away.clone());
        m.home_team_logo = home_logo.clone();
        m.away_team_logo = away_logo.clone();
    }

    m.blv = commentator(card, selectors, patterns, &m);

    let flagged_live = card.select(&selectors.status).any(|el| {
        let text = element_text(el);
        LIVE_MARKERS.iter().any(|marker| text.contains(marker))
    });
    if flagged_live || m.raw_text.to_lowercase().contains("live") {
        m.status = Some("LIVE".to_string());
    }

    m.link = card_link(card, selectors, link_base);

    m
}

/// Text next to the avatar marker, skipping anything that reads like a team,
/// the league, a clock or a date.
fn commentator(
    card: ElementRef<'_>,
    selectors: &CardSelectors,
    patterns: &Patterns,
    m: &PartialMatch,
) -> Option<String> {
    let avatar = card
        .select(&selectors.images)
        .find(|img| img.value().attr("alt") == Some(AVATAR_ALT))?;
    let holder = avatar.parent().and_then(ElementRef::wrap)?;

    let known = [&m.home_team, &m.away_team, &m.league];
    element_text(holder)
        .lines()
        .map(str::trim)
        .find(|line| {
            !line.is_empty()
                && !known.iter().any(|k| k.as_deref() == Some(*line))
                && !patterns.clock.is_match(line)
                && !patterns.day_month.is_match(line)
                && !line.to_lowercase().contains("live")
        })
        .map(str::to_string)
}

/// Href inside or around the card that points at a match page under `link_base`.
fn card_link(card: ElementRef<'_>, selectors: &CardSelectors, link_base: &str) -> Option<String> {
    let base = Url::parse(link_base).ok()?;

    let inner = card
        .select(&selectors.anchors)
        .filter_map(|a| a.value().attr("href"));
    let outer = card
        .ancestors()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "a")
        .filter_map(|a| a.value().attr("href"));

    inner
        .chain(outer)
        .filter_map(|href| base.join(href.trim()).ok())
        .map(|u| u.to_string())
        .find(|u| u.starts_with(base.as_str()) && u.len() > base.as_str().len())
}
