pub mod card;
pub mod filter;
pub mod generic;
pub mod patterns;
pub mod slug;

pub use filter::{dedup_matches, live_matches};

use chrono::{DateTime, Datelike, Utc};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::error::ExtractError;
use crate::models::{MatchRecord, MatchSource};
use crate::render::PageContent;
use card::CardSelectors;
use patterns::{looks_like_fixture, Patterns};

/// Fields one strategy managed to pull out of a container.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialMatch {
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub home_team_logo: Option<String>,
    pub away_team_logo: Option<String>,
    pub time_only: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub league: Option<String>,
    pub status: Option<String>,
    pub blv: Option<String>,
    pub link: Option<String>,
    pub raw_text: String,
}

impl PartialMatch {
    pub fn has_teams(&self) -> bool {
        filled(&self.home_team) && filled(&self.away_team)
    }

    /// Fill every field still empty in `self` from `other`.
    pub fn merge_missing(&mut self, other: PartialMatch) {
        fn take(slot: &mut Option<String>, from: Option<String>) {
            if !filled(slot) && filled(&from) {
                *slot = from;
            }
        }
        take(&mut self.home_team, other.home_team);
        take(&mut self.away_team, other.away_team);
        take(&mut self.home_team_logo, other.home_team_logo);
        take(&mut self.away_team_logo, other.away_team_logo);
        take(&mut self.time_only, other.time_only);
        take(&mut self.date, other.date);
        take(&mut self.time, other.time);
        take(&mut self.league, other.league);
        take(&mut self.status, other.status);
        take(&mut self.blv, other.blv);
        take(&mut self.link, other.link);
        if self.raw_text.is_empty() {
            self.raw_text = other.raw_text;
        }
    }
}

fn filled(slot: &Option<String>) -> bool {
    slot.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false)
}

/// How containers found by a selector are parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Card,
    Text,
}

/// Container selectors, scanned in order. Order decides which variant of a
/// fixture survives deduplication.
pub const CONTAINER_RULES: &[(&str, Strategy)] = &[
    ("div.bg-match-card", Strategy::Card),
    (r#"div[class*="bg-match-card"]"#, Strategy::Card),
    (r#"div[class*="border-bd-match"]"#, Strategy::Card),
    (r#"[class*="match"]"#, Strategy::Text),
    (r#"[class*="game"]"#, Strategy::Text),
    (r#"[class*="fixture"]"#, Strategy::Text),
    (r#"[class*="event"]"#, Strategy::Text),
    (".row", Strategy::Text),
    (".item", Strategy::Text),
    ("tr", Strategy::Text),
];

pub(crate) fn compile_selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector {
        selector: css.to_string(),
        reason: format!("{:?}", e),
    })
}

/// Visible text of an element, one text node per line.
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Elements whose contents never show up as page text.
const HIDDEN_ELEMENTS: &[&str] = &["head", "script", "style", "noscript", "template"];

/// Elements that start a new line in rendered text.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr",
    "li", "main", "nav", "ol", "p", "pre", "section", "table", "tbody", "tfoot", "thead", "tr",
    "ul",
];

fn push_visible(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            out.extend(text.chars().map(|c| if c.is_whitespace() { ' ' } else { c }));
        } else if let Some(child_el) = ElementRef::wrap(child) {
            let name = child_el.value().name();
            if HIDDEN_ELEMENTS.contains(&name) {
                continue;
            }
            let sep = if BLOCK_ELEMENTS.contains(&name) {
                "\n"
            } else if matches!(name, "td" | "th") {
                " "
            } else {
                ""
            };
            out.push_str(sep);
            push_visible(child_el, out);
            out.push_str(sep);
        }
    }
}

/// Text of an element laid out roughly like `innerText`: hidden elements
/// dropped, inline markup joined, one line per block.
pub(crate) fn visible_text(el: ElementRef<'_>) -> String {
    let mut raw = String::new();
    push_visible(el, &mut raw);
    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

struct ContainerRule {
    css: &'static str,
    selector: Selector,
    strategy: Strategy,
}

/// Turns a rendered page into match records.
pub struct Extractor {
    rules: Vec<ContainerRule>,
    card: CardSelectors,
    body: Selector,
    patterns: Patterns,
    link_base: String,
}

impl Extractor {
    pub fn new(link_base: &str) -> Result<Self, ExtractError> {
        let rules = CONTAINER_RULES
            .iter()
            .map(|(css, strategy)| {
                Ok(ContainerRule {
                    css: *css,
                    selector: compile_selector(css)?,
                    strategy: *strategy,
                })
            })
            .collect::<Result<Vec<_>, ExtractError>>()?;

        Ok(Extractor {
            rules,
            card: CardSelectors::new()?,
            body: compile_selector("body")?,
            patterns: Patterns::compile()?,
            link_base: link_base.to_string(),
        })
    }

    /// All fixtures on the page in discovery order, before deduplication.
    pub fn extract_page(&self, page: &PageContent, now: DateTime<Utc>) -> Vec<MatchRecord> {
        let doc = Html::parse_document(&page.html);
        let mut records = Vec::new();

        for rule in &self.rules {
            let mut found = 0usize;
            for container in doc.select(&rule.selector) {
                if let Some(partial) = self.extract_container(container, rule.strategy) {
                    let source = match rule.strategy {
                        Strategy::Card => MatchSource::MatchCard,
                        Strategy::Text => MatchSource::Generic,
                    };
                    records.push(self.finish(partial, source, now));
                    found += 1;
                }
            }
            if found > 0 {
                debug!("Selector '{}' yielded {} fixture(s)", rule.css, found);
            }
        }

        if records.is_empty() {
            let text = match &page.text {
                Some(t) => t.clone(),
                None => doc
                    .select(&self.body)
                    .next()
                    .map(visible_text)
                    .unwrap_or_else(|| visible_text(doc.root_element())),
            };
            records = self.extract_lines(&text, now);
            debug!("Page-text fallback yielded {} fixture(s)", records.len());
        }

        records
    }

    fn extract_container(&self, container: ElementRef<'_>, strategy: Strategy) -> Option<PartialMatch> {
        let mut partial = match strategy {
            Strategy::Card => card::extract(container, &self.card, &self.patterns, &self.link_base),
            Strategy::Text => generic::extract(&element_text(container), &self.patterns),
        };

        if !partial.has_teams() && !looks_like_fixture(&partial.raw_text) {
            return None;
        }

        if strategy == Strategy::Card || !partial.has_teams() {
            let text = partial.raw_text.clone();
            partial.merge_missing(generic::extract(&text, &self.patterns));
        }

        partial.has_teams().then_some(partial)
    }

    /// Line-by-line pass used when no container matched.
    pub fn extract_lines(&self, text: &str, now: DateTime<Utc>) -> Vec<MatchRecord> {
        text.lines()
            .map(str::trim)
            .filter(|line| looks_like_fixture(line))
            .map(|line| generic::extract(line, &self.patterns))
            .filter(PartialMatch::has_teams)
            .map(|partial| self.finish(partial, MatchSource::PageText, now))
            .collect()
    }

    fn finish(&self, partial: PartialMatch, source: MatchSource, now: DateTime<Utc>) -> MatchRecord {
        let home_team = partial.home_team.unwrap_or_default();
        let away_team = partial.away_team.unwrap_or_default();
        let link = partial.link.filter(|l| !l.is_empty()).unwrap_or_else(|| {
            slug::generate_link(
                &self.link_base,
                &home_team,
                &away_team,
                partial.time_only.as_deref(),
                partial.date.as_deref(),
                now.year(),
            )
        });

        MatchRecord {
            id: 0,
            home_team,
            away_team,
            home_team_logo: partial.home_team_logo,
            away_team_logo: partial.away_team_logo,
            time_only: partial.time_only,
            date: partial.date,
            time: partial.time,
            league: partial.league,
            status: partial.status,
            blv: partial.blv,
            link,
            raw_text: partial.raw_text,
            source,
            timestamp: now,
        }
    }
}

/// Extraction followed by deduplication and, optionally, the live filter.
pub struct Pipeline {
    extractor: Extractor,
    dedup_with_time: bool,
    live_only: bool,
}

impl Pipeline {
    pub fn new(extractor: Extractor, dedup_with_time: bool, live_only: bool) -> Self {
        Pipeline {
            extractor,
            dedup_with_time,
            live_only,
        }
    }

    pub fn run(&self, page: &PageContent, now: DateTime<Utc>) -> Vec<MatchRecord> {
        let extracted = self.extractor.extract_page(page, now);
        let extracted_count = extracted.len();
        let mut records = dedup_matches(extracted, self.dedup_with_time);
        if self.live_only {
            records = live_matches(&records);
        }
        for (i, r) in records.iter_mut().enumerate() {
            r.id = i + 1;
        }
        debug!(
            "Pipeline: {} extracted, {} kept (live_only={})",
            extracted_count,
            records.len(),
            self.live_only
        );
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const BASE: &str = "https://www.xaycon.live/truc-tiep/";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 1, 12, 0, 0).unwrap()
    }

    fn page(html: &str) -> PageContent {
        PageContent {
            html: html.to_string(),
            text: None,
        }
    }

    const LISTING: &str = r#"
        <html><body>
        <div class="bg-match-card">
          <div class="text-primary font-bold">UEFA Champions League</div>
          <div class="text-primary font-bold">23:45</div>
          <div class="text-primary font-bold">01/10</div>
          <img alt="Saint Gilloise" src="/sg.png">
          <span class="text-status-red">LIVE</span>
          <img alt="Newcastle United" src="/nu.png">
        </div>
        <table>
          <tr><td>Premier League</td><td>Arsenal vs Chelsea</td><td>02/10 19:30</td><td>FT</td></tr>
          <tr><td>Saint Gilloise vs Newcastle United</td></tr>
        </table>
        </body></html>"#;

    #[test]
    fn test_merge_fills_only_empty_fields() {
        let mut a = PartialMatch {
            home_team: Some("Arsenal".into()),
            league: Some(String::new()),
            raw_text: "x".into(),
            ..Default::default()
        };
        let b = PartialMatch {
            home_team: Some("Other".into()),
            away_team: Some("Chelsea".into()),
            league: Some("Premier League".into()),
            raw_text: "y".into(),
            ..Default::default()
        };
        a.merge_missing(b);
        assert_eq!(a.home_team.as_deref(), Some("Arsenal"));
        assert_eq!(a.away_team.as_deref(), Some("Chelsea"));
        assert_eq!(a.league.as_deref(), Some("Premier League"));
        assert_eq!(a.raw_text, "x");
    }

    #[test]
    fn test_listing_through_pipeline() {
        let pipeline = Pipeline::new(Extractor::new(BASE).unwrap(), false, false);
        let records = pipeline.run(&page(LISTING), now());

        assert_eq!(records.len(), 2, "{:#?}", records);

        let card = &records[0];
        assert_eq!(card.id, 1);
        assert_eq!(card.source, MatchSource::MatchCard);
        assert_eq!(card.home_team, "Saint Gilloise");
        assert_eq!(card.time.as_deref(), Some("01/10 23:45"));
        assert!(card.is_live());
        assert_eq!(
            card.link,
            "https://www.xaycon.live/truc-tiep/saint-gilloise-vs-newcastle-united-23-45-01-10-2025"
        );

        let row = &records[1];
        assert_eq!(row.id, 2);
        assert_eq!(row.source, MatchSource::Generic);
        assert_eq!(row.home_team, "Arsenal");
        assert_eq!(row.away_team, "Chelsea");
        assert_eq!(row.status.as_deref(), Some("FT"));
        assert!(row.link.ends_with("arsenal-vs-chelsea-19-30-02-10-2025"));
    }

    #[test]
    fn test_live_only_pipeline() {
        let pipeline = Pipeline::new(Extractor::new(BASE).unwrap(), false, true);
        let records = pipeline.run(&page(LISTING), now());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].home_team, "Saint Gilloise");
        assert_eq!(records[0].id, 1);
    }

    #[test]
    fn test_short_text_never_yields_a_record() {
        let extractor = Extractor::new(BASE).unwrap();
        let html = r#"<html><body><div class="match">AB</div><div class="row">12:30</div></body></html>"#;
        assert!(extractor.extract_page(&page(html), now()).is_empty());
    }

    #[test]
    fn test_page_text_fallback() {
        let extractor = Extractor::new(BASE).unwrap();
        let html = "<html><body><p>Real Madrid vs Barcelona</p><p>short</p></body></html>";
        let records = extractor.extract_page(&page(html), now());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source, MatchSource::PageText);
        assert_eq!(records[0].link, "https://www.xaycon.live/truc-tiep/real-madrid-vs-barcelona");
    }

    #[test]
    fn test_visible_text_layout() {
        let doc = Html::parse_document(
            r#"<html><head><title>t</title></head><body>
            <div>Top
              <span>story</span><br>next</div>
            <table><tr><td>Arsenal</td><td>19:30</td></tr></table>
            <style>.x { color: red }</style>
            </body></html>"#,
        );
        let body = doc.select(&compile_selector("body").unwrap()).next().unwrap();
        assert_eq!(visible_text(body), "Top story\nnext\nArsenal 19:30");
    }

    #[test]
    fn test_fallback_joins_inline_markup() {
        let extractor = Extractor::new(BASE).unwrap();
        let html = "<html><body><p>Real Madrid <b>vs</b> Barcelona</p></body></html>";
        let records = extractor.extract_page(&page(html), now());
        assert_eq!(records.len(), 1, "{:#?}", records);
        assert_eq!(records[0].home_team, "Real Madrid");
        assert_eq!(records[0].away_team, "Barcelona");
    }

    #[test]
    fn test_fallback_ignores_scripts_and_styles() {
        let extractor = Extractor::new(BASE).unwrap();
        let html = r#"<html><head><script>var a = b - c;</script></head><body>
            <script>var total = price - discount;</script>
            <noscript>Enable JavaScript - please</noscript>
            <style>.a { margin: 0 - 1px; }</style>
            <p>Real Madrid vs Barcelona</p>
            </body></html>"#;
        let records = extractor.extract_page(&page(html), now());
        assert_eq!(records.len(), 1, "{:#?}", records);
        assert_eq!(records[0].home_team, "Real Madrid");
    }

    #[test]
    fn test_fallback_prefers_rendered_text() {
        let extractor = Extractor::new(BASE).unwrap();
        let content = PageContent {
            html: "<html><body></body></html>".to_string(),
            text: Some("Header\nInter v Milan tonight\n".to_string()),
        };
        let records = extractor.extract_page(&content, now());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].home_team, "Inter");
        assert_eq!(records[0].away_team, "Milan tonight");
    }

    #[test]
    fn test_card_without_images_falls_back_to_text() {
        let extractor = Extractor::new(BASE).unwrap();
        let html = r#"<html><body><div class="bg-match-card">
            <div class="text-primary font-bold">18:00</div>
            <div>Hà Nội FC vs Công An Hà Nội</div></div></body></html>"#;
        let records = extractor.extract_page(&page(html), now());
        let first = &records[0];
        assert_eq!(first.source, MatchSource::MatchCard);
        assert_eq!(first.home_team, "Hà Nội FC");
        assert_eq!(first.away_team, "Công An Hà Nội");
        assert_eq!(first.time_only.as_deref(), Some("18:00"));
    }
}
