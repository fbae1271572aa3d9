//! Canonical match-page links.
//!
//! Format: `{base}/{home}-vs-{away}-{HH-MM}-{DD-MM-YYYY}`, with the time and
//! date parts dropped when unknown.

use tracing::debug;
use url::Url;

use crate::error::SlugError;

/// Lowercase, keep ASCII word characters, whitespace and hyphens, then fold
/// whitespace into single hyphens and trim them from the ends.
pub fn normalize_team(name: &str) -> String {
    let kept: String = name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();

    kept.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

fn time_slug(time_only: &str) -> String {
    time_only.replacen(':', "-", 1)
}

fn is_digits(s: &str, min: usize, max: usize) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) && (min..=max).contains(&s.len())
}

/// "DD/MM" gets `year` appended; "DD/MM/YYYY" keeps its own year; anything
/// else just has slashes and whitespace turned into hyphens.
// NOTE: `year` is the year at extraction time, so a December fixture scraped in
// January is stamped with the wrong year.
fn date_slug(date: &str, year: i32) -> String {
    let parts: Vec<&str> = date.split('/').collect();
    match parts.as_slice() {
        [d, m] if is_digits(d, 1, 2) && is_digits(m, 1, 2) => format!("{}-{}-{}", d, m, year),
        [d, m, y] if is_digits(d, 1, 2) && is_digits(m, 1, 2) && is_digits(y, 4, 4) => {
            format!("{}-{}-{}", d, m, y)
        }
        _ => date
            .chars()
            .map(|c| if c == '/' || c.is_whitespace() { '-' } else { c })
            .collect(),
    }
}

/// Slug without the base URL.
pub fn match_slug(
    home_team: &str,
    away_team: &str,
    time_only: Option<&str>,
    date: Option<&str>,
    year: i32,
) -> Result<String, SlugError> {
    let home = normalize_team(home_team);
    if home.is_empty() {
        return Err(SlugError::EmptyTeam(home_team.to_string()));
    }
    let away = normalize_team(away_team);
    if away.is_empty() {
        return Err(SlugError::EmptyTeam(away_team.to_string()));
    }

    let mut parts = vec![home, "vs".to_string(), away];
    if let Some(t) = time_only.map(time_slug) {
        parts.push(t);
    }
    if let Some(d) = date.map(|d| date_slug(d, year)) {
        parts.push(d);
    }
    parts.retain(|p| !p.is_empty());
    Ok(parts.join("-"))
}

/// Full link under `base_url`.
pub fn match_link(
    base_url: &str,
    home_team: &str,
    away_team: &str,
    time_only: Option<&str>,
    date: Option<&str>,
    year: i32,
) -> Result<String, SlugError> {
    let base = Url::parse(base_url)?;
    let slug = match_slug(home_team, away_team, time_only, date, year)?;
    Ok(format!("{}/{}", base.as_str().trim_end_matches('/'), slug))
}

/// Like [`match_link`] but never fails: any problem yields an empty string.
pub fn generate_link(
    base_url: &str,
    home_team: &str,
    away_team: &str,
    time_only: Option<&str>,
    date: Option<&str>,
    year: i32,
) -> String {
    match match_link(base_url, home_team, away_team, time_only, date, year) {
        Ok(link) => link,
        Err(e) => {
            debug!("No link for '{} vs {}': {}", home_team, away_team, e);
            String::new()
        }
    }
}
