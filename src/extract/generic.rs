//! Text strategy: regex tables over the raw text of a container or a line.

use super::patterns::{first_plain, first_tagged, Patterns};
use super::PartialMatch;

pub fn extract(text: &str, patterns: &Patterns) -> PartialMatch {
    let mut m = PartialMatch {
        raw_text: text.trim().to_string(),
        ..Default::default()
    };

    if let Some((found, _shape)) = first_tagged(&patterns.date_time, text) {
        m.date = first_plain(&patterns.date, found).map(str::to_string);
        m.time_only = patterns.clock.find(found).map(|c| c.as_str().to_string());
        m.time = Some(found.to_string());
    }

    if let Some((home, away)) = split_teams(text, patterns) {
        m.home_team = Some(home);
        m.away_team = Some(away);
    }

    m.league = first_plain(&patterns.leagues, text).map(str::to_string);
    m.status = first_tagged(&patterns.statuses, text).map(|(s, _)| s.trim().to_string());

    m
}

/// Home and away names from the first separator pattern that matches.
pub fn split_teams(text: &str, patterns: &Patterns) -> Option<(String, String)> {
    patterns.teams.iter().find_map(|(re, _sep)| {
        let caps = re.captures(text)?;
        let home = caps.get(1)?.as_str().trim();
        let away = caps.get(2)?.as_str().trim();
        if home.is_empty() || away.is_empty() {
            return None;
        }
        Some((home.to_string(), away.to_string()))
    })
}
