use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Which extraction strategy produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchSource {
    /// Site-specific match card markup
    MatchCard,
    /// Regex pass over a loosely matched container
    Generic,
    /// Line-by-line pass over the whole page text
    PageText,
}

impl MatchSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchSource::MatchCard => "match-card",
            MatchSource::Generic => "generic",
            MatchSource::PageText => "page-text",
        }
    }
}

/// One observed fixture.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub id: usize,
    pub home_team: String,
    pub away_team: String,
    pub home_team_logo: Option<String>,
    pub away_team_logo: Option<String>,
    /// Kickoff as "HH:MM"
    pub time_only: Option<String>,
    /// "DD/MM", "DD/MM/YYYY" or a day word
    pub date: Option<String>,
    /// Display string, date and kickoff combined
    pub time: Option<String>,
    pub league: Option<String>,
    pub status: Option<String>,
    /// Commentator
    pub blv: Option<String>,
    pub link: String,
    pub raw_text: String,
    pub source: MatchSource,
    pub timestamp: DateTime<Utc>,
}

impl MatchRecord {
    /// Status contains "live", case-insensitively.
    pub fn is_live(&self) -> bool {
        self.status
            .as_deref()
            .map(|s| s.to_lowercase().contains("live"))
            .unwrap_or(false)
    }
}

/// Lifecycle of the cached snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshStatus {
    Initializing,
    Updating,
    Success,
    Error,
}

/// Result of the most recent refresh cycle. Immutable once published.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub matches: Arc<Vec<MatchRecord>>,
    pub last_updated: Option<DateTime<Utc>>,
    pub status: RefreshStatus,
    pub error: Option<String>,
    pub total_matches: usize,
}

impl Snapshot {
    pub fn initializing() -> Self {
        Snapshot {
            matches: Arc::new(Vec::new()),
            last_updated: None,
            status: RefreshStatus::Initializing,
            error: None,
            total_matches: 0,
        }
    }
}
