//! Ordered pattern tables used by the text strategy.
//!
//! Every table is scanned top to bottom and the first pattern that matches
//! wins, so more specific patterns must come first.

use regex::Regex;

/// Shape of a date/time token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTimeShape {
    DateYearTime,
    DateTime,
    DateYear,
    Date,
    DayWord,
    Clock,
}

/// Separator between the two team names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    Vs,
    VsUpper,
    Dash,
    V,
}

/// Coarse meaning of a status token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTag {
    Live,
    FullTime,
    HalfTime,
    Minute,
    NotStarted,
}

pub const DATE_TIME_PATTERNS: &[(&str, DateTimeShape)] = &[
    (r"\d{1,2}/\d{1,2}/\d{4}\s+\d{1,2}:\d{2}", DateTimeShape::DateYearTime),
    (r"\d{1,2}-\d{1,2}-\d{4}\s+\d{1,2}:\d{2}", DateTimeShape::DateYearTime),
    (r"\d{4}-\d{1,2}-\d{1,2}\s+\d{1,2}:\d{2}", DateTimeShape::DateYearTime),
    (r"\d{1,2}/\d{1,2}\s+\d{1,2}:\d{2}", DateTimeShape::DateTime),
    (r"\d{1,2}-\d{1,2}\s+\d{1,2}:\d{2}", DateTimeShape::DateTime),
    (r"\d{1,2}/\d{1,2}/\d{4}", DateTimeShape::DateYear),
    (r"\d{1,2}-\d{1,2}-\d{4}", DateTimeShape::DateYear),
    (r"\d{4}-\d{1,2}-\d{1,2}", DateTimeShape::DateYear),
    (r"\d{1,2}/\d{1,2}", DateTimeShape::Date),
    (r"\d{1,2}-\d{1,2}", DateTimeShape::Date),
    (r"(?i)Today|Tomorrow|Hôm nay|Ngày mai|Hôm qua|Yesterday", DateTimeShape::DayWord),
    (r"(?i)Monday|Tuesday|Wednesday|Thursday|Friday|Saturday|Sunday", DateTimeShape::DayWord),
    (r"(?i)Thứ hai|Thứ ba|Thứ tư|Thứ năm|Thứ sáu|Thứ bảy|Chủ nhật", DateTimeShape::DayWord),
    (r"\d{1,2}:\d{2}", DateTimeShape::Clock),
];

/// Date part of an already matched date/time token.
pub const DATE_PATTERNS: &[&str] = &[
    r"\d{1,2}/\d{1,2}/\d{4}",
    r"\d{1,2}-\d{1,2}-\d{4}",
    r"\d{4}-\d{1,2}-\d{1,2}",
    r"\d{1,2}/\d{1,2}",
    r"\d{1,2}-\d{1,2}",
    r"(?i)Today|Tomorrow|Hôm nay|Ngày mai|Hôm qua|Yesterday",
    r"(?i)Monday|Tuesday|Wednesday|Thursday|Friday|Saturday|Sunday",
    r"(?i)Thứ hai|Thứ ba|Thứ tư|Thứ năm|Thứ sáu|Thứ bảy|Chủ nhật",
];

pub const CLOCK_PATTERN: &str = r"\d{1,2}:\d{2}";
pub const DAY_MONTH_PATTERN: &str = r"\d{1,2}/\d{1,2}";

pub const TEAM_PATTERNS: &[(&str, Separator)] = &[
    (r"(?i)(.+?)\s+vs\s+(.+)", Separator::Vs),
    (r"(.+?)\s+VS\s+(.+)", Separator::VsUpper),
    (r"(.+?)\s+-\s+(.+)", Separator::Dash),
    (r"(?i)(.+?)\s+v\s+(.+)", Separator::V),
];

pub const LEAGUE_PATTERNS: &[&str] = &[
    r"(?i)Premier League|La Liga|Serie A|Bundesliga|Ligue 1",
    r"(?i)Champions League|Europa League|Conference League",
    r"(?i)World Cup|Euro|Nations League",
    r"(?i)V-League|V\.League|V League",
    r"(?i)Copa|Cup|Championship",
    r"[A-Z]{2,}\s+[A-Z]{2,}",
];

pub const STATUS_PATTERNS: &[(&str, StatusTag)] = &[
    (r"LIVE|Live|live", StatusTag::Live),
    (r"(?i)\bFT\b|Full Time|Kết thúc", StatusTag::FullTime),
    (r"(?i)\bHT\b|Half Time|Hiệp 1", StatusTag::HalfTime),
    (r"\d+'", StatusTag::Minute),
    (r"(?i)Chưa bắt đầu|Not started", StatusTag::NotStarted),
];

/// Substrings that mark a text as a plausible "team vs team" line.
pub const SEPARATOR_TOKENS: &[&str] = &["vs", "VS", " - ", " v "];

/// Texts at or under this many characters never count as a fixture on their own.
pub const MIN_FIXTURE_TEXT_LEN: usize = 10;

/// Compiled form of every table above.
pub struct Patterns {
    pub date_time: Vec<(Regex, DateTimeShape)>,
    pub date: Vec<Regex>,
    pub clock: Regex,
    pub day_month: Regex,
    pub teams: Vec<(Regex, Separator)>,
    pub leagues: Vec<Regex>,
    pub statuses: Vec<(Regex, StatusTag)>,
}

impl Patterns {
    pub fn compile() -> Result<Self, regex::Error> {
        Ok(Patterns {
            date_time: compile_tagged(DATE_TIME_PATTERNS)?,
            date: compile_all(DATE_PATTERNS)?,
            clock: Regex::new(CLOCK_PATTERN)?,
            day_month: Regex::new(DAY_MONTH_PATTERN)?,
            teams: compile_tagged(TEAM_PATTERNS)?,
            leagues: compile_all(LEAGUE_PATTERNS)?,
            statuses: compile_tagged(STATUS_PATTERNS)?,
        })
    }
}

fn compile_tagged<T: Copy>(table: &[(&str, T)]) -> Result<Vec<(Regex, T)>, regex::Error> {
    table
        .iter()
        .map(|(src, tag)| Regex::new(src).map(|re| (re, *tag)))
        .collect()
}

fn compile_all(table: &[&str]) -> Result<Vec<Regex>, regex::Error> {
    table.iter().map(|src| Regex::new(src)).collect()
}

/// First matching pattern in table order, with its tag.
pub fn first_tagged<'t, T: Copy>(table: &[(Regex, T)], text: &'t str) -> Option<(&'t str, T)> {
    table
        .iter()
        .find_map(|(re, tag)| re.find(text).map(|m| (m.as_str(), *tag)))
}

/// First matching pattern in table order.
pub fn first_plain<'t>(table: &[Regex], text: &'t str) -> Option<&'t str> {
    table.iter().find_map(|re| re.find(text).map(|m| m.as_str()))
}

/// True when `text` is long enough and contains a separator token.
pub fn looks_like_fixture(text: &str) -> bool {
    text.chars().count() > MIN_FIXTURE_TEXT_LEN
        && SEPARATOR_TOKENS.iter().any(|tok| text.contains(tok))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_tables_compile() {
        let p = Patterns::compile().unwrap();
        assert_eq!(p.date_time.len(), DATE_TIME_PATTERNS.len());
        assert_eq!(p.teams.len(), TEAM_PATTERNS.len());
        assert_eq!(p.statuses.len(), STATUS_PATTERNS.len());
    }

    #[test]
    fn test_each_date_time_pattern_has_a_witness() {
        let p = Patterns::compile().unwrap();
        let witnesses = [
            ("02/10/2025 19:30", DateTimeShape::DateYearTime),
            ("02-10-2025 19:30", DateTimeShape::DateYearTime),
            ("2025-10-02 19:30", DateTimeShape::DateYearTime),
            ("02/10 19:30", DateTimeShape::DateTime),
            ("02-10 19:30", DateTimeShape::DateTime),
            ("02/10/2025", DateTimeShape::DateYear),
            ("02-10-2025", DateTimeShape::DateYear),
            ("2025-10-02", DateTimeShape::DateYear),
            ("02/10", DateTimeShape::Date),
            ("02-10", DateTimeShape::Date),
            ("hôm nay", DateTimeShape::DayWord),
            ("Saturday", DateTimeShape::DayWord),
            ("Chủ nhật", DateTimeShape::DayWord),
            ("19:30", DateTimeShape::Clock),
        ];
        for (text, shape) in witnesses {
            let (found, tag) = first_tagged(&p.date_time, text).unwrap();
            assert_eq!(found, text, "pattern consumed only part of {:?}", text);
            assert_eq!(tag, shape, "wrong shape for {:?}", text);
        }
    }

    #[test]
    fn test_specific_date_time_beats_clock() {
        let p = Patterns::compile().unwrap();
        let (found, tag) = first_tagged(&p.date_time, "Kick-off 19:30 on 02/10").unwrap();
        assert_eq!(found, "02/10");
        assert_eq!(tag, DateTimeShape::Date);
    }

    #[test]
    fn test_team_separators_in_order() {
        let p = Patterns::compile().unwrap();
        let cases = [
            ("Arsenal vs Chelsea", Separator::Vs),
            ("Arsenal Vs Chelsea", Separator::Vs),
            ("Arsenal - Chelsea", Separator::Dash),
            ("Arsenal v Chelsea", Separator::V),
        ];
        for (text, sep) in cases {
            let hit = p.teams.iter().find(|(re, _)| re.is_match(text)).map(|(_, s)| *s);
            assert_eq!(hit, Some(sep), "separator for {:?}", text);
        }
    }

    #[test]
    fn test_status_tags() {
        let p = Patterns::compile().unwrap();
        let cases = [
            ("• Live", StatusTag::Live),
            ("FT 2-1", StatusTag::FullTime),
            ("Half Time", StatusTag::HalfTime),
            ("67'", StatusTag::Minute),
            ("Chưa bắt đầu", StatusTag::NotStarted),
        ];
        for (text, want) in cases {
            assert_eq!(first_tagged(&p.statuses, text).map(|(_, t)| t), Some(want), "{:?}", text);
        }
        // "ft" inside a word is not a status
        assert!(first_tagged(&p.statuses, "Swift United").is_none());
    }

    #[test]
    fn test_league_priority() {
        let p = Patterns::compile().unwrap();
        assert_eq!(first_plain(&p.leagues, "UEFA Europa League night"), Some("Europa League"));
        assert_eq!(first_plain(&p.leagues, "premier league"), Some("premier league"));
        assert_eq!(first_plain(&p.leagues, "FA Cup final"), Some("Cup"));
    }

    #[test]
    fn test_looks_like_fixture() {
        assert!(looks_like_fixture("Arsenal vs Chelsea"));
        assert!(looks_like_fixture("Arsenal - Chelsea"));
        assert!(!looks_like_fixture("AB"));
        assert!(!looks_like_fixture("a vs b"));
        assert!(!looks_like_fixture("Arsenal and Chelsea"));
    }
}
