use std::collections::HashSet;

use crate::models::MatchRecord;

fn dedup_key(record: &MatchRecord, with_time: bool) -> String {
    let mut key = format!("{}_{}", record.home_team, record.away_team);
    if with_time {
        key.push('_');
        key.push_str(record.time_only.as_deref().unwrap_or(""));
    }
    key.to_lowercase()
}

/// Drop later records for a fixture already seen. Input order is kept and the
/// first occurrence wins.
pub fn dedup_matches(records: Vec<MatchRecord>, with_time: bool) -> Vec<MatchRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert(dedup_key(r, with_time)))
        .collect()
}

/// Records whose status mentions "live".
pub fn live_matches<'a, I>(records: I) -> Vec<MatchRecord>
where
    I: IntoIterator<Item = &'a MatchRecord>,
{
    records.into_iter().filter(|r| r.is_live()).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MatchSource;
    use chrono::Utc;

    fn record(home: &str, away: &str, raw: &str) -> MatchRecord {
        MatchRecord {
            id: 0,
            home_team: home.to_string(),
            away_team: away.to_string(),
            home_team_logo: None,
            away_team_logo: None,
            time_only: None,
            date: None,
            time: None,
            league: None,
            status: None,
            blv: None,
            link: String::new(),
            raw_text: raw.to_string(),
            source: MatchSource::Generic,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_first_occurrence_wins() {
        let out = dedup_matches(
            vec![
                record("Arsenal", "Chelsea", "first"),
                record("Spurs", "Everton", "other"),
                record("ARSENAL", "chelsea", "second"),
            ],
            false,
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].raw_text, "first");
        assert_eq!(out[1].home_team, "Spurs");
    }

    #[test]
    fn test_time_in_key_keeps_doubleheaders() {
        let mut a = record("Arsenal", "Chelsea", "a");
        a.time_only = Some("15:00".into());
        let mut b = record("Arsenal", "Chelsea", "b");
        b.time_only = Some("19:30".into());

        assert_eq!(dedup_matches(vec![a.clone(), b.clone()], false).len(), 1);
        assert_eq!(dedup_matches(vec![a, b], true).len(), 2);
    }

    #[test]
    fn test_live_filter() {
        let mut empty = record("A", "B", "");
        empty.status = Some(String::new());
        let mut live = record("C", "D", "");
        live.status = Some("• Live".into());
        let mut ft = record("E", "F", "");
        ft.status = Some("FT".into());
        let none = record("G", "H", "");

        let all = vec![empty, live, ft, none];
        let out = live_matches(&all);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].home_team, "C");
    }
}
