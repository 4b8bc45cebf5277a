use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A leadership position held by a scout, from the roster's "Positions (Tenure)" cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ScoutPosition {
    pub title: String,
    pub patrol_name: Option<String>,
    /// Tenure as exported, e.g. `5m 9d`.
    pub tenure: Option<String>,
}

impl ScoutPosition {
    pub fn display(&self) -> String {
        match &self.patrol_name {
            Some(patrol) => format!("{} ({})", self.title, patrol),
            None => self.title.clone(),
        }
    }
}

/// Titles that only record membership.
const MEMBERSHIP_TITLES: [&str; 4] = ["scouts bsa", "scout", "member", "patrol member"];

fn tenure_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s*\(([^)]+)\)\s*$").expect("valid tenure regex"))
}

fn patrol_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\[\s*([^\]]+?)\s*\]").expect("valid patrol regex"))
}

fn patrol_suffix_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s+Patrol\s*$").expect("valid patrol suffix regex"))
}

fn parse_one(item: &str) -> Option<ScoutPosition> {
    let tenure = tenure_pattern()
        .captures(item)
        .map(|caps| caps[1].trim().to_string());
    let without_tenure = tenure_pattern().replace(item, "");

    let patrol_name = patrol_pattern()
        .captures(&without_tenure)
        .map(|caps| caps[1].to_string());
    let without_patrol = patrol_pattern().replace_all(&without_tenure, "");
    let title = patrol_suffix_pattern()
        .replace(without_patrol.trim(), "")
        .trim()
        .to_string();

    if title.is_empty() {
        return None;
    }
    Some(ScoutPosition {
        title,
        patrol_name,
        tenure,
    })
}

/// Parse the roster's positions cell into leadership positions.
///
/// Entries are separated by `|`, e.g.
/// `"Senior Patrol Leader (2y 3m) | Scribe [Dragon Fruit Patrol] (11m 3d)"`.
/// Plain membership entries such as `Scouts BSA` are dropped.
pub fn parse_positions(raw: &str) -> Vec<ScoutPosition> {
    raw.split('|')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .filter_map(parse_one)
        .filter(|p| !MEMBERSHIP_TITLES.contains(&p.title.to_lowercase().as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_position_with_tenure() {
        let positions = parse_positions("Webmaster (5m 9d)");
        assert_eq!(
            positions,
            vec![ScoutPosition {
                title: "Webmaster".to_string(),
                patrol_name: None,
                tenure: Some("5m 9d".to_string()),
            }]
        );
    }

    #[test]
    fn test_parse_patrol_position() {
        let positions = parse_positions("Patrol Leader [ Anonymous Message] Patrol (5m 9d)");
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].title, "Patrol Leader");
        assert_eq!(positions[0].patrol_name.as_deref(), Some("Anonymous Message"));
        assert_eq!(positions[0].display(), "Patrol Leader (Anonymous Message)");
    }

    #[test]
    fn test_parse_multiple_positions() {
        let positions =
            parse_positions("Senior Patrol Leader (2y 3m) | Scribe [Dragon Fruit Patrol] (11m 3d)");
        let titles: Vec<&str> = positions.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Senior Patrol Leader", "Scribe"]);
        assert_eq!(positions[1].patrol_name.as_deref(), Some("Dragon Fruit Patrol"));
        assert_eq!(positions[1].tenure.as_deref(), Some("11m 3d"));
    }

    #[test]
    fn test_membership_entries_dropped() {
        let positions = parse_positions("Scouts BSA (1y 2m) | Patrol Member [Eagles] (3m) | Quartermaster");
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].title, "Quartermaster");
        assert_eq!(positions[0].tenure, None);
    }

    #[test]
    fn test_empty_cell() {
        assert!(parse_positions("").is_empty());
        assert!(parse_positions("  |  ").is_empty());
    }
}
