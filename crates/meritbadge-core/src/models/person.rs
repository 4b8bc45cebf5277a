use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::position::ScoutPosition;

// ============================================================================
// Rank Ordering
// ============================================================================

/// Scouts BSA rank, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum ScoutRank {
    NoRank = 0,
    Scout = 1,
    Tenderfoot = 2,
    SecondClass = 3,
    FirstClass = 4,
    Star = 5,
    Life = 6,
    Eagle = 7,
}

impl ScoutRank {
    pub const ALL: [ScoutRank; 8] = [
        ScoutRank::NoRank,
        ScoutRank::Scout,
        ScoutRank::Tenderfoot,
        ScoutRank::SecondClass,
        ScoutRank::FirstClass,
        ScoutRank::Star,
        ScoutRank::Life,
        ScoutRank::Eagle,
    ];

    /// Parse a rank string leniently for sorting.
    /// Handles variations like "Eagle Scout", "Life Scout", etc.
    pub fn from_label(s: Option<&str>) -> Self {
        match s {
            Some(rank) => {
                let lower = rank.to_lowercase();
                if lower.contains("eagle") {
                    ScoutRank::Eagle
                } else if lower.contains("life") {
                    ScoutRank::Life
                } else if lower.contains("star") {
                    ScoutRank::Star
                } else if lower.contains("first class") {
                    ScoutRank::FirstClass
                } else if lower.contains("second class") {
                    ScoutRank::SecondClass
                } else if lower.contains("tenderfoot") {
                    ScoutRank::Tenderfoot
                } else if lower == "scout" {
                    ScoutRank::Scout
                } else {
                    ScoutRank::NoRank
                }
            }
            None => ScoutRank::NoRank,
        }
    }

    /// Strict recognition used by the roster validator.
    ///
    /// Accepts the display names case-insensitively, the "<rank> Scout" form
    /// Scoutbook uses for Star, Life and Eagle, and "No Rank".
    pub fn recognize(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        let base = lower.strip_suffix(" scout").unwrap_or(&lower);
        Self::ALL
            .iter()
            .copied()
            .find(|rank| rank.display_name().to_lowercase() == base || rank.display_name().to_lowercase() == lower)
    }

    /// Get the numeric order for sorting (0 = No Rank, 7 = Eagle).
    pub fn order(&self) -> usize {
        *self as usize
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ScoutRank::NoRank => "No Rank",
            ScoutRank::Scout => "Scout",
            ScoutRank::Tenderfoot => "Tenderfoot",
            ScoutRank::SecondClass => "Second Class",
            ScoutRank::FirstClass => "First Class",
            ScoutRank::Star => "Star",
            ScoutRank::Life => "Life",
            ScoutRank::Eagle => "Eagle",
        }
    }
}

impl std::fmt::Display for ScoutRank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Registration status as exported on the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum ActivityStatus {
    Active,
    Inactive,
    AgedOut,
}

impl ActivityStatus {
    pub const ALL: [ActivityStatus; 3] = [
        ActivityStatus::Active,
        ActivityStatus::Inactive,
        ActivityStatus::AgedOut,
    ];

    pub fn recognize(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.display_name().to_lowercase() == lower)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ActivityStatus::Active => "Active",
            ActivityStatus::Inactive => "Inactive",
            ActivityStatus::AgedOut => "Aged Out",
        }
    }
}

impl std::fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

// ============================================================================
// Records
// ============================================================================

/// A youth member from the roster export, keyed by BSA number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Scout {
    pub bsa_number: String,
    pub first_name: String,
    pub last_name: String,
    /// Rank exactly as exported; unrecognised values are kept for display.
    pub rank: Option<String>,
    pub activity_status: Option<ActivityStatus>,
    pub patrol_name: Option<String>,
    pub unit_number: Option<String>,
    pub date_joined: Option<NaiveDate>,
    pub date_of_birth: Option<NaiveDate>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub positions: Vec<ScoutPosition>,
}

impl Scout {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn display_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }

    pub fn scout_rank(&self) -> ScoutRank {
        ScoutRank::from_label(self.rank.as_deref())
    }

    pub fn is_active(&self) -> bool {
        self.activity_status == Some(ActivityStatus::Active)
    }
}

/// An adult volunteer from the adult roster export, keyed by BSA number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Adult {
    pub bsa_number: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub date_joined: Option<NaiveDate>,
    pub swim_class_date: Option<NaiveDate>,
    /// Merit badges this adult is registered to counsel.
    #[serde(default)]
    pub merit_badges: Vec<String>,
}

impl Adult {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Split the exported counselor list, which uses `|` or `;` between badges.
    pub fn parse_merit_badges(raw: &str) -> Vec<String> {
        let separator = if raw.contains('|') { '|' } else { ';' };
        raw.split(separator)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scout(rank: Option<&str>, status: Option<ActivityStatus>) -> Scout {
        Scout {
            bsa_number: "12345678".to_string(),
            first_name: "Alex".to_string(),
            last_name: "Smith".to_string(),
            rank: rank.map(str::to_string),
            activity_status: status,
            patrol_name: None,
            unit_number: None,
            date_joined: None,
            date_of_birth: None,
            email: None,
            phone: None,
            positions: Vec::new(),
        }
    }

    #[test]
    fn test_scout_rank_from_label_basic() {
        assert_eq!(ScoutRank::from_label(Some("Scout")), ScoutRank::Scout);
        assert_eq!(ScoutRank::from_label(Some("Tenderfoot")), ScoutRank::Tenderfoot);
        assert_eq!(ScoutRank::from_label(Some("Second Class")), ScoutRank::SecondClass);
        assert_eq!(ScoutRank::from_label(Some("First Class")), ScoutRank::FirstClass);
        assert_eq!(ScoutRank::from_label(Some("Star")), ScoutRank::Star);
        assert_eq!(ScoutRank::from_label(Some("Life")), ScoutRank::Life);
        assert_eq!(ScoutRank::from_label(Some("Eagle Scout")), ScoutRank::Eagle);
        assert_eq!(ScoutRank::from_label(Some("Wolf")), ScoutRank::NoRank);
        assert_eq!(ScoutRank::from_label(None), ScoutRank::NoRank);
    }

    #[test]
    fn test_scout_rank_recognize() {
        assert_eq!(ScoutRank::recognize("Tenderfoot"), Some(ScoutRank::Tenderfoot));
        assert_eq!(ScoutRank::recognize("second class"), Some(ScoutRank::SecondClass));
        assert_eq!(ScoutRank::recognize("Life Scout"), Some(ScoutRank::Life));
        assert_eq!(ScoutRank::recognize("NO RANK"), Some(ScoutRank::NoRank));
        assert_eq!(ScoutRank::recognize("Scout"), Some(ScoutRank::Scout));
        assert_eq!(ScoutRank::recognize("Webelos"), None);
        // Lenient matching is for sorting only
        assert_eq!(ScoutRank::recognize("Eagle Scout - Silver Palm"), None);
    }

    #[test]
    fn test_scout_rank_ordering() {
        assert!(ScoutRank::Eagle > ScoutRank::Life);
        assert!(ScoutRank::Life > ScoutRank::Star);
        assert!(ScoutRank::Star > ScoutRank::FirstClass);
        assert!(ScoutRank::FirstClass > ScoutRank::SecondClass);
        assert!(ScoutRank::SecondClass > ScoutRank::Tenderfoot);
        assert!(ScoutRank::Tenderfoot > ScoutRank::Scout);
        assert!(ScoutRank::Scout > ScoutRank::NoRank);
        assert_eq!(ScoutRank::Eagle.order(), 7);
    }

    #[test]
    fn test_activity_status_recognize() {
        assert_eq!(ActivityStatus::recognize("Active"), Some(ActivityStatus::Active));
        assert_eq!(ActivityStatus::recognize(" aged out "), Some(ActivityStatus::AgedOut));
        assert_eq!(ActivityStatus::recognize("Suspended"), None);
    }

    #[test]
    fn test_scout_helpers() {
        let s = scout(Some("Star Scout"), Some(ActivityStatus::Active));
        assert_eq!(s.full_name(), "Alex Smith");
        assert_eq!(s.display_name(), "Smith, Alex");
        assert_eq!(s.scout_rank(), ScoutRank::Star);
        assert!(s.is_active());
        assert!(!scout(None, None).is_active());
    }

    #[test]
    fn test_parse_merit_badges() {
        assert_eq!(
            Adult::parse_merit_badges("Camping | Cooking|Hiking"),
            vec!["Camping", "Cooking", "Hiking"]
        );
        assert_eq!(Adult::parse_merit_badges("Chess; Swimming;"), vec!["Chess", "Swimming"]);
        assert!(Adult::parse_merit_badges("").is_empty());
    }
}
