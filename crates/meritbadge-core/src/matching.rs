//! Linking counselor names from progress exports to adult roster entries.
//!
//! The progress export only carries the counselor as free text ("Bob Smith",
//! "Smith, Robert", "Robert (Bob) Smith"). Strategies, strongest first:
//! - saved mapping: a name the unit has linked to a BSA number by hand
//! - exact: same first and last name after cleanup, in any common order
//! - nickname: same last name, first name is a known nickname of the other
//! - soundex: first and last names sound alike

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::models::Adult;

/// Common given names and their nicknames.
const NICKNAMES: &[(&str, &[&str])] = &[
    ("alan", &["al"]),
    ("alexander", &["alex"]),
    ("andrew", &["andy", "drew"]),
    ("anthony", &["tony"]),
    ("benjamin", &["ben", "benny"]),
    ("christopher", &["chris"]),
    ("daniel", &["dan", "danny"]),
    ("david", &["dave"]),
    ("douglas", &["doug"]),
    ("edward", &["ed", "eddie", "ted"]),
    ("gerald", &["jerry"]),
    ("gregory", &["greg"]),
    ("henry", &["hank"]),
    ("jacob", &["jake"]),
    ("james", &["jim", "jimmy", "jamie"]),
    ("jeffrey", &["jeff"]),
    ("john", &["jack", "johnny"]),
    ("jonathan", &["jon"]),
    ("joshua", &["josh"]),
    ("joseph", &["joe", "joey"]),
    ("kenneth", &["ken", "kenny"]),
    ("kevin", &["kev"]),
    ("lawrence", &["larry"]),
    ("matthew", &["matt"]),
    ("michael", &["mike", "mick", "micky"]),
    ("nathan", &["nate"]),
    ("nicholas", &["nick", "nicky"]),
    ("patrick", &["pat"]),
    ("peter", &["pete"]),
    ("raymond", &["ray"]),
    ("richard", &["rick", "rich", "dick"]),
    ("robert", &["bob", "rob", "bobby", "robbie"]),
    ("ronald", &["ron", "ronnie"]),
    ("samuel", &["sam", "sammy"]),
    ("stephen", &["steve", "stevie"]),
    ("steven", &["steve", "stevie"]),
    ("susan", &["sue", "susie"]),
    ("thomas", &["tom", "tommy"]),
    ("timothy", &["tim", "timmy"]),
    ("tyler", &["ty"]),
    ("william", &["bill", "billy", "will", "willie"]),
    ("zachary", &["zach"]),
];

const TITLES: [&str; 5] = ["mr.", "mrs.", "ms.", "dr.", "prof."];
const SUFFIXES: [&str; 5] = ["jr.", "sr.", "ii", "iii", "iv"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum MatchKind {
    Mapped,
    Exact,
    Nickname,
    Soundex,
}

impl MatchKind {
    pub fn confidence(&self) -> f32 {
        match self {
            MatchKind::Mapped | MatchKind::Exact => 1.0,
            MatchKind::Nickname => 0.95,
            MatchKind::Soundex => 0.8,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            MatchKind::Mapped => "saved",
            MatchKind::Exact => "exact",
            MatchKind::Nickname => "nickname",
            MatchKind::Soundex => "sounds alike",
        }
    }
}

/// An adult a counselor name may refer to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct CounselorMatch {
    pub bsa_number: String,
    pub name: String,
    pub kind: MatchKind,
    pub confidence: f32,
}

impl CounselorMatch {
    fn new(adult: &Adult, kind: MatchKind) -> Self {
        Self {
            bsa_number: adult.bsa_number.clone(),
            name: adult.full_name(),
            kind,
            confidence: kind.confidence(),
        }
    }
}

/// Lowercase, drop parenthesised nicknames, titles and suffixes, collapse spaces.
pub fn clean_name(name: &str) -> String {
    let lower = name.to_lowercase();
    let mut without_parens = String::with_capacity(lower.len());
    let mut depth = 0usize;
    for c in lower.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => without_parens.push(c),
            _ => {}
        }
    }
    without_parens
        .split_whitespace()
        .filter(|w| !TITLES.contains(w) && !SUFFIXES.contains(w))
        .collect::<Vec<_>>()
        .join(" ")
}

/// American Soundex code, e.g. `Robert` -> `R163`. Empty for names without letters.
pub fn soundex(name: &str) -> String {
    fn code(c: char) -> Option<char> {
        match c {
            'b' | 'f' | 'p' | 'v' => Some('1'),
            'c' | 'g' | 'j' | 'k' | 'q' | 's' | 'x' | 'z' => Some('2'),
            'd' | 't' => Some('3'),
            'l' => Some('4'),
            'm' | 'n' => Some('5'),
            'r' => Some('6'),
            _ => None,
        }
    }

    let mut letters = name
        .chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_lowercase());
    let Some(first) = letters.next() else {
        return String::new();
    };

    let mut out = String::with_capacity(4);
    out.push(first.to_ascii_uppercase());
    let mut last = code(first);
    for c in letters {
        if out.len() == 4 {
            break;
        }
        match code(c) {
            Some(digit) if Some(digit) != last => {
                out.push(digit);
                last = Some(digit);
            }
            Some(_) => {}
            // h and w do not separate equal codes; vowels do
            None if c == 'h' || c == 'w' => {}
            None => last = None,
        }
    }
    while out.len() < 4 {
        out.push('0');
    }
    out
}

fn is_nickname_of(nickname: &str, given: &str) -> bool {
    NICKNAMES
        .iter()
        .any(|(full, nicks)| *full == given && nicks.contains(&nickname))
}

/// Matches counselor names against one adult roster.
pub struct CounselorMatcher<'a> {
    adults: &'a [Adult],
    /// Cleaned counselor name -> adult BSA number.
    mappings: BTreeMap<String, String>,
}

impl<'a> CounselorMatcher<'a> {
    pub fn new(adults: &'a [Adult]) -> Self {
        Self {
            adults,
            mappings: BTreeMap::new(),
        }
    }

    /// Saved links from counselor name to BSA number; these win over any other match.
    pub fn with_mappings(mut self, mappings: &BTreeMap<String, String>) -> Self {
        self.mappings = mappings
            .iter()
            .map(|(name, bsa)| (clean_name(name), bsa.trim().to_string()))
            .collect();
        self
    }

    fn match_kind(&self, cleaned: &str, adult: &Adult) -> Option<MatchKind> {
        let first = clean_name(&adult.first_name);
        let last = clean_name(&adult.last_name);
        if first.is_empty() || last.is_empty() {
            return None;
        }

        let orders = [
            format!("{} {}", first, last),
            format!("{}, {}", last, first),
            format!("{} {}", last, first),
        ];
        if orders.iter().any(|o| o == cleaned) {
            return Some(MatchKind::Exact);
        }

        let parts: Vec<&str> = cleaned.split_whitespace().collect();
        let (Some(given), Some(family)) = (parts.first(), parts.last()) else {
            return None;
        };
        if parts.len() < 2 {
            return None;
        }

        if *family == last
            && (*given == first || is_nickname_of(given, &first) || is_nickname_of(&first, given))
        {
            return Some(MatchKind::Nickname);
        }

        if soundex(given) == soundex(&first) && soundex(family) == soundex(&last) {
            return Some(MatchKind::Soundex);
        }
        None
    }

    /// Every adult the name may refer to, most confident first.
    pub fn candidates(&self, counselor: &str) -> Vec<CounselorMatch> {
        let cleaned = clean_name(counselor);
        if cleaned.is_empty() {
            return Vec::new();
        }

        if let Some(bsa) = self.mappings.get(&cleaned) {
            if let Some(adult) = self.adults.iter().find(|a| &a.bsa_number == bsa) {
                return vec![CounselorMatch::new(adult, MatchKind::Mapped)];
            }
            debug!(counselor, bsa_number = %bsa, "Saved counselor mapping names an unknown adult");
        }

        let mut matches: Vec<CounselorMatch> = self
            .adults
            .iter()
            .filter_map(|adult| {
                self.match_kind(&cleaned, adult)
                    .map(|kind| CounselorMatch::new(adult, kind))
            })
            .collect();
        matches.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.name.cmp(&b.name)));
        matches
    }

    /// The single most confident match. Ties at the top are ambiguous and give `None`.
    pub fn best(&self, counselor: &str) -> Option<CounselorMatch> {
        let mut candidates = self.candidates(counselor).into_iter();
        let best = candidates.next()?;
        match candidates.next() {
            Some(runner_up) if runner_up.kind == best.kind => {
                debug!(counselor, "Counselor name matches more than one adult");
                None
            }
            _ => Some(best),
        }
    }
}
