//! Read-only queries over imported records.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::matching::{CounselorMatch, CounselorMatcher};
use crate::models::{CounselorAssignment, MeritBadgeProgress, Scout};
use crate::store::{RecordStore, StoreError};
use crate::utils::cmp_ignore_case;

/// Scouts working on and finished with one badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct BadgeSummary {
    pub merit_badge: String,
    pub in_progress: usize,
    pub completed: usize,
}

/// Open badges assigned to one counselor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct CounselorWorkload {
    pub counselor: String,
    /// The adult roster entry the name was linked to, if any.
    pub adult: Option<CounselorMatch>,
    /// (scout name, merit badge), sorted by scout.
    pub assignments: Vec<(String, String)>,
}

/// Active scouts, highest rank first, then by name.
pub fn active_scouts(store: &dyn RecordStore) -> Result<Vec<Scout>, StoreError> {
    let mut scouts: Vec<Scout> = store.scouts()?.into_iter().filter(Scout::is_active).collect();
    scouts.sort_by(|a, b| {
        b.scout_rank()
            .cmp(&a.scout_rank())
            .then_with(|| cmp_ignore_case(&a.last_name, &b.last_name))
            .then_with(|| cmp_ignore_case(&a.first_name, &b.first_name))
    });
    Ok(scouts)
}

/// Active scouts holding at least one leadership position, by name.
pub fn leaders(store: &dyn RecordStore) -> Result<Vec<Scout>, StoreError> {
    let mut scouts: Vec<Scout> = store
        .scouts()?
        .into_iter()
        .filter(|s| s.is_active() && !s.positions.is_empty())
        .collect();
    scouts.sort_by(|a, b| {
        cmp_ignore_case(&a.last_name, &b.last_name)
            .then_with(|| cmp_ignore_case(&a.first_name, &b.first_name))
    });
    Ok(scouts)
}

/// One scout's badges, alphabetically.
pub fn scout_progress(
    store: &dyn RecordStore,
    bsa_number: &str,
) -> Result<Vec<MeritBadgeProgress>, StoreError> {
    let mut progress: Vec<MeritBadgeProgress> = store
        .progress()?
        .into_iter()
        .filter(|p| p.bsa_number == bsa_number)
        .collect();
    progress.sort_by(|a, b| cmp_ignore_case(&a.merit_badge, &b.merit_badge));
    Ok(progress)
}

pub fn badge_summary(store: &dyn RecordStore) -> Result<Vec<BadgeSummary>, StoreError> {
    let mut by_badge: BTreeMap<String, BadgeSummary> = BTreeMap::new();

    for p in store.progress()? {
        let entry = by_badge
            .entry(p.merit_badge.to_lowercase())
            .or_insert_with(|| BadgeSummary {
                merit_badge: p.merit_badge.clone(),
                in_progress: 0,
                completed: 0,
            });
        if p.is_completed() {
            entry.completed += 1;
        } else {
            entry.in_progress += 1;
        }
    }

    Ok(by_badge.into_values().collect())
}

/// Progress rows naming a BSA number that is not on the youth roster.
pub fn unmatched_progress(store: &dyn RecordStore) -> Result<Vec<MeritBadgeProgress>, StoreError> {
    let roster: HashSet<String> = store.scouts()?.into_iter().map(|s| s.bsa_number).collect();
    Ok(store
        .progress()?
        .into_iter()
        .filter(|p| !roster.contains(&p.bsa_number))
        .collect())
}

/// Counselors with their unfinished assignments, busiest first.
///
/// Each counselor name is linked to the adult roster when exactly one adult
/// matches best; `mappings` holds saved name to BSA number links.
pub fn counselor_workload(
    store: &dyn RecordStore,
    mappings: &BTreeMap<String, String>,
) -> Result<Vec<CounselorWorkload>, StoreError> {
    let adults = store.adults()?;
    let matcher = CounselorMatcher::new(&adults).with_mappings(mappings);
    let mut by_counselor: BTreeMap<String, CounselorWorkload> = BTreeMap::new();

    for p in store.progress()? {
        if p.counselor_assignment != CounselorAssignment::Assigned || p.is_completed() {
            continue;
        }
        let Some(counselor) = p.counselor.as_deref() else {
            continue;
        };
        by_counselor
            .entry(counselor.to_lowercase())
            .or_insert_with(|| CounselorWorkload {
                counselor: counselor.to_string(),
                adult: matcher.best(counselor),
                assignments: Vec::new(),
            })
            .assignments
            .push((p.scout_name(), p.merit_badge.clone()));
    }

    let mut result: Vec<CounselorWorkload> = by_counselor.into_values().collect();
    for load in &mut result {
        load.assignments
            .sort_by(|a, b| cmp_ignore_case(&a.0, &b.0).then_with(|| cmp_ignore_case(&a.1, &b.1)));
    }
    result.sort_by(|a, b| {
        b.assignments
            .len()
            .cmp(&a.assignments.len())
            .then_with(|| cmp_ignore_case(&a.counselor, &b.counselor))
    });
    Ok(result)
}

/// A counselor name from the progress export with the adults it may refer to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct CounselorNameMatches {
    pub counselor: String,
    pub candidates: Vec<CounselorMatch>,
}

/// Every distinct assigned counselor name with its candidate adults, for review.
pub fn counselor_matches(
    store: &dyn RecordStore,
    mappings: &BTreeMap<String, String>,
) -> Result<Vec<CounselorNameMatches>, StoreError> {
    let adults = store.adults()?;
    let matcher = CounselorMatcher::new(&adults).with_mappings(mappings);
    let mut names: BTreeMap<String, String> = BTreeMap::new();
    for p in store.progress()? {
        if p.counselor_assignment != CounselorAssignment::Assigned {
            continue;
        }
        if let Some(counselor) = p.counselor {
            names.entry(counselor.to_lowercase()).or_insert(counselor);
        }
    }

    Ok(names
        .into_values()
        .map(|counselor| CounselorNameMatches {
            candidates: matcher.candidates(&counselor),
            counselor,
        })
        .collect())
}
