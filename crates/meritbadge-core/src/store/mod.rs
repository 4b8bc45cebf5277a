//! Persistence for imported records.
//!
//! The importer only talks to the `RecordStore` trait. Two adapters exist:
//! - `JsonStore`: one JSON table file per record type, written atomically
//! - `MemoryStore`: in-process tables for tests and dry runs
//!
//! Every upsert is keyed: scouts and adults by BSA number, progress by
//! BSA number plus merit badge. Re-importing a record replaces it.

pub mod json;
pub mod memory;

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::models::{Adult, MeritBadgeProgress, Scout};

pub use json::{JsonStore, StoredTable, TableAges};
pub use memory::MemoryStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to access {table} table at {}: {source}", path.display())]
    Io {
        table: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {table} table at {}: {source}", path.display())]
    Corrupt {
        table: &'static str,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No record database at {}; import files first", path.display())]
    NoDatabase { path: PathBuf },
}

/// Record tables held by a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Scouts,
    Adults,
    Progress,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Scouts => "scouts",
            Table::Adults => "adults",
            Table::Progress => "merit_badge_progress",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct UpsertCounts {
    pub inserted: usize,
    pub updated: usize,
}

impl UpsertCounts {
    pub fn total(&self) -> usize {
        self.inserted + self.updated
    }
}

/// Natural key a record is upserted by.
pub trait Keyed {
    fn store_key(&self) -> String;
}

impl Keyed for Scout {
    fn store_key(&self) -> String {
        self.bsa_number.clone()
    }
}

impl Keyed for Adult {
    fn store_key(&self) -> String {
        self.bsa_number.clone()
    }
}

impl Keyed for MeritBadgeProgress {
    fn store_key(&self) -> String {
        let (bsa_number, badge) = self.key();
        format!("{}|{}", bsa_number, badge.to_lowercase())
    }
}

/// Merge `incoming` into `table`, replacing records with the same key.
pub(crate) fn merge<T: Keyed + Clone>(
    table: &mut BTreeMap<String, T>,
    incoming: &[T],
) -> UpsertCounts {
    let mut counts = UpsertCounts::default();
    for record in incoming {
        match table.insert(record.store_key(), record.clone()) {
            Some(_) => counts.updated += 1,
            None => counts.inserted += 1,
        }
    }
    counts
}

/// Port to the record database.
pub trait RecordStore {
    fn upsert_scouts(&mut self, scouts: &[Scout]) -> Result<UpsertCounts, StoreError>;
    fn upsert_adults(&mut self, adults: &[Adult]) -> Result<UpsertCounts, StoreError>;
    fn upsert_progress(
        &mut self,
        progress: &[MeritBadgeProgress],
    ) -> Result<UpsertCounts, StoreError>;

    fn scouts(&self) -> Result<Vec<Scout>, StoreError>;
    fn adults(&self) -> Result<Vec<Adult>, StoreError>;
    fn progress(&self) -> Result<Vec<MeritBadgeProgress>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CounselorAssignment;

    fn progress(bsa: &str, badge: &str) -> MeritBadgeProgress {
        MeritBadgeProgress {
            bsa_number: bsa.to_string(),
            first_name: None,
            last_name: None,
            merit_badge: badge.to_string(),
            badge_year: None,
            status: None,
            start_date: None,
            date_completed: None,
            counselor: None,
            counselor_assignment: CounselorAssignment::NoAssignment,
            location: None,
            requirements: Vec::new(),
        }
    }

    #[test]
    fn test_merge_counts_inserts_and_updates() {
        let mut table = BTreeMap::new();
        let first = merge(&mut table, &[progress("1", "Camping"), progress("1", "Cooking")]);
        assert_eq!(first, UpsertCounts { inserted: 2, updated: 0 });

        let second = merge(&mut table, &[progress("1", "camping"), progress("2", "Camping")]);
        assert_eq!(second, UpsertCounts { inserted: 1, updated: 1 });
        assert_eq!(second.total(), 2);
        assert_eq!(table.len(), 3);
    }
}
