//! Validated import into a record store.
//!
//! Every supplied file is validated first. A file is imported only when its
//! own result is valid, so a file with errors is never partially written.
//! Files that pass are written in `FileType` order, one batch per file.
//!
//! Records are built from the rows kept during validation; a file is never
//! read a second time.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::{
    parse_positions, parse_requirements, split_badge_year, ActivityStatus, Adult,
    CounselorAssignment, MeritBadgeProgress, RequirementStatus, Scout,
};
use crate::store::{RecordStore, StoreError, UpsertCounts};
use crate::utils::{format_phone, non_empty};
use crate::validation::{
    parse_date, FileType, Row, ValidationError, ValidationOrchestrator, ValidationPolicy,
    ValidationReport,
};

#[derive(Error, Debug)]
pub enum ImportError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What an import run did.
#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub report: ValidationReport,
    /// Files that were written, with their counts.
    pub imported: BTreeMap<FileType, UpsertCounts>,
    /// Files that were supplied but failed validation.
    pub rejected: Vec<FileType>,
}

impl ImportSummary {
    pub fn total_written(&self) -> usize {
        self.imported.values().map(UpsertCounts::total).sum()
    }
}

pub struct Importer {
    orchestrator: ValidationOrchestrator,
}

impl Importer {
    pub fn new(policy: &ValidationPolicy) -> Self {
        Self {
            orchestrator: ValidationOrchestrator::new(policy),
        }
    }

    pub fn orchestrator(&self) -> &ValidationOrchestrator {
        &self.orchestrator
    }

    pub fn run(
        &self,
        files: &BTreeMap<FileType, PathBuf>,
        store: &mut dyn RecordStore,
    ) -> Result<ImportSummary, ImportError> {
        let scanned = self.orchestrator.scan(files)?;
        let report = scanned.report;
        let mut rows = scanned.rows;
        let mut imported = BTreeMap::new();
        let mut rejected = Vec::new();

        for file_type in files.keys() {
            let Some(file_rows) = rows.remove(file_type) else {
                let errors = report.result(*file_type).map(|r| r.errors().len()).unwrap_or(0);
                warn!(file_type = %file_type, errors, "Not importing file that failed validation");
                rejected.push(*file_type);
                continue;
            };

            let counts = import_rows(*file_type, &file_rows, store)?;
            info!(
                file_type = %file_type,
                inserted = counts.inserted,
                updated = counts.updated,
                "Imported file"
            );
            imported.insert(*file_type, counts);
        }

        Ok(ImportSummary {
            report,
            imported,
            rejected,
        })
    }
}

/// Write one file's validated rows. Duplicates were already skipped during
/// validation using the same key the store upserts by.
fn import_rows(
    file_type: FileType,
    rows: &[Row],
    store: &mut dyn RecordStore,
) -> Result<UpsertCounts, StoreError> {
    match file_type {
        FileType::YouthRoster => {
            store.upsert_scouts(&rows.iter().map(scout_from_row).collect::<Vec<_>>())
        }
        FileType::AdultRoster => {
            store.upsert_adults(&rows.iter().map(adult_from_row).collect::<Vec<_>>())
        }
        FileType::MeritBadgeProgress => {
            store.upsert_progress(&rows.iter().map(progress_from_row).collect::<Vec<_>>())
        }
    }
}

fn scout_from_row(row: &Row) -> Scout {
    Scout {
        bsa_number: row.get("bsa_number").to_string(),
        first_name: row.get("first_name").to_string(),
        last_name: row.get("last_name").to_string(),
        rank: non_empty(row.get("rank")),
        activity_status: ActivityStatus::recognize(row.get("activity_status")),
        patrol_name: non_empty(row.get("patrol_name")),
        unit_number: non_empty(row.get("unit_number")),
        date_joined: parse_date(row.get("date_joined")),
        date_of_birth: parse_date(row.get("date_of_birth")),
        email: non_empty(row.get("email")),
        phone: non_empty(row.get("phone")).map(|p| format_phone(&p)),
        positions: parse_positions(row.get("positions_tenure")),
    }
}

fn adult_from_row(row: &Row) -> Adult {
    Adult {
        bsa_number: row.get("bsa_number").to_string(),
        first_name: row.get("first_name").to_string(),
        last_name: row.get("last_name").to_string(),
        email: non_empty(row.get("email")),
        city: non_empty(row.get("city")),
        state: non_empty(row.get("state")),
        zip: non_empty(row.get("zip")),
        date_joined: parse_date(row.get("date_joined")),
        swim_class_date: parse_date(row.get("swim_class_date")),
        merit_badges: Adult::parse_merit_badges(row.get("merit_badges")),
    }
}

fn progress_from_row(row: &Row) -> MeritBadgeProgress {
    let (merit_badge, badge_year) = split_badge_year(row.get("merit_badge"));
    MeritBadgeProgress {
        bsa_number: row.get("bsa_number").to_string(),
        first_name: non_empty(row.get("first_name")),
        last_name: non_empty(row.get("last_name")),
        merit_badge,
        badge_year,
        status: RequirementStatus::recognize(row.get("requirement_status")),
        start_date: parse_date(row.get("start_date")),
        date_completed: parse_date(row.get("date_completed")),
        counselor: non_empty(row.get("counselor")),
        counselor_assignment: CounselorAssignment::from_field(row.get("counselor")),
        location: non_empty(row.get("location")),
        requirements: parse_requirements(row.get("requirements")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RequirementEntry;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_row_conversion_enriches_progress() {
        let row = Row::from_iter([
            ("bsa_number", "12345678"),
            ("first_name", "Alex"),
            ("merit_badge", "Fire Safety (2025)"),
            ("requirement_status", "In Progress"),
            ("start_date", "01/15/2025"),
            ("counselor", "TBD"),
            ("requirements", "1, 2a, (1 of 3a, 3b)"),
        ]);
        let progress = progress_from_row(&row);
        assert_eq!(progress.merit_badge, "Fire Safety");
        assert_eq!(progress.badge_year, Some(2025));
        assert_eq!(progress.status, Some(RequirementStatus::InProgress));
        assert_eq!(progress.start_date, NaiveDate::from_ymd_opt(2025, 1, 15));
        assert_eq!(progress.counselor_assignment, CounselorAssignment::Unassigned);
        assert_eq!(progress.requirements.len(), 3);
        assert_eq!(progress.requirements[0], RequirementEntry::Choice("1 of 3a, 3b".to_string()));
        assert_eq!(progress.requirements[1], RequirementEntry::Individual("1".to_string()));
        assert_eq!(progress.last_name, None);
    }

    #[test]
    fn test_scout_conversion_formats_phone() {
        let row = Row::from_iter([
            ("bsa_number", "12345678"),
            ("first_name", "Alex"),
            ("last_name", "Smith"),
            ("activity_status", "active"),
            ("phone", "555.123.4567"),
        ]);
        let scout = scout_from_row(&row);
        assert_eq!(scout.phone.as_deref(), Some("(555) 123-4567"));
        assert_eq!(scout.activity_status, Some(ActivityStatus::Active));
        assert_eq!(scout.rank, None);
    }

    #[test]
    fn test_invalid_file_is_not_imported() {
        let dir = TempDir::new().unwrap();
        let roster = "bsa_number,first_name,last_name,rank,activity_status\n\
                      12345678,Alex,Smith,Scout,Active\n\
                      ,Bea,Jones,Scout,Active\n";
        let progress = "bsa_number,merit_badge,requirement_status,start_date,date_completed\n\
                        12345678,Camping,Bogus,2024-01-01,\n\
                        12345678,Cooking,In Progress,2024-01-01,\n";
        let files = BTreeMap::from([
            (FileType::YouthRoster, write(&dir, "roster.csv", roster)),
            (FileType::MeritBadgeProgress, write(&dir, "progress.csv", progress)),
        ]);

        let mut store = MemoryStore::new();
        let summary = Importer::new(&ValidationPolicy::default())
            .run(&files, &mut store)
            .unwrap();

        assert!(!summary.report.overall_valid);
        assert_eq!(summary.rejected, vec![FileType::MeritBadgeProgress]);
        assert_eq!(
            summary.imported.get(&FileType::YouthRoster),
            Some(&UpsertCounts { inserted: 1, updated: 0 })
        );
        assert_eq!(store.scouts().unwrap().len(), 1);
        assert!(store.progress().unwrap().is_empty());
    }

    #[test]
    fn test_reimport_updates() {
        let dir = TempDir::new().unwrap();
        let roster = "bsa_number,first_name,last_name,rank,activity_status\n\
                      12345678,Alex,Smith,Scout,Active\n\
                      12345678,Alex,Smith,Star,Active\n";
        let files = BTreeMap::from([(FileType::YouthRoster, write(&dir, "roster.csv", roster))]);
        let importer = Importer::new(&ValidationPolicy::default());
        let mut store = MemoryStore::new();

        let first = importer.run(&files, &mut store).unwrap();
        assert_eq!(first.total_written(), 1);
        let second = importer.run(&files, &mut store).unwrap();
        assert_eq!(
            second.imported.get(&FileType::YouthRoster),
            Some(&UpsertCounts { inserted: 0, updated: 1 })
        );

        let scouts = store.scouts().unwrap();
        assert_eq!(scouts.len(), 1);
        // Duplicate row was skipped, first occurrence kept
        assert_eq!(scouts[0].rank.as_deref(), Some("Scout"));
    }

    #[test]
    fn test_every_valid_progress_row_is_written() {
        let dir = TempDir::new().unwrap();
        let progress = "bsa_number,merit_badge,requirement_status,start_date,date_completed\n\
                        12345678,Camping (2024),In Progress,2024-01-01,\n\
                        12345678,Camping (2025),Completed,2024-01-01,2025-02-01\n\
                        12345678,Cooking,In Progress,2024-01-01,\n";
        let files = BTreeMap::from([(FileType::MeritBadgeProgress, write(&dir, "progress.csv", progress))]);
        let mut store = MemoryStore::new();
        let summary = Importer::new(&ValidationPolicy::default())
            .run(&files, &mut store)
            .unwrap();

        let result = summary.report.result(FileType::MeritBadgeProgress).unwrap();
        assert_eq!(result.valid_rows(), 2);
        assert_eq!(result.skipped_records().len(), 1);
        assert_eq!(
            summary.imported[&FileType::MeritBadgeProgress].total(),
            result.valid_rows()
        );

        let stored = store.progress().unwrap();
        let camping = stored.iter().find(|p| p.merit_badge == "Camping").unwrap();
        assert_eq!(camping.badge_year, Some(2024));
        assert_eq!(camping.status, Some(RequirementStatus::InProgress));
    }

    #[test]
    fn test_roster_positions_are_imported() {
        let dir = TempDir::new().unwrap();
        let roster = "BSA Number,First Name,Last Name,Rank,Activity Status,Positions (Tenure)\n\
                      12345678,Alex,Smith,Star,Active,Scouts BSA (2y) | Patrol Leader [Eagles] Patrol (5m 9d)\n";
        let files = BTreeMap::from([(FileType::YouthRoster, write(&dir, "roster.csv", roster))]);
        let mut store = MemoryStore::new();
        Importer::new(&ValidationPolicy::default())
            .run(&files, &mut store)
            .unwrap();

        let scouts = store.scouts().unwrap();
        assert_eq!(scouts[0].positions.len(), 1);
        assert_eq!(scouts[0].positions[0].title, "Patrol Leader");
        assert_eq!(scouts[0].positions[0].patrol_name.as_deref(), Some("Eagles"));
    }
}
