//! End-to-end checks: validate exports on disk, import them, query the store.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use meritbadge_core::store::RecordStore;
use meritbadge_core::{
    views, FileType, FileValidator, Importer, JsonStore, MemoryStore, UpsertCounts,
    ValidationOrchestrator, ValidationPolicy, ValidationResult,
};
use tempfile::TempDir;

const ROSTER: &str = "\u{feff}ID,First Name,Last Name,BSA Number,Rank,Activity Status,Patrol Name,Phone\n\
1,Alex,Smith,12345678,Scout,Active,Eagles,555-123-4567\n\
2,Bea,Jones,12345679,Life Scout,Active,Hawks,\n\
3,Cal,Brown,,Star,Active,Eagles,\n\
4,Dee,White,12345680,Tenderfoot,Inactive,Hawks,\n\
5,Eli,Green,12345681,Eagle,Active,Eagles,\n";

const ADULTS: &str = "First Name,Last Name,BSA Number,Email,Merit Badges\n\
Jane,Doe,87654321,jane@example.com,Camping | Cooking\n";

const PROGRESS: &str = "Member ID,Scout First,Scout Last,Merit Badge,Requirement Status,Start Date,Date Completed,Requirements,MBC\n\
12345678,Alex,Smith,Camping (2024),In Progress,2024-01-10,,\"1, 2a, (1 of 3a, 3b)\",Jane Doe\n\
12345679,Bea,Jones,Cooking,Completed,2023-09-01,2024-02-01,,Jane Doe\n\
99999999,Zed,Nobody,Swimming,In Progress,2024-03-01,,No Requirements Complete,TBD\n";

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn all_files(dir: &TempDir) -> BTreeMap<FileType, PathBuf> {
    BTreeMap::from([
        (FileType::YouthRoster, write(dir, "roster.csv", ROSTER)),
        (FileType::AdultRoster, write(dir, "adults.csv", ADULTS)),
        (FileType::MeritBadgeProgress, write(dir, "progress.csv", PROGRESS)),
    ])
}

fn assert_invariants(result: &ValidationResult) {
    assert!(result.valid_rows() + result.skipped_records().len() <= result.row_count());
    assert_eq!(result.is_valid(), result.errors().is_empty());
}

#[test]
fn test_roster_row_missing_bsa_number_is_skipped() {
    let dir = TempDir::new().unwrap();
    let files = all_files(&dir);
    let report = ValidationOrchestrator::new(&ValidationPolicy::default())
        .validate(&files)
        .unwrap();

    let roster = report.result(FileType::YouthRoster).unwrap();
    assert_eq!(roster.row_count(), 5);
    assert_eq!(roster.valid_rows(), 4);
    assert!(roster.errors().is_empty());
    assert!(roster.is_valid());
    assert_eq!(roster.skipped_records().len(), 1);
    assert_eq!(roster.skipped_records()[0].row, 4);

    assert!(report.overall_valid, "{:?}", report);
    for result in report.results.values() {
        assert_invariants(result);
    }
}

#[test]
fn test_progress_without_status_column_fails_schema() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "progress.csv",
        "bsa_number,merit_badge,start_date,date_completed\n12345678,Camping,2024-01-01,\n",
    );
    let orchestrator = ValidationOrchestrator::new(&ValidationPolicy::default());
    let result = FileValidator::new(orchestrator.rules(FileType::MeritBadgeProgress))
        .validate_path(&path)
        .unwrap();

    assert!(!result.is_valid());
    assert_eq!(result.row_count(), 0);
    assert_eq!(result.errors().len(), 1);
    assert!(result.errors()[0].contains("requirement_status"));
}

#[test]
fn test_validation_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let files = all_files(&dir);
    let orchestrator = ValidationOrchestrator::new(&ValidationPolicy::default());
    assert_eq!(
        orchestrator.validate(&files).unwrap(),
        orchestrator.validate(&files).unwrap()
    );
}

#[test]
fn test_strict_policy_turns_rank_warning_into_error() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "roster.csv",
        "bsa_number,first_name,last_name,rank,activity_status\n12345678,Alex,Smith,Webelos,Active\n",
    );
    let files = BTreeMap::from([(FileType::YouthRoster, path)]);

    let lenient = ValidationOrchestrator::new(&ValidationPolicy::default())
        .validate(&files)
        .unwrap();
    let roster = lenient.result(FileType::YouthRoster).unwrap();
    assert!(roster.is_valid());
    assert_eq!(roster.warnings().len(), 1);
    assert!(roster.warnings()[0].starts_with("Row 2:"));

    let policy = ValidationPolicy {
        unknown_rank: meritbadge_core::Severity::Error,
        ..ValidationPolicy::default()
    };
    let strict = ValidationOrchestrator::new(&policy).validate(&files).unwrap();
    assert!(!strict.overall_valid);
    assert_eq!(strict.total_errors(), 1);
}

#[test]
fn test_import_into_memory_and_query() {
    let dir = TempDir::new().unwrap();
    let files = all_files(&dir);
    let mut store = MemoryStore::new();

    let summary = Importer::new(&ValidationPolicy::default())
        .run(&files, &mut store)
        .unwrap();
    assert!(summary.rejected.is_empty());
    assert_eq!(
        summary.imported[&FileType::YouthRoster],
        UpsertCounts { inserted: 4, updated: 0 }
    );
    assert_eq!(summary.imported[&FileType::MeritBadgeProgress].inserted, 3);

    let adults = store.adults().unwrap();
    assert_eq!(adults[0].merit_badges, vec!["Camping", "Cooking"]);

    let active: Vec<String> = views::active_scouts(&store)
        .unwrap()
        .into_iter()
        .map(|s| s.first_name)
        .collect();
    assert_eq!(active, vec!["Eli", "Bea", "Alex"]);

    let camping = views::scout_progress(&store, "12345678").unwrap();
    assert_eq!(camping[0].merit_badge, "Camping");
    assert_eq!(camping[0].badge_year, Some(2024));

    let unmatched = views::unmatched_progress(&store).unwrap();
    assert_eq!(unmatched.len(), 1);
    assert_eq!(unmatched[0].bsa_number, "99999999");

    let workload = views::counselor_workload(&store, &BTreeMap::new()).unwrap();
    assert_eq!(workload.len(), 1);
    assert_eq!(workload[0].assignments, vec![("Alex Smith".to_string(), "Camping".to_string())]);
    assert_eq!(
        workload[0].adult.as_ref().map(|a| a.bsa_number.as_str()),
        Some("87654321")
    );
}

#[test]
fn test_reimport_into_json_store_updates() {
    let dir = TempDir::new().unwrap();
    let files = all_files(&dir);
    let importer = Importer::new(&ValidationPolicy::default());
    let mut store = JsonStore::open(dir.path().join("db")).unwrap();

    let first = importer.run(&files, &mut store).unwrap();
    let second = importer.run(&files, &mut store).unwrap();

    assert_eq!(first.total_written(), second.total_written());
    assert_eq!(second.imported[&FileType::YouthRoster], UpsertCounts { inserted: 0, updated: 4 });
    assert_eq!(store.scouts().unwrap().len(), 4);
    assert_eq!(store.table_ages().roster_age(), "just now");
}

#[test]
fn test_missing_roster_blocks_overall_but_imports_valid_files() {
    let dir = TempDir::new().unwrap();
    let files = BTreeMap::from([(FileType::AdultRoster, write(&dir, "adults.csv", ADULTS))]);
    let mut store = MemoryStore::new();

    let summary = Importer::new(&ValidationPolicy::default())
        .run(&files, &mut store)
        .unwrap();

    assert!(!summary.report.overall_valid);
    assert_eq!(summary.report.messages.len(), 1);
    assert_eq!(summary.imported[&FileType::AdultRoster].inserted, 1);
}

#[test]
fn test_in_progress_report_without_status_columns_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "in_progress.csv",
        "\"Member ID\",\"Scout First\",\"Scout Last\",\"MBC\",\"Rank\",\"Location\",\"Merit Badge\",\"Date Completed\",\"Requirements\"\n\
         \"12345678\",\"John\",\"Smith\",\"\",\"Tenderfoot\",\"City, ST 12345\",\"Fire Safety (2025)\",\"\",\"5, 5g, 10, 10a\"\n",
    );
    let orchestrator = ValidationOrchestrator::new(&ValidationPolicy::default());
    let result = orchestrator
        .validate_file(FileType::MeritBadgeProgress, &path)
        .unwrap();

    assert!(!result.is_valid());
    assert_eq!(
        result.errors(),
        ["Merit Badge Progress missing required columns: requirement_status, start_date"]
    );
}
