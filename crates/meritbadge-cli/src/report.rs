//! Terminal summaries and text reports for validation and import runs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use meritbadge_core::utils::truncate_string;
use meritbadge_core::{FileType, ImportSummary, ValidationReport, ValidationResult};

/// How many entries of each list the terminal summary shows.
const SUMMARY_PREVIEW: usize = 3;

/// Messages longer than this are cut in the terminal summary.
const SUMMARY_MESSAGE_WIDTH: usize = 100;

const WIDE_RULE: usize = 80;
const NARROW_RULE: usize = 60;

fn pass_fail(valid: bool) -> &'static str {
    if valid {
        "PASS"
    } else {
        "FAIL"
    }
}

fn preview(lines: &mut Vec<String>, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    lines.push(format!("   {}:", heading));
    for item in items.iter().take(SUMMARY_PREVIEW) {
        lines.push(format!("     {}", truncate_string(item, SUMMARY_MESSAGE_WIDTH)));
    }
    if items.len() > SUMMARY_PREVIEW {
        lines.push(format!("     ... and {} more", items.len() - SUMMARY_PREVIEW));
    }
}

fn counts(lines: &mut Vec<String>, result: &ValidationResult) {
    lines.push(format!("   Rows processed: {}", result.row_count()));
    lines.push(format!("   Valid rows: {}", result.valid_rows()));
    lines.push(format!("   Skipped rows: {}", result.skipped_records().len()));
    lines.push(format!("   Errors: {}", result.errors().len()));
    lines.push(format!("   Warnings: {}", result.warnings().len()));
}

fn skipped_lines(result: &ValidationResult) -> Vec<String> {
    result
        .skipped_records()
        .iter()
        .map(|s| format!("Row {}: {}", s.row, s.reason))
        .collect()
}

/// Short per-file summary for the terminal.
pub fn render_summary(report: &ValidationReport) -> String {
    let mut lines = vec![
        "=".repeat(WIDE_RULE),
        "CSV VALIDATION SUMMARY".to_string(),
        "=".repeat(WIDE_RULE),
    ];

    for (file_type, result) in &report.results {
        lines.push(String::new());
        lines.push(format!("[{}] {}", pass_fail(result.is_valid()), file_type));
        counts(&mut lines, result);
        preview(&mut lines, "Skipped records", &skipped_lines(result));
        preview(&mut lines, "Errors", result.errors());
        preview(&mut lines, "Warnings", result.warnings());
    }

    if !report.messages.is_empty() {
        lines.push(String::new());
        lines.extend(report.messages.iter().map(|m| format!("[FAIL] {}", m)));
    }

    lines.push(String::new());
    lines.push(format!(
        "Totals: {} errors, {} warnings, {} skipped",
        report.total_errors(),
        report.total_warnings(),
        report.total_skipped()
    ));
    lines.push(format!("OVERALL: {}", pass_fail(report.overall_valid)));
    lines.join("\n")
}

/// Full report with every message, for saving to disk.
pub fn render_report(
    report: &ValidationReport,
    unit_name: Option<&str>,
    generated: DateTime<Local>,
) -> String {
    let mut lines = vec![
        "=".repeat(WIDE_RULE),
        "MERIT BADGE MANAGER - CSV VALIDATION REPORT".to_string(),
        "=".repeat(WIDE_RULE),
    ];
    if let Some(unit) = unit_name {
        lines.push(format!("Unit: {}", unit));
    }
    lines.push(format!("Generated: {}", generated.format("%Y-%m-%d %H:%M:%S")));
    lines.push(String::new());
    lines.push(format!("OVERALL STATUS: {}", pass_fail(report.overall_valid)));
    for message in &report.messages {
        lines.push(format!("  {}", message));
    }

    for file_type in FileType::ALL {
        let Some(result) = report.result(file_type) else {
            continue;
        };
        lines.push(String::new());
        lines.push("-".repeat(NARROW_RULE));
        lines.push(format!("{} VALIDATION", file_type.label().to_uppercase()));
        lines.push("-".repeat(NARROW_RULE));
        lines.push(format!("Status: {}", pass_fail(result.is_valid())));
        counts(&mut lines, result);

        for (heading, items) in [
            ("SKIPPED RECORDS", skipped_lines(result)),
            ("ERRORS", result.errors().to_vec()),
            ("WARNINGS", result.warnings().to_vec()),
        ] {
            if items.is_empty() {
                continue;
            }
            lines.push(String::new());
            lines.push(format!("{}:", heading));
            lines.extend(items.iter().enumerate().map(|(i, item)| format!("  {}. {}", i + 1, item)));
        }
    }

    lines.push(String::new());
    lines.push("=".repeat(WIDE_RULE));
    lines.join("\n") + "\n"
}

/// Write the full report to `dir` under a timestamped name.
pub fn write_report(report: &ValidationReport, dir: &Path, unit_name: Option<&str>) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create report directory: {}", dir.display()))?;
    let now = Local::now();
    let path = dir.join(format!("validation_report_{}.txt", now.format("%Y%m%d_%H%M%S")));
    std::fs::write(&path, render_report(report, unit_name, now))
        .with_context(|| format!("Failed to write report: {}", path.display()))?;
    Ok(path)
}

pub fn render_import(summary: &ImportSummary, dry_run: bool) -> String {
    let mut lines = vec![String::new()];
    lines.push(if dry_run {
        "IMPORT (dry run, nothing saved)".to_string()
    } else {
        "IMPORT".to_string()
    });
    for (file_type, counts) in &summary.imported {
        lines.push(format!(
            "   {}: {} inserted, {} updated",
            file_type, counts.inserted, counts.updated
        ));
    }
    for file_type in &summary.rejected {
        lines.push(format!("   {}: not imported (failed validation)", file_type));
    }
    if summary.imported.is_empty() && summary.rejected.is_empty() {
        lines.push("   Nothing to import".to_string());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use meritbadge_core::{ValidationOrchestrator, ValidationPolicy};
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn sample_report(dir: &TempDir) -> ValidationReport {
        let roster = dir.path().join("roster.csv");
        std::fs::write(
            &roster,
            "bsa_number,first_name,last_name,rank,activity_status\n\
             12345678,Alex,Smith,Webelos,Active\n\
             ,Bea,Jones,Scout,Active\n\
             12ab,Cal,Brown,Scout,Active\n",
        )
        .unwrap();
        let files = BTreeMap::from([(FileType::YouthRoster, roster)]);
        ValidationOrchestrator::new(&ValidationPolicy::default())
            .validate(&files)
            .unwrap()
    }

    #[test]
    fn test_summary_lists_counts_and_status() {
        let dir = TempDir::new().unwrap();
        let summary = render_summary(&sample_report(&dir));
        assert!(summary.contains("[FAIL] Youth Roster"));
        assert!(summary.contains("Rows processed: 3"));
        assert!(summary.contains("Valid rows: 1"));
        assert!(summary.contains("Skipped rows: 1"));
        assert!(summary.contains("Row 4: bsa_number: Invalid BSA number format '12ab'"));
        assert!(summary.ends_with("OVERALL: FAIL"));
    }

    #[test]
    fn test_report_written_with_timestamped_name() {
        let dir = TempDir::new().unwrap();
        let report = sample_report(&dir);
        let path = write_report(&report, &dir.path().join("logs"), Some("Troop 12")).unwrap();

        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("validation_report_"));
        assert!(name.ends_with(".txt"));

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("Unit: Troop 12"));
        assert!(contents.contains("YOUTH ROSTER VALIDATION"));
        assert!(contents.contains("  1. Row 3: Missing BSA number"));
        assert!(contents.contains("WARNINGS:"));
    }
}
