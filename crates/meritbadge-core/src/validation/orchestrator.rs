//! Validation across the whole set of exports supplied for one run.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use super::error::ValidationError;
use super::file::{FileValidator, ValidationResult};
use super::row::Row;
use super::rules::{FileType, RuleSet, ValidationPolicy};

/// Combined outcome for every supplied file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ValidationReport {
    pub overall_valid: bool,
    pub results: BTreeMap<FileType, ValidationResult>,
    /// Run-level problems that belong to no single file.
    pub messages: Vec<String>,
}

impl ValidationReport {
    pub fn result(&self, file_type: FileType) -> Option<&ValidationResult> {
        self.results.get(&file_type)
    }

    /// True if `file_type` was supplied and passed on its own.
    pub fn is_file_valid(&self, file_type: FileType) -> bool {
        self.result(file_type).is_some_and(ValidationResult::is_valid)
    }

    pub fn total_errors(&self) -> usize {
        self.messages.len() + self.results.values().map(|r| r.errors().len()).sum::<usize>()
    }

    pub fn total_warnings(&self) -> usize {
        self.results.values().map(|r| r.warnings().len()).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.results.values().map(|r| r.skipped_records().len()).sum()
    }
}

/// A validation run that also kept the passing rows of every valid file.
#[derive(Debug, Clone)]
pub struct ScannedRun {
    pub report: ValidationReport,
    /// Only files whose own result is valid appear here.
    pub rows: BTreeMap<FileType, Vec<Row>>,
}

pub struct ValidationOrchestrator {
    /// Indexed by `FileType::index()`.
    rules: Vec<RuleSet>,
}

impl ValidationOrchestrator {
    pub fn new(policy: &ValidationPolicy) -> Self {
        Self {
            rules: FileType::ALL
                .iter()
                .map(|ft| RuleSet::for_file_type(*ft, policy))
                .collect(),
        }
    }

    pub fn rules(&self, file_type: FileType) -> &RuleSet {
        &self.rules[file_type.index()]
    }

    pub fn validate_file(
        &self,
        file_type: FileType,
        path: &Path,
    ) -> Result<ValidationResult, ValidationError> {
        FileValidator::new(self.rules(file_type)).validate_path(path)
    }

    /// Validate every supplied file. Files are independent: one failing does
    /// not stop the others from being checked.
    pub fn validate(
        &self,
        files: &BTreeMap<FileType, PathBuf>,
    ) -> Result<ValidationReport, ValidationError> {
        let mut results = BTreeMap::new();
        for (file_type, path) in files {
            results.insert(*file_type, self.validate_file(*file_type, path)?);
        }
        Ok(self.report(results))
    }

    /// Validate like `validate`, keeping the rows of each valid file so they
    /// can be imported without reading the file again.
    pub fn scan(&self, files: &BTreeMap<FileType, PathBuf>) -> Result<ScannedRun, ValidationError> {
        let mut results = BTreeMap::new();
        let mut rows = BTreeMap::new();
        for (file_type, path) in files {
            let scanned = FileValidator::new(self.rules(*file_type)).scan_path(path)?;
            if scanned.result.is_valid() {
                rows.insert(*file_type, scanned.rows);
            }
            results.insert(*file_type, scanned.result);
        }
        Ok(ScannedRun {
            report: self.report(results),
            rows,
        })
    }

    fn report(&self, results: BTreeMap<FileType, ValidationResult>) -> ValidationReport {
        let mut messages = Vec::new();
        for file_type in FileType::ALL.iter().filter(|ft| ft.is_mandatory()) {
            if !results.contains_key(file_type) {
                warn!(file_type = %file_type, "Mandatory file not supplied");
                messages.push(format!("{} file was not provided", file_type.label()));
            }
        }

        let overall_valid = messages.is_empty() && results.values().all(ValidationResult::is_valid);
        info!(
            files = results.len(),
            overall_valid,
            "Validation complete"
        );

        ValidationReport {
            overall_valid,
            results,
            messages,
        }
    }
}
