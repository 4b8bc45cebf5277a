//! Whole-file validation.
//!
//! A file is read once, top to bottom. Schema problems abort before any row is
//! looked at; row problems are folded into the result and the scan continues.
//! Rows are numbered by the line their record starts on, so a quoted cell
//! spanning lines does not shift later numbers.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use serde::Serialize;
use tracing::{debug, info};

use super::error::ValidationError;
use super::field::Severity;
use super::row::{validate_row, Row, RowClass, RowOutcome};
use super::rules::{FileType, RuleSet};

/// Spreadsheet row of the first data record (the header is row 1).
pub const FIRST_DATA_ROW: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct SkippedRecord {
    pub row: usize,
    pub reason: String,
}

/// Outcome of validating one file. Built once by the validator; read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ValidationResult {
    file_type: FileType,
    is_valid: bool,
    row_count: usize,
    valid_rows: usize,
    error_rows: usize,
    errors: Vec<String>,
    warnings: Vec<String>,
    skipped_records: Vec<SkippedRecord>,
}

impl ValidationResult {
    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    /// True iff no errors were recorded.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Rows classified Valid or Warning.
    pub fn valid_rows(&self) -> usize {
        self.valid_rows
    }

    /// Rows that produced at least one error.
    pub fn error_rows(&self) -> usize {
        self.error_rows
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn skipped_records(&self) -> &[SkippedRecord] {
        &self.skipped_records
    }

    pub fn has_issues(&self) -> bool {
        !self.errors.is_empty() || !self.warnings.is_empty() || !self.skipped_records.is_empty()
    }
}

/// A validated file together with the rows that passed, in file order.
///
/// `rows` is empty unless `result` is valid, so a file with errors can never
/// be imported from it.
#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub result: ValidationResult,
    pub rows: Vec<Row>,
}

/// Running totals while a file is scanned.
struct Tally {
    file_type: FileType,
    row_count: usize,
    valid_rows: usize,
    error_rows: usize,
    errors: Vec<String>,
    warnings: Vec<String>,
    skipped_records: Vec<SkippedRecord>,
    /// Unique key -> row of first occurrence.
    seen: HashMap<String, usize>,
    /// Rows counted as valid, kept when the caller wants to import them.
    accepted: Option<Vec<Row>>,
}

impl Tally {
    fn new(file_type: FileType) -> Self {
        Self {
            file_type,
            row_count: 0,
            valid_rows: 0,
            error_rows: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
            skipped_records: Vec::new(),
            seen: HashMap::new(),
            accepted: None,
        }
    }

    fn keeping_rows(mut self) -> Self {
        self.accepted = Some(Vec::new());
        self
    }

    fn duplicate_of(&mut self, row_number: usize, row: &Row, rules: &RuleSet) -> Option<RowOutcome> {
        if row.get(rules.identity_column).is_empty() {
            return None;
        }
        let key = rules.record_key(row);

        match self.seen.get(&key) {
            Some(first) => {
                let described = rules
                    .unique_key
                    .iter()
                    .map(|key| format!("{} '{}'", key.column, row.get(key.column)))
                    .collect::<Vec<_>>()
                    .join(", ");
                Some(RowOutcome::skipped(format!(
                    "Duplicate {} (first occurrence: row {})",
                    described, first
                )))
            }
            None => {
                self.seen.insert(key, row_number);
                None
            }
        }
    }

    fn fold(&mut self, row_number: usize, row: Row, rules: &RuleSet) {
        let outcome = self
            .duplicate_of(row_number, &row, rules)
            .unwrap_or_else(|| validate_row(&row, rules));
        if outcome.counts_as_valid() {
            if let Some(accepted) = self.accepted.as_mut() {
                accepted.push(row);
            }
        }
        self.fold_outcome(row_number, outcome);
    }

    fn fold_outcome(&mut self, row_number: usize, outcome: RowOutcome) {
        self.row_count += 1;

        for message in &outcome.messages {
            let text = format!("Row {}: {}: {}", row_number, message.column, message.message);
            match message.severity {
                Severity::Error => self.errors.push(text),
                Severity::Warning => self.warnings.push(text),
                Severity::Valid => {}
            }
        }

        match outcome.class {
            RowClass::Valid | RowClass::Warning => self.valid_rows += 1,
            RowClass::Error => self.error_rows += 1,
            RowClass::Skipped(reason) => {
                debug!(row = row_number, reason = %reason, "Skipped row");
                self.skipped_records.push(SkippedRecord {
                    row: row_number,
                    reason,
                });
            }
        }
    }

    /// A record the CSV reader could not decode.
    fn unreadable(&mut self, row_number: usize, err: &csv::Error) {
        self.row_count += 1;
        self.error_rows += 1;
        self.errors
            .push(format!("Row {}: record could not be read: {}", row_number, err));
    }

    /// Rows are only handed out for a file with no errors.
    fn finish_with_rows(mut self) -> ScannedFile {
        let rows = self.accepted.take().unwrap_or_default();
        let result = self.finish();
        ScannedFile {
            rows: if result.is_valid() { rows } else { Vec::new() },
            result,
        }
    }

    fn finish(self) -> ValidationResult {
        ValidationResult {
            file_type: self.file_type,
            is_valid: self.errors.is_empty(),
            row_count: self.row_count,
            valid_rows: self.valid_rows,
            error_rows: self.error_rows,
            errors: self.errors,
            warnings: self.warnings,
            skipped_records: self.skipped_records,
        }
    }
}

/// A CSV export with its headings mapped to canonical column names.
pub struct CsvSource<R: Read> {
    reader: csv::Reader<R>,
    columns: Vec<String>,
}

impl CsvSource<File> {
    pub fn open(path: &Path, rules: &RuleSet) -> Result<Self, ValidationError> {
        let file = File::open(path)
            .map_err(|e| ValidationError::open(rules.file_type, path.to_path_buf(), e))?;
        Self::from_reader(file, rules)
    }
}

impl<R: Read> CsvSource<R> {
    pub fn from_reader(input: R, rules: &RuleSet) -> Result<Self, ValidationError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(input);

        // Headings are decoded lossily so a stray byte cannot hide the schema.
        let columns = reader
            .byte_headers()
            .map_err(|e| ValidationError::io(rules.file_type, e.into()))?
            .iter()
            .map(|h| rules.canonical_column(&String::from_utf8_lossy(h)))
            .collect();

        Ok(Self { reader, columns })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Data rows paired with the line each record starts on (the header is line 1).
    pub fn rows(&mut self) -> impl Iterator<Item = (usize, Result<Row, csv::Error>)> + '_ {
        let columns = &self.columns;
        self.reader
            .records()
            .enumerate()
            .map(move |(idx, record)| {
                let counted = idx + FIRST_DATA_ROW;
                match record {
                    Ok(r) => (
                        line_of(r.position(), counted),
                        Ok(Row::from_record(columns, &r)),
                    ),
                    Err(err) => (line_of(err.position(), counted), Err(err)),
                }
            })
    }
}

fn line_of(position: Option<&csv::Position>, counted: usize) -> usize {
    position
        .and_then(|p| usize::try_from(p.line()).ok())
        .unwrap_or(counted)
}

/// Validates files of one type against its rule set.
pub struct FileValidator<'a> {
    rules: &'a RuleSet,
}

impl<'a> FileValidator<'a> {
    pub fn new(rules: &'a RuleSet) -> Self {
        Self { rules }
    }

    /// Validate a file on disk. Only I/O problems are returned as errors.
    pub fn validate_path(&self, path: &Path) -> Result<ValidationResult, ValidationError> {
        let source = CsvSource::open(path, self.rules)?;
        let result = self.scan_source(source, Tally::new(self.rules.file_type))?.finish();
        self.log_result(path, &result);
        Ok(result)
    }

    /// Validate a file on disk and keep the rows that passed, for import.
    pub fn scan_path(&self, path: &Path) -> Result<ScannedFile, ValidationError> {
        let source = CsvSource::open(path, self.rules)?;
        let scanned = self
            .scan_source(source, Tally::new(self.rules.file_type).keeping_rows())?
            .finish_with_rows();
        self.log_result(path, &scanned.result);
        Ok(scanned)
    }

    pub fn validate_reader<R: Read>(&self, input: R) -> Result<ValidationResult, ValidationError> {
        let source = CsvSource::from_reader(input, self.rules)?;
        Ok(self.scan_source(source, Tally::new(self.rules.file_type))?.finish())
    }

    pub fn scan_reader<R: Read>(&self, input: R) -> Result<ScannedFile, ValidationError> {
        let source = CsvSource::from_reader(input, self.rules)?;
        Ok(self
            .scan_source(source, Tally::new(self.rules.file_type).keeping_rows())?
            .finish_with_rows())
    }

    fn log_result(&self, path: &Path, result: &ValidationResult) {
        info!(
            file_type = %self.rules.file_type,
            path = %path.display(),
            rows = result.row_count(),
            valid = result.valid_rows(),
            errors = result.errors().len(),
            warnings = result.warnings().len(),
            skipped = result.skipped_records().len(),
            "Validated file"
        );
    }

    fn scan_source<R: Read>(
        &self,
        mut source: CsvSource<R>,
        mut tally: Tally,
    ) -> Result<Tally, ValidationError> {
        let file_type = self.rules.file_type;
        let label = file_type.label();

        if source.columns().iter().all(|c| c.is_empty()) {
            tally
                .errors
                .push(format!("{} file is empty or has no header row", label));
            return Ok(tally);
        }

        let missing = self.rules.missing_columns(source.columns());
        if !missing.is_empty() {
            debug!(file_type = %file_type, missing = ?missing, "Schema mismatch");
            tally
                .errors
                .push(format!("{} missing required columns: {}", label, missing.join(", ")));
            return Ok(tally);
        }

        let unexpected: Vec<&str> = source
            .columns()
            .iter()
            .filter(|c| !c.is_empty() && !self.rules.is_known_column(c))
            .map(String::as_str)
            .collect();
        if !unexpected.is_empty() {
            tally
                .warnings
                .push(format!("{} has unexpected columns: {}", label, unexpected.join(", ")));
        }

        for (row_number, record) in source.rows() {
            match record {
                Ok(row) => tally.fold(row_number, row, self.rules),
                Err(err) if err.is_io_error() => {
                    return Err(ValidationError::io(file_type, err.into()));
                }
                Err(err) => tally.unreadable(row_number, &err),
            }
        }

        if tally.row_count == 0 {
            tally
                .warnings
                .push(format!("{} file contains only headers, no data rows", label));
        }

        Ok(tally)
    }
}
