//! CSV validation.
//!
//! Validation runs bottom-up:
//! - `field`: single-cell checks (BSA number, email, phone, dates, enums)
//! - `row`: applies a file's field rules and cross-field checks to one record
//! - `file`: schema check, then every row, folded into a `ValidationResult`
//! - `orchestrator`: every supplied file, combined into a `ValidationReport`
//!
//! Only I/O failures surface as `ValidationError`. Bad data never does.

pub mod error;
pub mod field;
pub mod file;
pub mod orchestrator;
pub mod row;
pub mod rules;

pub use error::ValidationError;
pub use field::{parse_date, FieldOutcome, Severity};
pub use file::{CsvSource, FileValidator, ScannedFile, SkippedRecord, ValidationResult};
pub use orchestrator::{ScannedRun, ValidationOrchestrator, ValidationReport};
pub use row::{validate_row, Row, RowClass, RowOutcome};
pub use rules::{FileType, KeyColumn, RuleSet, ValidationPolicy};
