//! Merit badge roster and progress import.
//!
//! Validates unit CSV exports (youth roster, adult roster, merit badge
//! progress), imports the files that pass into a record store, and answers
//! read-only queries over what was imported. Counselor names from progress
//! exports are linked to adult roster entries by `matching`.

pub mod config;
pub mod import;
pub mod matching;
pub mod models;
pub mod store;
pub mod utils;
pub mod validation;
pub mod views;

pub use config::Config;
pub use import::{ImportError, ImportSummary, Importer};
pub use store::{JsonStore, MemoryStore, RecordStore, StoreError, UpsertCounts};
pub use validation::{
    FileType, FileValidator, Severity, ValidationError, ValidationOrchestrator, ValidationPolicy,
    ValidationReport, ValidationResult,
};
