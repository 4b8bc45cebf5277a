//! Per-row validation.

use std::collections::HashMap;

use csv::StringRecord;

use crate::models::RequirementStatus;

use super::field::{check_field, parse_date, Severity};
use super::rules::{CrossCheck, RuleSet};

/// One CSV record keyed by canonical column name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    values: HashMap<String, String>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair canonical column names with the cells of a record.
    /// Short records leave the trailing columns empty.
    pub fn from_record(columns: &[String], record: &StringRecord) -> Self {
        columns
            .iter()
            .enumerate()
            .map(|(idx, column)| (column.clone(), record.get(idx).unwrap_or("").to_string()))
            .collect()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.values.insert(column.into(), value.into());
    }

    /// Trimmed cell text, or `""` when the column is absent.
    pub fn get(&self, column: &str) -> &str {
        self.values.get(column).map(|v| v.trim()).unwrap_or("")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowClass {
    Valid,
    Warning,
    Error,
    /// Cannot be attributed to any scout; carries the reason.
    Skipped(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowMessage {
    pub severity: Severity,
    pub column: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowOutcome {
    pub class: RowClass,
    pub messages: Vec<RowMessage>,
}

impl RowOutcome {
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            class: RowClass::Skipped(reason.into()),
            messages: Vec::new(),
        }
    }

    fn from_messages(messages: Vec<RowMessage>) -> Self {
        let worst = messages
            .iter()
            .map(|m| m.severity)
            .max()
            .unwrap_or(Severity::Valid);
        let class = match worst {
            Severity::Valid => RowClass::Valid,
            Severity::Warning => RowClass::Warning,
            Severity::Error => RowClass::Error,
        };
        Self { class, messages }
    }

    /// Valid and Warning rows count towards `valid_rows`.
    pub fn counts_as_valid(&self) -> bool {
        matches!(self.class, RowClass::Valid | RowClass::Warning)
    }

    pub fn messages_with(&self, severity: Severity) -> impl Iterator<Item = &RowMessage> {
        self.messages.iter().filter(move |m| m.severity == severity)
    }
}

fn cross_check(check: &CrossCheck, row: &Row) -> Option<RowMessage> {
    match check {
        CrossCheck::DateOrder {
            earlier,
            later,
            severity,
        } => {
            let start = parse_date(row.get(earlier))?;
            let end = parse_date(row.get(later))?;
            (end < start).then(|| RowMessage {
                severity: *severity,
                column: *later,
                message: format!("{} ({}) precedes {} ({})", later, end, earlier, start),
            })
        }
        CrossCheck::CompletedHasDate {
            status,
            completed,
            severity,
        } => {
            let recognized = RequirementStatus::recognize(row.get(status))?;
            (recognized.is_completed() && row.get(completed).is_empty()).then(|| RowMessage {
                severity: *severity,
                column: *completed,
                message: format!("Status is '{}' but no completion date is recorded", recognized),
            })
        }
    }
}

/// Apply every rule of `rules` to `row` and classify it.
///
/// All problems are collected; nothing short-circuits except the identity
/// check, which skips rows that name no scout at all.
pub fn validate_row(row: &Row, rules: &RuleSet) -> RowOutcome {
    if row.get(rules.identity_column).is_empty() {
        return RowOutcome::skipped(format!(
            "Missing {}; row cannot be attributed to any record",
            rules.identity_label
        ));
    }

    let mut messages: Vec<RowMessage> = rules
        .fields
        .iter()
        .filter_map(|rule| {
            let outcome = check_field(rule, row.get(rule.column));
            outcome.message.map(|message| RowMessage {
                severity: outcome.severity,
                column: rule.column,
                message,
            })
        })
        .collect();

    messages.extend(rules.cross_checks.iter().filter_map(|check| cross_check(check, row)));

    RowOutcome::from_messages(messages)
}
