//! Structured validation diagnostics.
//!
//! Codes are stable and machine-readable (CI, tooling, UI); `field`,
//! `item`, and `context` carry enough of the offending input to be useful
//! to humans without re-running the pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use texblock_core::model::AttrMap;
use texblock_schema::RuleSummary;

/// Stable, machine-readable codes for field validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    /// Field missing while its rule demands presence. Required-class: the
    /// whole item is discarded, not just the field.
    FieldRequired,
    InvalidType,
    ValueNotAllowed,
    InvalidUrl,
    ProtocolNotAllowed,
    HostNotAllowed,
    /// The rule's `before` hook vetoed the value.
    RejectedByHook,
}

/// A single field validation failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub code: IssueCode,
    pub field: String,
    /// Snapshot of the rule the field violated.
    pub rule: RuleSummary,
    /// The offending value (`null` when the field was absent).
    pub item: Value,
    /// The rule-restricted sibling fields of the same item.
    pub context: AttrMap,
}

/// Per-document error report, keyed by field name.
///
/// A report is scoped to a single pipeline call: it is created per
/// invocation and returned with the outcome, never held as shared state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    by_field: BTreeMap<String, Vec<ValidationIssue>>,
}

impl ErrorReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, issue: ValidationIssue) {
        self.by_field
            .entry(issue.field.clone())
            .or_default()
            .push(issue);
    }

    /// True when no issues were recorded.
    pub fn is_valid(&self) -> bool {
        self.by_field.is_empty()
    }

    /// Total number of recorded issues.
    pub fn len(&self) -> usize {
        self.by_field.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_field.is_empty()
    }

    pub fn field_issues(&self, field: &str) -> &[ValidationIssue] {
        self.by_field.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ValidationIssue])> {
        self.by_field
            .iter()
            .map(|(field, issues)| (field.as_str(), issues.as_slice()))
    }

    pub fn merge(&mut self, other: ErrorReport) {
        for (field, issues) in other.by_field {
            self.by_field.entry(field).or_default().extend(issues);
        }
    }
}
