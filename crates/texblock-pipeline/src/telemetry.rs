//! Deterministic, machine-readable telemetry for normalization runs.
//!
//! Notes:
//! - Contains *no* wall-clock timestamps (to preserve determinism).
//! - Intended for operational monitoring, CI, and corpus analysis.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use texblock_core::sanitize::sanitize_json;

use crate::normalize::NormalizeOutcome;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeTelemetry {
    /// Operation category, currently always "normalize".
    pub op: String,

    /// Whether the run produced a valid (issue-free) report.
    pub ok: bool,

    /// Top-level entries in the raw payload (0 when it did not parse).
    pub blocks_in: usize,

    /// Blocks surviving normalization.
    pub blocks_out: usize,

    /// Blocks dropped by admission, validation, or empty-content pruning.
    pub blocks_dropped: usize,

    /// Total validation issues recorded.
    pub issues: usize,

    /// Distinct fields with at least one issue.
    pub issue_fields: usize,

    /// Output blocks grouped by type.
    pub blocks_by_type: BTreeMap<String, usize>,

    /// Character count of the raw input (when textual input was supplied).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_chars: Option<usize>,

    /// Character count of the canonical serialized output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_chars: Option<usize>,
}

impl NormalizeTelemetry {
    /// Collect counts for one run. `raw` is the original textual payload
    /// when there was one.
    ///
    /// `blocks_in` is counted from the sanitized parse, the same view the
    /// pipeline admitted blocks from; counting the raw text would understate
    /// drops for payloads that only parse after sanitization.
    pub fn collect(raw: Option<&str>, outcome: &NormalizeOutcome) -> Self {
        let blocks_in = raw
            .and_then(sanitize_json)
            .and_then(|s| serde_json::from_str::<Value>(&s).ok())
            .and_then(|v| v.as_array().map(Vec::len))
            .unwrap_or(0)
            .max(outcome.blocks.len());

        let mut blocks_by_type: BTreeMap<String, usize> = BTreeMap::new();
        for block in &outcome.blocks {
            *blocks_by_type.entry(block.kind.clone()).or_insert(0) += 1;
        }

        let output_chars = serde_json::to_string(&outcome.blocks)
            .ok()
            .map(|s| s.chars().count());

        Self {
            op: "normalize".to_string(),
            ok: outcome.report.is_valid(),
            blocks_in,
            blocks_out: outcome.blocks.len(),
            blocks_dropped: blocks_in - outcome.blocks.len(),
            issues: outcome.report.len(),
            issue_fields: outcome.report.iter().count(),
            blocks_by_type,
            input_chars: raw.map(|s| s.chars().count()),
            output_chars,
        }
    }
}
