pub mod diagnostics;
pub mod merge;
pub mod normalize;
pub mod telemetry;
pub mod validate;

pub use diagnostics::{ErrorReport, IssueCode, ValidationIssue};
pub use merge::merge_similar;
pub use normalize::{
    NormalizeError, NormalizeOptions, NormalizeOutcome, normalize_str, normalize_value,
};
pub use telemetry::NormalizeTelemetry;
pub use validate::{RuleOutcome, apply_rules, filter_with_rules};
