//! `texblock-io` is the single supported public entrypoint for the block
//! document pipeline: sanitization, schema-driven normalization, and markup
//! emission.
//!
//! This crate intentionally contains **no** storage, transport, or editor
//! logic. Those belong in higher layers. `texblock-io` focuses on:
//! - stable document types
//! - canonical JSON
//! - normalization / rendering helpers

// -----------------------------------------------------------------------------
// Public API contract
// -----------------------------------------------------------------------------
//
// Consumers SHOULD import from `texblock_io::prelude::*`.
// Anything not re-exported via the prelude is considered internal and may change
// without notice.

// Re-export the canonical document model.
#[doc(hidden)]
pub mod core {
    pub use texblock_core::escape::escape_html;
    pub use texblock_core::model::{AttrMap, Block, ElementNode, Node};
    pub use texblock_core::sanitize::{sanitize_json, sanitize_json_value, strip_control_characters};
}

/// Deterministic JSON canonicalization helpers.
///
/// These utilities produce stable bytes for storage and comparison.
pub mod canonical_json;

// Re-export schema construction + the builtin registry.
#[doc(hidden)]
pub mod schema {
    pub use texblock_schema::builtin;
    pub use texblock_schema::{
        ContentTypeSchema, ItemHook, RenderHook, Rule, RuleSet, RuleSummary, SchemaRegistry,
        ValueType,
    };
}

// Re-export the normalization pipeline + diagnostics.
#[doc(hidden)]
pub mod pipeline {
    pub use texblock_pipeline::{
        ErrorReport, IssueCode, NormalizeError, NormalizeOptions, NormalizeOutcome,
        NormalizeTelemetry, ValidationIssue, merge_similar, normalize_str, normalize_value,
    };
}

// Re-export the markup emitter.
#[doc(hidden)]
pub mod html {
    pub use texblock_html::{RenderNames, render_document};
}

/// Convenience prelude for consumers.
///
/// This is the **only supported** import surface for external users.
pub mod prelude {
    pub use crate::canonical_json;
    pub use crate::core::{AttrMap, Block, ElementNode, Node};
    pub use crate::html::{RenderNames, render_document};
    pub use crate::pipeline::{
        ErrorReport, IssueCode, NormalizeError, NormalizeOptions, NormalizeOutcome,
        NormalizeTelemetry, ValidationIssue, normalize_str, normalize_value,
    };
    pub use crate::schema::{ContentTypeSchema, Rule, RuleSet, SchemaRegistry, ValueType};
}
