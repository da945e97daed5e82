//! Recursive tree validation and normalization.
//!
//! Turns an arbitrary nested JSON value into a canonical block tree:
//! structurally ineligible blocks are silently dropped, declared fields are
//! rule-checked (issues land in the per-call report), content is escaped
//! and trimmed, and adjacent similar siblings are consolidated.
//!
//! Nothing here throws on malformed *content*. The only failure surface is
//! malformed *transport encoding*, and only when `dev` mode asks for it.

use std::fmt;

use serde_json::Value;

use texblock_core::escape::escape_html;
use texblock_core::model::{AttrMap, Block, ElementNode, Node};
use texblock_core::sanitize::{sanitize_json, sanitize_json_value, strip_control_characters};
use texblock_schema::{ContentTypeSchema, RuleSet, SchemaRegistry};

use crate::diagnostics::ErrorReport;
use crate::merge::merge_similar;
use crate::validate::filter_with_rules;

/// Pipeline options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Surface transport failures as `NormalizeError::InvalidInputFormat`
    /// instead of silently producing an empty document.
    pub dev: bool,
}

/// Canonical document plus the validation report for the run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizeOutcome {
    pub blocks: Vec<Block>,
    pub report: ErrorReport,
}

impl NormalizeOutcome {
    pub fn is_valid(&self) -> bool {
        self.report.is_valid()
    }
}

/// Transport-level failure: the input could not be decoded into structured
/// data. Raised only in dev mode; callers should translate it into a
/// 4xx-style rejection at their boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    InvalidInputFormat,
}

impl fmt::Display for NormalizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizeError::InvalidInputFormat => {
                write!(f, "input is not valid JSON block data")
            }
        }
    }
}

impl std::error::Error for NormalizeError {}

/// Normalize a textual payload.
///
/// Sanitization or parse failure yields an empty document, or
/// `InvalidInputFormat` when `opts.dev` is set.
pub fn normalize_str(
    raw: &str,
    registry: &SchemaRegistry,
    opts: NormalizeOptions,
) -> Result<NormalizeOutcome, NormalizeError> {
    let Some(cleaned) = sanitize_json(raw) else {
        return if opts.dev {
            Err(NormalizeError::InvalidInputFormat)
        } else {
            Ok(NormalizeOutcome::default())
        };
    };

    match serde_json::from_str::<Value>(&cleaned) {
        Ok(value) => Ok(normalize_parsed(&value, registry)),
        // sanitize_json re-serializes, so this only fires on internal
        // disagreement; treat it like any other transport failure.
        Err(_) if opts.dev => Err(NormalizeError::InvalidInputFormat),
        Err(_) => Ok(NormalizeOutcome::default()),
    }
}

/// Normalize an already-structured payload. Structured input has no
/// transport encoding to fail on, so this is total.
pub fn normalize_value(value: &Value, registry: &SchemaRegistry) -> NormalizeOutcome {
    let Some(cleaned) = sanitize_json_value(value) else {
        return NormalizeOutcome::default();
    };
    match serde_json::from_str::<Value>(&cleaned) {
        Ok(parsed) => normalize_parsed(&parsed, registry),
        Err(_) => NormalizeOutcome::default(),
    }
}

fn normalize_parsed(value: &Value, registry: &SchemaRegistry) -> NormalizeOutcome {
    let mut outcome = NormalizeOutcome::default();

    let Some(raw_blocks) = value.as_array() else {
        return outcome;
    };

    for raw in raw_blocks {
        let Some(prepared) = prepare_block(raw, registry) else {
            continue;
        };
        // Admission guarantees the schema exists.
        let Some(schema) = prepared
            .get("type")
            .and_then(Value::as_str)
            .and_then(|name| registry.get(name))
        else {
            continue;
        };
        if let Some(block) = process_block(prepared, schema, &mut outcome.report) {
            outcome.blocks.push(block);
        }
    }

    outcome
}

/// Stage A + B: structural admission and key pruning.
///
/// A raw block is eligible only if it is a mapping with a string `type`
/// resolvable in the registry and a non-empty array `data`. Ineligible
/// blocks are dropped silently; this is a shape prefilter, not a validated
/// field. Admitted blocks keep only the keys their structure rules declare.
fn prepare_block(raw: &Value, registry: &SchemaRegistry) -> Option<AttrMap> {
    let map = raw.as_object()?;
    let kind = map.get("type")?.as_str()?;
    let schema = registry.get(kind)?;
    let data = map.get("data")?.as_array()?;
    if data.is_empty() {
        return None;
    }

    let pruned = map
        .iter()
        .filter(|(key, _)| schema.block_structure.contains_key(key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    Some(pruned)
}

/// Stage C–E for one admitted block.
fn process_block(
    mut block: AttrMap,
    schema: &ContentTypeSchema,
    report: &mut ErrorReport,
) -> Option<Block> {
    if schema.remove_control_characters {
        scrub_block_data(&mut block);
    }

    let (fields, children) = if schema.custom_block_structure {
        process_custom_block(&block, schema, report)?
    } else {
        (block.clone(), process_default_children(&block, schema, report))
    };

    // Empty result drops the whole block; this is the terminal condition,
    // not an error.
    if children.is_empty() {
        return None;
    }
    let children = merge_similar(children, schema);

    let kind = fields.get("type")?.as_str()?.to_string();
    let attr = match fields.get("attr") {
        Some(Value::Object(map)) => map.clone(),
        _ => AttrMap::new(),
    };
    let extra = fields
        .iter()
        .filter(|(key, _)| !matches!(key.as_str(), "type" | "data" | "attr"))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Some(Block {
        kind,
        data: children,
        attr,
        extra,
    })
}

/// Run the narrow control-character cleaner over the serialized block body.
/// A body that no longer parses afterwards is treated as empty.
fn scrub_block_data(block: &mut AttrMap) {
    let Some(data) = block.get("data") else {
        return;
    };
    let scrubbed = serde_json::to_string(data)
        .ok()
        .map(|s| strip_control_characters(&s))
        .and_then(|s| serde_json::from_str::<Value>(&s).ok());

    match scrubbed {
        Some(value @ Value::Array(_)) => {
            block.insert("data".into(), value);
        }
        _ => {
            block.remove("data");
        }
    }
}

/// Default processing: every `data` entry goes through primary-child or
/// regular item handling.
fn process_default_children(
    block: &AttrMap,
    schema: &ContentTypeSchema,
    report: &mut ErrorReport,
) -> Vec<Node> {
    let Some(Value::Array(items)) = block.get("data") else {
        return Vec::new();
    };

    let mut children = Vec::new();
    for item in items {
        let node = if schema.primary_child_types.is_empty() {
            process_item(item, schema, report)
        } else {
            process_primary_child(item, schema, report)
        };
        if let Some(node) = node {
            children.push(node);
        }
    }
    children
}

/// A primary child (e.g. a list's `li`) is validated against the block-level
/// rules, not the item rules, and then recursed item by item.
fn process_primary_child(
    item: &Value,
    schema: &ContentTypeSchema,
    report: &mut ErrorReport,
) -> Option<Node> {
    let map = item.as_object()?;
    let kind = map.get("type")?.as_str()?;
    if kind.is_empty() || !schema.is_primary_child(kind) {
        return None;
    }

    let filtered = filter_with_rules(map, &schema.block_structure, report)?;

    let mut children = Vec::new();
    if let Some(Value::Array(items)) = filtered.get("data") {
        for sub in items {
            if let Some(node) = process_item(sub, schema, report) {
                children.push(node);
            }
        }
    }
    if children.is_empty() {
        return None;
    }

    let attr = match filtered.get("attr") {
        Some(Value::Object(map)) => map.clone(),
        _ => AttrMap::new(),
    };

    Some(Node::Element(ElementNode {
        kind: kind.to_string(),
        data: children,
        attr,
    }))
}

/// Custom-structure block: top-level fields are rule-filtered; items are
/// either rule-filtered records (custom item structure) or fall back to
/// default child processing.
fn process_custom_block(
    block: &AttrMap,
    schema: &ContentTypeSchema,
    report: &mut ErrorReport,
) -> Option<(AttrMap, Vec<Node>)> {
    let filtered = filter_with_rules(block, &schema.block_structure, report)?;

    if !schema.custom_item_structure {
        let children = process_default_children(&filtered, schema, report);
        return Some((filtered, children));
    }

    let mut children = Vec::new();
    if let Some(Value::Array(items)) = filtered.get("data") {
        for item in items {
            let Some(map) = item.as_object() else {
                continue;
            };
            let Some(kept) = filter_with_rules(map, &schema.item_structure, report) else {
                continue;
            };
            let kept = match &schema.each_item {
                Some(hook) => hook(kept),
                None => kept,
            };
            children.push(Node::Record(kept));
        }
    }

    Some((filtered, children))
}

/// Stage D: a string item is a text node, a mapping is an element node,
/// anything else fails shape admission and is dropped.
fn process_item(item: &Value, schema: &ContentTypeSchema, report: &mut ErrorReport) -> Option<Node> {
    match item {
        Value::String(text) => process_text_item(text, schema),
        Value::Object(map) => process_element_item(map, schema, report),
        _ => None,
    }
}

/// Text rule: optionally escape, then trim; empty results yield no node.
fn process_text_item(text: &str, schema: &ContentTypeSchema) -> Option<Node> {
    let processed = if schema.escape_text {
        escape_html(text)
    } else {
        text.to_string()
    };
    let trimmed = processed.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(Node::Text(trimmed.to_string()))
    }
}

/// Element rule: type must be a non-empty member of `allowed_tags`, declared
/// attributes must survive their rules (a required-class failure discards
/// the element), and recursion plus merging must leave at least one child.
fn process_element_item(
    map: &AttrMap,
    schema: &ContentTypeSchema,
    report: &mut ErrorReport,
) -> Option<Node> {
    let kind = map.get("type")?.as_str()?;
    if kind.is_empty() || !schema.allows_tag(kind) {
        return None;
    }

    let has_data = matches!(map.get("data"), Some(Value::Array(items)) if !items.is_empty());
    let has_attr = matches!(map.get("attr"), Some(Value::Object(attrs)) if !attrs.is_empty());
    if !has_data && !has_attr {
        return None;
    }

    let empty_rules = RuleSet::new();
    let attr = match map.get("attr") {
        Some(Value::Object(attrs)) => {
            let rules = schema.attribute_rules(kind).unwrap_or(&empty_rules);
            filter_with_rules(attrs, rules, report)?
        }
        _ => AttrMap::new(),
    };

    let mut children = Vec::new();
    if let Some(Value::Array(items)) = map.get("data") {
        for sub in items {
            if let Some(node) = process_item(sub, schema, report) {
                children.push(node);
            }
        }
    }

    let children = merge_similar(children, schema);
    if children.is_empty() {
        return None;
    }

    Some(Node::Element(ElementNode {
        kind: kind.to_string(),
        data: children,
        attr,
    }))
}
