//! Per-block-type policy records.
//!
//! The original design dispatched on block subtypes; here policy is plain
//! data: a `ContentTypeSchema` value plus a small closed set of flags
//! (`custom_block_structure`, `custom_item_structure`, `custom_render`)
//! selecting among a fixed set of processing strategies. The "custom item"
//! hook is an explicit function value stored on the record.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use regex::Regex;

use texblock_core::model::{AttrMap, Block};

use crate::rule::{Rule, RuleSet, ValueType};

/// Per-item customization hook for custom-structure blocks. Receives the
/// rule-filtered item mapping and returns the version to keep.
pub type ItemHook = Arc<dyn Fn(AttrMap) -> AttrMap + Send + Sync>;

/// Renderer hook for blocks flagged `custom_render`.
pub type RenderHook = Arc<dyn Fn(&Block, &ContentTypeSchema) -> String + Send + Sync>;

/// Immutable policy record for one block type.
///
/// Read-only during a pipeline run; the registry hands out shared
/// references, so construction must finish before normalization starts.
#[derive(Clone)]
pub struct ContentTypeSchema {
    /// Name identifying this type in input data.
    pub input_name: String,
    /// Tag name used when rendering this block.
    pub output_name: String,
    /// HTML-escape text content.
    pub escape_text: bool,
    /// Consolidate adjacent similar siblings.
    pub merge_similar: bool,
    /// Run the narrow control-character cleaner over the block body.
    pub remove_control_characters: bool,
    /// Whitespace-significant content (e.g. code).
    pub preformatted: bool,
    /// Element types permitted inside this block's content.
    pub allowed_tags: Vec<String>,
    /// Child types singled out for structural processing (e.g. `li`).
    pub primary_child_types: Vec<String>,
    /// Rules for the block's own top-level fields.
    pub block_structure: RuleSet,
    /// Rules for custom-structure items.
    pub item_structure: RuleSet,
    /// Attribute rules per allowed tag.
    pub tag_attribute_rules: BTreeMap<String, RuleSet>,
    pub custom_block_structure: bool,
    pub custom_item_structure: bool,
    pub custom_render: bool,
    pub each_item: Option<ItemHook>,
    pub render_block: Option<RenderHook>,
    /// Resource allowlists consumed when building item rules.
    pub source_protocols: Vec<String>,
    pub source_hosts: Vec<String>,
    pub source_mime_types: Vec<String>,
    pub source_regex: Vec<Regex>,
    /// Additional CSS classes for render hooks.
    pub css_classes: String,
}

impl Default for ContentTypeSchema {
    fn default() -> Self {
        Self {
            input_name: String::new(),
            output_name: String::new(),
            escape_text: true,
            merge_similar: true,
            remove_control_characters: false,
            preformatted: false,
            allowed_tags: default_allowed_tags(),
            primary_child_types: Vec::new(),
            block_structure: default_block_structure(),
            item_structure: RuleSet::new(),
            tag_attribute_rules: default_tag_attribute_rules(),
            custom_block_structure: false,
            custom_item_structure: false,
            custom_render: false,
            each_item: None,
            render_block: None,
            source_protocols: vec!["https".into(), "http".into(), "ftp".into()],
            source_hosts: Vec::new(),
            source_mime_types: Vec::new(),
            source_regex: Vec::new(),
            css_classes: String::new(),
        }
    }
}

impl ContentTypeSchema {
    pub fn named(input_name: &str, output_name: &str) -> Self {
        Self {
            input_name: input_name.to_string(),
            output_name: output_name.to_string(),
            ..Self::default()
        }
    }

    pub fn allows_tag(&self, tag: &str) -> bool {
        self.allowed_tags.iter().any(|t| t == tag)
    }

    pub fn is_primary_child(&self, tag: &str) -> bool {
        self.primary_child_types.iter().any(|t| t == tag)
    }

    /// Attribute rules for one tag. Tags without declared rules get an empty
    /// rule set, which keeps no attributes.
    pub fn attribute_rules(&self, tag: &str) -> Option<&RuleSet> {
        self.tag_attribute_rules.get(tag)
    }

    /// Build the URL rule for custom items from the source allowlists.
    ///
    /// Each non-empty allowlist contributes its own check; a configured
    /// `source_regex` list becomes a `before` hook that accepts a value as
    /// soon as the first pattern matches.
    pub fn item_url_rule(&self) -> Rule {
        let mut rule = Rule::new().required();

        if !self.source_protocols.is_empty() {
            rule = rule
                .url()
                .allowed_protocols(self.source_protocols.iter().cloned());
        }
        if !self.source_hosts.is_empty() {
            rule = rule.url().allowed_hosts(self.source_hosts.iter().cloned());
        }
        if !self.source_regex.is_empty() {
            let patterns = self.source_regex.clone();
            rule = rule.before(move |value| {
                let text = value.as_str()?;
                patterns
                    .iter()
                    .any(|re| re.is_match(text))
                    .then(|| value.clone())
            });
        }

        rule
    }
}

impl fmt::Debug for ContentTypeSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentTypeSchema")
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("escape_text", &self.escape_text)
            .field("merge_similar", &self.merge_similar)
            .field("remove_control_characters", &self.remove_control_characters)
            .field("preformatted", &self.preformatted)
            .field("allowed_tags", &self.allowed_tags)
            .field("primary_child_types", &self.primary_child_types)
            .field("custom_block_structure", &self.custom_block_structure)
            .field("custom_item_structure", &self.custom_item_structure)
            .field("custom_render", &self.custom_render)
            .field("has_each_item_hook", &self.each_item.is_some())
            .field("has_render_hook", &self.render_block.is_some())
            .finish_non_exhaustive()
    }
}

/// Inline tags permitted by default: `b a i u s sub sup`.
pub fn default_allowed_tags() -> Vec<String> {
    ["b", "a", "i", "u", "s", "sub", "sup"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Default top-level structure: required `type`, required array `data`,
/// optional array `attr`.
pub fn default_block_structure() -> RuleSet {
    let mut rules = RuleSet::new();
    rules.insert("type".into(), Rule::new().required());
    rules.insert(
        "data".into(),
        Rule::new().of_type(ValueType::Array).required(),
    );
    rules.insert("attr".into(), Rule::new().of_type(ValueType::Object));
    rules
}

/// Default attribute rules: anchors require a well-formed `href` over
/// `https|http|ftp`, and may open in a new tab.
pub fn default_tag_attribute_rules() -> BTreeMap<String, RuleSet> {
    let mut anchor = RuleSet::new();
    anchor.insert(
        "href".into(),
        Rule::new()
            .required()
            .url()
            .allowed_protocols(["https", "http", "ftp"]),
    );
    anchor.insert("target".into(), Rule::new().values(["_blank"]));

    let mut rules = BTreeMap::new();
    rules.insert("a".to_string(), anchor);
    rules
}
