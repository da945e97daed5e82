//! Markup emission over the canonical tree.
//!
//! Thin and stateless: the canonical document is the sole input, text nodes
//! are emitted verbatim (escaping already happened during normalization),
//! and per-type policy comes from the same registry the pipeline used.
//!
//! Attribute values are minimally escaped (`&` and `"`) here even though
//! the pipeline validates them; a URL that survived validation must still
//! not be able to break out of its quoted attribute.

use std::collections::BTreeMap;

use serde_json::Value;

use texblock_core::model::{AttrMap, Block, Node};
use texblock_schema::SchemaRegistry;

/// Optional tag-name substitution tables, e.g. `b -> strong` for inline
/// tags or `p -> div` for block output names.
#[derive(Debug, Clone, Default)]
pub struct RenderNames {
    pub blocks: BTreeMap<String, String>,
    pub tags: BTreeMap<String, String>,
}

impl RenderNames {
    fn block_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.blocks.get(name).map(String::as_str).unwrap_or(name)
    }

    fn tag_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.tags.get(name).map(String::as_str).unwrap_or(name)
    }
}

/// Render a canonical document to markup.
///
/// Blocks whose type has no registered schema are skipped. Blocks flagged
/// `custom_render` dispatch to their schema's render hook and are skipped
/// when no hook is registered.
pub fn render_document(
    blocks: &[Block],
    registry: &SchemaRegistry,
    names: &RenderNames,
) -> String {
    let mut out = String::new();

    for block in blocks {
        let Some(schema) = registry.get(&block.kind) else {
            continue;
        };

        if schema.custom_render {
            if let Some(hook) = &schema.render_block {
                out.push_str(&hook(block, schema));
            }
            continue;
        }

        let tag = names.block_name(&schema.output_name);
        let content = render_items(&block.data, names);
        let attrs = render_attributes(&block.attr);
        render_tag(&mut out, tag, &content, &attrs);
    }

    out
}

fn render_items(items: &[Node], names: &RenderNames) -> String {
    let mut out = String::new();
    for item in items {
        match item {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => {
                let tag = names.tag_name(&element.kind);
                let content = render_items(&element.data, names);
                let attrs = render_attributes(&element.attr);
                render_tag(&mut out, tag, &content, &attrs);
            }
            // Record items belong to custom-render blocks; the default
            // emitter has no markup for them.
            Node::Record(_) => {}
        }
    }
    out
}

/// Attribute policy: boolean `true` renders bare, scalars render as
/// `name="value"`, boolean `false` and non-scalars are omitted.
fn render_attributes(attr: &AttrMap) -> String {
    if attr.is_empty() {
        return String::new();
    }

    let mut parts = Vec::new();
    for (name, value) in attr {
        match value {
            Value::Bool(true) => parts.push(name.clone()),
            Value::Bool(false) | Value::Array(_) | Value::Object(_) | Value::Null => {}
            Value::String(s) => parts.push(format!("{name}=\"{}\"", escape_attr(s))),
            Value::Number(n) => parts.push(format!("{name}=\"{n}\"")),
        }
    }

    if parts.is_empty() {
        String::new()
    } else {
        format!(" {}", parts.join(" "))
    }
}

/// An empty tag name emits children only, with no wrapping tag.
fn render_tag(out: &mut String, tag: &str, content: &str, attrs: &str) {
    if tag.is_empty() {
        out.push_str(content);
        return;
    }
    out.push('<');
    out.push_str(tag);
    out.push_str(attrs);
    out.push('>');
    out.push_str(content);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}
