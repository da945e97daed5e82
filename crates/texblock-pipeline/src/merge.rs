//! Adjacent-sibling consolidation.
//!
//! A single forward pass over a sibling sequence. The pass does not
//! cascade: three consecutive mergeable siblings produce one merged pair
//! plus one untouched singleton. Callers wanting full consolidation would
//! have to re-invoke until fixed point; this engine intentionally keeps the
//! historical single-pass behavior.

use texblock_core::model::{AttrMap, ElementNode, Node};
use texblock_schema::ContentTypeSchema;

/// Merge adjacent similar siblings. Pass-through when the schema disables
/// merging.
///
/// Merge predicates, checked at each position `i` against `i + 1`:
/// - two text nodes join into one with a single space, regardless of
///   existing leading/trailing whitespace;
/// - two elements merge when their types match, neither carries attributes,
///   and the schema declares no primary child types; children are
///   concatenated.
/// Anything else keeps the current node as-is.
pub fn merge_similar(items: Vec<Node>, schema: &ContentTypeSchema) -> Vec<Node> {
    if !schema.merge_similar {
        return items;
    }

    let mut out = Vec::with_capacity(items.len());
    let mut i = 0;

    while i < items.len() {
        match (&items[i], items.get(i + 1)) {
            (Node::Text(current), Some(Node::Text(next))) => {
                out.push(Node::Text(format!("{current} {next}")));
                i += 2;
            }
            (Node::Element(current), Some(Node::Element(next)))
                if current.kind == next.kind
                    && current.attr.is_empty()
                    && next.attr.is_empty()
                    && schema.primary_child_types.is_empty() =>
            {
                let mut data = current.data.clone();
                data.extend(next.data.iter().cloned());
                out.push(Node::Element(ElementNode {
                    kind: current.kind.clone(),
                    data,
                    attr: AttrMap::new(),
                }));
                i += 2;
            }
            _ => {
                out.push(items[i].clone());
                i += 1;
            }
        }
    }

    out
}
