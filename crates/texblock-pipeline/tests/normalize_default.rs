use serde_json::json;

use texblock_core::model::Node;
use texblock_pipeline::{NormalizeError, NormalizeOptions, normalize_str, normalize_value};
use texblock_schema::SchemaRegistry;

fn registry() -> SchemaRegistry {
    SchemaRegistry::builtin()
}

#[test]
fn paragraph_text_items_are_merged_into_one() {
    let outcome = normalize_value(&json!([{ "type": "p", "data": ["Hello", "world"] }]), &registry());

    assert_eq!(outcome.blocks.len(), 1);
    let block = &outcome.blocks[0];
    assert_eq!(block.kind, "p");
    assert_eq!(block.data, vec![Node::text("Hello world")]);
    assert!(outcome.is_valid());
}

#[test]
fn unknown_block_type_yields_empty_document() {
    let outcome = normalize_value(&json!([{ "type": "unknown", "data": ["x"] }]), &registry());
    assert!(outcome.blocks.is_empty());
    // Structural admission failures are silent, not validation errors.
    assert!(outcome.is_valid());
}

#[test]
fn structurally_invalid_blocks_are_dropped_silently() {
    let outcome = normalize_value(
        &json!([
            "not a block",
            { "data": ["missing type"] },
            { "type": 42, "data": ["x"] },
            { "type": "p" },
            { "type": "p", "data": [] },
            { "type": "p", "data": { "0": "keyed, not a list" } },
            { "type": "p", "data": ["kept"] }
        ]),
        &registry(),
    );

    assert_eq!(outcome.blocks.len(), 1);
    assert_eq!(outcome.blocks[0].data, vec![Node::text("kept")]);
    assert!(outcome.is_valid());
}

#[test]
fn undeclared_top_level_keys_are_pruned() {
    let outcome = normalize_value(
        &json!([{ "type": "p", "data": ["x"], "tracking_id": "abc" }]),
        &registry(),
    );
    assert!(outcome.blocks[0].extra.is_empty());
}

#[test]
fn text_is_escaped_then_trimmed() {
    let outcome = normalize_value(&json!([{ "type": "p", "data": ["  <b>hi</b>  "] }]), &registry());
    assert_eq!(
        outcome.blocks[0].data,
        vec![Node::text("&lt;b&gt;hi&lt;/b&gt;")]
    );
}

#[test]
fn whitespace_only_text_drops_the_block() {
    let outcome = normalize_value(&json!([{ "type": "p", "data": ["   ", "\t"] }]), &registry());
    assert!(outcome.blocks.is_empty());
}

#[test]
fn disallowed_tags_are_dropped_allowed_tags_survive() {
    let outcome = normalize_value(
        &json!([{
            "type": "p",
            "data": [
                { "type": "script", "data": ["evil()"] },
                { "type": "b", "data": ["bold"] }
            ]
        }]),
        &registry(),
    );

    let block = &outcome.blocks[0];
    assert_eq!(block.data.len(), 1);
    let element = block.data[0].as_element().expect("element node");
    assert_eq!(element.kind, "b");
    assert_eq!(element.data, vec![Node::text("bold")]);
}

#[test]
fn header_schema_narrows_the_inline_tag_set() {
    let outcome = normalize_value(
        &json!([{
            "type": "h1",
            "data": [
                { "type": "b", "data": ["not allowed in headers"] },
                { "type": "sup", "data": ["ok"] }
            ]
        }]),
        &registry(),
    );

    let block = &outcome.blocks[0];
    assert_eq!(block.data.len(), 1);
    assert_eq!(block.data[0].as_element().unwrap().kind, "sup");
}

#[test]
fn required_attribute_failure_discards_the_whole_element() {
    let outcome = normalize_value(
        &json!([{
            "type": "p",
            "data": [
                { "type": "a", "attr": { "href": "javascript:alert(1)" }, "data": ["click"] },
                "after"
            ]
        }]),
        &registry(),
    );

    // The anchor is entirely absent, not merely missing its href; the
    // remaining text keeps the block alive.
    assert_eq!(outcome.blocks[0].data, vec![Node::text("after")]);
    assert!(!outcome.is_valid());
    assert!(!outcome.report.field_issues("href").is_empty());
}

#[test]
fn undeclared_attributes_are_stripped() {
    let outcome = normalize_value(
        &json!([{
            "type": "p",
            "data": [{
                "type": "a",
                "attr": {
                    "href": "https://example.com/",
                    "target": "_blank",
                    "onclick": "alert(1)"
                },
                "data": ["link"]
            }]
        }]),
        &registry(),
    );

    let element = outcome.blocks[0].data[0].as_element().expect("anchor");
    assert_eq!(element.attr.get("href"), Some(&json!("https://example.com/")));
    assert_eq!(element.attr.get("target"), Some(&json!("_blank")));
    assert!(!element.attr.contains_key("onclick"));
}

#[test]
fn element_without_surviving_children_is_dropped() {
    let outcome = normalize_value(
        &json!([{
            "type": "p",
            "data": [
                { "type": "b", "data": ["  "] },
                "text"
            ]
        }]),
        &registry(),
    );

    assert_eq!(outcome.blocks[0].data, vec![Node::text("text")]);
}

#[test]
fn nesting_is_validated_recursively() {
    let outcome = normalize_value(
        &json!([{
            "type": "p",
            "data": [{
                "type": "b",
                "data": [
                    { "type": "i", "data": [{ "type": "script", "data": ["x"] }, "deep"] }
                ]
            }]
        }]),
        &registry(),
    );

    let bold = outcome.blocks[0].data[0].as_element().expect("b");
    let italic = bold.data[0].as_element().expect("i");
    assert_eq!(italic.data, vec![Node::text("deep")]);
}

#[test]
fn zero_width_space_is_stripped_from_text() {
    let raw = "[{\"type\":\"p\",\"data\":[\"wo\u{200B}rd\"]}]";
    let outcome = normalize_str(raw, &registry(), NormalizeOptions::default()).expect("normalizes");
    assert_eq!(outcome.blocks[0].data, vec![Node::text("word")]);
}

#[test]
fn dev_mode_raises_on_unparseable_input() {
    let err = normalize_str("not json", &registry(), NormalizeOptions { dev: true });
    assert_eq!(err, Err(NormalizeError::InvalidInputFormat));
}

#[test]
fn production_mode_treats_unparseable_input_as_empty() {
    let outcome =
        normalize_str("not json", &registry(), NormalizeOptions::default()).expect("no error");
    assert!(outcome.blocks.is_empty());
    assert!(outcome.is_valid());
}

#[test]
fn non_list_top_level_input_yields_empty_document() {
    let outcome = normalize_value(&json!({ "type": "p", "data": ["x"] }), &registry());
    assert!(outcome.blocks.is_empty());
}

#[test]
fn output_element_types_stay_within_allowed_tags() {
    let outcome = normalize_value(
        &json!([{
            "type": "p",
            "data": [
                "t",
                { "type": "b", "data": ["x", { "type": "u", "data": ["y"] }] },
                { "type": "div", "data": ["z"] }
            ]
        }]),
        &registry(),
    );

    fn assert_allowed(node: &Node, allowed: &[String]) {
        if let Node::Element(element) = node {
            assert!(allowed.contains(&element.kind), "disallowed {}", element.kind);
            for child in &element.data {
                assert_allowed(child, allowed);
            }
        }
    }

    let schema = SchemaRegistry::builtin();
    let allowed = &schema.get("p").unwrap().allowed_tags;
    for node in &outcome.blocks[0].data {
        assert_allowed(node, allowed);
    }
}
