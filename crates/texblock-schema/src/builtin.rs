//! Stock content-type schemas.
//!
//! These mirror the block set produced by the reference editor: paragraphs,
//! headings, ordered/unordered lists, code, and the two custom-structure
//! media blocks (files, gallery).

use std::sync::Arc;

use serde_json::Value;

use texblock_core::escape::escape_html;
use texblock_core::model::AttrMap;

use crate::rule::{Rule, RuleSet, ValueType};
use crate::schema::ContentTypeSchema;

pub fn paragraph() -> ContentTypeSchema {
    ContentTypeSchema {
        remove_control_characters: true,
        ..ContentTypeSchema::named("p", "p")
    }
}

/// Heading schema for `h1`..`h4`. Headings allow a narrower inline set.
pub fn header(level: u8) -> ContentTypeSchema {
    let name = format!("h{level}");
    ContentTypeSchema {
        allowed_tags: ["a", "sub", "sup"].into_iter().map(String::from).collect(),
        ..ContentTypeSchema::named(&name, &name)
    }
}

pub fn ordered_list() -> ContentTypeSchema {
    ContentTypeSchema {
        primary_child_types: vec!["li".into()],
        remove_control_characters: true,
        ..ContentTypeSchema::named("ol", "ol")
    }
}

pub fn unordered_list() -> ContentTypeSchema {
    ContentTypeSchema {
        primary_child_types: vec!["li".into()],
        ..ContentTypeSchema::named("ul", "ul")
    }
}

pub fn code() -> ContentTypeSchema {
    ContentTypeSchema {
        allowed_tags: Vec::new(),
        preformatted: true,
        ..ContentTypeSchema::named("code", "code")
    }
}

/// File gallery block: custom block/item structure, no merging, renders via
/// an external hook.
pub fn files() -> ContentTypeSchema {
    let mut schema = ContentTypeSchema {
        allowed_tags: Vec::new(),
        custom_block_structure: true,
        custom_item_structure: true,
        custom_render: true,
        merge_similar: false,
        escape_text: true,
        source_mime_types: [
            "image/png",
            "image/jpeg",
            "image/gif",
            "image/webp",
            "video/mp4",
            "video/webm",
            "video/ogg",
            "video/mpeg",
            "video/quicktime",
            "video/x-msvideo",
        ]
        .into_iter()
        .map(String::from)
        .collect(),
        each_item: Some(Arc::new(clean_item_captions)),
        ..ContentTypeSchema::named("files", "div")
    };
    schema.block_structure = file_block_structure(&schema);
    schema.item_structure = file_item_structure(&schema);
    schema
}

/// Image/video gallery: the files block narrowed to visual media, with an
/// optional layout `style` and per-item `thumbnail`.
pub fn gallery() -> ContentTypeSchema {
    let mut schema = files();
    schema.input_name = "gallery".into();
    schema.source_mime_types = [
        "image/png",
        "image/jpeg",
        "image/gif",
        "image/webp",
        "video/mp4",
        "video/webm",
        "video/ogg",
    ]
    .into_iter()
    .map(String::from)
    .collect();

    schema.block_structure = file_block_structure(&schema);
    schema.block_structure.insert(
        "style".into(),
        Rule::new()
            .of_type(ValueType::String)
            .values(["grid", "slider", "single"]),
    );

    schema.item_structure = file_item_structure(&schema);
    let mut thumbnail = Rule::new().of_type(ValueType::String).url();
    if !schema.source_hosts.is_empty() {
        thumbnail = thumbnail.allowed_hosts(schema.source_hosts.iter().cloned());
    }
    schema.item_structure.insert("thumbnail".into(), thumbnail);

    schema
}

fn file_block_structure(schema: &ContentTypeSchema) -> RuleSet {
    let mut rules = RuleSet::new();
    rules.insert(
        "type".into(),
        Rule::new()
            .required()
            .of_type(ValueType::String)
            .values([schema.input_name.clone()]),
    );
    rules.insert(
        "data".into(),
        Rule::new().of_type(ValueType::Array).required(),
    );
    rules
}

fn file_item_structure(schema: &ContentTypeSchema) -> RuleSet {
    let mut rules = RuleSet::new();
    rules.insert("url".into(), schema.item_url_rule());
    rules.insert(
        "type".into(),
        Rule::new()
            .required()
            .values(schema.source_mime_types.iter().cloned().map(Value::from)),
    );
    rules.insert("size".into(), Rule::new().of_type(ValueType::Integer));
    rules.insert("caption".into(), Rule::new().of_type(ValueType::String));
    rules.insert("desc".into(), Rule::new().of_type(ValueType::String));
    rules
}

/// Trim and escape the auxiliary text fields of a file item; empty fields
/// are dropped rather than kept as blanks.
fn clean_item_captions(mut item: AttrMap) -> AttrMap {
    for field in ["caption", "desc"] {
        let cleaned = item
            .get(field)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(escape_html);

        match cleaned {
            Some(text) => {
                item.insert(field.to_string(), Value::String(text));
            }
            None => {
                item.remove(field);
            }
        }
    }
    item
}
