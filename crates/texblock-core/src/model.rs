use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Attribute / record mapping as it appears on the wire.
pub type AttrMap = Map<String, Value>;

/// A typed element with ordered children and optional attributes.
///
/// Elements are owned exclusively by their parent: the normalizer builds
/// trees bottom-up from validated input and never aliases nodes, so the
/// tree is acyclic by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ElementNode {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<Node>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attr: AttrMap,
}

impl ElementNode {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            data: Vec::new(),
            attr: AttrMap::new(),
        }
    }
}

/// One item in a block's content sequence.
///
/// `Record` carries the payload of custom-structure items (e.g. a file
/// entry). Its field set is whatever the schema's item rules kept, so it is
/// stored as a plain mapping rather than a typed element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Text(String),
    Element(ElementNode),
    Record(AttrMap),
}

impl Node {
    pub fn text(s: impl Into<String>) -> Self {
        Node::Text(s.into())
    }

    pub fn element(kind: impl Into<String>, data: Vec<Node>) -> Self {
        Node::Element(ElementNode {
            kind: kind.into(),
            data,
            attr: AttrMap::new(),
        })
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_element(&self) -> Option<&ElementNode> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }
}

/// Top-level document unit: a type name plus an ordered content sequence.
///
/// `extra` carries schema-declared fields beyond the common trio
/// (`type`, `data`, `attr`), e.g. a gallery's `style`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: Vec<Node>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attr: AttrMap,
    #[serde(flatten, default, skip_serializing_if = "Map::is_empty")]
    pub extra: AttrMap,
}

impl Block {
    pub fn new(kind: impl Into<String>, data: Vec<Node>) -> Self {
        Self {
            kind: kind.into(),
            data,
            attr: AttrMap::new(),
            extra: AttrMap::new(),
        }
    }
}
