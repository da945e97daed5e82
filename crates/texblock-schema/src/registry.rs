//! Read-only mapping from block-type name to its schema.

use std::collections::BTreeMap;

use crate::builtin;
use crate::schema::ContentTypeSchema;

/// Registry of content-type schemas, keyed by input name.
///
/// Populate fully before running the pipeline; the pipeline only ever takes
/// shared references, so a populated registry can serve concurrent
/// normalization calls.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, ContentTypeSchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the stock block set: paragraph, headers
    /// h1–h4, ordered/unordered lists, code, files, and gallery.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(builtin::paragraph());
        for level in 1..=4 {
            registry.register(builtin::header(level));
        }
        registry.register(builtin::ordered_list());
        registry.register(builtin::unordered_list());
        registry.register(builtin::code());
        registry.register(builtin::files());
        registry.register(builtin::gallery());
        registry
    }

    /// Register a schema under its input name. Schemas without an input name
    /// are ignored.
    pub fn register(&mut self, schema: ContentTypeSchema) -> &mut Self {
        if !schema.input_name.is_empty() {
            self.schemas.insert(schema.input_name.clone(), schema);
        }
        self
    }

    pub fn get(&self, input_name: &str) -> Option<&ContentTypeSchema> {
        self.schemas.get(input_name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
