pub mod builtin;
pub mod registry;
pub mod rule;
pub mod schema;

pub use registry::SchemaRegistry;
pub use rule::{BeforeHook, Rule, RuleSet, RuleSummary, ValueType};
pub use schema::{ContentTypeSchema, ItemHook, RenderHook};
