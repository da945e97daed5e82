//! Declarative per-field validation rules.
//!
//! A `RuleSet` maps field names to their `Rule`. The validator walks rule
//! sets in map order, so `BTreeMap` keeps evaluation (and the required-field
//! short circuit) deterministic.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A collection of per-field rules, keyed by field name.
pub type RuleSet = BTreeMap<String, Rule>;

/// Pre-check hook: may transform the value (`Some(new)`) or veto it (`None`).
pub type BeforeHook = Arc<dyn Fn(&Value) -> Option<Value> + Send + Sync>;

/// Value-shape constraint names accepted by `Rule::value_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    String,
    Array,
    Integer,
    Number,
    Boolean,
    Object,
}

impl ValueType {
    pub fn matches(self, value: &Value) -> bool {
        match self {
            ValueType::String => value.is_string(),
            ValueType::Array => value.is_array(),
            ValueType::Integer => value.is_i64() || value.is_u64(),
            ValueType::Number => value.is_number(),
            ValueType::Boolean => value.is_boolean(),
            ValueType::Object => value.is_object(),
        }
    }
}

/// One field's validation spec.
///
/// Checks are evaluated in declaration order: required presence, type
/// conformance, `values` membership, URL well-formedness, protocol
/// allowlist, host allowlist, then the `before` hook.
#[derive(Clone, Default)]
pub struct Rule {
    pub required: bool,
    pub value_type: Option<ValueType>,
    /// Allowed scalar values; empty means unconstrained.
    pub values: Vec<Value>,
    pub url: bool,
    pub allowed_protocols: Vec<String>,
    pub allowed_hosts: Vec<String>,
    pub before: Option<BeforeHook>,
}

impl Rule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn of_type(mut self, value_type: ValueType) -> Self {
        self.value_type = Some(value_type);
        self
    }

    pub fn values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn url(mut self) -> Self {
        self.url = true;
        self
    }

    pub fn allowed_protocols<I, S>(mut self, protocols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_protocols = protocols.into_iter().map(Into::into).collect();
        self
    }

    pub fn allowed_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    pub fn before<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Value) -> Option<Value> + Send + Sync + 'static,
    {
        self.before = Some(Arc::new(hook));
        self
    }

    /// Serializable snapshot of this rule for diagnostics.
    pub fn summary(&self) -> RuleSummary {
        RuleSummary {
            required: self.required,
            value_type: self.value_type,
            values: self.values.clone(),
            url: self.url,
            allowed_protocols: self.allowed_protocols.clone(),
            allowed_hosts: self.allowed_hosts.clone(),
            has_before_hook: self.before.is_some(),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The `before` hook is opaque; debug-print the summary instead.
        self.summary().fmt(f)
    }
}

/// Serializable rule snapshot attached to validation diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSummary {
    pub required: bool,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub values: Vec<Value>,
    pub url: bool,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub allowed_protocols: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub allowed_hosts: Vec<String>,
    pub has_before_hook: bool,
}
