//! Rule evaluation over flat field/value mappings.
//!
//! Filtering policy:
//! - unknown keys (not named by any rule) are never retained;
//! - a field failing a non-required check is dropped, evaluation continues;
//! - the first field with a required-class failure (code `field_required`,
//!   or any failure on a rule marked `required`) terminates evaluation of
//!   the whole item: `filter_with_rules` returns `None` and the caller must
//!   discard the item. Required fields are structural (a link without its
//!   `href` is meaningless), so losing just the attribute is not an option.

use serde_json::Value;

use texblock_core::model::AttrMap;
use texblock_schema::{Rule, RuleSet};

use crate::diagnostics::{ErrorReport, IssueCode, ValidationIssue};

/// Result of evaluating one rule set against one mapping.
#[derive(Debug, Clone)]
pub struct RuleOutcome {
    /// Subset of the input restricted to rule-declared keys that passed
    /// (with any `before`-hook transforms applied).
    pub kept: AttrMap,
    pub issues: Vec<ValidationIssue>,
    /// A required-class failure occurred; the whole item must be discarded.
    pub required_failure: bool,
}

/// Evaluate `rules` against `data`.
///
/// Fields are processed in rule-set (lexicographic) order; per field the
/// checks run in a fixed sequence and every failing check appends an issue.
pub fn apply_rules(data: &AttrMap, rules: &RuleSet) -> RuleOutcome {
    let context = restrict(data, rules);
    let mut kept = AttrMap::new();
    let mut issues = Vec::new();
    let mut required_failure = false;

    for (field, rule) in rules {
        let Some(value) = data.get(field) else {
            if rule.required {
                issues.push(issue(IssueCode::FieldRequired, field, rule, Value::Null, &context));
                required_failure = true;
                break;
            }
            continue;
        };

        let mut current = value.clone();
        let mut field_codes = Vec::new();

        if let Some(value_type) = rule.value_type
            && !value_type.matches(&current)
        {
            field_codes.push(IssueCode::InvalidType);
        }

        if !rule.values.is_empty() && !rule.values.contains(&current) {
            field_codes.push(IssueCode::ValueNotAllowed);
        }

        let parts = current.as_str().and_then(split_url);
        if rule.url && parts.is_none() {
            field_codes.push(IssueCode::InvalidUrl);
        }
        if !rule.allowed_protocols.is_empty() {
            let ok = parts
                .as_ref()
                .is_some_and(|(scheme, _)| rule.allowed_protocols.iter().any(|p| p == scheme));
            if !ok {
                field_codes.push(IssueCode::ProtocolNotAllowed);
            }
        }
        if !rule.allowed_hosts.is_empty() {
            let ok = parts
                .as_ref()
                .is_some_and(|(_, host)| rule.allowed_hosts.iter().any(|h| h == host));
            if !ok {
                field_codes.push(IssueCode::HostNotAllowed);
            }
        }

        if let Some(hook) = &rule.before {
            match hook(&current) {
                Some(transformed) => current = transformed,
                None => field_codes.push(IssueCode::RejectedByHook),
            }
        }

        if field_codes.is_empty() {
            kept.insert(field.clone(), current);
            continue;
        }

        for code in field_codes {
            issues.push(issue(code, field, rule, value.clone(), &context));
        }
        if rule.required {
            required_failure = true;
            break;
        }
    }

    RuleOutcome {
        kept,
        issues,
        required_failure,
    }
}

/// Convenience wrapper: record all issues into `report` and return the kept
/// mapping, or `None` when a required-class failure discards the item.
pub fn filter_with_rules(
    data: &AttrMap,
    rules: &RuleSet,
    report: &mut ErrorReport,
) -> Option<AttrMap> {
    let outcome = apply_rules(data, rules);
    for item in outcome.issues {
        report.record(item);
    }
    if outcome.required_failure {
        None
    } else {
        Some(outcome.kept)
    }
}

fn issue(
    code: IssueCode,
    field: &str,
    rule: &Rule,
    item: Value,
    context: &AttrMap,
) -> ValidationIssue {
    ValidationIssue {
        code,
        field: field.to_string(),
        rule: rule.summary(),
        item,
        context: context.clone(),
    }
}

fn restrict(data: &AttrMap, rules: &RuleSet) -> AttrMap {
    data.iter()
        .filter(|(key, _)| rules.contains_key(key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Minimal URL decomposition: `scheme://host[/...]` with a non-empty host.
///
/// Deliberately strict: scheme-only forms (`javascript:...`) and
/// protocol-relative forms are rejected.
fn split_url(value: &str) -> Option<(String, String)> {
    let (scheme, rest) = value.split_once("://")?;
    if scheme.is_empty()
        || !scheme.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        || !scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    {
        return None;
    }

    let authority = rest.split(['/', '?', '#']).next().unwrap_or("");
    // Strip userinfo and port.
    let host = authority.rsplit('@').next().unwrap_or("");
    let host = host.split(':').next().unwrap_or("");
    if host.is_empty() {
        return None;
    }

    Some((scheme.to_ascii_lowercase(), host.to_ascii_lowercase()))
}
