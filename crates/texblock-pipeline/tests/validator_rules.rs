use serde_json::{Map, Value, json};

use texblock_pipeline::{ErrorReport, IssueCode, apply_rules, filter_with_rules};
use texblock_schema::{Rule, RuleSet, ValueType};

fn map(value: Value) -> Map<String, Value> {
    value.as_object().expect("fixture must be an object").clone()
}

fn link_rules() -> RuleSet {
    let mut rules = RuleSet::new();
    rules.insert(
        "href".into(),
        Rule::new()
            .required()
            .url()
            .allowed_protocols(["https", "http", "ftp"]),
    );
    rules.insert("target".into(), Rule::new().values(["_blank"]));
    rules
}

#[test]
fn valid_data_passes_and_unknown_keys_are_dropped() {
    let data = map(json!({
        "href": "https://example.com/page",
        "target": "_blank",
        "onclick": "alert(1)"
    }));

    let outcome = apply_rules(&data, &link_rules());
    assert!(outcome.issues.is_empty());
    assert!(!outcome.required_failure);
    assert_eq!(outcome.kept.len(), 2);
    assert!(outcome.kept.contains_key("href"));
    assert!(outcome.kept.contains_key("target"));
    assert!(!outcome.kept.contains_key("onclick"));
}

#[test]
fn missing_required_field_discards_the_whole_item() {
    let data = map(json!({ "target": "_blank" }));

    let mut report = ErrorReport::new();
    let kept = filter_with_rules(&data, &link_rules(), &mut report);
    assert_eq!(kept, None);

    let issues = report.field_issues("href");
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].code, IssueCode::FieldRequired);
    assert_eq!(issues[0].item, Value::Null);
}

#[test]
fn any_failure_on_a_required_rule_is_a_required_class_failure() {
    // The protocol is rejected; because the rule is `required`, the whole
    // item is discarded rather than just the field.
    let data = map(json!({ "href": "javascript:alert(1)" }));

    let mut report = ErrorReport::new();
    let kept = filter_with_rules(&data, &link_rules(), &mut report);
    assert_eq!(kept, None);

    let codes: Vec<IssueCode> = report
        .field_issues("href")
        .iter()
        .map(|issue| issue.code)
        .collect();
    assert!(codes.contains(&IssueCode::InvalidUrl));
    assert!(codes.contains(&IssueCode::ProtocolNotAllowed));
}

#[test]
fn non_required_failure_drops_only_that_field() {
    let data = map(json!({
        "href": "https://example.com/",
        "target": "_self"
    }));

    let mut report = ErrorReport::new();
    let kept = filter_with_rules(&data, &link_rules(), &mut report).expect("item survives");
    assert!(kept.contains_key("href"));
    assert!(!kept.contains_key("target"));
    assert_eq!(report.field_issues("target")[0].code, IssueCode::ValueNotAllowed);
}

#[test]
fn type_check_rejects_wrong_shapes() {
    let mut rules = RuleSet::new();
    rules.insert("size".into(), Rule::new().of_type(ValueType::Integer));

    let outcome = apply_rules(&map(json!({ "size": "big" })), &rules);
    assert_eq!(outcome.issues[0].code, IssueCode::InvalidType);
    assert!(outcome.kept.is_empty());

    let outcome = apply_rules(&map(json!({ "size": 42 })), &rules);
    assert!(outcome.issues.is_empty());
    assert_eq!(outcome.kept["size"], json!(42));
}

#[test]
fn host_allowlist_is_enforced() {
    let mut rules = RuleSet::new();
    rules.insert(
        "url".into(),
        Rule::new().url().allowed_hosts(["cdn.example.com"]),
    );

    let ok = apply_rules(&map(json!({ "url": "https://cdn.example.com/a.png" })), &rules);
    assert!(ok.issues.is_empty());

    let bad = apply_rules(&map(json!({ "url": "https://evil.example.net/a.png" })), &rules);
    assert_eq!(bad.issues[0].code, IssueCode::HostNotAllowed);
}

#[test]
fn before_hook_can_transform_or_veto() {
    let mut rules = RuleSet::new();
    rules.insert(
        "slug".into(),
        Rule::new().before(|value| {
            let s = value.as_str()?;
            if s.starts_with('x') {
                None
            } else {
                Some(Value::String(s.to_uppercase()))
            }
        }),
    );

    let transformed = apply_rules(&map(json!({ "slug": "abc" })), &rules);
    assert_eq!(transformed.kept["slug"], json!("ABC"));

    let vetoed = apply_rules(&map(json!({ "slug": "xyz" })), &rules);
    assert_eq!(vetoed.issues[0].code, IssueCode::RejectedByHook);
    assert!(vetoed.kept.is_empty());
}

#[test]
fn required_failure_short_circuits_remaining_fields() {
    let mut rules = RuleSet::new();
    rules.insert("alpha".into(), Rule::new().required());
    rules.insert("beta".into(), Rule::new().of_type(ValueType::String));

    // `alpha` is evaluated first (rule sets iterate in key order) and fails;
    // `beta` is never evaluated, so its type violation goes unreported.
    let outcome = apply_rules(&map(json!({ "beta": 7 })), &rules);
    assert!(outcome.required_failure);
    assert_eq!(outcome.issues.len(), 1);
    assert_eq!(outcome.issues[0].field, "alpha");
}

#[test]
fn issues_carry_rule_snapshot_and_context() {
    let data = map(json!({ "href": "ftp://", "target": "_blank" }));

    let outcome = apply_rules(&data, &link_rules());
    assert!(outcome.required_failure);
    let issue = &outcome.issues[0];
    assert!(issue.rule.required);
    assert!(issue.rule.url);
    assert_eq!(issue.item, json!("ftp://"));
    // Context is the rule-restricted view of the same item.
    assert_eq!(issue.context.get("target"), Some(&json!("_blank")));
}
