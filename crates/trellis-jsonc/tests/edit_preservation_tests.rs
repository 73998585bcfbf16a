// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Byte-preservation suite for format-preserving edits.
//!
//! The invariant under test: replacing one value changes only that
//! value's bytes. Comments, indentation (however inconsistent), and
//! sibling content survive verbatim.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use proptest::prelude::*;
use serde_json::json;
use trellis_jsonc::{
    apply_edits, node_at_path, parse_tree, plan_set_value, set_value, CstValue, FormatOptions,
    JsonPath,
};

const FIXTURE: &str = r#"{
    // deliberately 4-space indented
    "name": "widget",
        "count": 7, /* over-indented on purpose */
  "nested": {
     "flag": true
  },
  "list": [1, 2, 3]
}"#;

fn scalar_of(node: &CstValue) -> serde_json::Value {
    match node {
        CstValue::String { value, .. } => json!(value),
        CstValue::Number { value, .. } => serde_json::Value::Number(value.clone()),
        CstValue::Bool { value, .. } => json!(value),
        CstValue::Null { .. } => serde_json::Value::Null,
        _ => panic!("expected scalar node"),
    }
}

#[test]
fn single_edit_changes_only_the_target_span() {
    let path = JsonPath::root().append("count");
    let edits =
        plan_set_value(FIXTURE, &path, &json!(1000), &FormatOptions::default()).expect("plan");
    assert_eq!(edits.len(), 1);
    let edit = &edits[0];
    let out = apply_edits(FIXTURE, &edits).expect("apply");

    let prefix = &FIXTURE[..edit.span.offset];
    let suffix = &FIXTURE[edit.span.end()..];
    assert!(out.starts_with(prefix), "prefix must be untouched");
    assert!(out.ends_with(suffix), "suffix must be untouched");
    assert_eq!(out.len(), prefix.len() + edit.new_text.len() + suffix.len());
}

#[test]
fn comments_survive_nested_edit() {
    let path = JsonPath::root().append("nested").append("flag");
    let out = set_value(FIXTURE, &path, &json!(false), &FormatOptions::default()).expect("edit");
    assert!(out.contains("// deliberately 4-space indented"));
    assert!(out.contains("/* over-indented on purpose */"));
    assert!(out.contains("\"flag\": false"));
    // Unrelated lines keep their exact, inconsistent indentation.
    assert!(out.contains("\n        \"count\": 7,"));
}

#[test]
fn edited_document_reparses_with_new_value() {
    let path = JsonPath::root().append("name");
    let out = set_value(FIXTURE, &path, &json!("gadget"), &FormatOptions::default())
        .expect("edit");
    let root = parse_tree(&out).expect("re-parse");
    let node = node_at_path(&root, &path).expect("resolve");
    assert_eq!(scalar_of(node), json!("gadget"));
}

#[test]
fn tab_indent_option_applies_to_inserted_members() {
    let options = FormatOptions {
        indent_width: 2,
        use_tabs: true,
    };
    let text = "{\n\t\"a\": 1\n}";
    let out = set_value(text, &JsonPath::root().append("b"), &json!(2), &options).expect("edit");
    assert_eq!(out, "{\n\t\"a\": 1,\n\t\"b\": 2\n}");
}

fn arb_scalar() -> impl Strategy<Value = serde_json::Value> {
    prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        (-1.0e9..1.0e9f64).prop_map(|f| json!(f)),
        "\\PC{0,12}".prop_map(serde_json::Value::String),
    ]
}

proptest! {
    /// Replacing `target` preserves every byte outside the old span
    /// and re-parses to the replacement value.
    #[test]
    fn replacement_is_byte_exact_outside_target(old in arb_scalar(), new in arb_scalar()) {
        let old_literal = serde_json::to_string(&old).expect("render old");
        let text = format!(
            "{{\n  // pinned comment\n  \"keep\": [1, 2], /* tail */\n  \"target\": {old_literal}\n}}\n"
        );
        let path = JsonPath::root().append("target");
        let edits = plan_set_value(&text, &path, &new, &FormatOptions::default()).expect("plan");
        prop_assert_eq!(edits.len(), 1);
        let span = edits[0].span;
        let out = apply_edits(&text, &edits).expect("apply");

        prop_assert_eq!(&out[..span.offset], &text[..span.offset]);
        prop_assert_eq!(&out[span.offset + edits[0].new_text.len()..], &text[span.end()..]);

        let root = parse_tree(&out).expect("re-parse");
        let node = node_at_path(&root, &path).expect("resolve");
        prop_assert_eq!(scalar_of(node), new);
    }

    /// A rendered scalar always parses back to itself.
    #[test]
    fn scalar_literals_round_trip(value in arb_scalar()) {
        let literal = serde_json::to_string(&value).expect("render");
        let root = parse_tree(&literal).expect("parse");
        prop_assert_eq!(scalar_of(&root), value);
    }
}
