// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Format-preserving edit planning and application.
//!
//! An edit replaces exactly the bytes of one value (or inserts a new
//! object member); every other byte of the document — indentation,
//! comments, sibling members — survives untouched. Planning never
//! mutates; application splices a validated, non-overlapping edit
//! batch in descending offset order so earlier offsets stay valid.

use serde::{Deserialize, Serialize};

use crate::error::EditError;
use crate::path::{JsonPath, PathSegment};
use crate::scanner::{Scanner, TokenKind};
use crate::tree::{node_at_path, parse_tree, CstMember, CstValue, Span};

/// Formatting applied to newly inserted text at an edit site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatOptions {
    /// Spaces per indent level (ignored when `use_tabs` is set).
    pub indent_width: usize,
    /// Indent with tabs instead of spaces.
    pub use_tabs: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent_width: 2,
            use_tabs: false,
        }
    }
}

impl FormatOptions {
    fn indent_unit(&self) -> String {
        if self.use_tabs {
            "\t".to_string()
        } else {
            " ".repeat(self.indent_width)
        }
    }
}

/// A single replacement over the original text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEdit {
    /// Byte range to replace (zero-length for insertions).
    pub span: Span,
    /// Replacement text.
    pub new_text: String,
}

/// Plans the edits that set the value at `path` to `new_value`.
///
/// The returned edits, applied to `text`, yield a document whose
/// re-parse has `new_value` at `path`; all bytes outside the edited
/// span are unchanged. An object key that does not exist yet is
/// synthesized (comma, quoting, indentation per `options`); array
/// indexes must already exist.
///
/// # Errors
///
/// [`EditError::Syntax`] when `text` does not parse;
/// [`EditError::PathNotFound`] when `path` resolves to nothing.
pub fn plan_set_value(
    text: &str,
    path: &JsonPath,
    new_value: &serde_json::Value,
    options: &FormatOptions,
) -> Result<Vec<TextEdit>, EditError> {
    let root = parse_tree(text)?;
    let Some((parent_path, last)) = path.split_last() else {
        // Replacing the document root.
        let span = root.span();
        let new_text = render_value(text, span.offset, new_value, options)?;
        return Ok(vec![TextEdit { span, new_text }]);
    };
    let not_found = || EditError::PathNotFound { path: path.clone() };
    let parent = node_at_path(&root, &parent_path).ok_or_else(not_found)?;
    match (parent, last) {
        (CstValue::Object { span, members }, PathSegment::Key(key)) => {
            if let Some(member) = members.iter().rev().find(|m| m.key.name == *key) {
                let value_span = member.value.span();
                let new_text = render_value(text, value_span.offset, new_value, options)?;
                Ok(vec![TextEdit {
                    span: value_span,
                    new_text,
                }])
            } else {
                plan_insert_member(text, *span, members, key, new_value, options)
            }
        }
        (CstValue::Array { items, .. }, PathSegment::Index(index)) => {
            let item = items.get(*index).ok_or_else(not_found)?;
            let span = item.span();
            let new_text = render_value(text, span.offset, new_value, options)?;
            Ok(vec![TextEdit { span, new_text }])
        }
        _ => Err(not_found()),
    }
}

/// Applies a batch of non-overlapping edits to `text`.
///
/// Edits are validated (bounds, UTF-8 boundaries, overlap) and then
/// spliced in descending offset order, so all spans refer to the
/// original text.
///
/// # Errors
///
/// [`EditError::InvalidRange`] for out-of-bounds or boundary-splitting
/// spans; [`EditError::OverlappingEdits`] when two spans intersect.
pub fn apply_edits(text: &str, edits: &[TextEdit]) -> Result<String, EditError> {
    let mut ordered: Vec<&TextEdit> = edits.iter().collect();
    ordered.sort_by_key(|e| (e.span.offset, e.span.len));
    let mut prev_end = 0usize;
    for edit in &ordered {
        let span = edit.span;
        if span.end() > text.len()
            || !text.is_char_boundary(span.offset)
            || !text.is_char_boundary(span.end())
        {
            return Err(EditError::InvalidRange {
                offset: span.offset,
                end: span.end(),
                text_len: text.len(),
            });
        }
        if span.offset < prev_end {
            return Err(EditError::OverlappingEdits {
                offset: span.offset,
            });
        }
        prev_end = prev_end.max(span.end());
    }
    let mut out = text.to_string();
    for edit in ordered.iter().rev() {
        out.replace_range(edit.span.offset..edit.span.end(), &edit.new_text);
    }
    Ok(out)
}

/// Plans and applies a single value replacement in one call.
///
/// # Errors
///
/// Propagates [`plan_set_value`] / [`apply_edits`] failures.
pub fn set_value(
    text: &str,
    path: &JsonPath,
    new_value: &serde_json::Value,
    options: &FormatOptions,
) -> Result<String, EditError> {
    let edits = plan_set_value(text, path, new_value, options)?;
    apply_edits(text, &edits)
}

/// Serializes `new_value` for insertion at `at_offset`.
///
/// Scalars render as exact JSON literals. Containers render with the
/// configured indent unit and are re-based on the indentation of the
/// line the edit lands on, so a nested replacement lines up with its
/// surroundings.
fn render_value(
    text: &str,
    at_offset: usize,
    new_value: &serde_json::Value,
    options: &FormatOptions,
) -> Result<String, EditError> {
    if !matches!(
        new_value,
        serde_json::Value::Array(_) | serde_json::Value::Object(_)
    ) {
        return serde_json::to_string(new_value).map_err(|e| EditError::Serialize(e.to_string()));
    }
    let unit = options.indent_unit();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(unit.as_bytes());
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    serde::Serialize::serialize(new_value, &mut ser)
        .map_err(|e| EditError::Serialize(e.to_string()))?;
    let rendered = String::from_utf8(buf).map_err(|e| EditError::Serialize(e.to_string()))?;
    let base = line_indent(text, at_offset);
    if base.is_empty() {
        Ok(rendered)
    } else {
        Ok(rendered.replace('\n', &format!("\n{base}")))
    }
}

/// Plans the insertion of a not-yet-existing object member.
///
/// The member lands after the last existing member (reusing a trailing
/// comma when one is present) or just inside an empty object. In
/// multiline objects the new member goes on its own line at the
/// indentation of its siblings.
fn plan_insert_member(
    text: &str,
    object_span: Span,
    members: &[CstMember],
    key: &str,
    new_value: &serde_json::Value,
    options: &FormatOptions,
) -> Result<Vec<TextEdit>, EditError> {
    let key_literal = serde_json::to_string(key).map_err(|e| EditError::Serialize(e.to_string()))?;
    let multiline = object_span.slice(text).contains('\n');

    if let Some(last) = members.last() {
        let after_last = last.span.end();
        // A trailing comma between the last member and `}` becomes the
        // separator for the new member.
        let close_offset = object_span.end() - 1;
        let existing_comma = find_separating_comma(&text[after_last..close_offset])
            .map(|rel| after_last + rel);
        let (insert_at, lead_comma) = match existing_comma {
            Some(comma_at) => (comma_at + 1, ""),
            None => (after_last, ","),
        };
        let sep = if multiline {
            format!("\n{}", line_indent(text, last.span.offset))
        } else {
            " ".to_string()
        };
        let value_text = render_value(text, last.span.offset, new_value, options)?;
        Ok(vec![TextEdit {
            span: Span::new(insert_at, 0),
            new_text: format!("{lead_comma}{sep}{key_literal}: {value_text}"),
        }])
    } else if multiline {
        let base = line_indent(text, object_span.offset);
        let member_indent = format!("{base}{}", options.indent_unit());
        let value_text = render_value(text, object_span.offset, new_value, options)?;
        Ok(vec![TextEdit {
            span: Span::new(object_span.offset + 1, 0),
            new_text: format!("\n{member_indent}{key_literal}: {value_text}"),
        }])
    } else {
        let value_text = render_value(text, object_span.offset, new_value, options)?;
        Ok(vec![TextEdit {
            span: Span::new(object_span.offset + 1, 0),
            new_text: format!("{key_literal}: {value_text}"),
        }])
    }
}

/// Finds a top-level comma in `tail` (text between the last member and
/// the closing brace), skipping comments. Returns its byte offset
/// within `tail`.
fn find_separating_comma(tail: &str) -> Option<usize> {
    let mut scanner = Scanner::new(tail);
    while let Ok(Some(tok)) = scanner.next_token() {
        if tok.kind == TokenKind::Comma {
            return Some(tok.span.offset);
        }
        if !tok.kind.is_comment() {
            break;
        }
    }
    None
}

/// Leading whitespace of the line containing `offset`.
fn line_indent(text: &str, offset: usize) -> &str {
    let bytes = text.as_bytes();
    let clamped = offset.min(text.len());
    let line_start = bytes[..clamped]
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |pos| pos + 1);
    let mut end = line_start;
    while end < clamped && matches!(bytes[end], b' ' | b'\t') {
        end += 1;
    }
    &text[line_start..end]
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use super::*;
    use serde_json::json;

    fn set(text: &str, path: &JsonPath, value: serde_json::Value) -> String {
        set_value(text, path, &value, &FormatOptions::default()).expect("edit")
    }

    #[test]
    fn replaces_scalar_in_place() {
        let text = r#"{ "a": 1, "b": "x" }"#;
        let path = JsonPath::root().append("a");
        assert_eq!(set(text, &path, json!(42)), r#"{ "a": 42, "b": "x" }"#);
    }

    #[test]
    fn replacement_preserves_comments_and_odd_indentation() {
        let text = "{\n      // count of things\n      \"a\": 1,\n  \"b\": true\n}";
        let path = JsonPath::root().append("a");
        let out = set(text, &path, json!(2));
        assert_eq!(
            out,
            "{\n      // count of things\n      \"a\": 2,\n  \"b\": true\n}"
        );
    }

    #[test]
    fn replaces_string_with_escapes() {
        let text = r#"{ "msg": "old" }"#;
        let path = JsonPath::root().append("msg");
        let out = set(text, &path, json!("line\nbreak \"q\""));
        assert_eq!(out, r#"{ "msg": "line\nbreak \"q\"" }"#);
    }

    #[test]
    fn replaces_array_element_by_index() {
        let text = "[10, 20, 30]";
        let path = JsonPath::root().append(1);
        assert_eq!(set(text, &path, json!(99)), "[10, 99, 30]");
    }

    #[test]
    fn out_of_range_index_is_path_not_found() {
        let err = set_value(
            "[1]",
            &JsonPath::root().append(4),
            &json!(0),
            &FormatOptions::default(),
        )
        .expect_err("must fail");
        assert!(matches!(err, EditError::PathNotFound { .. }));
    }

    #[test]
    fn missing_parent_is_path_not_found() {
        let err = set_value(
            r#"{ "a": 1 }"#,
            &JsonPath::root().append("b").append("c"),
            &json!(0),
            &FormatOptions::default(),
        )
        .expect_err("must fail");
        assert!(matches!(err, EditError::PathNotFound { .. }));
    }

    #[test]
    fn inserts_new_key_in_singleline_object() {
        let text = r#"{ "a": 1 }"#;
        let path = JsonPath::root().append("b");
        assert_eq!(set(text, &path, json!(true)), r#"{ "a": 1, "b": true }"#);
    }

    #[test]
    fn inserts_new_key_in_multiline_object_with_sibling_indent() {
        let text = "{\n  \"a\": 1\n}";
        let path = JsonPath::root().append("b");
        assert_eq!(set(text, &path, json!(2)), "{\n  \"a\": 1,\n  \"b\": 2\n}");
    }

    #[test]
    fn insert_reuses_trailing_comma() {
        let text = "{\n  \"a\": 1,\n}";
        let path = JsonPath::root().append("b");
        assert_eq!(set(text, &path, json!(2)), "{\n  \"a\": 1,\n  \"b\": 2\n}");
    }

    #[test]
    fn inserts_into_empty_object() {
        assert_eq!(
            set("{}", &JsonPath::root().append("k"), json!("v")),
            r#"{"k": "v"}"#
        );
        assert_eq!(
            set("{\n}", &JsonPath::root().append("k"), json!(1)),
            "{\n  \"k\": 1\n}"
        );
    }

    #[test]
    fn replaces_document_root() {
        let out = set("// doc\n  [1, 2]\n", &JsonPath::root(), json!(null));
        assert_eq!(out, "// doc\n  null\n");
    }

    #[test]
    fn container_replacement_rebases_indentation() {
        let text = "{\n  \"a\": {\n    \"x\": 1\n  }\n}";
        let path = JsonPath::root().append("a");
        let out = set(text, &path, json!({ "y": [1, 2] }));
        assert_eq!(
            out,
            "{\n  \"a\": {\n    \"y\": [\n      1,\n      2\n    ]\n  }\n}"
        );
    }

    #[test]
    fn apply_rejects_overlapping_edits() {
        let edits = vec![
            TextEdit {
                span: Span::new(0, 4),
                new_text: "a".into(),
            },
            TextEdit {
                span: Span::new(2, 4),
                new_text: "b".into(),
            },
        ];
        let err = apply_edits("0123456789", &edits).expect_err("must fail");
        assert!(matches!(err, EditError::OverlappingEdits { offset: 2 }));
    }

    #[test]
    fn apply_rejects_out_of_bounds() {
        let edits = vec![TextEdit {
            span: Span::new(8, 8),
            new_text: String::new(),
        }];
        let err = apply_edits("short", &edits).expect_err("must fail");
        assert!(matches!(err, EditError::InvalidRange { .. }));
    }

    #[test]
    fn apply_splices_batch_against_original_offsets() {
        let text = r#"{ "a": 1, "b": 2, "c": 3 }"#;
        let root = parse_tree(text).expect("parse");
        let mut edits = Vec::new();
        for (key, value) in [("a", json!(10)), ("c", json!(30))] {
            let path = JsonPath::root().append(key);
            let span = node_at_path(&root, &path).expect("node").span();
            edits.push(TextEdit {
                span,
                new_text: value.to_string(),
            });
        }
        let out = apply_edits(text, &edits).expect("apply");
        assert_eq!(out, r#"{ "a": 10, "b": 2, "c": 30 }"#);
    }
}
