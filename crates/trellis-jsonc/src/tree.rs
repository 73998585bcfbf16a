// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Span-carrying syntax tree for JSON-with-comments documents.
//!
//! The tree keeps byte spans into the original text so edits can be
//! spliced at exact token boundaries. Comments and whitespace are
//! trivia: they are validated during scanning but never represented
//! in the tree, which is what makes format-preserving edits possible.

use serde::{Deserialize, Serialize};

use crate::error::{ParseError, ParseErrorKind};
use crate::path::{JsonPath, PathSegment};
use crate::scanner::{decode_string_literal, Scanner, Token, TokenKind};

/// A byte range in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset.
    pub offset: usize,
    /// Length in bytes.
    pub len: usize,
}

impl Span {
    /// Builds a span from offset and length.
    #[must_use]
    pub fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    /// One past the last byte covered.
    #[must_use]
    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    /// Slices the covered text.
    #[must_use]
    pub fn slice<'t>(&self, text: &'t str) -> &'t str {
        &text[self.offset..self.end()]
    }
}

/// Decoded object key with the span of its string literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CstKey {
    /// Span of the key literal, quotes included.
    pub span: Span,
    /// Decoded key text.
    pub name: String,
}

/// One `key: value` member of an object.
#[derive(Debug, Clone, PartialEq)]
pub struct CstMember {
    /// Span from the key literal through the value's last byte.
    pub span: Span,
    /// The member key.
    pub key: CstKey,
    /// The member value.
    pub value: CstValue,
}

/// A parsed JSON value with its concrete span.
#[derive(Debug, Clone, PartialEq)]
pub enum CstValue {
    /// `{ … }` with members in document order.
    Object {
        /// Span from `{` through `}`.
        span: Span,
        /// Members, first-encountered first. Duplicate keys are kept.
        members: Vec<CstMember>,
    },
    /// `[ … ]` with elements in document order.
    Array {
        /// Span from `[` through `]`.
        span: Span,
        /// Elements in order.
        items: Vec<CstValue>,
    },
    /// String literal.
    String {
        /// Span of the literal, quotes included.
        span: Span,
        /// Decoded value.
        value: String,
    },
    /// Number literal.
    Number {
        /// Span of the literal.
        span: Span,
        /// Parsed value.
        value: serde_json::Number,
    },
    /// `true` / `false`.
    Bool {
        /// Span of the keyword.
        span: Span,
        /// Parsed value.
        value: bool,
    },
    /// `null`.
    Null {
        /// Span of the keyword.
        span: Span,
    },
}

impl CstValue {
    /// The value's span in the source text.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Object { span, .. }
            | Self::Array { span, .. }
            | Self::String { span, .. }
            | Self::Number { span, .. }
            | Self::Bool { span, .. }
            | Self::Null { span } => *span,
        }
    }

    /// `true` for objects and arrays.
    #[must_use]
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Object { .. } | Self::Array { .. })
    }
}

/// Parses JSON-with-comments text into a syntax tree.
///
/// Comments (`// …`, `/* … */`) may appear between any two tokens and
/// are discarded. Trailing commas in objects and arrays are accepted.
/// Content after the root value is an error.
pub fn parse_tree(text: &str) -> Result<CstValue, ParseError> {
    let mut parser = Parser::new(text);
    let first = parser
        .next_significant()?
        .ok_or_else(|| ParseError::at(ParseErrorKind::UnexpectedEndOfText, text, text.len()))?;
    let root = parser.parse_value(first)?;
    if let Some(extra) = parser.next_significant()? {
        return Err(ParseError::at(
            ParseErrorKind::TrailingCharacters,
            text,
            extra.span.offset,
        ));
    }
    Ok(root)
}

/// Resolves a path against a parsed tree.
///
/// For object steps, the **last** member with a matching key wins,
/// mirroring JSON's duplicate-key semantics. Returns `None` when any
/// step fails to resolve.
#[must_use]
pub fn node_at_path<'a>(root: &'a CstValue, path: &JsonPath) -> Option<&'a CstValue> {
    let mut current = root;
    for segment in path.segments() {
        current = match (current, segment) {
            (CstValue::Object { members, .. }, PathSegment::Key(key)) => {
                &members.iter().rev().find(|m| m.key.name == *key)?.value
            }
            (CstValue::Array { items, .. }, PathSegment::Index(index)) => items.get(*index)?,
            _ => return None,
        };
    }
    Some(current)
}

struct Parser<'a> {
    text: &'a str,
    scanner: Scanner<'a>,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            scanner: Scanner::new(text),
        }
    }

    /// Next non-comment token.
    fn next_significant(&mut self) -> Result<Option<Token>, ParseError> {
        loop {
            match self.scanner.next_token()? {
                Some(tok) if tok.kind.is_comment() => {}
                other => return Ok(other),
            }
        }
    }

    fn require_significant(&mut self, kind: ParseErrorKind) -> Result<Token, ParseError> {
        self.next_significant()?
            .ok_or_else(|| ParseError::at(kind, self.text, self.text.len()))
    }

    fn parse_value(&mut self, token: Token) -> Result<CstValue, ParseError> {
        match token.kind {
            TokenKind::OpenBrace => self.parse_object(token),
            TokenKind::OpenBracket => self.parse_array(token),
            TokenKind::String => Ok(CstValue::String {
                span: token.span,
                value: decode_string_literal(self.text, token.span)?,
            }),
            TokenKind::Number => {
                let literal = token.span.slice(self.text);
                let value = serde_json::from_str(literal).map_err(|_| {
                    ParseError::at(ParseErrorKind::InvalidNumber, self.text, token.span.offset)
                })?;
                Ok(CstValue::Number {
                    span: token.span,
                    value,
                })
            }
            TokenKind::True => Ok(CstValue::Bool {
                span: token.span,
                value: true,
            }),
            TokenKind::False => Ok(CstValue::Bool {
                span: token.span,
                value: false,
            }),
            TokenKind::Null => Ok(CstValue::Null { span: token.span }),
            _ => Err(ParseError::at(
                ParseErrorKind::ExpectedValue,
                self.text,
                token.span.offset,
            )),
        }
    }

    fn parse_object(&mut self, open: Token) -> Result<CstValue, ParseError> {
        let mut members = Vec::new();
        loop {
            let tok = self.require_significant(ParseErrorKind::UnexpectedEndOfText)?;
            match tok.kind {
                TokenKind::CloseBrace => {
                    return Ok(CstValue::Object {
                        span: enclosing(open.span, tok.span),
                        members,
                    })
                }
                TokenKind::String => {
                    let key = CstKey {
                        span: tok.span,
                        name: decode_string_literal(self.text, tok.span)?,
                    };
                    let colon = self.require_significant(ParseErrorKind::ExpectedColon)?;
                    if colon.kind != TokenKind::Colon {
                        return Err(ParseError::at(
                            ParseErrorKind::ExpectedColon,
                            self.text,
                            colon.span.offset,
                        ));
                    }
                    let value_tok = self.require_significant(ParseErrorKind::ExpectedValue)?;
                    let value = self.parse_value(value_tok)?;
                    members.push(CstMember {
                        span: enclosing(key.span, value.span()),
                        key,
                        value,
                    });
                    let sep = self.require_significant(ParseErrorKind::ExpectedCommaOrClose)?;
                    match sep.kind {
                        // Trailing commas are tolerated: the next
                        // iteration may see the closing brace.
                        TokenKind::Comma => {}
                        TokenKind::CloseBrace => {
                            return Ok(CstValue::Object {
                                span: enclosing(open.span, sep.span),
                                members,
                            })
                        }
                        _ => {
                            return Err(ParseError::at(
                                ParseErrorKind::ExpectedCommaOrClose,
                                self.text,
                                sep.span.offset,
                            ))
                        }
                    }
                }
                _ => {
                    return Err(ParseError::at(
                        ParseErrorKind::ExpectedPropertyKey,
                        self.text,
                        tok.span.offset,
                    ))
                }
            }
        }
    }

    fn parse_array(&mut self, open: Token) -> Result<CstValue, ParseError> {
        let mut items = Vec::new();
        loop {
            let tok = self.require_significant(ParseErrorKind::UnexpectedEndOfText)?;
            if tok.kind == TokenKind::CloseBracket {
                return Ok(CstValue::Array {
                    span: enclosing(open.span, tok.span),
                    items,
                });
            }
            items.push(self.parse_value(tok)?);
            let sep = self.require_significant(ParseErrorKind::ExpectedCommaOrClose)?;
            match sep.kind {
                TokenKind::Comma => {}
                TokenKind::CloseBracket => {
                    return Ok(CstValue::Array {
                        span: enclosing(open.span, sep.span),
                        items,
                    })
                }
                _ => {
                    return Err(ParseError::at(
                        ParseErrorKind::ExpectedCommaOrClose,
                        self.text,
                        sep.span.offset,
                    ))
                }
            }
        }
    }
}

fn enclosing(first: Span, last: Span) -> Span {
    Span::new(first.offset, last.end() - first.offset)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]
    #![allow(clippy::panic)]

    use super::*;

    #[test]
    fn parses_nested_document_with_spans() {
        let text = r#"{ "a": { "b": [1, 2] }, "c": "x" }"#;
        let root = parse_tree(text).expect("parse");
        let CstValue::Object { span, members } = &root else {
            panic!("expected object root");
        };
        assert_eq!(span.slice(text), text);
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].key.name, "a");
        assert_eq!(members[1].value.span().slice(text), "\"x\"");
    }

    #[test]
    fn accepts_comments_and_trailing_commas() {
        let text = "// header\n{\n  \"a\": 1, /* mid */\n  \"b\": [1, 2,],\n}";
        let root = parse_tree(text).expect("parse");
        let CstValue::Object { members, .. } = &root else {
            panic!("expected object root");
        };
        assert_eq!(members.len(), 2);
        let CstValue::Array { items, .. } = &members[1].value else {
            panic!("expected array");
        };
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn rejects_trailing_content_with_location() {
        let err = parse_tree("{} true").expect_err("must fail");
        assert_eq!(err.kind, ParseErrorKind::TrailingCharacters);
        assert_eq!(err.offset, 3);
        assert_eq!((err.line, err.column), (1, 4));
    }

    #[test]
    fn rejects_missing_colon() {
        let err = parse_tree(r#"{ "a" 1 }"#).expect_err("must fail");
        assert_eq!(err.kind, ParseErrorKind::ExpectedColon);
    }

    #[test]
    fn rejects_unclosed_object_at_end_of_text() {
        let err = parse_tree("{ \"a\": 1 ").expect_err("must fail");
        assert_eq!(err.kind, ParseErrorKind::ExpectedCommaOrClose);
    }

    #[test]
    fn resolves_paths_with_last_duplicate_winning() {
        let text = r#"{ "a": { "k": 1, "k": 2 }, "list": [10, 20] }"#;
        let root = parse_tree(text).expect("parse");
        let path = JsonPath::root().append("a").append("k");
        let Some(CstValue::Number { value, .. }) = node_at_path(&root, &path) else {
            panic!("expected number");
        };
        assert_eq!(value.as_i64(), Some(2));

        let idx = JsonPath::root().append("list").append(1);
        let Some(CstValue::Number { value, .. }) = node_at_path(&root, &idx) else {
            panic!("expected number");
        };
        assert_eq!(value.as_i64(), Some(20));

        assert!(node_at_path(&root, &JsonPath::root().append("missing")).is_none());
        assert!(node_at_path(&root, &JsonPath::root().append("list").append(5)).is_none());
    }

    #[test]
    fn bare_scalar_root_parses() {
        let root = parse_tree("  42 // answer\n").expect("parse");
        let CstValue::Number { span, value } = &root else {
            panic!("expected number root");
        };
        assert_eq!(span.offset, 2);
        assert_eq!(value.as_i64(), Some(42));
    }
}
