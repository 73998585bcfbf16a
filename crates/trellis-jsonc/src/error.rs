// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Error types for the concrete-syntax layer.

use std::fmt;

use thiserror::Error;

use crate::path::JsonPath;

/// Failure while scanning or parsing JSON-with-comments text.
///
/// Carries the byte offset of the offending input plus the derived
/// 1-based line and column, so callers can surface a location without
/// re-scanning the document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at line {line}, column {column}")]
pub struct ParseError {
    /// What went wrong.
    pub kind: ParseErrorKind,
    /// Byte offset into the source text.
    pub offset: usize,
    /// 1-based line number derived from `offset`.
    pub line: usize,
    /// 1-based column (byte-based) derived from `offset`.
    pub column: usize,
}

impl ParseError {
    /// Builds an error at `offset`, deriving line/column from `text`.
    pub(crate) fn at(kind: ParseErrorKind, text: &str, offset: usize) -> Self {
        let (line, column) = line_column(text, offset);
        Self {
            kind,
            offset,
            line,
            column,
        }
    }
}

/// Classification of a [`ParseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A character that cannot start any token.
    UnexpectedCharacter,
    /// String literal ran to end of text without a closing quote.
    UnterminatedString,
    /// Backslash escape that is not part of the JSON escape set.
    InvalidEscape,
    /// `\u` escape with bad hex digits or an unpaired surrogate.
    InvalidUnicodeEscape,
    /// Raw control character (< U+0020) inside a string literal.
    ControlCharacterInString,
    /// Number literal violating the JSON number grammar.
    InvalidNumber,
    /// Block comment ran to end of text without `*/`.
    UnterminatedBlockComment,
    /// Text ended where a token was still required.
    UnexpectedEndOfText,
    /// Expected `:` between an object key and its value.
    ExpectedColon,
    /// Expected `,` or a closing bracket after a member/element.
    ExpectedCommaOrClose,
    /// Expected a value token.
    ExpectedValue,
    /// Expected a string key inside an object.
    ExpectedPropertyKey,
    /// Non-trivia content found after the root value.
    TrailingCharacters,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::UnexpectedCharacter => "unexpected character",
            Self::UnterminatedString => "unterminated string",
            Self::InvalidEscape => "invalid escape sequence",
            Self::InvalidUnicodeEscape => "invalid unicode escape",
            Self::ControlCharacterInString => "control character in string",
            Self::InvalidNumber => "invalid number literal",
            Self::UnterminatedBlockComment => "unterminated block comment",
            Self::UnexpectedEndOfText => "unexpected end of text",
            Self::ExpectedColon => "expected ':'",
            Self::ExpectedCommaOrClose => "expected ',' or closing bracket",
            Self::ExpectedValue => "expected a value",
            Self::ExpectedPropertyKey => "expected a property key",
            Self::TrailingCharacters => "unexpected content after the root value",
        };
        f.write_str(msg)
    }
}

/// Failure while planning or applying text edits.
#[derive(Debug, Error)]
pub enum EditError {
    /// The text does not parse as JSON-with-comments.
    #[error(transparent)]
    Syntax(#[from] ParseError),
    /// The target path resolves to nothing in the document.
    #[error("path {path} not found in document")]
    PathNotFound {
        /// The path that failed to resolve.
        path: JsonPath,
    },
    /// Two edits in one batch cover overlapping byte ranges.
    #[error("overlapping edits at offset {offset}")]
    OverlappingEdits {
        /// Offset of the second edit in the overlapping pair.
        offset: usize,
    },
    /// An edit range falls outside the text or splits a UTF-8 character.
    #[error("edit range {offset}..{end} is invalid for text of length {text_len}")]
    InvalidRange {
        /// Start offset of the bad edit.
        offset: usize,
        /// End offset of the bad edit.
        end: usize,
        /// Length of the text being edited.
        text_len: usize,
    },
    /// The replacement value failed to serialize.
    #[error("value serialization failed: {0}")]
    Serialize(String),
}

/// Derives a 1-based (line, column) pair for a byte offset.
pub(crate) fn line_column(text: &str, offset: usize) -> (usize, usize) {
    let clamped = offset.min(text.len());
    let prefix = &text.as_bytes()[..clamped];
    let line = 1 + prefix.iter().filter(|&&b| b == b'\n').count();
    let line_start = prefix
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |pos| pos + 1);
    (line, clamped - line_start + 1)
}
