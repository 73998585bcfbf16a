// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Concrete-syntax layer for Trellis: a JSON-with-comments scanner, a
//! span-carrying syntax tree, path addressing, and format-preserving
//! text edits.
//!
//! Unlike a plain JSON value parser, everything here keeps byte spans
//! into the original text so that a targeted value can be replaced
//! in place — whitespace, indentation, and comments elsewhere in the
//! document stay byte-for-byte intact.

mod edit;
mod error;
mod path;
mod scanner;
mod tree;

/// Edit planning and application against source text.
pub use edit::{apply_edits, plan_set_value, set_value, FormatOptions, TextEdit};
/// Error types for scanning/parsing and edit planning.
pub use error::{EditError, ParseError, ParseErrorKind};
/// Path model addressing locations inside a JSON value.
pub use path::{JsonPath, PathSegment};
/// Token-level scanner over JSON-with-comments text.
pub use scanner::{Scanner, Token, TokenKind};
/// Span-carrying syntax tree and path resolution.
pub use tree::{node_at_path, parse_tree, CstKey, CstMember, CstValue, Span};
