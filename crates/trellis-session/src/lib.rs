// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Editing session for Trellis documents.
//!
//! A [`Session`] owns the authoritative source text and the node/edge
//! graph derived from it, and keeps the two mutually consistent: field
//! edits are planned against the text, validated as a whole, spliced
//! atomically, and only then reflected into the in-memory rows. There
//! is no ambient global — callers hold the session and pass it around.

mod document;
mod events;
mod session;
mod sink;

/// Authoritative document text with revision tracking.
pub use document::Document;
/// Post-operation change notifications.
pub use events::SessionEvent;
/// The session itself plus its configuration and outcomes.
pub use session::{LoadOutcome, Session, SessionConfig, SessionError, SessionView, DEFAULT_NODE_LIMIT};
/// Text-persistence port and in-memory adapters.
pub use sink::{MemoryTextSink, NullTextSink, SinkError, TextSink, TextUpdate, UpdateOrigin};
