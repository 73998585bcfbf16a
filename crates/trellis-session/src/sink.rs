// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Text-persistence port for the session.
//!
//! The session pushes the new source text through this port exactly
//! once per completed edit batch. Adapters (filesystem, memory, …)
//! live outside this crate; [`MemoryTextSink`] is provided for tests
//! and embedding.

use thiserror::Error;

/// Error type for persistence operations.
#[derive(Debug, Error)]
pub enum SinkError {
    /// I/O failure while writing the text.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Catch-all adapter failure.
    #[error("other: {0}")]
    Other(String),
}

/// Why the text changed.
///
/// The tag lets a store of record distinguish an edit whose graph is
/// already reconciled (no reload must be triggered) from a wholesale
/// external replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOrigin {
    /// A reconciled field edit; the in-memory graph already matches,
    /// the store must not re-trigger a parse/reload loop.
    FieldEdit,
    /// Text replaced from outside the session (store implementors may
    /// use this tag when echoing external writes).
    External,
}

/// One pushed text update.
#[derive(Debug, Clone, Copy)]
pub struct TextUpdate<'a> {
    /// The full new source text.
    pub text: &'a str,
    /// Document revision the text corresponds to.
    pub revision: u64,
    /// Why the text changed.
    pub origin: UpdateOrigin,
}

/// Storage port for the authoritative source text.
pub trait TextSink {
    /// Persists a text update.
    ///
    /// # Errors
    ///
    /// Adapter-specific failures surface as [`SinkError`].
    fn persist(&mut self, update: TextUpdate<'_>) -> Result<(), SinkError>;
}

/// In-memory sink capturing the last pushed update.
#[derive(Debug, Default)]
pub struct MemoryTextSink {
    last_text: Option<String>,
    last_origin: Option<UpdateOrigin>,
    persist_count: usize,
}

impl MemoryTextSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently persisted text, if any.
    #[must_use]
    pub fn last_text(&self) -> Option<&str> {
        self.last_text.as_deref()
    }

    /// Origin tag of the most recent persist.
    #[must_use]
    pub fn last_origin(&self) -> Option<UpdateOrigin> {
        self.last_origin
    }

    /// Number of persist calls observed.
    #[must_use]
    pub fn persist_count(&self) -> usize {
        self.persist_count
    }
}

impl TextSink for MemoryTextSink {
    fn persist(&mut self, update: TextUpdate<'_>) -> Result<(), SinkError> {
        self.last_text = Some(update.text.to_string());
        self.last_origin = Some(update.origin);
        self.persist_count += 1;
        Ok(())
    }
}

/// Sink that drops every update (for read-only sessions).
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTextSink;

impl TextSink for NullTextSink {
    fn persist(&mut self, _update: TextUpdate<'_>) -> Result<(), SinkError> {
        Ok(())
    }
}
