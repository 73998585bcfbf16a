// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The authoritative source text backing a session.

use blake3::Hasher;

/// The live JSON-with-comments source text, plus a revision counter.
///
/// Exactly one document is live per session. Graph artifacts (nodes,
/// edges, paths) are only valid relative to the revision they were
/// derived from; every text change bumps the revision.
#[derive(Debug, Clone, Default)]
pub struct Document {
    text: String,
    revision: u64,
}

impl Document {
    /// The current source text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Monotonic revision counter; bumps on every text change.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Length of the text in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// `true` when no text has been loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Stable, domain-separated content fingerprint (`blake3`).
    #[must_use]
    pub fn content_hash(&self) -> [u8; 32] {
        let mut hasher = Hasher::new();
        hasher.update(b"doc:");
        hasher.update(self.text.as_bytes());
        hasher.finalize().into()
    }

    /// Replaces the text wholesale and bumps the revision.
    pub(crate) fn replace(&mut self, text: String) {
        self.text = text;
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_bumps_revision() {
        let mut doc = Document::default();
        assert_eq!(doc.revision(), 0);
        assert!(doc.is_empty());
        doc.replace("{}".to_string());
        assert_eq!(doc.revision(), 1);
        assert_eq!(doc.text(), "{}");
        doc.replace("[]".to_string());
        assert_eq!(doc.revision(), 2);
    }

    #[test]
    fn content_hash_tracks_text() {
        let mut a = Document::default();
        let mut b = Document::default();
        a.replace("{ \"x\": 1 }".to_string());
        b.replace("{ \"x\": 1 }".to_string());
        assert_eq!(a.content_hash(), b.content_hash());
        b.replace("{ \"x\": 2 }".to_string());
        assert_ne!(a.content_hash(), b.content_hash());
    }
}
