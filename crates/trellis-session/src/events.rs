// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Change notifications for presentation collaborators.
//!
//! Events are queued only after an operation has run to completion —
//! never mid-operation — and drained by the embedder at its own pace.

use trellis_graph::NodeId;

/// One completed-operation notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A document load replaced the whole graph.
    GraphReplaced {
        /// Revision of the document the graph was derived from.
        revision: u64,
        /// Number of nodes in the new graph.
        node_count: usize,
    },
    /// The graph (and selection) were cleared.
    GraphCleared,
    /// A load exceeded the node ceiling; the graph is withheld.
    LimitExceeded {
        /// Nodes the parse produced.
        node_count: usize,
        /// The configured ceiling.
        limit: usize,
    },
    /// The selected node changed.
    SelectionChanged {
        /// New selection, or `None` when cleared.
        id: Option<NodeId>,
    },
    /// A field-edit batch updated one node (and the document text).
    NodeUpdated {
        /// The edited node.
        id: NodeId,
        /// Revision of the document after the splice.
        revision: u64,
    },
}
