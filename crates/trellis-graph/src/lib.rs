// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Canonical node/edge graph projection of a JSON document.
//! Pure data (nodes, rows, edges) with deterministic ids and hashing.
//!
//! Every object or array in the document becomes one [`Node`]; each of
//! its immediate members becomes a [`Row`]; container members add an
//! [`Edge`] to the nested node. Ids are assigned in pre-order, so
//! projecting identical text twice yields identical graphs.

mod project;

use std::fmt;

use blake3::Hash;
use ciborium::ser::into_writer;
use serde::{Deserialize, Serialize};

/// Projection from a parsed syntax tree to a graph.
pub use project::{project, project_text};

pub use trellis_jsonc::{JsonPath, PathSegment};

/// Blake3 canonical graph hash (32 bytes).
pub type Hash32 = [u8; 32];

/// Stable node identifier, assigned in pre-order starting at 1.
#[repr(transparent)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

/// Classification of a row's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowKind {
    /// JSON string.
    String,
    /// JSON number.
    Number,
    /// JSON boolean.
    Boolean,
    /// JSON null.
    Null,
    /// Nested array (content lives in the edge target).
    Array,
    /// Nested object (content lives in the edge target).
    Object,
}

impl RowKind {
    /// `true` for the container kinds.
    #[must_use]
    pub fn is_container(self) -> bool {
        matches!(self, Self::Array | Self::Object)
    }
}

impl fmt::Display for RowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Null => "null",
            Self::Array => "array",
            Self::Object => "object",
        };
        f.write_str(name)
    }
}

/// A row's value: a scalar, or an opaque marker for a nested container.
///
/// A closed tagged enum rather than a dynamic value: the kind of every
/// row is decided once, at construction, by matching on this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RowValue {
    /// String scalar.
    String(String),
    /// Number scalar.
    Number(serde_json::Number),
    /// Boolean scalar.
    Bool(bool),
    /// Null scalar.
    Null,
    /// Marker for a nested array; elements live in the edge target.
    Array,
    /// Marker for a nested object; members live in the edge target.
    Object,
}

impl RowValue {
    /// Classifies a runtime JSON value. Containers map to markers.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => Self::String(s.clone()),
            serde_json::Value::Number(n) => Self::Number(n.clone()),
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Array(_) => Self::Array,
            serde_json::Value::Object(_) => Self::Object,
        }
    }

    /// The row kind this value implies.
    #[must_use]
    pub fn kind(&self) -> RowKind {
        match self {
            Self::String(_) => RowKind::String,
            Self::Number(_) => RowKind::Number,
            Self::Bool(_) => RowKind::Boolean,
            Self::Null => RowKind::Null,
            Self::Array => RowKind::Array,
            Self::Object => RowKind::Object,
        }
    }

    /// The scalar as a JSON value; `None` for container markers.
    #[must_use]
    pub fn as_json(&self) -> Option<serde_json::Value> {
        match self {
            Self::String(s) => Some(serde_json::Value::String(s.clone())),
            Self::Number(n) => Some(serde_json::Value::Number(n.clone())),
            Self::Bool(b) => Some(serde_json::Value::Bool(*b)),
            Self::Null => Some(serde_json::Value::Null),
            Self::Array | Self::Object => None,
        }
    }
}

/// One immediate member of a node's underlying container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Member key; `None` for array elements and bare scalar roots.
    pub key: Option<String>,
    /// Member value (scalar) or container marker.
    pub value: RowValue,
}

impl Row {
    /// The row's kind, derived from its value.
    #[must_use]
    pub fn kind(&self) -> RowKind {
        self.value.kind()
    }
}

/// Graph representation of one JSON container (or a bare scalar root).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Stable pre-order identifier.
    pub id: NodeId,
    /// Location of the container in the document.
    pub path: JsonPath,
    /// Immediate members, first-encountered first.
    pub rows: Vec<Row>,
}

/// Directed parent→child relation for a container-valued row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Owning node.
    pub from: NodeId,
    /// Node holding the nested container.
    pub to: NodeId,
}

/// The full projected graph, in deterministic order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentGraph {
    /// Nodes in pre-order (ids ascending).
    pub nodes: Vec<Node>,
    /// Edges in discovery order.
    pub edges: Vec<Edge>,
}

impl DocumentGraph {
    /// Looks up a node by id.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Mutable lookup by id.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// `true` when the graph holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Canonical serialization for hashing/comparison.
    ///
    /// Nodes and edges are already in deterministic (pre-order)
    /// positions, so no sorting pass is needed before encoding.
    pub fn to_canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        into_writer(self, &mut bytes).expect("canonical serialize");
        bytes
    }

    /// Compute blake3 hash of the canonical form.
    pub fn compute_hash(&self) -> Hash32 {
        let h: Hash = blake3::hash(&self.to_canonical_bytes());
        h.into()
    }
}
