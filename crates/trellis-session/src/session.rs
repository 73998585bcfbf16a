// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The session: graph store plus reconciliation orchestrator.

use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::{debug, info, warn};
use trellis_graph::{project, DocumentGraph, Edge, JsonPath, Node, NodeId, RowValue};
use trellis_jsonc::{
    apply_edits, parse_tree, plan_set_value, EditError, FormatOptions, ParseError, TextEdit,
};

use crate::document::Document;
use crate::events::SessionEvent;
use crate::sink::{SinkError, TextSink, TextUpdate, UpdateOrigin};

/// Default ceiling on the number of nodes a session will expose.
pub const DEFAULT_NODE_LIMIT: usize = 600;

/// Tunable session behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Formatting applied at edit sites.
    pub format: FormatOptions,
    /// Maximum node count exposed to consumers.
    pub node_limit: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            format: FormatOptions::default(),
            node_limit: DEFAULT_NODE_LIMIT,
        }
    }
}

/// Result of a successful [`Session::load_document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The graph is available through [`Session::view`].
    Loaded {
        /// Nodes in the graph.
        node_count: usize,
    },
    /// The parse succeeded but the graph is withheld: too many nodes.
    TooLarge {
        /// Nodes the parse produced.
        node_count: usize,
    },
}

/// Error surfaced by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The text failed to parse; the previous state is retained.
    #[error("document parse failed: {0}")]
    Syntax(#[from] ParseError),
    /// No node with the given id exists (or it is withheld).
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),
    /// A field to edit could not be located in the document text.
    #[error("path {path} not found in document")]
    PathNotFound {
        /// The unresolved field path.
        path: JsonPath,
    },
    /// A replacement value was a container; field edits must stay scalar.
    #[error("field `{key}` must be replaced with a scalar value")]
    ScalarRequired {
        /// The offending change key.
        key: String,
    },
    /// Edit planning or application failed structurally.
    #[error("edit failed: {0}")]
    Edit(EditError),
    /// The text-persistence adapter failed.
    #[error("text persistence failed: {0}")]
    Sink(#[from] SinkError),
}

/// Read-only snapshot handed to presentation collaborators.
///
/// While the node ceiling is exceeded the node/edge slices are empty
/// and `above_limit` is set — the graph exists but is withheld.
#[derive(Debug, Clone, Copy)]
pub struct SessionView<'a> {
    /// Exposed nodes (empty when withheld).
    pub nodes: &'a [Node],
    /// Exposed edges (empty when withheld).
    pub edges: &'a [Edge],
    /// Currently selected node, if any.
    pub selected: Option<&'a Node>,
    /// `true` when the last load exceeded the node ceiling.
    pub above_limit: bool,
    /// Document revision the view corresponds to.
    pub revision: u64,
}

/// Owns the authoritative text and the graph derived from it.
///
/// Single-writer: every operation runs to completion (or fails) on
/// the calling thread before the next begins, so readers only ever
/// observe fully reconciled snapshots.
#[derive(Debug)]
pub struct Session<S> {
    config: SessionConfig,
    document: Document,
    graph: DocumentGraph,
    index: FxHashMap<NodeId, usize>,
    selected: Option<NodeId>,
    above_limit: bool,
    events: Vec<SessionEvent>,
    sink: S,
}

impl<S> Session<S> {
    /// Creates a session with default configuration.
    pub fn new(sink: S) -> Self {
        Self::with_config(SessionConfig::default(), sink)
    }

    /// Creates a session with explicit configuration.
    pub fn with_config(config: SessionConfig, sink: S) -> Self {
        Self {
            config,
            document: Document::default(),
            graph: DocumentGraph::default(),
            index: FxHashMap::default(),
            selected: None,
            above_limit: false,
            events: Vec::new(),
            sink,
        }
    }

    /// The session configuration.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The authoritative document.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Shared access to the persistence adapter.
    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consumes the session, returning the adapter.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Snapshot for presentation collaborators.
    #[must_use]
    pub fn view(&self) -> SessionView<'_> {
        if self.above_limit {
            SessionView {
                nodes: &[],
                edges: &[],
                selected: None,
                above_limit: true,
                revision: self.document.revision(),
            }
        } else {
            SessionView {
                nodes: &self.graph.nodes,
                edges: &self.graph.edges,
                selected: self.selected.and_then(|id| self.node(id)),
                above_limit: false,
                revision: self.document.revision(),
            }
        }
    }

    /// The currently selected node, if any (and not withheld).
    #[must_use]
    pub fn selected_node(&self) -> Option<&Node> {
        if self.above_limit {
            return None;
        }
        self.selected.and_then(|id| self.node(id))
    }

    /// Drains queued change notifications.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Selects a node by id.
    ///
    /// # Errors
    ///
    /// [`SessionError::NodeNotFound`] for unknown or withheld nodes;
    /// the selection is left unchanged.
    pub fn select_node(&mut self, id: NodeId) -> Result<(), SessionError> {
        if self.above_limit || !self.index.contains_key(&id) {
            return Err(SessionError::NodeNotFound(id));
        }
        self.selected = Some(id);
        self.events.push(SessionEvent::SelectionChanged { id: Some(id) });
        Ok(())
    }

    /// Drops the graph and selection; the document text is kept.
    pub fn clear(&mut self) {
        self.graph = DocumentGraph::default();
        self.index.clear();
        self.selected = None;
        self.above_limit = false;
        self.events.push(SessionEvent::GraphCleared);
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.index.get(&id).map(|&slot| &self.graph.nodes[slot])
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .graph
            .nodes
            .iter()
            .enumerate()
            .map(|(slot, node)| (node.id, slot))
            .collect();
    }

    /// Replaces the document and recomputes the full graph.
    ///
    /// On a parse error the previous document and graph are retained.
    /// When the parsed node count exceeds the configured ceiling the
    /// graph is computed but withheld, and `TooLarge` is reported.
    ///
    /// # Errors
    ///
    /// [`SessionError::Syntax`] when the text does not parse.
    pub fn load_document(
        &mut self,
        text: impl Into<String>,
    ) -> Result<LoadOutcome, SessionError> {
        let text = text.into();
        let root = parse_tree(&text)?;
        let graph = project(&root);
        let node_count = graph.node_count();

        self.document.replace(text);
        self.graph = graph;
        self.rebuild_index();
        self.selected = None;

        if node_count > self.config.node_limit {
            self.above_limit = true;
            warn!(
                node_count,
                limit = self.config.node_limit,
                "document exceeds node ceiling; graph withheld"
            );
            self.events.push(SessionEvent::LimitExceeded {
                node_count,
                limit: self.config.node_limit,
            });
            Ok(LoadOutcome::TooLarge { node_count })
        } else {
            self.above_limit = false;
            info!(
                node_count,
                revision = self.document.revision(),
                "document loaded"
            );
            self.events.push(SessionEvent::GraphReplaced {
                revision: self.document.revision(),
                node_count,
            });
            Ok(LoadOutcome::Loaded { node_count })
        }
    }
}

impl<S: TextSink> Session<S> {
    /// Applies a batch of field replacements to one node.
    ///
    /// `changes` maps row keys to replacement values, in caller order;
    /// duplicate keys dedupe to the last occurrence. Keys that do not
    /// name an existing keyed row are skipped. The effective batch is
    /// planned and validated in full against the current text, spliced
    /// as one atomic set of non-overlapping edits, reflected into the
    /// node's rows, and pushed to the persistence sink exactly once.
    /// A failure before the splice leaves every byte and row untouched.
    ///
    /// # Errors
    ///
    /// [`SessionError::NodeNotFound`] for unknown/withheld nodes,
    /// [`SessionError::ScalarRequired`] when a replacement is a
    /// container, [`SessionError::PathNotFound`] when a field cannot
    /// be located in the text, [`SessionError::Sink`] when persistence
    /// fails after the splice.
    pub fn update_fields(
        &mut self,
        id: NodeId,
        changes: &[(String, serde_json::Value)],
    ) -> Result<(), SessionError> {
        if self.above_limit {
            return Err(SessionError::NodeNotFound(id));
        }
        let slot = *self
            .index
            .get(&id)
            .ok_or(SessionError::NodeNotFound(id))?;
        let node = &self.graph.nodes[slot];

        let effective = effective_changes(node, changes)?;
        if effective.is_empty() {
            debug!(%id, "field-edit batch had no effective changes");
            return Ok(());
        }

        // Plan every field against the same text snapshot. Distinct
        // existing keys resolve to distinct value spans, so the batch
        // is non-overlapping by construction.
        let mut edits: Vec<TextEdit> = Vec::with_capacity(effective.len());
        for (key, value) in &effective {
            let field_path = node.path.append(key.as_str());
            let planned =
                plan_set_value(self.document.text(), &field_path, value, &self.config.format)
                    .map_err(field_error)?;
            edits.extend(planned);
        }
        let new_text = apply_edits(self.document.text(), &edits).map_err(field_error)?;

        // Point of no return: splice committed, reconcile rows in
        // place instead of re-parsing the whole document.
        self.document.replace(new_text);
        let node = &mut self.graph.nodes[slot];
        for row in &mut node.rows {
            let Some(row_key) = &row.key else { continue };
            if let Some((_, value)) = effective.iter().find(|(key, _)| key == row_key) {
                row.value = RowValue::from_json(value);
            }
        }

        let revision = self.document.revision();
        self.sink.persist(TextUpdate {
            text: self.document.text(),
            revision,
            origin: UpdateOrigin::FieldEdit,
        })?;
        info!(%id, revision, fields = effective.len(), "node fields updated");
        self.events.push(SessionEvent::NodeUpdated { id, revision });
        Ok(())
    }
}

/// Filters `changes` down to the batch that will actually apply:
/// keyed rows only, last duplicate wins, scalars enforced up front so
/// a rejected batch mutates nothing.
fn effective_changes(
    node: &Node,
    changes: &[(String, serde_json::Value)],
) -> Result<Vec<(String, serde_json::Value)>, SessionError> {
    let mut effective: Vec<(String, serde_json::Value)> = Vec::new();
    for (key, value) in changes {
        let has_row = node
            .rows
            .iter()
            .any(|row| row.key.as_deref() == Some(key.as_str()));
        if !has_row {
            debug!(key = key.as_str(), "change key has no matching row; skipped");
            continue;
        }
        if value.is_array() || value.is_object() {
            return Err(SessionError::ScalarRequired { key: key.clone() });
        }
        if let Some(existing) = effective.iter_mut().find(|(k, _)| k == key) {
            existing.1 = value.clone();
        } else {
            effective.push((key.clone(), value.clone()));
        }
    }
    Ok(effective)
}

fn field_error(err: EditError) -> SessionError {
    match err {
        EditError::Syntax(parse) => SessionError::Syntax(parse),
        EditError::PathNotFound { path } => SessionError::PathNotFound { path },
        other => SessionError::Edit(other),
    }
}
