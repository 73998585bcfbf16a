// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Projection of a parsed syntax tree into the node/edge graph.

use trellis_jsonc::{parse_tree, CstValue, JsonPath, ParseError};

use crate::{DocumentGraph, Edge, Node, NodeId, Row, RowValue};

/// Projects a parsed document into its graph.
///
/// Total over any tree: every container becomes a node in pre-order
/// (first-encountered member first), every immediate scalar member a
/// row, every immediate container member a marker row plus an edge.
/// A bare scalar root becomes a single synthetic node with one
/// keyless row.
#[must_use]
pub fn project(root: &CstValue) -> DocumentGraph {
    let mut builder = Builder {
        nodes: Vec::new(),
        edges: Vec::new(),
        next_id: 1,
    };
    if root.is_container() {
        builder.visit_container(root, JsonPath::root());
    } else {
        let id = builder.alloc();
        builder.nodes.push(Node {
            id,
            path: JsonPath::root(),
            rows: vec![Row {
                key: None,
                value: row_value(root),
            }],
        });
    }
    DocumentGraph {
        nodes: builder.nodes,
        edges: builder.edges,
    }
}

/// Parses `text` and projects it in one step.
///
/// # Errors
///
/// Returns the parse error when `text` is not valid
/// JSON-with-comments.
pub fn project_text(text: &str) -> Result<DocumentGraph, ParseError> {
    let root = parse_tree(text)?;
    Ok(project(&root))
}

struct Builder {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    next_id: u64,
}

impl Builder {
    fn alloc(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Materializes `value` (a container) as a node, then descends
    /// into container members depth-first so ids stay pre-order.
    fn visit_container(&mut self, value: &CstValue, path: JsonPath) -> NodeId {
        debug_assert!(value.is_container());
        let id = self.alloc();
        let slot = self.nodes.len();
        self.nodes.push(Node {
            id,
            path: path.clone(),
            rows: Vec::new(),
        });
        let mut rows = Vec::new();
        match value {
            CstValue::Object { members, .. } => {
                for member in members {
                    rows.push(Row {
                        key: Some(member.key.name.clone()),
                        value: row_value(&member.value),
                    });
                    if member.value.is_container() {
                        let child_path = path.append(member.key.name.clone());
                        let child = self.visit_container(&member.value, child_path);
                        self.edges.push(Edge { from: id, to: child });
                    }
                }
            }
            CstValue::Array { items, .. } => {
                for (index, item) in items.iter().enumerate() {
                    rows.push(Row {
                        key: None,
                        value: row_value(item),
                    });
                    if item.is_container() {
                        let child = self.visit_container(item, path.append(index));
                        self.edges.push(Edge { from: id, to: child });
                    }
                }
            }
            _ => {}
        }
        self.nodes[slot].rows = rows;
        id
    }
}

fn row_value(value: &CstValue) -> RowValue {
    match value {
        CstValue::String { value, .. } => RowValue::String(value.clone()),
        CstValue::Number { value, .. } => RowValue::Number(value.clone()),
        CstValue::Bool { value, .. } => RowValue::Bool(*value),
        CstValue::Null { .. } => RowValue::Null,
        CstValue::Array { .. } => RowValue::Array,
        CstValue::Object { .. } => RowValue::Object,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    #![allow(clippy::panic)]

    use super::*;
    use crate::RowKind;
    use trellis_jsonc::PathSegment;

    #[test]
    fn projects_nested_containers_preorder() {
        let graph = project_text(
            r#"{ "name": "n", "meta": { "tags": [1, 2] }, "flag": true }"#,
        )
        .expect("project");

        // Pre-order: root, meta, tags.
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.nodes[0].id, NodeId(1));
        assert!(graph.nodes[0].path.is_root());
        assert_eq!(graph.nodes[1].id, NodeId(2));
        assert_eq!(
            graph.nodes[1].path.segments(),
            &[PathSegment::Key("meta".to_string())]
        );
        assert_eq!(
            graph.nodes[2].path.segments(),
            &[
                PathSegment::Key("meta".to_string()),
                PathSegment::Key("tags".to_string()),
            ]
        );

        // Root rows keep document order and classify members.
        let rows = &graph.nodes[0].rows;
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].key.as_deref(), Some("name"));
        assert_eq!(rows[0].kind(), RowKind::String);
        assert_eq!(rows[1].kind(), RowKind::Object);
        assert_eq!(rows[2].kind(), RowKind::Boolean);

        assert_eq!(
            graph.edges,
            vec![
                Edge {
                    from: NodeId(1),
                    to: NodeId(2)
                },
                Edge {
                    from: NodeId(2),
                    to: NodeId(3)
                },
            ]
        );
    }

    #[test]
    fn sibling_subtrees_number_first_encountered_first() {
        let graph = project_text(r#"{ "a": { "deep": { } }, "b": { } }"#).expect("project");
        // a's subtree takes ids 2..=3 before b gets 4.
        assert_eq!(graph.node_count(), 4);
        assert_eq!(
            graph.nodes[1].path.segments(),
            &[PathSegment::Key("a".to_string())]
        );
        assert_eq!(graph.nodes[2].id, NodeId(3));
        assert_eq!(
            graph.nodes[3].path.segments(),
            &[PathSegment::Key("b".to_string())]
        );
    }

    #[test]
    fn array_rows_are_keyless() {
        let graph = project_text(r#"[10, { "x": 1 }, "s"]"#).expect("project");
        let root = &graph.nodes[0];
        assert_eq!(root.rows.len(), 3);
        assert!(root.rows.iter().all(|r| r.key.is_none()));
        assert_eq!(root.rows[1].kind(), RowKind::Object);
        assert_eq!(
            graph.nodes[1].path.segments(),
            &[PathSegment::Index(1)]
        );
    }

    #[test]
    fn bare_scalar_root_gets_synthetic_node() {
        let graph = project_text("\"hello\"").expect("project");
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
        let node = &graph.nodes[0];
        assert!(node.path.is_root());
        assert_eq!(node.rows.len(), 1);
        assert!(node.rows[0].key.is_none());
        assert_eq!(node.rows[0].value, RowValue::String("hello".to_string()));
    }

    #[test]
    fn empty_containers_still_become_nodes() {
        let graph = project_text(r#"{ "a": {}, "b": [] }"#).expect("project");
        assert_eq!(graph.node_count(), 3);
        assert!(graph.nodes[1].rows.is_empty());
        assert!(graph.nodes[2].rows.is_empty());
        assert_eq!(graph.edge_count(), 2);
    }
}
