//! Derived dataflow edges.
//!
//! Edges are never stored. They are computed from the current connection
//! state every time they are queried.

use mx_core::ElementId;

use crate::document::{Document, ElementKind};

/// A directed dependency: `downstream` consumes the value produced by `upstream`.
///
/// The "null edge" of an unconnected slot is represented as `None` by the
/// query functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    /// Consuming node, or a graph output.
    pub downstream: ElementId,
    /// Input carrying the connection. `None` when the consumer is itself a port.
    pub connecting: Option<ElementId>,
    /// Producing node.
    pub upstream: ElementId,
}

impl Document {
    /// Number of upstream slots: one per input of a node, one for a port, zero otherwise.
    pub fn upstream_edge_count(&self, id: ElementId) -> usize {
        match self.kind(id) {
            Some(ElementKind::Node) => self.inputs(id).len(),
            Some(kind) if kind.is_port() => 1,
            _ => 0,
        }
    }

    /// Edge feeding upstream slot `index`, or `None` if the slot is out of range or unbound.
    pub fn upstream_edge(&self, id: ElementId, index: usize) -> Option<Edge> {
        match self.kind(id)? {
            ElementKind::Node => {
                let input = *self.inputs(id).get(index)?;
                let upstream = self.port_connected_node(input)?;
                Some(Edge {
                    downstream: id,
                    connecting: Some(input),
                    upstream,
                })
            }
            kind if kind.is_port() && index == 0 => {
                let upstream = self.port_connected_node(id)?;
                Some(Edge {
                    downstream: id,
                    connecting: None,
                    upstream,
                })
            }
            _ => None,
        }
    }

    /// All bound upstream edges of an element, in slot order.
    pub fn upstream_edges(&self, id: ElementId) -> impl Iterator<Item = Edge> + '_ {
        (0..self.upstream_edge_count(id)).filter_map(move |index| self.upstream_edge(id, index))
    }

    /// Every port in the document currently connected to `node`, in document order.
    ///
    /// This is a full document scan; callers issuing many queries should cache.
    pub fn downstream_ports(&self, node: ElementId) -> Vec<ElementId> {
        let Some(name) = self.name(node) else {
            return Vec::new();
        };
        self.matching_ports(name)
            .into_iter()
            .filter(|&port| self.port_connected_node(port) == Some(node))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_edges_follow_input_order() {
        let mut doc = Document::new();
        let graph = doc.add_node_graph(doc.root(), "NG").unwrap();
        let a = doc.add_node(graph, "constant", "a", "float").unwrap();
        let b = doc.add_node(graph, "constant", "b", "float").unwrap();
        let sum = doc.add_node(graph, "add", "sum", "float").unwrap();
        let in1 = doc.set_connected_node(sum, "in1", Some(a)).unwrap();
        doc.add_input(sum, "unbound", "float").unwrap();
        let in2 = doc.set_connected_node(sum, "in2", Some(b)).unwrap();

        assert_eq!(doc.upstream_edge_count(sum), 3);
        assert_eq!(
            doc.upstream_edge(sum, 0),
            Some(Edge { downstream: sum, connecting: Some(in1), upstream: a })
        );
        assert_eq!(doc.upstream_edge(sum, 1), None);
        assert_eq!(doc.upstream_edge(sum, 2).map(|edge| edge.connecting), Some(Some(in2)));
        assert_eq!(doc.upstream_edge(sum, 3), None);
        assert_eq!(doc.upstream_edges(sum).count(), 2);
    }

    #[test]
    fn graph_output_has_one_upstream_slot() {
        let mut doc = Document::new();
        let graph = doc.add_node_graph(doc.root(), "NG").unwrap();
        let a = doc.add_node(graph, "constant", "a", "float").unwrap();
        let out = doc.add_output(graph, "out", "float").unwrap();
        assert_eq!(doc.upstream_edge_count(out), 1);
        assert_eq!(doc.upstream_edge(out, 0), None);

        doc.set_port_connected_node(out, Some(a)).unwrap();
        let edge = doc.upstream_edge(out, 0).unwrap();
        assert_eq!(edge.upstream, a);
        assert_eq!(edge.connecting, None);
        assert_eq!(doc.upstream_edge_count(graph), 0);
    }

    #[test]
    fn downstream_ports_are_in_document_order() {
        let mut doc = Document::new();
        let graph = doc.add_node_graph(doc.root(), "NG").unwrap();
        let a = doc.add_node(graph, "constant", "a", "float").unwrap();
        let b = doc.add_node(graph, "add", "b", "float").unwrap();
        let c = doc.add_node(graph, "add", "c", "float").unwrap();
        let b_in = doc.set_connected_node(b, "in1", Some(a)).unwrap();
        let c_in1 = doc.set_connected_node(c, "in1", Some(a)).unwrap();
        let c_in2 = doc.set_connected_node(c, "in2", Some(b)).unwrap();
        let out = doc.add_output(graph, "out", "float").unwrap();
        doc.set_port_connected_node(out, Some(a)).unwrap();

        assert_eq!(doc.downstream_ports(a), vec![b_in, c_in1, out]);
        assert_eq!(doc.downstream_ports(b), vec![c_in2]);
        assert!(doc.downstream_ports(c).is_empty());
    }

    #[test]
    fn same_name_in_another_graph_is_not_downstream() {
        let mut doc = Document::new();
        let first = doc.add_node_graph(doc.root(), "NG1").unwrap();
        let second = doc.add_node_graph(doc.root(), "NG2").unwrap();
        let a1 = doc.add_node(first, "constant", "a", "float").unwrap();
        doc.add_node(second, "constant", "a", "float").unwrap();
        let consumer = doc.add_node(second, "add", "b", "float").unwrap();
        doc.set_connected_node_name(consumer, "in1", "a").unwrap();

        assert!(doc.downstream_ports(a1).is_empty());
    }
}
