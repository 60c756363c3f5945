//! Evaluation order of a node graph's children.

use std::collections::{HashMap, VecDeque};

use mx_core::ElementId;
use tracing::debug;

use crate::document::{Document, Element, ElementKind};
use crate::error::{GraphError, GraphResult};

impl Document {
    pub(crate) fn require_graph(&self, graph: ElementId) -> GraphResult<&Element> {
        let element = self.get(graph)?;
        if !element.is(ElementKind::NodeGraph) {
            return Err(GraphError::NotAGraph {
                name: element.name().to_string(),
                kind: element.kind().tag(),
            });
        }
        Ok(element)
    }

    /// Order the direct children of `graph` so that every producer precedes its consumers.
    ///
    /// Kahn's algorithm, O(children + edges). Children that become ready at
    /// the same time keep their declaration order. Nested graphs are not
    /// entered. Fails with [`GraphError::CycleDetected`] if any children
    /// remain unordered.
    pub fn topological_sort(&self, graph: ElementId) -> GraphResult<Vec<ElementId>> {
        let children = self.require_graph(graph)?.children();

        let mut in_degree: HashMap<ElementId, usize> = HashMap::with_capacity(children.len());
        let mut queue = VecDeque::new();
        for &child in children {
            let connection_count = self.upstream_edges(child).count();
            in_degree.insert(child, connection_count);
            if connection_count == 0 {
                queue.push_back(child);
            }
        }

        let mut order = Vec::with_capacity(children.len());
        while let Some(child) = queue.pop_front() {
            order.push(child);

            if self.kind(child) != Some(ElementKind::Node) {
                continue;
            }
            for port in self.downstream_ports(child) {
                let downstream = match self.kind(port) {
                    Some(ElementKind::Output) => Some(port),
                    _ => self.parent(port),
                };
                let Some(degree) = downstream.and_then(|element| in_degree.get_mut(&element)) else {
                    continue;
                };
                match *degree {
                    0 => {}
                    1 => {
                        *degree = 0;
                        queue.extend(downstream);
                    }
                    _ => *degree -= 1,
                }
            }
        }

        if order.len() != children.len() {
            let name = self.name(graph).unwrap_or_default().to_string();
            return Err(GraphError::CycleDetected { graph: name });
        }
        debug!(graph = %graph, count = order.len(), "sorted graph children");
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_sorts_in_dependency_order() {
        let mut doc = Document::new();
        let graph = doc.add_node_graph(doc.root(), "NG").unwrap();
        let c = doc.add_node(graph, "add", "C", "float").unwrap();
        let b = doc.add_node(graph, "add", "B", "float").unwrap();
        let a = doc.add_node(graph, "constant", "A", "float").unwrap();
        doc.set_connected_node(b, "in", Some(a)).unwrap();
        doc.set_connected_node(c, "in", Some(b)).unwrap();

        assert_eq!(doc.topological_sort(graph).unwrap(), vec![a, b, c]);
    }

    #[test]
    fn ready_children_keep_declaration_order() {
        let mut doc = Document::new();
        let graph = doc.add_node_graph(doc.root(), "NG").unwrap();
        let x = doc.add_node(graph, "constant", "x", "float").unwrap();
        let y = doc.add_node(graph, "constant", "y", "float").unwrap();
        let z = doc.add_node(graph, "constant", "z", "float").unwrap();

        assert_eq!(doc.topological_sort(graph).unwrap(), vec![x, y, z]);
    }

    #[test]
    fn outputs_follow_their_producers() {
        let mut doc = Document::new();
        let graph = doc.add_node_graph(doc.root(), "NG").unwrap();
        let out = doc.add_output(graph, "out", "float").unwrap();
        let a = doc.add_node(graph, "constant", "a", "float").unwrap();
        let b = doc.add_node(graph, "add", "b", "float").unwrap();
        doc.set_connected_node(b, "in1", Some(a)).unwrap();
        doc.set_connected_node(b, "in2", Some(a)).unwrap();
        doc.set_port_connected_node(out, Some(b)).unwrap();

        assert_eq!(doc.topological_sort(graph).unwrap(), vec![a, b, out]);
    }

    #[test]
    fn mutual_connection_is_a_cycle() {
        let mut doc = Document::new();
        let graph = doc.add_node_graph(doc.root(), "NG_loop").unwrap();
        let x = doc.add_node(graph, "add", "X", "float").unwrap();
        let y = doc.add_node(graph, "add", "Y", "float").unwrap();
        doc.set_connected_node(x, "in", Some(y)).unwrap();
        doc.set_connected_node(y, "in", Some(x)).unwrap();

        let err = doc.topological_sort(graph).unwrap_err();
        assert_eq!(
            err,
            GraphError::CycleDetected {
                graph: "NG_loop".into()
            }
        );
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let mut doc = Document::new();
        let graph = doc.add_node_graph(doc.root(), "NG").unwrap();
        let a = doc.add_node(graph, "add", "a", "float").unwrap();
        doc.set_connected_node(a, "in", Some(a)).unwrap();

        assert!(matches!(
            doc.topological_sort(graph),
            Err(GraphError::CycleDetected { .. })
        ));
    }

    #[test]
    fn sort_requires_a_node_graph() {
        let mut doc = Document::new();
        let node = doc.add_node(doc.root(), "add", "a", "float").unwrap();
        assert!(matches!(
            doc.topological_sort(node),
            Err(GraphError::NotAGraph { kind: "node", .. })
        ));
    }

    #[test]
    fn empty_graph_sorts_to_nothing() {
        let mut doc = Document::new();
        let graph = doc.add_node_graph(doc.root(), "NG").unwrap();
        assert!(doc.topological_sort(graph).unwrap().is_empty());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Build a graph of `count` nodes where each `(from, to)` pair with
    /// `from < to` connects node `from` into node `to`.
    fn dag(count: usize, links: &[(usize, usize)]) -> (Document, ElementId, Vec<ElementId>) {
        let mut doc = Document::new();
        let graph = doc.add_node_graph(doc.root(), "NG").unwrap();
        let nodes: Vec<ElementId> = (0..count)
            .map(|i| doc.add_node(graph, "add", &format!("n{i}"), "float").unwrap())
            .collect();
        for (slot, &(a, b)) in links.iter().enumerate() {
            let (from, to) = (a.min(b), a.max(b));
            if from != to {
                doc.set_connected_node(nodes[to], &format!("in{slot}"), Some(nodes[from]))
                    .unwrap();
            }
        }
        (doc, graph, nodes)
    }

    proptest! {
        #[test]
        fn acyclic_graphs_sort_every_edge_forward(
            count in 1_usize..12,
            links in prop::collection::vec((0_usize..12, 0_usize..12), 0..30),
        ) {
            let links: Vec<_> = links.into_iter().map(|(a, b)| (a % count, b % count)).collect();
            let (doc, graph, nodes) = dag(count, &links);
            let order = doc.topological_sort(graph).unwrap();

            prop_assert_eq!(order.len(), nodes.len());
            let position = |id: ElementId| order.iter().position(|&o| o == id).unwrap();
            for &node in &nodes {
                for edge in doc.upstream_edges(node) {
                    prop_assert!(position(edge.upstream) < position(node));
                }
            }
        }

        #[test]
        fn back_edge_is_detected(count in 2_usize..10) {
            let links: Vec<_> = (1..count).map(|i| (i - 1, i)).collect();
            let (mut doc, graph, nodes) = dag(count, &links);
            doc.set_connected_node(nodes[0], "back", Some(nodes[count - 1])).unwrap();

            let is_cycle = matches!(
                doc.topological_sort(graph),
                Err(GraphError::CycleDetected { .. })
            );
            prop_assert!(is_cycle);
        }
    }
}
