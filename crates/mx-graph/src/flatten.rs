//! Subgraph inlining.
//!
//! Nodes whose implementation for a target is itself a node graph are
//! replaced, breadth first, by copies of that graph's nodes until only
//! primitive nodes remain.

use std::collections::VecDeque;

use mx_core::ElementId;
use tracing::{debug, trace};

use crate::document::{Document, ElementKind, INTERFACE_NAME_ATTRIBUTE, VALUE_ATTRIBUTE};
use crate::error::{GraphError, GraphResult};

/// Default bound on nested inlining.
pub const DEFAULT_MAX_INLINE_DEPTH: usize = 64;

/// Tuning for [`Document::flatten_subgraphs_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlattenOptions {
    /// Maximum nesting of inlined subgraphs. Nodes present before the pass
    /// are at depth 0; nodes copied out of a depth `d` expansion are at
    /// depth `d + 1`. `None` removes the bound, in which case a definition
    /// that implements itself never terminates.
    pub max_depth: Option<usize>,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            max_depth: Some(DEFAULT_MAX_INLINE_DEPTH),
        }
    }
}

impl FlattenOptions {
    pub fn unbounded() -> Self {
        Self { max_depth: None }
    }
}

/// What a flattening pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlattenSummary {
    /// Reference nodes replaced by their subgraph contents.
    pub expanded: usize,
    /// Nodes created by the pass, in creation order. Some may have been
    /// expanded and removed again later in the same pass.
    pub created: Vec<ElementId>,
}

/// Result of inlining one reference node.
struct Expansion {
    created: Vec<ElementId>,
    /// Created nodes that are themselves backed by a subgraph.
    pending: Vec<ElementId>,
}

impl Document {
    /// Inline every subgraph-backed node of `graph` for `target`, with default options.
    pub fn flatten_subgraphs(&mut self, graph: ElementId, target: &str) -> GraphResult<FlattenSummary> {
        self.flatten_subgraphs_with(graph, target, &FlattenOptions::default())
    }

    /// Inline every subgraph-backed node of `graph` for `target`.
    ///
    /// Each reference node is expanded completely (copies created, interface
    /// bindings applied, connections rewired, reference removed) before the
    /// next one is looked at. On error, expansions already made stay applied.
    pub fn flatten_subgraphs_with(
        &mut self,
        graph: ElementId,
        target: &str,
        options: &FlattenOptions,
    ) -> GraphResult<FlattenSummary> {
        self.require_graph(graph)?;

        let mut queue: VecDeque<(ElementId, usize)> = self
            .nodes(graph)
            .into_iter()
            .map(|node| (node, 0))
            .collect();
        let mut summary = FlattenSummary::default();

        while let Some((reference, depth)) = queue.pop_front() {
            let Some(subgraph) = self.subgraph_implementation(reference, target) else {
                trace!(node = %reference, backend = target, "no subgraph implementation, keeping node");
                continue;
            };
            if options.max_depth.is_some_and(|limit| depth >= limit) {
                return Err(GraphError::InliningDepthExceeded {
                    node: self.name(reference).unwrap_or_default().to_string(),
                    depth,
                });
            }

            let expansion = self.inline_reference(graph, reference, subgraph, target)?;
            queue.extend(expansion.pending.iter().map(|&node| (node, depth + 1)));
            summary.expanded += 1;
            summary.created.extend(expansion.created);
        }

        debug!(
            graph = %graph,
            backend = target,
            expanded = summary.expanded,
            created = summary.created.len(),
            "flattened subgraphs"
        );
        Ok(summary)
    }

    fn inline_reference(
        &mut self,
        graph: ElementId,
        reference: ElementId,
        subgraph: ElementId,
        target: &str,
    ) -> GraphResult<Expansion> {
        let implementation_name = self.get(subgraph)?.name().to_string();
        debug!(
            node = self.name(reference).unwrap_or_default(),
            implementation = %implementation_name,
            "inlining subgraph"
        );

        let originals = self.nodes(subgraph);
        let mut mapping: Vec<(ElementId, ElementId)> = Vec::with_capacity(originals.len());
        let mut pending = Vec::new();

        for original in originals {
            let element = self.get(original)?;
            let base = format!("{implementation_name}_{}", element.name());
            let category = element.category().to_string();

            let name = self.create_valid_child_name(graph, &base);
            let copy = self.add_child(graph, ElementKind::Node, &category, &name)?;
            self.copy_content_from(copy, original)?;
            if let Some(index) = self.child_index(reference) {
                self.set_child_index(copy, index)?;
            }
            self.bind_interface(copy, reference)?;

            mapping.push((original, copy));
            if self.subgraph_implementation(copy, target).is_some() {
                pending.push(copy);
            }
        }

        for &(original, copy) in &mapping {
            for port in self.downstream_ports(original) {
                match self.kind(port) {
                    Some(ElementKind::Input) => {
                        let consumer = self.parent(port);
                        let Some(&(_, consumer_copy)) =
                            mapping.iter().find(|(node, _)| Some(*node) == consumer)
                        else {
                            continue;
                        };
                        let input_name = self.get(port)?.name().to_string();
                        trace!(
                            from = %name_of(self, copy),
                            to = %name_of(self, consumer_copy),
                            input = %input_name,
                            "rewiring internal connection"
                        );
                        self.set_connected_node(consumer_copy, &input_name, Some(copy))?;
                    }
                    Some(ElementKind::Output) => {
                        for outer in self.downstream_ports(reference) {
                            trace!(port = %outer, to = %name_of(self, copy), "rewiring external connection");
                            self.set_port_connected_node(outer, Some(copy))?;
                        }
                    }
                    _ => {}
                }
            }
        }

        self.remove_element(reference)?;
        Ok(Expansion {
            created: mapping.into_iter().map(|(_, copy)| copy).collect(),
            pending,
        })
    }

    /// Resolve the interface-bound ports of a freshly copied node against the
    /// reference node it stands in for, then drop the interface markers.
    fn bind_interface(&mut self, copy: ElementId, reference: ElementId) -> GraphResult<()> {
        for port in self.children(copy).to_vec() {
            let element = self.get(port)?;
            if !element.kind().is_port() {
                continue;
            }
            let Some(interface_name) = element.interface_name().map(str::to_string) else {
                continue;
            };
            let port_kind = element.kind();

            let reference_port = self
                .child(reference, &interface_name)
                .and_then(|id| self.element(id))
                .filter(|element| element.kind().is_port());
            if let Some(reference_port) = reference_port {
                let value = reference_port.value_string().map(str::to_string);
                let node_name = match (port_kind, reference_port.kind()) {
                    (ElementKind::Input, ElementKind::Input) => {
                        reference_port.node_name().map(str::to_string)
                    }
                    _ => None,
                };
                // A port holds one binding: a connection replaces any literal.
                match (node_name, value) {
                    (Some(node_name), _) => {
                        self.set_port_node_name(port, &node_name)?;
                        self.remove_attribute(port, VALUE_ATTRIBUTE)?;
                    }
                    (None, Some(value)) => self.set_value_string(port, &value)?,
                    (None, None) => {}
                }
            }
            self.remove_attribute(port, INTERFACE_NAME_ATTRIBUTE)?;
        }
        Ok(())
    }
}

fn name_of(doc: &Document, id: ElementId) -> String {
    doc.name(id).unwrap_or_default().to_string()
}
