//! Definition and implementation lookup for node instances.

use mx_core::ElementId;

use crate::document::{Document, ElementKind};

impl Document {
    /// First node definition matching `node`'s category and output type.
    ///
    /// Matching is permissive: an input declared on both the node and the
    /// definition must agree in type when both sides are typed, while inputs
    /// only the node has are ignored.
    pub fn referenced_node_def(&self, node: ElementId) -> Option<ElementId> {
        let element = self.element(node)?;
        let type_name = element.type_name();

        self.matching_node_defs(element.category())
            .into_iter()
            .find(|&node_def| {
                self.type_name(node_def) == type_name && self.inputs_agree(node, node_def)
            })
    }

    fn inputs_agree(&self, node: ElementId, node_def: ElementId) -> bool {
        self.inputs(node).into_iter().all(|input| {
            let Some(name) = self.name(input) else {
                return true;
            };
            let Some(declared) = self.input(node_def, name) else {
                return true;
            };
            match (self.type_name(input), self.type_name(declared)) {
                (Some(actual), Some(expected)) => actual == expected,
                _ => true,
            }
        })
    }

    /// Implementation of `node`'s definition registered for `target`.
    ///
    /// The result is either an opaque `Implementation` element or a `NodeGraph`.
    pub fn implementation(&self, node: ElementId, target: &str) -> Option<ElementId> {
        let node_def = self.referenced_node_def(node)?;
        let node_def_name = self.name(node_def)?;
        self.matching_implementations(node_def_name)
            .into_iter()
            .find(|&implementation| {
                self.element(implementation)
                    .is_some_and(|element| element.target() == target)
            })
    }

    /// Implementation of `node` for `target`, but only when it is a node graph.
    pub fn subgraph_implementation(&self, node: ElementId, target: &str) -> Option<ElementId> {
        self.implementation(node, target)
            .filter(|&implementation| self.kind(implementation) == Some(ElementKind::NodeGraph))
    }
}
