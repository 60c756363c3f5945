//! Port and connection model.
//!
//! A port's connection is the name of its producer node, resolved against
//! the container that owns the consuming node. Ports are created on demand
//! and never validated here; see [`crate::validate`].

use mx_core::{ElementId, MxResult};

use crate::document::{
    Document, ElementKind, INTERFACE_NAME_ATTRIBUTE, NODE_NAME_ATTRIBUTE, VALUE_ATTRIBUTE,
};

impl Document {
    /// The input of `node` called `name`, if there is one.
    pub fn input(&self, node: ElementId, name: &str) -> Option<ElementId> {
        self.child(node, name)
            .filter(|&port| self.kind(port) == Some(ElementKind::Input))
    }

    /// Inputs in declaration order. This order defines upstream edge indices.
    pub fn inputs(&self, owner: ElementId) -> Vec<ElementId> {
        self.children_of_kind(owner, ElementKind::Input)
    }

    pub fn output(&self, owner: ElementId, name: &str) -> Option<ElementId> {
        self.child(owner, name)
            .filter(|&port| self.kind(port) == Some(ElementKind::Output))
    }

    pub fn outputs(&self, owner: ElementId) -> Vec<ElementId> {
        self.children_of_kind(owner, ElementKind::Output)
    }

    /// Container in which a port's `nodename` is looked up.
    ///
    /// Ports on a node see the node's siblings; ports owned directly by a
    /// graph (its outputs) see the graph's children.
    pub fn port_scope(&self, port: ElementId) -> Option<ElementId> {
        let owner = self.parent(port)?;
        match self.kind(owner)? {
            ElementKind::Node => self.parent(owner),
            _ => Some(owner),
        }
    }

    /// Producer node bound to a port, or `None` if unbound or unresolvable.
    pub fn port_connected_node(&self, port: ElementId) -> Option<ElementId> {
        let node_name = self.element(port)?.node_name()?;
        let scope = self.port_scope(port)?;
        self.child(scope, node_name)
            .filter(|&node| self.kind(node) == Some(ElementKind::Node))
    }

    /// Bind a port to `node`, or clear its binding with `None`.
    pub fn set_port_connected_node(&mut self, port: ElementId, node: Option<ElementId>) -> MxResult<()> {
        match node {
            Some(node) => {
                let node_name = self.get(node)?.name().to_string();
                self.set_attribute(port, NODE_NAME_ATTRIBUTE, &node_name)
            }
            None => self.remove_attribute(port, NODE_NAME_ATTRIBUTE),
        }
    }

    /// Bind a port to a producer by name; an empty name clears the binding.
    pub fn set_port_node_name(&mut self, port: ElementId, node_name: &str) -> MxResult<()> {
        if node_name.is_empty() {
            self.remove_attribute(port, NODE_NAME_ATTRIBUTE)
        } else {
            self.set_attribute(port, NODE_NAME_ATTRIBUTE, node_name)
        }
    }

    pub fn set_value_string(&mut self, port: ElementId, value: &str) -> MxResult<()> {
        self.set_attribute(port, VALUE_ATTRIBUTE, value)
    }

    pub fn value_string(&self, port: ElementId) -> Option<&str> {
        self.element(port)?.value_string()
    }

    /// Mark a port as a pass-through parameter bound at the enclosing graph's call site.
    pub fn set_interface_name(&mut self, port: ElementId, interface_name: &str) -> MxResult<()> {
        self.set_attribute(port, INTERFACE_NAME_ATTRIBUTE, interface_name)
    }

    pub fn interface_name(&self, port: ElementId) -> Option<&str> {
        self.element(port)?.interface_name()
    }

    /// Connect input `input_name` of `node` to `producer`.
    ///
    /// A missing input is created, typed after the producer when there is one.
    /// Passing `None` clears the binding but keeps the input.
    pub fn set_connected_node(
        &mut self,
        node: ElementId,
        input_name: &str,
        producer: Option<ElementId>,
    ) -> MxResult<ElementId> {
        let input = match self.input(node, input_name) {
            Some(input) => input,
            None => {
                let type_name = match producer {
                    Some(producer) => self.get(producer)?.type_name().unwrap_or_default().to_string(),
                    None => String::new(),
                };
                self.add_input(node, input_name, &type_name)?
            }
        };
        self.set_port_connected_node(input, producer)?;
        Ok(input)
    }

    /// Producer bound to input `input_name` of `node`.
    pub fn connected_node(&self, node: ElementId, input_name: &str) -> Option<ElementId> {
        self.port_connected_node(self.input(node, input_name)?)
    }

    /// Connect input `input_name` of `node` to a producer by name.
    ///
    /// The producer need not exist yet. A missing input is created untyped.
    pub fn set_connected_node_name(
        &mut self,
        node: ElementId,
        input_name: &str,
        producer_name: &str,
    ) -> MxResult<ElementId> {
        let input = match self.input(node, input_name) {
            Some(input) => input,
            None => self.add_input(node, input_name, "")?,
        };
        self.set_port_node_name(input, producer_name)?;
        Ok(input)
    }

    /// Producer name recorded on input `input_name` of `node`.
    pub fn connected_node_name(&self, node: ElementId, input_name: &str) -> Option<&str> {
        self.element(self.input(node, input_name)?)?.node_name()
    }
}
