//! Element tree: the arena that owns every node, graph, port and definition.
//!
//! Ownership is strictly parent -> child. Connections between nodes are
//! stored as names (`nodename`) and resolved against this tree on demand,
//! so reference cycles between nodes never become ownership cycles.

use std::collections::BTreeMap;

use mx_core::{ElementId, MxError, MxResult};

pub const TYPE_ATTRIBUTE: &str = "type";
pub const VALUE_ATTRIBUTE: &str = "value";
pub const INTERFACE_NAME_ATTRIBUTE: &str = "interfacename";
pub const NODE_NAME_ATTRIBUTE: &str = "nodename";
pub const NODE_DEF_ATTRIBUTE: &str = "nodedef";
pub const NODE_ATTRIBUTE: &str = "node";
pub const TARGET_ATTRIBUTE: &str = "target";

/// Closed set of element variants in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Document,
    Node,
    NodeGraph,
    Input,
    Output,
    NodeDef,
    Implementation,
}

impl ElementKind {
    /// Tag used as the category of non-node elements and in messages.
    pub fn tag(self) -> &'static str {
        match self {
            ElementKind::Document => "document",
            ElementKind::Node => "node",
            ElementKind::NodeGraph => "nodegraph",
            ElementKind::Input => "input",
            ElementKind::Output => "output",
            ElementKind::NodeDef => "nodedef",
            ElementKind::Implementation => "implementation",
        }
    }

    /// Inputs and outputs: value-carrying slots that may hold a connection.
    pub fn is_port(self) -> bool {
        matches!(self, ElementKind::Input | ElementKind::Output)
    }

    /// Elements whose children may be nodes.
    pub fn is_container(self) -> bool {
        matches!(self, ElementKind::Document | ElementKind::NodeGraph)
    }
}

/// A single element of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub(crate) name: String,
    pub(crate) kind: ElementKind,
    /// Operation name for nodes, the kind tag for everything else.
    pub(crate) category: String,
    pub(crate) parent: Option<ElementId>,
    pub(crate) children: Vec<ElementId>,
    pub(crate) attributes: BTreeMap<String, String>,
}

impl Element {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn is(&self, kind: ElementKind) -> bool {
        self.kind == kind
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn type_name(&self) -> Option<&str> {
        self.attribute(TYPE_ATTRIBUTE)
    }

    pub fn value_string(&self) -> Option<&str> {
        self.attribute(VALUE_ATTRIBUTE)
    }

    pub fn interface_name(&self) -> Option<&str> {
        self.attribute(INTERFACE_NAME_ATTRIBUTE)
    }

    pub fn node_name(&self) -> Option<&str> {
        self.attribute(NODE_NAME_ATTRIBUTE)
    }

    /// Target backend of an implementation. Absent means the empty target.
    pub fn target(&self) -> &str {
        self.attribute(TARGET_ATTRIBUTE).unwrap_or_default()
    }
}

/// The document: root of the element tree and owner of every element.
///
/// Elements live in an arena addressed by [`ElementId`]. Removing an element
/// vacates its slot (and those of its descendants); ids are never reused, so
/// a stale id simply stops resolving.
#[derive(Debug, Clone)]
pub struct Document {
    elements: Vec<Option<Element>>,
    root: ElementId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        let root = Element {
            name: String::new(),
            kind: ElementKind::Document,
            category: ElementKind::Document.tag().to_string(),
            parent: None,
            children: Vec::new(),
            attributes: BTreeMap::new(),
        };
        Self {
            elements: vec![Some(root)],
            root: ElementId::from_index(0),
        }
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements
            .get(id.index() as usize)
            .and_then(Option::as_ref)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.element(id).is_some()
    }

    pub(crate) fn get(&self, id: ElementId) -> MxResult<&Element> {
        self.element(id).ok_or(MxError::UnknownElement { id })
    }

    pub(crate) fn get_mut(&mut self, id: ElementId) -> MxResult<&mut Element> {
        self.elements
            .get_mut(id.index() as usize)
            .and_then(Option::as_mut)
            .ok_or(MxError::UnknownElement { id })
    }

    pub fn kind(&self, id: ElementId) -> Option<ElementKind> {
        self.element(id).map(Element::kind)
    }

    pub fn name(&self, id: ElementId) -> Option<&str> {
        self.element(id).map(Element::name)
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.element(id).and_then(Element::parent)
    }

    /// Children in declaration order; empty for unknown ids.
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.element(id).map(Element::children).unwrap_or(&[])
    }

    pub fn children_of_kind(&self, id: ElementId, kind: ElementKind) -> Vec<ElementId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| self.kind(child) == Some(kind))
            .collect()
    }

    /// Look up a direct child by name.
    pub fn child(&self, parent: ElementId, name: &str) -> Option<ElementId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&child| self.name(child) == Some(name))
    }

    /// Add a child element.
    ///
    /// An empty `name` is replaced by a unique name derived from the category.
    pub fn add_child(
        &mut self,
        parent: ElementId,
        kind: ElementKind,
        category: &str,
        name: &str,
    ) -> MxResult<ElementId> {
        let parent_name = self.get(parent)?.name.clone();
        let name = if name.is_empty() {
            self.create_valid_child_name(parent, &format!("{category}1"))
        } else {
            name.to_string()
        };
        if self.child(parent, &name).is_some() {
            return Err(MxError::DuplicateName {
                parent: parent_name,
                name,
            });
        }

        let id = ElementId::from_index(self.elements.len() as u32);
        self.elements.push(Some(Element {
            name,
            kind,
            category: category.to_string(),
            parent: Some(parent),
            children: Vec::new(),
            attributes: BTreeMap::new(),
        }));
        self.get_mut(parent)?.children.push(id);
        Ok(id)
    }

    /// Add a node of the given category to a document or node graph.
    pub fn add_node(
        &mut self,
        parent: ElementId,
        category: &str,
        name: &str,
        type_name: &str,
    ) -> MxResult<ElementId> {
        let id = self.add_child(parent, ElementKind::Node, category, name)?;
        self.set_type_name(id, type_name)?;
        Ok(id)
    }

    pub fn add_node_graph(&mut self, parent: ElementId, name: &str) -> MxResult<ElementId> {
        self.add_child(
            parent,
            ElementKind::NodeGraph,
            ElementKind::NodeGraph.tag(),
            name,
        )
    }

    /// Declare a node definition for operations of category `node` producing `type_name`.
    pub fn add_node_def(&mut self, name: &str, node: &str, type_name: &str) -> MxResult<ElementId> {
        let id = self.add_child(
            self.root,
            ElementKind::NodeDef,
            ElementKind::NodeDef.tag(),
            name,
        )?;
        self.set_attribute(id, NODE_ATTRIBUTE, node)?;
        self.set_type_name(id, type_name)?;
        Ok(id)
    }

    /// Register an opaque implementation of `node_def` for `target`.
    pub fn add_implementation(
        &mut self,
        name: &str,
        node_def: &str,
        target: &str,
    ) -> MxResult<ElementId> {
        let id = self.add_child(
            self.root,
            ElementKind::Implementation,
            ElementKind::Implementation.tag(),
            name,
        )?;
        self.set_attribute(id, NODE_DEF_ATTRIBUTE, node_def)?;
        if !target.is_empty() {
            self.set_attribute(id, TARGET_ATTRIBUTE, target)?;
        }
        Ok(id)
    }

    pub fn add_input(&mut self, owner: ElementId, name: &str, type_name: &str) -> MxResult<ElementId> {
        let id = self.add_child(owner, ElementKind::Input, ElementKind::Input.tag(), name)?;
        self.set_type_name(id, type_name)?;
        Ok(id)
    }

    pub fn add_output(&mut self, owner: ElementId, name: &str, type_name: &str) -> MxResult<ElementId> {
        let id = self.add_child(owner, ElementKind::Output, ElementKind::Output.tag(), name)?;
        self.set_type_name(id, type_name)?;
        Ok(id)
    }

    /// Remove an element and its whole subtree. The root cannot be removed.
    pub fn remove_element(&mut self, id: ElementId) -> MxResult<()> {
        if id == self.root {
            return Err(MxError::InvalidArg {
                what: "the document root cannot be removed",
            });
        }
        if let Some(parent) = self.get(id)?.parent {
            self.get_mut(parent)?.children.retain(|&child| child != id);
        }

        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            let removed = self
                .elements
                .get_mut(next.index() as usize)
                .and_then(Option::take);
            if let Some(element) = removed {
                stack.extend(element.children);
            }
        }
        Ok(())
    }

    /// Remove the child with the given name. Returns `false` if there was none.
    pub fn remove_child(&mut self, parent: ElementId, name: &str) -> MxResult<bool> {
        match self.child(parent, name) {
            Some(child) => self.remove_element(child).map(|()| true),
            None => Ok(false),
        }
    }

    /// Position of an element among its siblings.
    pub fn child_index(&self, id: ElementId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&child| child == id)
    }

    /// Move an element to `index` among its siblings (clamped to the end).
    pub fn set_child_index(&mut self, id: ElementId, index: usize) -> MxResult<()> {
        let parent = self.get(id)?.parent.ok_or(MxError::InvalidArg {
            what: "the document root has no siblings",
        })?;
        let children = &mut self.get_mut(parent)?.children;
        children.retain(|&child| child != id);
        let index = index.min(children.len());
        children.insert(index, id);
        Ok(())
    }

    /// Produce a child name, derived from `base`, that no child of `parent` uses yet.
    ///
    /// Characters outside `[A-Za-z0-9_:]` become `_`; collisions bump a trailing integer.
    pub fn create_valid_child_name(&self, parent: ElementId, base: &str) -> String {
        let mut name: String = base
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == ':' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        while self.child(parent, &name).is_some() {
            name = increment_name(&name);
        }
        name
    }

    pub fn attribute(&self, id: ElementId, name: &str) -> Option<&str> {
        self.element(id).and_then(|element| element.attribute(name))
    }

    pub fn set_attribute(&mut self, id: ElementId, name: &str, value: &str) -> MxResult<()> {
        self.get_mut(id)?
            .attributes
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: ElementId, name: &str) -> MxResult<()> {
        self.get_mut(id)?.attributes.remove(name);
        Ok(())
    }

    /// Set the declared data type; an empty string clears it.
    pub fn set_type_name(&mut self, id: ElementId, type_name: &str) -> MxResult<()> {
        if type_name.is_empty() {
            self.remove_attribute(id, TYPE_ATTRIBUTE)
        } else {
            self.set_attribute(id, TYPE_ATTRIBUTE, type_name)
        }
    }

    pub fn type_name(&self, id: ElementId) -> Option<&str> {
        self.element(id).and_then(Element::type_name)
    }

    /// Replace the content of `dest` with a copy of `source`.
    ///
    /// Category, attributes and the full child subtree are copied; `dest`
    /// keeps its own name and position.
    pub fn copy_content_from(&mut self, dest: ElementId, source: ElementId) -> MxResult<()> {
        let source_element = self.get(source)?;
        let category = source_element.category.clone();
        let attributes = source_element.attributes.clone();
        let source_children = source_element.children.clone();

        for child in self.get(dest)?.children.clone() {
            self.remove_element(child)?;
        }
        let dest_element = self.get_mut(dest)?;
        dest_element.category = category;
        dest_element.attributes = attributes;

        for child in source_children {
            self.copy_subtree(child, dest)?;
        }
        Ok(())
    }

    fn copy_subtree(&mut self, source: ElementId, new_parent: ElementId) -> MxResult<ElementId> {
        let element = self.get(source)?;
        let (kind, category, name) = (element.kind, element.category.clone(), element.name.clone());
        let attributes = element.attributes.clone();
        let children = element.children.clone();

        let copy = self.add_child(new_parent, kind, &category, &name)?;
        self.get_mut(copy)?.attributes = attributes;
        for child in children {
            self.copy_subtree(child, copy)?;
        }
        Ok(copy)
    }

    /// Every live element in document order (depth-first, pre-order), root first.
    pub fn traverse(&self) -> Vec<ElementId> {
        let mut order = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        order
    }

    /// Top-level node definitions declared for operation `category`.
    pub fn matching_node_defs(&self, category: &str) -> Vec<ElementId> {
        self.children(self.root)
            .iter()
            .copied()
            .filter(|&id| {
                self.element(id).is_some_and(|element| {
                    element.is(ElementKind::NodeDef) && element.attribute(NODE_ATTRIBUTE) == Some(category)
                })
            })
            .collect()
    }

    /// Top-level implementations (opaque or node graph) of the named definition.
    pub fn matching_implementations(&self, node_def: &str) -> Vec<ElementId> {
        self.children(self.root)
            .iter()
            .copied()
            .filter(|&id| {
                self.element(id).is_some_and(|element| {
                    matches!(element.kind, ElementKind::Implementation | ElementKind::NodeGraph)
                        && element.attribute(NODE_DEF_ATTRIBUTE) == Some(node_def)
                })
            })
            .collect()
    }

    /// Ports anywhere in the document whose connection names `node_name`.
    pub fn matching_ports(&self, node_name: &str) -> Vec<ElementId> {
        self.traverse()
            .into_iter()
            .filter(|&id| {
                self.element(id).is_some_and(|element| {
                    element.kind.is_port() && element.node_name() == Some(node_name)
                })
            })
            .collect()
    }

    pub fn node_defs(&self) -> Vec<ElementId> {
        self.children_of_kind(self.root, ElementKind::NodeDef)
    }

    pub fn implementations(&self) -> Vec<ElementId> {
        self.children_of_kind(self.root, ElementKind::Implementation)
    }

    pub fn node_graphs(&self) -> Vec<ElementId> {
        self.children_of_kind(self.root, ElementKind::NodeGraph)
    }

    pub fn nodes(&self, parent: ElementId) -> Vec<ElementId> {
        self.children_of_kind(parent, ElementKind::Node)
    }
}

/// `foo` -> `foo2`, `foo2` -> `foo3`, `foo9` -> `foo10`.
///
/// A suffix that does not fit in a `u64` after incrementing is kept and `2` appended.
fn increment_name(name: &str) -> String {
    let prefix = name.trim_end_matches(|c: char| c.is_ascii_digit());
    match name[prefix.len()..]
        .parse::<u64>()
        .ok()
        .and_then(|number| number.checked_add(1))
    {
        Some(next) => format!("{prefix}{next}"),
        None => format!("{name}2"),
    }
}
