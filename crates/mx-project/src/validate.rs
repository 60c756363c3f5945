//! Description validation logic.

use crate::schema::{DocumentDef, NodeDecl, PortDecl};
use std::collections::HashSet;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate name: {name} in {context}")]
    DuplicateName { name: String, context: String },

    #[error("Missing reference: {name} in {context}")]
    MissingReference { name: String, context: String },

    #[error("Port {port} in {context} sets both interfacename and nodename")]
    ConflictingBinding { port: String, context: String },
}

pub fn validate_description(description: &DocumentDef) -> Result<(), ValidationError> {
    // Definitions, implementations, graphs and top-level nodes are all children of the root.
    let mut root_names = HashSet::new();
    let root_children = description
        .nodedefs
        .iter()
        .map(|d| &d.name)
        .chain(description.implementations.iter().map(|i| &i.name))
        .chain(description.nodegraphs.iter().map(|g| &g.name))
        .chain(description.nodes.iter().map(|n| &n.name));
    for name in root_children {
        if !root_names.insert(name) {
            return Err(ValidationError::DuplicateName {
                name: name.clone(),
                context: "document".to_string(),
            });
        }
    }

    let nodedef_names: HashSet<&String> = description.nodedefs.iter().map(|d| &d.name).collect();

    for nodedef in &description.nodedefs {
        let context = format!("nodedef '{}'", nodedef.name);
        validate_ports(nodedef.inputs.iter().chain(&nodedef.outputs), &context)?;
    }

    for implementation in &description.implementations {
        if !nodedef_names.contains(&implementation.nodedef) {
            return Err(ValidationError::MissingReference {
                name: implementation.nodedef.clone(),
                context: format!("implementation '{}'", implementation.name),
            });
        }
    }

    for graph in &description.nodegraphs {
        if let Some(nodedef) = &graph.nodedef {
            if !nodedef_names.contains(nodedef) {
                return Err(ValidationError::MissingReference {
                    name: nodedef.clone(),
                    context: format!("nodegraph '{}'", graph.name),
                });
            }
        }

        let context = format!("nodegraph '{}'", graph.name);
        let mut names = HashSet::new();
        for name in graph.nodes.iter().map(|n| &n.name).chain(graph.outputs.iter().map(|o| &o.name)) {
            if !names.insert(name) {
                return Err(ValidationError::DuplicateName {
                    name: name.clone(),
                    context: context.clone(),
                });
            }
        }
        for node in &graph.nodes {
            validate_node(node)?;
        }
        validate_ports(&graph.outputs, &context)?;
    }

    for node in &description.nodes {
        validate_node(node)?;
    }

    Ok(())
}

fn validate_node(node: &NodeDecl) -> Result<(), ValidationError> {
    validate_ports(
        node.inputs.iter().chain(&node.outputs),
        &format!("node '{}'", node.name),
    )
}

fn validate_ports<'a>(
    ports: impl IntoIterator<Item = &'a PortDecl>,
    context: &str,
) -> Result<(), ValidationError> {
    let mut names = HashSet::new();
    for port in ports {
        if !names.insert(&port.name) {
            return Err(ValidationError::DuplicateName {
                name: port.name.clone(),
                context: context.to_string(),
            });
        }
        if port.interfacename.is_some() && port.nodename.is_some() {
            return Err(ValidationError::ConflictingBinding {
                port: port.name.clone(),
                context: context.to_string(),
            });
        }
    }
    Ok(())
}
