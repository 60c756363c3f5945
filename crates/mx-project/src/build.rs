//! Turn a validated description into a live document.

use mx_core::{ElementId, MxResult};
use mx_graph::Document;
use mx_graph::document::{NODE_DEF_ATTRIBUTE, TARGET_ATTRIBUTE};
use tracing::debug;

use crate::ProjectResult;
use crate::schema::{DocumentDef, NodeDecl, PortDecl};

/// Build a document from a description. Elements keep the description's order.
pub fn build_document(description: &DocumentDef) -> ProjectResult<Document> {
    let mut doc = Document::new();
    let root = doc.root();

    for nodedef in &description.nodedefs {
        let id = doc.add_node_def(&nodedef.name, &nodedef.node, &nodedef.type_name)?;
        for input in &nodedef.inputs {
            let port = doc.add_input(id, &input.name, type_of(input))?;
            apply_port(&mut doc, port, input)?;
        }
        for output in &nodedef.outputs {
            let port = doc.add_output(id, &output.name, type_of(output))?;
            apply_port(&mut doc, port, output)?;
        }
    }

    for implementation in &description.implementations {
        doc.add_implementation(
            &implementation.name,
            &implementation.nodedef,
            &implementation.target,
        )?;
    }

    for graph in &description.nodegraphs {
        let id = doc.add_node_graph(root, &graph.name)?;
        if let Some(nodedef) = &graph.nodedef {
            doc.set_attribute(id, NODE_DEF_ATTRIBUTE, nodedef)?;
        }
        if let Some(target) = graph.target.as_deref().filter(|t| !t.is_empty()) {
            doc.set_attribute(id, TARGET_ATTRIBUTE, target)?;
        }
        for node in &graph.nodes {
            add_node(&mut doc, id, node)?;
        }
        for output in &graph.outputs {
            let port = doc.add_output(id, &output.name, type_of(output))?;
            apply_port(&mut doc, port, output)?;
        }
    }

    for node in &description.nodes {
        add_node(&mut doc, root, node)?;
    }

    debug!(
        name = %description.name,
        elements = doc.traverse().len(),
        "built document"
    );
    Ok(doc)
}

fn add_node(doc: &mut Document, parent: ElementId, decl: &NodeDecl) -> MxResult<ElementId> {
    let id = doc.add_node(
        parent,
        &decl.category,
        &decl.name,
        decl.type_name.as_deref().unwrap_or_default(),
    )?;
    for input in &decl.inputs {
        let port = doc.add_input(id, &input.name, type_of(input))?;
        apply_port(doc, port, input)?;
    }
    for output in &decl.outputs {
        let port = doc.add_output(id, &output.name, type_of(output))?;
        apply_port(doc, port, output)?;
    }
    Ok(id)
}

fn apply_port(doc: &mut Document, port: ElementId, decl: &PortDecl) -> MxResult<()> {
    if let Some(value) = &decl.value {
        doc.set_value_string(port, value)?;
    }
    if let Some(interface_name) = &decl.interfacename {
        doc.set_interface_name(port, interface_name)?;
    }
    if let Some(node_name) = &decl.nodename {
        doc.set_port_node_name(port, node_name)?;
    }
    Ok(())
}

fn type_of(decl: &PortDecl) -> &str {
    decl.type_name.as_deref().unwrap_or_default()
}
