//! Integration tests for mx-graph.

use mx_graph::document::{NODE_DEF_ATTRIBUTE, TARGET_ATTRIBUTE};
use mx_graph::{Document, ElementId, FlattenOptions, GraphError};

const TARGET: &str = "genglsl";

/// Library with a `foo` node implemented by `NG_foo` for `genglsl`:
/// g1 multiplies the `amount` interface input, g2 adds to g1 and is the output.
fn foo_library(doc: &mut Document) {
    let def = doc.add_node_def("ND_foo_float", "foo", "float").unwrap();
    doc.add_input(def, "amount", "float").unwrap();

    let ng = doc.add_node_graph(doc.root(), "NG_foo").unwrap();
    doc.set_attribute(ng, NODE_DEF_ATTRIBUTE, "ND_foo_float").unwrap();
    doc.set_attribute(ng, TARGET_ATTRIBUTE, TARGET).unwrap();
    let g1 = doc.add_node(ng, "multiply", "g1", "float").unwrap();
    let amount = doc.add_input(g1, "in1", "float").unwrap();
    doc.set_interface_name(amount, "amount").unwrap();
    let g2 = doc.add_node(ng, "add", "g2", "float").unwrap();
    doc.set_connected_node(g2, "in1", Some(g1)).unwrap();
    let out = doc.add_output(ng, "out", "float").unwrap();
    doc.set_port_connected_node(out, Some(g2)).unwrap();
}

fn position(order: &[ElementId], id: ElementId) -> usize {
    order.iter().position(|&o| o == id).unwrap()
}

#[test]
fn abc_chain_sorts_exactly() {
    let mut doc = Document::new();
    let graph = doc.add_node_graph(doc.root(), "NG").unwrap();
    let a = doc.add_node(graph, "constant", "A", "float").unwrap();
    let b = doc.add_node(graph, "add", "B", "float").unwrap();
    let c = doc.add_node(graph, "add", "C", "float").unwrap();
    doc.set_connected_node(b, "in", Some(a)).unwrap();
    doc.set_connected_node(c, "in", Some(b)).unwrap();

    assert_eq!(doc.topological_sort(graph).unwrap(), vec![a, b, c]);
}

#[test]
fn xy_mutual_connection_fails_without_partial_order() {
    let mut doc = Document::new();
    let graph = doc.add_node_graph(doc.root(), "NG_cycle").unwrap();
    let x = doc.add_node(graph, "add", "X", "float").unwrap();
    let y = doc.add_node(graph, "add", "Y", "float").unwrap();
    doc.set_connected_node(x, "in", Some(y)).unwrap();
    doc.set_connected_node(y, "in", Some(x)).unwrap();

    let result = doc.topological_sort(graph);
    assert_eq!(
        result,
        Err(GraphError::CycleDetected {
            graph: "NG_cycle".into()
        })
    );
    assert_eq!(
        result.unwrap_err().to_string(),
        "Encountered a cycle in graph: NG_cycle"
    );
}

#[test]
fn flatten_then_sort_preserves_external_connectivity() {
    let mut doc = Document::new();
    foo_library(&mut doc);

    let graph = doc.add_node_graph(doc.root(), "NG_material").unwrap();
    let texture = doc.add_node(graph, "image", "texture", "float").unwrap();
    let r = doc.add_node(graph, "foo", "R", "float").unwrap();
    doc.set_connected_node(r, "amount", Some(texture)).unwrap();
    let shader = doc.add_node(graph, "surface", "shader", "float").unwrap();
    doc.set_connected_node(shader, "base", Some(r)).unwrap();
    doc.set_connected_node(shader, "coat", Some(r)).unwrap();
    let out = doc.add_output(graph, "out", "float").unwrap();
    doc.set_port_connected_node(out, Some(shader)).unwrap();
    let outputs_before: Vec<String> = doc
        .outputs(graph)
        .into_iter()
        .filter_map(|o| doc.name(o).map(str::to_string))
        .collect();

    let summary = doc.flatten_subgraphs(graph, TARGET).unwrap();
    assert_eq!(summary.expanded, 1);
    assert!(!doc.contains(r));

    let g1 = doc.child(graph, "NG_foo_g1").unwrap();
    let g2 = doc.child(graph, "NG_foo_g2").unwrap();
    assert_eq!(doc.connected_node(g1, "in1"), Some(texture));
    assert_eq!(doc.connected_node(g2, "in1"), Some(g1));
    // Fan-out: every consumer of R now reads the node that produced R's output.
    assert_eq!(doc.connected_node(shader, "base"), Some(g2));
    assert_eq!(doc.connected_node(shader, "coat"), Some(g2));
    assert_eq!(doc.port_connected_node(out), Some(shader));

    let outputs_after: Vec<String> = doc
        .outputs(graph)
        .into_iter()
        .filter_map(|o| doc.name(o).map(str::to_string))
        .collect();
    assert_eq!(outputs_before, outputs_after);

    for node in doc.nodes(graph) {
        assert!(doc.subgraph_implementation(node, TARGET).is_none());
    }

    let order = doc.topological_sort(graph).unwrap();
    assert_eq!(order.len(), doc.children(graph).len());
    assert!(position(&order, texture) < position(&order, g1));
    assert!(position(&order, g1) < position(&order, g2));
    assert!(position(&order, g2) < position(&order, shader));
    assert!(position(&order, shader) < position(&order, out));
    assert!(doc.is_valid(), "{:?}", doc.validate());
}

#[test]
fn flattening_twice_is_a_no_op() {
    let mut doc = Document::new();
    foo_library(&mut doc);
    let graph = doc.add_node_graph(doc.root(), "NG_material").unwrap();
    doc.add_node(graph, "foo", "R", "float").unwrap();

    doc.flatten_subgraphs(graph, TARGET).unwrap();
    let children = doc.children(graph).to_vec();
    let second = doc.flatten_subgraphs(graph, TARGET).unwrap();

    assert_eq!(second.expanded, 0);
    assert_eq!(doc.children(graph), children.as_slice());
}

#[test]
fn unbounded_flatten_of_finite_nesting_completes() {
    let mut doc = Document::new();
    foo_library(&mut doc);
    doc.add_node_def("ND_wrap_float", "wrap", "float").unwrap();
    let wrap = doc.add_node_graph(doc.root(), "NG_wrap").unwrap();
    doc.set_attribute(wrap, NODE_DEF_ATTRIBUTE, "ND_wrap_float").unwrap();
    doc.set_attribute(wrap, TARGET_ATTRIBUTE, TARGET).unwrap();
    let inner = doc.add_node(wrap, "foo", "inner", "float").unwrap();
    let wrap_out = doc.add_output(wrap, "out", "float").unwrap();
    doc.set_port_connected_node(wrap_out, Some(inner)).unwrap();

    let graph = doc.add_node_graph(doc.root(), "NG_material").unwrap();
    let w = doc.add_node(graph, "wrap", "W", "float").unwrap();
    let consumer = doc.add_node(graph, "add", "consumer", "float").unwrap();
    doc.set_connected_node(consumer, "in1", Some(w)).unwrap();

    let summary = doc
        .flatten_subgraphs_with(graph, TARGET, &FlattenOptions::unbounded())
        .unwrap();
    assert_eq!(summary.expanded, 2);

    let producer = doc.connected_node(consumer, "in1").unwrap();
    assert_eq!(doc.name(producer), Some("NG_foo_g2"));
    assert_eq!(doc.element(producer).unwrap().category(), "add");
}

#[test]
fn depth_limit_of_zero_refuses_any_expansion() {
    let mut doc = Document::new();
    foo_library(&mut doc);
    let graph = doc.add_node_graph(doc.root(), "NG_material").unwrap();
    let r = doc.add_node(graph, "foo", "R", "float").unwrap();

    let err = doc
        .flatten_subgraphs_with(graph, TARGET, &FlattenOptions { max_depth: Some(0) })
        .unwrap_err();
    assert!(matches!(err, GraphError::InliningDepthExceeded { depth: 0, .. }));
    assert!(doc.contains(r));
    assert_eq!(doc.children(graph), &[r]);
}
