use clap::{Parser, Subcommand};
use mx_graph::document::{NODE_ATTRIBUTE, NODE_DEF_ATTRIBUTE};
use mx_graph::{Document, ElementId, FlattenOptions, GraphError};
use mx_project::ProjectError;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "mx-cli")]
#[command(about = "Material graph tool - inspect and transform node graph documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a document and report structural issues
    Validate {
        /// Path to the document (YAML or JSON)
        document_path: PathBuf,
    },
    /// List definitions, implementations and graphs in a document
    Inspect {
        /// Path to the document (YAML or JSON)
        document_path: PathBuf,
    },
    /// Print a graph's children in evaluation order
    Sort {
        /// Path to the document (YAML or JSON)
        document_path: PathBuf,
        /// Name of the node graph to sort
        graph: String,
    },
    /// Inline subgraph-backed nodes of a graph
    Flatten {
        /// Path to the document (YAML or JSON)
        document_path: PathBuf,
        /// Name of the node graph to flatten
        graph: String,
        /// Target used to select implementations
        #[arg(long, default_value = "")]
        target: String,
        /// Maximum nesting of inlined subgraphs
        #[arg(long, conflicts_with = "unbounded")]
        max_depth: Option<usize>,
        /// Remove the nesting bound
        #[arg(long)]
        unbounded: bool,
        /// Print the flattened graph in evaluation order
        #[arg(long)]
        sort: bool,
    },
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Project(#[from] ProjectError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("No element named '{0}' at the document root")]
    UnknownElement(String),

    #[error("{0} structural issue(s) found")]
    Invalid(usize),
}

type CliResult<T> = Result<T, CliError>;

fn main() -> CliResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { document_path } => cmd_validate(&document_path),
        Commands::Inspect { document_path } => cmd_inspect(&document_path),
        Commands::Sort {
            document_path,
            graph,
        } => cmd_sort(&document_path, &graph),
        Commands::Flatten {
            document_path,
            graph,
            target,
            max_depth,
            unbounded,
            sort,
        } => {
            let options = if unbounded {
                FlattenOptions::unbounded()
            } else {
                max_depth.map_or_else(FlattenOptions::default, |depth| FlattenOptions {
                    max_depth: Some(depth),
                })
            };
            cmd_flatten(&document_path, &graph, &target, &options, sort)
        }
    }
}

fn cmd_validate(document_path: &Path) -> CliResult<()> {
    println!("Validating document: {}", document_path.display());
    let doc = mx_project::load_document(document_path)?;
    let issues = doc.validate();
    if issues.is_empty() {
        println!("✓ Document is valid");
        return Ok(());
    }
    for issue in &issues {
        tracing::warn!("{issue}");
        println!("  ✗ {issue}");
    }
    Err(CliError::Invalid(issues.len()))
}

fn cmd_inspect(document_path: &Path) -> CliResult<()> {
    let doc = mx_project::load_document(document_path)?;

    println!("Node definitions:");
    for def in doc.node_defs() {
        println!(
            "  {} - {} -> {} ({} inputs)",
            name(&doc, def),
            doc.attribute(def, NODE_ATTRIBUTE).unwrap_or_default(),
            doc.type_name(def).unwrap_or("?"),
            doc.inputs(def).len()
        );
    }

    println!("Implementations:");
    for implementation in doc.implementations() {
        let element = doc.element(implementation);
        println!(
            "  {} - {} [{}]",
            name(&doc, implementation),
            doc.attribute(implementation, NODE_DEF_ATTRIBUTE)
                .unwrap_or_default(),
            element.map(|e| e.target()).unwrap_or_default()
        );
    }

    println!("Node graphs:");
    for graph in doc.node_graphs() {
        let implements = doc
            .attribute(graph, NODE_DEF_ATTRIBUTE)
            .map(|def| format!(", implements {def}"))
            .unwrap_or_default();
        println!(
            "  {} ({} nodes, {} outputs{})",
            name(&doc, graph),
            doc.nodes(graph).len(),
            doc.outputs(graph).len(),
            implements
        );
    }

    let nodes = doc.nodes(doc.root());
    if !nodes.is_empty() {
        println!("Top-level nodes:");
        for node in nodes {
            println!(
                "  {} ({}) -> {}",
                name(&doc, node),
                doc.element(node).map(|e| e.category()).unwrap_or_default(),
                doc.type_name(node).unwrap_or("?")
            );
        }
    }
    Ok(())
}

fn cmd_sort(document_path: &Path, graph_name: &str) -> CliResult<()> {
    let doc = mx_project::load_document(document_path)?;
    let graph = find_graph(&doc, graph_name)?;
    let order = doc.topological_sort(graph)?;
    println!("Evaluation order for {}:", graph_name);
    print_order(&doc, &order);
    Ok(())
}

fn cmd_flatten(
    document_path: &Path,
    graph_name: &str,
    target: &str,
    options: &FlattenOptions,
    sort: bool,
) -> CliResult<()> {
    let mut doc = mx_project::load_document(document_path)?;
    let graph = find_graph(&doc, graph_name)?;

    let summary = doc.flatten_subgraphs_with(graph, target, options)?;
    println!(
        "✓ Flattened {}: {} node(s) expanded, {} created",
        graph_name,
        summary.expanded,
        summary.created.len()
    );

    print_order(&doc, doc.children(graph));

    if sort {
        let order = doc.topological_sort(graph)?;
        println!("Evaluation order for {}:", graph_name);
        print_order(&doc, &order);
    }
    Ok(())
}

/// Root child by name. Whether it is a node graph is left to the engine.
fn find_graph(doc: &Document, graph_name: &str) -> CliResult<ElementId> {
    doc.child(doc.root(), graph_name)
        .ok_or_else(|| CliError::UnknownElement(graph_name.to_string()))
}

fn print_order(doc: &Document, order: &[ElementId]) {
    for (index, &id) in order.iter().enumerate() {
        let Some(element) = doc.element(id) else {
            continue;
        };
        let inputs: Vec<String> = doc
            .upstream_edges(id)
            .map(|edge| name(doc, edge.upstream))
            .collect();
        if inputs.is_empty() {
            println!("  {:>3}. {} ({})", index + 1, element.name(), element.category());
        } else {
            println!(
                "  {:>3}. {} ({}) <- {}",
                index + 1,
                element.name(),
                element.category(),
                inputs.join(", ")
            );
        }
    }
}

fn name(doc: &Document, id: ElementId) -> String {
    doc.name(id).unwrap_or_default().to_string()
}
