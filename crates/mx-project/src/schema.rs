//! Document description schema.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DocumentDef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub nodedefs: Vec<NodeDefDef>,
    #[serde(default)]
    pub implementations: Vec<ImplementationDef>,
    #[serde(default)]
    pub nodegraphs: Vec<NodeGraphDef>,
    /// Nodes placed directly under the document root.
    #[serde(default)]
    pub nodes: Vec<NodeDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeDefDef {
    pub name: String,
    /// Category of the nodes this definition describes.
    pub node: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub inputs: Vec<PortDecl>,
    #[serde(default)]
    pub outputs: Vec<PortDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImplementationDef {
    pub name: String,
    pub nodedef: String,
    #[serde(default)]
    pub target: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeGraphDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodedef: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default)]
    pub nodes: Vec<NodeDecl>,
    #[serde(default)]
    pub outputs: Vec<PortDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeDecl {
    pub name: String,
    pub category: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default)]
    pub inputs: Vec<PortDecl>,
    /// Declared outputs, for nodes producing more than one value.
    #[serde(default)]
    pub outputs: Vec<PortDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortDecl {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interfacename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodename: Option<String>,
}
