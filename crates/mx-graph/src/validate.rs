//! Structural validation.
//!
//! Construction is permissive; this pass reports what construction let
//! through. It never fails, it only collects issues.

use mx_core::ElementId;

use crate::document::{Document, ElementKind, NODE_DEF_ATTRIBUTE};

/// A structural problem found by [`Document::validate`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    #[error("Node '{node}' is missing a type")]
    MissingType { node: String },

    #[error("Port '{port}' on '{owner}' is connected to '{node_name}', which does not exist")]
    UnresolvedConnection {
        owner: String,
        port: String,
        node_name: String,
    },

    #[error("Port '{port}' on '{owner}' has type {port_type} but '{node_name}' produces {producer_type}")]
    ConnectionTypeMismatch {
        owner: String,
        port: String,
        node_name: String,
        port_type: String,
        producer_type: String,
    },

    #[error("'{element}' implements unknown nodedef '{node_def}'")]
    MissingNodeDef { element: String, node_def: String },
}

impl Document {
    /// Check every element of the document and report structural issues in document order.
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        for id in self.traverse() {
            let Some(element) = self.element(id) else {
                continue;
            };
            match element.kind() {
                ElementKind::Node if element.type_name().is_none() => {
                    issues.push(ValidationIssue::MissingType {
                        node: element.name().to_string(),
                    });
                }
                kind if kind.is_port() => self.validate_port(id, &mut issues),
                ElementKind::Implementation | ElementKind::NodeGraph => {
                    let Some(node_def) = element.attribute(NODE_DEF_ATTRIBUTE) else {
                        continue;
                    };
                    let declared = self.child(self.root(), node_def).and_then(|def| self.kind(def));
                    if declared != Some(ElementKind::NodeDef) {
                        issues.push(ValidationIssue::MissingNodeDef {
                            element: element.name().to_string(),
                            node_def: node_def.to_string(),
                        });
                    }
                }
                _ => {}
            }
        }
        issues
    }

    fn validate_port(&self, port: ElementId, issues: &mut Vec<ValidationIssue>) {
        let Some(element) = self.element(port) else {
            return;
        };
        let Some(node_name) = element.node_name() else {
            return;
        };
        let owner = self
            .parent(port)
            .and_then(|owner| self.name(owner))
            .unwrap_or_default()
            .to_string();

        let Some(producer) = self.port_connected_node(port) else {
            issues.push(ValidationIssue::UnresolvedConnection {
                owner,
                port: element.name().to_string(),
                node_name: node_name.to_string(),
            });
            return;
        };
        let (Some(port_type), Some(producer_type)) = (element.type_name(), self.type_name(producer))
        else {
            return;
        };
        if port_type != producer_type {
            issues.push(ValidationIssue::ConnectionTypeMismatch {
                owner,
                port: element.name().to_string(),
                node_name: node_name.to_string(),
                port_type: port_type.to_string(),
                producer_type: producer_type.to_string(),
            });
        }
    }

    /// `true` when [`Document::validate`] finds nothing to report.
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}
