//! Synthesis of a resource graph into a declarative template.
//!
//! The template is what the provisioning collaborator receives. It is
//! produced only from a graph that passes validation.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use watanabe_common::error::{InfraError, Result};
use watanabe_common::types::{Attribute, ResourceKind};

use crate::declaration::ResourceDeclaration;
use crate::graph::ResourceGraph;

const FORMAT_VERSION: &str = "2010-09-09";

/// One resource entry of a template.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemplateResource {
    /// Provider type name.
    #[serde(rename = "Type")]
    pub resource_type: String,
    /// Rendered properties.
    pub properties: Value,
    /// Annotations that are not provider properties.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    /// Explicit ordering dependencies.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    /// Removal policy override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<String>,
}

/// One exported value of a template.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemplateOutput {
    /// What the value is.
    pub description: String,
    /// Rendered value.
    pub value: Value,
}

/// A synthesized template document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    /// Template format version.
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub format_version: String,
    /// Human-readable description.
    pub description: String,
    /// Resources keyed by logical id.
    pub resources: BTreeMap<String, TemplateResource>,
    /// Exported values keyed by output name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, TemplateOutput>,
}

impl Template {
    /// Validates `graph` and renders it.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph fails validation.
    pub fn synthesize(graph: &ResourceGraph, description: impl Into<String>) -> Result<Self> {
        graph.validate()?;

        let resources = graph
            .declarations()
            .map(|decl| (decl.id().to_string(), render_resource(decl)))
            .collect();
        let outputs = graph.declarations().filter_map(render_output).collect();

        tracing::info!(resources = graph.len(), "synthesized template");
        Ok(Self {
            format_version: FORMAT_VERSION.to_string(),
            description: description.into(),
            resources,
            outputs,
        })
    }

    /// Returns one resource entry.
    #[must_use]
    pub fn resource(&self, id: &str) -> Option<&TemplateResource> {
        self.resources.get(id)
    }

    /// Serializes the template as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Writes rendered template text to `path`.
///
/// # Errors
///
/// Returns [`InfraError::Io`] naming `path` if the file cannot be written.
pub fn write_rendered(path: &Path, rendered: &str) -> Result<()> {
    std::fs::write(path, rendered).map_err(|source| InfraError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = rendered.len(), "wrote template");
    Ok(())
}

fn render_resource(decl: &ResourceDeclaration) -> TemplateResource {
    TemplateResource {
        resource_type: decl.kind().provider_type().to_string(),
        properties: decl.properties().render(),
        metadata: (!decl.metadata().is_empty()).then(|| decl.metadata().render()),
        depends_on: decl
            .ordering()
            .iter()
            .map(|r| r.id().to_string())
            .collect(),
        deletion_policy: decl
            .removal_policy()
            .map(|policy| policy.provider_name().to_string()),
    }
}

fn render_output(decl: &ResourceDeclaration) -> Option<(String, TemplateOutput)> {
    let (suffix, attribute, description) = match decl.kind() {
        ResourceKind::LoadBalancer => ("DnsName", Attribute::DnsName, "Public DNS name of the load balancer"),
        ResourceKind::Registry => ("Uri", Attribute::RepositoryUri, "URI images are pushed to"),
        ResourceKind::DatabaseInstance => {
            ("Endpoint", Attribute::EndpointAddress, "Host name of the database endpoint")
        }
        _ => return None,
    };
    let id = decl.id().as_str();
    Some((
        format!("{id}{suffix}"),
        TemplateOutput {
            description: description.to_string(),
            value: serde_json::json!({ "Fn::GetAtt": [id, attribute.provider_name()] }),
        },
    ))
}
