//! Formatted output helpers for CLI commands.
//!
//! Provides the plan listing, the redacted record listing, and template
//! rendering in the supported formats.

use std::path::Path;

use anyhow::Context;
use clap::ValueEnum;
use watanabe_config::ConfigurationRecord;
use watanabe_graph::{Dependency, Template};
use watanabe_stack::Stack;

const RULE_WIDTH: usize = 35;

/// Template serialization format.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    /// Pretty-printed JSON.
    #[default]
    Json,
    /// YAML.
    Yaml,
}

/// Renders `template` in `format`.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_template(template: &Template, format: Format) -> anyhow::Result<String> {
    match format {
        Format::Json => {
            let mut json = template.to_json()?;
            json.push('\n');
            Ok(json)
        }
        Format::Yaml => serde_yaml::to_string(template).context("failed to render YAML"),
    }
}

/// Writes `content` to `path`.
///
/// # Errors
///
/// Returns an I/O error naming `path` if the file cannot be written.
pub fn write_file(path: &Path, content: &str) -> anyhow::Result<()> {
    watanabe_graph::template::write_rendered(path, content)?;
    Ok(())
}

/// Lines of the `config` listing. Secret values are masked.
#[must_use]
pub fn record_lines(record: &ConfigurationRecord) -> Vec<String> {
    let mut lines = vec![format!("mode: {}", record.mode())];
    lines.extend(
        record
            .redacted()
            .map(|(field, value)| format!("  {}={value}", field.input_name())),
    );
    lines
}

fn describe(dependency: Dependency) -> String {
    match dependency {
        Dependency::Output(attribute) => attribute.to_string(),
        Dependency::Ordering => "after".to_string(),
    }
}

/// Lines of the `plan` listing, in construction order.
#[must_use]
pub fn plan_lines(stack: &Stack) -> Vec<String> {
    let graph = stack.graph();
    let mut lines = vec![
        format!("Plan for: {}", stack.name()),
        "\u{2550}".repeat(RULE_WIDTH),
        String::new(),
    ];
    for decl in graph.declarations() {
        lines.push(format!("  + {} [{}]", decl.id(), decl.kind()));
        for (dependency, edge) in graph.dependencies(decl.id().as_str()) {
            lines.push(format!("      <- {} ({})", dependency.id(), describe(edge)));
        }
    }
    lines.push(String::new());
    lines.push(format!("  {} resource(s) will be declared.", graph.len()));
    lines
}
