//! # watanabe-stack
//!
//! The Watanabe stacks, declared as resource graphs.
//!
//! Handles:
//! - **Options**: stack-wide naming, placement, and database strategy.
//! - **Network**: network, subnets, and private endpoints.
//! - **Security**: the load balancer, compute, and database boundary chain.
//! - **Database**: credential planning and the optional managed database.
//! - **Compute**: cluster, log group, task definition, and service.
//! - **Routing**: load balancer, target group, and HTTPS listener.
//!
//! [`build_stack`] resolves configuration exactly once and produces the
//! application stack. [`build_registry_stack`] produces the separately
//! deployed image registries.

pub mod compute;
pub mod database;
pub mod environment;
pub mod network;
pub mod options;
pub mod registry;
pub mod routing;
pub mod security;

use watanabe_common::constants::{APP_KEY_PARAMETER_NAME, APP_KEY_PARAMETER_VALUE};
use watanabe_common::error::{InfraError, Result};
use watanabe_config::{ConfigSource, ConfigurationRecord, Field, resolve};
use watanabe_graph::resources::storage::ParameterSpec;
use watanabe_graph::{RemovalPolicy, ResourceGraph, Template};

pub use options::{DatabaseMode, StackOptions};

/// A named, fully declared resource graph.
#[derive(Debug)]
pub struct Stack {
    name: String,
    description: String,
    graph: ResourceGraph,
}

impl Stack {
    /// Stack name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The declared graph.
    #[must_use]
    pub const fn graph(&self) -> &ResourceGraph {
        &self.graph
    }

    /// Validates the graph and renders it as a template.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph fails validation.
    pub fn synthesize(&self) -> Result<Template> {
        Template::synthesize(&self.graph, self.description.clone())
    }
}

/// Resolves configuration from `source` and builds the application stack.
///
/// Resolution happens once, before any declaration. If it fails, no graph
/// is built.
///
/// # Errors
///
/// Returns a configuration error if resolution fails, or any error
/// [`build_stack_with`] returns.
pub fn build_stack<S: ConfigSource + ?Sized>(source: &S, options: &StackOptions) -> Result<Stack> {
    let record = resolve(source)?;
    build_stack_with(&record, options)
}

/// Builds the application stack from an already resolved record.
///
/// # Errors
///
/// Returns an error if the options are invalid, the record carries no
/// certificate ARN, the database strategy cannot be satisfied, or a
/// declaration fails.
pub fn build_stack_with(record: &ConfigurationRecord, options: &StackOptions) -> Result<Stack> {
    options.validate()?;
    let certificate_arn = record
        .certificate_arn()
        .ok_or(InfraError::MissingInput {
            mode: record.mode().name(),
            input: Field::AcmCertificateArn.input_name(),
        })?;
    let plan = database::plan_database(record, options.database)?;
    tracing::info!(
        mode = record.mode().name(),
        database = %options.database,
        with_database = plan.is_some(),
        "building application stack"
    );

    let mut graph = ResourceGraph::new();
    let _ = graph.declare(
        options.id("AppKeyParameter"),
        ParameterSpec {
            name: APP_KEY_PARAMETER_NAME.to_string(),
            value: APP_KEY_PARAMETER_VALUE.to_string(),
        },
    )?;

    let network = network::declare_network(&mut graph, options)?;
    let _ = network::declare_endpoints(&mut graph, options, &network)?;
    let boundaries = security::declare_boundaries(&mut graph, options, &network, plan.is_some())?;

    let database = match (plan, boundaries.database.as_ref()) {
        (Some(plan), Some(boundary)) => Some(database::declare_database(
            &mut graph, options, &network, boundary, plan,
        )?),
        _ => None,
    };

    let registries = registry::declare_registries(&mut graph, options, None)?;
    let environment = environment::application_environment(record, database.as_ref());
    let compute = compute::declare_compute(&mut graph, options, &registries, environment)?;
    let routing = routing::declare_routing(
        &mut graph,
        options,
        &network,
        &boundaries.load_balancer,
        certificate_arn,
    )?;
    let _ = compute::declare_service(
        &mut graph,
        options,
        &network,
        &compute,
        &boundaries.compute,
        &routing,
    )?;

    tracing::debug!(declarations = graph.len(), "application stack declared");
    Ok(Stack {
        name: options.id("Stack"),
        description: format!("{} application stack ({})", options.prefix, record.mode().name()),
        graph,
    })
}

/// Builds the stack holding the two image registries.
///
/// Registries are removed together with the stack.
///
/// # Errors
///
/// Returns an error if the options are invalid or a declaration fails.
pub fn build_registry_stack(options: &StackOptions) -> Result<Stack> {
    options.validate()?;
    let mut graph = ResourceGraph::new();
    let _ = registry::declare_registries(&mut graph, options, Some(RemovalPolicy::Delete))?;
    tracing::info!(declarations = graph.len(), "registry stack declared");
    Ok(Stack {
        name: options.id("EcrStack"),
        description: format!("{} image registries", options.prefix),
        graph,
    })
}
