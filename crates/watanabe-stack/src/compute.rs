//! Cluster, log group, task definition, and the long-running service.

use watanabe_common::constants::{
    APPLICATION_PORT, LOG_GROUP_NAME, LOG_RETENTION_DAYS, TASK_CPU, TASK_MEMORY_MIB,
};
use watanabe_common::error::Result;
use watanabe_graph::resources::compute::{
    ClusterSpec, ContainerSpec, LogBinding, LogSinkSpec, ServiceSpec, TargetAttachment,
    TaskDefinitionSpec,
};
use watanabe_graph::{Property, RemovalPolicy, ResourceGraph, ResourceHandle};

use crate::network::Network;
use crate::options::StackOptions;
use crate::registry::Registries;
use crate::routing::Routing;

/// Name of the reverse-proxy container that receives balanced traffic.
pub const WEB_CONTAINER: &str = "watanabe-web";

/// Name of the application runtime container.
pub const APP_CONTAINER: &str = "watanabe-app";

/// Handles of the compute layer, minus the service.
#[derive(Debug, Clone)]
pub struct Compute {
    /// The cluster the service runs in.
    pub cluster: ResourceHandle,
    /// Log group both containers write to.
    pub log_sink: ResourceHandle,
    /// The two-container task definition.
    pub task_definition: ResourceHandle,
}

/// Declares the cluster, log group, and task definition.
///
/// `app_environment` becomes the environment of the application container.
///
/// # Errors
///
/// Returns an error if a declaration fails.
pub fn declare_compute(
    graph: &mut ResourceGraph,
    options: &StackOptions,
    registries: &Registries,
    app_environment: Vec<(String, Property)>,
) -> Result<Compute> {
    let cluster = graph.declare(
        options.id("Cluster"),
        ClusterSpec {
            name: options.id("Cluster"),
        },
    )?;
    let log_sink = graph.declare(
        options.id("LogGroup"),
        LogSinkSpec {
            name: LOG_GROUP_NAME.to_string(),
            retention_days: LOG_RETENTION_DAYS,
            removal: Some(RemovalPolicy::Delete),
        },
    )?;

    let logging = |prefix: &str| LogBinding {
        sink: log_sink.reference(),
        stream_prefix: prefix.to_string(),
        region: options.region.clone(),
    };
    let task_definition = graph.declare(
        options.id("TaskDefinition"),
        TaskDefinitionSpec {
            family: options.id("TaskDefinition"),
            cpu: TASK_CPU,
            memory_mib: TASK_MEMORY_MIB,
            containers: vec![
                ContainerSpec {
                    name: WEB_CONTAINER.to_string(),
                    image: registries.web_image(),
                    port: Some(APPLICATION_PORT),
                    logging: logging("web"),
                    environment: Vec::new(),
                },
                ContainerSpec {
                    name: APP_CONTAINER.to_string(),
                    image: registries.app_image(),
                    port: None,
                    logging: logging("app"),
                    environment: app_environment,
                },
            ],
        },
    )?;

    Ok(Compute {
        cluster,
        log_sink,
        task_definition,
    })
}

/// Declares the service in the isolated subnets behind the load balancer.
///
/// The service registers its web container with the target group and is
/// ordered after the listener so traffic is only routed once it exists.
///
/// # Errors
///
/// Returns an error if the declaration fails.
pub fn declare_service(
    graph: &mut ResourceGraph,
    options: &StackOptions,
    network: &Network,
    compute: &Compute,
    boundary: &ResourceHandle,
    routing: &Routing,
) -> Result<ResourceHandle> {
    graph.declare(
        options.id("FargateService"),
        ServiceSpec {
            name: options.id("FargateService"),
            cluster: compute.cluster.reference(),
            task_definition: compute.task_definition.reference(),
            desired_count: options.desired_count,
            subnets: network.isolated_refs(),
            boundaries: vec![boundary.reference()],
            assign_public_ip: false,
            attachments: vec![TargetAttachment {
                target_group: routing.target_group.reference(),
                container_name: WEB_CONTAINER.to_string(),
                container_port: APPLICATION_PORT,
            }],
            after: vec![routing.listener.reference()],
        },
    )
}
