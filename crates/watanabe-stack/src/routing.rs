//! Public load balancer, target group, and HTTPS listener.

use watanabe_common::constants::{
    APPLICATION_PORT, HEALTH_CHECK_INTERVAL_SECS, HEALTH_CHECK_PATH, HEALTH_CHECK_TIMEOUT_SECS,
    HEALTHY_HTTP_CODES, HTTPS_PORT,
};
use watanabe_common::error::Result;
use watanabe_graph::resources::routing::{
    HealthCheck, ListenerSpec, LoadBalancerSpec, TargetGroupSpec,
};
use watanabe_graph::{ResourceGraph, ResourceHandle};

use crate::network::Network;
use crate::options::StackOptions;

/// Handles of the routing layer.
#[derive(Debug, Clone)]
pub struct Routing {
    /// Internet-facing load balancer.
    pub load_balancer: ResourceHandle,
    /// Target group the service registers with.
    pub target_group: ResourceHandle,
    /// HTTPS listener forwarding to the target group.
    pub listener: ResourceHandle,
}

/// Declares the routing layer in the public subnets.
///
/// # Errors
///
/// Returns an error if a declaration fails.
pub fn declare_routing(
    graph: &mut ResourceGraph,
    options: &StackOptions,
    network: &Network,
    boundary: &ResourceHandle,
    certificate_arn: &str,
) -> Result<Routing> {
    let load_balancer = graph.declare(
        options.id("Alb"),
        LoadBalancerSpec {
            name: options.id("Alb"),
            internet_facing: true,
            subnets: network.public_refs(),
            boundaries: vec![boundary.reference()],
        },
    )?;
    let target_group = graph.declare(
        options.id("TargetGroup"),
        TargetGroupSpec {
            network: network.vpc.reference(),
            port: APPLICATION_PORT,
            protocol: "HTTP".to_string(),
            health_check: HealthCheck {
                path: HEALTH_CHECK_PATH.to_string(),
                healthy_http_codes: HEALTHY_HTTP_CODES.to_string(),
                interval_secs: HEALTH_CHECK_INTERVAL_SECS,
                timeout_secs: HEALTH_CHECK_TIMEOUT_SECS,
            },
        },
    )?;
    let listener = graph.declare(
        options.id("HttpsListener"),
        ListenerSpec {
            load_balancer: load_balancer.reference(),
            port: HTTPS_PORT,
            certificate_arn: certificate_arn.to_string(),
            default_target_group: target_group.reference(),
        },
    )?;

    Ok(Routing {
        load_balancer,
        target_group,
        listener,
    })
}
