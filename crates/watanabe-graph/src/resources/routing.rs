//! Load balancer, target group, and listener specs.

use watanabe_common::types::ResourceKind;

use crate::declaration::Declare;
use crate::property::{Properties, Property, Reference};
use crate::resources::reference_list;

/// An application load balancer.
#[derive(Debug, Clone)]
pub struct LoadBalancerSpec {
    /// Load balancer name.
    pub name: String,
    /// Whether the load balancer is reachable from the internet.
    pub internet_facing: bool,
    /// Subnets the load balancer spans.
    pub subnets: Vec<Reference>,
    /// Security boundaries attached to the load balancer.
    pub boundaries: Vec<Reference>,
}

impl Declare for LoadBalancerSpec {
    const KIND: ResourceKind = ResourceKind::LoadBalancer;

    fn into_properties(self) -> Properties {
        let scheme = if self.internet_facing {
            "internet-facing"
        } else {
            "internal"
        };
        Properties::new()
            .set("Name", self.name)
            .set("Type", "application")
            .set("Scheme", scheme)
            .set("Subnets", reference_list(self.subnets))
            .set("SecurityGroups", reference_list(self.boundaries))
    }
}

/// Periodic liveness check of a target group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCheck {
    /// Requested HTTP path.
    pub path: String,
    /// Accepted HTTP codes.
    pub healthy_http_codes: String,
    /// Seconds between checks.
    pub interval_secs: u32,
    /// Seconds before a check fails.
    pub timeout_secs: u32,
}

/// A target group of IP targets.
#[derive(Debug, Clone)]
pub struct TargetGroupSpec {
    /// Network the targets live in.
    pub network: Reference,
    /// Target port.
    pub port: u16,
    /// Target protocol.
    pub protocol: String,
    /// Liveness check.
    pub health_check: HealthCheck,
}

impl Declare for TargetGroupSpec {
    const KIND: ResourceKind = ResourceKind::TargetGroup;

    fn into_properties(self) -> Properties {
        Properties::new()
            .set("VpcId", self.network)
            .set("TargetType", "ip")
            .set("Port", self.port)
            .set("Protocol", self.protocol)
            .set("HealthCheckEnabled", true)
            .set("HealthCheckPath", self.health_check.path)
            .set("HealthCheckIntervalSeconds", self.health_check.interval_secs)
            .set("HealthCheckTimeoutSeconds", self.health_check.timeout_secs)
            .set(
                "Matcher",
                Properties::new().set("HttpCode", self.health_check.healthy_http_codes),
            )
    }
}

/// A TLS listener forwarding to one target group.
#[derive(Debug, Clone)]
pub struct ListenerSpec {
    /// Load balancer the listener belongs to.
    pub load_balancer: Reference,
    /// Listening port.
    pub port: u16,
    /// Certificate ARN presented to clients.
    pub certificate_arn: String,
    /// Target group receiving the traffic.
    pub default_target_group: Reference,
}

impl Declare for ListenerSpec {
    const KIND: ResourceKind = ResourceKind::Listener;

    fn into_properties(self) -> Properties {
        Properties::new()
            .set("LoadBalancerArn", self.load_balancer)
            .set("Port", self.port)
            .set("Protocol", "HTTPS")
            .set(
                "Certificates",
                Property::list([Properties::new().set("CertificateArn", self.certificate_arn)]),
            )
            .set(
                "DefaultActions",
                Property::list([Properties::new()
                    .set("Type", "forward")
                    .set("TargetGroupArn", self.default_target_group)]),
            )
    }
}
