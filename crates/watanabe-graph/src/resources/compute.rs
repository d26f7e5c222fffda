//! Cluster, log sink, task definition, and service specs.

use watanabe_common::types::ResourceKind;

use crate::declaration::{Declare, RemovalPolicy};
use crate::property::{Properties, Property, Reference};
use crate::resources::reference_list;
use crate::resources::storage::ImageSource;

/// A compute cluster.
#[derive(Debug, Clone)]
pub struct ClusterSpec {
    /// Cluster name.
    pub name: String,
}

impl Declare for ClusterSpec {
    const KIND: ResourceKind = ResourceKind::Cluster;

    fn into_properties(self) -> Properties {
        Properties::new().set("ClusterName", self.name)
    }
}

/// A log group shared by containers.
#[derive(Debug, Clone)]
pub struct LogSinkSpec {
    /// Log group name.
    pub name: String,
    /// Retention in days.
    pub retention_days: u32,
    /// Removal policy override.
    pub removal: Option<RemovalPolicy>,
}

impl Declare for LogSinkSpec {
    const KIND: ResourceKind = ResourceKind::LogSink;

    fn removal_policy(&self) -> Option<RemovalPolicy> {
        self.removal
    }

    fn into_properties(self) -> Properties {
        Properties::new()
            .set("LogGroupName", self.name)
            .set("RetentionInDays", self.retention_days)
    }
}

/// Binding of a container's output to a log stream.
#[derive(Debug, Clone)]
pub struct LogBinding {
    /// Log group receiving the stream.
    pub sink: Reference,
    /// Stream prefix.
    pub stream_prefix: String,
    /// Region of the log group.
    pub region: String,
}

impl LogBinding {
    fn into_property(self) -> Property {
        Properties::new()
            .set("LogDriver", "awslogs")
            .set(
                "Options",
                Properties::new()
                    .set("awslogs-group", self.sink)
                    .set("awslogs-stream-prefix", self.stream_prefix)
                    .set("awslogs-region", self.region),
            )
            .into()
    }
}

/// One container of a task definition.
#[derive(Debug, Clone)]
pub struct ContainerSpec {
    /// Container name.
    pub name: String,
    /// Image the container runs.
    pub image: ImageSource,
    /// Container port exposed to the task network.
    pub port: Option<u16>,
    /// Log stream binding.
    pub logging: LogBinding,
    /// Environment variables, in declaration order.
    pub environment: Vec<(String, Property)>,
}

impl ContainerSpec {
    fn into_property(self) -> Property {
        let environment = self
            .environment
            .into_iter()
            .map(|(name, value)| Property::from(Properties::new().set("Name", name).set("Value", value)))
            .collect::<Vec<_>>();
        let port_mappings = self
            .port
            .map(|port| {
                Property::list([Properties::new()
                    .set("ContainerPort", port)
                    .set("Protocol", "tcp")])
            })
            .unwrap_or_else(|| Property::List(Vec::new()));
        Properties::new()
            .set("Name", self.name)
            .set("Image", self.image.into_property())
            .set("Essential", true)
            .set("PortMappings", port_mappings)
            .set("LogConfiguration", self.logging.into_property())
            .set("Environment", Property::List(environment))
            .into()
    }
}

/// A serverless task definition.
#[derive(Debug, Clone)]
pub struct TaskDefinitionSpec {
    /// Task family.
    pub family: String,
    /// CPU units.
    pub cpu: u32,
    /// Memory in MiB.
    pub memory_mib: u32,
    /// Containers, in launch order.
    pub containers: Vec<ContainerSpec>,
}

impl Declare for TaskDefinitionSpec {
    const KIND: ResourceKind = ResourceKind::TaskDefinition;

    fn into_properties(self) -> Properties {
        Properties::new()
            .set("Family", self.family)
            .set("Cpu", self.cpu.to_string())
            .set("Memory", self.memory_mib.to_string())
            .set("NetworkMode", "awsvpc")
            .set("RequiresCompatibilities", Property::list(["FARGATE"]))
            .set(
                "ContainerDefinitions",
                Property::List(
                    self.containers
                        .into_iter()
                        .map(ContainerSpec::into_property)
                        .collect(),
                ),
            )
    }
}

/// Registration of a service container in a target group.
#[derive(Debug, Clone)]
pub struct TargetAttachment {
    /// Target group receiving the container.
    pub target_group: Reference,
    /// Container to register.
    pub container_name: String,
    /// Container port to register.
    pub container_port: u16,
}

/// A long-running service of a task definition.
#[derive(Debug, Clone)]
pub struct ServiceSpec {
    /// Service name.
    pub name: String,
    /// Cluster the service runs in.
    pub cluster: Reference,
    /// Task definition to run.
    pub task_definition: Reference,
    /// Replicas to keep running.
    pub desired_count: u32,
    /// Subnets the tasks are placed in.
    pub subnets: Vec<Reference>,
    /// Security boundaries attached to the tasks.
    pub boundaries: Vec<Reference>,
    /// Whether tasks get a public address.
    pub assign_public_ip: bool,
    /// Target groups the service registers with.
    pub attachments: Vec<TargetAttachment>,
    /// Declarations the service must wait for, such as listeners.
    pub after: Vec<Reference>,
}

impl Declare for ServiceSpec {
    const KIND: ResourceKind = ResourceKind::Service;

    fn ordering(&self) -> Vec<Reference> {
        self.after.clone()
    }

    fn into_properties(self) -> Properties {
        let load_balancers = self
            .attachments
            .into_iter()
            .map(|attachment| {
                Property::from(
                    Properties::new()
                        .set("TargetGroupArn", attachment.target_group)
                        .set("ContainerName", attachment.container_name)
                        .set("ContainerPort", attachment.container_port),
                )
            })
            .collect::<Vec<_>>();
        let assign_public_ip = if self.assign_public_ip {
            "ENABLED"
        } else {
            "DISABLED"
        };
        Properties::new()
            .set("ServiceName", self.name)
            .set("Cluster", self.cluster)
            .set("TaskDefinition", self.task_definition)
            .set("DesiredCount", self.desired_count)
            .set("LaunchType", "FARGATE")
            .set("PlatformVersion", "LATEST")
            .set(
                "NetworkConfiguration",
                Properties::new().set(
                    "AwsvpcConfiguration",
                    Properties::new()
                        .set("AssignPublicIp", assign_public_ip)
                        .set("SecurityGroups", reference_list(self.boundaries))
                        .set("Subnets", reference_list(self.subnets)),
                ),
            )
            .set("LoadBalancers", Property::List(load_balancers))
    }
}
