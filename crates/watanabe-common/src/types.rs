//! Domain primitive types used across the Watanabe workspace.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{InfraError, Result};

/// Identifier of one resource declaration, unique within a graph.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LogicalId(String);

impl LogicalId {
    /// Creates a logical id from a string value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LogicalId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for LogicalId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Kind of cloud resource a declaration describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    /// Virtual network.
    Network,
    /// Subnet inside a network.
    Subnet,
    /// Private connectivity endpoint to a provider service.
    Endpoint,
    /// Directional traffic-permission rule set.
    SecurityBoundary,
    /// Container image registry.
    Registry,
    /// Compute cluster.
    Cluster,
    /// Container task definition.
    TaskDefinition,
    /// Long-running service of a task definition.
    Service,
    /// Application load balancer.
    LoadBalancer,
    /// Load balancer target group.
    TargetGroup,
    /// Load balancer listener.
    Listener,
    /// Managed relational database instance.
    DatabaseInstance,
    /// Subnets a database instance is placed in.
    DatabaseSubnetGroup,
    /// Log group shared by containers.
    LogSink,
    /// Parameter store entry.
    Parameter,
    /// Provider-generated secret.
    Secret,
}

impl ResourceKind {
    /// Provider type name used in synthesized templates.
    #[must_use]
    pub const fn provider_type(self) -> &'static str {
        match self {
            Self::Network => "AWS::EC2::VPC",
            Self::Subnet => "AWS::EC2::Subnet",
            Self::Endpoint => "AWS::EC2::VPCEndpoint",
            Self::SecurityBoundary => "AWS::EC2::SecurityGroup",
            Self::Registry => "AWS::ECR::Repository",
            Self::Cluster => "AWS::ECS::Cluster",
            Self::TaskDefinition => "AWS::ECS::TaskDefinition",
            Self::Service => "AWS::ECS::Service",
            Self::LoadBalancer => "AWS::ElasticLoadBalancingV2::LoadBalancer",
            Self::TargetGroup => "AWS::ElasticLoadBalancingV2::TargetGroup",
            Self::Listener => "AWS::ElasticLoadBalancingV2::Listener",
            Self::DatabaseInstance => "AWS::RDS::DBInstance",
            Self::DatabaseSubnetGroup => "AWS::RDS::DBSubnetGroup",
            Self::LogSink => "AWS::Logs::LogGroup",
            Self::Parameter => "AWS::SSM::Parameter",
            Self::Secret => "AWS::SecretsManager::Secret",
        }
    }

    /// Returns whether resources of this kind export `attribute`.
    #[must_use]
    pub const fn exports(self, attribute: Attribute) -> bool {
        match attribute {
            Attribute::Id => true,
            Attribute::Arn => matches!(
                self,
                Self::Registry
                    | Self::Cluster
                    | Self::TaskDefinition
                    | Self::LoadBalancer
                    | Self::TargetGroup
                    | Self::Listener
                    | Self::LogSink
                    | Self::Secret
            ),
            Attribute::GroupId => matches!(self, Self::SecurityBoundary),
            Attribute::EndpointAddress | Attribute::EndpointPort => {
                matches!(self, Self::DatabaseInstance)
            }
            Attribute::DnsName => matches!(self, Self::LoadBalancer),
            Attribute::RepositoryUri => matches!(self, Self::Registry),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Network => "network",
            Self::Subnet => "subnet",
            Self::Endpoint => "endpoint",
            Self::SecurityBoundary => "security-boundary",
            Self::Registry => "registry",
            Self::Cluster => "cluster",
            Self::TaskDefinition => "task-definition",
            Self::Service => "service",
            Self::LoadBalancer => "load-balancer",
            Self::TargetGroup => "target-group",
            Self::Listener => "listener",
            Self::DatabaseInstance => "database-instance",
            Self::DatabaseSubnetGroup => "database-subnet-group",
            Self::LogSink => "log-sink",
            Self::Parameter => "parameter",
            Self::Secret => "secret",
        };
        write!(f, "{name}")
    }
}

/// Output attribute of a declared resource that another declaration consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Attribute {
    /// Primary identifier (rendered as a plain reference).
    Id,
    /// Provider resource name.
    Arn,
    /// Security group identifier.
    GroupId,
    /// Database endpoint host name.
    EndpointAddress,
    /// Database endpoint port.
    EndpointPort,
    /// Load balancer DNS name.
    DnsName,
    /// Registry URI that image sources pull from.
    RepositoryUri,
}

impl Attribute {
    /// Attribute name used in synthesized templates.
    #[must_use]
    pub const fn provider_name(self) -> &'static str {
        match self {
            Self::Id => "Ref",
            Self::Arn => "Arn",
            Self::GroupId => "GroupId",
            Self::EndpointAddress => "Endpoint.Address",
            Self::EndpointPort => "Endpoint.Port",
            Self::DnsName => "DNSName",
            Self::RepositoryUri => "RepositoryUri",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.provider_name())
    }
}

/// Role of a subnet inside the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubnetClass {
    /// Routed to the internet gateway; hosts the load balancer.
    Public,
    /// No route to the internet; hosts compute and database.
    Isolated,
}

impl fmt::Display for SubnetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Isolated => write!(f, "isolated"),
        }
    }
}

/// An IPv4 address range in CIDR notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Cidr {
    address: Ipv4Addr,
    prefix: u8,
}

impl Ipv4Cidr {
    /// `10.0.0.0/16`, the default network range.
    pub const DEFAULT_NETWORK: Self = Self {
        address: Ipv4Addr::new(10, 0, 0, 0),
        prefix: 16,
    };

    /// Creates a CIDR block, masking away host bits.
    ///
    /// # Errors
    ///
    /// Returns an error if `prefix` is greater than 32.
    pub fn new(address: Ipv4Addr, prefix: u8) -> Result<Self> {
        if prefix > 32 {
            return Err(InfraError::Config {
                message: format!("invalid CIDR prefix length: /{prefix}"),
            });
        }
        let masked = u32::from(address) & Self::mask(prefix);
        Ok(Self {
            address: Ipv4Addr::from(masked),
            prefix,
        })
    }

    /// Returns the network address.
    #[must_use]
    pub const fn address(&self) -> Ipv4Addr {
        self.address
    }

    /// Returns the prefix length.
    #[must_use]
    pub const fn prefix(&self) -> u8 {
        self.prefix
    }

    /// Returns the `index`-th block of length `prefix` inside this range.
    ///
    /// # Errors
    ///
    /// Returns an error if `prefix` is shorter than this range's prefix or
    /// the block would fall outside the range.
    pub fn subnet(&self, prefix: u8, index: u32) -> Result<Self> {
        if prefix < self.prefix || prefix > 32 {
            return Err(InfraError::Config {
                message: format!("cannot carve /{prefix} blocks out of {self}"),
            });
        }
        let available = 1_u64 << (prefix - self.prefix);
        if u64::from(index) >= available {
            return Err(InfraError::Config {
                message: format!("{self} holds only {available} /{prefix} blocks"),
            });
        }
        let step = 1_u64 << (32 - prefix);
        let base = u64::from(u32::from(self.address)) + u64::from(index) * step;
        let base = u32::try_from(base).map_err(|_| InfraError::Config {
            message: format!("subnet {index} of {self} overflows the address space"),
        })?;
        Self::new(Ipv4Addr::from(base), prefix)
    }

    const fn mask(prefix: u8) -> u32 {
        if prefix == 0 {
            0
        } else {
            u32::MAX << (32 - prefix)
        }
    }
}

impl fmt::Display for Ipv4Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix)
    }
}

impl FromStr for Ipv4Cidr {
    type Err = InfraError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || InfraError::Config {
            message: format!("invalid CIDR block: {s}"),
        };
        let (addr, prefix) = s.split_once('/').ok_or_else(invalid)?;
        let address: Ipv4Addr = addr.parse().map_err(|_| invalid())?;
        let prefix: u8 = prefix.parse().map_err(|_| invalid())?;
        Self::new(address, prefix)
    }
}

impl Serialize for Ipv4Cidr {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Ipv4Cidr {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
