//! Security boundary specs.

use watanabe_common::types::{Attribute, ResourceKind};

use crate::declaration::Declare;
use crate::property::{Properties, Property, Reference};

/// CIDR that stands for every IPv4 source.
pub const ANY_IPV4: &str = "0.0.0.0/0";

/// Source of permitted inbound traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Peer {
    /// Any IPv4 address.
    AnyIpv4,
    /// Members of another security boundary.
    Boundary(Reference),
}

/// One inbound TCP permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngressRule {
    /// Permitted source.
    pub peer: Peer,
    /// Destination port.
    pub port: u16,
}

impl IngressRule {
    fn into_property(self) -> Property {
        let rule = Properties::new()
            .set("IpProtocol", "tcp")
            .set("FromPort", self.port)
            .set("ToPort", self.port);
        let rule = match self.peer {
            Peer::AnyIpv4 => rule.set("CidrIp", ANY_IPV4),
            Peer::Boundary(group) => rule.set("SourceSecurityGroupId", group),
        };
        rule.into()
    }
}

/// A security group with its inbound rules.
#[derive(Debug, Clone)]
pub struct SecurityBoundarySpec {
    /// Group name.
    pub name: String,
    /// Network the group belongs to.
    pub network: Reference,
    /// Inbound rules.
    pub ingress: Vec<IngressRule>,
}

impl SecurityBoundarySpec {
    /// Creates a boundary without inbound rules.
    #[must_use]
    pub fn new(name: impl Into<String>, network: Reference) -> Self {
        Self {
            name: name.into(),
            network,
            ingress: Vec::new(),
        }
    }

    /// Permits TCP traffic on `port` from every IPv4 source.
    #[must_use]
    pub fn allow_any_ipv4(mut self, port: u16) -> Self {
        self.ingress.push(IngressRule {
            peer: Peer::AnyIpv4,
            port,
        });
        self
    }

    /// Permits TCP traffic on `port` from members of `source`.
    #[must_use]
    pub fn allow_from(mut self, source: &crate::graph::ResourceHandle, port: u16) -> Self {
        self.ingress.push(IngressRule {
            peer: Peer::Boundary(source.attr(Attribute::GroupId)),
            port,
        });
        self
    }
}

impl Declare for SecurityBoundarySpec {
    const KIND: ResourceKind = ResourceKind::SecurityBoundary;

    fn into_properties(self) -> Properties {
        Properties::new()
            .set("GroupName", self.name.clone())
            .set("GroupDescription", format!("{} security group", self.name))
            .set("VpcId", self.network)
            .set(
                "SecurityGroupIngress",
                Property::List(
                    self.ingress
                        .into_iter()
                        .map(IngressRule::into_property)
                        .collect(),
                ),
            )
            .set(
                "SecurityGroupEgress",
                Property::list([Properties::new()
                    .set("IpProtocol", "-1")
                    .set("CidrIp", ANY_IPV4)]),
            )
    }
}

/// Permitted sources of one boundary, read back from its declaration.
///
/// Returns `None` for a source that is neither an open range nor another
/// boundary.
#[must_use]
pub fn ingress_sources(properties: &Properties) -> Vec<Option<Peer>> {
    properties
        .get("SecurityGroupIngress")
        .and_then(Property::as_list)
        .unwrap_or_default()
        .iter()
        .map(|rule| {
            if rule.get("CidrIp").and_then(Property::as_str) == Some(ANY_IPV4) {
                Some(Peer::AnyIpv4)
            } else {
                rule.get("SourceSecurityGroupId")
                    .and_then(Property::as_reference)
                    .map(|r| Peer::Boundary(r.clone()))
            }
        })
        .collect()
}
