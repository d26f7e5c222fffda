//! Network, subnet, and private endpoint specs.

use watanabe_common::types::{Ipv4Cidr, ResourceKind, SubnetClass};

use crate::declaration::Declare;
use crate::property::{Properties, Property, Reference};
use crate::resources::reference_list;

/// A virtual network.
#[derive(Debug, Clone)]
pub struct NetworkSpec {
    /// Name tag.
    pub name: String,
    /// Address range.
    pub cidr: Ipv4Cidr,
    /// Whether an internet gateway is attached.
    pub internet_gateway: bool,
    /// Number of NAT gateways.
    pub nat_gateways: u32,
}

impl Declare for NetworkSpec {
    const KIND: ResourceKind = ResourceKind::Network;

    fn metadata(&self) -> Properties {
        Properties::new()
            .set("InternetGateway", self.internet_gateway)
            .set("NatGateways", self.nat_gateways)
    }

    fn into_properties(self) -> Properties {
        Properties::new()
            .set("CidrBlock", self.cidr.to_string())
            .set("EnableDnsHostnames", true)
            .set("EnableDnsSupport", true)
            .set("Tags", name_tag(&self.name))
    }
}

/// A subnet of one class in one availability zone.
#[derive(Debug, Clone)]
pub struct SubnetSpec {
    /// Name tag.
    pub name: String,
    /// Network the subnet belongs to.
    pub network: Reference,
    /// Address range.
    pub cidr: Ipv4Cidr,
    /// Availability zone.
    pub availability_zone: String,
    /// Public or isolated.
    pub class: SubnetClass,
}

impl Declare for SubnetSpec {
    const KIND: ResourceKind = ResourceKind::Subnet;

    fn metadata(&self) -> Properties {
        Properties::new().set("SubnetClass", self.class.to_string())
    }

    fn into_properties(self) -> Properties {
        Properties::new()
            .set("VpcId", self.network)
            .set("CidrBlock", self.cidr.to_string())
            .set("AvailabilityZone", self.availability_zone)
            .set("MapPublicIpOnLaunch", self.class == SubnetClass::Public)
            .set("Tags", name_tag(&self.name))
    }
}

/// Provider service reachable through a private endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointService {
    /// Image registry API.
    RegistryApi,
    /// Image-layer registry.
    RegistryLayers,
    /// Log ingestion.
    Logs,
    /// Object storage.
    ObjectStorage,
}

impl EndpointService {
    /// Service name of the endpoint in `region`.
    #[must_use]
    pub fn service_name(self, region: &str) -> String {
        let suffix = match self {
            Self::RegistryApi => "ecr.api",
            Self::RegistryLayers => "ecr.dkr",
            Self::Logs => "logs",
            Self::ObjectStorage => "s3",
        };
        format!("com.amazonaws.{region}.{suffix}")
    }

    /// Object storage is reached through a gateway endpoint, everything
    /// else through an interface endpoint.
    #[must_use]
    pub const fn is_gateway(self) -> bool {
        matches!(self, Self::ObjectStorage)
    }
}

/// A private connectivity endpoint into the isolated subnets.
#[derive(Debug, Clone)]
pub struct EndpointSpec {
    /// Network the endpoint is attached to.
    pub network: Reference,
    /// Target service.
    pub service: EndpointService,
    /// Region the service name is built for.
    pub region: String,
    /// Subnets the endpoint serves.
    pub subnets: Vec<Reference>,
}

impl Declare for EndpointSpec {
    const KIND: ResourceKind = ResourceKind::Endpoint;

    /// Gateway endpoints attach to route tables, which the graph does not
    /// model, so the subnets they serve are recorded here.
    fn metadata(&self) -> Properties {
        if self.service.is_gateway() {
            Properties::new().set("ServedSubnets", reference_list(self.subnets.clone()))
        } else {
            Properties::new()
        }
    }

    fn into_properties(self) -> Properties {
        let props = Properties::new()
            .set("VpcId", self.network)
            .set("ServiceName", self.service.service_name(&self.region));
        if self.service.is_gateway() {
            props.set("VpcEndpointType", "Gateway")
        } else {
            props
                .set("VpcEndpointType", "Interface")
                .set("PrivateDnsEnabled", true)
                .set("SubnetIds", reference_list(self.subnets))
        }
    }
}

pub(crate) fn name_tag(name: &str) -> Property {
    Property::list([Properties::new().set("Key", "Name").set("Value", name)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_names_are_regional() {
        assert_eq!(
            EndpointService::RegistryLayers.service_name("ap-northeast-1"),
            "com.amazonaws.ap-northeast-1.ecr.dkr"
        );
        assert_eq!(
            EndpointService::ObjectStorage.service_name("us-east-1"),
            "com.amazonaws.us-east-1.s3"
        );
    }

    #[test]
    fn only_object_storage_uses_gateway() {
        assert!(EndpointService::ObjectStorage.is_gateway());
        assert!(!EndpointService::Logs.is_gateway());
    }

    #[test]
    fn network_keeps_gateway_flags_out_of_properties() {
        let spec = NetworkSpec {
            name: "WatanabeVpc".into(),
            cidr: "10.0.0.0/16".parse().expect("cidr"),
            internet_gateway: true,
            nat_gateways: 0,
        };
        let metadata = spec.metadata().render();
        let props = spec.into_properties();
        assert_eq!(props.get("CidrBlock").and_then(Property::as_str), Some("10.0.0.0/16"));
        assert!(props.get("NatGateways").is_none());
        assert!(props.get("InternetGateway").is_none());
        assert_eq!(metadata["NatGateways"], 0);
        assert_eq!(metadata["InternetGateway"], true);
    }
}
