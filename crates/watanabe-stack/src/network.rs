//! Network, subnets, and private endpoints.

use watanabe_common::error::Result;
use watanabe_common::types::SubnetClass;
use watanabe_graph::resources::network::{EndpointService, EndpointSpec, NetworkSpec, SubnetSpec};
use watanabe_graph::{Reference, ResourceGraph, ResourceHandle};

use crate::options::StackOptions;

/// Handles of the declared network.
#[derive(Debug, Clone)]
pub struct Network {
    /// The network itself.
    pub vpc: ResourceHandle,
    /// One public subnet per availability zone.
    pub public_subnets: Vec<ResourceHandle>,
    /// One isolated subnet per availability zone.
    pub isolated_subnets: Vec<ResourceHandle>,
}

impl Network {
    /// References to the public subnets.
    #[must_use]
    pub fn public_refs(&self) -> Vec<Reference> {
        self.public_subnets.iter().map(ResourceHandle::reference).collect()
    }

    /// References to the isolated subnets.
    #[must_use]
    pub fn isolated_refs(&self) -> Vec<Reference> {
        self.isolated_subnets.iter().map(ResourceHandle::reference).collect()
    }
}

/// Declares the network and its subnets.
///
/// Subnet ranges are carved in order from the network range, all public
/// subnets first.
///
/// # Errors
///
/// Returns an error if a range cannot be carved or a declaration fails.
pub fn declare_network(graph: &mut ResourceGraph, options: &StackOptions) -> Result<Network> {
    let vpc = graph.declare(
        options.id("Vpc"),
        NetworkSpec {
            name: options.id("Vpc"),
            cidr: options.network_cidr,
            internet_gateway: true,
            nat_gateways: 0,
        },
    )?;

    let mut index = 0_u32;
    let mut subnets = |graph: &mut ResourceGraph, class: SubnetClass| -> Result<Vec<ResourceHandle>> {
        let label = match class {
            SubnetClass::Public => "Public",
            SubnetClass::Isolated => "Isolated",
        };
        let mut handles = Vec::with_capacity(options.availability_zones.len());
        for (n, zone) in options.availability_zones.iter().enumerate() {
            let cidr = options.network_cidr.subnet(options.subnet_mask, index)?;
            index += 1;
            handles.push(graph.declare(
                options.id(&format!("{label}Subnet{}", n + 1)),
                SubnetSpec {
                    name: options.id(&format!("{label}-{zone}")),
                    network: vpc.reference(),
                    cidr,
                    availability_zone: zone.clone(),
                    class,
                },
            )?);
        }
        Ok(handles)
    };
    let public_subnets = subnets(graph, SubnetClass::Public)?;
    let isolated_subnets = subnets(graph, SubnetClass::Isolated)?;

    Ok(Network {
        vpc,
        public_subnets,
        isolated_subnets,
    })
}

/// Declares private endpoints for the services isolated tasks reach.
///
/// # Errors
///
/// Returns an error if a declaration fails.
pub fn declare_endpoints(
    graph: &mut ResourceGraph,
    options: &StackOptions,
    network: &Network,
) -> Result<Vec<ResourceHandle>> {
    [
        ("EcrEndpoint", EndpointService::RegistryApi),
        ("EcrDkrEndpoint", EndpointService::RegistryLayers),
        ("CwLogsEndpoint", EndpointService::Logs),
        ("S3Endpoint", EndpointService::ObjectStorage),
    ]
    .into_iter()
    .map(|(suffix, service)| {
        graph.declare(
            options.id(suffix),
            EndpointSpec {
                network: network.vpc.reference(),
                service,
                region: options.region.clone(),
                subnets: network.isolated_refs(),
            },
        )
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use watanabe_common::types::ResourceKind;
    use watanabe_graph::Property;

    use super::*;

    fn cidr_of(graph: &ResourceGraph, id: &str) -> String {
        graph
            .get(id)
            .and_then(|d| d.properties().get("CidrBlock"))
            .and_then(Property::as_str)
            .map(ToString::to_string)
            .expect(id)
    }

    #[test]
    fn subnets_are_carved_public_first() {
        let mut graph = ResourceGraph::new();
        let network = declare_network(&mut graph, &StackOptions::default()).expect("network");
        assert_eq!(network.public_subnets.len(), 2);
        assert_eq!(network.isolated_subnets.len(), 2);
        assert_eq!(cidr_of(&graph, "WatanabePublicSubnet1"), "10.0.0.0/24");
        assert_eq!(cidr_of(&graph, "WatanabePublicSubnet2"), "10.0.1.0/24");
        assert_eq!(cidr_of(&graph, "WatanabeIsolatedSubnet1"), "10.0.2.0/24");
        assert_eq!(cidr_of(&graph, "WatanabeIsolatedSubnet2"), "10.0.3.0/24");
    }

    #[test]
    fn exactly_one_network_without_nat() {
        let mut graph = ResourceGraph::new();
        let _ = declare_network(&mut graph, &StackOptions::default()).expect("network");
        let networks: Vec<_> = graph.of_kind(ResourceKind::Network).collect();
        assert_eq!(networks.len(), 1);
        assert_eq!(networks[0].metadata().render()["NatGateways"], 0);
    }

    #[test]
    fn endpoints_serve_isolated_subnets_only() {
        let mut graph = ResourceGraph::new();
        let options = StackOptions::default();
        let network = declare_network(&mut graph, &options).expect("network");
        let endpoints = declare_endpoints(&mut graph, &options, &network).expect("endpoints");
        assert_eq!(endpoints.len(), 4);

        for endpoint in &endpoints {
            let deps: Vec<String> = graph
                .dependencies(endpoint.id().as_str())
                .iter()
                .map(|(d, _)| d.id().to_string())
                .collect();
            assert!(deps.contains(&"WatanabeIsolatedSubnet1".to_string()), "{deps:?}");
            assert!(!deps.iter().any(|d| d.contains("Public")), "{deps:?}");
        }
    }
}
