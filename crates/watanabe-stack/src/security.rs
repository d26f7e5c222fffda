//! The security boundary chain: load balancer, compute, database.
//!
//! Each boundary admits traffic only from the tier directly in front of it.
//! Only the load balancer boundary is open to an unrestricted range.

use watanabe_common::constants::{APPLICATION_PORT, DATABASE_PORT, HTTPS_PORT};
use watanabe_common::error::Result;
use watanabe_graph::resources::security::SecurityBoundarySpec;
use watanabe_graph::{ResourceGraph, ResourceHandle};

use crate::network::Network;
use crate::options::StackOptions;

/// Handles of the declared boundaries.
#[derive(Debug, Clone)]
pub struct Boundaries {
    /// Boundary A, attached to the load balancer.
    pub load_balancer: ResourceHandle,
    /// Boundary B, attached to the compute service.
    pub compute: ResourceHandle,
    /// Boundary C, attached to the database when one is declared.
    pub database: Option<ResourceHandle>,
}

/// Declares the boundary chain.
///
/// # Errors
///
/// Returns an error if a declaration fails.
pub fn declare_boundaries(
    graph: &mut ResourceGraph,
    options: &StackOptions,
    network: &Network,
    with_database: bool,
) -> Result<Boundaries> {
    let load_balancer = graph.declare(
        options.id("AlbSg"),
        SecurityBoundarySpec::new(options.id("AlbSg"), network.vpc.reference())
            .allow_any_ipv4(HTTPS_PORT),
    )?;
    let compute = graph.declare(
        options.id("FargateSg"),
        SecurityBoundarySpec::new(options.id("FargateSg"), network.vpc.reference())
            .allow_from(&load_balancer, APPLICATION_PORT),
    )?;
    let database = if with_database {
        Some(graph.declare(
            options.id("DbSg"),
            SecurityBoundarySpec::new(options.id("DbSg"), network.vpc.reference())
                .allow_from(&compute, DATABASE_PORT),
        )?)
    } else {
        None
    };

    Ok(Boundaries {
        load_balancer,
        compute,
        database,
    })
}

#[cfg(test)]
mod tests {
    use watanabe_graph::resources::security::{Peer, ingress_sources};

    use super::*;
    use crate::network::declare_network;

    fn sources(graph: &ResourceGraph, id: &str) -> Vec<Option<Peer>> {
        ingress_sources(graph.get(id).expect(id).properties())
    }

    #[test]
    fn chain_admits_only_upstream_tier() {
        let mut graph = ResourceGraph::new();
        let options = StackOptions::default();
        let network = declare_network(&mut graph, &options).expect("network");
        let boundaries = declare_boundaries(&mut graph, &options, &network, true).expect("sg");

        assert_eq!(sources(&graph, "WatanabeAlbSg"), vec![Some(Peer::AnyIpv4)]);

        let compute = sources(&graph, "WatanabeFargateSg");
        assert_eq!(compute.len(), 1);
        assert!(matches!(
            &compute[0],
            Some(Peer::Boundary(r)) if r.id() == boundaries.load_balancer.id()
        ));

        let database = sources(&graph, "WatanabeDbSg");
        assert_eq!(database.len(), 1);
        assert!(matches!(
            &database[0],
            Some(Peer::Boundary(r)) if r.id() == boundaries.compute.id()
        ));
    }

    #[test]
    fn database_boundary_is_optional() {
        let mut graph = ResourceGraph::new();
        let options = StackOptions::default();
        let network = declare_network(&mut graph, &options).expect("network");
        let boundaries = declare_boundaries(&mut graph, &options, &network, false).expect("sg");
        assert!(boundaries.database.is_none());
        assert!(graph.get("WatanabeDbSg").is_none());
    }
}
