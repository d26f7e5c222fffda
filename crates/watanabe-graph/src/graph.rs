//! Resource graph management using `petgraph`.
//!
//! Declarations are added one at a time. Every reference a new declaration
//! holds must name a node that already exists in the same graph, so the
//! graph is acyclic by construction and insertion order is a valid
//! topological order.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use petgraph::Direction;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use watanabe_common::error::{InfraError, Result};
use watanabe_common::types::{Attribute, LogicalId, ResourceKind};

use crate::declaration::{Declare, ResourceDeclaration};
use crate::property::Reference;

static NEXT_GRAPH_TAG: AtomicU64 = AtomicU64::new(1);

/// Typed edge from a dependency to the declaration that consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dependency {
    /// The dependent reads `attribute` of the dependency in a property.
    Output(Attribute),
    /// The dependent must be created after the dependency.
    Ordering,
}

/// Handle to a declared resource, used to mint references to its outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceHandle {
    graph: u64,
    node: NodeIndex,
    id: LogicalId,
    kind: ResourceKind,
}

impl ResourceHandle {
    /// Logical id of the declaration.
    #[must_use]
    pub const fn id(&self) -> &LogicalId {
        &self.id
    }

    /// Kind of the declaration.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Reference to the primary identifier.
    #[must_use]
    pub fn reference(&self) -> Reference {
        self.attr(Attribute::Id)
    }

    /// Reference to one output attribute.
    ///
    /// Whether the kind exports `attribute` is checked when the reference
    /// is declared, not here.
    #[must_use]
    pub fn attr(&self, attribute: Attribute) -> Reference {
        Reference {
            graph: self.graph,
            node: self.node,
            id: self.id.clone(),
            attribute,
        }
    }
}

/// A directed acyclic graph of resource declarations.
#[derive(Debug)]
pub struct ResourceGraph {
    tag: u64,
    graph: petgraph::Graph<ResourceDeclaration, Dependency>,
    by_id: HashMap<LogicalId, NodeIndex>,
}

impl ResourceGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tag: NEXT_GRAPH_TAG.fetch_add(1, Ordering::Relaxed),
            graph: petgraph::Graph::new(),
            by_id: HashMap::new(),
        }
    }

    /// Declares one resource.
    ///
    /// The declaration is added only if every check passes; on error the
    /// graph is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is already declared, if a reference targets
    /// a node that is not declared in this graph, or if a referenced kind
    /// does not export the requested attribute.
    pub fn declare<D: Declare>(
        &mut self,
        id: impl Into<LogicalId>,
        spec: D,
    ) -> Result<ResourceHandle> {
        let id = id.into();
        if self.by_id.contains_key(&id) {
            return Err(InfraError::DuplicateDeclaration {
                id: id.to_string(),
            });
        }

        let removal_policy = spec.removal_policy();
        let ordering = spec.ordering();
        let metadata = spec.metadata();
        let properties = spec.into_properties();

        let mut edges = Vec::new();
        for reference in properties.references().into_iter().chain(metadata.references()) {
            self.check_reference(reference)?;
            edges.push((reference.node, Dependency::Output(reference.attribute)));
        }
        for reference in &ordering {
            self.check_reference(reference)?;
            edges.push((reference.node, Dependency::Ordering));
        }

        let sequence = self.graph.node_count();
        let node = self.graph.add_node(ResourceDeclaration {
            sequence,
            id: id.clone(),
            kind: D::KIND,
            properties,
            metadata,
            ordering,
            removal_policy,
        });
        for (dependency, edge) in edges {
            let _ = self.graph.add_edge(dependency, node, edge);
        }
        let _ = self.by_id.insert(id.clone(), node);

        let kind = D::KIND;
        tracing::debug!(id = %id, %kind, sequence, "declared resource");
        Ok(ResourceHandle {
            graph: self.tag,
            node,
            id,
            kind,
        })
    }

    fn check_reference(&self, reference: &Reference) -> Result<()> {
        if reference.graph != self.tag {
            return Err(InfraError::CrossGraphReference {
                id: reference.id.to_string(),
            });
        }
        let target = self
            .graph
            .node_weight(reference.node)
            .filter(|decl| decl.id == reference.id)
            .ok_or_else(|| InfraError::UndeclaredReference {
                id: reference.id.to_string(),
            })?;
        if !target.kind.exports(reference.attribute) {
            return Err(InfraError::UnsupportedAttribute {
                id: target.id.to_string(),
                kind: target.kind.to_string(),
                attribute: reference.attribute.to_string(),
            });
        }
        Ok(())
    }

    /// Returns the handle of a declared resource.
    ///
    /// # Errors
    ///
    /// Returns [`InfraError::UndeclaredReference`] if `id` is not declared.
    pub fn lookup(&self, id: &str) -> Result<ResourceHandle> {
        let node = self
            .by_id
            .get(&LogicalId::new(id))
            .copied()
            .ok_or_else(|| InfraError::UndeclaredReference { id: id.to_string() })?;
        let decl = &self.graph[node];
        Ok(ResourceHandle {
            graph: self.tag,
            node,
            id: decl.id.clone(),
            kind: decl.kind,
        })
    }

    /// Returns a declaration by logical id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ResourceDeclaration> {
        self.by_id
            .get(&LogicalId::new(id))
            .map(|&node| &self.graph[node])
    }

    /// Declarations in construction order.
    pub fn declarations(&self) -> impl Iterator<Item = &ResourceDeclaration> {
        self.graph.node_weights()
    }

    /// Declarations of one kind, in construction order.
    pub fn of_kind(&self, kind: ResourceKind) -> impl Iterator<Item = &ResourceDeclaration> {
        self.declarations().filter(move |decl| decl.kind == kind)
    }

    /// Direct dependencies of `id` with the edge that links them.
    #[must_use]
    pub fn dependencies(&self, id: &str) -> Vec<(&ResourceDeclaration, Dependency)> {
        self.neighbors(id, Direction::Incoming)
    }

    /// Declarations that directly depend on `id`.
    #[must_use]
    pub fn dependents(&self, id: &str) -> Vec<(&ResourceDeclaration, Dependency)> {
        self.neighbors(id, Direction::Outgoing)
    }

    fn neighbors(&self, id: &str, direction: Direction) -> Vec<(&ResourceDeclaration, Dependency)> {
        let Some(&node) = self.by_id.get(&LogicalId::new(id)) else {
            return Vec::new();
        };
        let mut out: Vec<_> = self
            .graph
            .edges_directed(node, direction)
            .map(|edge| {
                let other = match direction {
                    Direction::Incoming => edge.source(),
                    Direction::Outgoing => edge.target(),
                };
                (&self.graph[other], *edge.weight())
            })
            .collect();
        out.sort_by_key(|(decl, _)| decl.sequence);
        out
    }

    /// Number of declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns `true` if nothing has been declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Returns a topological ordering of logical ids.
    ///
    /// Dependencies appear before the declarations that depend on them.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph contains cycles.
    pub fn resolve_order(&self) -> Result<Vec<LogicalId>> {
        match petgraph::algo::toposort(&self.graph, None) {
            Ok(indices) => Ok(indices
                .iter()
                .filter_map(|&idx| self.graph.node_weight(idx).map(|d| d.id.clone()))
                .collect()),
            Err(_cycle) => Err(InfraError::CyclicGraph),
        }
    }

    /// Checks that the graph is acyclic and that every edge points from an
    /// earlier declaration to a later one.
    ///
    /// # Errors
    ///
    /// Returns [`InfraError::CyclicGraph`] on a cycle, or
    /// [`InfraError::UndeclaredReference`] naming the target of a forward edge.
    pub fn validate(&self) -> Result<()> {
        if petgraph::algo::is_cyclic_directed(&self.graph) {
            return Err(InfraError::CyclicGraph);
        }
        for edge in self.graph.edge_references() {
            let dependency = &self.graph[edge.source()];
            let dependent = &self.graph[edge.target()];
            if dependency.sequence >= dependent.sequence {
                return Err(InfraError::UndeclaredReference {
                    id: dependency.id.to_string(),
                });
            }
        }
        Ok(())
    }

    #[cfg(test)]
    fn force_edge(&mut self, from: &str, to: &str) {
        let from = self.by_id[&LogicalId::new(from)];
        let to = self.by_id[&LogicalId::new(to)];
        let _ = self.graph.add_edge(from, to, Dependency::Ordering);
    }
}

impl Default for ResourceGraph {
    fn default() -> Self {
        Self::new()
    }
}
