//! Resource declarations and the trait typed specs implement.

use serde::{Deserialize, Serialize};
use watanabe_common::types::{LogicalId, ResourceKind};

use crate::property::{Properties, Reference};

/// What the provisioning collaborator does with a live resource when its
/// declaration disappears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalPolicy {
    /// Keep the live resource.
    Retain,
    /// Delete the live resource.
    Delete,
}

impl RemovalPolicy {
    /// Provider name of the policy.
    #[must_use]
    pub const fn provider_name(self) -> &'static str {
        match self {
            Self::Retain => "Retain",
            Self::Delete => "Delete",
        }
    }
}

/// A typed resource spec that can be declared in a graph.
pub trait Declare {
    /// Kind of the declared resource.
    const KIND: ResourceKind;

    /// Removal policy of the resource, if it overrides the provider default.
    fn removal_policy(&self) -> Option<RemovalPolicy> {
        None
    }

    /// Declarations that must exist first without being referenced by a property.
    fn ordering(&self) -> Vec<Reference> {
        Vec::new()
    }

    /// Provider-independent annotations rendered next to the properties.
    ///
    /// References held here create dependency edges like property references.
    fn metadata(&self) -> Properties {
        Properties::new()
    }

    /// Converts the declaration into its property map.
    fn into_properties(self) -> Properties;
}

/// One declared resource. Immutable once added to a graph.
#[derive(Debug, Clone)]
pub struct ResourceDeclaration {
    pub(crate) sequence: usize,
    pub(crate) id: LogicalId,
    pub(crate) kind: ResourceKind,
    pub(crate) properties: Properties,
    pub(crate) metadata: Properties,
    pub(crate) ordering: Vec<Reference>,
    pub(crate) removal_policy: Option<RemovalPolicy>,
}

impl ResourceDeclaration {
    /// Position in construction order, starting at zero.
    #[must_use]
    pub const fn sequence(&self) -> usize {
        self.sequence
    }

    /// Logical id of the declaration.
    #[must_use]
    pub const fn id(&self) -> &LogicalId {
        &self.id
    }

    /// Resource kind.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Property map.
    #[must_use]
    pub const fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Metadata map.
    #[must_use]
    pub const fn metadata(&self) -> &Properties {
        &self.metadata
    }

    /// Explicit ordering dependencies.
    #[must_use]
    pub fn ordering(&self) -> &[Reference] {
        &self.ordering
    }

    /// Removal policy override.
    #[must_use]
    pub const fn removal_policy(&self) -> Option<RemovalPolicy> {
        self.removal_policy
    }

    /// Every reference held by the declaration, properties first, then
    /// metadata and ordering.
    #[must_use]
    pub fn references(&self) -> Vec<&Reference> {
        let mut refs = self.properties.references();
        refs.extend(self.metadata.references());
        refs.extend(self.ordering.iter());
        refs
    }
}
