//! # watanabe-graph
//!
//! Explicit dependency graph of resource declarations.
//!
//! Handles:
//! - **Property**: literal values and typed references to earlier declarations.
//! - **Graph**: declaration bookkeeping on `petgraph`, with forward references
//!   rejected at declaration time, and topological resolution.
//! - **Resources**: typed specs for every supported resource kind.
//! - **Template**: synthesis of a validated graph into a declarative document.

pub mod declaration;
pub mod graph;
pub mod property;
pub mod resources;
pub mod template;

pub use declaration::{Declare, RemovalPolicy, ResourceDeclaration};
pub use graph::{Dependency, ResourceGraph, ResourceHandle};
pub use property::{Properties, Property, Reference};
pub use template::Template;
