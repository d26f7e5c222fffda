//! # watanabe-common
//!
//! Shared error definitions, domain primitives, and constants used across
//! the Watanabe infrastructure workspace.
//!
//! This crate is the leaf of the dependency graph. It depends on no other
//! internal crate.

pub mod constants;
pub mod error;
pub mod types;
