//! Typed specs for every supported resource kind.
//!
//! Each spec implements [`Declare`](crate::declaration::Declare) and renders
//! provider-style property names.

pub mod compute;
pub mod network;
pub mod routing;
pub mod security;
pub mod storage;

use crate::property::{Property, Reference};

pub(crate) fn reference_list(refs: Vec<Reference>) -> Property {
    Property::List(refs.into_iter().map(Property::Ref).collect())
}
