//! Property trees of resource declarations.
//!
//! A property is either a literal JSON value, a typed [`Reference`] to an
//! output of an earlier declaration, or a list/map nesting of those.

use std::collections::BTreeMap;

use petgraph::graph::NodeIndex;
use serde_json::{Value, json};
use watanabe_common::types::{Attribute, LogicalId};

/// A typed reference to one output of a declared resource.
///
/// References are minted by [`ResourceHandle`](crate::graph::ResourceHandle)
/// and carry the tag of the graph that declared their target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    pub(crate) graph: u64,
    pub(crate) node: NodeIndex,
    pub(crate) id: LogicalId,
    pub(crate) attribute: Attribute,
}

impl Reference {
    /// Logical id of the referenced declaration.
    #[must_use]
    pub const fn id(&self) -> &LogicalId {
        &self.id
    }

    /// Referenced output attribute.
    #[must_use]
    pub const fn attribute(&self) -> Attribute {
        self.attribute
    }

    /// Renders the reference as a provider intrinsic.
    #[must_use]
    pub fn render(&self) -> Value {
        match self.attribute {
            Attribute::Id => json!({ "Ref": self.id.as_str() }),
            other => json!({ "Fn::GetAtt": [self.id.as_str(), other.provider_name()] }),
        }
    }
}

/// One node of a property tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    /// A literal value.
    Literal(Value),
    /// An output of another declaration.
    Ref(Reference),
    /// An ordered list of properties.
    List(Vec<Property>),
    /// A nested map of properties.
    Map(BTreeMap<String, Property>),
}

impl Property {
    /// Builds a list property.
    #[must_use]
    pub fn list(items: impl IntoIterator<Item = impl Into<Self>>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Builds a `Fn::Join` of the given parts with `separator`.
    #[must_use]
    pub fn join(separator: &str, parts: impl IntoIterator<Item = impl Into<Self>>) -> Self {
        let mut map = BTreeMap::new();
        let _ = map.insert(
            "Fn::Join".to_string(),
            Self::List(vec![Self::from(separator), Self::list(parts)]),
        );
        Self::Map(map)
    }

    /// Returns the literal string value, if this is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Literal(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Returns the reference, if this is one.
    #[must_use]
    pub const fn as_reference(&self) -> Option<&Reference> {
        match self {
            Self::Ref(reference) => Some(reference),
            _ => None,
        }
    }

    /// Returns the list items, if this is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Looks up a key, if this is a map.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        match self {
            Self::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// Collects every reference in this tree, depth first.
    pub fn collect_references<'a>(&'a self, out: &mut Vec<&'a Reference>) {
        match self {
            Self::Literal(_) => {}
            Self::Ref(reference) => out.push(reference),
            Self::List(items) => items.iter().for_each(|p| p.collect_references(out)),
            Self::Map(map) => map.values().for_each(|p| p.collect_references(out)),
        }
    }

    /// Renders the tree as JSON, turning references into intrinsics.
    #[must_use]
    pub fn render(&self) -> Value {
        match self {
            Self::Literal(value) => value.clone(),
            Self::Ref(reference) => reference.render(),
            Self::List(items) => Value::Array(items.iter().map(Self::render).collect()),
            Self::Map(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.render()))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Property {
    fn from(value: &str) -> Self {
        Self::Literal(Value::String(value.to_string()))
    }
}

impl From<String> for Property {
    fn from(value: String) -> Self {
        Self::Literal(Value::String(value))
    }
}

impl From<bool> for Property {
    fn from(value: bool) -> Self {
        Self::Literal(Value::Bool(value))
    }
}

impl From<u16> for Property {
    fn from(value: u16) -> Self {
        Self::Literal(Value::from(value))
    }
}

impl From<u32> for Property {
    fn from(value: u32) -> Self {
        Self::Literal(Value::from(value))
    }
}

impl From<Reference> for Property {
    fn from(value: Reference) -> Self {
        Self::Ref(value)
    }
}

impl From<Properties> for Property {
    fn from(value: Properties) -> Self {
        Self::Map(value.0)
    }
}

impl From<Vec<Self>> for Property {
    fn from(value: Vec<Self>) -> Self {
        Self::List(value)
    }
}

/// The top-level property map of one declaration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties(BTreeMap<String, Property>);

impl Properties {
    /// Creates an empty property map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets one property.
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Property>) -> Self {
        let _ = self.0.insert(key.into(), value.into());
        self
    }

    /// Sets one property when `value` is present.
    #[must_use]
    pub fn set_opt(self, key: impl Into<String>, value: Option<impl Into<Property>>) -> Self {
        match value {
            Some(value) => self.set(key, value),
            None => self,
        }
    }

    /// Returns one property.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Property> {
        self.0.get(key)
    }

    /// Returns `true` if no property is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over properties in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Property)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Collects every reference in the map.
    #[must_use]
    pub fn references(&self) -> Vec<&Reference> {
        let mut out = Vec::new();
        self.0.values().for_each(|p| p.collect_references(&mut out));
        out
    }

    /// Renders the map as a JSON object.
    #[must_use]
    pub fn render(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), v.render()))
                .collect(),
        )
    }
}
