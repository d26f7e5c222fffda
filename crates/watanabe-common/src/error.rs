//! Unified error types for the Watanabe workspace.
//!
//! Every failure is fatal for the current build invocation. Variants are
//! grouped by [`ErrorKind`] so callers can tell configuration problems apart
//! from graph construction problems without matching each variant.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum InfraError {
    /// A required environment input for the selected mode is absent or empty.
    #[error("configuration error: mode \"{mode}\" requires input {input}")]
    MissingInput {
        /// Name of the matched mode.
        mode: &'static str,
        /// Name of the missing input.
        input: &'static str,
    },

    /// The selector matched no recognized mode.
    #[error("configuration error: no deployment mode matches selector {selector}")]
    UnknownMode {
        /// Description of the selector value(s) that were observed.
        selector: String,
    },

    /// A configuration value is invalid.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// A declaration referenced a logical id that has not been declared.
    #[error("graph construction error: reference to undeclared resource \"{id}\"")]
    UndeclaredReference {
        /// Logical id that could not be found.
        id: String,
    },

    /// Two declarations share one logical id.
    #[error("graph construction error: resource \"{id}\" declared twice")]
    DuplicateDeclaration {
        /// Duplicated logical id.
        id: String,
    },

    /// A reference asked for an attribute the target kind does not export.
    #[error("graph construction error: {kind} \"{id}\" does not export {attribute}")]
    UnsupportedAttribute {
        /// Logical id of the referenced resource.
        id: String,
        /// Kind of the referenced resource.
        kind: String,
        /// Requested attribute.
        attribute: String,
    },

    /// A reference points at a node that belongs to another graph.
    #[error("graph construction error: reference to \"{id}\" does not belong to this graph")]
    CrossGraphReference {
        /// Logical id carried by the foreign reference.
        id: String,
    },

    /// The resource graph contains a cycle.
    #[error("graph construction error: cyclic dependency detected in resource graph")]
    CyclicGraph,

    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

/// Coarse classification of an [`InfraError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Configuration could not be resolved.
    Configuration,
    /// The resource graph could not be constructed.
    GraphConstruction,
    /// Reading or writing files failed.
    Io,
    /// Encoding the synthesized output failed.
    Serialization,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "configuration"),
            Self::GraphConstruction => write!(f, "graph construction"),
            Self::Io => write!(f, "io"),
            Self::Serialization => write!(f, "serialization"),
        }
    }
}

impl InfraError {
    /// Returns the classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingInput { .. } | Self::UnknownMode { .. } | Self::Config { .. } => {
                ErrorKind::Configuration
            }
            Self::UndeclaredReference { .. }
            | Self::DuplicateDeclaration { .. }
            | Self::UnsupportedAttribute { .. }
            | Self::CrossGraphReference { .. }
            | Self::CyclicGraph => ErrorKind::GraphConstruction,
            Self::Io { .. } => ErrorKind::Io,
            Self::Serialization { .. } => ErrorKind::Serialization,
        }
    }

    /// Returns `true` when the error was raised while resolving configuration.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self.kind(), ErrorKind::Configuration)
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, InfraError>;
