//! # watanabe-config
//!
//! Resolves the typed [`ConfigurationRecord`](record::ConfigurationRecord)
//! a stack is built from.
//!
//! - **Source**: the injected [`ConfigSource`](source::ConfigSource) that
//!   environment inputs are read from.
//! - **Mode**: the table of recognized deployment modes and the inputs
//!   each one requires.
//! - **Record**: the immutable, fully populated result of resolution.
//! - **Resolver**: selection of a mode and all-or-nothing resolution.

pub mod mode;
pub mod record;
pub mod resolver;
pub mod source;

pub use mode::{Field, Mode, ModeSpec, MODES};
pub use record::ConfigurationRecord;
pub use resolver::{resolve, Resolver};
pub use source::{ConfigSource, EnvSource, MapSource};
