//! Image registries for the two deployable containers.

use watanabe_common::constants::{APP_REPOSITORY, WEB_REPOSITORY};
use watanabe_common::error::Result;
use watanabe_graph::resources::storage::{ImageSource, RegistrySpec};
use watanabe_graph::{RemovalPolicy, ResourceGraph, ResourceHandle};

use crate::options::StackOptions;

/// Handles of the declared registries.
#[derive(Debug, Clone)]
pub struct Registries {
    /// Registry of the application runtime image.
    pub app: ResourceHandle,
    /// Registry of the web proxy image.
    pub web: ResourceHandle,
}

impl Registries {
    /// Image source of the application container.
    #[must_use]
    pub fn app_image(&self) -> ImageSource {
        ImageSource::from_registry(&self.app)
    }

    /// Image source of the web container.
    #[must_use]
    pub fn web_image(&self) -> ImageSource {
        ImageSource::from_registry(&self.web)
    }
}

/// Declares both registries.
///
/// # Errors
///
/// Returns an error if a declaration fails.
pub fn declare_registries(
    graph: &mut ResourceGraph,
    options: &StackOptions,
    removal: Option<RemovalPolicy>,
) -> Result<Registries> {
    let app = graph.declare(
        options.id("AppRepository"),
        RegistrySpec {
            name: APP_REPOSITORY.to_string(),
            removal,
        },
    )?;
    let web = graph.declare(
        options.id("WebRepository"),
        RegistrySpec {
            name: WEB_REPOSITORY.to_string(),
            removal,
        },
    )?;
    Ok(Registries { app, web })
}
