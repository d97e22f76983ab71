//! Pluggable extension points: service loaders and post-load hooks.

use std::sync::Arc;

use geocat_catalog::{GeoServer, LiveCatalog, LiveGeoServer};
use geocat_core::layout::WORKSPACES;
use geocat_core::{EntityCodec, Resource, ServiceInfo};
use tracing::debug;

/// Loads the configuration of one service type from a directory.
///
/// Invoked once with the tree root (global service) and once per workspace
/// directory (workspace service). A service returned with no workspace from a
/// workspace directory is discarded.
pub trait ServiceLoader: Send + Sync {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Service type tag, e.g. `WMS`.
    fn service_type(&self) -> &str;

    fn load(&self, geoserver: &GeoServer, dir: &Resource) -> anyhow::Result<ServiceInfo>;
}

/// Reads `<type>.xml` from the directory through an entity codec.
///
/// When the descriptor is missing, a fresh enabled service with no workspace
/// is returned: the global pass registers it as the default, the workspace
/// pass drops it.
#[derive(Debug, Clone)]
pub struct DescriptorServiceLoader<C> {
    service_type: String,
    codec: C,
}

impl<C: EntityCodec> DescriptorServiceLoader<C> {
    pub fn new(service_type: impl Into<String>, codec: C) -> Self {
        Self {
            service_type: service_type.into(),
            codec,
        }
    }
}

impl<C: EntityCodec> ServiceLoader for DescriptorServiceLoader<C> {
    fn name(&self) -> &str {
        &self.service_type
    }

    fn service_type(&self) -> &str {
        &self.service_type
    }

    fn load(&self, _geoserver: &GeoServer, dir: &Resource) -> anyhow::Result<ServiceInfo> {
        let fresh = ServiceInfo::new(&self.service_type);
        let descriptor = dir.get(&fresh.descriptor());
        if !descriptor.is_file() {
            debug!(path = %descriptor, "no service descriptor, using defaults");
            return Ok(fresh);
        }
        let mut service: ServiceInfo = self.codec.depersist(&descriptor)?;
        if service.workspace.is_none() {
            let in_workspace = dir
                .parent()
                .is_some_and(|parent| parent.path() == WORKSPACES);
            if in_workspace {
                service.workspace = Some(dir.name().to_string());
            }
        }
        Ok(service)
    }
}

/// Hook run after the first load.
pub trait GeoServerInitializer: Send + Sync {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn initialize(&self, catalog: &LiveCatalog, geoserver: &LiveGeoServer) -> anyhow::Result<()>;
}

/// Initializer that also wants to run after every reload.
pub trait GeoServerReinitializer: GeoServerInitializer {
    fn reinitialize(&self, catalog: &LiveCatalog, geoserver: &LiveGeoServer) -> anyhow::Result<()> {
        self.initialize(catalog, geoserver)
    }
}

#[derive(Clone)]
pub(crate) enum Hook {
    Initializer(Arc<dyn GeoServerInitializer>),
    Reinitializer(Arc<dyn GeoServerReinitializer>),
}

/// Registry of everything plugged into a loader, in registration order.
#[derive(Clone, Default)]
pub struct Extensions {
    service_loaders: Vec<Arc<dyn ServiceLoader>>,
    hooks: Vec<Hook>,
}

impl std::fmt::Debug for Extensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extensions")
            .field(
                "service_loaders",
                &self.service_loaders.iter().map(|l| l.name()).collect::<Vec<_>>(),
            )
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_service_loader(mut self, loader: Arc<dyn ServiceLoader>) -> Self {
        self.service_loaders.push(loader);
        self
    }

    pub fn with_initializer(mut self, hook: Arc<dyn GeoServerInitializer>) -> Self {
        self.hooks.push(Hook::Initializer(hook));
        self
    }

    /// Register a hook that runs after the first load and again after every reload.
    pub fn with_reinitializer(mut self, hook: Arc<dyn GeoServerReinitializer>) -> Self {
        self.hooks.push(Hook::Reinitializer(hook));
        self
    }

    pub fn service_loaders(&self) -> &[Arc<dyn ServiceLoader>] {
        &self.service_loaders
    }

    pub(crate) fn hooks(&self) -> &[Hook] {
        &self.hooks
    }
}
