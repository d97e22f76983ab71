use geocat_core::layout::{GLOBAL_FILE, LOGGING_FILE};
use geocat_core::{EntityCodec, ResourceTree};
use tracing::debug;

use crate::geoserver::{ConfigEvent, ConfigListener};

use super::error::PersistError;
use super::{service_path, settings_path};

/// Configuration listener writing global, logging, settings and service
/// descriptors into the CURRENT layout.
pub struct ConfigPersister<C> {
    tree: ResourceTree,
    codec: C,
}

impl<C: EntityCodec> ConfigPersister<C> {
    pub fn new(tree: ResourceTree, codec: C) -> Self {
        Self { tree, codec }
    }

    fn persist<T: serde::Serialize>(&self, path: &str, value: &T) -> Result<(), PersistError> {
        self.codec
            .persist(value, &self.tree.get(path))
            .map_err(|source| PersistError::Descriptor {
                path: path.to_string(),
                source,
            })?;
        debug!(path, "persisted configuration descriptor");
        Ok(())
    }
}

impl<C: EntityCodec> ConfigListener for ConfigPersister<C> {
    fn name(&self) -> &str {
        "config-persister"
    }

    fn handle_event(&self, event: &ConfigEvent) -> anyhow::Result<()> {
        match event {
            ConfigEvent::GlobalChanged(global) => self.persist(GLOBAL_FILE, global)?,
            ConfigEvent::LoggingChanged(logging) => self.persist(LOGGING_FILE, logging)?,
            ConfigEvent::SettingsAdded(settings) => {
                // Workspace-less settings are rejected before the event fires.
                if let Some(ws) = &settings.workspace {
                    self.persist(&settings_path(ws), settings)?;
                }
            }
            ConfigEvent::ServiceAdded(service) => {
                let path = service_path(service.workspace.as_deref(), &service.service_type);
                self.persist(&path, service)?;
            }
        }
        Ok(())
    }
}
