//! [`ConfigMaterializer`]: global, logging, workspace settings and services.

use std::sync::Arc;

use geocat_catalog::{Catalog, GeoServer};
use geocat_core::layout::{GLOBAL_FILE, LOGGING_FILE, SETTINGS_FILE, WORKSPACES};
use geocat_core::{
    EntityCodec, GeoServerInfo, LoggingInfo, Resource, ResourceFilter, ResourceTree, SettingsInfo,
};
use tracing::{debug, error, info, warn};

use crate::error::{LoadResult, Result};
use crate::extensions::ServiceLoader;

pub struct ConfigMaterializer<'a, C> {
    tree: &'a ResourceTree,
    codec: &'a C,
    service_loaders: &'a [Arc<dyn ServiceLoader>],
}

impl<'a, C: EntityCodec> ConfigMaterializer<'a, C> {
    pub fn new(
        tree: &'a ResourceTree,
        codec: &'a C,
        service_loaders: &'a [Arc<dyn ServiceLoader>],
    ) -> Self {
        Self {
            tree,
            codec,
            service_loaders,
        }
    }

    /// Build a fresh configuration. `catalog` is the already committed catalog;
    /// settings for workspaces it does not know are skipped.
    pub fn materialize(&self, catalog: &Catalog) -> Result<(GeoServer, Vec<LoadResult>)> {
        let mut geoserver = GeoServer::new();
        let mut results = Vec::new();

        let global = self.tree.get(GLOBAL_FILE);
        if global.is_file() {
            match self.codec.depersist::<GeoServerInfo>(&global) {
                Ok(info) => {
                    geoserver.set_global(info)?;
                    results.push(LoadResult::loaded(global.path(), "global settings"));
                }
                Err(e) => {
                    warn!(path = %global, error = %e, "failed to load global settings, using defaults");
                    results.push(LoadResult::failed(global.path(), &e));
                }
            }
        } else {
            info!(path = %global, "no global settings, using defaults");
            results.push(LoadResult::skipped(global.path(), "absent"));
        }

        let logging = self.tree.get(LOGGING_FILE);
        if logging.is_file() {
            match self.codec.depersist::<LoggingInfo>(&logging) {
                Ok(info) => {
                    geoserver.set_logging(info)?;
                    results.push(LoadResult::loaded(logging.path(), "logging settings"));
                }
                Err(e) => {
                    warn!(path = %logging, error = %e, "failed to load logging settings, using defaults");
                    results.push(LoadResult::failed(logging.path(), &e));
                }
            }
        } else {
            info!(path = %logging, "no logging settings, using defaults");
            results.push(LoadResult::skipped(logging.path(), "absent"));
        }

        let workspace_dirs = self.tree.get(WORKSPACES).list(ResourceFilter::Directory);
        for dir in &workspace_dirs {
            self.load_settings(&mut geoserver, catalog, dir, &mut results);
        }

        self.load_services(&mut geoserver, &self.tree.base(), false, &mut results);
        for dir in &workspace_dirs {
            if catalog.workspace(dir.name()).is_none() {
                debug!(dir = %dir, "no workspace loaded for directory, skipping its services");
                continue;
            }
            self.load_services(&mut geoserver, dir, true, &mut results);
        }

        info!(summary = ?geoserver.summary(), "configuration materialized");
        Ok((geoserver, results))
    }

    fn load_settings(
        &self,
        geoserver: &mut GeoServer,
        catalog: &Catalog,
        dir: &Resource,
        results: &mut Vec<LoadResult>,
    ) {
        let descriptor = dir.get(SETTINGS_FILE);
        if !descriptor.is_file() {
            return;
        }
        let workspace = dir.name();
        if catalog.workspace(workspace).is_none() {
            warn!(workspace, path = %descriptor, "settings for unknown workspace, skipping");
            results.push(LoadResult::skipped(descriptor.path(), "unknown workspace"));
            return;
        }
        let outcome = self
            .codec
            .depersist::<SettingsInfo>(&descriptor)
            .map_err(|e| e.to_string())
            .and_then(|mut settings| {
                settings.workspace = Some(workspace.to_string());
                geoserver.add_settings(settings).map_err(|e| e.to_string())
            });
        match outcome {
            Ok(()) => {
                debug!(workspace, "loaded workspace settings");
                results.push(LoadResult::loaded(
                    descriptor.path(),
                    format!("settings '{workspace}'"),
                ));
            }
            Err(e) => {
                warn!(path = %descriptor, error = %e, "failed to load workspace settings");
                results.push(LoadResult::failed(descriptor.path(), e));
            }
        }
    }

    fn load_services(
        &self,
        geoserver: &mut GeoServer,
        dir: &Resource,
        workspace_pass: bool,
        results: &mut Vec<LoadResult>,
    ) {
        for loader in self.service_loaders {
            let service = match loader.load(geoserver, dir) {
                Ok(service) => service,
                Err(e) => {
                    let cause = format!("{e:#}");
                    error!(loader = loader.name(), dir = %dir, error = %cause, "failed to load service");
                    results.push(LoadResult::failed(dir.to_string(), format!("{}: {cause}", loader.name())));
                    continue;
                }
            };
            if workspace_pass && service.workspace.is_none() {
                continue;
            }
            let label = match &service.workspace {
                Some(ws) => format!("service '{}' ({ws})", service.service_type),
                None => format!("service '{}'", service.service_type),
            };
            match geoserver.add_service(service) {
                Ok(()) => {
                    debug!(loader = loader.name(), dir = %dir, "loaded service");
                    results.push(LoadResult::loaded(dir.to_string(), label));
                }
                Err(e) => {
                    error!(loader = loader.name(), dir = %dir, error = %e, "failed to register service");
                    results.push(LoadResult::failed(dir.to_string(), &e));
                }
            }
        }
    }
}
