//! Migration of the legacy flat layout into the CURRENT per-entity layout.
//!
//! Importers populate a fresh catalog or configuration through a sink closure.
//! Unless legacy mode is on, the sink also writes each entity out in the
//! CURRENT layout as it arrives; afterwards auxiliary files are relocated and
//! the legacy marker is renamed to `.old` so the next detection sees CURRENT.

mod document;
mod importer;
mod relocate;


use geocat_catalog::{
    Catalog, CatalogEvent, CatalogListener, ConfigEvent, ConfigListener, CatalogPersister,
    ConfigPersister, GeoServer,
};
use geocat_core::layout::{migrated_name, LEGACY_CATALOG_FILE, LEGACY_SERVICES_FILE};
use geocat_core::{CatalogInfo, EntityCodec, ResourceTree};
use tracing::{info, warn};

pub use document::{
    LegacyCatalogDocument, LegacyDataStore, LegacyFeatureType, LegacyFormat, LegacyNamespace,
    LegacyServicesDocument, LegacyStyle,
};
pub use importer::{DefaultLegacyCatalogImporter, DefaultLegacyConfigImporter};

use crate::error::{LoadResult, LoaderError, Result};
use crate::materialize::MaterializedCatalog;

/// Reads the legacy catalog layout and hands every entity to `sink`, in
/// dependency order. An error from the sink must be propagated.
pub trait LegacyCatalogImporter: Send + Sync {
    fn import(
        &self,
        tree: &ResourceTree,
        sink: &mut dyn FnMut(CatalogInfo) -> anyhow::Result<()>,
    ) -> anyhow::Result<()>;
}

/// Reads the legacy configuration layout and hands every change to `sink`.
pub trait LegacyConfigImporter: Send + Sync {
    fn import(
        &self,
        tree: &ResourceTree,
        sink: &mut dyn FnMut(ConfigEvent) -> anyhow::Result<()>,
    ) -> anyhow::Result<()>;
}

/// One migration run over a tree.
pub struct LegacyMigration<'a, C> {
    tree: &'a ResourceTree,
    codec: &'a C,
    /// Populate memory only; never touch the disk.
    legacy: bool,
}

impl<'a, C: EntityCodec + Clone> LegacyMigration<'a, C> {
    pub fn new(tree: &'a ResourceTree, codec: &'a C, legacy: bool) -> Self {
        Self {
            tree,
            codec,
            legacy,
        }
    }

    /// Build a catalog from `catalog.xml`, writing the CURRENT layout as a side effect.
    pub fn migrate_catalog(
        &self,
        importer: &dyn LegacyCatalogImporter,
    ) -> Result<MaterializedCatalog> {
        info!(marker = LEGACY_CATALOG_FILE, legacy = self.legacy, "migrating legacy catalog");
        let mut catalog = Catalog::new();
        let mut results = Vec::new();
        let persister =
            (!self.legacy).then(|| CatalogPersister::new(self.tree.clone(), self.codec.clone()));

        let mut sink = |info: CatalogInfo| -> anyhow::Result<()> {
            let label = info.to_string();
            let previous = catalog.default_workspace().cloned();
            if let Err(e) = catalog.add(info.clone()) {
                warn!(entity = %label, error = %e, "failed to import legacy entity");
                results.push(LoadResult::failed(LEGACY_CATALOG_FILE, format!("{label}: {e}")));
                return Ok(());
            }
            results.push(LoadResult::loaded(LEGACY_CATALOG_FILE, label));

            let Some(persister) = &persister else {
                return Ok(());
            };
            persister.handle_event(&catalog, &CatalogEvent::Added(info))?;
            let current = catalog.default_workspace().cloned();
            if current != previous {
                persister.handle_event(
                    &catalog,
                    &CatalogEvent::DefaultWorkspaceChanged { previous, current },
                )?;
            }
            Ok(())
        };
        importer
            .import(self.tree, &mut sink)
            .map_err(|source| LoaderError::LegacyImport {
                marker: LEGACY_CATALOG_FILE,
                source,
            })?;

        if !self.legacy {
            results.extend(relocate::relocate_auxiliary_files(self.tree, self.codec)?);
            self.retire(LEGACY_CATALOG_FILE)?;
        }
        info!(summary = ?catalog.summary(), "legacy catalog migrated");

        Ok(MaterializedCatalog {
            catalog,
            results,
            disabled_stores: Vec::new(),
        })
    }

    /// Build a configuration from `services.xml`, writing the CURRENT layout as a side effect.
    pub fn migrate_config(
        &self,
        importer: &dyn LegacyConfigImporter,
    ) -> Result<(GeoServer, Vec<LoadResult>)> {
        info!(marker = LEGACY_SERVICES_FILE, legacy = self.legacy, "migrating legacy configuration");
        let mut geoserver = GeoServer::new();
        let mut results = Vec::new();
        let persister =
            (!self.legacy).then(|| ConfigPersister::new(self.tree.clone(), self.codec.clone()));

        let mut sink = |event: ConfigEvent| -> anyhow::Result<()> {
            let applied = match event.clone() {
                ConfigEvent::GlobalChanged(global) => {
                    geoserver.set_global(global).map(|()| "global settings".to_string())
                }
                ConfigEvent::LoggingChanged(logging) => {
                    geoserver.set_logging(logging).map(|()| "logging settings".to_string())
                }
                ConfigEvent::SettingsAdded(settings) => {
                    let label = format!("settings '{}'", settings.workspace.as_deref().unwrap_or(""));
                    geoserver.add_settings(settings).map(|()| label)
                }
                ConfigEvent::ServiceAdded(service) => {
                    let label = format!("service '{}'", service.service_type);
                    geoserver.add_service(service).map(|()| label)
                }
            };
            match applied {
                Ok(label) => results.push(LoadResult::loaded(LEGACY_SERVICES_FILE, label)),
                Err(e) => {
                    warn!(error = %e, "failed to import legacy configuration entry");
                    results.push(LoadResult::failed(LEGACY_SERVICES_FILE, &e));
                    return Ok(());
                }
            }
            if let Some(persister) = &persister {
                persister.handle_event(&event)?;
            }
            Ok(())
        };
        importer
            .import(self.tree, &mut sink)
            .map_err(|source| LoaderError::LegacyImport {
                marker: LEGACY_SERVICES_FILE,
                source,
            })?;

        if !self.legacy {
            self.retire(LEGACY_SERVICES_FILE)?;
        }
        info!(summary = ?geoserver.summary(), "legacy configuration migrated");
        Ok((geoserver, results))
    }

    /// Rename a legacy marker to `<marker>.old`.
    fn retire(&self, marker: &str) -> Result<()> {
        let source = self.tree.get(marker);
        let target = self.tree.get(&migrated_name(marker));
        source.rename_to(&target)?;
        info!(from = %source, to = %target, "renamed legacy marker");
        Ok(())
    }
}
