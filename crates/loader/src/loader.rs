//! [`GeoServerLoader`]: the load / reload pipeline.

use std::sync::Arc;

use chrono::Utc;
use geocat_catalog::{FileSystemProbe, LiveCatalog, LiveGeoServer, StoreProbe};
use geocat_core::{EntityCodec, LoaderConfig, ResourceTree, YamlCodec};
use tracing::{error, info};

use crate::detect::{detect, Format};
use crate::error::{LoadReport, Result};
use crate::extensions::Extensions;
use crate::initializer::{run_hooks, Phase};
use crate::legacy::{
    DefaultLegacyCatalogImporter, DefaultLegacyConfigImporter, LegacyCatalogImporter,
    LegacyConfigImporter, LegacyMigration,
};
use crate::materialize::{CatalogMaterializer, ConfigMaterializer};
use crate::styles::StyleBootstrapper;
use crate::sync::{commit_config, synchronize};

/// Behaviour switches for one loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderOptions {
    /// Migrate legacy layouts in memory only, leaving the disk untouched.
    pub legacy: bool,
    /// Probe enabled stores and disable those that cannot connect.
    pub probe_stores: bool,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            legacy: false,
            probe_stores: true,
        }
    }
}

impl From<&LoaderConfig> for LoaderOptions {
    fn from(config: &LoaderConfig) -> Self {
        Self {
            legacy: config.legacy,
            probe_stores: config.probe_stores,
        }
    }
}

/// Materializes a data directory into a live catalog and configuration.
///
/// Every run builds fresh instances off to the side and only then swaps them
/// into the live ones, so readers never observe a half-loaded catalog. Calls
/// to [`load`](Self::load) and [`reload`](Self::reload) must not overlap.
pub struct GeoServerLoader<C = YamlCodec> {
    tree: ResourceTree,
    codec: C,
    options: LoaderOptions,
    extensions: Extensions,
    probe: Arc<dyn StoreProbe>,
    catalog_importer: Arc<dyn LegacyCatalogImporter>,
    config_importer: Arc<dyn LegacyConfigImporter>,
}

impl GeoServerLoader<YamlCodec> {
    /// Loader over `tree` with default options and the YAML codec.
    pub fn new(tree: ResourceTree) -> Self {
        Self::with_codec(tree, YamlCodec)
    }

    /// Loader over `config.data_dir` honouring its legacy and probe switches.
    pub fn from_config(config: &LoaderConfig) -> Self {
        Self::new(ResourceTree::new(&config.data_dir)).with_options(LoaderOptions::from(config))
    }
}

impl<C: EntityCodec + Clone + 'static> GeoServerLoader<C> {
    pub fn with_codec(tree: ResourceTree, codec: C) -> Self {
        Self {
            probe: Arc::new(FileSystemProbe::new(&tree)),
            catalog_importer: Arc::new(DefaultLegacyCatalogImporter::new(codec.clone())),
            config_importer: Arc::new(DefaultLegacyConfigImporter::new(codec.clone())),
            tree,
            codec,
            options: LoaderOptions::default(),
            extensions: Extensions::default(),
        }
    }

    pub fn with_options(mut self, options: LoaderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn with_probe(mut self, probe: Arc<dyn StoreProbe>) -> Self {
        self.probe = probe;
        self
    }

    pub fn with_catalog_importer(mut self, importer: Arc<dyn LegacyCatalogImporter>) -> Self {
        self.catalog_importer = importer;
        self
    }

    pub fn with_config_importer(mut self, importer: Arc<dyn LegacyConfigImporter>) -> Self {
        self.config_importer = importer;
        self
    }

    pub fn tree(&self) -> &ResourceTree {
        &self.tree
    }

    pub fn options(&self) -> LoaderOptions {
        self.options
    }

    /// First load: populate the live instances, then run every initializer.
    pub fn load(&self, catalog: &LiveCatalog, geoserver: &LiveGeoServer) -> Result<LoadReport> {
        self.run(catalog, geoserver, Phase::Load).inspect_err(|e| {
            error!(root = %self.tree.root().display(), error = %e, "load failed");
        })
    }

    /// Reload: rebuild everything, reset the live configuration while
    /// committing the new one, then run reinitializers.
    ///
    /// A reload that fails before the commit leaves the live configuration untouched.
    pub fn reload(&self, catalog: &LiveCatalog, geoserver: &LiveGeoServer) -> Result<LoadReport> {
        self.run(catalog, geoserver, Phase::Reload).inspect_err(|e| {
            error!(root = %self.tree.root().display(), error = %e, "reload failed");
        })
    }

    fn run(
        &self,
        catalog: &LiveCatalog,
        geoserver: &LiveGeoServer,
        phase: Phase,
    ) -> Result<LoadReport> {
        let formats = detect(&self.tree);
        info!(
            root = %self.tree.root().display(),
            ?phase,
            catalog_format = %formats.catalog,
            config_format = %formats.config,
            legacy = self.options.legacy,
            "loading data directory"
        );
        let migration = LegacyMigration::new(&self.tree, &self.codec, self.options.legacy);

        let mut materialized = match formats.catalog {
            Format::Legacy => migration.migrate_catalog(self.catalog_importer.as_ref())?,
            Format::Current => {
                let materializer = CatalogMaterializer::new(&self.tree, &self.codec);
                if self.options.probe_stores {
                    materializer.with_probe(self.probe.as_ref()).materialize()?
                } else {
                    materializer.materialize()?
                }
            }
        };
        // Built-in styles go into the fresh catalog first so that layers
        // referencing them keep those references through resolution.
        let bootstrap =
            StyleBootstrapper::new(&self.tree, &self.codec).bootstrap(&mut materialized.catalog);
        let resolve = materialized.catalog.resolve()?;
        let mut results = materialized.results;
        results.extend(bootstrap.results);

        let summary = {
            let mut live = catalog.write();
            synchronize(&mut live, materialized.catalog);
            live.summary()
        };

        let (fresh, config_results) = match formats.config {
            Format::Legacy => migration.migrate_config(self.config_importer.as_ref())?,
            Format::Current => {
                let snapshot = catalog.read();
                let built = ConfigMaterializer::new(
                    &self.tree,
                    &self.codec,
                    self.extensions.service_loaders(),
                )
                .materialize(&snapshot)?;
                built
            }
        };
        results.extend(config_results);

        let config = {
            let mut live = geoserver.write();
            if phase == Phase::Reload {
                live.dispose();
            }
            commit_config(&mut live, fresh);
            live.summary()
        };

        let hooks = run_hooks(self.extensions.hooks(), phase, catalog, geoserver);

        let report = LoadReport {
            catalog_format: formats.catalog,
            config_format: formats.config,
            catalog: summary,
            config,
            resolve,
            disabled_stores: materialized.disabled_stores,
            styles_created: bootstrap.created,
            hooks,
            results,
            completed_at: Utc::now(),
        };
        info!(
            ?phase,
            failures = report.failures().count(),
            hook_failures = report.hook_failures().count(),
            disabled_stores = report.disabled_stores.len(),
            "data directory loaded"
        );
        Ok(report)
    }
}

impl<C> std::fmt::Debug for GeoServerLoader<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeoServerLoader")
            .field("root", &self.tree.root())
            .field("options", &self.options)
            .field("extensions", &self.extensions)
            .finish()
    }
}
