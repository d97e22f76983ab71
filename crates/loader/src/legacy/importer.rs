//! Default importers for the legacy `catalog.xml` / `services.xml` layout.

use anyhow::Context;
use geocat_catalog::ConfigEvent;
use geocat_core::layout::{
    LEGACY_CATALOG_FILE, LEGACY_FEATURE_TYPES, LEGACY_FEATURE_TYPE_INFO, LEGACY_SERVICES_FILE,
};
use geocat_core::{
    CatalogInfo, EntityCodec, LayerInfo, NamespaceInfo, ResourceFilter, ResourceInfo,
    ResourceKind, ResourceTree, StoreInfo, StoreKind, StyleInfo, StyleRef, WorkspaceInfo,
};
use tracing::{debug, warn};

use super::document::{LegacyCatalogDocument, LegacyFeatureType, LegacyServicesDocument};
use super::{LegacyCatalogImporter, LegacyConfigImporter};

/// Imports `catalog.xml` plus every `featureTypes/*/info.xml`.
///
/// Entities are emitted in dependency order: styles, then each namespace as a
/// workspace/namespace pair (the default namespace first, so it becomes the
/// default workspace), then stores, then feature types with their layers.
#[derive(Debug, Clone, Default)]
pub struct DefaultLegacyCatalogImporter<C> {
    codec: C,
}

impl<C: EntityCodec> DefaultLegacyCatalogImporter<C> {
    pub fn new(codec: C) -> Self {
        Self { codec }
    }

    fn feature_type(
        &self,
        info: LegacyFeatureType,
        namespace: &str,
    ) -> (ResourceInfo, LayerInfo) {
        let mut resource =
            ResourceInfo::new(ResourceKind::FeatureType, namespace, &info.datastore, &info.name);
        resource.title = info.title;
        resource.srs = info.srs;
        resource.native_bbox = info.native_bbox;
        resource.lat_lon_bbox = info.lat_lon_bbox;
        resource.projection_policy = info.projection_policy;
        resource.enabled = info.enabled;

        let mut layer = LayerInfo::for_resource(&resource);
        layer.default_style = info.default_style.map(StyleRef::global);
        layer.styles = info.styles.into_iter().map(StyleRef::global).collect();
        layer.enabled = info.enabled;
        (resource, layer)
    }
}

impl<C: EntityCodec> LegacyCatalogImporter for DefaultLegacyCatalogImporter<C> {
    fn import(
        &self,
        tree: &ResourceTree,
        sink: &mut dyn FnMut(CatalogInfo) -> anyhow::Result<()>,
    ) -> anyhow::Result<()> {
        let doc: LegacyCatalogDocument = self
            .codec
            .depersist(&tree.get(LEGACY_CATALOG_FILE))
            .with_context(|| format!("reading {LEGACY_CATALOG_FILE}"))?;

        for style in &doc.styles {
            sink(StyleInfo::new(&style.id, &style.file).into())?;
        }

        for ns in doc.namespaces_default_first() {
            sink(WorkspaceInfo::new(&ns.prefix).into())?;
            sink(NamespaceInfo::new(&ns.prefix, &ns.uri).into())?;
        }

        for ds in &doc.datastores {
            let mut store = StoreInfo::new(StoreKind::Vector, &ds.namespace, &ds.id);
            store.enabled = ds.enabled;
            store.description = ds.description.clone();
            store.connection_parameters = ds.connection_parameters.clone();
            sink(store.into())?;
        }

        for format in &doc.formats {
            let mut store = StoreInfo::new(StoreKind::Coverage, &format.namespace, &format.id);
            store.enabled = format.enabled;
            store.description = format.description.clone();
            if let Some(url) = &format.url {
                store = store.with_parameter("url", url);
            }
            if let Some(format_type) = &format.format_type {
                store = store.with_parameter("type", format_type);
            }
            sink(store.into())?;
        }

        let namespaces = doc.datastore_namespaces();
        for dir in tree.get(LEGACY_FEATURE_TYPES).list(ResourceFilter::Directory) {
            let descriptor = dir.get(LEGACY_FEATURE_TYPE_INFO);
            if !descriptor.is_file() {
                debug!(path = %dir, "feature type directory without descriptor");
                continue;
            }
            let info: LegacyFeatureType = match self.codec.depersist(&descriptor) {
                Ok(info) => info,
                Err(e) => {
                    warn!(path = %descriptor, error = %e, "failed to read legacy feature type");
                    continue;
                }
            };
            let Some(namespace) = namespaces.get(&info.datastore) else {
                warn!(path = %descriptor, datastore = %info.datastore, "legacy feature type names an unknown data store");
                continue;
            };
            let (resource, layer) = self.feature_type(info, namespace);
            sink(resource.into())?;
            sink(layer.into())?;
        }
        Ok(())
    }
}

/// Imports `services.xml`.
#[derive(Debug, Clone, Default)]
pub struct DefaultLegacyConfigImporter<C> {
    codec: C,
}

impl<C: EntityCodec> DefaultLegacyConfigImporter<C> {
    pub fn new(codec: C) -> Self {
        Self { codec }
    }
}

impl<C: EntityCodec> LegacyConfigImporter for DefaultLegacyConfigImporter<C> {
    fn import(
        &self,
        tree: &ResourceTree,
        sink: &mut dyn FnMut(ConfigEvent) -> anyhow::Result<()>,
    ) -> anyhow::Result<()> {
        let doc: LegacyServicesDocument = self
            .codec
            .depersist(&tree.get(LEGACY_SERVICES_FILE))
            .with_context(|| format!("reading {LEGACY_SERVICES_FILE}"))?;

        if let Some(global) = doc.global {
            sink(ConfigEvent::GlobalChanged(global))?;
        }
        if let Some(logging) = doc.logging {
            sink(ConfigEvent::LoggingChanged(logging))?;
        }
        for mut service in doc.services {
            // The legacy layout has no workspace services.
            service.workspace = None;
            sink(ConfigEvent::ServiceAdded(service))?;
        }
        Ok(())
    }
}
