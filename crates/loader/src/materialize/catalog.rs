//! [`CatalogMaterializer`]: builds a fresh catalog from a CURRENT-layout tree.

use geocat_catalog::store::default_marker_path;
use geocat_catalog::{Catalog, StoreProbe};
use geocat_core::layout::{
    descriptor_name, is_config_directory, DEFAULT_WORKSPACE_FILE, LAYERGROUPS, LAYER_FILE,
    NAMESPACE_FILE, STYLES, WORKSPACES, WORKSPACE_FILE,
};
use geocat_core::{
    EntityCodec, LayerGroupInfo, LayerInfo, NamespaceInfo, Resource, ResourceFilter, ResourceInfo,
    ResourceTree, StoreInfo, StoreKind, StyleInfo, WorkspaceInfo,
};
use tracing::{debug, info, warn};

use crate::error::{LoadResult, Result};

/// A freshly built catalog, not yet visible to anyone, plus what happened while building it.
///
/// Name references are not resolved yet: built-in styles may still have to
/// be seeded before dangling references are dropped.
#[derive(Debug)]
pub struct MaterializedCatalog {
    pub catalog: Catalog,
    pub results: Vec<LoadResult>,
    pub disabled_stores: Vec<String>,
}

/// What the default workspace marker scan found.
#[derive(Debug, Clone, PartialEq, Eq)]
enum DefaultMarker {
    Absent,
    Named(String),
}

/// Walks `workspaces/`, `styles/` and `layergroups/` and materializes every
/// descriptor it can read. A descriptor that fails is logged, recorded and
/// skipped together with everything that depends on it.
pub struct CatalogMaterializer<'a, C> {
    tree: &'a ResourceTree,
    codec: &'a C,
    probe: Option<&'a dyn StoreProbe>,
    results: Vec<LoadResult>,
    disabled_stores: Vec<String>,
}

impl<'a, C: EntityCodec> CatalogMaterializer<'a, C> {
    pub fn new(tree: &'a ResourceTree, codec: &'a C) -> Self {
        Self {
            tree,
            codec,
            probe: None,
            results: Vec::new(),
            disabled_stores: Vec::new(),
        }
    }

    /// Probe every enabled store with `probe` after adding it.
    pub fn with_probe(mut self, probe: &'a dyn StoreProbe) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn materialize(mut self) -> Result<MaterializedCatalog> {
        let tree = self.tree;
        let mut catalog = Catalog::new();

        self.load_styles(&mut catalog, &tree.get(STYLES), None);

        let workspaces = tree.get(WORKSPACES);
        if workspaces.is_dir() {
            let marker = self.read_default_marker(&workspaces);
            let loaded = self.load_workspaces(&mut catalog, &workspaces, &marker)?;
            self.settle_default(&mut catalog, &marker)?;
            for (dir, name) in &loaded {
                self.load_stores(&mut catalog, dir, name);
                self.load_layer_groups(&mut catalog, &dir.get(LAYERGROUPS), Some(name.as_str()));
            }
        } else {
            warn!(path = %workspaces, "no workspaces directory, catalog has no workspaces");
            self.results
                .push(LoadResult::skipped(workspaces.path(), "no workspaces directory"));
        }

        self.load_layer_groups(&mut catalog, &tree.get(LAYERGROUPS), None);

        info!(summary = ?catalog.summary(), "catalog materialized");

        Ok(MaterializedCatalog {
            catalog,
            results: self.results,
            disabled_stores: self.disabled_stores,
        })
    }

    // ── Default workspace ───────────────────────────────────────

    /// First pass: find which workspace the default marker names.
    ///
    /// Per-workspace markers win over the older top-level `workspaces/default.xml`.
    fn read_default_marker(&mut self, workspaces: &Resource) -> DefaultMarker {
        let mut found: Vec<String> = Vec::new();
        for dir in workspaces.list(ResourceFilter::Directory) {
            let marker = dir.get(DEFAULT_WORKSPACE_FILE);
            if !marker.is_file() {
                continue;
            }
            match self.codec.depersist::<WorkspaceInfo>(&marker) {
                Ok(ws) => found.push(ws.name),
                Err(e) => {
                    warn!(path = %marker, error = %e, "unreadable default workspace marker, ignoring");
                    self.results.push(LoadResult::failed(marker.path(), &e));
                }
            }
        }

        if found.is_empty() {
            let legacy_marker = workspaces.get(DEFAULT_WORKSPACE_FILE);
            if legacy_marker.is_file() {
                match self.codec.depersist::<WorkspaceInfo>(&legacy_marker) {
                    Ok(ws) => found.push(ws.name),
                    Err(e) => {
                        warn!(path = %legacy_marker, error = %e, "unreadable default workspace marker, ignoring");
                        self.results.push(LoadResult::failed(legacy_marker.path(), &e));
                    }
                }
            }
        }

        let mut names = found.into_iter();
        match names.next() {
            Some(first) => {
                for other in names {
                    warn!(chosen = %first, ignored = %other, "several default workspace markers, using the first");
                }
                DefaultMarker::Named(first)
            }
            None => {
                warn!("no default workspace marker found, default will be taken from the catalog");
                DefaultMarker::Absent
            }
        }
    }

    /// After all workspaces are in: reject a marker naming a missing
    /// workspace, or back-fill a marker for the catalog's own default.
    fn settle_default(&mut self, catalog: &mut Catalog, marker: &DefaultMarker) -> Result<()> {
        match marker {
            DefaultMarker::Named(name) => {
                if catalog.workspace(name).is_none() {
                    warn!(workspace = %name, "default workspace marker names a workspace that was not loaded, no default set");
                    catalog.clear_defaults()?;
                }
            }
            DefaultMarker::Absent => {
                if let Some(ws) = catalog.default_workspace().cloned() {
                    let path = default_marker_path(&ws.name);
                    match self.codec.persist(&ws, &self.tree.get(&path)) {
                        Ok(()) => info!(workspace = %ws.name, path = %path, "wrote default workspace marker"),
                        Err(e) => warn!(path = %path, error = %e, "failed to write default workspace marker"),
                    }
                }
            }
        }
        Ok(())
    }

    // ── Workspaces ──────────────────────────────────────────────

    /// Second pass: workspace, namespace and local styles of each workspace
    /// directory. Returns the directories whose workspace loaded.
    fn load_workspaces(
        &mut self,
        catalog: &mut Catalog,
        workspaces: &Resource,
        marker: &DefaultMarker,
    ) -> Result<Vec<(Resource, String)>> {
        let mut loaded = Vec::new();
        for dir in workspaces.list(ResourceFilter::Directory) {
            let descriptor = dir.get(WORKSPACE_FILE);
            let ws = match self.codec.depersist::<WorkspaceInfo>(&descriptor) {
                Ok(ws) => ws,
                Err(e) => {
                    warn!(path = %descriptor, error = %e, "failed to load workspace, skipping directory");
                    self.results.push(LoadResult::failed(descriptor.path(), &e));
                    continue;
                }
            };
            let name = ws.name.clone();
            if let Err(e) = catalog.add_workspace(ws) {
                warn!(workspace = %name, error = %e, "failed to add workspace, skipping directory");
                self.results.push(LoadResult::failed(descriptor.path(), &e));
                continue;
            }
            info!(workspace = %name, "loaded workspace");
            self.results
                .push(LoadResult::loaded(descriptor.path(), format!("workspace '{name}'")));

            let has_namespace = self.load_namespace(catalog, &dir, &name);

            if *marker == DefaultMarker::Named(name.clone()) {
                catalog.set_default_workspace(&name)?;
                if has_namespace {
                    catalog.set_default_namespace(&name)?;
                }
                debug!(workspace = %name, "marked default workspace");
            }

            self.load_styles(catalog, &dir.get(STYLES), Some(name.as_str()));
            loaded.push((dir, name));
        }
        Ok(loaded)
    }

    fn load_namespace(&mut self, catalog: &mut Catalog, dir: &Resource, workspace: &str) -> bool {
        let descriptor = dir.get(NAMESPACE_FILE);
        if !descriptor.is_file() {
            warn!(workspace, "workspace has no namespace descriptor");
            self.results
                .push(LoadResult::skipped(descriptor.path(), "no namespace descriptor"));
            return false;
        }
        let result = self
            .codec
            .depersist::<NamespaceInfo>(&descriptor)
            .map_err(|e| e.to_string())
            .and_then(|ns| {
                let prefix = ns.prefix.clone();
                catalog.add_namespace(ns).map(|()| prefix).map_err(|e| e.to_string())
            });
        match result {
            Ok(prefix) => {
                self.results
                    .push(LoadResult::loaded(descriptor.path(), format!("namespace '{prefix}'")));
                prefix == workspace
            }
            Err(e) => {
                warn!(path = %descriptor, error = %e, "failed to load namespace");
                self.results.push(LoadResult::failed(descriptor.path(), e));
                false
            }
        }
    }

    // ── Styles and layer groups ─────────────────────────────────

    fn load_styles(&mut self, catalog: &mut Catalog, node: &Resource, workspace: Option<&str>) {
        for file in node.list(ResourceFilter::Extension("xml")) {
            // `foo.xml.xml` supersedes a sibling `foo.xml`.
            if node.get(&descriptor_name(file.name())).is_file() {
                debug!(path = %file, "skipping style shadowed by a double-extension descriptor");
                self.results
                    .push(LoadResult::skipped(file.path(), "shadowed by .xml.xml descriptor"));
                continue;
            }
            let result = self
                .codec
                .depersist::<StyleInfo>(&file)
                .map_err(|e| e.to_string())
                .and_then(|mut style| {
                    if style.workspace.is_none() {
                        style.workspace = workspace.map(str::to_string);
                    }
                    let name = style.name.clone();
                    catalog.add_style(style).map(|()| name).map_err(|e| e.to_string())
                });
            match result {
                Ok(name) => {
                    debug!(style = %name, path = %file, "loaded style");
                    self.results
                        .push(LoadResult::loaded(file.path(), format!("style '{name}'")));
                }
                Err(e) => {
                    warn!(path = %file, error = %e, "failed to load style");
                    self.results.push(LoadResult::failed(file.path(), e));
                }
            }
        }
    }

    fn load_layer_groups(&mut self, catalog: &mut Catalog, node: &Resource, workspace: Option<&str>) {
        for file in node.list(ResourceFilter::Extension("xml")) {
            let mut group = match self.codec.depersist::<LayerGroupInfo>(&file) {
                Ok(group) => group,
                Err(e) => {
                    warn!(path = %file, error = %e, "failed to load layer group");
                    self.results.push(LoadResult::failed(file.path(), &e));
                    continue;
                }
            };
            if group.layers.is_empty() {
                warn!(group = %group.name, path = %file, "skipping layer group with no layers");
                self.results
                    .push(LoadResult::skipped(file.path(), "layer group has no layers"));
                continue;
            }
            if group.workspace.is_none() {
                group.workspace = workspace.map(str::to_string);
            }
            let name = group.name.clone();
            match catalog.add_layer_group(group) {
                Ok(()) => {
                    info!(group = %name, "loaded layer group");
                    self.results
                        .push(LoadResult::loaded(file.path(), format!("layer group '{name}'")));
                }
                Err(e) => {
                    warn!(path = %file, error = %e, "failed to add layer group");
                    self.results.push(LoadResult::failed(file.path(), &e));
                }
            }
        }
    }

    // ── Stores, resources, layers ───────────────────────────────

    /// Third pass: every non-configuration child of a workspace directory is a store.
    fn load_stores(&mut self, catalog: &mut Catalog, dir: &Resource, workspace: &str) {
        for store_dir in dir.list(ResourceFilter::Directory) {
            if is_config_directory(store_dir.name()) {
                continue;
            }
            let Some(kind) = StoreKind::PROBE_ORDER
                .into_iter()
                .find(|kind| store_dir.get(kind.descriptor()).is_file())
            else {
                warn!(path = %store_dir, "ignoring store directory with no store descriptor");
                self.results
                    .push(LoadResult::skipped(store_dir.path(), "unrecognized directory"));
                continue;
            };
            self.load_store(catalog, &store_dir, workspace, kind);
        }
    }

    fn load_store(&mut self, catalog: &mut Catalog, dir: &Resource, workspace: &str, kind: StoreKind) {
        let descriptor = dir.get(kind.descriptor());
        let mut store = match self.codec.depersist::<StoreInfo>(&descriptor) {
            Ok(store) => store,
            Err(e) => {
                warn!(path = %descriptor, error = %e, "failed to load {kind}");
                self.results.push(LoadResult::failed(descriptor.path(), &e));
                return;
            }
        };
        store.kind = kind;
        store.workspace = workspace.to_string();
        let name = store.name.clone();

        if let Err(e) = catalog.add_store(store.clone()) {
            warn!(path = %descriptor, error = %e, "failed to add {kind}");
            self.results.push(LoadResult::failed(descriptor.path(), &e));
            return;
        }
        info!(workspace, store = %name, "loaded {kind}");
        self.results.push(LoadResult::loaded(
            descriptor.path(),
            format!("{kind} '{workspace}:{name}'"),
        ));

        if store.enabled {
            self.check_connectivity(catalog, store);
        }

        // Resources load whether or not the store could connect.
        for resource_dir in dir.list(ResourceFilter::Directory) {
            self.load_resource(catalog, &resource_dir, workspace, &name, kind);
        }
    }

    fn check_connectivity(&mut self, catalog: &mut Catalog, mut store: StoreInfo) {
        let Some(probe) = self.probe else {
            return;
        };
        let Err(e) = catalog.resource_pool().connect(&store, probe) else {
            return;
        };
        let qualified = format!("{}:{}", store.workspace, store.name);
        let diagnostic = format!("{e:#}");
        warn!(store = %qualified, "error connecting to {}, disabling it", store.kind);
        info!(store = %qualified, error = %diagnostic, "captured store connection error");

        store.enabled = false;
        store.error = Some(diagnostic);
        if let Err(e) = catalog.save_store(store) {
            warn!(store = %qualified, error = %e, "failed to save disabled store");
        }
        self.disabled_stores.push(qualified);
    }

    fn load_resource(
        &mut self,
        catalog: &mut Catalog,
        dir: &Resource,
        workspace: &str,
        store: &str,
        kind: StoreKind,
    ) {
        let resource_kind = kind.resource_kind();
        let descriptor = dir.get(resource_kind.descriptor());
        if !descriptor.is_file() {
            debug!(path = %dir, "no {resource_kind} descriptor, skipping directory");
            self.results
                .push(LoadResult::skipped(dir.path(), format!("no {resource_kind} descriptor")));
            return;
        }

        let result = self
            .codec
            .depersist::<ResourceInfo>(&descriptor)
            .map_err(|e| e.to_string())
            .and_then(|mut resource| {
                resource.kind = resource_kind;
                resource.workspace = workspace.to_string();
                resource.store = store.to_string();
                catalog
                    .add_resource(resource.clone())
                    .map(|()| resource)
                    .map_err(|e| e.to_string())
            });
        let resource = match result {
            Ok(resource) => resource,
            Err(e) => {
                warn!(path = %descriptor, error = %e, "failed to load {resource_kind}");
                self.results.push(LoadResult::failed(descriptor.path(), e));
                return;
            }
        };
        debug!(workspace, store, resource = %resource.name, "loaded {resource_kind}");
        self.results.push(LoadResult::loaded(
            descriptor.path(),
            format!("{resource_kind} '{workspace}:{}'", resource.name),
        ));

        self.load_layer(catalog, dir, &resource);
    }

    fn load_layer(&mut self, catalog: &mut Catalog, dir: &Resource, resource: &ResourceInfo) {
        let descriptor = dir.get(LAYER_FILE);
        if !descriptor.is_file() {
            warn!(path = %dir, resource = %resource.name, "resource has no layer descriptor");
            self.results
                .push(LoadResult::skipped(descriptor.path(), "no layer descriptor"));
            return;
        }
        let result = self
            .codec
            .depersist::<LayerInfo>(&descriptor)
            .map_err(|e| e.to_string())
            .and_then(|mut layer| {
                layer.workspace = resource.workspace.clone();
                layer.resource = resource.name.clone();
                let name = layer.name.clone();
                catalog.add_layer(layer).map(|()| name).map_err(|e| e.to_string())
            });
        match result {
            Ok(name) => {
                debug!(layer = %name, "loaded layer");
                self.results.push(LoadResult::loaded(
                    descriptor.path(),
                    format!("layer '{}:{name}'", resource.workspace),
                ));
            }
            Err(e) => {
                warn!(path = %descriptor, error = %e, "failed to load layer");
                self.results.push(LoadResult::failed(descriptor.path(), e));
            }
        }
    }
}
