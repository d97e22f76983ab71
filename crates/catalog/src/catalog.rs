//! In-memory catalog graph.
//!
//! Entities are keyed by name within their scope. Cross references between
//! entities (store -> workspace, resource -> store, layer -> resource, group ->
//! members, layer -> styles) are held by name and checked on insertion or
//! during [`Catalog::resolve`].

mod resolve;

use std::collections::BTreeMap;
use std::sync::Arc;

use geocat_core::entity::new_id;
use geocat_core::{
    CatalogInfo, LayerGroupInfo, LayerInfo, NamespaceInfo, ResourceInfo, StoreInfo, StyleInfo,
    WorkspaceInfo,
};
use serde::Serialize;
use tracing::warn;

use crate::error::CatalogError;
use crate::event::{CatalogEvent, CatalogListener, ListenerKind, Registration};
use crate::pool::ResourcePool;

pub use resolve::ResolveReport;

type Scoped = (String, String);
type OptScoped = (Option<String>, String);

fn scoped(workspace: &str, name: &str) -> Scoped {
    (workspace.to_string(), name.to_string())
}

fn opt_scoped(workspace: Option<&str>, name: &str) -> OptScoped {
    (workspace.map(str::to_string), name.to_string())
}

/// Entity counts, used for summaries and logging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogSummary {
    pub workspaces: usize,
    pub namespaces: usize,
    pub stores: usize,
    pub resources: usize,
    pub layers: usize,
    pub layer_groups: usize,
    pub styles: usize,
    pub default_workspace: Option<String>,
}

pub struct Catalog {
    workspaces: BTreeMap<String, WorkspaceInfo>,
    namespaces: BTreeMap<String, NamespaceInfo>,
    stores: BTreeMap<Scoped, StoreInfo>,
    resources: BTreeMap<Scoped, ResourceInfo>,
    layers: BTreeMap<Scoped, LayerInfo>,
    styles: BTreeMap<OptScoped, StyleInfo>,
    layer_groups: BTreeMap<OptScoped, LayerGroupInfo>,
    default_workspace: Option<String>,
    default_namespace: Option<String>,
    listeners: Vec<Registration>,
    pool: Arc<ResourcePool>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("summary", &self.summary())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Catalog {
    /// An empty catalog with its own resource pool registered as an internal listener.
    pub fn new() -> Self {
        let pool = Arc::new(ResourcePool::new());
        Self {
            workspaces: BTreeMap::new(),
            namespaces: BTreeMap::new(),
            stores: BTreeMap::new(),
            resources: BTreeMap::new(),
            layers: BTreeMap::new(),
            styles: BTreeMap::new(),
            layer_groups: BTreeMap::new(),
            default_workspace: None,
            default_namespace: None,
            listeners: vec![Registration {
                listener: Arc::clone(&pool) as Arc<dyn CatalogListener>,
                kind: ListenerKind::Internal,
            }],
            pool,
        }
    }

    pub fn resource_pool(&self) -> &ResourcePool {
        &self.pool
    }

    // ── Listeners ───────────────────────────────────────────────

    /// Register an observer owned by the hosting process.
    pub fn add_listener(&mut self, listener: Arc<dyn CatalogListener>) {
        self.listeners.push(Registration {
            listener,
            kind: ListenerKind::External,
        });
    }

    /// Register an observer that every catalog instance creates for itself.
    pub fn add_internal_listener(&mut self, listener: Arc<dyn CatalogListener>) {
        self.listeners.push(Registration {
            listener,
            kind: ListenerKind::Internal,
        });
    }

    /// Unregister `listener` (compared by identity). Returns whether it was registered.
    pub fn remove_listener(&mut self, listener: &Arc<dyn CatalogListener>) -> bool {
        let before = self.listeners.len();
        self.listeners
            .retain(|reg| !same_listener(&reg.listener, listener));
        self.listeners.len() != before
    }

    /// Drop every internal listener, returning how many were removed.
    pub fn remove_internal_listeners(&mut self) -> usize {
        let before = self.listeners.len();
        self.listeners.retain(|reg| reg.kind != ListenerKind::Internal);
        before - self.listeners.len()
    }

    /// Snapshot of the externally registered listeners, in registration order.
    pub fn external_listeners(&self) -> Vec<Arc<dyn CatalogListener>> {
        self.listeners
            .iter()
            .filter(|reg| reg.kind == ListenerKind::External)
            .map(|reg| Arc::clone(&reg.listener))
            .collect()
    }

    pub fn listener_count(&self, kind: ListenerKind) -> usize {
        self.listeners.iter().filter(|reg| reg.kind == kind).count()
    }

    fn fire(&self, event: CatalogEvent) -> Result<(), CatalogError> {
        let mut failures = Vec::new();
        for reg in &self.listeners {
            if let Err(e) = reg.listener.handle_event(self, &event) {
                warn!(listener = reg.listener.name(), error = %e, "catalog listener failed");
                failures.push(format!("{}: {:#}", reg.listener.name(), e));
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(CatalogError::Listener(failures.join("; ")))
        }
    }

    // ── Additions ───────────────────────────────────────────────

    /// Add any catalog entity.
    pub fn add(&mut self, info: CatalogInfo) -> Result<(), CatalogError> {
        match info {
            CatalogInfo::Workspace(i) => self.add_workspace(i),
            CatalogInfo::Namespace(i) => self.add_namespace(i),
            CatalogInfo::Store(i) => self.add_store(i),
            CatalogInfo::Resource(i) => self.add_resource(i),
            CatalogInfo::Layer(i) => self.add_layer(i),
            CatalogInfo::LayerGroup(i) => self.add_layer_group(i),
            CatalogInfo::Style(i) => self.add_style(i),
        }
    }

    /// Add a workspace. The first workspace added to a catalog without a
    /// default becomes the default.
    pub fn add_workspace(&mut self, mut ws: WorkspaceInfo) -> Result<(), CatalogError> {
        require_name("workspace", &ws.name)?;
        if self.workspaces.contains_key(&ws.name) {
            return Err(duplicate("workspace", &ws.name));
        }
        if ws.id.is_empty() {
            ws.id = new_id("WorkspaceInfo");
        }
        let name = ws.name.clone();
        self.workspaces.insert(name.clone(), ws.clone());
        let added = self.fire(CatalogEvent::Added(ws.into()));
        if self.default_workspace.is_none() {
            self.set_default_workspace(&name)?;
        }
        added
    }

    /// Add a namespace. The first namespace added without a default becomes the default.
    pub fn add_namespace(&mut self, mut ns: NamespaceInfo) -> Result<(), CatalogError> {
        require_name("namespace", &ns.prefix)?;
        if self.namespaces.contains_key(&ns.prefix) {
            return Err(duplicate("namespace", &ns.prefix));
        }
        if ns.uri.is_empty() {
            return Err(invalid("namespace", &ns.prefix, "URI must not be empty"));
        }
        if ns.id.is_empty() {
            ns.id = new_id("NamespaceInfo");
        }
        let prefix = ns.prefix.clone();
        self.namespaces.insert(prefix.clone(), ns.clone());
        if self.default_namespace.is_none() {
            self.default_namespace = Some(prefix);
        }
        self.fire(CatalogEvent::Added(ns.into()))
    }

    pub fn add_store(&mut self, mut store: StoreInfo) -> Result<(), CatalogError> {
        require_name("store", &store.name)?;
        if !self.workspaces.contains_key(&store.workspace) {
            return Err(not_found("workspace", &store.workspace));
        }
        let key = scoped(&store.workspace, &store.name);
        if self.stores.contains_key(&key) {
            return Err(duplicate("store", &format!("{}:{}", store.workspace, store.name)));
        }
        if store.id.is_empty() {
            store.id = new_id("StoreInfo");
        }
        self.stores.insert(key, store.clone());
        self.fire(CatalogEvent::Added(store.into()))
    }

    pub fn add_resource(&mut self, mut resource: ResourceInfo) -> Result<(), CatalogError> {
        require_name("resource", &resource.name)?;
        let qualified = format!("{}:{}", resource.workspace, resource.name);
        let store = self
            .store(&resource.workspace, &resource.store)
            .ok_or_else(|| not_found("store", &format!("{}:{}", resource.workspace, resource.store)))?;
        if store.kind.resource_kind() != resource.kind {
            return Err(invalid(
                "resource",
                &qualified,
                &format!("a {} cannot publish a {}", store.kind, resource.kind),
            ));
        }
        let key = scoped(&resource.workspace, &resource.name);
        if self.resources.contains_key(&key) {
            return Err(duplicate("resource", &qualified));
        }
        if resource.id.is_empty() {
            resource.id = new_id("ResourceInfo");
        }
        self.resources.insert(key, resource.clone());
        self.fire(CatalogEvent::Added(resource.into()))
    }

    pub fn add_layer(&mut self, mut layer: LayerInfo) -> Result<(), CatalogError> {
        require_name("layer", &layer.name)?;
        if self.resource(&layer.workspace, &layer.resource).is_none() {
            return Err(not_found(
                "resource",
                &format!("{}:{}", layer.workspace, layer.resource),
            ));
        }
        let key = scoped(&layer.workspace, &layer.name);
        if self.layers.contains_key(&key) {
            return Err(duplicate("layer", &format!("{}:{}", layer.workspace, layer.name)));
        }
        if layer.id.is_empty() {
            layer.id = new_id("LayerInfo");
        }
        self.layers.insert(key, layer.clone());
        self.fire(CatalogEvent::Added(layer.into()))
    }

    pub fn add_style(&mut self, mut style: StyleInfo) -> Result<(), CatalogError> {
        require_name("style", &style.name)?;
        if let Some(ws) = &style.workspace {
            if !self.workspaces.contains_key(ws) {
                return Err(not_found("workspace", ws));
            }
        }
        let key = opt_scoped(style.workspace.as_deref(), &style.name);
        if self.styles.contains_key(&key) {
            return Err(duplicate("style", &style.name));
        }
        if style.id.is_empty() {
            style.id = new_id("StyleInfo");
        }
        self.styles.insert(key, style.clone());
        self.fire(CatalogEvent::Added(style.into()))
    }

    /// Add a layer group. Groups without members are rejected.
    pub fn add_layer_group(&mut self, mut group: LayerGroupInfo) -> Result<(), CatalogError> {
        require_name("layer group", &group.name)?;
        if group.layers.is_empty() {
            return Err(invalid("layer group", &group.name, "layer group must not be empty"));
        }
        if let Some(ws) = &group.workspace {
            if !self.workspaces.contains_key(ws) {
                return Err(not_found("workspace", ws));
            }
        }
        let key = opt_scoped(group.workspace.as_deref(), &group.name);
        if self.layer_groups.contains_key(&key) {
            return Err(duplicate("layer group", &group.name));
        }
        if group.id.is_empty() {
            group.id = new_id("LayerGroupInfo");
        }
        self.layer_groups.insert(key, group.clone());
        self.fire(CatalogEvent::Added(group.into()))
    }

    // ── Modifications / removals ────────────────────────────────

    /// Replace an existing store (matched by workspace and name).
    pub fn save_store(&mut self, store: StoreInfo) -> Result<(), CatalogError> {
        let key = scoped(&store.workspace, &store.name);
        let before = match self.stores.get_mut(&key) {
            Some(slot) => std::mem::replace(slot, store.clone()),
            None => {
                return Err(not_found(
                    "store",
                    &format!("{}:{}", store.workspace, store.name),
                ))
            }
        };
        self.fire(CatalogEvent::Modified {
            before: before.into(),
            after: store.into(),
        })
    }

    pub fn remove_layer(&mut self, workspace: &str, name: &str) -> Result<(), CatalogError> {
        let removed = self
            .layers
            .remove(&scoped(workspace, name))
            .ok_or_else(|| not_found("layer", &format!("{}:{}", workspace, name)))?;
        self.fire(CatalogEvent::Removed(removed.into()))
    }

    pub fn remove_layer_group(
        &mut self,
        workspace: Option<&str>,
        name: &str,
    ) -> Result<(), CatalogError> {
        let removed = self
            .layer_groups
            .remove(&opt_scoped(workspace, name))
            .ok_or_else(|| not_found("layer group", name))?;
        self.fire(CatalogEvent::Removed(removed.into()))
    }

    // ── Defaults ────────────────────────────────────────────────

    /// Mark `name` as the process default workspace.
    pub fn set_default_workspace(&mut self, name: &str) -> Result<(), CatalogError> {
        let current = self
            .workspaces
            .get(name)
            .cloned()
            .ok_or_else(|| not_found("workspace", name))?;
        if self.default_workspace.as_deref() == Some(name) {
            return Ok(());
        }
        let previous = self
            .default_workspace
            .replace(name.to_string())
            .and_then(|prev| self.workspaces.get(&prev).cloned());
        self.fire(CatalogEvent::DefaultWorkspaceChanged {
            previous,
            current: Some(current),
        })
    }

    /// Mark `prefix` as the process default namespace.
    pub fn set_default_namespace(&mut self, prefix: &str) -> Result<(), CatalogError> {
        if !self.namespaces.contains_key(prefix) {
            return Err(not_found("namespace", prefix));
        }
        self.default_namespace = Some(prefix.to_string());
        Ok(())
    }

    /// Forget both defaults.
    pub fn clear_defaults(&mut self) -> Result<(), CatalogError> {
        self.default_namespace = None;
        let previous = self
            .default_workspace
            .take()
            .and_then(|prev| self.workspaces.get(&prev).cloned());
        if previous.is_none() {
            return Ok(());
        }
        self.fire(CatalogEvent::DefaultWorkspaceChanged {
            previous,
            current: None,
        })
    }

    pub fn default_workspace(&self) -> Option<&WorkspaceInfo> {
        self.default_workspace
            .as_ref()
            .and_then(|name| self.workspaces.get(name))
    }

    pub fn default_namespace(&self) -> Option<&NamespaceInfo> {
        self.default_namespace
            .as_ref()
            .and_then(|prefix| self.namespaces.get(prefix))
    }

    // ── Lookups ─────────────────────────────────────────────────

    pub fn workspace(&self, name: &str) -> Option<&WorkspaceInfo> {
        self.workspaces.get(name)
    }

    pub fn workspaces(&self) -> impl Iterator<Item = &WorkspaceInfo> {
        self.workspaces.values()
    }

    pub fn namespace(&self, prefix: &str) -> Option<&NamespaceInfo> {
        self.namespaces.get(prefix)
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &NamespaceInfo> {
        self.namespaces.values()
    }

    pub fn store(&self, workspace: &str, name: &str) -> Option<&StoreInfo> {
        self.stores.get(&scoped(workspace, name))
    }

    pub fn stores(&self) -> impl Iterator<Item = &StoreInfo> {
        self.stores.values()
    }

    pub fn resource(&self, workspace: &str, name: &str) -> Option<&ResourceInfo> {
        self.resources.get(&scoped(workspace, name))
    }

    pub fn resources(&self) -> impl Iterator<Item = &ResourceInfo> {
        self.resources.values()
    }

    pub fn layer(&self, workspace: &str, name: &str) -> Option<&LayerInfo> {
        self.layers.get(&scoped(workspace, name))
    }

    pub fn layers(&self) -> impl Iterator<Item = &LayerInfo> {
        self.layers.values()
    }

    pub fn style(&self, workspace: Option<&str>, name: &str) -> Option<&StyleInfo> {
        self.styles.get(&opt_scoped(workspace, name))
    }

    /// Global style lookup.
    pub fn style_by_name(&self, name: &str) -> Option<&StyleInfo> {
        self.style(None, name)
    }

    pub fn styles(&self) -> impl Iterator<Item = &StyleInfo> {
        self.styles.values()
    }

    pub fn layer_group(&self, workspace: Option<&str>, name: &str) -> Option<&LayerGroupInfo> {
        self.layer_groups.get(&opt_scoped(workspace, name))
    }

    pub fn layer_groups(&self) -> impl Iterator<Item = &LayerGroupInfo> {
        self.layer_groups.values()
    }

    pub fn summary(&self) -> CatalogSummary {
        CatalogSummary {
            workspaces: self.workspaces.len(),
            namespaces: self.namespaces.len(),
            stores: self.stores.len(),
            resources: self.resources.len(),
            layers: self.layers.len(),
            layer_groups: self.layer_groups.len(),
            styles: self.styles.len(),
            default_workspace: self.default_workspace.clone(),
        }
    }

    // ── Synchronization ─────────────────────────────────────────

    /// Replace everything in this catalog with the contents of `other`.
    ///
    /// Entities, defaults, listeners and the resource pool all come from
    /// `other`; this instance's previous pool is disposed.
    pub fn sync_from(&mut self, other: Catalog) {
        if !Arc::ptr_eq(&self.pool, &other.pool) {
            self.pool.dispose();
        }
        let Catalog {
            workspaces,
            namespaces,
            stores,
            resources,
            layers,
            styles,
            layer_groups,
            default_workspace,
            default_namespace,
            listeners,
            pool,
        } = other;
        self.workspaces = workspaces;
        self.namespaces = namespaces;
        self.stores = stores;
        self.resources = resources;
        self.layers = layers;
        self.styles = styles;
        self.layer_groups = layer_groups;
        self.default_workspace = default_workspace;
        self.default_namespace = default_namespace;
        self.listeners = listeners;
        self.pool = pool;
    }
}

fn same_listener(a: &Arc<dyn CatalogListener>, b: &Arc<dyn CatalogListener>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

fn require_name(kind: &'static str, name: &str) -> Result<(), CatalogError> {
    if name.trim().is_empty() {
        return Err(invalid(kind, name, "name must not be empty"));
    }
    Ok(())
}

fn duplicate(kind: &'static str, name: &str) -> CatalogError {
    CatalogError::Duplicate {
        kind,
        name: name.to_string(),
    }
}

fn not_found(kind: &'static str, name: &str) -> CatalogError {
    CatalogError::NotFound {
        kind,
        name: name.to_string(),
    }
}

fn invalid(kind: &'static str, name: &str, reason: &str) -> CatalogError {
    CatalogError::Invalid {
        kind,
        name: name.to_string(),
        reason: reason.to_string(),
    }
}
