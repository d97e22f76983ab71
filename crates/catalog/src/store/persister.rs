use geocat_core::{CatalogInfo, EntityCodec, ResourceTree};
use tracing::debug;

use crate::catalog::Catalog;
use crate::event::{CatalogEvent, CatalogListener};

use super::error::PersistError;
use super::{
    default_marker_path, layer_group_path, layer_path, namespace_path, resource_path, store_path,
    style_path, workspace_path,
};

/// Catalog listener that writes every added or modified entity to its
/// CURRENT-layout descriptor and deletes the descriptor of removed ones.
pub struct CatalogPersister<C> {
    tree: ResourceTree,
    codec: C,
}

impl<C: EntityCodec> CatalogPersister<C> {
    pub fn new(tree: ResourceTree, codec: C) -> Self {
        Self { tree, codec }
    }

    /// Tree location of `info`'s descriptor.
    fn path_of(&self, catalog: &Catalog, info: &CatalogInfo) -> Result<String, PersistError> {
        Ok(match info {
            CatalogInfo::Workspace(ws) => workspace_path(&ws.name),
            CatalogInfo::Namespace(ns) => namespace_path(&ns.prefix),
            CatalogInfo::Store(store) => store_path(store),
            CatalogInfo::Resource(resource) => resource_path(resource),
            CatalogInfo::Layer(layer) => {
                let resource = catalog
                    .resource(&layer.workspace, &layer.resource)
                    .ok_or_else(|| PersistError::UnknownResource {
                        workspace: layer.workspace.clone(),
                        layer: layer.name.clone(),
                        resource: layer.resource.clone(),
                    })?;
                layer_path(resource)
            }
            CatalogInfo::Style(style) => style_path(style.workspace.as_deref(), &style.name),
            CatalogInfo::LayerGroup(group) => {
                layer_group_path(group.workspace.as_deref(), &group.name)
            }
        })
    }

    fn persist(&self, path: &str, info: &CatalogInfo) -> Result<(), PersistError> {
        let target = self.tree.get(path);
        let result = match info {
            CatalogInfo::Workspace(i) => self.codec.persist(i, &target),
            CatalogInfo::Namespace(i) => self.codec.persist(i, &target),
            CatalogInfo::Store(i) => self.codec.persist(i, &target),
            CatalogInfo::Resource(i) => self.codec.persist(i, &target),
            CatalogInfo::Layer(i) => self.codec.persist(i, &target),
            CatalogInfo::LayerGroup(i) => self.codec.persist(i, &target),
            CatalogInfo::Style(i) => self.codec.persist(i, &target),
        };
        result.map_err(|source| PersistError::Descriptor {
            path: path.to_string(),
            source,
        })?;
        debug!(path, entity = %info, "persisted descriptor");
        Ok(())
    }

    fn remove(&self, path: &str) -> Result<(), PersistError> {
        let removed = self
            .tree
            .get(path)
            .remove()
            .map_err(|source| PersistError::Remove {
                path: path.to_string(),
                source,
            })?;
        if removed {
            debug!(path, "removed descriptor");
        }
        Ok(())
    }
}

impl<C: EntityCodec> CatalogListener for CatalogPersister<C> {
    fn name(&self) -> &str {
        "catalog-persister"
    }

    fn handle_event(&self, catalog: &Catalog, event: &CatalogEvent) -> anyhow::Result<()> {
        match event {
            CatalogEvent::Added(info) => {
                let path = self.path_of(catalog, info)?;
                self.persist(&path, info)?;
            }
            CatalogEvent::Modified { before, after } => {
                let old = self.path_of(catalog, before)?;
                let new = self.path_of(catalog, after)?;
                if old != new {
                    self.remove(&old)?;
                }
                self.persist(&new, after)?;
            }
            CatalogEvent::Removed(info) => {
                let path = self.path_of(catalog, info)?;
                self.remove(&path)?;
            }
            CatalogEvent::DefaultWorkspaceChanged { previous, current } => {
                if let Some(previous) = previous {
                    self.remove(&default_marker_path(&previous.name))?;
                }
                if let Some(current) = current {
                    let path = default_marker_path(&current.name);
                    self.persist(&path, &CatalogInfo::Workspace(current.clone()))?;
                }
            }
        }
        Ok(())
    }
}
