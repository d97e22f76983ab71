//! Persistence of the catalog and configuration into the CURRENT layout.
//!
//! ```text
//! workspaces/<ws>/workspace.xml | namespace.xml | default.xml | settings.xml
//! workspaces/<ws>/<store>/<store kind descriptor>
//! workspaces/<ws>/<store>/<resource>/<resource kind descriptor> + layer.xml
//! [workspaces/<ws>/]styles/<style>.xml
//! [workspaces/<ws>/]layergroups/<group>.xml
//! [workspaces/<ws>/]<service>.xml, global.xml, logging.xml
//! ```
//!
//! The persisters are listeners: attached to a catalog or configuration, they
//! mirror every mutation onto the resource tree.

mod config;
mod error;
mod persister;

#[cfg(test)]
mod tests;

pub use config::ConfigPersister;
pub use error::PersistError;
pub use persister::CatalogPersister;

use geocat_core::layout::{
    descriptor_name, DEFAULT_WORKSPACE_FILE, LAYERGROUPS, LAYER_FILE, NAMESPACE_FILE,
    SETTINGS_FILE, STYLES, WORKSPACES, WORKSPACE_FILE,
};
use geocat_core::{ResourceInfo, StoreInfo};

/// Directory of a workspace.
pub fn workspace_dir(workspace: &str) -> String {
    format!("{}/{}", WORKSPACES, workspace)
}

pub fn workspace_path(workspace: &str) -> String {
    format!("{}/{}", workspace_dir(workspace), WORKSPACE_FILE)
}

pub fn namespace_path(prefix: &str) -> String {
    format!("{}/{}", workspace_dir(prefix), NAMESPACE_FILE)
}

/// Default workspace marker, stored inside the default workspace's own directory.
pub fn default_marker_path(workspace: &str) -> String {
    format!("{}/{}", workspace_dir(workspace), DEFAULT_WORKSPACE_FILE)
}

pub fn settings_path(workspace: &str) -> String {
    format!("{}/{}", workspace_dir(workspace), SETTINGS_FILE)
}

pub fn store_dir(workspace: &str, store: &str) -> String {
    format!("{}/{}", workspace_dir(workspace), store)
}

pub fn store_path(store: &StoreInfo) -> String {
    format!(
        "{}/{}",
        store_dir(&store.workspace, &store.name),
        store.kind.descriptor()
    )
}

/// Directory holding a resource's descriptor, its layer and any auxiliary files.
pub fn resource_dir(workspace: &str, store: &str, resource: &str) -> String {
    format!("{}/{}", store_dir(workspace, store), resource)
}

pub fn resource_path(resource: &ResourceInfo) -> String {
    format!(
        "{}/{}",
        resource_dir(&resource.workspace, &resource.store, &resource.name),
        resource.kind.descriptor()
    )
}

pub fn layer_path(resource: &ResourceInfo) -> String {
    format!(
        "{}/{}",
        resource_dir(&resource.workspace, &resource.store, &resource.name),
        LAYER_FILE
    )
}

fn scoped_dir(workspace: Option<&str>, node: &str) -> String {
    match workspace {
        Some(ws) => format!("{}/{}", workspace_dir(ws), node),
        None => node.to_string(),
    }
}

pub fn style_path(workspace: Option<&str>, name: &str) -> String {
    format!("{}/{}", scoped_dir(workspace, STYLES), descriptor_name(name))
}

pub fn layer_group_path(workspace: Option<&str>, name: &str) -> String {
    format!("{}/{}", scoped_dir(workspace, LAYERGROUPS), descriptor_name(name))
}

/// Descriptor of a service, at the root for global services.
pub fn service_path(workspace: Option<&str>, service_type: &str) -> String {
    let file = descriptor_name(&service_type.to_lowercase());
    match workspace {
        Some(ws) => format!("{}/{}", workspace_dir(ws), file),
        None => file,
    }
}
