//! Names of the nodes that make up a data directory.
//!
//! ```text
//! <root>/
//!   global.xml  logging.xml  <service>.xml
//!   styles/*.xml
//!   layergroups/*.xml
//!   workspaces/
//!     <ws>/
//!       workspace.xml  namespace.xml  default.xml  settings.xml  <service>.xml
//!       styles/*.xml
//!       layergroups/*.xml
//!       <store>/
//!         datastore.xml | coveragestore.xml | wmsstore.xml
//!         <resource>/
//!           featuretype.xml | coverage.xml | wmslayer.xml
//!           layer.xml
//! ```
//!
//! The legacy layout is recognized by `catalog.xml` and `services.xml` at the root,
//! plus per feature type directories under `featureTypes/`.

pub const WORKSPACES: &str = "workspaces";
pub const STYLES: &str = "styles";
pub const LAYERGROUPS: &str = "layergroups";

pub const WORKSPACE_FILE: &str = "workspace.xml";
pub const NAMESPACE_FILE: &str = "namespace.xml";
pub const DEFAULT_WORKSPACE_FILE: &str = "default.xml";
pub const LAYER_FILE: &str = "layer.xml";
pub const SETTINGS_FILE: &str = "settings.xml";
pub const GLOBAL_FILE: &str = "global.xml";
pub const LOGGING_FILE: &str = "logging.xml";

pub const LEGACY_CATALOG_FILE: &str = "catalog.xml";
pub const LEGACY_SERVICES_FILE: &str = "services.xml";
pub const LEGACY_FEATURE_TYPES: &str = "featureTypes";
pub const LEGACY_FEATURE_TYPE_INFO: &str = "info.xml";

/// Extension shared by every descriptor file.
pub const DESCRIPTOR_EXTENSION: &str = "xml";

/// Suffix appended to legacy marker files once they have been migrated.
pub const MIGRATED_SUFFIX: &str = ".old";

/// File name of the descriptor for an entity called `name`.
pub fn descriptor_name(name: &str) -> String {
    format!("{name}.{DESCRIPTOR_EXTENSION}")
}

/// Name a legacy marker is renamed to after migration.
pub fn migrated_name(name: &str) -> String {
    format!("{name}{MIGRATED_SUFFIX}")
}

/// Workspace children that hold configuration rather than a store.
pub fn is_config_directory(name: &str) -> bool {
    name == STYLES || name == LAYERGROUPS
}
