//! Shapes of the legacy flat descriptors.

use std::collections::BTreeMap;

use geocat_core::{BoundingBox, GeoServerInfo, LoggingInfo, ProjectionPolicy, ServiceInfo};
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Root `catalog.xml`: namespaces, data stores, coverage formats and styles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacyCatalogDocument {
    pub namespaces: Vec<LegacyNamespace>,
    pub datastores: Vec<LegacyDataStore>,
    /// Coverage stores, called formats in the legacy layout.
    pub formats: Vec<LegacyFormat>,
    pub styles: Vec<LegacyStyle>,
}

impl LegacyCatalogDocument {
    /// Data store id -> namespace prefix. Feature type directories only name
    /// their data store, so this is how they find their new workspace.
    pub fn datastore_namespaces(&self) -> BTreeMap<String, String> {
        self.datastores
            .iter()
            .map(|ds| (ds.id.clone(), ds.namespace.clone()))
            .collect()
    }

    /// Namespaces with the default one first.
    pub fn namespaces_default_first(&self) -> Vec<&LegacyNamespace> {
        let mut namespaces: Vec<_> = self.namespaces.iter().collect();
        namespaces.sort_by_key(|ns| !ns.default);
        namespaces
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyNamespace {
    pub prefix: String,
    pub uri: String,
    #[serde(default)]
    pub default: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyDataStore {
    pub id: String,
    pub namespace: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub connection_parameters: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyFormat {
    pub id: String,
    pub namespace: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub format_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyStyle {
    pub id: String,
    pub file: String,
}

/// `featureTypes/<dir>/info.xml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyFeatureType {
    pub name: String,
    pub datastore: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub srs: Option<String>,
    #[serde(default)]
    pub native_bbox: Option<BoundingBox>,
    #[serde(default)]
    pub lat_lon_bbox: Option<BoundingBox>,
    #[serde(default)]
    pub projection_policy: ProjectionPolicy,
    #[serde(default)]
    pub default_style: Option<String>,
    #[serde(default)]
    pub styles: Vec<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Root `services.xml`: global and logging settings plus every service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacyServicesDocument {
    pub global: Option<GeoServerInfo>,
    pub logging: Option<LoggingInfo>,
    pub services: Vec<ServiceInfo>,
}
