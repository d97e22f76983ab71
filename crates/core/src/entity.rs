use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generate a stable identifier of the form `<Kind>-<uuid>`.
pub fn new_id(kind: &str) -> String {
    format!("{}-{}", kind, Uuid::new_v4())
}

fn default_true() -> bool {
    true
}

// ── Workspace / Namespace ─────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceInfo {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub isolated: bool,
}

impl WorkspaceInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id("WorkspaceInfo"),
            name: name.into(),
            isolated: false,
        }
    }
}

/// Paired 1:1 with the workspace whose name equals `prefix`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespaceInfo {
    #[serde(default)]
    pub id: String,
    pub prefix: String,
    pub uri: String,
}

impl NamespaceInfo {
    pub fn new(prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            id: new_id("NamespaceInfo"),
            prefix: prefix.into(),
            uri: uri.into(),
        }
    }
}

// ── Stores ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Vector,
    Coverage,
    Wms,
}

impl StoreKind {
    /// Order in which a store directory is probed for its descriptor.
    pub const PROBE_ORDER: [StoreKind; 3] = [StoreKind::Vector, StoreKind::Coverage, StoreKind::Wms];

    pub fn descriptor(self) -> &'static str {
        match self {
            StoreKind::Vector => "datastore.xml",
            StoreKind::Coverage => "coveragestore.xml",
            StoreKind::Wms => "wmsstore.xml",
        }
    }

    /// Kind of resource a store of this kind publishes.
    pub fn resource_kind(self) -> ResourceKind {
        match self {
            StoreKind::Vector => ResourceKind::FeatureType,
            StoreKind::Coverage => ResourceKind::Coverage,
            StoreKind::Wms => ResourceKind::WmsLayer,
        }
    }
}

impl std::fmt::Display for StoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreKind::Vector => write!(f, "data store"),
            StoreKind::Coverage => write!(f, "coverage store"),
            StoreKind::Wms => write!(f, "wms store"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreInfo {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub kind: StoreKind,
    /// Owning workspace; taken from the enclosing directory when omitted.
    #[serde(default)]
    pub workspace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub connection_parameters: BTreeMap<String, String>,
    /// Why the store was disabled after its connectivity probe failed.
    #[serde(skip)]
    pub error: Option<String>,
}

impl StoreInfo {
    pub fn new(kind: StoreKind, workspace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: new_id("StoreInfo"),
            name: name.into(),
            kind,
            workspace: workspace.into(),
            description: None,
            enabled: true,
            connection_parameters: BTreeMap::new(),
            error: None,
        }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.connection_parameters.insert(key.into(), value.into());
        self
    }
}

// ── Resources ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    #[default]
    FeatureType,
    Coverage,
    WmsLayer,
}

impl ResourceKind {
    pub fn descriptor(self) -> &'static str {
        match self {
            ResourceKind::FeatureType => "featuretype.xml",
            ResourceKind::Coverage => "coverage.xml",
            ResourceKind::WmsLayer => "wmslayer.xml",
        }
    }

    pub fn store_kind(self) -> StoreKind {
        match self {
            ResourceKind::FeatureType => StoreKind::Vector,
            ResourceKind::Coverage => StoreKind::Coverage,
            ResourceKind::WmsLayer => StoreKind::Wms,
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::FeatureType => write!(f, "feature type"),
            ResourceKind::Coverage => write!(f, "coverage"),
            ResourceKind::WmsLayer => write!(f, "wms layer"),
        }
    }
}

/// How declared and native spatial reference systems are reconciled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectionPolicy {
    #[default]
    ForceDeclared,
    ReprojectToDeclared,
    #[serde(rename = "NONE")]
    KeepNative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crs: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceInfo {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_name: Option<String>,
    #[serde(default)]
    pub kind: ResourceKind,
    #[serde(default)]
    pub workspace: String,
    #[serde(default)]
    pub store: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_bbox: Option<BoundingBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat_lon_bbox: Option<BoundingBox>,
    #[serde(default)]
    pub projection_policy: ProjectionPolicy,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl ResourceInfo {
    pub fn new(
        kind: ResourceKind,
        workspace: impl Into<String>,
        store: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: new_id("ResourceInfo"),
            name: name.into(),
            native_name: None,
            kind,
            workspace: workspace.into(),
            store: store.into(),
            title: None,
            srs: None,
            native_bbox: None,
            lat_lon_bbox: None,
            projection_policy: ProjectionPolicy::default(),
            enabled: true,
        }
    }
}

// ── Styles / Layers / Groups ──────────────────────────────────

/// Reference to a style by name, optionally scoped to a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StyleRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,
    pub name: String,
}

impl StyleRef {
    pub fn global(name: impl Into<String>) -> Self {
        Self {
            workspace: None,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleInfo {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,
    /// Style definition file, relative to the styles node holding the descriptor.
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl StyleInfo {
    pub fn new(name: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            id: new_id("StyleInfo"),
            name: name.into(),
            workspace: None,
            filename: filename.into(),
            format: Some("sld".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerInfo {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub workspace: String,
    /// Name of the wrapped resource within `workspace`.
    #[serde(default)]
    pub resource: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_style: Option<StyleRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub styles: Vec<StyleRef>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl LayerInfo {
    /// A layer publishing `resource` under the resource's own name.
    pub fn for_resource(resource: &ResourceInfo) -> Self {
        Self {
            id: new_id("LayerInfo"),
            name: resource.name.clone(),
            workspace: resource.workspace.clone(),
            resource: resource.name.clone(),
            default_style: None,
            styles: Vec::new(),
            enabled: true,
        }
    }
}

/// A member of a layer group: a layer or a nested group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PublishedRef {
    Layer {
        workspace: String,
        name: String,
    },
    Group {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        workspace: Option<String>,
        name: String,
    },
}

impl std::fmt::Display for PublishedRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublishedRef::Layer { workspace, name } => write!(f, "layer {}:{}", workspace, name),
            PublishedRef::Group {
                workspace: Some(ws),
                name,
            } => write!(f, "group {}:{}", ws, name),
            PublishedRef::Group {
                workspace: None,
                name,
            } => write!(f, "group {}", name),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayerGroupMode {
    #[default]
    Single,
    Named,
    Container,
    Eo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerGroupInfo {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub mode: LayerGroupMode,
    #[serde(default)]
    pub layers: Vec<PublishedRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub styles: Vec<StyleRef>,
}

// ── Any catalog entity ────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogInfo {
    Workspace(WorkspaceInfo),
    Namespace(NamespaceInfo),
    Store(StoreInfo),
    Resource(ResourceInfo),
    Layer(LayerInfo),
    LayerGroup(LayerGroupInfo),
    Style(StyleInfo),
}

impl CatalogInfo {
    pub fn name(&self) -> &str {
        match self {
            CatalogInfo::Workspace(i) => &i.name,
            CatalogInfo::Namespace(i) => &i.prefix,
            CatalogInfo::Store(i) => &i.name,
            CatalogInfo::Resource(i) => &i.name,
            CatalogInfo::Layer(i) => &i.name,
            CatalogInfo::LayerGroup(i) => &i.name,
            CatalogInfo::Style(i) => &i.name,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            CatalogInfo::Workspace(i) => &i.id,
            CatalogInfo::Namespace(i) => &i.id,
            CatalogInfo::Store(i) => &i.id,
            CatalogInfo::Resource(i) => &i.id,
            CatalogInfo::Layer(i) => &i.id,
            CatalogInfo::LayerGroup(i) => &i.id,
            CatalogInfo::Style(i) => &i.id,
        }
    }
}

impl std::fmt::Display for CatalogInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogInfo::Workspace(i) => write!(f, "workspace '{}'", i.name),
            CatalogInfo::Namespace(i) => write!(f, "namespace '{}'", i.prefix),
            CatalogInfo::Store(i) => write!(f, "{} '{}:{}'", i.kind, i.workspace, i.name),
            CatalogInfo::Resource(i) => write!(f, "{} '{}:{}'", i.kind, i.workspace, i.name),
            CatalogInfo::Layer(i) => write!(f, "layer '{}:{}'", i.workspace, i.name),
            CatalogInfo::LayerGroup(i) => write!(f, "layer group '{}'", i.name),
            CatalogInfo::Style(i) => write!(f, "style '{}'", i.name),
        }
    }
}

macro_rules! impl_from_info {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for CatalogInfo {
                fn from(info: $ty) -> Self {
                    CatalogInfo::$variant(info)
                }
            }
        )*
    };
}

impl_from_info! {
    Workspace => WorkspaceInfo,
    Namespace => NamespaceInfo,
    Store => StoreInfo,
    Resource => ResourceInfo,
    Layer => LayerInfo,
    LayerGroup => LayerGroupInfo,
    Style => StyleInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_pair_up() {
        for kind in StoreKind::PROBE_ORDER {
            assert_eq!(kind.resource_kind().store_kind(), kind);
        }
        assert_eq!(StoreKind::Coverage.descriptor(), "coveragestore.xml");
        assert_eq!(ResourceKind::WmsLayer.descriptor(), "wmslayer.xml");
    }

    #[test]
    fn store_error_is_never_serialized() {
        let mut store = StoreInfo::new(StoreKind::Vector, "topp", "states");
        store.error = Some("connection refused".to_string());
        let yaml = serde_yaml::to_string(&store).unwrap();
        assert!(!yaml.contains("connection refused"));
        let back: StoreInfo = serde_yaml::from_str(&yaml).unwrap();
        assert!(back.error.is_none());
        assert!(back.enabled);
    }

    #[test]
    fn published_ref_is_tagged() {
        let yaml = "type: group\nname: base\n";
        let r: PublishedRef = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            r,
            PublishedRef::Group {
                workspace: None,
                name: "base".to_string()
            }
        );
        assert_eq!(r.to_string(), "group base");
    }

    #[test]
    fn projection_policy_wire_names() {
        let p: ProjectionPolicy = serde_yaml::from_str("NONE").unwrap();
        assert_eq!(p, ProjectionPolicy::KeepNative);
        let p: ProjectionPolicy = serde_yaml::from_str("REPROJECT_TO_DECLARED").unwrap();
        assert_eq!(p, ProjectionPolicy::ReprojectToDeclared);
    }

    #[test]
    fn catalog_info_display() {
        let info: CatalogInfo = StoreInfo::new(StoreKind::Wms, "topp", "remote").into();
        assert_eq!(info.to_string(), "wms store 'topp:remote'");
        assert_eq!(info.name(), "remote");
    }
}
