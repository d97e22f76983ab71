use std::sync::Arc;

use geocat_core::{
    EntityCodec, GeoServerInfo, LayerInfo, NamespaceInfo, ResourceInfo, ResourceKind,
    ResourceTree, ServiceInfo, SettingsInfo, StoreInfo, StoreKind, StyleInfo, WorkspaceInfo,
    YamlCodec,
};
use tempfile::TempDir;

use super::*;
use crate::catalog::Catalog;
use crate::geoserver::GeoServer;

fn persisted_catalog() -> (TempDir, ResourceTree, Catalog) {
    let dir = TempDir::new().expect("create tempdir");
    let tree = ResourceTree::new(dir.path());
    let mut cat = Catalog::new();
    cat.add_listener(Arc::new(CatalogPersister::new(tree.clone(), YamlCodec)));
    (dir, tree, cat)
}

#[test]
fn layout_paths() {
    assert_eq!(workspace_path("topp"), "workspaces/topp/workspace.xml");
    assert_eq!(default_marker_path("topp"), "workspaces/topp/default.xml");
    let store = StoreInfo::new(StoreKind::Coverage, "nurc", "mosaic");
    assert_eq!(store_path(&store), "workspaces/nurc/mosaic/coveragestore.xml");
    let cov = ResourceInfo::new(ResourceKind::Coverage, "nurc", "mosaic", "mosaic");
    assert_eq!(resource_path(&cov), "workspaces/nurc/mosaic/mosaic/coverage.xml");
    assert_eq!(layer_path(&cov), "workspaces/nurc/mosaic/mosaic/layer.xml");
    assert_eq!(style_path(None, "point"), "styles/point.xml");
    assert_eq!(style_path(Some("topp"), "x"), "workspaces/topp/styles/x.xml");
    assert_eq!(layer_group_path(None, "base"), "layergroups/base.xml");
    assert_eq!(service_path(None, "WMS"), "wms.xml");
    assert_eq!(service_path(Some("topp"), "WFS"), "workspaces/topp/wfs.xml");
}

#[test]
fn catalog_additions_are_written_in_current_layout() {
    let (_dir, tree, mut cat) = persisted_catalog();
    cat.add_workspace(WorkspaceInfo::new("topp")).unwrap();
    cat.add_namespace(NamespaceInfo::new("topp", "http://www.openplans.org/topp"))
        .unwrap();
    cat.add_store(StoreInfo::new(StoreKind::Vector, "topp", "states_shapefile"))
        .unwrap();
    let ft = ResourceInfo::new(ResourceKind::FeatureType, "topp", "states_shapefile", "states");
    cat.add_resource(ft.clone()).unwrap();
    cat.add_layer(LayerInfo::for_resource(&ft)).unwrap();
    cat.add_style(StyleInfo::new("polygon", "polygon.sld")).unwrap();

    for path in [
        "workspaces/topp/workspace.xml",
        "workspaces/topp/namespace.xml",
        "workspaces/topp/default.xml",
        "workspaces/topp/states_shapefile/datastore.xml",
        "workspaces/topp/states_shapefile/states/featuretype.xml",
        "workspaces/topp/states_shapefile/states/layer.xml",
        "styles/polygon.xml",
    ] {
        assert!(tree.get(path).is_file(), "{path} should exist");
    }

    let marker: WorkspaceInfo = YamlCodec
        .depersist(&tree.get("workspaces/topp/default.xml"))
        .unwrap();
    assert_eq!(marker.name, "topp");
}

#[test]
fn default_change_moves_the_marker() {
    let (_dir, tree, mut cat) = persisted_catalog();
    cat.add_workspace(WorkspaceInfo::new("a")).unwrap();
    cat.add_workspace(WorkspaceInfo::new("b")).unwrap();
    assert!(tree.get("workspaces/a/default.xml").exists());

    cat.set_default_workspace("b").unwrap();
    assert!(!tree.get("workspaces/a/default.xml").exists());
    assert!(tree.get("workspaces/b/default.xml").exists());
}

#[test]
fn removal_deletes_the_descriptor() {
    let (_dir, tree, mut cat) = persisted_catalog();
    cat.add_workspace(WorkspaceInfo::new("topp")).unwrap();
    cat.add_store(StoreInfo::new(StoreKind::Vector, "topp", "roads"))
        .unwrap();
    let ft = ResourceInfo::new(ResourceKind::FeatureType, "topp", "roads", "roads");
    cat.add_resource(ft.clone()).unwrap();
    cat.add_layer(LayerInfo::for_resource(&ft)).unwrap();

    let layer = tree.get("workspaces/topp/roads/roads/layer.xml");
    assert!(layer.exists());
    cat.remove_layer("topp", "roads").unwrap();
    assert!(!layer.exists());
    assert!(tree.get("workspaces/topp/roads/roads/featuretype.xml").exists());
}

#[test]
fn store_modification_rewrites_descriptor() {
    let (_dir, tree, mut cat) = persisted_catalog();
    cat.add_workspace(WorkspaceInfo::new("topp")).unwrap();
    let store = StoreInfo::new(StoreKind::Vector, "topp", "roads");
    cat.add_store(store.clone()).unwrap();

    let mut disabled = store;
    disabled.enabled = false;
    disabled.error = Some("connection refused".to_string());
    cat.save_store(disabled).unwrap();

    let back: StoreInfo = YamlCodec
        .depersist(&tree.get("workspaces/topp/roads/datastore.xml"))
        .unwrap();
    assert!(!back.enabled);
    assert!(back.error.is_none());
}

#[test]
fn configuration_is_written_in_current_layout() {
    let dir = TempDir::new().expect("create tempdir");
    let tree = ResourceTree::new(dir.path());
    let mut gs = GeoServer::new();
    gs.add_listener(Arc::new(ConfigPersister::new(tree.clone(), YamlCodec)));

    gs.set_global(GeoServerInfo::default()).unwrap();
    gs.add_settings(SettingsInfo::for_workspace("topp")).unwrap();
    gs.add_service(ServiceInfo::new("WMS")).unwrap();
    let mut scoped = ServiceInfo::new("WFS");
    scoped.workspace = Some("topp".to_string());
    gs.add_service(scoped).unwrap();

    assert!(tree.get("global.xml").is_file());
    assert!(!tree.get("logging.xml").exists());
    assert!(tree.get("workspaces/topp/settings.xml").is_file());
    assert!(tree.get("wms.xml").is_file());
    assert!(tree.get("workspaces/topp/wfs.xml").is_file());
}
