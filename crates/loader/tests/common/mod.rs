//! Shared fixtures for the loader integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use geocat_catalog::{LiveCatalog, LiveGeoServer, NoopProbe};
use geocat_core::ResourceTree;
use geocat_loader::GeoServerLoader;
use tempfile::TempDir;

pub fn data_dir() -> (TempDir, ResourceTree) {
    let dir = TempDir::new().expect("create tempdir");
    let tree = ResourceTree::new(dir.path());
    (dir, tree)
}

pub fn put(tree: &ResourceTree, path: &str, content: &str) {
    tree.get(path)
        .write(content.as_bytes())
        .unwrap_or_else(|e| panic!("failed to write {path}: {e}"));
}

/// `topp` with its namespace, a shapefile store and the `states` layer.
pub fn topp(tree: &ResourceTree) {
    put(tree, "workspaces/topp/workspace.xml", "name: topp\n");
    put(
        tree,
        "workspaces/topp/namespace.xml",
        "prefix: topp\nuri: http://www.openplans.org/topp\n",
    );
    put(
        tree,
        "workspaces/topp/states_shapefile/datastore.xml",
        "name: states_shapefile\nconnection_parameters:\n  url: file:data/states.shp\n",
    );
    put(
        tree,
        "workspaces/topp/states_shapefile/states/featuretype.xml",
        "name: states\nsrs: EPSG:4326\n",
    );
    put(
        tree,
        "workspaces/topp/states_shapefile/states/layer.xml",
        "name: states\ndefault_style:\n  name: polygon\n",
    );
}

/// Legacy `catalog.xml` + `services.xml` describing `topp:states`.
pub fn legacy(tree: &ResourceTree) {
    put(
        tree,
        "catalog.xml",
        "\
namespaces:
  - prefix: topp
    uri: http://www.openplans.org/topp
    default: true
datastores:
  - id: states_shapefile
    namespace: topp
    connection_parameters:
      url: file:data/states.shp
styles:
  - id: polygon
    file: default_polygon.sld
",
    );
    put(
        tree,
        "featureTypes/states_shapefile_states/info.xml",
        "name: states\ndatastore: states_shapefile\ndefault_style: polygon\n",
    );
    put(tree, "featureTypes/states_shapefile_states/content.ftl", "${name}");
    put(
        tree,
        "services.xml",
        "\
global:
  feature_type_cache_size: 250
services:
  - name: wms
    service_type: WMS
",
    );
}

/// Loader over `tree` that accepts every store.
pub fn loader(tree: &ResourceTree) -> GeoServerLoader {
    GeoServerLoader::new(tree.clone()).with_probe(Arc::new(NoopProbe))
}

pub fn live() -> (LiveCatalog, LiveGeoServer) {
    (LiveCatalog::default(), LiveGeoServer::default())
}
