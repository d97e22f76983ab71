//! Tests for the catalog and configuration materializers.

use std::sync::Arc;

use geocat_catalog::{Catalog, GeoServer, StoreProbe};
use geocat_core::{
    EntityCodec, Resource, ResourceTree, ServiceInfo, StoreInfo, WorkspaceInfo, YamlCodec,
};
use tempfile::TempDir;

use super::*;
use crate::error::LoadStatus;
use crate::extensions::{DescriptorServiceLoader, ServiceLoader};

fn fixture() -> (TempDir, ResourceTree) {
    let dir = TempDir::new().expect("create tempdir");
    let tree = ResourceTree::new(dir.path());
    (dir, tree)
}

fn put(tree: &ResourceTree, path: &str, yaml: &str) {
    tree.get(path).write(yaml.as_bytes()).expect("write fixture");
}

/// `topp` with a namespace, a shapefile store, and `states` with its layer.
fn topp(tree: &ResourceTree) {
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

fn materialize(tree: &ResourceTree) -> MaterializedCatalog {
    CatalogMaterializer::new(tree, &YamlCodec)
        .materialize()
        .expect("materialize")
}

struct RefuseAll;

impl StoreProbe for RefuseAll {
    fn probe(&self, store: &StoreInfo) -> anyhow::Result<()> {
        anyhow::bail!("connection to {} refused", store.name)
    }
}

#[test]
fn loads_a_complete_workspace() {
    let (_dir, tree) = fixture();
    topp(&tree);
    put(&tree, "styles/polygon.xml", "name: polygon\nfilename: polygon.sld\n");

    let mut out = materialize(&tree);
    assert_eq!(out.catalog.resolve().unwrap().dropped_style_refs, 0);
    let cat = &out.catalog;
    assert!(cat.workspace("topp").is_some());
    assert!(cat.namespace("topp").is_some());
    let store = cat.store("topp", "states_shapefile").unwrap();
    assert_eq!(store.workspace, "topp");
    assert!(store.enabled);
    let layer = cat.layer("topp", "states").unwrap();
    assert_eq!(layer.resource, "states");
    assert_eq!(layer.default_style.as_ref().unwrap().name, "polygon");
    assert!(out.results.iter().all(|r| !r.is_failed()));
}

#[test]
fn workspace_without_namespace_still_loads_and_can_be_default() {
    let (_dir, tree) = fixture();
    put(&tree, "workspaces/bare/workspace.xml", "name: bare\n");
    put(&tree, "workspaces/bare/default.xml", "name: bare\n");
    topp(&tree);

    let out = materialize(&tree);
    let cat = &out.catalog;
    assert!(cat.workspace("bare").is_some());
    assert!(cat.namespace("bare").is_none());
    assert_eq!(cat.default_workspace().unwrap().name, "bare");
    assert_eq!(cat.default_namespace().unwrap().prefix, "topp");
    assert!(out
        .results
        .iter()
        .any(|r| r.path == "workspaces/bare/namespace.xml"
            && matches!(r.status, LoadStatus::Skipped { .. })));
}

#[test]
fn malformed_workspace_skips_the_whole_directory() {
    let (_dir, tree) = fixture();
    put(&tree, "workspaces/broken/workspace.xml", "name: [oops\n");
    put(
        &tree,
        "workspaces/broken/roads/datastore.xml",
        "name: roads\n",
    );
    topp(&tree);

    let out = materialize(&tree);
    assert_eq!(out.catalog.workspaces().count(), 1);
    assert!(out.catalog.store("broken", "roads").is_none());
    assert_eq!(out.results.iter().filter(|r| r.is_failed()).count(), 1);
}

#[test]
fn unrecognized_store_directory_is_skipped() {
    let (_dir, tree) = fixture();
    topp(&tree);
    tree.get("workspaces/topp/scratch").create_dir().unwrap();
    put(&tree, "workspaces/topp/scratch/readme.txt", "notes");

    let out = materialize(&tree);
    assert_eq!(out.catalog.stores().count(), 1);
    assert!(out.results.iter().any(|r| r.path == "workspaces/topp/scratch"
        && r.status
            == LoadStatus::Skipped {
                reason: "unrecognized directory".to_string()
            }));
}

#[test]
fn store_kind_follows_descriptor_priority() {
    let (_dir, tree) = fixture();
    put(&tree, "workspaces/nurc/workspace.xml", "name: nurc\n");
    put(&tree, "workspaces/nurc/mosaic/coveragestore.xml", "name: mosaic\n");
    put(&tree, "workspaces/nurc/mosaic/wmsstore.xml", "name: mosaic\n");
    put(&tree, "workspaces/nurc/mosaic/mosaic/coverage.xml", "name: mosaic\n");
    put(&tree, "workspaces/nurc/mosaic/mosaic/layer.xml", "name: mosaic\n");

    let out = materialize(&tree);
    let store = out.catalog.store("nurc", "mosaic").unwrap();
    assert_eq!(store.kind, geocat_core::StoreKind::Coverage);
    let cov = out.catalog.resource("nurc", "mosaic").unwrap();
    assert_eq!(cov.kind, geocat_core::ResourceKind::Coverage);
    assert!(out.catalog.layer("nurc", "mosaic").is_some());
}

#[test]
fn failed_probe_disables_store_but_keeps_resources() {
    let (_dir, tree) = fixture();
    topp(&tree);

    let probe = RefuseAll;
    let out = CatalogMaterializer::new(&tree, &YamlCodec)
        .with_probe(&probe)
        .materialize()
        .unwrap();
    let store = out.catalog.store("topp", "states_shapefile").unwrap();
    assert!(!store.enabled);
    assert!(store.error.as_deref().unwrap().contains("refused"));
    assert_eq!(out.disabled_stores, vec!["topp:states_shapefile".to_string()]);
    assert!(out.catalog.resource("topp", "states").is_some());
    assert!(out.catalog.layer("topp", "states").is_some());
}

#[test]
fn disabled_store_is_not_probed() {
    let (_dir, tree) = fixture();
    put(&tree, "workspaces/topp/workspace.xml", "name: topp\n");
    put(
        &tree,
        "workspaces/topp/offline/datastore.xml",
        "name: offline\nenabled: false\n",
    );

    let probe = RefuseAll;
    let out = CatalogMaterializer::new(&tree, &YamlCodec)
        .with_probe(&probe)
        .materialize()
        .unwrap();
    let store = out.catalog.store("topp", "offline").unwrap();
    assert!(!store.enabled);
    assert!(store.error.is_none());
    assert!(out.disabled_stores.is_empty());
}

#[test]
fn missing_layer_leaves_resource_without_layer() {
    let (_dir, tree) = fixture();
    topp(&tree);
    put(
        &tree,
        "workspaces/topp/states_shapefile/counties/featuretype.xml",
        "name: counties\n",
    );
    put(
        &tree,
        "workspaces/topp/states_shapefile/roads/featuretype.xml",
        "name: [bad\n",
    );

    let out = materialize(&tree);
    assert!(out.catalog.resource("topp", "counties").is_some());
    assert!(out.catalog.layer("topp", "counties").is_none());
    assert!(out.catalog.resource("topp", "roads").is_none());
    assert!(out.catalog.layer("topp", "states").is_some());
}

#[test]
fn empty_layer_groups_are_never_added() {
    let (_dir, tree) = fixture();
    topp(&tree);
    put(&tree, "layergroups/empty.xml", "name: empty\nlayers: []\n");
    put(
        &tree,
        "layergroups/ghosts.xml",
        "name: ghosts\nlayers:\n  - type: layer\n    workspace: topp\n    name: nothing\n",
    );
    put(
        &tree,
        "workspaces/topp/layergroups/base.xml",
        "name: base\nlayers:\n  - type: layer\n    workspace: topp\n    name: states\n",
    );

    for _ in 0..2 {
        let mut out = materialize(&tree);
        assert!(out.catalog.layer_group(None, "ghosts").is_some());
        let report = out.catalog.resolve().unwrap();
        assert_eq!(report.removed_groups, vec!["ghosts".to_string()]);
        let cat = &out.catalog;
        assert!(cat.layer_group(None, "empty").is_none());
        assert!(cat.layer_group(None, "ghosts").is_none());
        assert!(cat.layer_group(Some("topp"), "base").is_some());
    }
}

#[test]
fn double_extension_style_shadows_plain_descriptor() {
    let (_dir, tree) = fixture();
    put(&tree, "styles/point.xml", "name: point\nfilename: old.sld\n");
    put(&tree, "styles/point.xml.xml", "name: point\nfilename: point.sld\n");

    let out = materialize(&tree);
    assert_eq!(out.catalog.styles().count(), 1);
    assert_eq!(out.catalog.style_by_name("point").unwrap().filename, "point.sld");
}

#[test]
fn workspace_styles_are_scoped() {
    let (_dir, tree) = fixture();
    topp(&tree);
    put(&tree, "workspaces/topp/styles/local.xml", "name: local\nfilename: local.sld\n");

    let out = materialize(&tree);
    assert!(out.catalog.style(Some("topp"), "local").is_some());
    assert!(out.catalog.style_by_name("local").is_none());
}

#[test]
fn missing_marker_is_back_filled() {
    let (_dir, tree) = fixture();
    topp(&tree);
    put(&tree, "workspaces/zeta/workspace.xml", "name: zeta\n");

    let out = materialize(&tree);
    assert_eq!(out.catalog.default_workspace().unwrap().name, "topp");
    let marker: WorkspaceInfo = YamlCodec
        .depersist(&tree.get("workspaces/topp/default.xml"))
        .unwrap();
    assert_eq!(marker.name, "topp");

    let again = materialize(&tree);
    assert_eq!(again.catalog.default_workspace().unwrap().name, "topp");
}

#[test]
fn marker_naming_unknown_workspace_leaves_no_default() {
    let (_dir, tree) = fixture();
    topp(&tree);
    put(&tree, "workspaces/topp/default.xml", "name: elsewhere\n");

    let out = materialize(&tree);
    assert!(out.catalog.default_workspace().is_none());
    assert!(out.catalog.default_namespace().is_none());
}

#[test]
fn top_level_marker_is_honoured() {
    let (_dir, tree) = fixture();
    topp(&tree);
    put(&tree, "workspaces/sf/workspace.xml", "name: sf\n");
    put(
        &tree,
        "workspaces/sf/namespace.xml",
        "prefix: sf\nuri: http://www.openplans.org/spearfish\n",
    );
    put(&tree, "workspaces/default.xml", "name: sf\n");

    let out = materialize(&tree);
    assert_eq!(out.catalog.default_workspace().unwrap().name, "sf");
    assert_eq!(out.catalog.default_namespace().unwrap().prefix, "sf");
}

#[test]
fn missing_workspaces_directory_is_an_empty_catalog() {
    let (_dir, tree) = fixture();
    let out = materialize(&tree);
    assert_eq!(out.catalog.workspaces().count(), 0);
    assert!(out.results.iter().any(|r| r.path == "workspaces"));
}

// ── Configuration ───────────────────────────────────────────────

struct Exploding;

impl ServiceLoader for Exploding {
    fn name(&self) -> &str {
        "exploding"
    }

    fn service_type(&self) -> &str {
        "BOOM"
    }

    fn load(&self, _geoserver: &GeoServer, _dir: &Resource) -> anyhow::Result<ServiceInfo> {
        anyhow::bail!("service loader crashed")
    }
}

fn config_catalog() -> Catalog {
    let mut cat = Catalog::new();
    cat.add_workspace(WorkspaceInfo::new("topp")).unwrap();
    cat
}

#[test]
fn configuration_defaults_when_descriptors_are_absent() {
    let (_dir, tree) = fixture();
    let (gs, results) = ConfigMaterializer::new(&tree, &YamlCodec, &[])
        .materialize(&config_catalog())
        .unwrap();
    assert_eq!(gs.global().feature_type_cache_size, 100);
    assert_eq!(gs.logging().level, "DEFAULT_LOGGING.properties");
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| matches!(r.status, LoadStatus::Skipped { .. })));
}

#[test]
fn configuration_loads_global_settings_and_services() {
    let (_dir, tree) = fixture();
    put(&tree, "global.xml", "update_sequence: 7\nsettings:\n  title: My Server\n");
    put(&tree, "logging.xml", "level: VERBOSE_LOGGING.properties\n");
    put(&tree, "workspaces/topp/settings.xml", "title: Topp\n");
    put(&tree, "workspaces/ghost/settings.xml", "title: Nobody\n");
    put(&tree, "workspaces/topp/wms.xml", "name: wms\nservice_type: WMS\n");
    put(&tree, "workspaces/ghost/wms.xml", "name: wms\nservice_type: WMS\n");

    let loaders: Vec<Arc<dyn ServiceLoader>> = vec![
        Arc::new(DescriptorServiceLoader::new("WMS", YamlCodec)),
        Arc::new(Exploding),
        Arc::new(DescriptorServiceLoader::new("WFS", YamlCodec)),
    ];
    let (gs, results) = ConfigMaterializer::new(&tree, &YamlCodec, &loaders)
        .materialize(&config_catalog())
        .unwrap();

    assert_eq!(gs.global().update_sequence, 7);
    assert_eq!(gs.global().settings.title.as_deref(), Some("My Server"));
    assert_eq!(gs.logging().level, "VERBOSE_LOGGING.properties");
    assert_eq!(gs.settings("topp").unwrap().title.as_deref(), Some("Topp"));
    assert!(gs.settings("ghost").is_none());

    // Global defaults for both loaders plus the topp WMS override.
    assert!(gs.service("WMS", None).is_some());
    assert!(gs.service("WFS", None).is_some());
    assert!(gs.service("WMS", Some("topp")).is_some());
    assert!(gs.service("WFS", Some("topp")).is_none());
    // `ghost` has no workspace in the catalog, like its settings.
    assert!(gs.service("WMS", Some("ghost")).is_none());
    assert_eq!(gs.summary().workspace_services, 1);

    // Root and topp; the ghost directory is never handed to the loaders.
    let crashes = results
        .iter()
        .filter(|r| matches!(&r.status, LoadStatus::Failed { error } if error.contains("crashed")))
        .count();
    assert_eq!(crashes, 2);
}
