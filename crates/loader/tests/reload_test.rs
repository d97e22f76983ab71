//! Reload behaviour: listener preservation, configuration reset and hooks.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use geocat_catalog::{
    Catalog, CatalogEvent, CatalogListener, ConfigEvent, ConfigListener, LiveCatalog,
    LiveGeoServer, ListenerKind,
};
use geocat_core::{CatalogInfo, ResourceTree, WorkspaceInfo};
use geocat_loader::{
    Extensions, GeoServerInitializer, GeoServerReinitializer, LegacyCatalogImporter, LoaderError,
};

use common::{data_dir, live, loader, put, topp};

#[derive(Default)]
struct Observer {
    events: AtomicUsize,
}

impl CatalogListener for Observer {
    fn name(&self) -> &str {
        "observer"
    }

    fn handle_event(&self, _catalog: &Catalog, _event: &CatalogEvent) -> anyhow::Result<()> {
        self.events.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
struct ConfigObserver {
    events: AtomicUsize,
}

impl ConfigListener for ConfigObserver {
    fn handle_event(&self, _event: &ConfigEvent) -> anyhow::Result<()> {
        self.events.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn external_observer_survives_reload() {
    let (_dir, tree) = data_dir();
    topp(&tree);

    let (catalog, geoserver) = live();
    let loader = loader(&tree);
    loader.load(&catalog, &geoserver).unwrap();

    let observer = Arc::new(Observer::default());
    catalog.write().add_listener(observer.clone());

    loader.reload(&catalog, &geoserver).unwrap();
    {
        let cat = catalog.read();
        assert_eq!(cat.listener_count(ListenerKind::External), 1);
        assert_eq!(cat.listener_count(ListenerKind::Internal), 1);
    }

    let before = observer.events.load(Ordering::SeqCst);
    catalog
        .write()
        .add_workspace(WorkspaceInfo::new("after_reload"))
        .unwrap();
    assert_eq!(observer.events.load(Ordering::SeqCst), before + 1);
}

#[test]
fn reload_resets_configuration_but_keeps_its_listeners() {
    let (_dir, tree) = data_dir();
    topp(&tree);
    put(&tree, "global.xml", "feature_type_cache_size: 42\n");

    let (catalog, geoserver) = live();
    let observer = Arc::new(ConfigObserver::default());
    geoserver.write().add_listener(observer.clone());

    let loader = loader(&tree);
    loader.load(&catalog, &geoserver).unwrap();
    assert_eq!(geoserver.read().global().feature_type_cache_size, 42);

    std::fs::remove_file(tree.get("global.xml").file_path()).unwrap();
    loader.reload(&catalog, &geoserver).unwrap();
    assert_eq!(geoserver.read().global().feature_type_cache_size, 100);
    assert_eq!(geoserver.read().listener_count(), 1);
}

struct Corrupt;

impl LegacyCatalogImporter for Corrupt {
    fn import(
        &self,
        _tree: &ResourceTree,
        _sink: &mut dyn FnMut(CatalogInfo) -> anyhow::Result<()>,
    ) -> anyhow::Result<()> {
        anyhow::bail!("truncated catalog.xml")
    }
}

#[test]
fn failed_reload_keeps_the_live_configuration() {
    let (_dir, tree) = data_dir();
    topp(&tree);
    put(&tree, "global.xml", "feature_type_cache_size: 42\n");

    let (catalog, geoserver) = live();
    let loader = loader(&tree).with_catalog_importer(Arc::new(Corrupt));
    loader.load(&catalog, &geoserver).unwrap();

    put(&tree, "catalog.xml", "namespaces: []\n");
    let err = loader.reload(&catalog, &geoserver).unwrap_err();
    assert!(matches!(err, LoaderError::LegacyImport { .. }));
    assert_eq!(geoserver.read().global().feature_type_cache_size, 42);
    assert!(catalog.read().layer("topp", "states").is_some());
}

#[test]
fn reload_picks_up_new_descriptors() {
    let (_dir, tree) = data_dir();
    topp(&tree);

    let (catalog, geoserver) = live();
    let loader = loader(&tree);
    loader.load(&catalog, &geoserver).unwrap();
    assert!(catalog.read().workspace("sf").is_none());

    put(&tree, "workspaces/sf/workspace.xml", "name: sf\n");
    let report = loader.reload(&catalog, &geoserver).unwrap();
    assert!(catalog.read().workspace("sf").is_some());
    assert_eq!(report.catalog.workspaces, 2);
    // The marker written on first load still names topp.
    assert_eq!(catalog.read().default_workspace().unwrap().name, "topp");
}

struct Hook {
    label: &'static str,
    fail: bool,
    calls: Arc<Mutex<Vec<String>>>,
}

impl Hook {
    fn new(label: &'static str, fail: bool, calls: &Arc<Mutex<Vec<String>>>) -> Arc<Self> {
        Arc::new(Self {
            label,
            fail,
            calls: Arc::clone(calls),
        })
    }
}

impl GeoServerInitializer for Hook {
    fn name(&self) -> &str {
        self.label
    }

    fn initialize(&self, catalog: &LiveCatalog, _geoserver: &LiveGeoServer) -> anyhow::Result<()> {
        let workspaces = catalog.read().workspaces().count();
        self.calls
            .lock()
            .unwrap()
            .push(format!("init {} ({workspaces})", self.label));
        if self.fail {
            anyhow::bail!("{} failed", self.label);
        }
        Ok(())
    }
}

impl GeoServerReinitializer for Hook {}

#[test]
fn hooks_run_isolated_after_a_complete_load() {
    let (_dir, tree) = data_dir();
    topp(&tree);
    let calls = Arc::new(Mutex::new(Vec::new()));
    let extensions = Extensions::new()
        .with_initializer(Hook::new("first", true, &calls))
        .with_initializer(Hook::new("second", false, &calls))
        .with_reinitializer(Hook::new("third", false, &calls));

    let (catalog, geoserver) = live();
    let loader = loader(&tree).with_extensions(extensions);
    let report = loader.load(&catalog, &geoserver).unwrap();

    assert_eq!(
        *calls.lock().unwrap(),
        vec!["init first (1)", "init second (1)", "init third (1)"]
    );
    let failed: Vec<_> = report.hook_failures().map(|h| h.name.as_str()).collect();
    assert_eq!(failed, vec!["first"]);

    calls.lock().unwrap().clear();
    let report = loader.reload(&catalog, &geoserver).unwrap();
    // Reinitializers fall back to `initialize` unless they override it.
    assert_eq!(*calls.lock().unwrap(), vec!["init third (1)"]);
    assert_eq!(report.hooks.len(), 1);
    assert!(report.hooks[0].succeeded());
}
