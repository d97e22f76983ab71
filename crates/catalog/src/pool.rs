//! Store connectivity: probes and the per-catalog connection cache.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use anyhow::bail;
use geocat_core::{CatalogInfo, ResourceTree, StoreInfo};
use tracing::debug;

use crate::catalog::Catalog;
use crate::event::{CatalogEvent, CatalogListener};

/// Checks whether a store's backing data can actually be reached.
pub trait StoreProbe: Send + Sync {
    fn probe(&self, store: &StoreInfo) -> anyhow::Result<()>;
}

/// Accepts every store.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProbe;

impl StoreProbe for NoopProbe {
    fn probe(&self, _store: &StoreInfo) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Connection parameters that may point at local files.
const FILE_PARAMETERS: &[&str] = &["url", "directory", "file", "database"];

/// Verifies that `file:` connection parameters point at something on disk.
///
/// Relative locations are resolved against the data directory. Stores with no
/// file-based parameter (remote databases, cascaded WMS) always pass.
#[derive(Debug, Clone)]
pub struct FileSystemProbe {
    data_dir: PathBuf,
}

impl FileSystemProbe {
    pub fn new(tree: &ResourceTree) -> Self {
        Self {
            data_dir: tree.root().to_path_buf(),
        }
    }

    fn resolve(&self, location: &str) -> PathBuf {
        let path = Path::new(location);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir.join(path)
        }
    }
}

impl StoreProbe for FileSystemProbe {
    fn probe(&self, store: &StoreInfo) -> anyhow::Result<()> {
        for key in FILE_PARAMETERS {
            let Some(value) = store.connection_parameters.get(*key) else {
                continue;
            };
            let Some(location) = value.strip_prefix("file:") else {
                continue;
            };
            let path = self.resolve(location.trim_start_matches("//"));
            if !path.exists() {
                bail!("{} '{}' does not exist ({})", key, value, path.display());
            }
        }
        Ok(())
    }
}

/// Cache of stores known to be reachable, owned by one catalog instance.
///
/// Registered on its catalog as an internal listener: modifying or removing a
/// store evicts it so the next lookup probes again.
#[derive(Debug, Default)]
pub struct ResourcePool {
    connected: Mutex<HashSet<String>>,
}

impl ResourcePool {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(store: &StoreInfo) -> String {
        format!("{}:{}", store.workspace, store.name)
    }

    /// Probe `store` unless it is already known to be reachable.
    pub fn connect(&self, store: &StoreInfo, probe: &dyn StoreProbe) -> anyhow::Result<()> {
        let key = Self::key(store);
        if self.is_connected_key(&key) {
            return Ok(());
        }
        probe.probe(store)?;
        self.lock().insert(key);
        Ok(())
    }

    pub fn is_connected(&self, store: &StoreInfo) -> bool {
        self.is_connected_key(&Self::key(store))
    }

    fn is_connected_key(&self, key: &str) -> bool {
        self.lock().contains(key)
    }

    /// Forget every cached connection.
    pub fn dispose(&self) {
        self.lock().clear();
    }

    fn evict(&self, store: &StoreInfo) {
        if self.lock().remove(&Self::key(store)) {
            debug!(store = %store.name, workspace = %store.workspace, "evicted cached store connection");
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        self.connected.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CatalogListener for ResourcePool {
    fn name(&self) -> &str {
        "resource-pool"
    }

    fn handle_event(&self, _catalog: &Catalog, event: &CatalogEvent) -> anyhow::Result<()> {
        match event {
            CatalogEvent::Modified {
                before: CatalogInfo::Store(store),
                ..
            }
            | CatalogEvent::Removed(CatalogInfo::Store(store)) => self.evict(store),
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geocat_core::StoreKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProbe(AtomicUsize);

    impl StoreProbe for CountingProbe {
        fn probe(&self, _store: &StoreInfo) -> anyhow::Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn file_probe_checks_file_urls() {
        let dir = tempfile::TempDir::new().unwrap();
        let tree = ResourceTree::new(dir.path());
        std::fs::create_dir_all(dir.path().join("data/shapes")).unwrap();
        let probe = FileSystemProbe::new(&tree);

        let ok = StoreInfo::new(StoreKind::Vector, "topp", "shapes").with_parameter("url", "file:data/shapes");
        assert!(probe.probe(&ok).is_ok());

        let missing =
            StoreInfo::new(StoreKind::Vector, "topp", "gone").with_parameter("url", "file:data/nothing-here");
        let err = probe.probe(&missing).unwrap_err();
        assert!(err.to_string().contains("does not exist"));

        let remote = StoreInfo::new(StoreKind::Wms, "topp", "remote")
            .with_parameter("url", "http://example.com/wms?request=GetCapabilities");
        assert!(probe.probe(&remote).is_ok());
    }

    #[test]
    fn pool_caches_successful_probes() {
        let pool = ResourcePool::new();
        let probe = CountingProbe(AtomicUsize::new(0));
        let store = StoreInfo::new(StoreKind::Vector, "topp", "states");

        pool.connect(&store, &probe).unwrap();
        pool.connect(&store, &probe).unwrap();
        assert_eq!(probe.0.load(Ordering::SeqCst), 1);
        assert!(pool.is_connected(&store));

        pool.dispose();
        assert!(!pool.is_connected(&store));
    }
}
