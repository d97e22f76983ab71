//! Process-lifetime shared handles to the catalog and configuration.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::catalog::Catalog;
use crate::geoserver::GeoServer;

/// Shared, lock-protected [`Catalog`]. Clones point at the same instance.
#[derive(Debug, Clone, Default)]
pub struct LiveCatalog {
    inner: Arc<RwLock<Catalog>>,
}

impl LiveCatalog {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            inner: Arc::new(RwLock::new(catalog)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Catalog> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Exclusive access; loads and reloads hold this for the whole swap.
    pub fn write(&self) -> RwLockWriteGuard<'_, Catalog> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Shared, lock-protected [`GeoServer`] configuration.
#[derive(Debug, Clone, Default)]
pub struct LiveGeoServer {
    inner: Arc<RwLock<GeoServer>>,
}

impl LiveGeoServer {
    pub fn new(geoserver: GeoServer) -> Self {
        Self {
            inner: Arc::new(RwLock::new(geoserver)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, GeoServer> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, GeoServer> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geocat_core::WorkspaceInfo;

    #[test]
    fn clones_share_one_catalog() {
        let live = LiveCatalog::default();
        let other = live.clone();
        live.write().add_workspace(WorkspaceInfo::new("topp")).unwrap();
        assert!(other.read().workspace("topp").is_some());
    }
}
