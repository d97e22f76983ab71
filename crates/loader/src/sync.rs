//! Committing freshly built instances into the live ones.

use geocat_catalog::{Catalog, GeoServer, ListenerKind};
use tracing::{debug, info};

/// Replace the contents of `live` with `fresh`, keeping every externally
/// registered listener.
///
/// `live` is expected to be held under the live catalog's write lock for the
/// whole call, so readers see either the old or the new catalog. Returns the
/// number of listeners carried over.
pub fn synchronize(live: &mut Catalog, fresh: Catalog) -> usize {
    // `fresh` brings its own internal listeners.
    let dropped = live.remove_internal_listeners();
    let external = live.external_listeners();
    debug!(dropped, external = external.len(), "detached live catalog listeners");

    live.sync_from(fresh);
    for listener in &external {
        live.add_listener(listener.clone());
    }

    info!(
        summary = ?live.summary(),
        internal = live.listener_count(ListenerKind::Internal),
        external = external.len(),
        "catalog synchronized"
    );
    external.len()
}

/// Replace the live configuration's contents with `fresh`; its listeners stay.
pub fn commit_config(live: &mut GeoServer, fresh: GeoServer) {
    live.sync_from(fresh);
    info!(summary = ?live.summary(), "configuration committed");
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use geocat_catalog::{CatalogEvent, CatalogListener};
    use geocat_core::WorkspaceInfo;

    use super::*;

    #[derive(Default)]
    struct Counter(AtomicUsize);

    impl CatalogListener for Counter {
        fn handle_event(&self, _catalog: &Catalog, _event: &CatalogEvent) -> anyhow::Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn external_listeners_survive_and_internal_ones_are_not_duplicated() {
        let mut live = Catalog::new();
        live.add_workspace(WorkspaceInfo::new("old")).unwrap();
        let counter = Arc::new(Counter::default());
        live.add_listener(counter.clone());

        let mut fresh = Catalog::new();
        fresh.add_workspace(WorkspaceInfo::new("topp")).unwrap();

        assert_eq!(synchronize(&mut live, fresh), 1);
        assert!(live.workspace("old").is_none());
        assert_eq!(live.default_workspace().unwrap().name, "topp");
        assert_eq!(live.listener_count(ListenerKind::Internal), 1);
        assert_eq!(live.listener_count(ListenerKind::External), 1);

        let before = counter.0.load(Ordering::SeqCst);
        live.add_workspace(WorkspaceInfo::new("sf")).unwrap();
        assert!(counter.0.load(Ordering::SeqCst) > before);
    }

    #[test]
    fn repeated_synchronization_is_stable() {
        let mut live = Catalog::new();
        live.add_listener(Arc::new(Counter::default()));
        for _ in 0..3 {
            synchronize(&mut live, Catalog::new());
        }
        assert_eq!(live.listener_count(ListenerKind::Internal), 1);
        assert_eq!(live.listener_count(ListenerKind::External), 1);
    }
}
