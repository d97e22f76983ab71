//! Catalog change notifications and the listener registry.

use std::sync::Arc;

use geocat_core::{CatalogInfo, WorkspaceInfo};

use crate::catalog::Catalog;

/// A mutation applied to a [`Catalog`].
#[derive(Debug, Clone)]
pub enum CatalogEvent {
    Added(CatalogInfo),
    Modified {
        before: CatalogInfo,
        after: CatalogInfo,
    },
    Removed(CatalogInfo),
    DefaultWorkspaceChanged {
        previous: Option<WorkspaceInfo>,
        current: Option<WorkspaceInfo>,
    },
}

/// Observer of catalog mutations.
///
/// Listeners run synchronously, after the mutation has been applied, with
/// read access to the updated catalog.
pub trait CatalogListener: Send + Sync {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn handle_event(&self, catalog: &Catalog, event: &CatalogEvent) -> anyhow::Result<()>;
}

/// Whether a listener belongs to the catalog itself or was registered from outside.
///
/// Internal listeners are re-created with every new catalog instance, so they are
/// never carried across a [`Catalog::sync_from`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerKind {
    Internal,
    External,
}

#[derive(Clone)]
pub(crate) struct Registration {
    pub(crate) listener: Arc<dyn CatalogListener>,
    pub(crate) kind: ListenerKind,
}
