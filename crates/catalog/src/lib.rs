//! In-memory catalog and server configuration, plus their CURRENT-layout persisters.

pub mod catalog;
pub mod error;
pub mod event;
pub mod geoserver;
pub mod live;
pub mod pool;
pub mod store;

pub use catalog::{Catalog, CatalogSummary, ResolveReport};
pub use error::{CatalogError, ConfigError};
pub use event::{CatalogEvent, CatalogListener, ListenerKind};
pub use geoserver::{ConfigEvent, ConfigListener, ConfigSummary, GeoServer};
pub use live::{LiveCatalog, LiveGeoServer};
pub use pool::{FileSystemProbe, NoopProbe, ResourcePool, StoreProbe};
pub use store::{CatalogPersister, ConfigPersister, PersistError};
