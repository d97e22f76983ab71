//! Loads a GeoServer-style data directory into a live catalog and configuration.
//!
//! This crate provides:
//! - Detection of the legacy and CURRENT on-disk layouts
//! - Per-descriptor failure isolation while materializing the catalog and configuration
//! - One-shot migration of the legacy layout, with default importers
//! - Listener-preserving swaps into the live instances
//! - Built-in style seeding, pluggable service loaders and post-load hooks

pub mod detect;
pub mod error;
pub mod extensions;
mod initializer;
pub mod legacy;
pub mod loader;
pub mod materialize;
pub mod styles;
pub mod sync;

pub use detect::{detect, DetectedFormats, Format};
pub use error::{HookOutcome, LoadReport, LoadResult, LoadStatus, LoaderError};
pub use extensions::{
    DescriptorServiceLoader, Extensions, GeoServerInitializer, GeoServerReinitializer,
    ServiceLoader,
};
pub use legacy::{LegacyCatalogImporter, LegacyConfigImporter};
pub use loader::{GeoServerLoader, LoaderOptions};
pub use styles::{BuiltinStyle, BUILTIN_STYLES};
