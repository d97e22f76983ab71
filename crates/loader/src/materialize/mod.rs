//! Materializers: build fresh catalog and configuration instances from a
//! CURRENT-layout tree, isolating failures per descriptor.

mod catalog;
mod config;

#[cfg(test)]
mod tests;

pub use self::catalog::{CatalogMaterializer, MaterializedCatalog};
pub use self::config::ConfigMaterializer;
