//! Error types and load report structures for the loader.

use chrono::{DateTime, Utc};
use geocat_catalog::{CatalogError, CatalogSummary, ConfigError, ConfigSummary, ResolveReport};
use geocat_core::TreeError;
use serde::Serialize;

use crate::detect::Format;

/// Failures that abort a load or reload.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    /// The legacy importer gave up; a half-migrated tree is not used.
    #[error("legacy import of {marker} failed: {source:#}")]
    LegacyImport {
        marker: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// Renaming a legacy marker or relocating legacy files failed.
    #[error("migration step failed: {0}")]
    Migration(#[from] TreeError),

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result alias for loader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;

/// Outcome of materializing one descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadResult {
    /// Tree path of the descriptor or directory.
    pub path: String,
    #[serde(flatten)]
    pub status: LoadStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum LoadStatus {
    Loaded { entity: String },
    /// Nothing to load here (missing optional descriptor, unrecognized directory).
    Skipped { reason: String },
    Failed { error: String },
}

impl LoadResult {
    pub fn loaded(path: impl Into<String>, entity: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            status: LoadStatus::Loaded {
                entity: entity.into(),
            },
        }
    }

    pub fn skipped(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            status: LoadStatus::Skipped {
                reason: reason.into(),
            },
        }
    }

    pub fn failed(path: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self {
            path: path.into(),
            status: LoadStatus::Failed {
                error: error.to_string(),
            },
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, LoadStatus::Failed { .. })
    }
}

/// Outcome of one initializer, reinitializer or service loader invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HookOutcome {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HookOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Everything a load or reload did.
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub catalog_format: Format,
    pub config_format: Format,
    pub catalog: CatalogSummary,
    pub config: ConfigSummary,
    pub resolve: ResolveReport,
    /// Stores disabled because their connectivity probe failed (`ws:store`).
    pub disabled_stores: Vec<String>,
    /// Built-in styles seeded by this run.
    pub styles_created: Vec<String>,
    pub hooks: Vec<HookOutcome>,
    pub results: Vec<LoadResult>,
    pub completed_at: DateTime<Utc>,
}

impl LoadReport {
    pub fn failures(&self) -> impl Iterator<Item = &LoadResult> {
        self.results.iter().filter(|r| r.is_failed())
    }

    pub fn hook_failures(&self) -> impl Iterator<Item = &HookOutcome> {
        self.hooks.iter().filter(|h| !h.succeeded())
    }
}
