use thiserror::Error;

/// Errors produced by [`Catalog`](crate::Catalog) mutations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{kind} '{name}' already exists")]
    Duplicate { kind: &'static str, name: String },

    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    #[error("invalid {kind} '{name}': {reason}")]
    Invalid {
        kind: &'static str,
        name: String,
        reason: String,
    },

    /// The mutation was applied but one or more listeners failed to handle it.
    #[error("catalog listener failure: {0}")]
    Listener(String),
}

/// Errors produced by [`GeoServer`](crate::GeoServer) configuration mutations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("settings for workspace '{0}' already exist")]
    DuplicateSettings(String),

    #[error("settings must belong to a workspace")]
    SettingsWithoutWorkspace,

    #[error("service '{service_type}' already configured for {scope}")]
    DuplicateService { service_type: String, scope: String },

    /// The mutation was applied but one or more listeners failed to handle it.
    #[error("configuration listener failure: {0}")]
    Listener(String),
}
