//! Global server configuration: settings, logging and pluggable services.

use std::collections::BTreeMap;
use std::sync::Arc;

use geocat_core::entity::new_id;
use geocat_core::{GeoServerInfo, LoggingInfo, ServiceInfo, SettingsInfo};
use tracing::warn;

use crate::error::ConfigError;

/// A mutation applied to a [`GeoServer`].
#[derive(Debug, Clone)]
pub enum ConfigEvent {
    GlobalChanged(GeoServerInfo),
    LoggingChanged(LoggingInfo),
    SettingsAdded(SettingsInfo),
    ServiceAdded(ServiceInfo),
}

/// Observer of configuration mutations.
pub trait ConfigListener: Send + Sync {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn handle_event(&self, event: &ConfigEvent) -> anyhow::Result<()>;
}

/// Entity counts for summaries.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ConfigSummary {
    pub workspace_settings: usize,
    pub global_services: usize,
    pub workspace_services: usize,
}

#[derive(Default)]
pub struct GeoServer {
    global: GeoServerInfo,
    logging: LoggingInfo,
    settings: BTreeMap<String, SettingsInfo>,
    services: Vec<ServiceInfo>,
    listeners: Vec<Arc<dyn ConfigListener>>,
}

impl std::fmt::Debug for GeoServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeoServer")
            .field("global", &self.global.id)
            .field("summary", &self.summary())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl GeoServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: Arc<dyn ConfigListener>) {
        self.listeners.push(listener);
    }

    pub fn remove_listener(&mut self, listener: &Arc<dyn ConfigListener>) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| {
            !std::ptr::eq(
                Arc::as_ptr(l) as *const (),
                Arc::as_ptr(listener) as *const (),
            )
        });
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn fire(&self, event: ConfigEvent) -> Result<(), ConfigError> {
        let mut failures = Vec::new();
        for listener in &self.listeners {
            if let Err(e) = listener.handle_event(&event) {
                warn!(listener = listener.name(), error = %e, "configuration listener failed");
                failures.push(format!("{}: {:#}", listener.name(), e));
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Listener(failures.join("; ")))
        }
    }

    pub fn global(&self) -> &GeoServerInfo {
        &self.global
    }

    pub fn set_global(&mut self, global: GeoServerInfo) -> Result<(), ConfigError> {
        self.global = global.clone();
        self.fire(ConfigEvent::GlobalChanged(global))
    }

    pub fn logging(&self) -> &LoggingInfo {
        &self.logging
    }

    pub fn set_logging(&mut self, logging: LoggingInfo) -> Result<(), ConfigError> {
        self.logging = logging.clone();
        self.fire(ConfigEvent::LoggingChanged(logging))
    }

    /// Register a workspace settings override. At most one per workspace.
    pub fn add_settings(&mut self, mut settings: SettingsInfo) -> Result<(), ConfigError> {
        let workspace = settings
            .workspace
            .clone()
            .ok_or(ConfigError::SettingsWithoutWorkspace)?;
        if self.settings.contains_key(&workspace) {
            return Err(ConfigError::DuplicateSettings(workspace));
        }
        if settings.id.is_empty() {
            settings.id = new_id("SettingsInfo");
        }
        self.settings.insert(workspace, settings.clone());
        self.fire(ConfigEvent::SettingsAdded(settings))
    }

    pub fn settings(&self, workspace: &str) -> Option<&SettingsInfo> {
        self.settings.get(workspace)
    }

    pub fn all_settings(&self) -> impl Iterator<Item = &SettingsInfo> {
        self.settings.values()
    }

    /// Register a service. One service per type and scope (global or a workspace).
    pub fn add_service(&mut self, mut service: ServiceInfo) -> Result<(), ConfigError> {
        let clash = self.services.iter().any(|s| {
            s.workspace == service.workspace
                && s.service_type.eq_ignore_ascii_case(&service.service_type)
        });
        if clash {
            return Err(ConfigError::DuplicateService {
                service_type: service.service_type,
                scope: match service.workspace {
                    Some(ws) => format!("workspace '{}'", ws),
                    None => "the global scope".to_string(),
                },
            });
        }
        if service.id.is_empty() {
            service.id = new_id("ServiceInfo");
        }
        self.services.push(service.clone());
        self.fire(ConfigEvent::ServiceAdded(service))
    }

    /// Look up a service by type in `workspace`, or globally when `None`.
    pub fn service(&self, service_type: &str, workspace: Option<&str>) -> Option<&ServiceInfo> {
        self.services.iter().find(|s| {
            s.workspace.as_deref() == workspace && s.service_type.eq_ignore_ascii_case(service_type)
        })
    }

    pub fn services(&self) -> impl Iterator<Item = &ServiceInfo> {
        self.services.iter()
    }

    pub fn summary(&self) -> ConfigSummary {
        let global_services = self.services.iter().filter(|s| s.workspace.is_none()).count();
        ConfigSummary {
            workspace_settings: self.settings.len(),
            global_services,
            workspace_services: self.services.len() - global_services,
        }
    }

    /// Reset every entity to its default. Listeners stay registered.
    pub fn dispose(&mut self) {
        self.global = GeoServerInfo::default();
        self.logging = LoggingInfo::default();
        self.settings.clear();
        self.services.clear();
    }

    /// Take all entities from `other`, keeping this instance's listeners.
    pub fn sync_from(&mut self, other: GeoServer) {
        self.global = other.global;
        self.logging = other.logging;
        self.settings = other.settings;
        self.services = other.services;
    }
}
