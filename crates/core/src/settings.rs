//! Global and workspace-scoped server configuration entities.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entity::new_id;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Presentation settings; global inside [`GeoServerInfo`], or a per-workspace override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsInfo {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub charset: String,
    pub num_decimals: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub online_resource: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_base_url: Option<String>,
    pub verbose: bool,
    pub verbose_exceptions: bool,
    pub contact: ContactInfo,
}

impl Default for SettingsInfo {
    fn default() -> Self {
        Self {
            id: String::new(),
            workspace: None,
            title: None,
            charset: "UTF-8".to_string(),
            num_decimals: 8,
            online_resource: None,
            proxy_base_url: None,
            verbose: false,
            verbose_exceptions: false,
            contact: ContactInfo::default(),
        }
    }
}

impl SettingsInfo {
    pub fn for_workspace(workspace: impl Into<String>) -> Self {
        Self {
            id: new_id("SettingsInfo"),
            workspace: Some(workspace.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoServerInfo {
    pub id: String,
    pub settings: SettingsInfo,
    pub update_sequence: u64,
    pub feature_type_cache_size: u32,
    /// Whether global services answer requests for workspace-less endpoints.
    pub global_services: bool,
    pub xml_post_request_log_buffer_size: u32,
}

impl Default for GeoServerInfo {
    fn default() -> Self {
        Self {
            id: "GeoServerInfo.global".to_string(),
            settings: SettingsInfo::default(),
            update_sequence: 0,
            feature_type_cache_size: 100,
            global_services: true,
            xml_post_request_log_buffer_size: 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingInfo {
    pub id: String,
    /// Logging profile name, e.g. `DEFAULT_LOGGING.properties`.
    pub level: String,
    pub location: String,
    pub stdout_logging: bool,
}

impl Default for LoggingInfo {
    fn default() -> Self {
        Self {
            id: "LoggingInfo.global".to_string(),
            level: "DEFAULT_LOGGING.properties".to_string(),
            location: "logs/geoserver.log".to_string(),
            stdout_logging: true,
        }
    }
}

/// Configuration of one pluggable service (WMS, WFS, ...), global or per workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInfo {
    #[serde(default)]
    pub id: String,
    pub name: String,
    /// Service type tag, e.g. `WMS`; also selects the descriptor file name.
    pub service_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintainer: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

fn default_true() -> bool {
    true
}

impl ServiceInfo {
    /// A fresh, enabled, global service of `service_type`.
    pub fn new(service_type: impl Into<String>) -> Self {
        let service_type = service_type.into();
        Self {
            id: new_id("ServiceInfo"),
            name: service_type.to_lowercase(),
            service_type,
            workspace: None,
            enabled: true,
            title: None,
            abstract_text: None,
            maintainer: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Descriptor file name for this service (`wms.xml` for `WMS`).
    pub fn descriptor(&self) -> String {
        crate::layout::descriptor_name(&self.service_type.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_descriptors_take_defaults() {
        let global: GeoServerInfo = serde_yaml::from_str("{}").unwrap();
        assert_eq!(global.feature_type_cache_size, 100);
        assert_eq!(global.settings.charset, "UTF-8");

        let logging: LoggingInfo = serde_yaml::from_str("level: VERBOSE_LOGGING.properties").unwrap();
        assert_eq!(logging.level, "VERBOSE_LOGGING.properties");
        assert!(logging.stdout_logging);
    }

    #[test]
    fn service_descriptor_name_and_abstract_field() {
        let yaml = "name: wms\nservice_type: WMS\nabstract: Web Map Service\n";
        let svc: ServiceInfo = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(svc.descriptor(), "wms.xml");
        assert_eq!(svc.abstract_text.as_deref(), Some("Web Map Service"));
        assert!(svc.enabled);
        assert!(svc.workspace.is_none());
    }

    #[test]
    fn workspace_settings_carry_workspace() {
        let s = SettingsInfo::for_workspace("topp");
        assert_eq!(s.workspace.as_deref(), Some("topp"));
        assert_eq!(s.num_decimals, 8);
    }
}
