use geocat_core::{PublishedRef, StyleRef};
use serde::Serialize;
use tracing::warn;

use super::{opt_scoped, scoped, Catalog};
use crate::error::CatalogError;

/// What [`Catalog::resolve`] had to drop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolveReport {
    pub dropped_style_refs: usize,
    pub dropped_members: usize,
    /// Groups removed because none of their members resolved (`ws:name` or `name`).
    pub removed_groups: Vec<String>,
}

impl Catalog {
    fn style_exists(&self, style: &StyleRef) -> bool {
        self.styles
            .contains_key(&opt_scoped(style.workspace.as_deref(), &style.name))
    }

    fn member_exists(&self, member: &PublishedRef) -> bool {
        match member {
            PublishedRef::Layer { workspace, name } => {
                self.layers.contains_key(&scoped(workspace, name))
            }
            PublishedRef::Group { workspace, name } => self
                .layer_groups
                .contains_key(&opt_scoped(workspace.as_deref(), name)),
        }
    }

    /// Resolve name references across the populated catalog.
    ///
    /// Style references that name no style are dropped from their layer.
    /// Group members that name no layer or group are dropped, and a group
    /// left with no members is removed; this repeats until nested groups
    /// stop changing.
    pub fn resolve(&mut self) -> Result<ResolveReport, CatalogError> {
        let mut report = ResolveReport::default();

        let layer_keys: Vec<_> = self.layers.keys().cloned().collect();
        for key in layer_keys {
            let Some(mut layer) = self.layers.get(&key).cloned() else {
                continue;
            };
            let mut dropped = 0;
            if let Some(style) = layer.default_style.take() {
                if self.style_exists(&style) {
                    layer.default_style = Some(style);
                } else {
                    warn!(layer = %layer.name, style = %style.name, "default style not found, clearing");
                    dropped += 1;
                }
            }
            let before = layer.styles.len();
            layer.styles.retain(|s| self.style_exists(s));
            dropped += before - layer.styles.len();
            if dropped > 0 {
                report.dropped_style_refs += dropped;
                self.layers.insert(key, layer);
            }
        }

        loop {
            let mut changed = false;
            let group_keys: Vec<_> = self.layer_groups.keys().cloned().collect();
            for key in group_keys {
                let Some(mut group) = self.layer_groups.get(&key).cloned() else {
                    continue;
                };
                let before = group.layers.len();
                let mut missing = Vec::new();
                group.layers.retain(|m| {
                    let exists = self.member_exists(m);
                    if !exists {
                        missing.push(m.to_string());
                    }
                    exists
                });
                if missing.is_empty() {
                    continue;
                }
                changed = true;
                report.dropped_members += before - group.layers.len();
                warn!(group = %group.name, missing = %missing.join(", "), "layer group members not found");

                if group.layers.is_empty() {
                    let label = match &group.workspace {
                        Some(ws) => format!("{}:{}", ws, group.name),
                        None => group.name.clone(),
                    };
                    warn!(group = %label, "removing layer group with no resolvable layers");
                    self.remove_layer_group(key.0.as_deref(), &key.1)?;
                    report.removed_groups.push(label);
                } else {
                    self.layer_groups.insert(key, group);
                }
            }
            if !changed {
                break;
            }
        }

        Ok(report)
    }
}
