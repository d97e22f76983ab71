//! Runs post-load and post-reload hooks with per-hook failure isolation.

use geocat_catalog::{LiveCatalog, LiveGeoServer};
use tracing::{debug, error};

use crate::error::HookOutcome;
use crate::extensions::Hook;

/// Which lifecycle point the hooks run at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Load,
    Reload,
}

/// Invoke every hook registered for `phase`, in registration order.
///
/// After a first load every hook is initialized; after a reload only
/// reinitializers run. A failing hook is logged and recorded; the rest still run.
pub(crate) fn run_hooks(
    hooks: &[Hook],
    phase: Phase,
    catalog: &LiveCatalog,
    geoserver: &LiveGeoServer,
) -> Vec<HookOutcome> {
    let mut outcomes = Vec::new();
    for hook in hooks {
        let (name, result) = match (hook, phase) {
            (Hook::Initializer(h), Phase::Load) => (h.name(), h.initialize(catalog, geoserver)),
            (Hook::Reinitializer(h), Phase::Load) => (h.name(), h.initialize(catalog, geoserver)),
            (Hook::Reinitializer(h), Phase::Reload) => {
                (h.name(), h.reinitialize(catalog, geoserver))
            }
            (Hook::Initializer(_), Phase::Reload) => continue,
        };
        let outcome = match result {
            Ok(()) => {
                debug!(hook = name, ?phase, "hook completed");
                HookOutcome {
                    name: name.to_string(),
                    error: None,
                }
            }
            Err(e) => {
                let cause = format!("{e:#}");
                error!(hook = name, ?phase, error = %cause, "failed to run initializer");
                HookOutcome {
                    name: name.to_string(),
                    error: Some(cause),
                }
            }
        };
        outcomes.push(outcome);
    }
    outcomes
}
