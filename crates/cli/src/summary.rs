use geocat_catalog::Catalog;
use geocat_loader::{LoadReport, LoadStatus};

/// Human-readable report on stdout.
pub fn print(report: &LoadReport, catalog: &Catalog) {
    let c = &report.catalog;
    println!(
        "catalog ({}): {} workspaces, {} namespaces, {} stores, {} resources, {} layers, {} layer groups, {} styles",
        report.catalog_format,
        c.workspaces,
        c.namespaces,
        c.stores,
        c.resources,
        c.layers,
        c.layer_groups,
        c.styles,
    );
    println!(
        "default workspace: {}",
        c.default_workspace.as_deref().unwrap_or("(none)")
    );
    println!(
        "configuration ({}): {} workspace settings, {} global services, {} workspace services",
        report.config_format,
        report.config.workspace_settings,
        report.config.global_services,
        report.config.workspace_services,
    );

    if !report.styles_created.is_empty() {
        println!("styles created: {}", report.styles_created.join(", "));
    }

    for name in &report.disabled_stores {
        let (ws, store) = name.split_once(':').unwrap_or(("", name.as_str()));
        let error = catalog
            .store(ws, store)
            .and_then(|s| s.error.as_deref())
            .unwrap_or("unknown error");
        println!("disabled store {name}: {error}");
    }

    let resolve = &report.resolve;
    if resolve.dropped_style_refs + resolve.dropped_members + resolve.removed_groups.len() > 0 {
        println!(
            "resolve: {} style refs dropped, {} group members dropped, groups removed: [{}]",
            resolve.dropped_style_refs,
            resolve.dropped_members,
            resolve.removed_groups.join(", "),
        );
    }

    for result in &report.results {
        match &result.status {
            LoadStatus::Failed { error } => println!("FAILED  {}: {error}", result.path),
            LoadStatus::Skipped { reason } => println!("skipped {}: {reason}", result.path),
            LoadStatus::Loaded { .. } => {}
        }
    }

    for hook in report.hook_failures() {
        println!(
            "hook {} failed: {}",
            hook.name,
            hook.error.as_deref().unwrap_or_default()
        );
    }
}
