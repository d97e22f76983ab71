//! Seeds the well-known styles every catalog is expected to carry.

use geocat_catalog::store::style_path;
use geocat_catalog::Catalog;
use geocat_core::layout::STYLES;
use geocat_core::{EntityCodec, ResourceTree, StyleInfo};
use tracing::{debug, info, warn};

use crate::error::LoadResult;

/// A style shipped with the loader.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinStyle {
    pub name: &'static str,
    pub filename: &'static str,
    pub sld: &'static [u8],
}

pub const BUILTIN_STYLES: [BuiltinStyle; 5] = [
    BuiltinStyle {
        name: "point",
        filename: "default_point.sld",
        sld: include_bytes!("../styles/default_point.sld"),
    },
    BuiltinStyle {
        name: "line",
        filename: "default_line.sld",
        sld: include_bytes!("../styles/default_line.sld"),
    },
    BuiltinStyle {
        name: "polygon",
        filename: "default_polygon.sld",
        sld: include_bytes!("../styles/default_polygon.sld"),
    },
    BuiltinStyle {
        name: "raster",
        filename: "default_raster.sld",
        sld: include_bytes!("../styles/default_raster.sld"),
    },
    BuiltinStyle {
        name: "generic",
        filename: "default_generic.sld",
        sld: include_bytes!("../styles/default_generic.sld"),
    },
];

/// Outcome of one bootstrap run.
#[derive(Debug, Default)]
pub struct BootstrapOutcome {
    pub created: Vec<String>,
    pub results: Vec<LoadResult>,
}

/// Adds every missing built-in style to a catalog.
///
/// Existing catalog styles and existing files on disk are never replaced, so
/// running it again is a no-op.
pub struct StyleBootstrapper<'a, C> {
    tree: &'a ResourceTree,
    codec: &'a C,
}

impl<'a, C: EntityCodec> StyleBootstrapper<'a, C> {
    pub fn new(tree: &'a ResourceTree, codec: &'a C) -> Self {
        Self { tree, codec }
    }

    pub fn bootstrap(&self, catalog: &mut Catalog) -> BootstrapOutcome {
        let mut outcome = BootstrapOutcome::default();
        for builtin in &BUILTIN_STYLES {
            if catalog.style_by_name(builtin.name).is_some() {
                continue;
            }
            match self.seed(catalog, builtin) {
                Ok(()) => {
                    info!(style = builtin.name, "created built-in style");
                    outcome.created.push(builtin.name.to_string());
                    outcome.results.push(LoadResult::loaded(
                        style_path(None, builtin.name),
                        format!("style '{}'", builtin.name),
                    ));
                }
                Err(e) => {
                    let cause = format!("{e:#}");
                    warn!(style = builtin.name, error = %cause, "failed to create built-in style");
                    outcome
                        .results
                        .push(LoadResult::failed(style_path(None, builtin.name), cause));
                }
            }
        }
        outcome
    }

    fn seed(&self, catalog: &mut Catalog, builtin: &BuiltinStyle) -> anyhow::Result<()> {
        let sld = self.tree.get(STYLES).get(builtin.filename);
        if sld.exists() {
            debug!(path = %sld, "style file already present, keeping it");
        } else {
            sld.write(builtin.sld)?;
        }

        let style = StyleInfo::new(builtin.name, builtin.filename);
        let descriptor = self.tree.get(&style_path(None, builtin.name));
        if !descriptor.exists() {
            self.codec.persist(&style, &descriptor)?;
        }
        catalog.add_style(style)?;
        Ok(())
    }
}
