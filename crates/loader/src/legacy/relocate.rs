//! Copies legacy per-feature-type auxiliary files into CURRENT resource directories.

use geocat_catalog::store::resource_dir;
use geocat_core::layout::{LEGACY_CATALOG_FILE, LEGACY_FEATURE_TYPES, LEGACY_FEATURE_TYPE_INFO};
use geocat_core::{EntityCodec, ResourceFilter, ResourceTree};
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::document::{LegacyCatalogDocument, LegacyFeatureType};
use crate::error::{LoadResult, Result};

/// Every file under `featureTypes/<dir>/` other than its `info.xml` lands at
/// the same relative path under `workspaces/<ns>/<datastore>/<featuretype>/`.
///
/// Unreadable descriptors are recorded and skipped; a failing copy aborts the
/// migration.
pub(crate) fn relocate_auxiliary_files<C: EntityCodec>(
    tree: &ResourceTree,
    codec: &C,
) -> Result<Vec<LoadResult>> {
    let mut results = Vec::new();

    let catalog = tree.get(LEGACY_CATALOG_FILE);
    let index = match codec.depersist::<LegacyCatalogDocument>(&catalog) {
        Ok(doc) => doc.datastore_namespaces(),
        Err(e) => {
            warn!(path = %catalog, error = %e, "cannot index legacy catalog, auxiliary files stay in place");
            results.push(LoadResult::failed(catalog.path(), &e));
            return Ok(results);
        }
    };

    for dir in tree.get(LEGACY_FEATURE_TYPES).list(ResourceFilter::Directory) {
        let descriptor = dir.get(LEGACY_FEATURE_TYPE_INFO);
        let Ok(info) = codec.depersist::<LegacyFeatureType>(&descriptor) else {
            // Already reported by the importer.
            continue;
        };
        let Some(namespace) = index.get(&info.datastore) else {
            continue;
        };
        let target = tree.get(&resource_dir(namespace, &info.datastore, &info.name));

        let root = dir.file_path();
        for entry in WalkDir::new(&root).min_depth(1).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(path = %dir, error = %e, "failed to walk legacy feature type directory");
                    results.push(LoadResult::failed(dir.path(), &e));
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&root) else {
                continue;
            };
            let relative = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if relative == LEGACY_FEATURE_TYPE_INFO {
                continue;
            }

            let source = dir.get(&relative);
            let dest = target.get(&relative);
            source.copy_to(&dest)?;
            debug!(from = %source, to = %dest, "relocated auxiliary file");
            results.push(LoadResult::loaded(dest.path(), "auxiliary file"));
        }
    }
    Ok(results)
}
