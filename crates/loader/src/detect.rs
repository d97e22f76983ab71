//! Format detection: which on-disk layout the catalog and configuration use.

use geocat_core::layout::{LEGACY_CATALOG_FILE, LEGACY_SERVICES_FILE};
use geocat_core::ResourceTree;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Legacy,
    Current,
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Format::Legacy => write!(f, "legacy"),
            Format::Current => write!(f, "current"),
        }
    }
}

/// Formats of the two halves of a data directory, detected independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DetectedFormats {
    pub catalog: Format,
    pub config: Format,
}

fn marker_format(tree: &ResourceTree, marker: &str) -> Format {
    if tree.get(marker).is_file() {
        Format::Legacy
    } else {
        Format::Current
    }
}

/// `catalog.xml` at the root means a legacy catalog; `services.xml` a legacy
/// configuration. Anything else, including an empty tree, is CURRENT.
pub fn detect(tree: &ResourceTree) -> DetectedFormats {
    DetectedFormats {
        catalog: marker_format(tree, LEGACY_CATALOG_FILE),
        config: marker_format(tree, LEGACY_SERVICES_FILE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn markers_are_detected_independently() {
        let dir = TempDir::new().unwrap();
        let tree = ResourceTree::new(dir.path());
        assert_eq!(
            detect(&tree),
            DetectedFormats {
                catalog: Format::Current,
                config: Format::Current
            }
        );

        tree.get("services.xml").write(b"").unwrap();
        assert_eq!(detect(&tree).catalog, Format::Current);
        assert_eq!(detect(&tree).config, Format::Legacy);

        tree.get("catalog.xml").write(b"").unwrap();
        assert_eq!(detect(&tree).catalog, Format::Legacy);
    }

    #[test]
    fn migrated_marker_is_current() {
        let dir = TempDir::new().unwrap();
        let tree = ResourceTree::new(dir.path());
        tree.get("catalog.xml.old").write(b"").unwrap();
        assert_eq!(detect(&tree).catalog, Format::Current);
    }

    #[test]
    fn missing_root_is_current() {
        let tree = ResourceTree::new("/nonexistent/geocat/data");
        assert_eq!(detect(&tree).config, Format::Current);
    }
}
