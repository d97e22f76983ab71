//! Rooted, hierarchical resource tree backed by the filesystem.
//!
//! Paths are always relative to the tree root and use `/` separators,
//! so `tree.get("workspaces/topp/workspace.xml")` addresses the same node
//! on every platform. Nodes that do not exist yet are still valid handles:
//! writing to one creates its parent directories.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::warn;

use crate::error::TreeError;

/// Selects which children [`Resource::list`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceFilter<'a> {
    Any,
    Directory,
    File,
    /// Files whose name ends in `.<ext>`, compared case-insensitively.
    Extension(&'a str),
}

/// The root of a resource tree (a data directory).
#[derive(Debug, Clone)]
pub struct ResourceTree {
    root: Arc<PathBuf>,
}

impl ResourceTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Arc::new(root.into()),
        }
    }

    /// Filesystem location of the tree root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Handle to the root node itself.
    pub fn base(&self) -> Resource {
        Resource {
            root: Arc::clone(&self.root),
            path: String::new(),
        }
    }

    /// Handle to the node at `path`, which may not exist.
    pub fn get(&self, path: &str) -> Resource {
        self.base().get(path)
    }
}

/// A node in a [`ResourceTree`]: a directory, a file, or nothing (yet).
#[derive(Debug, Clone)]
pub struct Resource {
    root: Arc<PathBuf>,
    path: String,
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.root == other.root
    }
}

impl Eq for Resource {}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "/")
        } else {
            write!(f, "{}", self.path)
        }
    }
}

fn join(base: &str, child: &str) -> String {
    base.split('/')
        .chain(child.split('/'))
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

impl Resource {
    /// Root-relative path of this node (`""` for the root).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Last path segment (`""` for the root).
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or("")
    }

    /// Absolute filesystem location.
    pub fn file_path(&self) -> PathBuf {
        if self.path.is_empty() {
            return self.root.as_ref().clone();
        }
        self.path
            .split('/')
            .fold(self.root.as_ref().clone(), |acc, segment| acc.join(segment))
    }

    pub fn exists(&self) -> bool {
        self.file_path().exists()
    }

    pub fn is_dir(&self) -> bool {
        self.file_path().is_dir()
    }

    pub fn is_file(&self) -> bool {
        self.file_path().is_file()
    }

    /// Child node at the relative `path`.
    pub fn get(&self, path: &str) -> Resource {
        Resource {
            root: Arc::clone(&self.root),
            path: join(&self.path, path),
        }
    }

    /// Parent node, or `None` for the root.
    pub fn parent(&self) -> Option<Resource> {
        if self.path.is_empty() {
            return None;
        }
        let parent = match self.path.rfind('/') {
            Some(idx) => self.path[..idx].to_string(),
            None => String::new(),
        };
        Some(Resource {
            root: Arc::clone(&self.root),
            path: parent,
        })
    }

    /// List immediate children matching `filter`, sorted by name.
    ///
    /// A missing or unreadable directory lists as empty. Dotfiles (including
    /// our own `.tmp` write files) are never returned.
    pub fn list(&self, filter: ResourceFilter<'_>) -> Vec<Resource> {
        let dir = self.file_path();
        if !dir.is_dir() {
            return Vec::new();
        }
        let entries = match fs::read_dir(&dir) {
            Ok(e) => e,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "failed to read directory");
                return Vec::new();
            }
        };

        let mut children: Vec<Resource> = entries
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(path = %dir.display(), error = %e, "failed to read directory entry, skipping");
                    None
                }
            })
            .filter_map(|entry| {
                let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                    warn!(path = %entry.path().display(), "skipping entry with a non UTF-8 name");
                    return None;
                };
                if name.starts_with('.') {
                    return None;
                }
                let is_dir = match entry.file_type() {
                    Ok(t) => t.is_dir(),
                    Err(e) => {
                        warn!(path = %entry.path().display(), error = %e, "failed to stat entry, skipping");
                        return None;
                    }
                };
                let keep = match filter {
                    ResourceFilter::Any => true,
                    ResourceFilter::Directory => is_dir,
                    ResourceFilter::File => !is_dir,
                    ResourceFilter::Extension(ext) => !is_dir && has_extension(&name, ext),
                };
                keep.then(|| self.get(&name))
            })
            .collect();
        children.sort_by(|a, b| a.name().cmp(b.name()));
        children
    }

    /// Read the full contents of a file node.
    pub fn contents(&self) -> Result<Vec<u8>, TreeError> {
        let path = self.file_path();
        if !path.exists() {
            return Err(TreeError::NotFound(self.to_string()));
        }
        if !path.is_file() {
            return Err(TreeError::NotAFile(self.to_string()));
        }
        fs::read(&path).map_err(|e| TreeError::io(path, e))
    }

    /// Replace the contents of a file node, creating parent directories.
    ///
    /// Writes to a `.tmp` sibling first, then renames onto the final path.
    pub fn write(&self, bytes: &[u8]) -> Result<(), TreeError> {
        let final_path = self.file_path();
        let parent = final_path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| TreeError::NotAFile(self.to_string()))?;
        fs::create_dir_all(&parent).map_err(|e| TreeError::io(&parent, e))?;

        let tmp_path = parent.join(format!(".{}.tmp", self.name()));
        fs::write(&tmp_path, bytes).map_err(|e| TreeError::io(&tmp_path, e))?;
        fs::rename(&tmp_path, &final_path).map_err(|e| TreeError::io(&final_path, e))
    }

    /// Ensure this node exists as a directory.
    pub fn create_dir(&self) -> Result<(), TreeError> {
        let path = self.file_path();
        fs::create_dir_all(&path).map_err(|e| TreeError::io(path, e))
    }

    /// Move this node to `dest`, returning the handle of the new location.
    pub fn rename_to(&self, dest: &Resource) -> Result<Resource, TreeError> {
        let from = self.file_path();
        if !from.exists() {
            return Err(TreeError::NotFound(self.to_string()));
        }
        let to = dest.file_path();
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent).map_err(|e| TreeError::io(parent, e))?;
        }
        fs::rename(&from, &to).map_err(|e| TreeError::io(&to, e))?;
        Ok(dest.clone())
    }

    /// Copy a file node's bytes to `dest`.
    pub fn copy_to(&self, dest: &Resource) -> Result<(), TreeError> {
        let bytes = self.contents()?;
        dest.write(&bytes)
    }

    /// Delete a file or directory. Returns `false` when nothing was there.
    pub fn remove(&self) -> Result<bool, TreeError> {
        let path = self.file_path();
        if path.is_dir() {
            fs::remove_dir_all(&path).map_err(|e| TreeError::io(path, e))?;
            Ok(true)
        } else if path.exists() {
            fs::remove_file(&path).map_err(|e| TreeError::io(path, e))?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

fn has_extension(name: &str, ext: &str) -> bool {
    match name.rsplit_once('.') {
        Some((stem, suffix)) => !stem.is_empty() && suffix.eq_ignore_ascii_case(ext),
        None => false,
    }
}
