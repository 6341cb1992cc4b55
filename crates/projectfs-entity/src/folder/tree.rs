//! Folder tree structures for the UI.
//!
//! Wire format: every folder name is a key mapping to a nested node; the
//! reserved key `__files` lists the plain files directly inside.

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Reserved key holding a folder's file names.
pub const FILES_KEY: &str = "__files";

/// One folder in the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderNode {
    /// Child folders by name.
    pub folders: BTreeMap<String, FolderNode>,
    /// Plain files directly inside, sorted.
    pub files: Vec<String>,
}

impl FolderNode {
    /// An empty node.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the node has neither folders nor files.
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.files.is_empty()
    }

    /// Total folders below this node.
    pub fn folder_count(&self) -> usize {
        self.folders
            .values()
            .map(|child| 1 + child.folder_count())
            .sum()
    }

    /// Total files at and below this node.
    pub fn file_count(&self) -> usize {
        self.files.len()
            + self
                .folders
                .values()
                .map(FolderNode::file_count)
                .sum::<usize>()
    }

    /// Descend along `/`-separated `path`.
    pub fn get(&self, path: &str) -> Option<&FolderNode> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(self, |node, segment| node.folders.get(segment))
    }
}

impl Serialize for FolderNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let has_files = !self.files.is_empty();
        let len = self.folders.len() + usize::from(has_files);
        let mut map = serializer.serialize_map(Some(len))?;
        if has_files {
            map.serialize_entry(FILES_KEY, &self.files)?;
        }
        for (name, child) in &self.folders {
            map.serialize_entry(name, child)?;
        }
        map.end()
    }
}
