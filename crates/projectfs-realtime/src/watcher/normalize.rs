//! Raw notify events to typed changes.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use notify::event::{ModifyKind, RemoveKind, RenameMode};
use notify::{Event, EventKind};
use walkdir::WalkDir;

use projectfs_core::events::ChangeAction;
use projectfs_entity::folder::is_descriptor_name;

/// Classifies events under one project root.
///
/// Directories seen so far are remembered so that removals, which can no
/// longer be stat'ed, still report the right kind.
#[derive(Debug)]
pub struct Normalizer {
    root: PathBuf,
    max_depth: usize,
    known_dirs: HashSet<PathBuf>,
}

impl Normalizer {
    /// Create a normalizer for `root`, ignoring anything deeper than
    /// `max_depth` components below it.
    pub fn new(root: impl Into<PathBuf>, max_depth: usize) -> Self {
        Self {
            root: root.into(),
            max_depth,
            known_dirs: HashSet::new(),
        }
    }

    /// Record every directory currently under the root. Blocking.
    pub fn prime(&mut self) {
        let dirs = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(self.max_depth)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_dir())
            .map(walkdir::DirEntry::into_path);
        self.known_dirs.extend(dirs);
    }

    /// The watched root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The `/`-separated path of `path` relative to the root, if it is a
    /// reportable entry below it.
    pub fn relative(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = rel
            .components()
            .map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Option<_>>()?;
        if parts.is_empty() || parts.len() > self.max_depth {
            return None;
        }
        if parts.last().is_some_and(|p| is_descriptor_name(p)) {
            return None;
        }
        Some(parts.join("/"))
    }

    /// Changes described by `event`, in order.
    pub fn normalize(&mut self, event: &Event) -> Vec<(PathBuf, ChangeAction)> {
        let mut out = Vec::new();
        match &event.kind {
            EventKind::Create(_) | EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
                for path in &event.paths {
                    self.appeared(path, &mut out);
                }
            }
            EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
                for path in &event.paths {
                    self.vanished(path, None, &mut out);
                }
            }
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
                if let [from, to, ..] = event.paths.as_slice() {
                    self.vanished(from, None, &mut out);
                    self.appeared(to, &mut out);
                }
            }
            EventKind::Modify(ModifyKind::Name(_)) => {
                for path in &event.paths {
                    if path.symlink_metadata().is_ok() {
                        self.appeared(path, &mut out);
                    } else {
                        self.vanished(path, None, &mut out);
                    }
                }
            }
            EventKind::Modify(_) => {
                for path in &event.paths {
                    let is_file = path.metadata().map(|m| m.is_file()).unwrap_or(false);
                    if is_file && self.relative(path).is_some() {
                        out.push((path.clone(), ChangeAction::FileModified));
                    }
                }
            }
            EventKind::Remove(kind) => {
                let hint = match kind {
                    RemoveKind::Folder => Some(true),
                    RemoveKind::File => Some(false),
                    _ => None,
                };
                for path in &event.paths {
                    self.vanished(path, hint, &mut out);
                }
            }
            EventKind::Access(_) | EventKind::Any | EventKind::Other => {}
        }
        out
    }

    fn appeared(&mut self, path: &Path, out: &mut Vec<(PathBuf, ChangeAction)>) {
        if self.relative(path).is_none() {
            return;
        }
        let Ok(meta) = path.symlink_metadata() else {
            // Already gone again; the removal event will follow.
            return;
        };
        if meta.is_dir() {
            if self.known_dirs.insert(path.to_path_buf()) {
                out.push((path.to_path_buf(), ChangeAction::FolderAdded));
            }
        } else {
            out.push((path.to_path_buf(), ChangeAction::FileAdded));
        }
    }

    fn vanished(
        &mut self,
        path: &Path,
        is_dir: Option<bool>,
        out: &mut Vec<(PathBuf, ChangeAction)>,
    ) {
        let was_dir = self.known_dirs.remove(path);
        if was_dir {
            self.known_dirs.retain(|d| !d.starts_with(path));
        }
        if self.relative(path).is_none() {
            return;
        }
        let action = if is_dir.unwrap_or(was_dir) {
            ChangeAction::FolderRemoved
        } else {
            ChangeAction::FileRemoved
        };
        out.push((path.to_path_buf(), action));
    }
}
