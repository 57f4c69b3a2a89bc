//! The single file currently open in the editor.
//!
//! Holds a path plus a copy of that file's content. The copy is refreshed
//! from the tree after every mutation; if the path stops resolving to a file
//! the projection is cleared.

use crate::file_tree::FileTree;

/// Snapshot of the open file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveFile {
    pub path: String,
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveFileProjection {
    current: Option<ActiveFile>,
}

impl ActiveFileProjection {
    #[must_use]
    pub fn current(&self) -> Option<&ActiveFile> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.current.as_ref().map(|file| file.path.as_str())
    }

    /// Open the file at `path`. Folders and unknown paths leave the projection as is.
    ///
    /// Returns `true` when the selection changed the projection.
    pub fn select(&mut self, tree: &FileTree, path: &str) -> bool {
        let Some(node) = tree.find(path) else {
            return false;
        };
        let Some(content) = node.content() else {
            return false;
        };
        self.current = Some(ActiveFile {
            path: node.path.clone(),
            name: node.name.clone(),
            content: content.to_string(),
        });
        true
    }

    /// Re-read the open file from `tree`, clearing it if it no longer resolves.
    pub fn refresh(&mut self, tree: &FileTree) {
        let Some(active) = self.current.as_mut() else {
            return;
        };
        match tree.find(&active.path).and_then(|node| node.content()) {
            Some(content) => {
                if active.content != content {
                    active.content = content.to_string();
                }
            }
            None => {
                tracing::debug!(path = %active.path, "active file no longer resolves, closing it");
                self.current = None;
            }
        }
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_tree::{FileNode, FileTree, NodeKind};

    #[test]
    fn selecting_a_file_copies_its_content() {
        let tree = FileTree::starter_project();
        let mut projection = ActiveFileProjection::default();
        assert!(projection.select(&tree, "/README.md"));
        let active = projection.current().expect("active file");
        assert_eq!(active.name, "README.md");
        assert_eq!(active.content, "# VibeCode AI Project\n\nBuilt with AI agents");
    }

    #[test]
    fn selecting_a_folder_is_a_no_op() {
        let tree = FileTree::starter_project();
        let mut projection = ActiveFileProjection::default();
        assert!(projection.select(&tree, "/README.md"));
        assert!(!projection.select(&tree, "/src"));
        assert_eq!(projection.path(), Some("/README.md"));
    }

    #[test]
    fn selecting_missing_path_is_a_no_op() {
        let tree = FileTree::starter_project();
        let mut projection = ActiveFileProjection::default();
        assert!(!projection.select(&tree, "/missing.rs"));
        assert!(projection.current().is_none());
    }

    #[test]
    fn refresh_picks_up_updated_content() {
        let tree = FileTree::starter_project();
        let mut projection = ActiveFileProjection::default();
        projection.select(&tree, "/src/index.js");

        let tree = tree.update("/src/index.js", "let x = 2;");
        projection.refresh(&tree);
        assert_eq!(
            projection.current().map(|file| file.content.as_str()),
            Some("let x = 2;")
        );
    }

    #[test]
    fn refresh_ignores_unrelated_updates() {
        let tree = FileTree::starter_project();
        let mut projection = ActiveFileProjection::default();
        projection.select(&tree, "/src/index.js");
        let before = projection.clone();

        let tree = tree
            .update("/README.md", "changed")
            .insert("/src", "b.js", NodeKind::File);
        projection.refresh(&tree);
        assert_eq!(projection, before);
    }

    #[test]
    fn refresh_clears_dangling_reference() {
        let tree = FileTree::starter_project();
        let mut projection = ActiveFileProjection::default();
        projection.select(&tree, "/README.md");

        let replaced = FileTree::new(vec![FileNode::folder("docs", "/docs", Vec::new())]);
        projection.refresh(&replaced);
        assert!(projection.current().is_none());
    }
}
