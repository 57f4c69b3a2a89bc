//! In-memory file tree for the workspace.
//!
//! Nodes are addressed by their full slash-delimited path. Every mutation
//! produces a new tree; the old one is left untouched.

use std::fmt::Write;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// === Types ===

/// Whether a node is a file or a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Folder,
}

impl NodeKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::File => "file",
            NodeKind::Folder => "folder",
        }
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(NodeKind::File),
            "folder" | "dir" | "directory" => Ok(NodeKind::Folder),
            other => Err(format!("unknown node kind '{other}': expected file or folder")),
        }
    }
}

/// Kind-specific payload of a node. Files carry content, folders carry children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeBody {
    File { content: String },
    Folder { children: Vec<FileNode> },
}

/// A named entry in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    pub name: String,
    pub path: String,
    #[serde(flatten)]
    pub body: NodeBody,
}

/// Ordered list of root nodes. Serializes as a plain JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileTree {
    roots: Vec<FileNode>,
}

/// Rejections from [`FileTree::try_insert`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("name cannot be empty")]
    EmptyName,
    #[error("name '{0}' cannot contain '/'")]
    InvalidName(String),
    #[error("no folder at {0}")]
    ParentNotFound(String),
    #[error("{0} is a file, not a folder")]
    ParentIsFile(String),
    #[error("{0} already exists")]
    AlreadyExists(String),
}

// === FileNode ===

impl FileNode {
    #[must_use]
    pub fn file(
        name: impl Into<String>,
        path: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            body: NodeBody::File {
                content: content.into(),
            },
        }
    }

    #[must_use]
    pub fn folder(
        name: impl Into<String>,
        path: impl Into<String>,
        children: Vec<FileNode>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            body: NodeBody::Folder { children },
        }
    }

    /// Empty leaf of the given kind placed under `parent_path`.
    #[must_use]
    pub fn leaf(parent_path: &str, name: &str, kind: NodeKind) -> Self {
        let path = child_path(parent_path, name);
        match kind {
            NodeKind::File => Self::file(name, path, String::new()),
            NodeKind::Folder => Self::folder(name, path, Vec::new()),
        }
    }

    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self.body {
            NodeBody::File { .. } => NodeKind::File,
            NodeBody::Folder { .. } => NodeKind::Folder,
        }
    }

    #[must_use]
    pub fn is_file(&self) -> bool {
        self.kind() == NodeKind::File
    }

    #[must_use]
    pub fn is_folder(&self) -> bool {
        self.kind() == NodeKind::Folder
    }

    /// File content, `None` for folders.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        match &self.body {
            NodeBody::File { content } => Some(content),
            NodeBody::Folder { .. } => None,
        }
    }

    /// Folder children, `None` for files.
    #[must_use]
    pub fn children(&self) -> Option<&[FileNode]> {
        match &self.body {
            NodeBody::File { .. } => None,
            NodeBody::Folder { children } => Some(children),
        }
    }
}

/// Path of `name` placed under `parent_path`.
#[must_use]
pub fn child_path(parent_path: &str, name: &str) -> String {
    format!("{parent_path}/{name}")
}

// === FileTree ===

impl FileTree {
    #[must_use]
    pub fn new(roots: Vec<FileNode>) -> Self {
        Self { roots }
    }

    /// The starter project every new workspace opens with.
    #[must_use]
    pub fn starter_project() -> Self {
        Self::new(vec![
            FileNode::folder(
                "src",
                "/src",
                vec![FileNode::file(
                    "index.js",
                    "/src/index.js",
                    "console.log('Hello from VibeCode AI!');\n\n// Start coding...",
                )],
            ),
            FileNode::file(
                "README.md",
                "/README.md",
                "# VibeCode AI Project\n\nBuilt with AI agents",
            ),
        ])
    }

    /// Depth-first, pre-order iteration over every node.
    pub fn walk(&self) -> impl Iterator<Item = &FileNode> {
        let mut stack: Vec<&FileNode> = self.roots.iter().rev().collect();
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            if let Some(children) = node.children() {
                stack.extend(children.iter().rev());
            }
            Some(node)
        })
    }

    #[must_use]
    pub fn find(&self, path: &str) -> Option<&FileNode> {
        self.walk().find(|node| node.path == path)
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.find(path).is_some()
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.walk().count()
    }

    /// Replace the content of the file at `path`.
    ///
    /// Returns an equal tree when `path` does not resolve to a file.
    #[must_use]
    pub fn update(&self, path: &str, content: &str) -> FileTree {
        FileTree::new(update_nodes(&self.roots, path, content))
    }

    /// Append an empty leaf under the folder at `parent_path`.
    ///
    /// Returns an equal tree when `parent_path` does not resolve to a folder.
    /// Name uniqueness is not checked here; see [`FileTree::try_insert`].
    #[must_use]
    pub fn insert(&self, parent_path: &str, name: &str, kind: NodeKind) -> FileTree {
        let leaf = FileNode::leaf(parent_path, name, kind);
        FileTree::new(insert_nodes(&self.roots, parent_path, &leaf))
    }

    /// Validating variant of [`FileTree::insert`] that keeps paths unique.
    pub fn try_insert(
        &self,
        parent_path: &str,
        name: &str,
        kind: NodeKind,
    ) -> Result<FileTree, TreeError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TreeError::EmptyName);
        }
        if name.contains('/') {
            return Err(TreeError::InvalidName(name.to_string()));
        }
        match self.find(parent_path) {
            None => return Err(TreeError::ParentNotFound(parent_path.to_string())),
            Some(parent) if parent.is_file() => {
                return Err(TreeError::ParentIsFile(parent_path.to_string()));
            }
            Some(_) => {}
        }
        let path = child_path(parent_path, name);
        if self.contains(&path) {
            return Err(TreeError::AlreadyExists(path));
        }
        Ok(self.insert(parent_path, name, kind))
    }

    /// JSON snapshot sent to the relay with every chat turn.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Indented listing, one node per line, folders suffixed with `/`.
    ///
    /// Lines follow the same order as [`FileTree::walk`].
    #[must_use]
    pub fn outline(&self) -> String {
        let mut out = String::new();
        for node in &self.roots {
            write_outline(node, 0, &mut out);
        }
        out
    }
}

fn update_nodes(nodes: &[FileNode], path: &str, content: &str) -> Vec<FileNode> {
    nodes
        .iter()
        .map(|node| match &node.body {
            NodeBody::File { .. } if node.path == path => FileNode {
                body: NodeBody::File {
                    content: content.to_string(),
                },
                ..node.clone()
            },
            NodeBody::Folder { children } => FileNode {
                name: node.name.clone(),
                path: node.path.clone(),
                body: NodeBody::Folder {
                    children: update_nodes(children, path, content),
                },
            },
            NodeBody::File { .. } => node.clone(),
        })
        .collect()
}

fn insert_nodes(nodes: &[FileNode], parent_path: &str, leaf: &FileNode) -> Vec<FileNode> {
    nodes
        .iter()
        .map(|node| match &node.body {
            NodeBody::Folder { children } => {
                let mut children = insert_nodes(children, parent_path, leaf);
                if node.path == parent_path {
                    children.push(leaf.clone());
                }
                FileNode {
                    name: node.name.clone(),
                    path: node.path.clone(),
                    body: NodeBody::Folder { children },
                }
            }
            NodeBody::File { .. } => node.clone(),
        })
        .collect()
}

fn write_outline(node: &FileNode, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    match node.children() {
        Some(children) => {
            let _ = writeln!(out, "{indent}{}/", node.name);
            for child in children {
                write_outline(child, depth + 1, out);
            }
        }
        None => {
            let _ = writeln!(out, "{indent}{}", node.name);
        }
    }
}
