//! Command targets
//!
//! A command is invoked against a set of project tree nodes. The generate
//! package command only applies when that set is exactly the project root.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::TargetError;

/// Kind of a project tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    /// The project itself
    ProjectRoot,
    /// A folder inside the project
    Folder,
    /// A file inside the project
    File,
}

/// A node of the project tree
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ProjectNode {
    /// Display name
    pub name: String,
    /// Path on disk
    pub path: PathBuf,
    /// Node kind
    pub kind: NodeKind,
}

impl ProjectNode {
    /// Create a project root node for a project directory
    pub fn project_root(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Self {
            name,
            path,
            kind: NodeKind::ProjectRoot,
        }
    }

    /// Create a node of an arbitrary kind
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind,
        }
    }

    /// Whether this node is the project root
    pub fn is_project_root(&self) -> bool {
        self.kind == NodeKind::ProjectRoot
    }
}

/// The set of nodes a command was invoked against
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandTarget {
    nodes: Vec<ProjectNode>,
}

impl CommandTarget {
    /// Create a target from a node selection
    pub fn new(nodes: Vec<ProjectNode>) -> Self {
        Self { nodes }
    }

    /// Target the project root at `path`
    pub fn project(path: impl Into<PathBuf>) -> Self {
        Self::new(vec![ProjectNode::project_root(path)])
    }

    /// Selected nodes
    pub fn nodes(&self) -> &[ProjectNode] {
        &self.nodes
    }

    /// Resolve the target to its single project root node
    pub fn project_root(&self) -> Result<&ProjectNode, TargetError> {
        match self.nodes.as_slice() {
            [] => Err(TargetError::Empty),
            [node] if node.is_project_root() => Ok(node),
            [node] => Err(TargetError::NotProjectRoot {
                name: node.name.clone(),
            }),
            nodes => Err(TargetError::MultipleNodes { count: nodes.len() }),
        }
    }

    /// Directory of the project root, if the target is valid
    pub fn project_dir(&self) -> Option<&Path> {
        self.project_root().ok().map(|node| node.path.as_path())
    }

    /// Whether the target is structurally valid for the command
    pub fn is_valid(&self) -> bool {
        self.project_root().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_target_is_valid() {
        let target = CommandTarget::project("/work/demo");
        let root = target.project_root().unwrap();
        assert_eq!(root.name, "demo");
        assert_eq!(target.project_dir(), Some(Path::new("/work/demo")));
    }

    #[test]
    fn test_empty_target_is_invalid() {
        let target = CommandTarget::default();
        assert_eq!(target.project_root(), Err(TargetError::Empty));
        assert!(!target.is_valid());
    }

    #[test]
    fn test_non_root_node_is_invalid() {
        let target = CommandTarget::new(vec![ProjectNode::new(
            "src",
            "/work/demo/src",
            NodeKind::Folder,
        )]);
        assert_eq!(
            target.project_root(),
            Err(TargetError::NotProjectRoot {
                name: "src".to_string()
            })
        );
    }

    #[test]
    fn test_root_plus_other_node_is_invalid() {
        let target = CommandTarget::new(vec![
            ProjectNode::project_root("/work/demo"),
            ProjectNode::new("lib.rs", "/work/demo/src/lib.rs", NodeKind::File),
        ]);
        assert_eq!(
            target.project_root(),
            Err(TargetError::MultipleNodes { count: 2 })
        );
        assert_eq!(target.project_dir(), None);
    }
}
