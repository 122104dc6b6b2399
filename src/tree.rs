//! Pseudo-directory tree built from a flat list of object keys.
//!
//! Nodes live in an arena indexed by [`NodeId`]. Ids are handed out in the
//! order nodes are first created, so a node's id is also its arena index;
//! the synthetic root is always id 0.

use serde::{Deserialize, Serialize};

use crate::collapse::collapse_releases;
use crate::extract::FileRecord;

/// Identifier of a node within one [`Tree`].
///
/// Only meaningful for the tree that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The synthetic root node.
    pub const ROOT: Self = Self(0);
}

/// A directory or file in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    /// Arena id.
    pub id: NodeId,
    /// Directory segment or file name.
    pub name: String,
    /// Child nodes in display order.
    pub children: Vec<NodeId>,
    /// Whether the node is displayed.
    pub show: bool,
    /// The file this node stands for; `None` for directories.
    pub file: Option<FileRecord>,
}

impl TreeNode {
    /// Returns `true` for directory nodes (including the root).
    #[must_use]
    pub const fn is_dir(&self) -> bool {
        self.file.is_none()
    }
}

/// Nested, serializable rendering of a subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeView {
    pub id: NodeId,
    pub name: String,
    pub show: bool,
    pub is_dir: bool,
    pub children: Vec<NodeView>,
    #[serde(flatten)]
    pub file: Option<FileRecord>,
}

/// Arena-backed directory tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    nodes: Vec<TreeNode>,
}

impl Tree {
    /// Creates a tree holding only a visible root named `root_name`.
    #[must_use]
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            nodes: vec![TreeNode {
                id: NodeId::ROOT,
                name: root_name.into(),
                children: Vec::new(),
                show: true,
                file: None,
            }],
        }
    }

    /// Returns the root node.
    #[must_use]
    pub fn root(&self) -> &TreeNode {
        &self.nodes[NodeId::ROOT.0]
    }

    /// Returns the node with `id`.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.0)
    }

    /// Iterates over the children of `id` in display order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &TreeNode> {
        self.get(id)
            .into_iter()
            .flat_map(|node| node.children.iter())
            .filter_map(|child| self.get(*child))
    }

    /// Number of nodes, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the tree holds nothing but its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Sets the visibility of `id`. Returns `false` if there is no such node.
    pub fn set_show(&mut self, id: NodeId, show: bool) -> bool {
        self.nodes.get_mut(id.0).map(|node| node.show = show).is_some()
    }

    /// Flips the visibility of `id` and returns the new value.
    pub fn toggle(&mut self, id: NodeId) -> Option<bool> {
        let node = self.nodes.get_mut(id.0)?;
        node.show = !node.show;
        Some(node.show)
    }

    /// Finds the node at a slash-delimited path below the root.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<NodeId> {
        path.split('/').try_fold(NodeId::ROOT, |current, segment| {
            self.children(current)
                .find(|child| child.name == segment)
                .map(|child| child.id)
        })
    }

    /// Adds `file` below the root, creating missing directories on the way.
    pub fn insert_file(&mut self, file: &FileRecord) -> NodeId {
        let mut segments = file.path.split('/');
        // split always yields at least one segment
        let _file_name = segments.next_back();

        let mut current = NodeId::ROOT;
        for segment in segments {
            current = self
                .child_dir(current, segment)
                .unwrap_or_else(|| self.push(current, segment.to_string(), None));
        }
        self.push(current, file.name.clone(), Some(file.clone()))
    }

    /// Replaces the child order of `id`. `order` must be a permutation of the
    /// current children.
    pub(crate) fn reorder_children(&mut self, id: NodeId, order: Vec<NodeId>) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            debug_assert_eq!(
                node.children.len(),
                order.len(),
                "reorder must permute existing children"
            );
            node.children = order;
        }
    }

    /// Produces a nested view of the subtree rooted at `id`.
    #[must_use]
    pub fn view(&self, id: NodeId) -> Option<NodeView> {
        let node = self.get(id)?;
        Some(NodeView {
            id: node.id,
            name: node.name.clone(),
            show: node.show,
            is_dir: node.is_dir(),
            children: node
                .children
                .iter()
                .filter_map(|child| self.view(*child))
                .collect(),
            file: node.file.clone(),
        })
    }

    /// Produces a nested view of the whole tree.
    #[must_use]
    pub fn to_view(&self) -> NodeView {
        self.view(NodeId::ROOT)
            .unwrap_or_else(|| unreachable!("tree always has a root"))
    }

    fn child_dir(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.children(parent)
            .find(|child| child.is_dir() && child.name == name)
            .map(|child| child.id)
    }

    fn push(&mut self, parent: NodeId, name: String, file: Option<FileRecord>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(TreeNode {
            id,
            name,
            children: Vec::new(),
            show: true,
            file,
        });
        self.nodes[parent.0].children.push(id);
        id
    }
}

/// Folds `files` into a tree under a root named `root_name`, then collapses
/// release directories.
#[must_use]
pub fn build_tree(files: &[FileRecord], root_name: &str) -> Tree {
    let mut tree = Tree::new(root_name);
    for file in files {
        tree.insert_file(file);
    }
    collapse_releases(&mut tree);
    log::info!("Built tree with {} nodes from {} files", tree.len(), files.len());
    tree
}
