use std::fmt;

use derive_more::Display;

use super::{Entry, Tree, TreeError};
use crate::source::DataSource;

/// Identifier of a node within one tree.
///
/// Identifiers are dense registry indices assigned in creation order. A removed
/// node's slot is emptied rather than reused, so a stale identifier resolves to
/// nothing instead of to a different node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("#{_0}")]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// Registry slot content: an entry plus its structural links.
#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) entry: Entry,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub(crate) fn new(entry: Entry, parent: Option<NodeId>) -> Self {
        Self {
            entry,
            parent,
            children: Vec::new(),
        }
    }
}

/// Read-only view of a live node.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a Tree,
    id: NodeId,
    node: &'a Node,
}

impl<'a> NodeRef<'a> {
    pub(crate) fn new(tree: &'a Tree, id: NodeId, node: &'a Node) -> Self {
        Self { tree, id, node }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &'a str {
        self.node.entry.name()
    }

    pub fn entry(&self) -> &'a Entry {
        &self.node.entry
    }

    pub fn is_directory(&self) -> bool {
        self.node.entry.is_directory()
    }

    /// Declared size of this node alone; 0 for directories.
    pub fn size(&self) -> u64 {
        self.node.entry.size()
    }

    pub fn source(&self) -> Option<&'a DataSource> {
        self.node.entry.source()
    }

    pub fn is_root(&self) -> bool {
        self.node.parent.is_none()
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.node.parent.and_then(|id| self.tree.find_by_id(id))
    }

    /// Children in insertion order.
    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + use<'a> {
        let tree = self.tree;
        let node = self.node;
        node.children
            .iter()
            .filter_map(move |&id| tree.find_by_id(id))
    }

    pub fn child_count(&self) -> usize {
        self.node.children.len()
    }

    pub fn child_by_name(&self, name: &str) -> Option<NodeRef<'a>> {
        self.children().find(|child| child.name() == name)
    }

    /// Separator-joined names from the root down to this node. The root's
    /// empty name contributes no segment, so the root itself yields "".
    pub fn full_path(&self) -> String {
        self.tree.path_of(self.id)
    }

    /// True if `ancestor` appears on the parent chain of this node.
    /// A node is not its own descendant.
    pub fn is_descendant_of(&self, ancestor: NodeId) -> bool {
        self.tree.is_descendant(self.id, ancestor)
    }

    /// Sum of the declared sizes of this node and everything below it,
    /// recomputed on every call.
    pub fn total_size(&self) -> u64 {
        self.tree.subtree_size(self.id)
    }

    /// Pre-order traversal of the nodes below this one.
    pub fn descendants(&self) -> Walk<'a> {
        Walk::new(self.tree, self.id)
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("name", &self.name())
            .field("is_directory", &self.is_directory())
            .field("size", &self.size())
            .finish()
    }
}

/// Mutable handle to a live node, obtained from [`Tree::node_mut`].
pub struct NodeMut<'a> {
    tree: &'a mut Tree,
    id: NodeId,
}

impl<'a> NodeMut<'a> {
    pub(crate) fn new(tree: &'a mut Tree, id: NodeId) -> Self {
        Self { tree, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn get(&self) -> Option<NodeRef<'_>> {
        self.tree.find_by_id(self.id)
    }

    /// Attaches `entry` as the last child of this node.
    pub fn add_child(&mut self, entry: Entry) -> Result<NodeId, TreeError> {
        self.tree.add_entry(self.id, entry)
    }

    pub fn move_to(&mut self, target: NodeId) -> Result<(), TreeError> {
        self.tree.move_to(self.id, target)
    }

    pub fn remove(self) -> Result<(), TreeError> {
        self.tree.remove(self.id)
    }
}

/// Depth-first, pre-order iterator over a subtree, excluding its starting node.
/// Siblings are visited in insertion order.
pub struct Walk<'a> {
    tree: &'a Tree,
    pending: Vec<NodeId>,
}

impl<'a> Walk<'a> {
    pub(crate) fn new(tree: &'a Tree, start: NodeId) -> Self {
        let mut walk = Self {
            tree,
            pending: Vec::new(),
        };
        walk.push_children_of(start);
        walk
    }

    fn push_children_of(&mut self, id: NodeId) {
        if let Some(node) = self.tree.slot(id) {
            self.pending.extend(node.children.iter().rev().copied());
        }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.pending.pop() {
            if let Some(node) = self.tree.find_by_id(id) {
                self.push_children_of(id);
                return Some(node);
            }
        }
        None
    }
}
