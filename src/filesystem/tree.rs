use snafu::{OptionExt, ensure};
use tracing::debug;

use super::error::{
    CyclicMoveSnafu, DuplicateNameSnafu, InvalidNameSnafu, NotADirectorySnafu, NotFoundSnafu,
    RootRemovalSnafu,
};
use super::node::Node;
use super::{Entry, NodeId, NodeMut, NodeRef, TreeError, Walk};

pub const PATH_SEPARATOR: char = '/';

/// Owning container of every node of one virtual filesystem.
///
/// Nodes live in a registry indexed by [`NodeId`]; children are owned through
/// that registry and parents are plain identifiers, so there are no ownership
/// cycles. The root is a nameless directory created together with the tree.
#[derive(Debug)]
pub struct Tree {
    nodes: Vec<Option<Node>>,
    root: NodeId,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    pub fn new() -> Self {
        Tree {
            nodes: vec![Some(Node::new(Entry::directory(""), None))],
            root: NodeId::new(0),
        }
    }

    pub fn root_id(&self) -> NodeId {
        self.root
    }

    pub fn root(&self) -> NodeRef<'_> {
        match self.slot(self.root) {
            Some(node) => NodeRef::new(self, self.root, node),
            None => unreachable!("the root node is never removed"),
        }
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    /// True when the root has no children.
    pub fn is_empty(&self) -> bool {
        self.root().child_count() == 0
    }

    pub fn find_by_id(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.slot(id).map(|node| NodeRef::new(self, id, node))
    }

    /// Resolves a separator-delimited path from the root, matching names exactly.
    /// Empty segments are ignored, so `""` is the root and `"a/c/"` equals `"a/c"`.
    pub fn find_by_path(&self, path: &str) -> Option<NodeRef<'_>> {
        path.split(PATH_SEPARATOR)
            .filter(|segment| !segment.is_empty())
            .try_fold(self.root(), |node, segment| node.child_by_name(segment))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<NodeMut<'_>> {
        self.slot(id)?;
        Some(NodeMut::new(self, id))
    }

    /// Pre-order traversal of every node below the root.
    pub fn walk(&self) -> Walk<'_> {
        Walk::new(self, self.root)
    }

    /// Attaches `entry` as the last child of `parent` and returns its new identifier.
    pub fn add_entry(&mut self, parent: NodeId, entry: Entry) -> Result<NodeId, TreeError> {
        let parent_node = self.slot(parent).context(NotFoundSnafu { id: parent })?;
        ensure!(
            parent_node.entry.is_directory(),
            NotADirectorySnafu {
                path: self.path_of(parent)
            }
        );
        validate_name(entry.name())?;
        ensure!(
            self.child_id_by_name(parent, entry.name()).is_none(),
            DuplicateNameSnafu {
                name: entry.name(),
                parent: self.path_of(parent),
            }
        );

        let id = NodeId::new(self.nodes.len());
        debug!("Adding '{}' as {} under {}", entry.name(), id, parent);
        self.nodes.push(Some(Node::new(entry, Some(parent))));
        if let Some(parent_node) = self.slot_mut(parent) {
            parent_node.children.push(id);
        }
        Ok(id)
    }

    /// Returns the directory `name` under `parent`, creating it if it does not exist yet.
    pub fn ensure_directory(&mut self, parent: NodeId, name: &str) -> Result<NodeId, TreeError> {
        match self.child_id_by_name(parent, name) {
            Some(existing) => {
                let is_directory = self
                    .slot(existing)
                    .is_some_and(|node| node.entry.is_directory());
                ensure!(
                    is_directory,
                    NotADirectorySnafu {
                        path: self.path_of(existing)
                    }
                );
                Ok(existing)
            }
            None => self.add_entry(parent, Entry::directory(name)),
        }
    }

    /// Creates every missing directory along `path` and returns the last one.
    /// The whole path is checked before the first directory is created.
    pub fn make_directories(&mut self, path: &str) -> Result<NodeId, TreeError> {
        let segments: Vec<&str> = path
            .split(PATH_SEPARATOR)
            .filter(|segment| !segment.is_empty())
            .collect();

        let mut existing = Some(self.root);
        for segment in &segments {
            validate_name(segment)?;
            existing = match existing {
                Some(parent) => match self.child_id_by_name(parent, segment) {
                    Some(child) => {
                        let is_directory = self
                            .slot(child)
                            .is_some_and(|node| node.entry.is_directory());
                        ensure!(
                            is_directory,
                            NotADirectorySnafu {
                                path: self.path_of(child)
                            }
                        );
                        Some(child)
                    }
                    None => None,
                },
                None => None,
            };
        }

        segments
            .into_iter()
            .try_fold(self.root, |parent, segment| {
                self.ensure_directory(parent, segment)
            })
    }

    /// Relocates `id` with its whole subtree to the end of `target`'s children.
    /// Moving a node to its current parent is a no-op.
    pub fn move_to(&mut self, id: NodeId, target: NodeId) -> Result<(), TreeError> {
        let node = self.slot(id).context(NotFoundSnafu { id })?;
        let target_node = self.slot(target).context(NotFoundSnafu { id: target })?;
        ensure!(
            target_node.entry.is_directory(),
            NotADirectorySnafu {
                path: self.path_of(target)
            }
        );
        ensure!(
            target != id && !self.is_descendant(target, id),
            CyclicMoveSnafu {
                entry: self.path_of(id),
                target: self.path_of(target),
            }
        );

        let current_parent = node.parent;
        if current_parent == Some(target) {
            return Ok(());
        }
        ensure!(
            self.child_id_by_name(target, node.entry.name()).is_none(),
            DuplicateNameSnafu {
                name: node.entry.name(),
                parent: self.path_of(target),
            }
        );

        debug!("Moving {} from {:?} to {}", id, current_parent, target);
        if let Some(parent) = current_parent {
            self.detach(id, parent);
        }
        if let Some(node) = self.slot_mut(id) {
            node.parent = Some(target);
        }
        if let Some(target_node) = self.slot_mut(target) {
            target_node.children.push(id);
        }
        Ok(())
    }

    /// Detaches `id` from its parent and invalidates the identifiers of the
    /// node and of every node below it.
    pub fn remove(&mut self, id: NodeId) -> Result<(), TreeError> {
        ensure!(id != self.root, RootRemovalSnafu);
        let parent = self.slot(id).context(NotFoundSnafu { id })?.parent;
        if let Some(parent) = parent {
            self.detach(id, parent);
        }

        let mut pending = vec![id];
        let mut removed = 0usize;
        while let Some(current) = pending.pop() {
            if let Some(node) = self.nodes.get_mut(current.index()).and_then(Option::take) {
                pending.extend(node.children);
                removed += 1;
            }
        }
        debug!("Removed {} together with {} descendants", id, removed - 1);
        Ok(())
    }

    /// Drops every node and starts over with a fresh root.
    pub(crate) fn reset(&mut self) {
        *self = Self::new();
    }

    pub(crate) fn slot(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    fn slot_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index()).and_then(Option::as_mut)
    }

    fn detach(&mut self, id: NodeId, parent: NodeId) {
        if let Some(parent_node) = self.slot_mut(parent) {
            parent_node.children.retain(|&child| child != id);
        }
    }

    fn child_id_by_name(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.slot(parent)?
            .children
            .iter()
            .copied()
            .find(|&child| self.slot(child).is_some_and(|node| node.entry.name() == name))
    }

    pub(crate) fn path_of(&self, id: NodeId) -> String {
        let mut names = Vec::new();
        let mut current = self.slot(id);
        while let Some(node) = current {
            if node.parent.is_some() {
                names.push(node.entry.name());
            }
            current = node.parent.and_then(|parent| self.slot(parent));
        }
        names.reverse();
        names.join(&PATH_SEPARATOR.to_string())
    }

    pub(crate) fn is_descendant(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.slot(id).and_then(|node| node.parent);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.slot(parent).and_then(|node| node.parent);
        }
        false
    }

    pub(crate) fn subtree_size(&self, id: NodeId) -> u64 {
        let mut total = 0;
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            if let Some(node) = self.slot(current) {
                total += node.entry.size();
                pending.extend(node.children.iter().copied());
            }
        }
        total
    }
}

fn validate_name(name: &str) -> Result<(), TreeError> {
    ensure!(
        !name.is_empty() && name != "." && name != ".." && !name.contains(PATH_SEPARATOR),
        InvalidNameSnafu { name }
    );
    Ok(())
}
