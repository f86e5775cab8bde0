use std::fmt;

use tracing::{instrument, trace};

use crate::error::{TreeError, TreeResult};

/// Handle to a node of a [`BiTree`]. Handles are plain arena indices: they
/// stay valid until the node is removed, after which the slot may be reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

struct Node<T> {
    data: T,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

impl<T> Node<T> {
    fn child(&self, side: Side) -> Option<NodeId> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    fn child_mut(&mut self, side: Side) -> &mut Option<NodeId> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

struct NodePool<T> {
    slots: Vec<Option<Node<T>>>,
    // capacity is kept >= slots.len() so that freeing never allocates
    free_list: Vec<usize>,
}

impl<T> NodePool<T> {
    fn new() -> Self {
        NodePool {
            slots: Vec::new(),
            free_list: Vec::new(),
        }
    }

    fn reserve(&mut self, additional: usize) -> TreeResult<()> {
        self.slots.try_reserve(additional)?;
        let wanted = self.slots.len() + additional;
        self.free_list
            .try_reserve(wanted.saturating_sub(self.free_list.len()))?;
        Ok(())
    }

    fn alloc(&mut self, data: T) -> TreeResult<NodeId> {
        let node = Node {
            data,
            left: None,
            right: None,
        };
        if let Some(idx) = self.free_list.pop() {
            self.slots[idx] = Some(node);
            return Ok(NodeId(idx));
        }
        self.reserve(1)?;
        Ok(self.push(node))
    }

    /// Caller must have reserved room for the node.
    fn push(&mut self, node: Node<T>) -> NodeId {
        let idx = self.slots.len();
        self.slots.push(Some(node));
        NodeId(idx)
    }

    fn free(&mut self, id: NodeId) -> Node<T> {
        let node = self.slots[id.0].take().expect("freeing a dead tree node");
        self.free_list.push(id.0);
        node
    }

    fn get(&self, id: NodeId) -> Option<&Node<T>> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node<T>> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    fn node(&self, id: NodeId) -> &Node<T> {
        self.get(id).expect("stale node handle")
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node<T> {
        self.get_mut(id).expect("stale node handle")
    }
}

/// Unbalanced binary tree owning its payloads.
///
/// Every payload leaving the tree (subtree removal, drop) is handed to the
/// destroy hook if one was installed, and dropped otherwise.
///
/// Accessors taking a [`NodeId`] panic when the handle does not name a
/// live node; the insert operations report [`TreeError::InvalidNode`]
/// instead.
pub struct BiTree<T> {
    pool: NodePool<T>,
    root: Option<NodeId>,
    size: usize,
    destroy: Option<Box<dyn FnMut(T)>>,
}

impl<T> BiTree<T> {
    pub fn new() -> Self {
        BiTree {
            pool: NodePool::new(),
            root: None,
            size: 0,
            destroy: None,
        }
    }

    pub fn with_destroy<F>(destroy: F) -> Self
    where
        F: FnMut(T) + 'static,
    {
        let mut tree = BiTree::new();
        tree.destroy = Some(Box::new(destroy));
        tree
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// True when `node` is past the end of a branch.
    pub fn is_eob(node: Option<NodeId>) -> bool {
        node.is_none()
    }

    pub fn is_leaf(&self, node: NodeId) -> bool {
        let n = self.pool.node(node);
        n.left.is_none() && n.right.is_none()
    }

    pub fn left(&self, node: NodeId) -> Option<NodeId> {
        self.pool.node(node).left
    }

    pub fn right(&self, node: NodeId) -> Option<NodeId> {
        self.pool.node(node).right
    }

    pub fn data(&self, node: NodeId) -> &T {
        &self.pool.node(node).data
    }

    pub fn data_mut(&mut self, node: NodeId) -> &mut T {
        &mut self.pool.node_mut(node).data
    }

    /// Inserts a leaf as the left child of `node`, or as the root when
    /// `node` is `None` (only allowed on an empty tree).
    pub fn insert_left(&mut self, node: Option<NodeId>, data: T) -> TreeResult<NodeId> {
        self.insert_child(node, Side::Left, data)
    }

    /// Mirror of [`BiTree::insert_left`].
    pub fn insert_right(&mut self, node: Option<NodeId>, data: T) -> TreeResult<NodeId> {
        self.insert_child(node, Side::Right, data)
    }

    #[instrument(level = "trace", skip(self, data))]
    fn insert_child(&mut self, node: Option<NodeId>, side: Side, data: T) -> TreeResult<NodeId> {
        match node {
            None if self.size > 0 => return Err(TreeError::InvalidPosition),
            None => {}
            Some(parent) => {
                let parent = self.pool.get(parent).ok_or(TreeError::InvalidNode)?;
                if parent.child(side).is_some() {
                    return Err(TreeError::InvalidPosition);
                }
            }
        }

        let id = self.pool.alloc(data)?;
        match node {
            None => self.root = Some(id),
            Some(parent) => *self.pool.node_mut(parent).child_mut(side) = Some(id),
        }
        self.size += 1;
        Ok(id)
    }

    /// Destroys the left subtree of `node`, or the whole tree for `None`.
    pub fn remove_left(&mut self, node: Option<NodeId>) {
        self.remove_child(node, Side::Left)
    }

    /// Destroys the right subtree of `node`, or the whole tree for `None`.
    pub fn remove_right(&mut self, node: Option<NodeId>) {
        self.remove_child(node, Side::Right)
    }

    fn remove_child(&mut self, node: Option<NodeId>, side: Side) {
        if self.size == 0 {
            return;
        }
        let target = match node {
            None => self.root.take(),
            Some(parent) => match self.pool.get_mut(parent) {
                Some(parent) => parent.child_mut(side).take(),
                None => return,
            },
        };
        if let Some(target) = target {
            self.destroy_subtree(target);
        }
    }

    fn destroy_subtree(&mut self, id: NodeId) {
        let node = self.pool.free(id);
        if let Some(left) = node.left {
            self.destroy_subtree(left);
        }
        if let Some(right) = node.right {
            self.destroy_subtree(right);
        }
        self.dispose(node.data);
        self.size -= 1;
    }

    /// Removes every node, then the tree itself.
    pub fn destroy(self) {
        drop(self)
    }

    /// Builds a tree rooted at `data` with the current contents of `left`
    /// and `right` as its subtrees. Both sources are left empty and the
    /// result takes over the destroy hook of `left`. Nothing is touched if
    /// the new tree cannot be allocated.
    #[instrument(level = "trace", skip_all)]
    pub fn merge(left: &mut BiTree<T>, right: &mut BiTree<T>, data: T) -> TreeResult<BiTree<T>> {
        trace!(left = left.size, right = right.size, "merging");
        let total = left.size + right.size + 1;
        let mut merged = BiTree::new();
        merged.pool.reserve(total)?;
        let root = merged.insert_left(None, data)?;

        let l = left.root.take().map(|id| merged.adopt(left, id));
        let r = right.root.take().map(|id| merged.adopt(right, id));
        merged.set_left(root, l);
        merged.set_right(root, r);
        merged.size = total;

        left.reset();
        right.reset();
        merged.destroy = left.destroy.take();
        Ok(merged)
    }

    // Moves the subtree at `id` out of `source`; room must be reserved.
    fn adopt(&mut self, source: &mut BiTree<T>, id: NodeId) -> NodeId {
        let Node { data, left, right } = source.pool.free(id);
        let left = left.map(|l| self.adopt(source, l));
        let right = right.map(|r| self.adopt(source, r));
        self.pool.push(Node { data, left, right })
    }

    fn reset(&mut self) {
        self.pool = NodePool::new();
        self.root = None;
        self.size = 0;
    }

    pub(crate) fn set_root(&mut self, root: Option<NodeId>) {
        self.root = root;
    }

    pub(crate) fn set_left(&mut self, node: NodeId, child: Option<NodeId>) {
        self.pool.node_mut(node).left = child;
    }

    pub(crate) fn set_right(&mut self, node: NodeId, child: Option<NodeId>) {
        self.pool.node_mut(node).right = child;
    }

    /// Hands a payload that left the tree to the destroy hook.
    pub(crate) fn dispose(&mut self, data: T) {
        match self.destroy.as_mut() {
            Some(destroy) => destroy(data),
            None => drop(data),
        }
    }
}

impl<T> Default for BiTree<T> {
    fn default() -> Self {
        BiTree::new()
    }
}

impl<T> Drop for BiTree<T> {
    fn drop(&mut self) {
        if self.size > 0 {
            trace!(size = self.size, "destroying tree");
        }
        self.remove_left(None);
    }
}

impl<T> fmt::Debug for BiTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BiTree")
            .field("size", &self.size)
            .field("root", &self.root)
            .field("destroy", &self.destroy.is_some())
            .finish()
    }
}
