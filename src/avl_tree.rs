use std::cmp::Ordering;
use std::fmt;

use tracing::{debug, instrument};

use crate::bitree::{BiTree, NodeId};
use crate::error::{TreeError, TreeResult};
use crate::tombstone::TombStone;

/// Height of the right subtree minus height of the left one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Factor {
    LeftHeavy,
    Balanced,
    RightHeavy,
}

impl From<Factor> for i8 {
    fn from(factor: Factor) -> i8 {
        match factor {
            Factor::LeftHeavy => -1,
            Factor::Balanced => 0,
            Factor::RightHeavy => 1,
        }
    }
}

/// Payload of every [`BiTree`] node owned by an [`AvlTree`].
#[derive(Debug)]
pub(crate) struct AvlNode<T> {
    data: TombStone<T>,
    factor: Factor,
}

impl<T> AvlNode<T> {
    fn new(data: T) -> Self {
        AvlNode {
            data: TombStone::new(data),
            factor: Factor::Balanced,
        }
    }

    fn data(&self) -> &T {
        self.data.key()
    }

    fn is_hidden(&self) -> bool {
        self.data.is_hidden()
    }

    fn into_data(self) -> T {
        self.data.into_inner()
    }
}

/// What [`AvlTree::insert`] did with its argument.
#[derive(Debug, PartialEq, Eq)]
pub enum Insertion<T> {
    /// A new leaf was linked in.
    Added,
    /// A hidden node with an equal key now holds the data.
    Revived,
    /// An equal key is already visible; the data is handed back untouched.
    Duplicate(T),
}

impl<T> Insertion<T> {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Insertion::Duplicate(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Growth {
    Grew,
    Settled,
}

/// AVL tree over a [`BiTree`], ordered by a caller supplied comparison.
///
/// Removal is lazy: nodes are only hidden, so `size` counts hidden nodes
/// and the shape never changes on removal.
pub struct AvlTree<T, C> {
    tree: BiTree<AvlNode<T>>,
    compare: C,
}

impl<T, C> AvlTree<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    pub fn new(compare: C) -> Self {
        AvlTree {
            tree: BiTree::new(),
            compare,
        }
    }

    /// `destroy` receives every payload the tree lets go of: hidden data
    /// replaced on re-insertion and everything still stored on drop.
    pub fn with_destroy<F>(compare: C, mut destroy: F) -> Self
    where
        F: FnMut(T) + 'static,
    {
        AvlTree {
            tree: BiTree::with_destroy(move |node: AvlNode<T>| destroy(node.into_data())),
            compare,
        }
    }

    pub fn size(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.tree.root()
    }

    pub fn left(&self, node: NodeId) -> Option<NodeId> {
        self.tree.left(node)
    }

    pub fn right(&self, node: NodeId) -> Option<NodeId> {
        self.tree.right(node)
    }

    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.tree.is_leaf(node)
    }

    /// Stored data of `node`, hidden or not.
    pub fn data(&self, node: NodeId) -> &T {
        self.tree.data(node).data()
    }

    pub fn factor(&self, node: NodeId) -> Factor {
        self.tree.data(node).factor
    }

    pub fn is_hidden(&self, node: NodeId) -> bool {
        self.tree.data(node).is_hidden()
    }

    pub fn compare(&self) -> &C {
        &self.compare
    }

    pub fn destroy(self) {
        drop(self)
    }

    fn set_factor(&mut self, node: NodeId, factor: Factor) {
        self.tree.data_mut(node).factor = factor;
    }

    // LL or LR, for a left-heavy node whose left subtree just grew.
    fn rotate_from_left(&mut self, node: NodeId) -> NodeId {
        let left = self.tree.left(node).expect("no left child");

        if self.factor(left) == Factor::LeftHeavy {
            debug!(?node, "LL rotation");
            self.tree.set_left(node, self.tree.right(left));
            self.tree.set_right(left, Some(node));
            self.set_factor(node, Factor::Balanced);
            self.set_factor(left, Factor::Balanced);
            return left;
        }

        debug!(?node, "LR rotation");
        let grandchild = self.tree.right(left).expect("no grandchild");
        self.tree.set_right(left, self.tree.left(grandchild));
        self.tree.set_left(grandchild, Some(left));
        self.tree.set_left(node, self.tree.right(grandchild));
        self.tree.set_right(grandchild, Some(node));

        let (node_factor, left_factor) = match self.factor(grandchild) {
            Factor::LeftHeavy => (Factor::RightHeavy, Factor::Balanced),
            Factor::Balanced => (Factor::Balanced, Factor::Balanced),
            Factor::RightHeavy => (Factor::Balanced, Factor::LeftHeavy),
        };
        self.set_factor(node, node_factor);
        self.set_factor(left, left_factor);
        self.set_factor(grandchild, Factor::Balanced);
        grandchild
    }

    // RR or RL, for a right-heavy node whose right subtree just grew.
    fn rotate_from_right(&mut self, node: NodeId) -> NodeId {
        let right = self.tree.right(node).expect("no right child");

        if self.factor(right) == Factor::RightHeavy {
            debug!(?node, "RR rotation");
            self.tree.set_right(node, self.tree.left(right));
            self.tree.set_left(right, Some(node));
            self.set_factor(node, Factor::Balanced);
            self.set_factor(right, Factor::Balanced);
            return right;
        }

        debug!(?node, "RL rotation");
        let grandchild = self.tree.left(right).expect("no grandchild");
        self.tree.set_left(right, self.tree.right(grandchild));
        self.tree.set_right(grandchild, Some(right));
        self.tree.set_right(node, self.tree.left(grandchild));
        self.tree.set_left(grandchild, Some(node));

        let (node_factor, right_factor) = match self.factor(grandchild) {
            Factor::LeftHeavy => (Factor::Balanced, Factor::RightHeavy),
            Factor::Balanced => (Factor::Balanced, Factor::Balanced),
            Factor::RightHeavy => (Factor::LeftHeavy, Factor::Balanced),
        };
        self.set_factor(node, node_factor);
        self.set_factor(right, right_factor);
        self.set_factor(grandchild, Factor::Balanced);
        grandchild
    }

    fn left_grew(&mut self, node: NodeId) -> (NodeId, Growth) {
        match self.factor(node) {
            Factor::LeftHeavy => (self.rotate_from_left(node), Growth::Settled),
            Factor::Balanced => {
                self.set_factor(node, Factor::LeftHeavy);
                (node, Growth::Grew)
            }
            Factor::RightHeavy => {
                self.set_factor(node, Factor::Balanced);
                (node, Growth::Settled)
            }
        }
    }

    fn right_grew(&mut self, node: NodeId) -> (NodeId, Growth) {
        match self.factor(node) {
            Factor::RightHeavy => (self.rotate_from_right(node), Growth::Settled),
            Factor::Balanced => {
                self.set_factor(node, Factor::RightHeavy);
                (node, Growth::Grew)
            }
            Factor::LeftHeavy => {
                self.set_factor(node, Factor::Balanced);
                (node, Growth::Settled)
            }
        }
    }

    // Returns the root of the (possibly rotated) subtree that was at `idx`.
    fn insert_node(
        &mut self,
        idx: NodeId,
        data: T,
    ) -> TreeResult<(NodeId, Insertion<T>, Growth)> {
        match (self.compare)(&data, self.data(idx)) {
            Ordering::Less => {
                let (insertion, growth) = match self.tree.left(idx) {
                    None => {
                        self.tree.insert_left(Some(idx), AvlNode::new(data))?;
                        (Insertion::Added, Growth::Grew)
                    }
                    Some(left) => {
                        let (left, insertion, growth) = self.insert_node(left, data)?;
                        self.tree.set_left(idx, Some(left));
                        (insertion, growth)
                    }
                };
                let (idx, growth) = match growth {
                    Growth::Grew => self.left_grew(idx),
                    Growth::Settled => (idx, Growth::Settled),
                };
                Ok((idx, insertion, growth))
            }
            Ordering::Greater => {
                let (insertion, growth) = match self.tree.right(idx) {
                    None => {
                        self.tree.insert_right(Some(idx), AvlNode::new(data))?;
                        (Insertion::Added, Growth::Grew)
                    }
                    Some(right) => {
                        let (right, insertion, growth) = self.insert_node(right, data)?;
                        self.tree.set_right(idx, Some(right));
                        (insertion, growth)
                    }
                };
                let (idx, growth) = match growth {
                    Growth::Grew => self.right_grew(idx),
                    Growth::Settled => (idx, Growth::Settled),
                };
                Ok((idx, insertion, growth))
            }
            Ordering::Equal => {
                let node = self.tree.data_mut(idx);
                if !node.is_hidden() {
                    return Ok((idx, Insertion::Duplicate(data), Growth::Settled));
                }
                let old = node.data.revive(data);
                debug!(?idx, "revived hidden node");
                self.tree.dispose(AvlNode::new(old));
                Ok((idx, Insertion::Revived, Growth::Settled))
            }
        }
    }

    /// Inserts `data`, rebalancing on the way back up.
    #[instrument(level = "trace", skip_all)]
    pub fn insert(&mut self, data: T) -> TreeResult<Insertion<T>> {
        let Some(root) = self.tree.root() else {
            self.tree.insert_left(None, AvlNode::new(data))?;
            return Ok(Insertion::Added);
        };
        let (root, insertion, _) = self.insert_node(root, data)?;
        self.tree.set_root(Some(root));
        Ok(insertion)
    }

    fn find(&self, key: &T) -> Option<NodeId> {
        let mut cur = self.tree.root();
        while let Some(i) = cur {
            match (self.compare)(key, self.data(i)) {
                Ordering::Less => cur = self.tree.left(i),
                Ordering::Greater => cur = self.tree.right(i),
                Ordering::Equal => return Some(i),
            }
        }
        None
    }

    /// Hides the node matching `key`. The tree keeps its shape and size.
    #[instrument(level = "trace", skip_all)]
    pub fn remove(&mut self, key: &T) -> TreeResult<()> {
        let idx = self.find(key).ok_or(TreeError::KeyNotFound)?;
        self.tree.data_mut(idx).data.bury();
        Ok(())
    }

    /// The stored data equal to `key`, unless it is hidden.
    pub fn lookup(&self, key: &T) -> TreeResult<&T> {
        let idx = self.find(key).ok_or(TreeError::KeyNotFound)?;
        self.tree
            .data(idx)
            .data
            .value()
            .ok_or(TreeError::KeyNotFound)
    }
}

impl<T, C> fmt::Debug for AvlTree<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvlTree").field("tree", &self.tree).finish()
    }
}
