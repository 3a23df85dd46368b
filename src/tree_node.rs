//! # Generic bounding-ball tree node
//!
//! The region, trajectory and orbital trees share the same shape: a binary tree whose leaves
//! hold index lists into the caller's collection and whose every node carries a summary
//! (its bounding ball). Children are owned through `Box`: each child has exactly one parent
//! and is dropped with it.
use serde::{Deserialize, Serialize};

/// Children of a node: either the leaf's item indices or two owned subtrees.
#[derive(Debug, Clone)]
pub enum NodeChildren<S> {
    Leaf(Vec<usize>),
    Split(Box<TreeNode<S>>, Box<TreeNode<S>>),
}

/// A node of a bounding-ball tree.
///
/// Invariants
/// -----------------
/// * `count` is the number of items in the subtree.
/// * For a split node, the index sets of the two children are disjoint and their union is the
///   node's index set.
/// * Every descendant item lies inside the bounding ball described by `summary`.
#[derive(Debug, Clone)]
pub struct TreeNode<S> {
    count: usize,
    summary: S,
    children: NodeChildren<S>,
}

/// Shape statistics of a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TreeStats {
    /// Total number of nodes (internal and leaves).
    pub nodes: usize,
    /// Number of leaves.
    pub leaves: usize,
    /// Number of nodes on the longest root-to-leaf path.
    pub depth: usize,
    /// Largest leaf index list.
    pub max_leaf_size: usize,
}

impl<S> TreeNode<S> {
    pub(crate) fn leaf(indices: Vec<usize>, summary: S) -> Self {
        TreeNode {
            count: indices.len(),
            summary,
            children: NodeChildren::Leaf(indices),
        }
    }

    pub(crate) fn split(left: TreeNode<S>, right: TreeNode<S>, summary: S) -> Self {
        TreeNode {
            count: left.count + right.count,
            summary,
            children: NodeChildren::Split(Box::new(left), Box::new(right)),
        }
    }

    /// Number of items under this node.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn summary(&self) -> &S {
        &self.summary
    }

    pub fn children(&self) -> &NodeChildren<S> {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.children, NodeChildren::Leaf(_))
    }

    /// Item indices of a leaf, `None` for an internal node.
    pub fn leaf_indices(&self) -> Option<&[usize]> {
        match &self.children {
            NodeChildren::Leaf(indices) => Some(indices),
            NodeChildren::Split(..) => None,
        }
    }

    /// Both subtrees of an internal node, `None` for a leaf.
    pub fn split_children(&self) -> Option<(&TreeNode<S>, &TreeNode<S>)> {
        match &self.children {
            NodeChildren::Leaf(_) => None,
            NodeChildren::Split(left, right) => Some((left, right)),
        }
    }

    /// Every item index of the subtree, in leaf order.
    pub fn indices(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.count);
        self.collect_indices(&mut out);
        out
    }

    fn collect_indices(&self, out: &mut Vec<usize>) {
        match &self.children {
            NodeChildren::Leaf(indices) => out.extend_from_slice(indices),
            NodeChildren::Split(left, right) => {
                left.collect_indices(out);
                right.collect_indices(out);
            }
        }
    }

    /// Call `f` on every node of the subtree, parents before children.
    pub fn for_each_node<F: FnMut(&TreeNode<S>)>(&self, f: &mut F) {
        f(self);
        if let NodeChildren::Split(left, right) = &self.children {
            left.for_each_node(f);
            right.for_each_node(f);
        }
    }

    /// Shape statistics of the subtree.
    pub fn stats(&self) -> TreeStats {
        match &self.children {
            NodeChildren::Leaf(indices) => TreeStats {
                nodes: 1,
                leaves: 1,
                depth: 1,
                max_leaf_size: indices.len(),
            },
            NodeChildren::Split(left, right) => {
                let l = left.stats();
                let r = right.stats();
                TreeStats {
                    nodes: 1 + l.nodes + r.nodes,
                    leaves: l.leaves + r.leaves,
                    depth: 1 + l.depth.max(r.depth),
                    max_leaf_size: l.max_leaf_size.max(r.max_leaf_size),
                }
            }
        }
    }
}
