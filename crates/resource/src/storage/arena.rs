//! Arena owning every node of a tree.

use std::ops::{Index, IndexMut};

use super::index_types::NodeIndex;
use super::node::Node;

/// Append-only node storage addressed by [`NodeIndex`].
///
/// Nodes are never removed individually; a reset replaces the whole arena.
#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a node, returning its index.
    pub fn insert(&mut self, node: Node) -> NodeIndex {
        let index = NodeIndex::new(self.nodes.len());
        self.nodes.push(node);
        index
    }

    /// Returns the number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the arena holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Index<NodeIndex> for NodeArena {
    type Output = Node;

    fn index(&self, index: NodeIndex) -> &Self::Output {
        &self.nodes[index.get()]
    }
}

impl IndexMut<NodeIndex> for NodeArena {
    fn index_mut(&mut self, index: NodeIndex) -> &mut Self::Output {
        &mut self.nodes[index.get()]
    }
}
