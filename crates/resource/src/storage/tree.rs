//! The resource tree: arena, root and absolute-name index.

use std::fmt::Write as _;

use fnv::FnvHashMap;

use super::arena::NodeArena;
use super::index_types::NodeIndex;
use super::node::Node;
use crate::key::{classify_segment, ResourceKey};
use crate::types::Binding;

/// Hierarchical node storage with O(1) re-entry by absolute name.
#[derive(Debug)]
pub struct ResourceTree {
    nodes: NodeArena,
    root: NodeIndex,
    /// Absolute name to node, for every node except the root.
    paths: FnvHashMap<String, NodeIndex>,
}

impl Default for ResourceTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceTree {
    /// Creates a tree holding only an empty root.
    pub fn new() -> Self {
        let mut nodes = NodeArena::new();
        let root = nodes.insert(Node::root());
        Self {
            nodes,
            root,
            paths: FnvHashMap::default(),
        }
    }

    #[inline]
    pub fn root(&self) -> NodeIndex {
        self.root
    }

    #[inline]
    pub fn node(&self, index: NodeIndex) -> &Node {
        &self.nodes[index]
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if only the root exists.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Looks a node up by its exact absolute name, e.g. `*frame.label`.
    pub fn node_for_path(&self, absolute_name: &str) -> Option<NodeIndex> {
        self.paths.get(absolute_name).copied()
    }

    /// Stores `value` at the node `key` names below `start`, materializing
    /// intermediate nodes on the way. Any previous value is overwritten.
    pub fn insert_at(&mut self, start: NodeIndex, key: &ResourceKey, value: String) -> NodeIndex {
        let mut current = start;
        for step in key.steps() {
            current = self.create_child(current, step.binding, step.segment);
        }
        log::trace!(
            "stored resource {} at node {:?}",
            key,
            self.nodes[current].absolute_name()
        );
        self.nodes[current].set_data(value);
        current
    }

    /// Returns the child of `parent` for `(segment, binding)`, creating it
    /// if it does not exist yet.
    fn create_child(&mut self, parent: NodeIndex, binding: Binding, segment: &str) -> NodeIndex {
        let category = classify_segment(segment);
        if let Some(existing) = self.nodes[parent].child(binding, category, segment) {
            return existing;
        }

        let absolute_name = self.nodes[parent].child_absolute_name(binding, segment);
        let child = self.nodes.insert(Node::new(
            segment.to_string(),
            Some(absolute_name.clone()),
        ));
        self.paths.insert(absolute_name, child);
        self.nodes[parent].add_child(binding, category, segment, child);
        child
    }

    /// Serializes every valued node reachable from `start` as
    /// `absoluteName: value` lines.
    ///
    /// Pre-order, depth-first; tightly bound children before loosely bound
    /// ones, each in category order.
    pub fn dump(&self, start: NodeIndex) -> String {
        let mut out = String::new();
        self.dump_into(start, &mut out);
        out
    }

    fn dump_into(&self, index: NodeIndex, out: &mut String) {
        let node = &self.nodes[index];
        if let (Some(name), Some(data)) = (node.absolute_name(), node.data()) {
            let _ = writeln!(out, "{name}: {data}");
        }
        for binding in Binding::ALL {
            for child in node.children(binding).iter() {
                self.dump_into(child, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(raw: &str) -> ResourceKey {
        ResourceKey::parse(raw).expect("valid key")
    }

    #[test]
    fn insert_materializes_intermediate_nodes() {
        let mut tree = ResourceTree::new();
        let root = tree.root();
        let leaf = tree.insert_at(root, &key("app.frame*Button.label"), "ok".to_string());

        assert_eq!(tree.len(), 5);
        assert_eq!(tree.node(leaf).data(), Some("ok"));
        assert_eq!(tree.node(leaf).absolute_name(), Some("app.frame*Button.label"));
        assert!(tree.node_for_path("app.frame").is_some());
        assert!(tree.node_for_path("app.frame*Button").is_some());
        assert!(tree.node_for_path("app.frame.Button").is_none());
    }

    #[test]
    fn insert_reuses_existing_nodes_and_overwrites_values() {
        let mut tree = ResourceTree::new();
        let root = tree.root();
        let first = tree.insert_at(root, &key("*a.b"), "one".to_string());
        let second = tree.insert_at(root, &key("*a.b"), "two".to_string());

        assert_eq!(first, second);
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.node(second).data(), Some("two"));
    }

    #[test]
    fn single_match_children_share_one_node() {
        let mut tree = ResourceTree::new();
        let root = tree.root();
        let a = tree.insert_at(root, &key("x.?.a"), "1".to_string());
        let b = tree.insert_at(root, &key("x.?.b"), "2".to_string());
        assert!(tree.node_for_path("x.?").is_some());
        assert_ne!(a, b);
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn insert_relative_to_inner_node() {
        let mut tree = ResourceTree::new();
        let root = tree.root();
        tree.insert_at(root, &key("app.frame"), String::new());
        let frame = tree.node_for_path("app.frame").expect("frame node");
        let leaf = tree.insert_at(frame, &key("label"), "hi".to_string());
        assert_eq!(tree.node(leaf).absolute_name(), Some("app.frame.label"));
    }

    #[test]
    fn dump_orders_tight_before_loose_and_by_category() {
        let mut tree = ResourceTree::new();
        let root = tree.root();
        for (raw, value) in [
            ("*a", "loose"),
            ("?.b", "single"),
            ("Frame.c", "type"),
            ("z", "name-z"),
            ("m", "name-m"),
            ("m.n", "nested"),
        ] {
            tree.insert_at(root, &key(raw), value.to_string());
        }

        assert_eq!(
            tree.dump(root),
            "m: name-m\nm.n: nested\nz: name-z\nFrame.c: type\n?.b: single\n*a: loose\n"
        );

        let m = tree.node_for_path("m").expect("m node");
        assert_eq!(tree.dump(m), "m: name-m\nm.n: nested\n");
    }
}
