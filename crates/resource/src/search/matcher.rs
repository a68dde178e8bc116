//! Depth-first, backtracking resolution of a key against the tree.
//!
//! At every node the remaining key is split at its first tight delimiter.
//! Tightly bound children are tried first, in category order:
//! 1. exact name (or exact type / single match, per the segment's category)
//! 2. type fallback: the type of the object registered at the segment's
//!    absolute path, or of a type segment itself, walking its ancestry
//! 3. the single-match child
//!
//! Only when no tight path leads to a full match are the loosely bound
//! children tried, once per anchor: every segment of the remaining key may
//! be the one the loose child binds to, with everything before it skipped.
//! The first full match wins.

use crate::hierarchy::TypeHierarchy;
use crate::key::classify_segment;
use crate::registry::ObjectRegistry;
use crate::storage::{ChildSet, NodeIndex, ResourceTree};
use crate::types::{Binding, Category, TIGHT_BINDING};

/// Borrowed view of everything a lookup consults.
pub(crate) struct Matcher<'a> {
    tree: &'a ResourceTree,
    registry: &'a ObjectRegistry,
    hierarchy: &'a dyn TypeHierarchy,
}

impl<'a> Matcher<'a> {
    pub(crate) fn new(
        tree: &'a ResourceTree,
        registry: &'a ObjectRegistry,
        hierarchy: &'a dyn TypeHierarchy,
    ) -> Self {
        Self {
            tree,
            registry,
            hierarchy,
        }
    }

    /// Finds the node a normalized key resolves to.
    ///
    /// The node is returned even when it carries no value.
    pub(crate) fn find(&self, key: &str) -> Option<NodeIndex> {
        self.find_from(self.tree.root(), Some(key), "")
    }

    /// `prefix` is the part of the query already consumed, used to locate
    /// registered objects.
    fn find_from(&self, node: NodeIndex, rest: Option<&str>, prefix: &str) -> Option<NodeIndex> {
        let Some(rest) = rest else {
            return Some(node);
        };

        let (head, tail) = split_head(rest);
        let path = join_path(prefix, head);
        if let Some(found) = self.try_children(node, Binding::Tight, head, tail, &path) {
            return Some(found);
        }

        for anchor in LooseAnchors::new(rest) {
            let path = join_path(prefix, anchor.consumed);
            if let Some(found) =
                self.try_children(node, Binding::Loose, anchor.head, anchor.tail, &path)
            {
                return Some(found);
            }
        }

        None
    }

    /// Tries the children of `node` bound with `binding` for `segment`, in
    /// priority order, recursing on `tail` below each candidate.
    fn try_children(
        &self,
        node: NodeIndex,
        binding: Binding,
        segment: &str,
        tail: Option<&str>,
        path: &str,
    ) -> Option<NodeIndex> {
        let children = self.tree.node(node).children(binding);
        if children.is_empty() {
            return None;
        }
        let category = classify_segment(segment);
        let mut tried: Vec<NodeIndex> = Vec::with_capacity(3);

        let candidates = [
            children.get(category, segment),
            self.type_child(children, category, segment, path),
            children.single(),
        ];
        for child in candidates.into_iter().flatten() {
            if tried.contains(&child) {
                continue;
            }
            tried.push(child);
            if let Some(found) = self.find_from(child, tail, path) {
                return Some(found);
            }
        }

        None
    }

    /// Child selected by type for `segment`.
    ///
    /// Name segments use the type of the object registered at `path`; type
    /// segments use their own text. Single-match segments have no type.
    fn type_child(
        &self,
        children: &ChildSet,
        category: Category,
        segment: &str,
        path: &str,
    ) -> Option<NodeIndex> {
        if children.types().is_empty() {
            return None;
        }
        match category {
            Category::ByName => {
                let type_name = self.registry.type_of(path)?;
                children.types().find(type_name, self.hierarchy)
            }
            Category::ByType => children.types().find(segment, self.hierarchy),
            Category::SingleMatch => None,
        }
    }
}

/// Splits at the first tight delimiter.
fn split_head(rest: &str) -> (&str, Option<&str>) {
    match memchr::memchr(TIGHT_BINDING as u8, rest.as_bytes()) {
        Some(pos) => (&rest[..pos], Some(&rest[pos + 1..])),
        None => (rest, None),
    }
}

fn join_path(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}{TIGHT_BINDING}{segment}")
    }
}

/// One place a loose binding may anchor on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LooseAnchor<'a> {
    /// The segment the loose child must match.
    head: &'a str,
    /// Everything after `head`.
    tail: Option<&'a str>,
    /// Skipped segments plus `head`, delimiters included.
    consumed: &'a str,
}

/// Iterates over every segment boundary of a key, shortest skip first.
struct LooseAnchors<'a> {
    key: &'a str,
    offset: Option<usize>,
}

impl<'a> LooseAnchors<'a> {
    fn new(key: &'a str) -> Self {
        Self {
            key,
            offset: Some(0),
        }
    }
}

impl<'a> Iterator for LooseAnchors<'a> {
    type Item = LooseAnchor<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.offset?;
        let (head, tail) = split_head(&self.key[start..]);
        let end = start + head.len();
        self.offset = tail.map(|_| end + 1);
        Some(LooseAnchor {
            head,
            tail,
            consumed: &self.key[..end],
        })
    }
}
