//! Child indices of a node, one set per binding strength.

use std::collections::BTreeMap;

use super::index_types::NodeIndex;
use crate::hierarchy::TypeHierarchy;
use crate::types::Category;

/// Children keyed by type name, with nearest-ancestor lookup.
#[derive(Debug, Clone, Default)]
pub struct TypeIndex {
    types: BTreeMap<String, NodeIndex>,
}

impl TypeIndex {
    /// Exact lookup by type name.
    pub fn get(&self, type_name: &str) -> Option<NodeIndex> {
        self.types.get(type_name).copied()
    }

    pub fn insert(&mut self, type_name: &str, child: NodeIndex) {
        self.types.insert(type_name.to_string(), child);
    }

    /// Finds the child for `type_name` or for its nearest declared ancestor.
    pub fn find(&self, type_name: &str, hierarchy: &dyn TypeHierarchy) -> Option<NodeIndex> {
        if self.types.is_empty() {
            return None;
        }
        if let Some(child) = self.get(type_name) {
            return Some(child);
        }
        hierarchy
            .ancestry(type_name)
            .iter()
            .find_map(|candidate| self.get(candidate))
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.types.values().copied()
    }
}

/// One-slot index for `?` children.
///
/// The slot ignores the key it is addressed with: every single-match
/// segment routes to the same child.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleMatchSlot(Option<NodeIndex>);

impl SingleMatchSlot {
    pub fn get(&self) -> Option<NodeIndex> {
        self.0
    }

    pub fn set(&mut self, child: NodeIndex) {
        self.0 = Some(child);
    }
}

/// All children bound to a node with one binding strength.
#[derive(Debug, Clone, Default)]
pub struct ChildSet {
    by_name: BTreeMap<String, NodeIndex>,
    by_type: TypeIndex,
    single: SingleMatchSlot,
}

impl ChildSet {
    /// Exact child lookup within the category of `segment`.
    pub fn get(&self, category: Category, segment: &str) -> Option<NodeIndex> {
        match category {
            Category::ByName => self.by_name.get(segment).copied(),
            Category::ByType => self.by_type.get(segment),
            Category::SingleMatch => self.single.get(),
        }
    }

    pub fn insert(&mut self, category: Category, segment: &str, child: NodeIndex) {
        match category {
            Category::ByName => {
                self.by_name.insert(segment.to_string(), child);
            }
            Category::ByType => self.by_type.insert(segment, child),
            Category::SingleMatch => self.single.set(child),
        }
    }

    pub fn types(&self) -> &TypeIndex {
        &self.by_type
    }

    pub fn single(&self) -> Option<NodeIndex> {
        self.single.get()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty() && self.by_type.is_empty() && self.single.get().is_none()
    }

    /// Children in category order: by name, by type, then the single match.
    pub fn iter(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.by_name
            .values()
            .copied()
            .chain(self.by_type.values())
            .chain(self.single.get())
    }
}
