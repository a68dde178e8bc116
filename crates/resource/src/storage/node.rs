//! Tree vertex type.

use super::children::ChildSet;
use super::index_types::NodeIndex;
use crate::types::{Binding, Category};

/// A vertex of the resource tree.
///
/// Children are partitioned by binding strength and, inside each
/// [`ChildSet`], by segment category.
#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    /// `None` only for the root.
    absolute_name: Option<String>,
    data: Option<String>,
    children: [ChildSet; 2],
}

impl Node {
    /// Creates the root node.
    pub fn root() -> Self {
        Self::new("root".to_string(), None)
    }

    pub fn new(name: String, absolute_name: Option<String>) -> Self {
        Self {
            name,
            absolute_name,
            data: None,
            children: Default::default(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn absolute_name(&self) -> Option<&str> {
        self.absolute_name.as_deref()
    }

    #[inline]
    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    pub fn set_data(&mut self, value: String) {
        self.data = Some(value);
    }

    #[inline]
    pub fn children(&self, binding: Binding) -> &ChildSet {
        &self.children[binding.index()]
    }

    /// Exact child lookup.
    pub fn child(&self, binding: Binding, category: Category, segment: &str) -> Option<NodeIndex> {
        self.children(binding).get(category, segment)
    }

    pub fn add_child(
        &mut self,
        binding: Binding,
        category: Category,
        segment: &str,
        child: NodeIndex,
    ) {
        self.children[binding.index()].insert(category, segment, child);
    }

    /// Absolute name a child `segment` bound with `binding` would get.
    pub fn child_absolute_name(&self, binding: Binding, segment: &str) -> String {
        match (&self.absolute_name, binding) {
            (None, Binding::Tight) => segment.to_string(),
            (None, Binding::Loose) => format!("{}{segment}", Binding::Loose.delimiter()),
            (Some(parent), binding) => format!("{parent}{}{segment}", binding.delimiter()),
        }
    }
}
