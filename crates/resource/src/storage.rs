//! Storage layer for the resource tree.
//!
//! This module provides the data structures the matcher walks:
//! - Compact node indices and an arena owning every node
//! - Per-binding child sets split by segment category
//! - The tree itself, with its absolute-name index and insertion path

mod arena;
mod children;
mod index_types;
mod node;
mod tree;

pub use arena::NodeArena;
pub use children::{ChildSet, SingleMatchSlot, TypeIndex};
pub use index_types::NodeIndex;
pub use node::Node;
pub use tree::ResourceTree;
