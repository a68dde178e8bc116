//! Hierarchical wildcard resource lookup.
//!
//! This crate provides:
//! - A key grammar with tight (`.`) and loose (`*`) bindings, the `?`
//!   single-match wildcard and type-classified segments
//! - A resource tree with per-binding name, type and single-match children
//! - Backtracking resolution with tight-over-loose and
//!   name-over-type-over-wildcard precedence
//! - A weak object registry for resolving relative to live objects
//! - Property-stream and config-file loading

pub mod error;
pub mod fetch;
pub mod hierarchy;
pub mod key;
pub mod loader;
pub mod registry;
pub mod search;
pub mod storage;
pub mod types;

// Re-export main types
pub use error::{ResourceError, Result};
pub use hierarchy::{TypeHierarchy, TypeRegistry};
pub use key::{classify_segment, is_valid_key, is_valid_name, normalize_key, ResourceKey};
pub use loader::{parse_properties, ConfigLoader, LoaderConfig};
pub use registry::{ObjectRegistry, Resourced};
pub use search::ResourceStore;
pub use types::{join_values, Binding, Category, LoadReport, ResourceValue};
