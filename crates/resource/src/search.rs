//! Resolution of keys against the resource tree.

mod matcher;
mod store;

pub use store::ResourceStore;
