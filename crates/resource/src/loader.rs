//! Bulk loading of resources from property streams and config files.

mod config;
mod properties;

pub use config::{ConfigLoader, LoaderConfig};
pub use properties::parse_properties;
