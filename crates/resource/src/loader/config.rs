//! Config file bootstrap: an initial file plus the files it chains to.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ResourceError, Result};
use crate::search::ResourceStore;
use crate::types::LoadReport;

/// Where config files are looked up and how they chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Directories searched in order for relative file names.
    pub search_paths: Vec<PathBuf>,
    /// Resource naming further files to load after the initial one.
    pub chain_property: Option<String>,
    /// Warn about chained files that cannot be found.
    pub verbose: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            search_paths: vec![PathBuf::from(".")],
            chain_property: None,
            verbose: false,
        }
    }
}

/// Loads property files into a store.
#[derive(Debug)]
pub struct ConfigLoader<'a> {
    store: &'a ResourceStore,
    config: LoaderConfig,
}

impl<'a> ConfigLoader<'a> {
    pub fn new(store: &'a ResourceStore, config: LoaderConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Loads `initial`, then every file named by the chain property.
    ///
    /// A missing initial file is an error. Missing chained files are
    /// skipped.
    pub fn load_config_files(&self, initial: &str) -> Result<LoadReport> {
        let mut report = self.load_config_file(initial)?;

        let Some(property) = self.config.chain_property.as_deref() else {
            return Ok(report);
        };
        let Some(chained) = self.store.resolve(property)? else {
            return Ok(report);
        };

        for name in chained.to_list() {
            match self.load_config_file(&name) {
                Ok(loaded) => report.merge(loaded),
                Err(ResourceError::ConfigNotFound(path)) => {
                    if self.config.verbose {
                        log::warn!("chained config file {} could not be located", path.display());
                    } else {
                        log::debug!("skipping missing config file {}", path.display());
                    }
                }
                Err(err) => return Err(err),
            }
        }

        Ok(report)
    }

    /// Loads a single file.
    pub fn load_config_file(&self, name: &str) -> Result<LoadReport> {
        let path = self
            .locate(name)
            .ok_or_else(|| ResourceError::ConfigNotFound(PathBuf::from(name)))?;
        log::debug!("loading config file {}", path.display());
        self.store.read_resources(File::open(&path)?)
    }

    /// First existing file for `name`: absolute names as given, relative
    /// names under each search path in order.
    pub fn locate(&self, name: &str) -> Option<PathBuf> {
        let candidate = Path::new(name);
        if candidate.is_absolute() {
            return candidate.is_file().then(|| candidate.to_path_buf());
        }
        self.config
            .search_paths
            .iter()
            .map(|dir| dir.join(candidate))
            .find(|path| path.is_file())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::types::ResourceValue;

    fn config_for(dirs: &[&Path]) -> LoaderConfig {
        LoaderConfig {
            search_paths: dirs.iter().map(|dir| dir.to_path_buf()).collect(),
            chain_property: Some("config.files".to_string()),
            verbose: true,
        }
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: LoaderConfig =
            serde_json::from_str(r#"{ "verbose": true }"#).expect("deserialize");
        assert!(config.verbose);
        assert_eq!(config.search_paths, vec![PathBuf::from(".")]);
        assert!(config.chain_property.is_none());

        let config: LoaderConfig = serde_json::from_str(
            r#"{ "search_paths": ["/etc/app", "conf"], "chain_property": "config.files" }"#,
        )
        .expect("deserialize");
        assert_eq!(config.search_paths.len(), 2);
        assert_eq!(config.chain_property.as_deref(), Some("config.files"));
        assert!(!config.verbose);
    }

    #[test]
    fn loads_initial_and_chained_files() {
        let first = tempfile::tempdir().expect("tempdir");
        let second = tempfile::tempdir().expect("tempdir");
        fs::write(
            first.path().join("main.properties"),
            "config.files = extra.properties | missing.properties\n*width = 640\n",
        )
        .expect("write main");
        fs::write(second.path().join("extra.properties"), "*height = 480\n").expect("write extra");

        let store = ResourceStore::new();
        let loader = ConfigLoader::new(&store, config_for(&[first.path(), second.path()]));
        let report = loader
            .load_config_files("main.properties")
            .expect("load");

        assert_eq!(report.inserted, 3);
        assert_eq!(
            store.resolve("frame.height").expect("valid key"),
            Some(ResourceValue::Single("480".to_string()))
        );
    }

    #[test]
    fn missing_initial_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ResourceStore::new();
        let loader = ConfigLoader::new(&store, config_for(&[dir.path()]));

        let err = loader
            .load_config_files("absent.properties")
            .expect_err("missing file");
        assert!(matches!(err, ResourceError::ConfigNotFound(path) if path == Path::new("absent.properties")));
    }

    #[test]
    fn earlier_search_paths_win() {
        let first = tempfile::tempdir().expect("tempdir");
        let second = tempfile::tempdir().expect("tempdir");
        fs::write(first.path().join("app.properties"), "title = first\n").expect("write");
        fs::write(second.path().join("app.properties"), "title = second\n").expect("write");

        let store = ResourceStore::new();
        let loader = ConfigLoader::new(&store, config_for(&[first.path(), second.path()]));
        loader.load_config_file("app.properties").expect("load");

        assert_eq!(
            store.resolve("title").expect("valid key"),
            Some(ResourceValue::Single("first".to_string()))
        );
    }

    #[test]
    fn absolute_names_bypass_search_paths() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("abs.properties");
        fs::write(&path, "*depth = 3\n").expect("write");

        let store = ResourceStore::new();
        let loader = ConfigLoader::new(&store, LoaderConfig::default());
        let name = path.to_str().expect("utf8 path");
        loader.load_config_file(name).expect("load");
        assert_eq!(store.fetch_int("depth", 0).expect("int"), 3);
    }
}
