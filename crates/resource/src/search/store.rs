//! ResourceStore - the public entry point.
//!
//! One store owns one tree and one object registry behind a single mutex,
//! so every operation observes and leaves a consistent state.

use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;

use super::matcher::Matcher;
use crate::error::{ensure_valid_key, ResourceError, Result};
use crate::hierarchy::{TypeHierarchy, TypeRegistry};
use crate::key::ResourceKey;
use crate::registry::{erase, ObjectRegistry, Resourced};
use crate::storage::ResourceTree;
use crate::types::{join_values, LoadReport, ResourceValue, PROBE_NAME, TIGHT_BINDING};

struct StoreState {
    tree: ResourceTree,
    registry: ObjectRegistry,
}

impl StoreState {
    fn resolve(&self, key: &str, hierarchy: &dyn TypeHierarchy) -> Result<Option<ResourceValue>> {
        let key = ResourceKey::parse(key)?;
        let matcher = Matcher::new(&self.tree, &self.registry, hierarchy);
        let value = matcher
            .find(key.as_str())
            .and_then(|index| self.tree.node(index).data())
            .and_then(ResourceValue::from_stored);
        if value.is_none() {
            log::debug!("no resource for {key}");
        }
        Ok(value)
    }

    fn insert(&mut self, key: &str, value: String) -> Result<()> {
        let key = ResourceKey::parse(key)?;
        let root = self.tree.root();
        self.tree.insert_at(root, &key, value);
        Ok(())
    }
}

/// Hierarchical wildcard resource store.
pub struct ResourceStore {
    state: Mutex<StoreState>,
    hierarchy: Box<dyn TypeHierarchy>,
}

impl std::fmt::Debug for ResourceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ResourceStore")
            .field("nodes", &state.tree.len())
            .field("objects", &state.registry.len())
            .finish()
    }
}

impl Default for ResourceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceStore {
    /// Creates an empty store whose types have no declared supertypes.
    pub fn new() -> Self {
        Self::with_hierarchy(TypeRegistry::new())
    }

    /// Creates an empty store using `hierarchy` for type fallback.
    pub fn with_hierarchy(hierarchy: impl TypeHierarchy + 'static) -> Self {
        Self {
            state: Mutex::new(StoreState {
                tree: ResourceTree::new(),
                registry: ObjectRegistry::new(),
            }),
            hierarchy: Box::new(hierarchy),
        }
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// Resolves an absolute key. `Ok(None)` means nothing matched or the
    /// matched node holds no value.
    pub fn resolve(&self, key: &str) -> Result<Option<ResourceValue>> {
        let state = self.state.lock();
        state.resolve(key, self.hierarchy.as_ref())
    }

    /// Resolves `key` relative to `object`.
    ///
    /// A registered object resolves `name.key`. An unregistered object is
    /// bound to a reserved name for the duration of the lookup, so only its
    /// type can contribute to the match; the binding is gone before this
    /// returns.
    pub fn resolve_relative<T: Resourced>(
        &self,
        object: &Arc<T>,
        key: &str,
    ) -> Result<Option<ResourceValue>> {
        ensure_valid_key(key)?;
        let type_name = object.resource_type().into_owned();
        let object = erase(object);
        let mut state = self.state.lock();

        if let Some(name) = state.registry.name_of(&object) {
            return state.resolve(&format!("{name}{TIGHT_BINDING}{key}"), self.hierarchy.as_ref());
        }

        log::debug!("resolving {key} for unregistered {type_name}");
        state
            .registry
            .store(PROBE_NAME.to_string(), &object, type_name);
        let result = state.resolve(
            &format!("{PROBE_NAME}{TIGHT_BINDING}{key}"),
            self.hierarchy.as_ref(),
        );
        state.registry.remove(&object);
        result
    }

    // ------------------------------------------------------------------
    // Insertion
    // ------------------------------------------------------------------

    /// Stores `value` under `key`, replacing any previous value.
    pub fn insert(&self, key: &str, value: impl Into<ResourceValue>) -> Result<()> {
        let value = value.into().to_stored();
        self.state.lock().insert(key, value)
    }

    /// Stores a multi-valued resource.
    pub fn insert_list<S: AsRef<str>>(&self, key: &str, values: &[S]) -> Result<()> {
        let value = join_values(values);
        self.state.lock().insert(key, value)
    }

    /// Stores `value` under `key` relative to a registered object.
    pub fn insert_relative<T: Resourced>(
        &self,
        object: &Arc<T>,
        key: &str,
        value: impl Into<ResourceValue>,
    ) -> Result<()> {
        let relative = ResourceKey::parse(key)?;
        let value = value.into().to_stored();
        let mut state = self.state.lock();

        let Some(name) = state.registry.lookup_name(object) else {
            drop(state);
            return Err(ResourceError::UnregisteredObject(
                object.resource_type().into_owned(),
            ));
        };

        match state.tree.node_for_path(&name) {
            Some(node) => {
                state.tree.insert_at(node, &relative, value);
            }
            None => {
                let absolute = ResourceKey::parse(&name)?.join(key)?;
                let root = state.tree.root();
                state.tree.insert_at(root, &absolute, value);
            }
        }
        Ok(())
    }

    /// Stores every pair, skipping keys that fail the key grammar.
    pub fn insert_pairs<I, K, V>(&self, pairs: I) -> LoadReport
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<ResourceValue>,
    {
        let mut report = LoadReport::default();
        let mut state = self.state.lock();
        for (key, value) in pairs {
            let key = key.as_ref();
            match state.insert(key, value.into().to_stored()) {
                Ok(()) => report.inserted += 1,
                Err(err) => {
                    log::warn!("skipping resource: {err}");
                    report.skipped.push(key.to_string());
                }
            }
        }
        report
    }

    // ------------------------------------------------------------------
    // Object registry
    // ------------------------------------------------------------------

    pub fn register<T: Resourced>(&self, name: &str, object: &Arc<T>) -> Result<()> {
        let type_name = object.resource_type().into_owned();
        self.state
            .lock()
            .registry
            .register_typed(name, &erase(object), type_name)
    }

    pub fn register_child<C: Resourced, P: Resourced>(
        &self,
        name: &str,
        child: &Arc<C>,
        parent: &Arc<P>,
    ) -> Result<()> {
        let type_name = child.resource_type().into_owned();
        self.state.lock().registry.register_child_typed(
            name,
            &erase(child),
            type_name,
            &erase(parent),
        )
    }

    pub fn unregister<T: Resourced>(&self, object: &Arc<T>) {
        self.state.lock().registry.unregister(object);
    }

    pub fn unregister_all(&self) {
        self.state.lock().registry.clear();
    }

    pub fn lookup_name<T: Resourced>(&self, object: &Arc<T>) -> Option<String> {
        self.state.lock().registry.lookup_name(object)
    }

    pub fn lookup_object(&self, name: &str) -> Option<Arc<dyn Resourced>> {
        self.state.lock().registry.lookup_object(name)
    }

    // ------------------------------------------------------------------
    // Whole-store operations
    // ------------------------------------------------------------------

    /// Discards every resource and registration.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        log::debug!("resetting resource store ({} nodes)", state.tree.len());
        state.tree = ResourceTree::new();
        state.registry.clear();
    }

    /// Serializes the valued nodes below `prefix` (or the whole tree) as
    /// `absoluteName: value` lines. An unknown prefix dumps the whole tree.
    pub fn dump(&self, prefix: Option<&str>) -> String {
        let state = self.state.lock();
        let start = prefix
            .and_then(|prefix| state.tree.node_for_path(prefix))
            .unwrap_or_else(|| state.tree.root());
        state.tree.dump(start)
    }

    /// Writes the whole tree to `writer`, preceded by `header` as comment
    /// lines.
    ///
    /// Header lines already starting with `#` are written as they are, the
    /// others get a `# ` prefix. Empty header lines are dropped.
    pub fn write_resources<W: Write>(&self, mut writer: W, header: Option<&str>) -> Result<()> {
        if let Some(header) = header {
            for line in header.lines().filter(|line| !line.is_empty()) {
                if line.starts_with('#') {
                    writeln!(writer, "{line}")?;
                } else {
                    writeln!(writer, "# {line}")?;
                }
            }
        }
        writer.write_all(self.dump(None).as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    pub fn is_valid_key(&self, key: &str) -> bool {
        crate::key::is_valid_key(key)
    }

    pub fn is_valid_name(&self, name: &str) -> bool {
        crate::key::is_valid_name(name)
    }
}
