//! Object registry: binds live objects to absolute names in the namespace.
//!
//! The registry never owns what it records. Entries hold [`Weak`] handles,
//! so dropping the last application `Arc` makes the entry read as absent;
//! dead entries are purged on the next registration or an explicit
//! [`ObjectRegistry::prune`].

use std::borrow::Cow;
use std::sync::{Arc, Weak};

use fnv::FnvHashMap;

use crate::error::{ResourceError, Result};
use crate::key::is_valid_name;
use crate::types::TIGHT_BINDING;

/// An application object that can resolve resources by its position.
pub trait Resourced: Send + Sync + 'static {
    /// Runtime type name used for type-based fallback.
    ///
    /// Defaults to the Rust type path with `::` replaced by `/`, which is
    /// always classified as a type segment. Read once per registration or
    /// relative lookup, never while a store is locked.
    fn resource_type(&self) -> Cow<'_, str> {
        Cow::Owned(std::any::type_name::<Self>().replace("::", "/"))
    }
}

/// Allocation identity of a registered object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ObjectKey(usize);

impl ObjectKey {
    fn of(object: &Arc<dyn Resourced>) -> Self {
        Self(Arc::as_ptr(object) as *const () as usize)
    }
}

#[derive(Debug)]
struct NameEntry {
    name: String,
    object: Weak<dyn Resourced>,
}

#[derive(Debug)]
struct ObjectEntry {
    key: ObjectKey,
    type_name: String,
    object: Weak<dyn Resourced>,
}

/// Bidirectional object/name table with weak ownership.
#[derive(Debug, Default)]
pub struct ObjectRegistry {
    /// object -> absolute name; replaced on re-registration.
    names: FnvHashMap<ObjectKey, NameEntry>,
    /// absolute name -> first object registered under it.
    objects: FnvHashMap<String, ObjectEntry>,
}

impl std::fmt::Debug for dyn Resourced {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resourced")
            .field("type", &self.resource_type())
            .finish()
    }
}

/// Type-erases an object handle without changing its identity.
pub(crate) fn erase<T: Resourced>(object: &Arc<T>) -> Arc<dyn Resourced> {
    object.clone()
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `object` under `name`.
    ///
    /// A name containing tight delimiters is an absolute prefix such as
    /// `app.display.special`; each of its segments must be a valid name.
    pub fn register<T: Resourced>(&mut self, name: &str, object: &Arc<T>) -> Result<()> {
        let type_name = object.resource_type().into_owned();
        self.register_typed(name, &erase(object), type_name)
    }

    /// Like [`register`](Self::register), with the object's type already read.
    pub(crate) fn register_typed(
        &mut self,
        name: &str,
        object: &Arc<dyn Resourced>,
        type_name: String,
    ) -> Result<()> {
        validate_registration_name(name)?;
        self.store(name.to_string(), object, type_name);
        Ok(())
    }

    /// Registers `child` as `name` below the already registered `parent`.
    pub fn register_child<C: Resourced, P: Resourced>(
        &mut self,
        name: &str,
        child: &Arc<C>,
        parent: &Arc<P>,
    ) -> Result<()> {
        let type_name = child.resource_type().into_owned();
        self.register_child_typed(name, &erase(child), type_name, &erase(parent))
    }

    pub(crate) fn register_child_typed(
        &mut self,
        name: &str,
        child: &Arc<dyn Resourced>,
        type_name: String,
        parent: &Arc<dyn Resourced>,
    ) -> Result<()> {
        if !is_valid_name(name) {
            return Err(ResourceError::InvalidName(name.to_string()));
        }
        let parent_name = self
            .name_of(parent)
            .ok_or_else(|| ResourceError::UnregisteredParent(name.to_string()))?;
        self.store(format!("{parent_name}{TIGHT_BINDING}{name}"), child, type_name);
        Ok(())
    }

    /// Records the mapping without validating `name`.
    pub(crate) fn store(&mut self, name: String, object: &Arc<dyn Resourced>, type_name: String) {
        self.prune();

        let key = ObjectKey::of(object);
        let weak = Arc::downgrade(object);
        self.objects.entry(name.clone()).or_insert_with(|| ObjectEntry {
            key,
            type_name,
            object: weak.clone(),
        });
        self.names.insert(key, NameEntry { name, object: weak });
    }

    /// Removes `object`. The name side is only cleared when it still points
    /// at this same object.
    pub fn unregister<T: Resourced>(&mut self, object: &Arc<T>) {
        self.remove(&erase(object));
    }

    pub(crate) fn remove(&mut self, object: &Arc<dyn Resourced>) {
        let key = ObjectKey::of(object);
        let Some(entry) = self.names.remove(&key) else {
            return;
        };
        if self
            .objects
            .get(&entry.name)
            .is_some_and(|owner| owner.key == key)
        {
            self.objects.remove(&entry.name);
        }
    }

    /// Forgets every registration.
    pub fn clear(&mut self) {
        self.names.clear();
        self.objects.clear();
    }

    /// Absolute name `object` is registered under.
    pub fn lookup_name<T: Resourced>(&self, object: &Arc<T>) -> Option<String> {
        self.name_of(&erase(object))
    }

    pub(crate) fn name_of(&self, object: &Arc<dyn Resourced>) -> Option<String> {
        self.names
            .get(&ObjectKey::of(object))
            .filter(|entry| entry.object.strong_count() > 0)
            .map(|entry| entry.name.clone())
    }

    /// Object registered under `name`, if it is still alive.
    pub fn lookup_object(&self, name: &str) -> Option<Arc<dyn Resourced>> {
        self.objects.get(name)?.object.upgrade()
    }

    /// Type name recorded for the live object registered under `name`.
    pub fn type_of(&self, name: &str) -> Option<&str> {
        self.objects
            .get(name)
            .filter(|entry| entry.object.strong_count() > 0)
            .map(|entry| entry.type_name.as_str())
    }

    /// Drops entries whose objects no longer exist.
    pub fn prune(&mut self) {
        self.names.retain(|_, entry| entry.object.strong_count() > 0);
        self.objects.retain(|_, entry| entry.object.strong_count() > 0);
    }

    /// Number of live object registrations.
    pub fn len(&self) -> usize {
        self.names
            .values()
            .filter(|entry| entry.object.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn validate_registration_name(name: &str) -> Result<()> {
    let valid = if name.contains(TIGHT_BINDING) {
        name.split(TIGHT_BINDING).all(is_valid_name)
    } else {
        is_valid_name(name)
    };
    if valid {
        Ok(())
    } else {
        Err(ResourceError::InvalidName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Frame;
    impl Resourced for Frame {}

    struct Panel;
    impl Resourced for Panel {
        fn resource_type(&self) -> Cow<'_, str> {
            Cow::Borrowed("ui/Panel")
        }
    }

    fn same(a: &Arc<dyn Resourced>, b: &Arc<impl Resourced>) -> bool {
        Arc::ptr_eq(a, &erase(b))
    }

    #[test]
    fn default_type_name_is_a_type_path() {
        let frame = Frame;
        let ty = frame.resource_type();
        assert!(ty.ends_with("/Frame"), "unexpected type name {ty}");
        assert!(!ty.contains("::"));
        assert_eq!(Panel.resource_type(), "ui/Panel");
    }

    #[test]
    fn register_and_look_up_both_ways() {
        let mut registry = ObjectRegistry::new();
        let frame = Arc::new(Frame);
        registry.register("app.frame", &frame).expect("register");

        assert_eq!(registry.lookup_name(&frame).as_deref(), Some("app.frame"));
        let found = registry.lookup_object("app.frame").expect("object");
        assert!(same(&found, &frame));
    }

    #[test]
    fn register_rejects_invalid_names() {
        let mut registry = ObjectRegistry::new();
        let frame = Arc::new(Frame);
        for name in ["Frame", "a*b", "a b", "a.?", "a.B", "", "ui/frame"] {
            let err = registry.register(name, &frame).expect_err(name);
            assert!(matches!(err, ResourceError::InvalidName(_)));
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn register_child_requires_registered_parent() {
        let mut registry = ObjectRegistry::new();
        let frame = Arc::new(Frame);
        let panel = Arc::new(Panel);

        let err = registry
            .register_child("panel", &panel, &frame)
            .expect_err("parent missing");
        assert!(matches!(err, ResourceError::UnregisteredParent(name) if name == "panel"));

        registry.register("frame", &frame).expect("register parent");
        let err = registry
            .register_child("Panel", &panel, &frame)
            .expect_err("bad child name");
        assert!(matches!(err, ResourceError::InvalidName(_)));

        registry
            .register_child("panel", &panel, &frame)
            .expect("register child");
        assert_eq!(registry.lookup_name(&panel).as_deref(), Some("frame.panel"));
    }

    #[test]
    fn first_object_keeps_the_name() {
        let mut registry = ObjectRegistry::new();
        let first = Arc::new(Frame);
        let second = Arc::new(Frame);
        registry.register("shared", &first).expect("first");
        registry.register("shared", &second).expect("second");

        assert_eq!(registry.lookup_name(&second).as_deref(), Some("shared"));
        let owner = registry.lookup_object("shared").expect("owner");
        assert!(same(&owner, &first));

        // Removing the non-owner leaves the name mapping alone.
        registry.unregister(&second);
        assert!(registry.lookup_name(&second).is_none());
        assert!(same(&registry.lookup_object("shared").expect("owner"), &first));

        registry.unregister(&first);
        assert!(registry.lookup_object("shared").is_none());
    }

    #[test]
    fn reregistration_replaces_object_name() {
        let mut registry = ObjectRegistry::new();
        let frame = Arc::new(Frame);
        registry.register("old", &frame).expect("old");
        registry.register("new", &frame).expect("new");
        assert_eq!(registry.lookup_name(&frame).as_deref(), Some("new"));
        // The name side keeps its first writer.
        assert!(registry.lookup_object("old").is_some());
    }

    #[test]
    fn type_name_is_recorded_at_registration() {
        let mut registry = ObjectRegistry::new();
        let frame = Arc::new(Frame);
        let panel = Arc::new(Panel);
        registry.register("frame", &frame).expect("register");
        registry
            .register_child("panel", &panel, &frame)
            .expect("register child");

        assert_eq!(registry.type_of("frame.panel"), Some("ui/Panel"));
        assert!(registry.type_of("frame").is_some_and(|ty| ty.ends_with("/Frame")));
        assert_eq!(registry.type_of("missing"), None);

        drop(panel);
        assert_eq!(registry.type_of("frame.panel"), None);
    }

    #[test]
    fn dropped_objects_read_as_absent() {
        let mut registry = ObjectRegistry::new();
        let frame = Arc::new(Frame);
        registry.register("frame", &frame).expect("register");
        assert_eq!(registry.len(), 1);

        drop(frame);
        assert!(registry.lookup_object("frame").is_none());
        assert_eq!(registry.len(), 0);

        registry.prune();
        assert!(registry.objects.is_empty());
        assert!(registry.names.is_empty());
    }

    #[test]
    fn unregister_then_lookup_name_is_absent() {
        let mut registry = ObjectRegistry::new();
        let frame = Arc::new(Frame);
        registry.register("frame", &frame).expect("register");
        registry.unregister(&frame);
        assert!(registry.lookup_name(&frame).is_none());
        assert!(registry.lookup_object("frame").is_none());
    }
}
