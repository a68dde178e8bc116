//! Type ancestry used for type-based fallback matching.
//!
//! The store never reflects on Rust types. Applications describe how their
//! resource types relate through a [`TypeHierarchy`], most simply by
//! declaring them in a [`TypeRegistry`].

use std::collections::HashSet;

use fnv::FnvHashMap;

/// Describes the declared supertypes of a type name.
///
/// Queried while the owning store is locked, so implementations must not
/// call back into that store.
pub trait TypeHierarchy: Send + Sync {
    /// Directly declared interfaces of `type_name`, in declaration order.
    fn interfaces(&self, type_name: &str) -> Vec<String>;

    /// Superclass of `type_name`, if any.
    fn superclass(&self, type_name: &str) -> Option<String>;

    /// Candidate names in fallback order.
    ///
    /// Starts with `type_name` itself, then its declared interfaces, then
    /// repeats for the superclass until the chain ends. A type seen twice
    /// ends the walk.
    fn ancestry(&self, type_name: &str) -> Vec<String> {
        let mut ordered = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(type_name.to_string());

        while let Some(ty) = current.take() {
            if !seen.insert(ty.clone()) {
                break;
            }
            let interfaces = self.interfaces(&ty);
            let superclass = self.superclass(&ty);
            ordered.push(ty);
            for interface in interfaces {
                if !ordered.contains(&interface) {
                    ordered.push(interface);
                }
            }
            current = superclass;
        }

        ordered
    }
}

/// Declared relationships of one type.
#[derive(Debug, Clone, Default)]
struct TypeDecl {
    superclass: Option<String>,
    interfaces: Vec<String>,
}

/// Table-driven [`TypeHierarchy`].
///
/// Types that were never declared have no supertypes.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: FnvHashMap<String, TypeDecl>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `type_name` with its superclass and directly implemented
    /// interfaces, replacing any earlier declaration.
    pub fn declare(
        &mut self,
        type_name: impl Into<String>,
        superclass: Option<&str>,
        interfaces: &[&str],
    ) -> &mut Self {
        self.types.insert(
            type_name.into(),
            TypeDecl {
                superclass: superclass.map(ToString::to_string),
                interfaces: interfaces.iter().map(ToString::to_string).collect(),
            },
        );
        self
    }
}

impl TypeHierarchy for TypeRegistry {
    fn interfaces(&self, type_name: &str) -> Vec<String> {
        self.types
            .get(type_name)
            .map(|decl| decl.interfaces.clone())
            .unwrap_or_default()
    }

    fn superclass(&self, type_name: &str) -> Option<String> {
        self.types
            .get(type_name)
            .and_then(|decl| decl.superclass.clone())
    }
}
