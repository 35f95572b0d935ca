//! Named object registry
//!
//! Registration happens during a single-threaded initialization phase;
//! lookups happen from any thread afterwards. Entries are shared: `get`
//! hands out another reference, the registry keeps its own.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use nest_core::{NestError, NestResult, TypeTag, Value};
use parking_lot::RwLock;

/// Something stored in the registry
#[derive(Clone, Debug)]
pub enum RegisteredObject {
    /// A type identity, registered through [`Registry::register_type`]
    Type(TypeTag),
    /// Any other value
    Value(Value),
}

impl RegisteredObject {
    pub fn as_type(&self) -> Option<&TypeTag> {
        match self {
            RegisteredObject::Type(tag) => Some(tag),
            RegisteredObject::Value(_) => None,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            RegisteredObject::Value(value) => Some(value),
            RegisteredObject::Type(_) => None,
        }
    }
}

#[derive(Default)]
struct RegistryState {
    entries: HashMap<String, Arc<RegisteredObject>>,
    sealed: bool,
}

/// Name → object store.
///
/// Duplicate names are rejected with [`NestError::AlreadyRegistered`];
/// an entry is never overwritten.
#[derive(Default)]
pub struct Registry {
    state: RwLock<RegistryState>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// Register any value under `name`
    pub fn register(&self, name: &str, value: Value) -> NestResult<()> {
        self.insert(name, RegisteredObject::Value(value))
    }

    /// Register a type identity under `name`
    pub fn register_type(&self, name: &str, tag: TypeTag) -> NestResult<()> {
        self.insert(name, RegisteredObject::Type(tag))
    }

    fn insert(&self, name: &str, object: RegisteredObject) -> NestResult<()> {
        let mut state = self.state.write();
        if state.sealed {
            tracing::warn!(name, "registration after seal rejected");
            return Err(NestError::RegistrySealed(name.to_string()));
        }
        if state.entries.contains_key(name) {
            tracing::warn!(name, "duplicate registration rejected");
            return Err(NestError::AlreadyRegistered(name.to_string()));
        }
        tracing::debug!(name, "registered");
        state.entries.insert(name.to_string(), Arc::new(object));
        Ok(())
    }

    /// Look up an object by name
    pub fn get(&self, name: &str) -> NestResult<Arc<RegisteredObject>> {
        self.state
            .read()
            .entries
            .get(name)
            .cloned()
            .ok_or_else(|| NestError::NotFound(name.to_string()))
    }

    /// Look up a type identity by name
    pub fn get_type(&self, name: &str) -> NestResult<TypeTag> {
        let object = self.get(name)?;
        object
            .as_type()
            .cloned()
            .ok_or_else(|| NestError::NotAType(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.state.read().entries.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state.read().entries.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().entries.is_empty()
    }

    /// End the initialization phase. Later registrations fail.
    pub fn seal(&self) {
        let mut state = self.state.write();
        if !state.sealed {
            tracing::debug!(entries = state.entries.len(), "registry sealed");
            state.sealed = true;
        }
    }

    pub fn is_sealed(&self) -> bool {
        self.state.read().sealed
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("names", &self.names())
            .field("sealed", &self.is_sealed())
            .finish()
    }
}

/// The process-wide registry
pub fn global() -> &'static Registry {
    static GLOBAL: OnceLock<Registry> = OnceLock::new();
    GLOBAL.get_or_init(Registry::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_register_and_get() {
        let registry = Registry::new();
        registry.register("answer", Value::int(42)).unwrap();

        let object = registry.get("answer").unwrap();
        assert_eq!(object.as_value(), Some(&Value::int(42)));
        // The registry keeps its own reference
        assert_eq!(Arc::strong_count(&object), 2);
    }

    #[test]
    fn test_duplicate_rejected() {
        let registry = Registry::new();
        registry.register("x", Value::int(1)).unwrap();
        let err = registry.register("x", Value::int(2)).unwrap_err();

        assert_eq!(err, NestError::AlreadyRegistered("x".into()));
        assert_eq!(
            registry.get("x").unwrap().as_value(),
            Some(&Value::int(1))
        );
    }

    #[test]
    fn test_not_found() {
        let registry = Registry::new();
        assert_eq!(
            registry.get("missing").unwrap_err(),
            NestError::NotFound("missing".into())
        );
    }

    #[test]
    fn test_get_type() {
        let registry = Registry::new();
        registry.register_type("Tensor", TypeTag::new("Tensor")).unwrap();
        registry.register("NotAType", Value::int(0)).unwrap();

        assert_eq!(registry.get_type("Tensor").unwrap().name(), "Tensor");
        assert_eq!(
            registry.get_type("NotAType").unwrap_err(),
            NestError::NotAType("NotAType".into())
        );
    }

    #[test]
    fn test_seal() {
        let registry = Registry::new();
        registry.register("a", Value::int(1)).unwrap();
        registry.seal();

        assert!(registry.is_sealed());
        assert!(matches!(
            registry.register("b", Value::int(2)),
            Err(NestError::RegistrySealed(_))
        ));
        assert!(registry.get("a").is_ok());
    }

    #[test]
    fn test_concurrent_reads() {
        let registry = Arc::new(Registry::new());
        registry.register_type("Tensor", TypeTag::new("Tensor")).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let registry = registry.clone();
                thread::spawn(move || {
                    registry.register(&format!("value{}", i), Value::int(i)).unwrap();
                    for _ in 0..100 {
                        assert!(registry.get_type("Tensor").is_ok());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn test_global_is_shared() {
        assert!(std::ptr::eq(global(), global()));
    }
}
