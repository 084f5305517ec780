//! Property-bag base shared by every adapter object.
//!
//! Only get/set/set_values are real. The legacy binding operations exist so
//! ported callers keep running; each one logs a diagnostic and does nothing.
//! Event support is a separate capability, see [`crate::input::handler`].

use crate::{
    prelude::{Arc, HashMap, Mutex},
    MapsError,
};
use serde_json::Value;

/// Arbitrary key/value store owned by one adapter instance. Clones share
/// the same storage, the way adapter handles share their state.
#[derive(Debug, Clone, Default)]
pub struct PropertyBag {
    values: Arc<Mutex<HashMap<String, Value>>>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_values<R>(&self, f: impl FnOnce(&mut HashMap<String, Value>) -> R) -> R {
        let mut guard = self.values.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.with_values(|values| values.get(key).cloned())
    }

    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.with_values(|values| {
            values.insert(key.into(), value);
        });
    }

    pub fn len(&self) -> usize {
        self.with_values(|values| values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn unsupported(operation: &'static str) {
    log::error!("{}", MapsError::UnsupportedOperation(operation));
}

/// Generic get/set surface. Implementors only supply the bag;
/// `set_values` always routes through `set` so overrides see every pair.
pub trait MvcObject {
    fn property_bag(&self) -> &PropertyBag;

    fn get(&self, key: &str) -> Option<Value> {
        self.property_bag().get(key)
    }

    fn set(&self, key: &str, value: Value) {
        self.property_bag().set(key, value);
    }

    fn set_values(&self, values: serde_json::Map<String, Value>) {
        for (key, value) in values {
            self.set(&key, value);
        }
    }

    fn bind_to(&self, _key: &str, _target: &dyn MvcObject, _target_key: Option<&str>, _no_notify: bool) {
        unsupported("bindTo");
    }

    fn notify(&self, _key: &str) {
        unsupported("notify");
    }

    fn unbind(&self, _key: &str) {
        unsupported("unbind");
    }

    fn unbind_all(&self) {
        unsupported("unbindAll");
    }
}

/// Standalone property bag, the adapter-free base object.
#[derive(Debug, Clone, Default)]
pub struct BaseObject {
    properties: PropertyBag,
}

impl BaseObject {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MvcObject for BaseObject {
    fn property_bag(&self) -> &PropertyBag {
        &self.properties
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_get_set() {
        let object = BaseObject::new();
        assert_eq!(object.get("zoom"), None);
        object.set("zoom", json!(12));
        assert_eq!(object.get("zoom"), Some(json!(12)));
        object.set("zoom", json!(13));
        assert_eq!(object.get("zoom"), Some(json!(13)));
    }

    #[test]
    fn test_clones_share_storage() {
        let object = BaseObject::new();
        let handle = object.clone();
        handle.set("title", json!("shared"));
        assert_eq!(object.get("title"), Some(json!("shared")));
    }

    #[test]
    fn test_set_values_routes_through_set() {
        struct Counting {
            properties: PropertyBag,
            sets: AtomicUsize,
        }

        impl MvcObject for Counting {
            fn property_bag(&self) -> &PropertyBag {
                &self.properties
            }
            fn set(&self, key: &str, value: Value) {
                self.sets.fetch_add(1, Ordering::SeqCst);
                self.properties.set(key, value);
            }
        }

        let object = Counting {
            properties: PropertyBag::new(),
            sets: AtomicUsize::new(0),
        };
        let values = json!({ "a": 1, "b": "two", "c": null });
        object.set_values(values.as_object().cloned().unwrap_or_default());
        assert_eq!(object.sets.load(Ordering::SeqCst), 3);
        assert_eq!(object.get("b"), Some(json!("two")));
        assert_eq!(object.property_bag().len(), 3);
    }

    #[test]
    fn test_legacy_binding_is_inert() {
        let object = BaseObject::new();
        object.set("title", json!("x"));
        let other = BaseObject::new();
        object.bind_to("title", &other, None, false);
        object.notify("title");
        object.unbind("title");
        object.unbind_all();
        assert_eq!(object.get("title"), Some(json!("x")));
    }
}
