//! Per-node key/value data container
//!
//! Components communicate across component boundaries through their node's
//! container rather than through direct references: a producer writes or
//! notifies a named property, consumers subscribe to that property's
//! changed signal. Properties use key-value naming (no positional
//! coupling), and a property can be used notification-only for values that
//! are computed lazily, where the flag travels eagerly and the value is
//! pulled on demand.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::events::Signal;
use crate::foundation::math::{Mat4, Vec3};

/// Variant for typed property values
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Boolean flag
    Bool(bool),
    /// Scalar value
    Float(f32),
    /// 3D vector value
    Vec3(Vec3),
    /// 4x4 matrix value
    Mat4(Mat4),
    /// Text value
    String(String),
}

/// Key/value store with per-property change signals
pub struct Container {
    values: RefCell<HashMap<String, PropertyValue>>,
    changed: RefCell<HashMap<String, Rc<Signal<String>>>>,
}

impl Container {
    /// Create an empty container
    pub fn new() -> Self {
        Self {
            values: RefCell::new(HashMap::new()),
            changed: RefCell::new(HashMap::new()),
        }
    }

    /// Store a property value and fire its changed signal
    pub fn set(&self, name: &str, value: PropertyValue) {
        self.values.borrow_mut().insert(name.to_string(), value);
        self.notify(name);
    }

    /// Get a property value by name
    pub fn get(&self, name: &str) -> Option<PropertyValue> {
        self.values.borrow().get(name).cloned()
    }

    /// Check whether a property has a stored value
    pub fn has_property(&self, name: &str) -> bool {
        self.values.borrow().contains_key(name)
    }

    /// Remove a property; fires the changed signal if a value was stored
    pub fn remove(&self, name: &str) -> Option<PropertyValue> {
        let removed = self.values.borrow_mut().remove(name);
        if removed.is_some() {
            self.notify(name);
        }
        removed
    }

    /// The changed signal for one property, created on demand.
    ///
    /// The signal fires with the property name whenever the property is
    /// set, removed, or explicitly notified.
    pub fn property_changed(&self, name: &str) -> Rc<Signal<String>> {
        self.changed
            .borrow_mut()
            .entry(name.to_string())
            .or_insert_with(|| Rc::new(Signal::new()))
            .clone()
    }

    /// Fire a property's changed signal without storing a value.
    ///
    /// Used for lazily computed properties (e.g. the world transform)
    /// where only the invalidation travels through the container.
    pub fn notify(&self, name: &str) {
        let signal = self.changed.borrow().get(name).cloned();
        if let Some(signal) = signal {
            signal.execute(&name.to_string());
        }
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}
