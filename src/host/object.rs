//! Host objects: named properties plus an optional native payload.

use crate::host::{Function, Value};

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use tracing::error;

/// A host object.
///
/// Cloning yields another reference to the same object.
#[derive(Clone, Default)]
pub struct Object {
    inner: Rc<ObjectInner>,
}

#[derive(Default)]
struct ObjectInner {
    props: RefCell<Vec<(String, Value)>>,
    native: RefCell<Option<Box<dyn Any>>>,
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_prop(&self, name: &str) -> bool {
        self.inner.props.borrow().iter().any(|(key, _)| key == name)
    }

    /// Returns the property value, or `None` when the property is absent.
    pub fn get_prop(&self, name: &str) -> Option<Value> {
        self.inner
            .props
            .borrow()
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    }

    /// Adds a new property. Refuses to replace an existing one.
    pub fn add_prop(&self, name: &str, value: Value) -> bool {
        if self.has_prop(name) {
            error!(property = name, "property is already defined on this object");
            return false;
        }

        self.inner.props.borrow_mut().push((name.to_string(), value));
        true
    }

    /// Defines a batch of properties, replacing any with the same name.
    pub fn define_properties(&self, descriptors: Vec<PropertyDescriptor>) {
        let mut props = self.inner.props.borrow_mut();

        for descriptor in descriptors {
            let (name, value) = descriptor.into_parts();
            match props.iter_mut().find(|(key, _)| *key == name) {
                Some(slot) => slot.1 = value,
                None => props.push((name, value)),
            }
        }
    }

    /// Property names in definition order.
    pub fn keys(&self) -> Vec<String> {
        self.inner
            .props
            .borrow()
            .iter()
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Attaches native state to the object. Fails if state is already attached.
    pub fn wrap<T: 'static>(&self, native: T) -> bool {
        let mut slot = self.inner.native.borrow_mut();
        if slot.is_some() {
            return false;
        }

        *slot = Some(Box::new(native));
        true
    }

    /// Runs `f` against the attached native state when it has type `T`.
    pub fn with_native<T: 'static, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut slot = self.inner.native.borrow_mut();
        slot.as_mut()
            .and_then(|native| native.downcast_mut::<T>())
            .map(f)
    }

    pub fn ptr_eq(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

/// A property to install with [`Object::define_properties`].
pub struct PropertyDescriptor {
    name: String,
    value: Value,
}

impl PropertyDescriptor {
    /// Plain data property.
    pub fn value(name: &str, value: Value) -> Self {
        Self {
            name: name.to_string(),
            value,
        }
    }

    /// Method property backed by a native function.
    pub fn function(name: &str, function: Function) -> Self {
        Self {
            name: name.to_string(),
            value: Value::Function(function),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn into_parts(self) -> (String, Value) {
        (self.name, self.value)
    }
}
