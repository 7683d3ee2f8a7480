//! Opaque host values and typed access to them.
//!
//! Every reference kind is `Rc` based, which makes [`Value`] `!Send`: a closure
//! that captures a host value cannot be handed to a worker thread.

use crate::host::{ArrayBuffer, Function, HostError, Object, Promise};

use std::fmt;
use std::rc::Rc;

/// Type tag reported by [`Value::value_type`], mirroring the host's `typeof`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueType {
    Undefined,
    Null,
    Boolean,
    Number,
    String,
    Object,
    Function,
}

/// A host value.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Object(Object),
    Function(Function),
    Promise(Promise),
    Error(HostError),
    ArrayBuffer(ArrayBuffer),
}

impl Value {
    /// Creates a string value.
    pub fn string(text: impl AsRef<str>) -> Self {
        Value::String(Rc::from(text.as_ref()))
    }

    /// Creates a `Uint8Array` that takes ownership of `bytes`.
    pub fn uint8_array(bytes: Vec<u8>) -> Self {
        Value::ArrayBuffer(ArrayBuffer::from_vec(bytes))
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Undefined => ValueType::Undefined,
            Value::Null => ValueType::Null,
            Value::Bool(_) => ValueType::Boolean,
            Value::Number(_) => ValueType::Number,
            Value::String(_) => ValueType::String,
            Value::Function(_) => ValueType::Function,
            Value::Object(_) | Value::Promise(_) | Value::Error(_) | Value::ArrayBuffer(_) => {
                ValueType::Object
            }
        }
    }

    pub fn type_is(&self, expected: ValueType) -> bool {
        self.value_type() == expected
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Extracts a UTF-8 string. Non-string values yield `None`.
    pub fn to_utf8_string(&self) -> Option<String> {
        match self {
            Value::String(text) => Some(text.to_string()),
            _ => None,
        }
    }

    pub fn to_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Value::Number(number) => Some(*number),
            _ => None,
        }
    }

    /// Extracts a number truncated to `i32`. Non-finite numbers become `0`.
    pub fn to_i32(&self) -> Option<i32> {
        self.to_f64()
            .map(|n| if n.is_finite() { n as i32 } else { 0 })
    }

    /// Extracts a number truncated to `i64`. Non-finite numbers become `0`.
    pub fn to_i64(&self) -> Option<i64> {
        self.to_f64()
            .map(|n| if n.is_finite() { n as i64 } else { 0 })
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn as_promise(&self) -> Option<&Promise> {
        match self {
            Value::Promise(promise) => Some(promise),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&HostError> {
        match self {
            Value::Error(err) => Some(err),
            _ => None,
        }
    }

    pub fn as_array_buffer(&self) -> Option<&ArrayBuffer> {
        match self {
            Value::ArrayBuffer(buffer) => Some(buffer),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(flag) => write!(f, "{}", flag),
            Value::Number(number) => write!(f, "{}", number),
            Value::String(text) => write!(f, "{:?}", text),
            Value::Object(object) => write!(f, "[object {:?}]", object.keys()),
            Value::Function(function) => write!(f, "[function {}]", function.name()),
            Value::Promise(promise) => write!(f, "{:?}", promise),
            Value::Error(err) => write!(f, "{:?}", err),
            Value::ArrayBuffer(buffer) => write!(f, "[Uint8Array {}]", buffer.len()),
        }
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Value::Bool(flag)
    }
}

impl From<i32> for Value {
    fn from(number: i32) -> Self {
        Value::Number(number.into())
    }
}

impl From<i64> for Value {
    fn from(number: i64) -> Self {
        Value::Number(number as f64)
    }
}

impl From<f64> for Value {
    fn from(number: f64) -> Self {
        Value::Number(number)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::string(text)
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::String(Rc::from(text))
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Value::Object(object)
    }
}

impl From<Function> for Value {
    fn from(function: Function) -> Self {
        Value::Function(function)
    }
}

impl From<Promise> for Value {
    fn from(promise: Promise) -> Self {
        Value::Promise(promise)
    }
}

impl From<HostError> for Value {
    fn from(err: HostError) -> Self {
        Value::Error(err)
    }
}

impl From<ArrayBuffer> for Value {
    fn from(buffer: ArrayBuffer) -> Self {
        Value::ArrayBuffer(buffer)
    }
}
