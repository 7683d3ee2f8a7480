//! Native functions callable from the host, and the argument view they receive.

use crate::error::FileIoError;
use crate::host::{HostResult, Value};
use crate::runtime::Env;

use std::fmt;
use std::rc::Rc;

type NativeCallback = dyn Fn(&Env, &CallbackInfo) -> HostResult<Value>;

/// A host function backed by a native closure.
#[derive(Clone)]
pub struct Function {
    name: Rc<str>,
    callback: Rc<NativeCallback>,
}

impl Function {
    pub fn new<F>(name: &str, callback: F) -> Self
    where
        F: Fn(&Env, &CallbackInfo) -> HostResult<Value> + 'static,
    {
        Self {
            name: Rc::from(name),
            callback: Rc::new(callback),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invokes the function with `this` as receiver.
    pub fn call(&self, env: &Env, this: Value, args: Vec<Value>) -> HostResult<Value> {
        let info = CallbackInfo::new(this, args);
        (self.callback)(env, &info)
    }

    pub fn ptr_eq(&self, other: &Function) -> bool {
        Rc::ptr_eq(&self.callback, &other.callback)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function").field("name", &self.name).finish()
    }
}

/// Receiver and arguments of a native call.
///
/// Missing positional arguments read as `undefined`.
pub struct CallbackInfo {
    this: Value,
    args: Vec<Value>,
}

impl CallbackInfo {
    pub fn new(this: Value, args: Vec<Value>) -> Self {
        Self { this, args }
    }

    /// Checks that the argument count lies within `min..=max`.
    pub fn init_args(&self, min: usize, max: usize) -> Result<(), FileIoError> {
        let actual = self.args.len();
        if actual < min || actual > max {
            return Err(FileIoError::ArgumentCount { min, max, actual });
        }

        Ok(())
    }

    pub fn argc(&self) -> usize {
        self.args.len()
    }

    pub fn arg(&self, index: usize) -> Value {
        self.args.get(index).cloned().unwrap_or_default()
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn this(&self) -> &Value {
        &self.this
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_args_is_inclusive() {
        let info = CallbackInfo::new(Value::Undefined, vec![Value::from("a")]);
        assert!(info.init_args(1, 1).is_ok());
        assert!(info.init_args(1, 2).is_ok());
        assert_eq!(
            info.init_args(2, 3),
            Err(FileIoError::ArgumentCount {
                min: 2,
                max: 3,
                actual: 1
            })
        );

        let empty = CallbackInfo::new(Value::Undefined, Vec::new());
        assert!(empty.init_args(1, 2).is_err());
        assert!(empty.init_args(0, 0).is_ok());
    }

    #[test]
    fn missing_arguments_are_undefined() {
        let info = CallbackInfo::new(Value::Null, vec![Value::from(1)]);
        assert_eq!(info.argc(), 1);
        assert!(info.arg(5).is_undefined());
        assert_eq!(info.arg(0).to_i32(), Some(1));
        assert!(info.this().is_null());
    }
}
