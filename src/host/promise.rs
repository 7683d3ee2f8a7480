//! Deferred values: a promise visible to scripts and the handle that settles it.
//!
//! [`Env::create_promise`] hands out a [`Promise`] (given to the host) and a
//! [`Deferred`] (kept by native code). Settling consumes the `Deferred`, so a
//! promise is resolved or rejected at most once.
//!
//! # How Settlement Works
//!
//! 1. The promise starts `Pending` and collects reactions registered with
//!    [`Promise::on_settled`]
//! 2. [`Deferred::resolve`] or [`Deferred::reject`] stores the outcome
//! 3. Each stored reaction is queued as a microtask on the loop thread
//! 4. Reactions registered after settlement are queued immediately
//!
//! ```ignore
//! let (deferred, promise) = env.create_promise();
//! promise.on_settled(env, |_env, outcome| println!("{:?}", outcome));
//! deferred.resolve(env, Value::from(42));
//! ```

use crate::host::Value;
use crate::runtime::Env;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

type Reaction = Box<dyn FnOnce(&Env, Result<Value, Value>)>;

/// Observable state of a promise.
#[derive(Clone, Debug)]
pub enum PromiseState {
    Pending,
    Fulfilled(Value),
    Rejected(Value),
}

struct PromiseInner {
    state: RefCell<PromiseState>,
    reactions: RefCell<Vec<Reaction>>,
}

/// Host-visible promise.
#[derive(Clone)]
pub struct Promise {
    inner: Rc<PromiseInner>,
}

/// Native handle that settles the matching [`Promise`].
pub struct Deferred {
    inner: Rc<PromiseInner>,
}

impl Promise {
    pub(crate) fn pending() -> (Deferred, Promise) {
        let inner = Rc::new(PromiseInner {
            state: RefCell::new(PromiseState::Pending),
            reactions: RefCell::new(Vec::new()),
        });

        (
            Deferred {
                inner: inner.clone(),
            },
            Promise { inner },
        )
    }

    pub fn state(&self) -> PromiseState {
        self.inner.state.borrow().clone()
    }

    pub fn is_pending(&self) -> bool {
        matches!(*self.inner.state.borrow(), PromiseState::Pending)
    }

    /// Registers a reaction that runs as a microtask once the promise settles.
    ///
    /// The reaction receives `Ok(value)` on fulfilment and `Err(reason)` on rejection.
    pub fn on_settled<F>(&self, env: &Env, reaction: F)
    where
        F: FnOnce(&Env, Result<Value, Value>) + 'static,
    {
        let outcome = match &*self.inner.state.borrow() {
            PromiseState::Pending => None,
            PromiseState::Fulfilled(value) => Some(Ok(value.clone())),
            PromiseState::Rejected(reason) => Some(Err(reason.clone())),
        };

        match outcome {
            Some(outcome) => env.enqueue_microtask(move |env| reaction(env, outcome)),
            None => self.inner.reactions.borrow_mut().push(Box::new(reaction)),
        }
    }
}

impl fmt::Debug for Promise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.inner.state.borrow() {
            PromiseState::Pending => f.write_str("Promise { <pending> }"),
            PromiseState::Fulfilled(value) => write!(f, "Promise {{ {:?} }}", value),
            PromiseState::Rejected(reason) => write!(f, "Promise {{ <rejected> {:?} }}", reason),
        }
    }
}

impl Deferred {
    pub fn resolve(self, env: &Env, value: Value) {
        self.settle(env, Ok(value));
    }

    pub fn reject(self, env: &Env, reason: Value) {
        self.settle(env, Err(reason));
    }

    fn settle(self, env: &Env, outcome: Result<Value, Value>) {
        *self.inner.state.borrow_mut() = match &outcome {
            Ok(value) => PromiseState::Fulfilled(value.clone()),
            Err(reason) => PromiseState::Rejected(reason.clone()),
        };

        let reactions: Vec<Reaction> = self.inner.reactions.borrow_mut().drain(..).collect();
        for reaction in reactions {
            let outcome = outcome.clone();
            env.enqueue_microtask(move |env| reaction(env, outcome));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::runtime::ThreadPool;
    use crate::runtime::queue::CompletionQueue;

    use std::sync::Arc;

    fn env() -> Env {
        let pool = ThreadPool::new(1, 1, "promise-test").unwrap();
        Env::new(Arc::new(CompletionQueue::new()), Arc::new(pool))
    }

    #[test]
    fn reactions_run_as_microtasks() {
        let env = env();
        let (deferred, promise) = env.create_promise();
        let seen = Rc::new(RefCell::new(None));

        let sink = seen.clone();
        promise.on_settled(&env, move |_env, outcome| {
            *sink.borrow_mut() = Some(outcome.map(|v| v.to_i32()).map_err(|v| v.to_i32()));
        });

        deferred.resolve(&env, Value::from(7));
        assert!(!promise.is_pending());
        assert!(seen.borrow().is_none(), "Reactions wait for the microtask drain");

        env.run_microtasks();
        assert_eq!(*seen.borrow(), Some(Ok(Some(7))));
    }

    #[test]
    fn late_reaction_sees_rejection() {
        let env = env();
        let (deferred, promise) = env.create_promise();
        deferred.reject(&env, Value::from("nope"));

        let seen = Rc::new(RefCell::new(false));
        let sink = seen.clone();
        promise.on_settled(&env, move |_env, outcome| {
            *sink.borrow_mut() = outcome.is_err();
        });

        env.run_microtasks();
        assert!(*seen.borrow());
        assert!(matches!(promise.state(), PromiseState::Rejected(_)));
    }
}
