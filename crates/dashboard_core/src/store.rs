//! The process-wide state container.
//!
//! All writes go through [`Store::dispatch`], which runs the middleware chain
//! and finally the reducer. Readers either take a snapshot with
//! [`Store::get_state`] or watch for changes with [`Store::subscribe`].

use std::{fmt, future::Future, sync::Arc};

use futures::{future::BoxFuture, FutureExt};
use tokio::{sync::watch, task::JoinHandle};
use tracing::warn;

use crate::{
    action::Action,
    history::History,
    state::{AppState, Reducer},
};

pub type Thunk = Box<dyn FnOnce(Store) -> BoxFuture<'static, ()> + Send>;

pub enum Dispatchable {
    Action(Action),
    Thunk(Thunk),
}

impl fmt::Debug for Dispatchable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Action(action) => f.debug_tuple("Action").field(action).finish(),
            Self::Thunk(_) => f.write_str("Thunk(..)"),
        }
    }
}

impl From<Action> for Dispatchable {
    fn from(value: Action) -> Self {
        Self::Action(value)
    }
}

/// Wraps an async action creator so it can be dispatched.
pub fn thunk<F, Fut>(f: F) -> Dispatchable
where
    F: FnOnce(Store) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Dispatchable::Thunk(Box::new(move |store| f(store).boxed()))
}

#[derive(Debug)]
pub enum Dispatched {
    /// The action reached the reducer.
    Reduced,
    /// A thunk was started; the handle resolves when it finishes.
    Spawned(JoinHandle<()>),
    /// A middleware consumed the action.
    Intercepted,
    /// Nothing could handle it (a thunk with no thunk middleware installed).
    Dropped,
}

impl Dispatched {
    pub fn into_task(self) -> Option<JoinHandle<()>> {
        match self {
            Self::Spawned(handle) => Some(handle),
            _ => None,
        }
    }
}

pub type Next<'a> = &'a dyn Fn(Dispatchable) -> Dispatched;

pub trait Middleware: Send + Sync {
    fn handle(&self, store: &Store, dispatchable: Dispatchable, next: Next<'_>) -> Dispatched;
}

struct StoreInner {
    state: watch::Sender<Arc<AppState>>,
    reducer: Reducer,
    middleware: Vec<Arc<dyn Middleware>>,
    history: History,
}

#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("middleware", &self.inner.middleware.len())
            .finish_non_exhaustive()
    }
}

impl Store {
    pub fn new(
        reducer: Reducer,
        preloaded: AppState,
        history: History,
        middleware: Vec<Arc<dyn Middleware>>,
    ) -> Self {
        let (state, _) = watch::channel(Arc::new(preloaded));
        Self {
            inner: Arc::new(StoreInner {
                state,
                reducer,
                middleware,
                history,
            }),
        }
    }

    pub fn dispatch(&self, dispatchable: impl Into<Dispatchable>) -> Dispatched {
        self.dispatch_from(0, dispatchable.into())
    }

    fn dispatch_from(&self, idx: usize, dispatchable: Dispatchable) -> Dispatched {
        match self.inner.middleware.get(idx) {
            Some(middleware) => {
                let next = |dispatchable: Dispatchable| self.dispatch_from(idx + 1, dispatchable);
                middleware.handle(self, dispatchable, &next)
            }
            None => self.reduce(dispatchable),
        }
    }

    fn reduce(&self, dispatchable: Dispatchable) -> Dispatched {
        match dispatchable {
            Dispatchable::Action(action) => {
                let reducer = self.inner.reducer;
                self.inner.state.send_modify(|state| {
                    let next = reducer(&**state, &action);
                    *state = Arc::new(next);
                });
                Dispatched::Reduced
            }
            Dispatchable::Thunk(_) => {
                warn!("thunk dispatched without a thunk middleware installed; dropping it");
                Dispatched::Dropped
            }
        }
    }

    pub fn get_state(&self) -> Arc<AppState> {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<AppState>> {
        self.inner.state.subscribe()
    }

    pub fn history(&self) -> &History {
        &self.inner.history
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
