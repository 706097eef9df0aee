use tokio::runtime::Handle;
use tracing::debug;

use crate::{
    action::{Action, HistoryMethod, RouterAction},
    history::History,
    store::{Dispatchable, Dispatched, Middleware, Next, Store},
};

/// Traces every action that enters the chain.
pub struct LoggerMiddleware;

impl Middleware for LoggerMiddleware {
    fn handle(&self, _store: &Store, dispatchable: Dispatchable, next: Next<'_>) -> Dispatched {
        match &dispatchable {
            Dispatchable::Action(action) => debug!(action = action.kind(), "dispatch"),
            Dispatchable::Thunk(_) => debug!(action = "thunk", "dispatch"),
        }
        next(dispatchable)
    }
}

/// Runs thunks on the runtime the store was created with.
pub struct ThunkMiddleware {
    runtime: Handle,
}

impl ThunkMiddleware {
    pub fn new(runtime: Handle) -> Self {
        Self { runtime }
    }
}

impl Middleware for ThunkMiddleware {
    fn handle(&self, store: &Store, dispatchable: Dispatchable, next: Next<'_>) -> Dispatched {
        match dispatchable {
            Dispatchable::Thunk(thunk) => {
                Dispatched::Spawned(self.runtime.spawn(thunk(store.clone())))
            }
            other => next(other),
        }
    }
}

/// Applies history method calls to the history and reports the resulting
/// location back through the store.
pub struct RouterMiddleware {
    history: History,
}

impl RouterMiddleware {
    pub fn new(history: History) -> Self {
        Self { history }
    }
}

impl Middleware for RouterMiddleware {
    fn handle(&self, store: &Store, dispatchable: Dispatchable, next: Next<'_>) -> Dispatched {
        let method = match dispatchable {
            Dispatchable::Action(Action::Router(RouterAction::CallHistoryMethod(method))) => method,
            other => return next(other),
        };

        let changed = {
            let mut history = self.history.lock();
            let moved = match &method {
                HistoryMethod::Push(path) => {
                    history.push(path);
                    true
                }
                HistoryMethod::Replace(path) => {
                    history.replace(path);
                    true
                }
                HistoryMethod::Go(delta) => history.go(*delta),
                HistoryMethod::Back => history.back(),
                HistoryMethod::Forward => history.forward(),
            };
            moved.then(|| (history.location().clone(), history.action()))
        };

        match changed {
            Some((location, action)) => {
                debug!(pathname = %location.pathname, ?action, "location changed");
                store.dispatch(Action::Router(RouterAction::LocationChanged {
                    location,
                    action,
                }))
            }
            None => {
                debug!(?method, "history method had no effect");
                Dispatched::Intercepted
            }
        }
    }
}
