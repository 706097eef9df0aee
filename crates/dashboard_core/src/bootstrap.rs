//! Creation of the application store.

use std::sync::{Arc, OnceLock};

use thiserror::Error;
use tokio::runtime::Handle;
use tracing::info;

use crate::{
    history::History,
    middleware::{LoggerMiddleware, RouterMiddleware, ThunkMiddleware},
    state::{root_reducer, AppState},
    store::{Middleware, Store},
};

static STORE: OnceLock<Store> = OnceLock::new();

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("the application store has already been initialized")]
    AlreadyInitialized,
}

/// Builds a store with the router-aware reducer tree and the thunk and
/// router middleware. The router state starts at the history's location.
pub fn configure_store(mut preloaded: AppState, history: History, runtime: Handle) -> Store {
    preloaded.router.location = history.location();
    preloaded.router.action = history.lock().action();

    let middleware: Vec<Arc<dyn Middleware>> = vec![
        Arc::new(LoggerMiddleware),
        Arc::new(ThunkMiddleware::new(runtime)),
        Arc::new(RouterMiddleware::new(history.clone())),
    ];
    Store::new(root_reducer, preloaded, history, middleware)
}

/// Creates the process-wide store. Must run once, before any view renders.
pub fn init_store(
    preloaded: AppState,
    history: History,
    runtime: Handle,
) -> Result<&'static Store, StoreError> {
    if STORE.get().is_some() {
        return Err(StoreError::AlreadyInitialized);
    }
    STORE
        .set(configure_store(preloaded, history, runtime))
        .map_err(|_| StoreError::AlreadyInitialized)?;
    let store = STORE.get().ok_or(StoreError::AlreadyInitialized)?;
    info!(href = %store.history().href(), "application store initialized");
    Ok(store)
}

pub fn store() -> Option<&'static Store> {
    STORE.get()
}
