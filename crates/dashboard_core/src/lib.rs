//! Headless core of the service catalog dashboard: the store, its
//! middleware, the cluster API client and the view models the shells render.

pub mod action;
pub mod alerts;
pub mod api;
pub mod bootstrap;
pub mod config;
pub mod header;
pub mod history;
pub mod middleware;
pub mod provision;
pub mod routes;
pub mod state;
pub mod store;
pub mod thunks;
pub mod workflow;

pub use api::{CatalogApi, HttpCatalogApi};
pub use bootstrap::{configure_store, init_store, store};
pub use config::{load_settings, Settings};
pub use provision::{ProvisionButton, ProvisionOutcome, ProvisionProps};
pub use store::{Dispatchable, Dispatched, Store};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
