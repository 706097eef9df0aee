//! Page header: navigation links, namespace selector and logout, derived
//! purely from props.

use std::sync::Arc;

use shared::domain::{FeatureFlags, Namespace};
use tracing::debug;

use crate::{
    action::{self, Action},
    api::CatalogApi,
    routes::{self, Route},
    state::{AppState, ClusterState},
    store::Store,
    thunks,
};

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderProps {
    pub authenticated: bool,
    pub cluster: ClusterState,
    pub default_namespace: Namespace,
    pub pathname: String,
    pub feature_flags: FeatureFlags,
}

impl HeaderProps {
    pub fn from_state(state: &AppState, default_namespace: &Namespace) -> Self {
        Self {
            authenticated: state.auth.authenticated,
            cluster: state.cluster.clone(),
            default_namespace: default_namespace.clone(),
            pathname: state.router.location.pathname.clone(),
            feature_flags: state.feature_flags.clone(),
        }
    }

    /// The namespace links point at.
    pub fn namespace(&self) -> &Namespace {
        if self.cluster.current_namespace.is_empty() {
            &self.default_namespace
        } else {
            &self.cluster.current_namespace
        }
    }
}

pub trait HeaderActions {
    fn fetch_namespaces(&self);
    fn logout(&self);
    fn push(&self, path: &str) -> Action;
    fn set_namespace(&self, namespace: &Namespace);
    fn create_namespace(&self, namespace: &Namespace);
    fn get_namespace(&self, namespace: &Namespace);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub label: &'static str,
    pub to: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceSelector {
    pub current: Namespace,
    pub options: Vec<Namespace>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderView {
    pub links: Vec<NavLink>,
    pub namespace_selector: Option<NamespaceSelector>,
    pub show_logout: bool,
}

pub fn nav_links(props: &HeaderProps) -> Vec<NavLink> {
    if !props.authenticated {
        return Vec::new();
    }
    let namespace = props.namespace();
    [
        ("Applications", routes::apps_list(namespace)),
        ("Catalog", routes::catalog(namespace)),
    ]
    .into_iter()
    .map(|(label, to)| NavLink {
        label,
        active: props.pathname.starts_with(&to),
        to,
    })
    .collect()
}

pub fn render(props: &HeaderProps) -> HeaderView {
    let namespace_selector = props.authenticated.then(|| {
        let current = props.namespace().clone();
        let mut options = props.cluster.namespaces.clone();
        if !options.contains(&current) {
            options.push(current.clone());
            options.sort();
        }
        NamespaceSelector { current, options }
    });

    HeaderView {
        links: nav_links(props),
        namespace_selector,
        show_logout: props.authenticated,
    }
}

pub fn on_mount(props: &HeaderProps, actions: &dyn HeaderActions) {
    if props.authenticated {
        actions.fetch_namespaces();
    }
}

/// Switches namespace and keeps the user on the same listing.
pub fn select_namespace(props: &HeaderProps, namespace: &Namespace, actions: &dyn HeaderActions) {
    if namespace == props.namespace() {
        return;
    }
    actions.set_namespace(namespace);
    if let Some(route) = Route::parse(&props.pathname).with_namespace(namespace) {
        actions.push(&route.path());
    }
}

/// Header callbacks backed by the store and the cluster API.
pub struct StoreHeaderActions {
    store: Store,
    api: Arc<dyn CatalogApi>,
}

impl StoreHeaderActions {
    pub fn new(store: Store, api: Arc<dyn CatalogApi>) -> Self {
        Self { store, api }
    }
}

impl HeaderActions for StoreHeaderActions {
    fn fetch_namespaces(&self) {
        self.store.dispatch(thunks::fetch_namespaces(self.api.clone()));
    }

    fn logout(&self) {
        debug!("logging out");
        self.store.dispatch(action::logout());
        self.store.dispatch(action::push("/"));
    }

    fn push(&self, path: &str) -> Action {
        let action = action::push(path);
        self.store.dispatch(action.clone());
        action
    }

    fn set_namespace(&self, namespace: &Namespace) {
        self.store.dispatch(action::set_namespace(namespace.clone()));
    }

    fn create_namespace(&self, namespace: &Namespace) {
        self.store
            .dispatch(thunks::create_namespace(self.api.clone(), namespace.clone()));
    }

    fn get_namespace(&self, namespace: &Namespace) {
        self.store
            .dispatch(thunks::get_namespace(self.api.clone(), namespace.clone()));
    }
}

#[cfg(test)]
#[path = "tests/header_tests.rs"]
mod tests;
