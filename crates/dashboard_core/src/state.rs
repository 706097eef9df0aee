//! Application state and the reducer tree.

use shared::{
    domain::{FeatureFlags, Namespace, ServiceClass, ServiceInstanceSummary, ServicePlan},
    error::ApiError,
};

use crate::{
    action::{
        Action, AuthAction, CatalogAction, CatalogOp, ClusterAction, NamespaceOp, RouterAction,
    },
    history::{HistoryAction, Location},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterState {
    pub location: Location,
    pub action: HistoryAction,
}

impl Default for RouterState {
    fn default() -> Self {
        Self {
            location: Location::default(),
            action: HistoryAction::Pop,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub authenticated: bool,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterErrors {
    pub list: Option<ApiError>,
    pub get: Option<ApiError>,
    pub create: Option<ApiError>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterState {
    pub current_namespace: Namespace,
    pub namespaces: Vec<Namespace>,
    pub errors: ClusterErrors,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogErrors {
    pub fetch: Option<ApiError>,
    pub create: Option<ApiError>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogState {
    pub is_fetching: bool,
    pub classes: Vec<ServiceClass>,
    pub plans: Vec<ServicePlan>,
    pub instances: Vec<ServiceInstanceSummary>,
    pub errors: CatalogErrors,
}

impl CatalogState {
    pub fn class(&self, name: &str) -> Option<&ServiceClass> {
        self.classes.iter().find(|class| class.name == name)
    }

    pub fn plans_for<'a>(&'a self, class: &'a ServiceClass) -> impl Iterator<Item = &'a ServicePlan> {
        self.plans
            .iter()
            .filter(move |plan| plan.class_name == class.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub router: RouterState,
    pub auth: AuthState,
    pub cluster: ClusterState,
    pub catalog: CatalogState,
    pub feature_flags: FeatureFlags,
}

impl AppState {
    pub fn new(default_namespace: Namespace, feature_flags: FeatureFlags) -> Self {
        Self {
            cluster: ClusterState {
                current_namespace: default_namespace,
                ..ClusterState::default()
            },
            feature_flags,
            ..Self::default()
        }
    }
}

pub type Reducer = fn(&AppState, &Action) -> AppState;

pub fn root_reducer(state: &AppState, action: &Action) -> AppState {
    AppState {
        router: router_reducer(&state.router, action),
        auth: auth_reducer(&state.auth, action),
        cluster: cluster_reducer(&state.cluster, action),
        catalog: catalog_reducer(&state.catalog, action),
        feature_flags: state.feature_flags.clone(),
    }
}

fn router_reducer(state: &RouterState, action: &Action) -> RouterState {
    match action {
        Action::Router(RouterAction::LocationChanged { location, action }) => RouterState {
            location: location.clone(),
            action: *action,
        },
        _ => state.clone(),
    }
}

fn auth_reducer(state: &AuthState, action: &Action) -> AuthState {
    match action {
        Action::Auth(AuthAction::SetAuthenticated {
            authenticated,
            token,
        }) => AuthState {
            authenticated: *authenticated,
            token: token.clone(),
        },
        Action::Auth(AuthAction::Logout) => AuthState::default(),
        _ => state.clone(),
    }
}

fn insert_sorted(namespaces: &mut Vec<Namespace>, namespace: &Namespace) {
    if let Err(idx) = namespaces.binary_search(namespace) {
        namespaces.insert(idx, namespace.clone());
    }
}

fn cluster_reducer(state: &ClusterState, action: &Action) -> ClusterState {
    let mut next = state.clone();
    match action {
        Action::Cluster(ClusterAction::RequestNamespaces) => {
            next.errors.list = None;
        }
        Action::Cluster(ClusterAction::ReceiveNamespaces(namespaces)) => {
            let mut namespaces = namespaces.clone();
            namespaces.sort();
            namespaces.dedup();
            next.namespaces = namespaces;
            next.errors.list = None;
        }
        Action::Cluster(ClusterAction::ReceiveNamespace(namespace)) => {
            insert_sorted(&mut next.namespaces, namespace);
            next.errors.get = None;
        }
        Action::Cluster(ClusterAction::NamespaceCreated(namespace)) => {
            insert_sorted(&mut next.namespaces, namespace);
            next.errors.create = None;
        }
        Action::Cluster(ClusterAction::SetNamespace(namespace)) => {
            next.current_namespace = namespace.clone();
            next.errors = ClusterErrors::default();
        }
        Action::Cluster(ClusterAction::NamespaceError { op, error }) => {
            let slot = match op {
                NamespaceOp::List => &mut next.errors.list,
                NamespaceOp::Get => &mut next.errors.get,
                NamespaceOp::Create => &mut next.errors.create,
            };
            *slot = Some(error.clone());
        }
        Action::Cluster(ClusterAction::ClearErrors) => {
            next.errors = ClusterErrors::default();
        }
        Action::Auth(AuthAction::Logout) => {
            next.namespaces.clear();
            next.errors = ClusterErrors::default();
        }
        _ => {}
    }
    next
}

fn catalog_reducer(state: &CatalogState, action: &Action) -> CatalogState {
    let mut next = state.clone();
    match action {
        Action::Catalog(CatalogAction::RequestCatalog) => {
            next.is_fetching = true;
        }
        Action::Catalog(CatalogAction::ReceiveClasses(classes)) => {
            next.classes = classes.clone();
            next.is_fetching = false;
            next.errors.fetch = None;
        }
        Action::Catalog(CatalogAction::ReceivePlans(plans)) => {
            next.plans = plans.clone();
            next.is_fetching = false;
            next.errors.fetch = None;
        }
        Action::Catalog(CatalogAction::ReceiveInstances(instances)) => {
            next.instances = instances.clone();
            next.is_fetching = false;
            next.errors.fetch = None;
        }
        Action::Catalog(CatalogAction::InstanceProvisioned(instance)) => {
            next.instances.retain(|existing| {
                existing.name != instance.name || existing.namespace != instance.namespace
            });
            next.instances.push(instance.clone());
            next.errors.create = None;
        }
        Action::Catalog(CatalogAction::CatalogError { op, error }) => {
            next.is_fetching = false;
            match op {
                CatalogOp::Fetch => next.errors.fetch = Some(error.clone()),
                CatalogOp::Create => next.errors.create = Some(error.clone()),
            }
        }
        Action::Catalog(CatalogAction::ClearErrors) => {
            next.errors = CatalogErrors::default();
        }
        Action::Auth(AuthAction::Logout) => {
            next = CatalogState::default();
        }
        _ => {}
    }
    next
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
