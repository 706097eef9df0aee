//! Plain actions understood by the reducer tree and the router middleware.

use shared::{
    domain::{Namespace, ServiceClass, ServiceInstanceSummary, ServicePlan},
    error::ApiError,
};

use crate::history::{HistoryAction, Location};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Router(RouterAction),
    Auth(AuthAction),
    Cluster(ClusterAction),
    Catalog(CatalogAction),
}

impl Action {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Router(RouterAction::CallHistoryMethod(_)) => "router/call_history_method",
            Self::Router(RouterAction::LocationChanged { .. }) => "router/location_changed",
            Self::Auth(AuthAction::SetAuthenticated { .. }) => "auth/set_authenticated",
            Self::Auth(AuthAction::Logout) => "auth/logout",
            Self::Cluster(ClusterAction::RequestNamespaces) => "cluster/request_namespaces",
            Self::Cluster(ClusterAction::ReceiveNamespaces(_)) => "cluster/receive_namespaces",
            Self::Cluster(ClusterAction::ReceiveNamespace(_)) => "cluster/receive_namespace",
            Self::Cluster(ClusterAction::NamespaceCreated(_)) => "cluster/namespace_created",
            Self::Cluster(ClusterAction::SetNamespace(_)) => "cluster/set_namespace",
            Self::Cluster(ClusterAction::NamespaceError { .. }) => "cluster/namespace_error",
            Self::Cluster(ClusterAction::ClearErrors) => "cluster/clear_errors",
            Self::Catalog(CatalogAction::RequestCatalog) => "catalog/request",
            Self::Catalog(CatalogAction::ReceiveClasses(_)) => "catalog/receive_classes",
            Self::Catalog(CatalogAction::ReceivePlans(_)) => "catalog/receive_plans",
            Self::Catalog(CatalogAction::ReceiveInstances(_)) => "catalog/receive_instances",
            Self::Catalog(CatalogAction::InstanceProvisioned(_)) => "catalog/instance_provisioned",
            Self::Catalog(CatalogAction::CatalogError { .. }) => "catalog/error",
            Self::Catalog(CatalogAction::ClearErrors) => "catalog/clear_errors",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryMethod {
    Push(String),
    Replace(String),
    Go(isize),
    Back,
    Forward,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterAction {
    /// Consumed by the router middleware and never reaches a reducer.
    CallHistoryMethod(HistoryMethod),
    LocationChanged {
        location: Location,
        action: HistoryAction,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthAction {
    SetAuthenticated {
        authenticated: bool,
        token: Option<String>,
    },
    Logout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespaceOp {
    List,
    Get,
    Create,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClusterAction {
    RequestNamespaces,
    ReceiveNamespaces(Vec<Namespace>),
    ReceiveNamespace(Namespace),
    NamespaceCreated(Namespace),
    SetNamespace(Namespace),
    NamespaceError { op: NamespaceOp, error: ApiError },
    ClearErrors,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogOp {
    Fetch,
    Create,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogAction {
    RequestCatalog,
    ReceiveClasses(Vec<ServiceClass>),
    ReceivePlans(Vec<ServicePlan>),
    ReceiveInstances(Vec<ServiceInstanceSummary>),
    InstanceProvisioned(ServiceInstanceSummary),
    CatalogError { op: CatalogOp, error: ApiError },
    ClearErrors,
}

pub fn push(path: impl Into<String>) -> Action {
    Action::Router(RouterAction::CallHistoryMethod(HistoryMethod::Push(
        path.into(),
    )))
}

pub fn replace(path: impl Into<String>) -> Action {
    Action::Router(RouterAction::CallHistoryMethod(HistoryMethod::Replace(
        path.into(),
    )))
}

pub fn go_back() -> Action {
    Action::Router(RouterAction::CallHistoryMethod(HistoryMethod::Back))
}

pub fn go_forward() -> Action {
    Action::Router(RouterAction::CallHistoryMethod(HistoryMethod::Forward))
}

pub fn set_namespace(namespace: Namespace) -> Action {
    Action::Cluster(ClusterAction::SetNamespace(namespace))
}

pub fn authenticate(token: Option<String>) -> Action {
    Action::Auth(AuthAction::SetAuthenticated {
        authenticated: true,
        token,
    })
}

pub fn logout() -> Action {
    Action::Auth(AuthAction::Logout)
}
