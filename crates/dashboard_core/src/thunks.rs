//! Async action creators. Each returns a [`Dispatchable`] thunk that talks to
//! the cluster and reports its result through plain actions.

use std::sync::Arc;

use shared::{domain::Namespace, protocol::ProvisionRequest};
use tracing::{error, info};

use crate::{
    action::{Action, CatalogAction, CatalogOp, ClusterAction, NamespaceOp},
    api::CatalogApi,
    store::{thunk, Dispatchable, Store},
};

pub fn fetch_namespaces(api: Arc<dyn CatalogApi>) -> Dispatchable {
    thunk(move |store| async move {
        store.dispatch(Action::Cluster(ClusterAction::RequestNamespaces));
        match api.list_namespaces().await {
            Ok(namespaces) => {
                store.dispatch(Action::Cluster(ClusterAction::ReceiveNamespaces(namespaces)));
            }
            Err(err) => {
                error!("failed to list namespaces: {err}");
                store.dispatch(Action::Cluster(ClusterAction::NamespaceError {
                    op: NamespaceOp::List,
                    error: err,
                }));
            }
        }
    })
}

pub fn get_namespace(api: Arc<dyn CatalogApi>, namespace: Namespace) -> Dispatchable {
    thunk(move |store| async move {
        match api.get_namespace(&namespace).await {
            Ok(found) => {
                store.dispatch(Action::Cluster(ClusterAction::ReceiveNamespace(found)));
            }
            Err(err) => {
                error!(%namespace, "failed to get namespace: {err}");
                store.dispatch(Action::Cluster(ClusterAction::NamespaceError {
                    op: NamespaceOp::Get,
                    error: err,
                }));
            }
        }
    })
}

/// Creates a namespace and switches to it.
pub fn create_namespace(api: Arc<dyn CatalogApi>, namespace: Namespace) -> Dispatchable {
    thunk(move |store| async move {
        match api.create_namespace(&namespace).await {
            Ok(created) => {
                info!(namespace = %created, "namespace created");
                store.dispatch(Action::Cluster(ClusterAction::NamespaceCreated(
                    created.clone(),
                )));
                store.dispatch(Action::Cluster(ClusterAction::SetNamespace(created)));
            }
            Err(err) => {
                error!(%namespace, "failed to create namespace: {err}");
                store.dispatch(Action::Cluster(ClusterAction::NamespaceError {
                    op: NamespaceOp::Create,
                    error: err,
                }));
            }
        }
    })
}

fn catalog_error(store: &Store, op: CatalogOp, error: shared::error::ApiError) {
    store.dispatch(Action::Catalog(CatalogAction::CatalogError { op, error }));
}

pub fn fetch_classes(api: Arc<dyn CatalogApi>) -> Dispatchable {
    thunk(move |store| async move {
        store.dispatch(Action::Catalog(CatalogAction::RequestCatalog));
        match api.list_classes().await {
            Ok(classes) => {
                store.dispatch(Action::Catalog(CatalogAction::ReceiveClasses(classes)));
            }
            Err(err) => {
                error!("failed to list service classes: {err}");
                catalog_error(&store, CatalogOp::Fetch, err);
            }
        }
    })
}

pub fn fetch_plans(api: Arc<dyn CatalogApi>) -> Dispatchable {
    thunk(move |store| async move {
        store.dispatch(Action::Catalog(CatalogAction::RequestCatalog));
        match api.list_plans().await {
            Ok(plans) => {
                store.dispatch(Action::Catalog(CatalogAction::ReceivePlans(plans)));
            }
            Err(err) => {
                error!("failed to list service plans: {err}");
                catalog_error(&store, CatalogOp::Fetch, err);
            }
        }
    })
}

pub fn fetch_instances(api: Arc<dyn CatalogApi>, namespace: Namespace) -> Dispatchable {
    thunk(move |store| async move {
        store.dispatch(Action::Catalog(CatalogAction::RequestCatalog));
        match api.list_instances(&namespace).await {
            Ok(instances) => {
                store.dispatch(Action::Catalog(CatalogAction::ReceiveInstances(instances)));
            }
            Err(err) => {
                error!(%namespace, "failed to list service instances: {err}");
                catalog_error(&store, CatalogOp::Fetch, err);
            }
        }
    })
}

/// Creates a service instance. Resolves `false` after recording the error in
/// the catalog state, so the caller only has to decide what to show next.
pub async fn provision(store: &Store, api: &dyn CatalogApi, request: &ProvisionRequest) -> bool {
    match api.provision_instance(request).await {
        Ok(instance) => {
            store.dispatch(Action::Catalog(CatalogAction::InstanceProvisioned(instance)));
            true
        }
        Err(err) => {
            error!(
                name = %request.name,
                namespace = %request.namespace,
                "failed to provision service instance: {err}"
            );
            catalog_error(store, CatalogOp::Create, err);
            false
        }
    }
}

#[cfg(test)]
#[path = "tests/thunks_tests.rs"]
mod tests;
