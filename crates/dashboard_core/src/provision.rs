//! The provision button: drives the workflow against injected provisioning
//! and navigation callbacks.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use shared::{
    domain::{Namespace, ServiceClass, ServicePlan},
    error::ApiError,
    protocol::ProvisionRequest,
};
use tracing::{debug, info, warn};

use crate::{
    action::{self, Action},
    alerts::{self, Alert, AlertContext},
    api::CatalogApi,
    store::Store,
    thunks,
    workflow::{
        self, Effect, FormData, ProvisionContext, WorkflowError, WorkflowEvent, WorkflowState,
    },
};

#[async_trait]
pub trait Provisioner: Send + Sync {
    /// Resolves `true` once the instance has been accepted.
    async fn provision(&self, request: &ProvisionRequest) -> bool;
}

pub trait Navigator: Send + Sync {
    fn push(&self, path: &str) -> Action;
}

/// Provisions through the cluster API and records the outcome in the store.
pub struct StoreProvisioner {
    store: Store,
    api: Arc<dyn CatalogApi>,
}

impl StoreProvisioner {
    pub fn new(store: Store, api: Arc<dyn CatalogApi>) -> Self {
        Self { store, api }
    }
}

#[async_trait]
impl Provisioner for StoreProvisioner {
    async fn provision(&self, request: &ProvisionRequest) -> bool {
        thunks::provision(&self.store, self.api.as_ref(), request).await
    }
}

pub struct StoreNavigator {
    store: Store,
}

impl StoreNavigator {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

impl Navigator for StoreNavigator {
    fn push(&self, path: &str) -> Action {
        let action = action::push(path);
        self.store.dispatch(action.clone());
        action
    }
}

#[derive(Debug, Clone)]
pub struct ProvisionProps {
    pub namespace: Namespace,
    pub selected_class: Option<ServiceClass>,
    pub selected_plan: ServicePlan,
    pub error: Option<ApiError>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProvisionOutcome {
    /// The instance was created and the view navigated to `path`.
    Provisioned { path: String },
    /// The request failed; the parameter screen is shown again.
    Failed,
}

pub struct ProvisionButton<P, N> {
    props: ProvisionProps,
    state: WorkflowState,
    provisioner: P,
    navigator: N,
}

impl<P: Provisioner, N: Navigator> ProvisionButton<P, N> {
    pub fn new(props: ProvisionProps, provisioner: P, navigator: N) -> Self {
        Self {
            props,
            state: WorkflowState::default(),
            provisioner,
            navigator,
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn props(&self) -> &ProvisionProps {
        &self.props
    }

    pub fn set_error(&mut self, error: Option<ApiError>) {
        self.props.error = error;
    }

    pub fn name_schema(&self) -> Value {
        workflow::name_schema(self.state.name())
    }

    pub fn parameter_schema(&self) -> Value {
        workflow::parameter_schema(&self.props.selected_plan)
    }

    pub fn alert(&self) -> Option<Alert> {
        self.props.error.as_ref().map(|error| {
            alerts::classify(error, &AlertContext::provision(&self.props.namespace))
        })
    }

    fn apply(&mut self, event: WorkflowEvent) -> Result<Option<Effect>, WorkflowError> {
        let label = event.label();
        let context = ProvisionContext {
            namespace: &self.props.namespace,
            selected_class: self.props.selected_class.as_ref(),
            selected_plan: Some(&self.props.selected_plan),
        };
        match self.state.transition(event, context) {
            Ok(step) => {
                debug!(
                    event = label,
                    from = self.state.screen().label(),
                    to = step.state.screen().label(),
                    "provision workflow transition"
                );
                self.state = step.state;
                Ok(step.effect)
            }
            Err(err) => {
                warn!(event = label, "provision workflow event rejected: {err}");
                Err(err)
            }
        }
    }

    pub fn open(&mut self) -> Result<(), WorkflowError> {
        self.apply(WorkflowEvent::Open).map(|_| ())
    }

    pub fn submit_name(&mut self, name: impl Into<String>) -> Result<(), WorkflowError> {
        self.apply(WorkflowEvent::SubmitName(name.into())).map(|_| ())
    }

    pub fn back(&mut self) -> Result<(), WorkflowError> {
        self.apply(WorkflowEvent::Back).map(|_| ())
    }

    pub fn cancel(&mut self) -> Result<(), WorkflowError> {
        self.apply(WorkflowEvent::Cancel).map(|_| ())
    }

    pub async fn submit_parameters(
        &mut self,
        form: FormData,
    ) -> Result<ProvisionOutcome, WorkflowError> {
        let Some(Effect::Provision(request)) = self.apply(WorkflowEvent::SubmitParameters(form))?
        else {
            return Err(WorkflowError::NoSelection);
        };

        let provisioned = self.provisioner.provision(&request).await;
        match self.apply(WorkflowEvent::ProvisionFinished(provisioned))? {
            Some(Effect::Navigate(path)) => {
                info!(name = %request.name, namespace = %request.namespace, %path, "service instance provisioned");
                self.navigator.push(&path);
                Ok(ProvisionOutcome::Provisioned { path })
            }
            _ => Ok(ProvisionOutcome::Failed),
        }
    }
}

#[cfg(test)]
#[path = "tests/provision_tests.rs"]
mod tests;
