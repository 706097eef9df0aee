//! UI-side driver for the provision modal. Holds the workflow state plus the
//! text inputs and turns workflow effects into backend commands.

use dashboard_core::{
    alerts::{self, Alert, AlertContext},
    state::AppState,
    workflow::{
        Effect, FormData, ProvisionContext, Screen, WorkflowError, WorkflowEvent, WorkflowState,
        RAW_PARAMETERS_FIELD,
    },
};
use serde_json::Value;
use shared::domain::{Namespace, ServiceClass, ServicePlan};
use thiserror::Error;

use crate::backend_bridge::commands::BackendCommand;

#[derive(Debug, Error)]
pub enum ModalError {
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
    #[error("parameters must be a JSON object: {0}")]
    InvalidParameters(String),
}

#[derive(Debug, Clone, Default)]
pub struct ProvisionModal {
    state: WorkflowState,
    namespace: Namespace,
    class: Option<ServiceClass>,
    plan: Option<ServicePlan>,
    pub name_input: String,
    pub parameters_input: String,
    pub last_error: Option<String>,
}

impl ProvisionModal {
    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn class(&self) -> Option<&ServiceClass> {
        self.class.as_ref()
    }

    pub fn plan(&self) -> Option<&ServicePlan> {
        self.plan.as_ref()
    }

    fn apply(&mut self, event: WorkflowEvent) -> Result<Option<Effect>, ModalError> {
        let context = ProvisionContext {
            namespace: &self.namespace,
            selected_class: self.class.as_ref(),
            selected_plan: self.plan.as_ref(),
        };
        let step = self.state.transition(event, context)?;
        self.state = step.state;
        self.last_error = None;
        Ok(step.effect)
    }

    fn record<T>(&mut self, result: Result<T, ModalError>) -> Result<T, ModalError> {
        if let Err(err) = &result {
            tracing::warn!("provision modal: {err}");
            self.last_error = Some(err.to_string());
        }
        result
    }

    /// Opens the modal for a plan. Reopening the same plan keeps the name
    /// entered before a cancel. Refused while a request is in flight.
    pub fn open(
        &mut self,
        namespace: Namespace,
        class: ServiceClass,
        plan: ServicePlan,
    ) -> Result<(), ModalError> {
        if self.state.is_provisioning() {
            let result = Err(ModalError::Workflow(WorkflowError::Rejected {
                event: WorkflowEvent::Open.label(),
                screen: self.state.screen().label(),
            }));
            return self.record(result);
        }
        if self.plan.as_ref().map(|p| &p.name) != Some(&plan.name) {
            self.state = WorkflowState::default();
            self.name_input.clear();
            self.parameters_input.clear();
        }
        self.namespace = namespace;
        self.class = Some(class);
        self.plan = Some(plan);
        let result = self.apply(WorkflowEvent::Open).map(|_| ());
        self.record(result)
    }

    pub fn submit_name(&mut self) -> Result<(), ModalError> {
        let result = self
            .apply(WorkflowEvent::SubmitName(self.name_input.clone()))
            .map(|_| ());
        self.record(result)
    }

    pub fn back(&mut self) -> Result<(), ModalError> {
        let result = self.apply(WorkflowEvent::Back).map(|_| ());
        if result.is_ok() {
            self.name_input = self.state.name().to_string();
        }
        self.record(result)
    }

    pub fn cancel(&mut self) -> Result<(), ModalError> {
        let result = self.apply(WorkflowEvent::Cancel).map(|_| ());
        self.record(result)
    }

    fn form_data(&self) -> Result<FormData, ModalError> {
        let mut form = FormData::new();
        let raw = self.parameters_input.trim();
        if raw.is_empty() {
            return Ok(form);
        }
        let parsed: Value = serde_json::from_str(raw)
            .map_err(|err| ModalError::InvalidParameters(err.to_string()))?;
        if !parsed.is_object() {
            return Err(ModalError::InvalidParameters(
                "expected an object".to_string(),
            ));
        }
        form.insert(RAW_PARAMETERS_FIELD.to_string(), parsed);
        Ok(form)
    }

    /// Returns the command that starts provisioning.
    pub fn submit_parameters(&mut self) -> Result<BackendCommand, ModalError> {
        let result = self.form_data().and_then(|form| {
            match self.apply(WorkflowEvent::SubmitParameters(form))? {
                Some(Effect::Provision(request)) => Ok(BackendCommand::Provision { request }),
                _ => Err(ModalError::Workflow(WorkflowError::NoSelection)),
            }
        });
        self.record(result)
    }

    /// Applies the provisioning outcome and returns the navigation command on
    /// success.
    pub fn finish(&mut self, provisioned: bool) -> Result<Option<BackendCommand>, ModalError> {
        let result = self
            .apply(WorkflowEvent::ProvisionFinished(provisioned))
            .map(|effect| match effect {
                Some(Effect::Navigate(path)) => Some(BackendCommand::Navigate { path }),
                _ => None,
            });
        if matches!(result, Ok(Some(_))) {
            self.name_input.clear();
            self.parameters_input.clear();
        }
        self.record(result)
    }

    /// The alert for the last failed provisioning attempt, shown on the
    /// parameter screen.
    pub fn alert(&self, state: &AppState) -> Option<Alert> {
        if self.state.screen() != &Screen::ParameterEntry {
            return None;
        }
        state
            .catalog
            .errors
            .create
            .as_ref()
            .map(|error| alerts::classify(error, &AlertContext::provision(&self.namespace)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{domain::BrokerName, error::ApiError};

    fn class() -> ServiceClass {
        ServiceClass {
            name: "class-uid".to_string(),
            external_name: "mysql".to_string(),
            broker_name: BrokerName::from("ups-broker"),
            description: String::new(),
            tags: Vec::new(),
        }
    }

    fn plan() -> ServicePlan {
        ServicePlan {
            name: "plan-uid".to_string(),
            external_name: "small".to_string(),
            class_name: "class-uid".to_string(),
            description: String::new(),
            free: true,
            instance_create_parameter_schema: None,
        }
    }

    fn opened() -> ProvisionModal {
        let mut modal = ProvisionModal::default();
        modal
            .open(Namespace::from("team-a"), class(), plan())
            .expect("open");
        modal
    }

    #[test]
    fn walks_name_then_parameters_then_navigates() {
        let mut modal = opened();
        modal.name_input = "my-db".to_string();
        modal.submit_name().expect("name");
        modal.parameters_input = r#"{"size": 10}"#.to_string();

        let cmd = modal.submit_parameters().expect("submit");
        let BackendCommand::Provision { request } = cmd else {
            panic!("expected provision command");
        };
        assert_eq!(request.name, "my-db");
        assert_eq!(request.class_external_name, "mysql");
        assert_eq!(request.parameters, serde_json::json!({"size": 10}));
        assert!(modal.state().is_provisioning());

        assert!(modal.submit_parameters().is_err());

        let navigate = modal.finish(true).expect("finish");
        assert_eq!(
            navigate,
            Some(BackendCommand::Navigate {
                path: "/services/brokers/ups-broker/instances/ns/team-a/my-db".to_string()
            })
        );
        assert!(!modal.state().modal_is_open());
    }

    #[test]
    fn rejects_non_object_parameters_without_leaving_the_screen() {
        let mut modal = opened();
        modal.name_input = "my-db".to_string();
        modal.submit_name().expect("name");
        modal.parameters_input = "[1, 2]".to_string();

        assert!(matches!(
            modal.submit_parameters(),
            Err(ModalError::InvalidParameters(_))
        ));
        assert_eq!(modal.state().screen(), &Screen::ParameterEntry);
        assert!(modal.last_error.is_some());
    }

    #[test]
    fn failure_returns_to_parameters_and_shows_alert() {
        let mut modal = opened();
        modal.name_input = "my-db".to_string();
        modal.submit_name().expect("name");
        modal.submit_parameters().expect("submit");
        assert_eq!(modal.finish(false).expect("finish"), None);
        assert_eq!(modal.state().screen(), &Screen::ParameterEntry);

        let mut state = AppState::default();
        state.catalog.errors.create = Some(ApiError::forbidden("nope"));
        assert!(matches!(
            modal.alert(&state),
            Some(Alert::Permissions { namespace, .. }) if namespace == Namespace::from("team-a")
        ));
    }

    #[test]
    fn another_plan_cannot_be_opened_while_provisioning() {
        let mut modal = opened();
        modal.name_input = "my-db".to_string();
        modal.submit_name().expect("name");
        modal.submit_parameters().expect("submit");

        let mut other = plan();
        other.name = "plan-large".to_string();
        other.external_name = "large".to_string();
        assert!(matches!(
            modal.open(Namespace::from("team-b"), class(), other),
            Err(ModalError::Workflow(WorkflowError::Rejected { .. }))
        ));
        assert!(modal.state().is_provisioning());
        assert_eq!(modal.plan().map(|p| p.external_name.as_str()), Some("small"));

        let navigate = modal.finish(true).expect("finish");
        assert_eq!(
            navigate,
            Some(BackendCommand::Navigate {
                path: "/services/brokers/ups-broker/instances/ns/team-a/my-db".to_string()
            })
        );
    }

    #[test]
    fn reopening_after_cancel_keeps_the_name() {
        let mut modal = opened();
        modal.name_input = "keep-me".to_string();
        modal.cancel().expect("cancel");
        modal
            .open(Namespace::from("team-a"), class(), plan())
            .expect("reopen");
        assert_eq!(modal.name_input, "keep-me");
        assert!(modal.state().display_name_form());
    }
}
