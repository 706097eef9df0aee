//! State machine behind the "provision a service instance" modal.
//!
//! The modal walks the user through two screens: a name form, then a
//! parameters form built from the selected plan's schema. Submitting the
//! parameters starts a provisioning request; while it is in flight the modal
//! accepts no further submissions and cannot be cancelled.
//!
//! Transitions are pure: [`WorkflowState::transition`] returns the next state
//! plus at most one [`Effect`] for the caller to perform.

use serde_json::{json, Map, Value};
use shared::{
    domain::{BrokerName, Namespace, ServiceClass, ServicePlan},
    protocol::ProvisionRequest,
};
use thiserror::Error;

use crate::routes;

/// Generic free-form bucket offered when a plan declares no parameter schema.
/// The key is reserved: a plan schema field with this name is read as the
/// raw bucket.
pub const RAW_PARAMETERS_FIELD: &str = "rawParameters";
pub const NAME_FIELD: &str = "Name";

pub type FormData = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Closed,
    NameEntry,
    ParameterEntry,
    Provisioning {
        broker: BrokerName,
        namespace: Namespace,
    },
}

impl Screen {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::NameEntry => "name entry",
            Self::ParameterEntry => "parameter entry",
            Self::Provisioning { .. } => "provisioning",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowState {
    screen: Screen,
    name: String,
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self {
            screen: Screen::Closed,
            name: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowEvent {
    Open,
    SubmitName(String),
    Back,
    Cancel,
    SubmitParameters(FormData),
    ProvisionFinished(bool),
}

impl WorkflowEvent {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::SubmitName(_) => "submit name",
            Self::Back => "back",
            Self::Cancel => "cancel",
            Self::SubmitParameters(_) => "submit parameters",
            Self::ProvisionFinished(_) => "provision finished",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Provision(ProvisionRequest),
    Navigate(String),
}

/// Read-only inputs from the surrounding view.
#[derive(Debug, Clone, Copy)]
pub struct ProvisionContext<'a> {
    pub namespace: &'a Namespace,
    pub selected_class: Option<&'a ServiceClass>,
    pub selected_plan: Option<&'a ServicePlan>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub state: WorkflowState,
    pub effect: Option<Effect>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("a name is required for the service instance")]
    NameRequired,
    #[error("a service class and plan must be selected before provisioning")]
    NoSelection,
    #[error("'{event}' is not accepted while the workflow is in {screen}")]
    Rejected {
        event: &'static str,
        screen: &'static str,
    },
}

impl WorkflowState {
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn modal_is_open(&self) -> bool {
        self.screen != Screen::Closed
    }

    pub fn is_provisioning(&self) -> bool {
        matches!(self.screen, Screen::Provisioning { .. })
    }

    /// Whether the name screen is the one the modal shows.
    pub fn display_name_form(&self) -> bool {
        matches!(self.screen, Screen::Closed | Screen::NameEntry)
    }

    pub fn can_submit(&self) -> bool {
        !self.is_provisioning()
    }

    fn with_screen(&self, screen: Screen) -> Self {
        Self {
            screen,
            name: self.name.clone(),
        }
    }

    fn rejected(&self, event: &WorkflowEvent) -> WorkflowError {
        WorkflowError::Rejected {
            event: event.label(),
            screen: self.screen.label(),
        }
    }

    pub fn transition(
        &self,
        event: WorkflowEvent,
        context: ProvisionContext<'_>,
    ) -> Result<Step, WorkflowError> {
        let step = match (&self.screen, event) {
            (Screen::Closed, WorkflowEvent::Open) => Step {
                state: self.with_screen(Screen::NameEntry),
                effect: None,
            },
            (Screen::NameEntry, WorkflowEvent::SubmitName(name)) => {
                if name.trim().is_empty() {
                    return Err(WorkflowError::NameRequired);
                }
                Step {
                    state: Self {
                        screen: Screen::ParameterEntry,
                        name,
                    },
                    effect: None,
                }
            }
            (Screen::ParameterEntry, WorkflowEvent::Back) => Step {
                state: self.with_screen(Screen::NameEntry),
                effect: None,
            },
            (Screen::NameEntry | Screen::ParameterEntry, WorkflowEvent::Cancel) => Step {
                state: self.with_screen(Screen::Closed),
                effect: None,
            },
            (Screen::ParameterEntry, WorkflowEvent::SubmitParameters(form)) => {
                let (Some(class), Some(plan)) = (context.selected_class, context.selected_plan)
                else {
                    return Err(WorkflowError::NoSelection);
                };
                let request = ProvisionRequest {
                    name: self.name.clone(),
                    namespace: context.namespace.clone(),
                    class_external_name: class.external_name.clone(),
                    plan_external_name: plan.external_name.clone(),
                    parameters: resolve_parameters(form),
                };
                Step {
                    state: self.with_screen(Screen::Provisioning {
                        broker: class.broker_name.clone(),
                        namespace: context.namespace.clone(),
                    }),
                    effect: Some(Effect::Provision(request)),
                }
            }
            (Screen::Provisioning { broker, namespace }, WorkflowEvent::ProvisionFinished(true)) => {
                let path = routes::service_instance(broker, namespace, &self.name);
                Step {
                    state: Self::default(),
                    effect: Some(Effect::Navigate(path)),
                }
            }
            (Screen::Provisioning { .. }, WorkflowEvent::ProvisionFinished(false)) => Step {
                state: self.with_screen(Screen::ParameterEntry),
                effect: None,
            },
            (_, event) => return Err(self.rejected(&event)),
        };
        Ok(step)
    }
}

/// Uses the generic bucket when the form carries one, otherwise every other
/// submitted field verbatim.
pub fn resolve_parameters(mut form: FormData) -> Value {
    match form.remove(RAW_PARAMETERS_FIELD) {
        Some(raw) if !raw.is_null() => raw,
        _ => Value::Object(form),
    }
}

pub fn parameter_schema(plan: &ServicePlan) -> Value {
    match &plan.instance_create_parameter_schema {
        Some(schema) => schema.clone(),
        None => json!({
            "type": "object",
            "properties": {
                RAW_PARAMETERS_FIELD: {
                    "title": "Parameters",
                    "type": "object"
                }
            }
        }),
    }
}

pub fn name_schema(default_name: &str) -> Value {
    json!({
        "type": "object",
        "required": [NAME_FIELD],
        "properties": {
            NAME_FIELD: {
                "type": "string",
                "description": "Name for ServiceInstance",
                "default": default_name
            }
        }
    })
}

#[cfg(test)]
#[path = "tests/workflow_tests.rs"]
mod tests;
