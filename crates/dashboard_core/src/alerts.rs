//! Maps an error kind to the alert shown to the user.

use shared::{
    domain::{Namespace, RbacRole},
    error::{ApiError, ErrorKind},
};

pub const PROVISION_ACTION: &str = "provision Service Instance";

pub fn provision_required_roles() -> Vec<RbacRole> {
    vec![RbacRole::new(
        "servicecatalog.k8s.io",
        "serviceinstances",
        &["create"],
    )]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    Permissions {
        namespace: Namespace,
        roles: Vec<RbacRole>,
        action: String,
    },
    NotFound {
        resource: String,
    },
    Unexpected {
        detail: Option<String>,
    },
}

/// What the failed operation was trying to do, used to word the alert.
#[derive(Debug, Clone)]
pub struct AlertContext {
    pub namespace: Namespace,
    pub action: String,
    pub roles: Vec<RbacRole>,
}

impl AlertContext {
    pub fn provision(namespace: &Namespace) -> Self {
        Self {
            namespace: namespace.clone(),
            action: PROVISION_ACTION.to_string(),
            roles: provision_required_roles(),
        }
    }
}

type Renderer = fn(&ApiError, &AlertContext) -> Alert;

fn permissions(_error: &ApiError, context: &AlertContext) -> Alert {
    Alert::Permissions {
        namespace: context.namespace.clone(),
        roles: context.roles.clone(),
        action: context.action.clone(),
    }
}

fn not_found(_error: &ApiError, context: &AlertContext) -> Alert {
    Alert::NotFound {
        resource: format!("Namespace \"{}\"", context.namespace),
    }
}

fn unexpected(error: &ApiError, _context: &AlertContext) -> Alert {
    Alert::Unexpected {
        detail: (!error.message.is_empty()).then(|| error.message.clone()),
    }
}

fn renderer_for(kind: ErrorKind) -> Renderer {
    match kind {
        ErrorKind::Forbidden => permissions,
        ErrorKind::NotFound => not_found,
        _ => unexpected,
    }
}

pub fn classify(error: &ApiError, context: &AlertContext) -> Alert {
    renderer_for(error.kind)(error, context)
}

impl Alert {
    pub fn title(&self) -> String {
        match self {
            Self::Permissions {
                namespace, action, ..
            } => format!(
                "You don't have sufficient permissions to {action} in {namespace} namespace"
            ),
            Self::NotFound { resource } => format!("{resource} not found."),
            Self::Unexpected { .. } => "Sorry! Something went wrong.".to_string(),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        match self {
            Self::Permissions { roles, .. } => {
                let mut lines = vec!["Ask your administrator for the following RBAC roles:".to_string()];
                lines.extend(roles.iter().map(|role| format!("- {role}")));
                lines
            }
            Self::NotFound { .. } => Vec::new(),
            Self::Unexpected { detail } => {
                let mut lines = vec![
                    "Troubleshooting:".to_string(),
                    "Check the dashboard logs for errors.".to_string(),
                ];
                if let Some(detail) = detail {
                    lines.push(format!("Details: {detail}"));
                }
                lines
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_names_capability_and_namespace() {
        let namespace = Namespace::from("team-a");
        let alert = classify(
            &ApiError::forbidden("denied"),
            &AlertContext::provision(&namespace),
        );

        assert_eq!(
            alert.title(),
            "You don't have sufficient permissions to provision Service Instance in team-a namespace"
        );
        let lines = alert.lines();
        assert!(lines
            .iter()
            .any(|line| line.contains("servicecatalog.k8s.io/serviceinstances: create")));
    }

    #[test]
    fn not_found_names_the_namespace() {
        let alert = classify(
            &ApiError::not_found("gone"),
            &AlertContext::provision(&Namespace::from("ghost")),
        );
        assert_eq!(
            alert,
            Alert::NotFound {
                resource: "Namespace \"ghost\"".to_string()
            }
        );
        assert_eq!(alert.title(), "Namespace \"ghost\" not found.");
    }

    #[test]
    fn every_other_kind_is_unexpected() {
        let context = AlertContext::provision(&Namespace::from("default"));
        for kind in [
            ErrorKind::Unauthorized,
            ErrorKind::Conflict,
            ErrorKind::Unprocessable,
            ErrorKind::Transport,
            ErrorKind::Internal,
        ] {
            let alert = classify(&ApiError::new(kind, "boom"), &context);
            assert_eq!(
                alert,
                Alert::Unexpected {
                    detail: Some("boom".to_string())
                }
            );
            assert_eq!(alert.title(), "Sorry! Something went wrong.");
        }
    }
}
