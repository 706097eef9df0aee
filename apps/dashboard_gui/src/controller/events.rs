//! UI/backend events and error modeling for the dashboard controller.

use std::sync::Arc;

use dashboard_core::state::AppState;
use shared::error::{ApiError, ErrorKind};

pub enum UiEvent {
    Info(String),
    StateChanged(Arc<AppState>),
    ProvisionFinished { provisioned: bool },
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Namespaces,
    Catalog,
    Provision,
    General,
}

impl UiErrorContext {
    pub fn label(self) -> &'static str {
        match self {
            Self::BackendStartup => "Backend startup",
            Self::Namespaces => "Namespaces",
            Self::Catalog => "Catalog",
            Self::Provision => "Provisioning",
            Self::General => "General",
        }
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    kind: ErrorKind,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn new(context: UiErrorContext, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            context,
            message: message.into(),
        }
    }

    pub fn from_api(context: UiErrorContext, error: &ApiError) -> Self {
        Self::new(context, error.kind, error.message.clone())
    }

    pub fn startup(message: impl Into<String>) -> Self {
        Self::new(UiErrorContext::BackendStartup, ErrorKind::Internal, message)
    }

    pub fn requires_reauth(&self) -> bool {
        self.kind == ErrorKind::Unauthorized
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn summary(&self) -> String {
        format!("{} error ({}): {}", self.context.label(), self.kind, self.message)
    }
}

/// Errors recorded in a new snapshot that were not present in the previous
/// one, so each failure is reported once.
pub fn new_errors(previous: &AppState, next: &AppState) -> Vec<UiError> {
    let cluster = [
        (&previous.cluster.errors.list, &next.cluster.errors.list),
        (&previous.cluster.errors.get, &next.cluster.errors.get),
        (&previous.cluster.errors.create, &next.cluster.errors.create),
    ]
    .into_iter()
    .map(|pair| (UiErrorContext::Namespaces, pair));
    let catalog = [
        (
            UiErrorContext::Catalog,
            (&previous.catalog.errors.fetch, &next.catalog.errors.fetch),
        ),
        (
            UiErrorContext::Provision,
            (&previous.catalog.errors.create, &next.catalog.errors.create),
        ),
    ];

    cluster
        .chain(catalog)
        .filter_map(|(context, (before, after))| match after {
            Some(error) if before.as_ref() != Some(error) => Some(UiError::from_api(context, error)),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_errors_require_reauth() {
        let err = UiError::from_api(
            UiErrorContext::Namespaces,
            &ApiError::new(ErrorKind::Unauthorized, "token expired"),
        );
        assert!(err.requires_reauth());
        assert_eq!(err.summary(), "Namespaces error (unauthorized): token expired");

        let forbidden = UiError::from_api(
            UiErrorContext::Provision,
            &ApiError::forbidden("serviceinstances is forbidden"),
        );
        assert!(!forbidden.requires_reauth());
        assert_eq!(forbidden.kind(), ErrorKind::Forbidden);
    }

    #[test]
    fn reports_only_errors_that_changed() {
        let previous = AppState::default();
        let mut next = AppState::default();
        next.cluster.errors.list = Some(ApiError::internal("boom"));

        let errors = new_errors(&previous, &next);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].context(), UiErrorContext::Namespaces);

        assert!(new_errors(&next, &next).is_empty());
    }
}
