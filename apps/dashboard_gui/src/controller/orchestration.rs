//! Command orchestration helpers from UI actions to backend command queue.

use std::cell::RefCell;

use crossbeam_channel::{Sender, TrySendError};
use dashboard_core::{
    action::{self, Action},
    header::HeaderActions,
};
use shared::domain::Namespace;

use crate::backend_bridge::commands::BackendCommand;

pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) {
    let cmd_name = cmd.name();
    match cmd_tx.try_send(cmd) {
        Ok(()) => tracing::debug!(command = cmd_name, "queued ui->backend command"),
        Err(TrySendError::Full(_)) => {
            *status = "UI command queue is full; please retry".to_string();
        }
        Err(TrySendError::Disconnected(_)) => {
            *status =
                "Backend command processor disconnected (possible startup/runtime failure)"
                    .to_string();
        }
    }
}

/// Header callbacks that queue backend commands instead of touching the
/// store directly.
pub struct QueuedHeaderActions<'a> {
    cmd_tx: &'a Sender<BackendCommand>,
    status: RefCell<&'a mut String>,
}

impl<'a> QueuedHeaderActions<'a> {
    pub fn new(cmd_tx: &'a Sender<BackendCommand>, status: &'a mut String) -> Self {
        Self {
            cmd_tx,
            status: RefCell::new(status),
        }
    }

    fn queue(&self, cmd: BackendCommand) {
        let mut status = self.status.borrow_mut();
        dispatch_backend_command(self.cmd_tx, cmd, &mut **status);
    }
}

impl HeaderActions for QueuedHeaderActions<'_> {
    fn fetch_namespaces(&self) {
        self.queue(BackendCommand::FetchNamespaces);
    }

    fn logout(&self) {
        self.queue(BackendCommand::Logout);
    }

    fn push(&self, path: &str) -> Action {
        self.queue(BackendCommand::Navigate {
            path: path.to_string(),
        });
        action::push(path)
    }

    fn set_namespace(&self, namespace: &Namespace) {
        self.queue(BackendCommand::SelectNamespace {
            namespace: namespace.clone(),
        });
    }

    fn create_namespace(&self, namespace: &Namespace) {
        self.queue(BackendCommand::CreateNamespace {
            namespace: namespace.clone(),
        });
    }

    fn get_namespace(&self, namespace: &Namespace) {
        self.queue(BackendCommand::GetNamespace {
            namespace: namespace.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use dashboard_core::header::{select_namespace, HeaderProps};
    use dashboard_core::state::AppState;

    #[test]
    fn reports_full_and_disconnected_queues() {
        let (tx, rx) = bounded(1);
        let mut status = String::new();

        dispatch_backend_command(&tx, BackendCommand::FetchCatalog, &mut status);
        assert!(status.is_empty());
        assert_eq!(rx.try_recv().ok(), Some(BackendCommand::FetchCatalog));

        dispatch_backend_command(&tx, BackendCommand::Back, &mut status);
        dispatch_backend_command(&tx, BackendCommand::Forward, &mut status);
        assert!(status.contains("full"));

        drop(rx);
        dispatch_backend_command(&tx, BackendCommand::Logout, &mut status);
        assert!(status.contains("disconnected"));
    }

    #[test]
    fn header_namespace_switch_queues_select_then_navigate() {
        let (tx, rx) = bounded(8);
        let mut status = String::new();
        let mut state = AppState::default();
        state.auth.authenticated = true;
        state.cluster.current_namespace = Namespace::from("default");
        state.router.location.pathname = "/catalog/ns/default".to_string();
        let props = HeaderProps::from_state(&state, &Namespace::from("default"));

        {
            let actions = QueuedHeaderActions::new(&tx, &mut status);
            select_namespace(&props, &Namespace::from("team-a"), &actions);
        }

        let queued: Vec<BackendCommand> = rx.try_iter().collect();
        assert_eq!(
            queued,
            vec![
                BackendCommand::SelectNamespace {
                    namespace: Namespace::from("team-a")
                },
                BackendCommand::Navigate {
                    path: "/catalog/ns/team-a".to_string()
                },
            ]
        );
        assert!(status.is_empty());
    }
}
