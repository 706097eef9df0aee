use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use dashboard_core::{
    header::{self, HeaderProps},
    state::AppState,
};
use eframe::egui;
use shared::domain::Namespace;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{new_errors, UiError, UiEvent};
use crate::controller::orchestration::{dispatch_backend_command, QueuedHeaderActions};
use crate::controller::provision_modal::ProvisionModal;

#[derive(Debug, Clone)]
pub(crate) struct StatusBanner {
    pub(crate) message: String,
}

pub struct DashboardApp {
    pub(crate) cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    pub(crate) state: Arc<AppState>,
    pub(crate) default_namespace: Namespace,
    pub(crate) status: String,
    pub(crate) status_banner: Option<StatusBanner>,
    pub(crate) modal: ProvisionModal,
    pub(crate) token_input: String,
    pub(crate) new_namespace_input: String,
    pub(crate) visited_path: String,
    header_mounted: bool,
}

impl DashboardApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        default_namespace: Namespace,
    ) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            state: Arc::new(AppState::new(default_namespace.clone(), Default::default())),
            default_namespace,
            status: "Starting...".to_string(),
            status_banner: None,
            modal: ProvisionModal::default(),
            token_input: String::new(),
            new_namespace_input: String::new(),
            visited_path: String::new(),
            header_mounted: false,
        }
    }

    pub(crate) fn queue(&mut self, cmd: BackendCommand) {
        dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status);
    }

    pub(crate) fn header_props(&self) -> HeaderProps {
        HeaderProps::from_state(&self.state, &self.default_namespace)
    }

    fn report(&mut self, err: UiError) {
        tracing::warn!(context = err.context().label(), "{}", err.summary());
        if err.requires_reauth() {
            self.status_banner = Some(StatusBanner {
                message: "Session expired or invalid token. Please log in again.".to_string(),
            });
            self.queue(BackendCommand::Logout);
        } else {
            self.status = err.summary();
        }
    }

    fn apply_snapshot(&mut self, next: Arc<AppState>) {
        for err in new_errors(&self.state, &next) {
            self.report(err);
        }
        self.state = next;

        if !self.state.auth.authenticated {
            self.header_mounted = false;
        } else if !self.header_mounted {
            self.header_mounted = true;
            let props = self.header_props();
            let actions = QueuedHeaderActions::new(&self.cmd_tx, &mut self.status);
            header::on_mount(&props, &actions);
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::StateChanged(next) => self.apply_snapshot(next),
                UiEvent::ProvisionFinished { provisioned } => match self.modal.finish(provisioned) {
                    Ok(Some(navigate)) => {
                        self.status = "Service instance provisioned".to_string();
                        self.queue(navigate);
                    }
                    Ok(None) => {
                        self.status = "Provisioning failed".to_string();
                    }
                    Err(err) => {
                        self.status = err.to_string();
                    }
                },
                UiEvent::Error(err) => self.report(err),
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        self.show_header(ctx);
        self.show_status_bar(ctx);
        if self.state.auth.authenticated {
            self.show_route(ctx);
        } else {
            self.show_login_screen(ctx);
        }
        self.show_provision_modal(ctx);

        let repaint_after = if self.modal.state().is_provisioning() || self.state.catalog.is_fetching {
            std::time::Duration::from_millis(16)
        } else {
            std::time::Duration::from_millis(100)
        };
        ctx.request_repaint_after(repaint_after);
    }
}
