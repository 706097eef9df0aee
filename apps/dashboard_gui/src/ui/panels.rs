//! Header, status bar and the page shown for the current route.

use dashboard_core::{
    header::{self, HeaderActions},
    routes::{self, Route},
};
use eframe::egui;
use shared::domain::{Namespace, ServiceClass, ServicePlan};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::orchestration::QueuedHeaderActions;
use crate::ui::app::DashboardApp;

const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(220, 80, 80);

impl DashboardApp {
    pub(crate) fn show_header(&mut self, ctx: &egui::Context) {
        let props = self.header_props();
        let view = header::render(&props);

        let mut follow_link = None;
        let mut select = None;
        let mut create = false;
        let mut logout = false;
        let mut history_step = None;

        egui::TopBottomPanel::top("dashboard_header")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Service Catalog");
                    ui.separator();
                    for link in &view.links {
                        if ui.selectable_label(link.active, link.label).clicked() {
                            follow_link = Some(link.to.clone());
                        }
                    }

                    if let Some(selector) = &view.namespace_selector {
                        ui.separator();
                        egui::ComboBox::from_id_salt("namespace_selector")
                            .selected_text(selector.current.as_str())
                            .show_ui(ui, |ui| {
                                for namespace in &selector.options {
                                    if ui
                                        .selectable_label(
                                            namespace == &selector.current,
                                            namespace.as_str(),
                                        )
                                        .clicked()
                                    {
                                        select = Some(namespace.clone());
                                    }
                                }
                            });
                        ui.add(
                            egui::TextEdit::singleline(&mut self.new_namespace_input)
                                .hint_text("new namespace")
                                .desired_width(120.0),
                        );
                        if ui.button("Create").clicked() {
                            create = true;
                        }
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if view.show_logout && ui.button("Logout").clicked() {
                            logout = true;
                        }
                        if ui.small_button("Forward").clicked() {
                            history_step = Some(BackendCommand::Forward);
                        }
                        if ui.small_button("Back").clicked() {
                            history_step = Some(BackendCommand::Back);
                        }
                    });
                });
            });

        let actions = QueuedHeaderActions::new(&self.cmd_tx, &mut self.status);
        if let Some(path) = follow_link {
            actions.push(&path);
        }
        if let Some(namespace) = select {
            header::select_namespace(&props, &namespace, &actions);
        }
        if create {
            let name = self.new_namespace_input.trim();
            if !name.is_empty() {
                actions.create_namespace(&Namespace::from(name));
            }
        }
        if logout {
            actions.logout();
        }
        drop(actions);

        if create {
            self.new_namespace_input.clear();
        }
        if let Some(step) = history_step {
            self.queue(step);
        }
    }

    pub(crate) fn show_status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("dashboard_status")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    if let Some(banner) = &self.status_banner {
                        ui.colored_label(ERROR_COLOR, &banner.message);
                        ui.separator();
                    }
                    ui.small(&self.status);
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.small(format!("#{}", self.state.router.location.pathname));
                    });
                });
            });
    }

    pub(crate) fn show_login_screen(&mut self, ctx: &egui::Context) {
        let mut submit = false;
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(80.0);
                ui.heading("Log in to the cluster");
                ui.label("Paste a bearer token, or leave it empty when the API proxy handles auth.");
                ui.add_space(12.0);
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.token_input)
                        .password(true)
                        .hint_text("token")
                        .desired_width(360.0),
                );
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    submit = true;
                }
                if ui.button("Log in").clicked() {
                    submit = true;
                }
            });
        });

        if submit {
            let token = self.token_input.trim();
            let token = (!token.is_empty()).then(|| token.to_string());
            self.status_banner = None;
            self.queue(BackendCommand::Login { token });
        }
    }

    /// Loads data a page needs the first time its route is shown.
    fn enter_route(&mut self, route: &Route) {
        match route {
            Route::AppsList(namespace) => self.queue(BackendCommand::FetchInstances {
                namespace: namespace.clone(),
            }),
            Route::Catalog(_) | Route::ServiceClass { .. }
                if self.state.catalog.classes.is_empty() =>
            {
                self.queue(BackendCommand::FetchCatalog)
            }
            _ => {}
        }
    }

    pub(crate) fn show_route(&mut self, ctx: &egui::Context) {
        let pathname = self.state.router.location.pathname.clone();
        let route = Route::parse(&pathname);
        if self.visited_path != pathname {
            self.visited_path = pathname;
            self.enter_route(&route);
        }

        let mut command = None;
        let mut provision = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| match &route {
                Route::Root => {
                    ui.heading("Welcome");
                    ui.label("Browse the service catalog to provision a service instance.");
                    let namespace = self.header_props().namespace().clone();
                    if ui.button("Browse catalog").clicked() {
                        command = Some(BackendCommand::Navigate {
                            path: routes::catalog(&namespace),
                        });
                    }
                }
                Route::Catalog(namespace) => {
                    command = self.show_catalog(ui, namespace);
                }
                Route::ServiceClass { class_name } => {
                    provision = self.show_service_class(ui, class_name);
                }
                Route::AppsList(namespace) => {
                    command = self.show_instances(ui, namespace);
                }
                Route::ServiceInstance {
                    broker,
                    namespace,
                    name,
                } => {
                    ui.heading(name);
                    ui.label(format!("Broker: {broker}"));
                    ui.label(format!("Namespace: {namespace}"));
                    match self
                        .state
                        .catalog
                        .instances
                        .iter()
                        .find(|instance| &instance.name == name && &instance.namespace == namespace)
                    {
                        Some(instance) => {
                            ui.label(format!(
                                "Class: {} / plan: {}",
                                instance.class_external_name, instance.plan_external_name
                            ));
                            ui.label(format!("Status: {}", instance.status.label()));
                            if let Some(message) = &instance.status_message {
                                ui.small(message);
                            }
                        }
                        None => {
                            ui.label("Instance details are not loaded yet.");
                        }
                    }
                    if ui.button("Refresh").clicked() {
                        command = Some(BackendCommand::FetchInstances {
                            namespace: namespace.clone(),
                        });
                    }
                }
                Route::NotFound(path) => {
                    ui.heading("Not found");
                    ui.label(format!("Nothing is served at {path}."));
                }
            });
        });

        if let Some(cmd) = command {
            self.queue(cmd);
        }
        if let Some((class, plan)) = provision {
            let namespace = self.header_props().namespace().clone();
            if let Err(err) = self.modal.open(namespace, class, plan) {
                self.status = err.to_string();
            }
        }
    }

    fn show_catalog(&self, ui: &mut egui::Ui, namespace: &Namespace) -> Option<BackendCommand> {
        let mut command = None;
        ui.horizontal(|ui| {
            ui.heading(format!("Catalog ({namespace})"));
            if self.state.catalog.is_fetching {
                ui.spinner();
            } else if ui.button("Refresh").clicked() {
                command = Some(BackendCommand::FetchCatalog);
            }
        });
        if let Some(error) = &self.state.catalog.errors.fetch {
            ui.colored_label(ERROR_COLOR, error.to_string());
        }
        if self.state.catalog.classes.is_empty() && !self.state.catalog.is_fetching {
            ui.label("No service classes are registered with the cluster's brokers.");
            return command;
        }

        egui::Grid::new("catalog_classes")
            .striped(true)
            .num_columns(4)
            .show(ui, |ui| {
                for class in &self.state.catalog.classes {
                    ui.strong(&class.external_name);
                    ui.label(class.broker_name.as_str());
                    ui.label(&class.description);
                    if ui.button("Select").clicked() {
                        command = Some(BackendCommand::Navigate {
                            path: routes::service_class(&class.name),
                        });
                    }
                    ui.end_row();
                }
            });
        command
    }

    /// Returns the plan picked for provisioning, if any.
    fn show_service_class(
        &self,
        ui: &mut egui::Ui,
        class_name: &str,
    ) -> Option<(ServiceClass, ServicePlan)> {
        let Some(class) = self.state.catalog.class(class_name) else {
            ui.heading("Service class not found");
            ui.label(format!("No service class named {class_name} is loaded."));
            return None;
        };

        ui.heading(&class.external_name);
        ui.label(&class.description);
        if !class.tags.is_empty() {
            ui.small(format!("Tags: {}", class.tags.join(", ")));
        }
        ui.separator();

        let provisioning = self.modal.state().is_provisioning();
        let mut selected = None;
        egui::Grid::new("service_class_plans")
            .striped(true)
            .num_columns(4)
            .show(ui, |ui| {
                for plan in self.state.catalog.plans_for(class) {
                    ui.strong(&plan.external_name);
                    ui.label(&plan.description);
                    ui.label(if plan.free { "free" } else { "paid" });
                    if ui
                        .add_enabled(!provisioning, egui::Button::new("Provision"))
                        .clicked()
                    {
                        selected = Some((class.clone(), plan.clone()));
                    }
                    ui.end_row();
                }
            });
        selected
    }

    fn show_instances(&self, ui: &mut egui::Ui, namespace: &Namespace) -> Option<BackendCommand> {
        let mut command = None;
        ui.horizontal(|ui| {
            ui.heading(format!("Service instances ({namespace})"));
            if ui.button("Refresh").clicked() {
                command = Some(BackendCommand::FetchInstances {
                    namespace: namespace.clone(),
                });
            }
        });

        let instances: Vec<_> = self
            .state
            .catalog
            .instances
            .iter()
            .filter(|instance| &instance.namespace == namespace)
            .collect();
        if instances.is_empty() {
            ui.label("No service instances in this namespace.");
            return command;
        }

        egui::Grid::new("service_instances")
            .striped(true)
            .num_columns(4)
            .show(ui, |ui| {
                for instance in instances {
                    let broker = self
                        .state
                        .catalog
                        .classes
                        .iter()
                        .find(|class| class.external_name == instance.class_external_name)
                        .map(|class| class.broker_name.clone());
                    match broker {
                        Some(broker) => {
                            if ui.link(&instance.name).clicked() {
                                command = Some(BackendCommand::Navigate {
                                    path: routes::service_instance(
                                        &broker,
                                        namespace,
                                        &instance.name,
                                    ),
                                });
                            }
                        }
                        None => {
                            ui.label(&instance.name);
                        }
                    }
                    ui.label(&instance.class_external_name);
                    ui.label(&instance.plan_external_name);
                    ui.label(instance.status.label());
                    ui.end_row();
                }
            });
        command
    }
}
