use dashboard_core::workflow::{self, Screen};
use eframe::egui;

use crate::ui::app::DashboardApp;

const ALERT_COLOR: egui::Color32 = egui::Color32::from_rgb(230, 160, 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModalAction {
    SubmitName,
    SubmitParameters,
    Back,
    Cancel,
}

/// Lists the top-level fields a plan's parameter schema declares.
fn schema_fields(schema: &serde_json::Value) -> Vec<String> {
    schema
        .get("properties")
        .and_then(|properties| properties.as_object())
        .map(|properties| {
            properties
                .iter()
                .map(|(name, field)| {
                    match field.get("type").and_then(|kind| kind.as_str()) {
                        Some(kind) => format!("{name} ({kind})"),
                        None => name.clone(),
                    }
                })
                .collect()
        })
        .unwrap_or_default()
}

impl DashboardApp {
    pub(crate) fn show_provision_modal(&mut self, ctx: &egui::Context) {
        if !self.modal.state().modal_is_open() {
            return;
        }

        let title = match (self.modal.class(), self.modal.plan()) {
            (Some(class), Some(plan)) => format!(
                "Provision {} ({})",
                class.external_name, plan.external_name
            ),
            _ => "Provision".to_string(),
        };
        let alert = self.modal.alert(&self.state);
        let schema = self.modal.plan().map(workflow::parameter_schema);
        let mut action = None;

        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.set_min_width(420.0);
                match self.modal.state().screen().clone() {
                    Screen::Closed => {}
                    Screen::NameEntry => {
                        ui.label("Name for ServiceInstance");
                        let response =
                            ui.add(egui::TextEdit::singleline(&mut self.modal.name_input));
                        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                            action = Some(ModalAction::SubmitName);
                        }
                        ui.horizontal(|ui| {
                            if ui.button("Cancel").clicked() {
                                action = Some(ModalAction::Cancel);
                            }
                            if ui.button("Continue").clicked() {
                                action = Some(ModalAction::SubmitName);
                            }
                        });
                    }
                    Screen::ParameterEntry => {
                        if let Some(alert) = &alert {
                            ui.colored_label(ALERT_COLOR, alert.title());
                            for line in alert.lines() {
                                ui.small(line);
                            }
                            ui.separator();
                        }
                        ui.label(format!("Instance name: {}", self.modal.state().name()));
                        if let Some(schema) = &schema {
                            let fields = schema_fields(schema);
                            if !fields.is_empty() {
                                ui.small(format!("Plan parameters: {}", fields.join(", ")));
                            }
                        }
                        ui.label("Parameters (JSON object)");
                        ui.add(
                            egui::TextEdit::multiline(&mut self.modal.parameters_input)
                                .code_editor()
                                .desired_rows(8)
                                .desired_width(f32::INFINITY),
                        );
                        ui.horizontal(|ui| {
                            if ui.button("Back").clicked() {
                                action = Some(ModalAction::Back);
                            }
                            if ui.button("Cancel").clicked() {
                                action = Some(ModalAction::Cancel);
                            }
                            if ui.button("Submit").clicked() {
                                action = Some(ModalAction::SubmitParameters);
                            }
                        });
                    }
                    Screen::Provisioning { namespace, .. } => {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.label(format!(
                                "Provisioning {} in {namespace}...",
                                self.modal.state().name()
                            ));
                        });
                    }
                }
                if let Some(error) = &self.modal.last_error {
                    ui.colored_label(egui::Color32::from_rgb(220, 80, 80), error);
                }
            });

        match action {
            Some(ModalAction::SubmitName) => {
                let _ = self.modal.submit_name();
            }
            Some(ModalAction::Back) => {
                let _ = self.modal.back();
            }
            Some(ModalAction::Cancel) => {
                let _ = self.modal.cancel();
            }
            Some(ModalAction::SubmitParameters) => {
                if let Ok(cmd) = self.modal.submit_parameters() {
                    self.status = "Provisioning service instance...".to_string();
                    self.queue(cmd);
                }
            }
            None => {}
        }
    }
}
