mod backend_bridge;
mod controller;
mod ui;

use anyhow::Context;
use clap::Parser;
use crossbeam_channel::bounded;
use dashboard_core::config::{self, Settings};
use eframe::egui;
use shared::domain::Namespace;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::DashboardApp;

#[derive(Parser, Debug)]
#[command(about = "Desktop dashboard for the Kubernetes service catalog")]
struct Cli {
    /// Cluster API URL; overrides dashboard.toml and the environment.
    #[arg(long)]
    api_url: Option<String>,
    /// Bearer token; logs in on startup when set.
    #[arg(long)]
    token: Option<String>,
    #[arg(long)]
    namespace: Option<String>,
}

impl Cli {
    fn apply(self, settings: &mut Settings) {
        if let Some(api_url) = self.api_url {
            settings.api_url = api_url;
        }
        if let Some(token) = self.token {
            settings.token = Some(token);
        }
        if let Some(namespace) = self.namespace {
            settings.default_namespace = Namespace(namespace);
        }
    }
}

fn load_settings(cli: Cli) -> anyhow::Result<Settings> {
    let mut settings = config::load_settings().context("failed to load dashboard settings")?;
    cli.apply(&mut settings);
    settings
        .validate()
        .context("invalid dashboard settings after applying command line flags")?;
    Ok(settings)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = load_settings(Cli::parse())?;
    tracing::info!(api_url = %settings.api_url, namespace = %settings.default_namespace, "starting dashboard");
    let default_namespace = settings.default_namespace.clone();

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    backend_bridge::runtime::launch(settings, cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Service Catalog Dashboard")
            .with_inner_size([1180.0, 760.0])
            .with_min_inner_size([820.0, 520.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Service Catalog Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(DashboardApp::new(cmd_tx, ui_rx, default_namespace)))),
    )
    .map_err(|err| anyhow::anyhow!("dashboard window failed: {err}"))
}
