//! Backend worker: owns the tokio runtime, the application store and the
//! cluster API client. Commands arrive from the UI; state snapshots and
//! provisioning outcomes flow back as [`UiEvent`]s.

use std::{sync::Arc, thread};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use dashboard_core::{
    action,
    api::CatalogApi,
    config::Settings,
    history::{HashHistory, History},
    init_store,
    state::AppState,
    thunks, HttpCatalogApi, Store,
};
use tokio::runtime::Handle;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiEvent};

fn build_api(settings: &Settings, token: Option<String>) -> Result<Arc<dyn CatalogApi>, UiError> {
    HttpCatalogApi::new(&settings.api_url, token, settings.request_timeout())
        .map(|api| Arc::new(api) as Arc<dyn CatalogApi>)
        .map_err(|err| UiError::startup(format!("failed to build cluster API client: {err}")))
}

fn forward_state(store: &'static Store, ui_tx: Sender<UiEvent>) {
    let mut updates = store.subscribe();
    tokio::spawn(async move {
        loop {
            let snapshot = updates.borrow_and_update().clone();
            // Snapshots supersede each other, so a full queue only drops a stale one.
            if let Err(TrySendError::Disconnected(_)) =
                ui_tx.try_send(UiEvent::StateChanged(snapshot))
            {
                tracing::debug!("ui event channel closed; stopping state forwarding");
                break;
            }
            if updates.changed().await.is_err() {
                break;
            }
        }
    });
}

/// Delivers an event the UI must not miss, waiting for queue space. Returns
/// false once the UI side has gone away.
fn send_reliably(ui_tx: &Sender<UiEvent>, event: UiEvent) -> bool {
    match ui_tx.send(event) {
        Ok(()) => true,
        Err(_) => {
            tracing::warn!("ui event channel closed; dropping provisioning outcome");
            false
        }
    }
}

fn handle_command(
    store: &'static Store,
    api: &mut Arc<dyn CatalogApi>,
    settings: &Settings,
    cmd: BackendCommand,
    ui_tx: &Sender<UiEvent>,
) {
    match cmd {
        BackendCommand::Login { token } => {
            match build_api(settings, token.clone()) {
                Ok(rebuilt) => *api = rebuilt,
                Err(err) => {
                    let _ = ui_tx.try_send(UiEvent::Error(err));
                    return;
                }
            }
            store.dispatch(action::authenticate(token));
            store.dispatch(thunks::fetch_namespaces(api.clone()));
            store.dispatch(thunks::fetch_classes(api.clone()));
            store.dispatch(thunks::fetch_plans(api.clone()));
        }
        BackendCommand::Logout => {
            store.dispatch(action::logout());
            store.dispatch(action::push("/"));
        }
        BackendCommand::FetchNamespaces => {
            store.dispatch(thunks::fetch_namespaces(api.clone()));
        }
        BackendCommand::SelectNamespace { namespace } => {
            store.dispatch(action::set_namespace(namespace.clone()));
            store.dispatch(thunks::fetch_instances(api.clone(), namespace));
        }
        BackendCommand::CreateNamespace { namespace } => {
            store.dispatch(thunks::create_namespace(api.clone(), namespace));
        }
        BackendCommand::GetNamespace { namespace } => {
            store.dispatch(thunks::get_namespace(api.clone(), namespace));
        }
        BackendCommand::FetchCatalog => {
            store.dispatch(thunks::fetch_classes(api.clone()));
            store.dispatch(thunks::fetch_plans(api.clone()));
        }
        BackendCommand::FetchInstances { namespace } => {
            store.dispatch(thunks::fetch_instances(api.clone(), namespace));
        }
        BackendCommand::Navigate { path } => {
            store.dispatch(action::push(path));
        }
        BackendCommand::Back => {
            store.dispatch(action::go_back());
        }
        BackendCommand::Forward => {
            store.dispatch(action::go_forward());
        }
        BackendCommand::Provision { request } => {
            let api = api.clone();
            let ui_tx = ui_tx.clone();
            tokio::spawn(async move {
                // A failure is recorded in the catalog state and reported from
                // the next snapshot.
                let provisioned = thunks::provision(store, api.as_ref(), &request).await;
                // The outcome is the only way out of the provisioning screen.
                let outcome = UiEvent::ProvisionFinished { provisioned };
                if let Err(err) =
                    tokio::task::spawn_blocking(move || send_reliably(&ui_tx, outcome)).await
                {
                    tracing::error!("provisioning outcome delivery failed: {err}");
                }
            });
        }
    }
}

pub fn launch(settings: Settings, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::startup(format!(
                    "backend worker startup failure: failed to build runtime: {err}"
                ))));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let mut api = match build_api(&settings, settings.token.clone()) {
                Ok(api) => api,
                Err(err) => {
                    tracing::error!("{}", err.message());
                    let _ = ui_tx.try_send(UiEvent::Error(err));
                    return;
                }
            };

            let preloaded = AppState::new(
                settings.default_namespace.clone(),
                settings.feature_flags.clone(),
            );
            let store = match init_store(preloaded, History::new(HashHistory::new()), Handle::current())
            {
                Ok(store) => store,
                Err(err) => {
                    let _ = ui_tx.try_send(UiEvent::Error(UiError::startup(format!(
                        "backend worker startup failure: {err}"
                    ))));
                    tracing::error!("failed to initialize application store: {err}");
                    return;
                }
            };
            forward_state(store, ui_tx.clone());

            if settings.token.is_some() {
                handle_command(
                    store,
                    &mut api,
                    &settings,
                    BackendCommand::Login {
                        token: settings.token.clone(),
                    },
                    &ui_tx,
                );
            }
            let _ = ui_tx.try_send(UiEvent::Info(format!(
                "Backend worker ready ({})",
                settings.api_url
            )));

            while let Ok(cmd) = cmd_rx.recv() {
                tracing::debug!(command = cmd.name(), "backend command received");
                handle_command(store, &mut api, &settings, cmd, &ui_tx);
            }
            tracing::info!("command channel closed; backend worker exiting");
        });
    });
}
