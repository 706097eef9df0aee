use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use dashboard_core::{
    action,
    api::CatalogApi,
    config::{self, Settings},
    history::History,
    init_store,
    provision::{StoreNavigator, StoreProvisioner},
    state::AppState,
    thunks,
    workflow::{FormData, RAW_PARAMETERS_FIELD},
    Dispatchable, HttpCatalogApi, ProvisionButton, ProvisionOutcome, ProvisionProps, Store,
};
use shared::{domain::Namespace, error::ApiError};
use tokio::runtime::Handle;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Inspect and provision from the Kubernetes service catalog")]
struct Cli {
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    token: Option<String>,
    /// Namespace to work in; defaults to the configured one.
    #[arg(long, short = 'n')]
    namespace: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List namespaces, or create one.
    Namespaces {
        #[arg(long)]
        create: Option<String>,
    },
    Classes,
    Plans {
        /// Only show plans of this class (external name).
        #[arg(long)]
        class: Option<String>,
    },
    Instances,
    Provision {
        #[arg(long)]
        class: String,
        #[arg(long)]
        plan: String,
        #[arg(long)]
        name: String,
        /// Parameters as a JSON object.
        #[arg(long)]
        parameters: Option<String>,
    },
}

fn settings(cli: &Cli) -> Result<Settings> {
    let mut settings = config::load_settings().context("failed to load dashboard settings")?;
    if let Some(api_url) = &cli.api_url {
        settings.api_url = api_url.clone();
    }
    if let Some(token) = &cli.token {
        settings.token = Some(token.clone());
    }
    if let Some(namespace) = &cli.namespace {
        settings.default_namespace = Namespace::from(namespace.as_str());
    }
    settings.validate().context("invalid settings")?;
    Ok(settings)
}

/// Dispatches and waits for a thunk to finish.
async fn run(store: &Store, dispatchable: Dispatchable) -> Result<()> {
    if let Some(task) = store.dispatch(dispatchable).into_task() {
        task.await.context("background task failed")?;
    }
    Ok(())
}

fn check(error: &Option<ApiError>, what: &str) -> Result<()> {
    match error {
        Some(err) => Err(anyhow!("failed to {what}: {err}")),
        None => Ok(()),
    }
}

fn parse_parameters(raw: Option<&str>) -> Result<FormData> {
    let mut form = FormData::new();
    if let Some(raw) = raw {
        let value: serde_json::Value =
            serde_json::from_str(raw).context("--parameters must be valid JSON")?;
        if !value.is_object() {
            bail!("--parameters must be a JSON object");
        }
        form.insert(RAW_PARAMETERS_FIELD.to_string(), value);
    }
    Ok(form)
}

async fn provision(
    store: &Store,
    api: Arc<dyn CatalogApi>,
    namespace: Namespace,
    class: &str,
    plan: &str,
    name: &str,
    parameters: Option<&str>,
) -> Result<()> {
    run(store, thunks::fetch_classes(api.clone())).await?;
    run(store, thunks::fetch_plans(api.clone())).await?;
    let state = store.get_state();
    check(&state.catalog.errors.fetch, "load the catalog")?;

    let selected_class = state
        .catalog
        .classes
        .iter()
        .find(|candidate| candidate.external_name == class)
        .cloned()
        .ok_or_else(|| anyhow!("service class '{class}' not found"))?;
    let selected_plan = state
        .catalog
        .plans_for(&selected_class)
        .find(|candidate| candidate.external_name == plan)
        .cloned()
        .ok_or_else(|| anyhow!("plan '{plan}' not found for class '{class}'"))?;

    let props = ProvisionProps {
        namespace,
        selected_class: Some(selected_class),
        selected_plan,
        error: None,
    };
    let mut button = ProvisionButton::new(
        props,
        StoreProvisioner::new(store.clone(), api),
        StoreNavigator::new(store.clone()),
    );
    button.open()?;
    button.submit_name(name)?;
    match button.submit_parameters(parse_parameters(parameters)?).await? {
        ProvisionOutcome::Provisioned { path } => {
            println!("provisioned {name}; view it at {}", store.history().href());
            tracing::debug!(%path, "navigated to instance");
            Ok(())
        }
        ProvisionOutcome::Failed => {
            button.set_error(store.get_state().catalog.errors.create.clone());
            if let Some(alert) = button.alert() {
                eprintln!("{}", alert.title());
                for line in alert.lines() {
                    eprintln!("  {line}");
                }
            }
            bail!("provisioning {name} failed")
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();
    let settings = settings(&cli)?;
    let api: Arc<dyn CatalogApi> = Arc::new(
        HttpCatalogApi::new(
            &settings.api_url,
            settings.token.clone(),
            settings.request_timeout(),
        )
        .context("failed to build cluster API client")?,
    );
    let namespace = settings.default_namespace.clone();
    let store = init_store(
        AppState::new(namespace.clone(), settings.feature_flags.clone()),
        History::default(),
        Handle::current(),
    )?;
    store.dispatch(action::authenticate(settings.token.clone()));

    match cli.command {
        Command::Namespaces { create } => {
            if let Some(name) = create {
                run(store, thunks::create_namespace(api.clone(), Namespace::from(name.as_str())))
                    .await?;
                check(&store.get_state().cluster.errors.create, "create namespace")?;
                println!("created namespace {name}");
            }
            run(store, thunks::fetch_namespaces(api)).await?;
            let state = store.get_state();
            check(&state.cluster.errors.list, "list namespaces")?;
            for namespace in &state.cluster.namespaces {
                let marker = if namespace == &state.cluster.current_namespace {
                    "*"
                } else {
                    " "
                };
                println!("{marker} {namespace}");
            }
        }
        Command::Classes => {
            run(store, thunks::fetch_classes(api)).await?;
            let state = store.get_state();
            check(&state.catalog.errors.fetch, "list service classes")?;
            for class in &state.catalog.classes {
                println!(
                    "{:<24} {:<20} {}",
                    class.external_name, class.broker_name, class.description
                );
            }
        }
        Command::Plans { class } => {
            run(store, thunks::fetch_classes(api.clone())).await?;
            run(store, thunks::fetch_plans(api)).await?;
            let state = store.get_state();
            check(&state.catalog.errors.fetch, "list service plans")?;
            for entry in &state.catalog.classes {
                if class.as_deref().is_some_and(|wanted| wanted != entry.external_name) {
                    continue;
                }
                for plan in state.catalog.plans_for(entry) {
                    let tier = if plan.free { "free" } else { "paid" };
                    println!(
                        "{:<24} {:<16} {:<5} {}",
                        entry.external_name, plan.external_name, tier, plan.description
                    );
                }
            }
        }
        Command::Instances => {
            run(store, thunks::fetch_instances(api, namespace.clone())).await?;
            let state = store.get_state();
            check(&state.catalog.errors.fetch, "list service instances")?;
            for instance in &state.catalog.instances {
                println!(
                    "{:<24} {:<20} {:<16} {}",
                    instance.name,
                    instance.class_external_name,
                    instance.plan_external_name,
                    instance.status.label()
                );
            }
        }
        Command::Provision {
            class,
            plan,
            name,
            parameters,
        } => {
            provision(
                store,
                api,
                namespace,
                &class,
                &plan,
                &name,
                parameters.as_deref(),
            )
            .await?;
        }
    }

    Ok(())
}
