//! Fakes shared by the unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use shared::{
    domain::{
        BrokerName, FeatureFlags, InstanceStatus, Namespace, ServiceClass,
        ServiceInstanceSummary, ServicePlan,
    },
    error::ApiError,
    protocol::ProvisionRequest,
};
use tokio::runtime::Handle;

use crate::{
    api::CatalogApi,
    bootstrap::configure_store,
    history::{HashHistory, History},
    state::AppState,
    store::Store,
};

pub fn mysql_class() -> ServiceClass {
    ServiceClass {
        name: "class-uid".to_string(),
        external_name: "mysql".to_string(),
        broker_name: BrokerName::from("ups-broker"),
        description: "MySQL database".to_string(),
        tags: vec!["database".to_string()],
    }
}

pub fn small_plan(schema: Option<Value>) -> ServicePlan {
    ServicePlan {
        name: "plan-uid".to_string(),
        external_name: "small".to_string(),
        class_name: "class-uid".to_string(),
        description: "Small instance".to_string(),
        free: true,
        instance_create_parameter_schema: schema,
    }
}

/// Store on the current runtime, starting at `/`.
pub fn test_store() -> Store {
    configure_store(
        AppState::new(Namespace::from("default"), FeatureFlags::default()),
        History::new(HashHistory::new()),
        Handle::current(),
    )
}

#[derive(Default)]
pub struct FakeCatalogApi {
    pub namespaces: Vec<Namespace>,
    pub classes: Vec<ServiceClass>,
    pub plans: Vec<ServicePlan>,
    pub fail_with: Option<ApiError>,
    pub provision_calls: Arc<Mutex<Vec<ProvisionRequest>>>,
}

impl FakeCatalogApi {
    pub fn ok() -> Self {
        Self {
            namespaces: vec![Namespace::from("default"), Namespace::from("team-a")],
            classes: vec![mysql_class()],
            plans: vec![small_plan(None)],
            ..Self::default()
        }
    }

    pub fn failing(error: ApiError) -> Self {
        Self {
            fail_with: Some(error),
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), ApiError> {
        match &self.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    pub fn provision_calls(&self) -> Vec<ProvisionRequest> {
        self.provision_calls.lock().expect("lock").clone()
    }
}

#[async_trait]
impl CatalogApi for FakeCatalogApi {
    async fn list_namespaces(&self) -> Result<Vec<Namespace>, ApiError> {
        self.check()?;
        Ok(self.namespaces.clone())
    }

    async fn get_namespace(&self, name: &Namespace) -> Result<Namespace, ApiError> {
        self.check()?;
        self.namespaces
            .iter()
            .find(|namespace| *namespace == name)
            .cloned()
            .ok_or_else(|| ApiError::not_found(format!("namespaces \"{name}\" not found")))
    }

    async fn create_namespace(&self, name: &Namespace) -> Result<Namespace, ApiError> {
        self.check()?;
        Ok(name.clone())
    }

    async fn list_classes(&self) -> Result<Vec<ServiceClass>, ApiError> {
        self.check()?;
        Ok(self.classes.clone())
    }

    async fn list_plans(&self) -> Result<Vec<ServicePlan>, ApiError> {
        self.check()?;
        Ok(self.plans.clone())
    }

    async fn list_instances(
        &self,
        namespace: &Namespace,
    ) -> Result<Vec<ServiceInstanceSummary>, ApiError> {
        self.check()?;
        Ok(self
            .provision_calls()
            .into_iter()
            .filter(|request| &request.namespace == namespace)
            .map(|request| summary(&request))
            .collect())
    }

    async fn provision_instance(
        &self,
        request: &ProvisionRequest,
    ) -> Result<ServiceInstanceSummary, ApiError> {
        self.provision_calls
            .lock()
            .expect("lock")
            .push(request.clone());
        self.check()?;
        Ok(summary(request))
    }
}

fn summary(request: &ProvisionRequest) -> ServiceInstanceSummary {
    ServiceInstanceSummary {
        name: request.name.clone(),
        namespace: request.namespace.clone(),
        class_external_name: request.class_external_name.clone(),
        plan_external_name: request.plan_external_name.clone(),
        status: InstanceStatus::Provisioning,
        status_message: None,
    }
}
