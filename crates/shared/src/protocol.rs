//! Kubernetes wire types for the resources the dashboard reads and creates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{
    BrokerName, InstanceStatus, Namespace, ServiceClass, ServiceInstanceSummary, ServicePlan,
};

pub const SERVICE_CATALOG_API_VERSION: &str = "servicecatalog.k8s.io/v1beta1";
pub const SERVICE_INSTANCE_KIND: &str = "ServiceInstance";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectList<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceObject {
    #[serde(default = "NamespaceObject::api_version")]
    pub api_version: String,
    #[serde(default = "NamespaceObject::kind")]
    pub kind: String,
    pub metadata: ObjectMeta,
}

impl NamespaceObject {
    fn api_version() -> String {
        "v1".to_string()
    }

    fn kind() -> String {
        "Namespace".to_string()
    }

    pub fn named(name: &Namespace) -> Self {
        Self {
            api_version: Self::api_version(),
            kind: Self::kind(),
            metadata: ObjectMeta {
                name: name.as_str().to_string(),
                ..ObjectMeta::default()
            },
        }
    }
}

/// Body of a non-success response from the API server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub code: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterServiceClassSpec {
    pub external_name: String,
    pub cluster_service_broker_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterServiceClass {
    pub metadata: ObjectMeta,
    pub spec: ClusterServiceClassSpec,
}

impl From<ClusterServiceClass> for ServiceClass {
    fn from(value: ClusterServiceClass) -> Self {
        Self {
            name: value.metadata.name,
            external_name: value.spec.external_name,
            broker_name: BrokerName(value.spec.cluster_service_broker_name),
            description: value.spec.description,
            tags: value.spec.tags,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectReference {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterServicePlanSpec {
    pub external_name: String,
    pub cluster_service_class_ref: ObjectReference,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub free: bool,
    #[serde(default)]
    pub instance_create_parameter_schema: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterServicePlan {
    pub metadata: ObjectMeta,
    pub spec: ClusterServicePlanSpec,
}

impl From<ClusterServicePlan> for ServicePlan {
    fn from(value: ClusterServicePlan) -> Self {
        Self {
            name: value.metadata.name,
            external_name: value.spec.external_name,
            class_name: value.spec.cluster_service_class_ref.name,
            description: value.spec.description,
            free: value.spec.free,
            instance_create_parameter_schema: value.spec.instance_create_parameter_schema,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInstanceSpec {
    pub cluster_service_class_external_name: String,
    pub cluster_service_plan_external_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceInstanceStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInstance {
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: ServiceInstanceSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ServiceInstanceStatus>,
}

impl ServiceInstance {
    fn status_from_conditions(&self) -> (InstanceStatus, Option<String>) {
        let Some(status) = &self.status else {
            return (InstanceStatus::Unknown, None);
        };
        let Some(last) = status.conditions.last() else {
            return (InstanceStatus::Unknown, None);
        };
        let message = (!last.message.is_empty()).then(|| last.message.clone());
        let state = match (last.condition_type.as_str(), last.status.as_str()) {
            ("Ready", "True") => InstanceStatus::Ready,
            ("Failed", "True") => InstanceStatus::Failed,
            ("Ready", "False") if last.reason.eq_ignore_ascii_case("ProvisionCallFailed") => {
                InstanceStatus::Failed
            }
            ("Ready", _) => InstanceStatus::Provisioning,
            _ => InstanceStatus::Unknown,
        };
        (state, message)
    }
}

impl From<ServiceInstance> for ServiceInstanceSummary {
    fn from(value: ServiceInstance) -> Self {
        let (status, status_message) = value.status_from_conditions();
        Self {
            namespace: Namespace(value.metadata.namespace.unwrap_or_default()),
            name: value.metadata.name,
            class_external_name: value.spec.cluster_service_class_external_name,
            plan_external_name: value.spec.cluster_service_plan_external_name,
            status,
            status_message,
        }
    }
}

/// Arguments of a provisioning call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisionRequest {
    pub name: String,
    pub namespace: Namespace,
    pub class_external_name: String,
    pub plan_external_name: String,
    pub parameters: Value,
}

impl ProvisionRequest {
    pub fn to_service_instance(&self) -> ServiceInstance {
        let parameters = match &self.parameters {
            Value::Null => None,
            Value::Object(map) if map.is_empty() => None,
            other => Some(other.clone()),
        };
        ServiceInstance {
            api_version: SERVICE_CATALOG_API_VERSION.to_string(),
            kind: SERVICE_INSTANCE_KIND.to_string(),
            metadata: ObjectMeta {
                name: self.name.clone(),
                namespace: Some(self.namespace.as_str().to_string()),
                ..ObjectMeta::default()
            },
            spec: ServiceInstanceSpec {
                cluster_service_class_external_name: self.class_external_name.clone(),
                cluster_service_plan_external_name: self.plan_external_name.clone(),
                parameters,
            },
            status: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn provision_request_builds_service_instance_body() {
        let request = ProvisionRequest {
            name: "my-db".to_string(),
            namespace: Namespace::from("team-a"),
            class_external_name: "mysql".to_string(),
            plan_external_name: "small".to_string(),
            parameters: json!({"size": 10}),
        };

        let body = serde_json::to_value(request.to_service_instance()).expect("serialize");
        assert_eq!(body["apiVersion"], "servicecatalog.k8s.io/v1beta1");
        assert_eq!(body["kind"], "ServiceInstance");
        assert_eq!(body["metadata"]["name"], "my-db");
        assert_eq!(body["metadata"]["namespace"], "team-a");
        assert_eq!(body["spec"]["clusterServiceClassExternalName"], "mysql");
        assert_eq!(body["spec"]["clusterServicePlanExternalName"], "small");
        assert_eq!(body["spec"]["parameters"]["size"], 10);
        assert!(body.get("status").is_none());
    }

    #[test]
    fn empty_parameters_are_omitted() {
        let request = ProvisionRequest {
            name: "cache".to_string(),
            namespace: Namespace::from("default"),
            class_external_name: "redis".to_string(),
            plan_external_name: "free".to_string(),
            parameters: json!({}),
        };
        assert!(request.to_service_instance().spec.parameters.is_none());
    }

    #[test]
    fn instance_summary_reads_last_condition() {
        let instance: ServiceInstance = serde_json::from_value(json!({
            "apiVersion": "servicecatalog.k8s.io/v1beta1",
            "kind": "ServiceInstance",
            "metadata": {"name": "my-db", "namespace": "team-a"},
            "spec": {
                "clusterServiceClassExternalName": "mysql",
                "clusterServicePlanExternalName": "small"
            },
            "status": {"conditions": [
                {"type": "Ready", "status": "False", "reason": "Provisioning", "message": "in progress"},
                {"type": "Ready", "status": "True", "reason": "ProvisionedSuccessfully", "message": "done"}
            ]}
        }))
        .expect("deserialize");

        let summary = ServiceInstanceSummary::from(instance);
        assert_eq!(summary.status, InstanceStatus::Ready);
        assert_eq!(summary.status_message.as_deref(), Some("done"));
        assert_eq!(summary.namespace, Namespace::from("team-a"));
    }

    #[test]
    fn plan_conversion_keeps_parameter_schema() {
        let plan: ClusterServicePlan = serde_json::from_value(json!({
            "metadata": {"name": "plan-uid"},
            "spec": {
                "externalName": "small",
                "clusterServiceClassRef": {"name": "class-uid"},
                "instanceCreateParameterSchema": {"type": "object"}
            }
        }))
        .expect("deserialize");

        let plan = ServicePlan::from(plan);
        assert_eq!(plan.class_name, "class-uid");
        assert_eq!(
            plan.instance_create_parameter_schema,
            Some(json!({"type": "object"}))
        );
    }
}
