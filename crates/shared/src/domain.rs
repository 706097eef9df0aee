use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

macro_rules! name_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

name_newtype!(Namespace);
name_newtype!(BrokerName);

/// A provisionable resource type offered by a cluster service broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceClass {
    pub name: String,
    pub external_name: String,
    pub broker_name: BrokerName,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A tier of a [`ServiceClass`]. The optional schema describes the
/// parameters accepted when creating an instance from this plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServicePlan {
    pub name: String,
    pub external_name: String,
    pub class_name: String,
    pub description: String,
    #[serde(default)]
    pub free: bool,
    #[serde(default)]
    pub instance_create_parameter_schema: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceStatus {
    Provisioning,
    Ready,
    Failed,
    Unknown,
}

impl InstanceStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Provisioning => "Provisioning",
            Self::Ready => "Ready",
            Self::Failed => "Failed",
            Self::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInstanceSummary {
    pub name: String,
    pub namespace: Namespace,
    pub class_external_name: String,
    pub plan_external_name: String,
    pub status: InstanceStatus,
    pub status_message: Option<String>,
}

/// A capability a user must hold, used to explain permission failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RbacRole {
    pub api_group: String,
    pub resource: String,
    pub verbs: Vec<String>,
    #[serde(default)]
    pub namespace: Option<String>,
}

impl RbacRole {
    pub fn new(api_group: &str, resource: &str, verbs: &[&str]) -> Self {
        Self {
            api_group: api_group.to_string(),
            resource: resource.to_string(),
            verbs: verbs.iter().map(|verb| verb.to_string()).collect(),
            namespace: None,
        }
    }
}

impl fmt::Display for RbacRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let group = if self.api_group.is_empty() {
            "core"
        } else {
            self.api_group.as_str()
        };
        write!(f, "{group}/{}: {}", self.resource, self.verbs.join(", "))?;
        if let Some(namespace) = &self.namespace {
            write!(f, " (namespace {namespace})")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureFlags {
    #[serde(default)]
    pub operators: bool,
    #[serde(default)]
    pub additional_clusters: Vec<String>,
    #[serde(default = "FeatureFlags::default_ui")]
    pub ui: String,
}

impl FeatureFlags {
    fn default_ui() -> String {
        "hex".to_string()
    }
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            operators: false,
            additional_clusters: Vec::new(),
            ui: Self::default_ui(),
        }
    }
}
