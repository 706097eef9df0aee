//! Backend commands queued from UI to backend worker.

use shared::{domain::Namespace, protocol::ProvisionRequest};

#[derive(Debug, Clone, PartialEq)]
pub enum BackendCommand {
    Login {
        token: Option<String>,
    },
    Logout,
    FetchNamespaces,
    SelectNamespace {
        namespace: Namespace,
    },
    CreateNamespace {
        namespace: Namespace,
    },
    GetNamespace {
        namespace: Namespace,
    },
    FetchCatalog,
    FetchInstances {
        namespace: Namespace,
    },
    Navigate {
        path: String,
    },
    Back,
    Forward,
    Provision {
        request: ProvisionRequest,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Login { .. } => "login",
            Self::Logout => "logout",
            Self::FetchNamespaces => "fetch_namespaces",
            Self::SelectNamespace { .. } => "select_namespace",
            Self::CreateNamespace { .. } => "create_namespace",
            Self::GetNamespace { .. } => "get_namespace",
            Self::FetchCatalog => "fetch_catalog",
            Self::FetchInstances { .. } => "fetch_instances",
            Self::Navigate { .. } => "navigate",
            Self::Back => "back",
            Self::Forward => "forward",
            Self::Provision { .. } => "provision",
        }
    }
}
