//! Route builders and the route table used to pick a view for a pathname.

use shared::domain::{BrokerName, Namespace};

pub fn apps_list(namespace: &Namespace) -> String {
    format!("/apps/ns/{namespace}")
}

pub fn catalog(namespace: &Namespace) -> String {
    format!("/catalog/ns/{namespace}")
}

pub fn service_class(class_name: &str) -> String {
    format!("/services/classes/{class_name}")
}

pub fn service_instance(broker: &BrokerName, namespace: &Namespace, name: &str) -> String {
    format!("/services/brokers/{broker}/instances/ns/{namespace}/{name}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Root,
    AppsList(Namespace),
    Catalog(Namespace),
    ServiceClass {
        class_name: String,
    },
    ServiceInstance {
        broker: BrokerName,
        namespace: Namespace,
        name: String,
    },
    NotFound(String),
}

impl Route {
    pub fn parse(pathname: &str) -> Self {
        let segments: Vec<&str> = pathname
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();

        match segments.as_slice() {
            [] => Self::Root,
            ["apps", "ns", namespace] => Self::AppsList(Namespace::from(*namespace)),
            ["catalog", "ns", namespace] => Self::Catalog(Namespace::from(*namespace)),
            ["services", "classes", class_name] => Self::ServiceClass {
                class_name: class_name.to_string(),
            },
            ["services", "brokers", broker, "instances", "ns", namespace, name] => {
                Self::ServiceInstance {
                    broker: BrokerName::from(*broker),
                    namespace: Namespace::from(*namespace),
                    name: name.to_string(),
                }
            }
            _ => Self::NotFound(pathname.to_string()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Self::Root => "/".to_string(),
            Self::AppsList(namespace) => apps_list(namespace),
            Self::Catalog(namespace) => catalog(namespace),
            Self::ServiceClass { class_name } => service_class(class_name),
            Self::ServiceInstance {
                broker,
                namespace,
                name,
            } => service_instance(broker, namespace, name),
            Self::NotFound(path) => path.clone(),
        }
    }

    /// The same view for another namespace, for routes scoped to a namespace
    /// listing. Instance routes are not rewritten since the instance does not
    /// exist elsewhere.
    pub fn with_namespace(&self, namespace: &Namespace) -> Option<Self> {
        match self {
            Self::AppsList(_) => Some(Self::AppsList(namespace.clone())),
            Self::Catalog(_) => Some(Self::Catalog(namespace.clone())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_namespaced_paths() {
        let namespace = Namespace::from("default");
        assert_eq!(apps_list(&namespace), "/apps/ns/default");
        assert_eq!(catalog(&namespace), "/catalog/ns/default");
        assert_eq!(
            service_instance(&BrokerName::from("ups-broker"), &namespace, "my-db"),
            "/services/brokers/ups-broker/instances/ns/default/my-db"
        );
    }

    #[test]
    fn parses_known_routes() {
        assert_eq!(Route::parse(""), Route::Root);
        assert_eq!(Route::parse("/"), Route::Root);
        assert_eq!(
            Route::parse("/catalog/ns/team-a"),
            Route::Catalog(Namespace::from("team-a"))
        );
        assert_eq!(
            Route::parse("/services/brokers/b/instances/ns/team-a/db"),
            Route::ServiceInstance {
                broker: BrokerName::from("b"),
                namespace: Namespace::from("team-a"),
                name: "db".to_string(),
            }
        );
        assert_eq!(
            Route::parse("/charts/stable"),
            Route::NotFound("/charts/stable".to_string())
        );
    }

    #[test]
    fn path_and_parse_agree() {
        let route = Route::ServiceClass {
            class_name: "mysql".to_string(),
        };
        assert_eq!(Route::parse(&route.path()), route);
    }

    #[test]
    fn switches_namespace_only_for_listings() {
        let other = Namespace::from("other");
        assert_eq!(
            Route::AppsList(Namespace::from("default")).with_namespace(&other),
            Some(Route::AppsList(other.clone()))
        );
        assert_eq!(Route::Root.with_namespace(&other), None);
    }
}
