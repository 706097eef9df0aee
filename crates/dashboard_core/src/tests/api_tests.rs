use super::*;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use shared::domain::InstanceStatus;
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct ClusterState {
    created_instances: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

async fn list_namespaces() -> Json<Value> {
    Json(json!({
        "kind": "NamespaceList",
        "items": [
            {"metadata": {"name": "default"}},
            {"metadata": {"name": "team-a"}}
        ]
    }))
}

async fn get_namespace(Path(name): Path<String>) -> (StatusCode, Json<Value>) {
    if name == "missing" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({
                "kind": "Status",
                "message": "namespaces \"missing\" not found",
                "reason": "NotFound",
                "code": 404
            })),
        );
    }
    (StatusCode::OK, Json(json!({"metadata": {"name": name}})))
}

async fn create_namespace(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    (StatusCode::CREATED, Json(body))
}

async fn list_classes() -> Json<Value> {
    Json(json!({"items": [{
        "metadata": {"name": "class-uid-1"},
        "spec": {
            "externalName": "mysql",
            "clusterServiceBrokerName": "ups-broker",
            "description": "MySQL database",
            "tags": ["database"]
        }
    }]}))
}

async fn list_plans() -> Json<Value> {
    Json(json!({"items": [{
        "metadata": {"name": "plan-uid-1"},
        "spec": {
            "externalName": "small",
            "clusterServiceClassRef": {"name": "class-uid-1"},
            "free": true
        }
    }]}))
}

async fn create_instance(
    State(state): State<ClusterState>,
    Path(namespace): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if namespace == "locked" {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "kind": "Status",
                "message": "serviceinstances.servicecatalog.k8s.io is forbidden",
                "reason": "Forbidden",
                "code": 403
            })),
        );
    }
    let auth = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    state
        .created_instances
        .lock()
        .await
        .push((auth, body.clone()));
    (StatusCode::CREATED, Json(body))
}

async fn broken_instances() -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, String::new())
}

async fn spawn_cluster() -> anyhow::Result<(String, ClusterState)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = ClusterState::default();
    let app = Router::new()
        .route("/api/v1/namespaces", get(list_namespaces).post(create_namespace))
        .route("/api/v1/namespaces/:name", get(get_namespace))
        .route(
            "/apis/servicecatalog.k8s.io/v1beta1/clusterserviceclasses",
            get(list_classes),
        )
        .route(
            "/apis/servicecatalog.k8s.io/v1beta1/clusterserviceplans",
            get(list_plans),
        )
        .route(
            "/apis/servicecatalog.k8s.io/v1beta1/namespaces/:namespace/serviceinstances",
            post(create_instance).get(broken_instances),
        )
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), state))
}

fn api(base_url: &str, token: Option<&str>) -> HttpCatalogApi {
    HttpCatalogApi::new(
        base_url,
        token.map(str::to_string),
        Duration::from_secs(5),
    )
    .expect("api client")
}

#[test]
fn rejects_invalid_base_url() {
    let err = HttpCatalogApi::new("not a url", None, Duration::from_secs(1))
        .err()
        .expect("invalid url");
    assert!(matches!(err, CatalogApiError::InvalidUrl { .. }));
    assert_eq!(err.kind(), ErrorKind::Internal);
}

#[test]
fn trims_trailing_slash_and_blank_token() {
    let api = HttpCatalogApi::new("http://localhost:8080/", Some("  ".to_string()), Duration::from_secs(1))
        .expect("api client");
    assert_eq!(api.base_url(), "http://localhost:8080");
    assert!(api.token.is_none());
}

#[tokio::test]
async fn lists_and_gets_namespaces() {
    let (base_url, _) = spawn_cluster().await.expect("spawn cluster");
    let api = api(&base_url, None);

    let namespaces = api.list_namespaces().await.expect("list namespaces");
    assert_eq!(
        namespaces,
        vec![Namespace::from("default"), Namespace::from("team-a")]
    );

    let found = api
        .get_namespace(&Namespace::from("team-a"))
        .await
        .expect("get namespace");
    assert_eq!(found, Namespace::from("team-a"));
}

#[tokio::test]
async fn missing_namespace_maps_to_not_found_with_server_message() {
    let (base_url, _) = spawn_cluster().await.expect("spawn cluster");
    let err = api(&base_url, None)
        .get_namespace(&Namespace::from("missing"))
        .await
        .expect_err("namespace should be missing");
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(err.message, "namespaces \"missing\" not found");
}

#[tokio::test]
async fn creates_namespace() {
    let (base_url, _) = spawn_cluster().await.expect("spawn cluster");
    let created = api(&base_url, None)
        .create_namespace(&Namespace::from("fresh"))
        .await
        .expect("create namespace");
    assert_eq!(created, Namespace::from("fresh"));
}

#[tokio::test]
async fn lists_classes_and_plans() {
    let (base_url, _) = spawn_cluster().await.expect("spawn cluster");
    let api = api(&base_url, None);

    let classes = api.list_classes().await.expect("classes");
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].external_name, "mysql");
    assert_eq!(classes[0].broker_name.as_str(), "ups-broker");

    let plans = api.list_plans().await.expect("plans");
    assert_eq!(plans[0].class_name, "class-uid-1");
    assert!(plans[0].free);
    assert!(plans[0].instance_create_parameter_schema.is_none());
}

#[tokio::test]
async fn provision_posts_service_instance_with_bearer_token() {
    let (base_url, state) = spawn_cluster().await.expect("spawn cluster");
    let request = ProvisionRequest {
        name: "my-db".to_string(),
        namespace: Namespace::from("team-a"),
        class_external_name: "mysql".to_string(),
        plan_external_name: "small".to_string(),
        parameters: json!({"storage": "10Gi"}),
    };

    let created = api(&base_url, Some("secret-token"))
        .provision_instance(&request)
        .await
        .expect("provision");
    assert_eq!(created.name, "my-db");
    assert_eq!(created.namespace, Namespace::from("team-a"));
    assert_eq!(created.status, InstanceStatus::Unknown);

    let recorded = state.created_instances.lock().await;
    assert_eq!(recorded.len(), 1);
    let (auth, body) = &recorded[0];
    assert_eq!(auth.as_deref(), Some("Bearer secret-token"));
    assert_eq!(body["spec"]["parameters"]["storage"], "10Gi");
    assert_eq!(body["spec"]["clusterServicePlanExternalName"], "small");
}

#[tokio::test]
async fn forbidden_provision_maps_to_forbidden_kind() {
    let (base_url, state) = spawn_cluster().await.expect("spawn cluster");
    let request = ProvisionRequest {
        name: "my-db".to_string(),
        namespace: Namespace::from("locked"),
        class_external_name: "mysql".to_string(),
        plan_external_name: "small".to_string(),
        parameters: json!({}),
    };

    let err = api(&base_url, None)
        .provision_instance(&request)
        .await
        .expect_err("forbidden");
    assert_eq!(err.kind, ErrorKind::Forbidden);
    assert!(err.message.contains("forbidden"));
    assert!(state.created_instances.lock().await.is_empty());
}

#[tokio::test]
async fn empty_error_body_falls_back_to_status_reason() {
    let (base_url, _) = spawn_cluster().await.expect("spawn cluster");
    let err = api(&base_url, None)
        .list_instances(&Namespace::from("default"))
        .await
        .expect_err("server error");
    assert_eq!(err.kind, ErrorKind::Internal);
    assert_eq!(err.message, "Internal Server Error");
}

#[tokio::test]
async fn unreachable_server_maps_to_transport() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let err = api(&format!("http://{addr}"), None)
        .list_namespaces()
        .await
        .expect_err("connection refused");
    assert_eq!(err.kind, ErrorKind::Transport);
}
