use super::*;
use std::sync::Mutex;

use crate::{
    action::{self, ClusterAction},
    history::{HashHistory, HistoryAction},
    middleware::RouterMiddleware,
    state::root_reducer,
    test_support::test_store,
};
use shared::domain::Namespace;

struct Recorder {
    seen: Arc<Mutex<Vec<String>>>,
}

impl Middleware for Recorder {
    fn handle(&self, _store: &Store, dispatchable: Dispatchable, next: Next<'_>) -> Dispatched {
        let label = match &dispatchable {
            Dispatchable::Action(action) => action.kind().to_string(),
            Dispatchable::Thunk(_) => "thunk".to_string(),
        };
        self.seen.lock().expect("lock").push(label);
        next(dispatchable)
    }
}

fn bare_store(middleware: Vec<Arc<dyn Middleware>>) -> Store {
    Store::new(
        root_reducer,
        AppState::default(),
        History::new(HashHistory::new()),
        middleware,
    )
}

#[test]
fn plain_actions_reach_the_reducer() {
    let store = bare_store(Vec::new());
    let dispatched = store.dispatch(action::set_namespace(Namespace::from("team-a")));
    assert!(matches!(dispatched, Dispatched::Reduced));
    assert_eq!(
        store.get_state().cluster.current_namespace,
        Namespace::from("team-a")
    );
}

#[test]
fn thunks_without_thunk_middleware_are_dropped() {
    let store = bare_store(Vec::new());
    let dispatched = store.dispatch(thunk(|store| async move {
        store.dispatch(action::logout());
    }));
    assert!(matches!(dispatched, Dispatched::Dropped));
}

#[test]
fn middleware_runs_in_order_and_sees_router_follow_ups() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let history = History::new(HashHistory::new());
    let store = Store::new(
        root_reducer,
        AppState::default(),
        history.clone(),
        vec![
            Arc::new(Recorder { seen: seen.clone() }),
            Arc::new(RouterMiddleware::new(history)),
        ],
    );

    store.dispatch(action::push("/catalog/ns/default"));

    assert_eq!(
        *seen.lock().expect("lock"),
        vec![
            "router/call_history_method".to_string(),
            "router/location_changed".to_string()
        ]
    );
    assert_eq!(store.get_state().router.location.pathname, "/catalog/ns/default");
    assert_eq!(store.get_state().router.action, HistoryAction::Push);
}

#[tokio::test]
async fn router_middleware_walks_history() {
    let store = test_store();
    store.dispatch(action::push("/apps/ns/default"));
    store.dispatch(action::push("/catalog/ns/default"));

    store.dispatch(action::go_back());
    assert_eq!(store.get_state().router.location.pathname, "/apps/ns/default");
    assert_eq!(store.get_state().router.action, HistoryAction::Pop);

    store.dispatch(action::go_forward());
    assert_eq!(store.get_state().router.location.pathname, "/catalog/ns/default");

    let dispatched = store.dispatch(action::go_forward());
    assert!(matches!(dispatched, Dispatched::Intercepted));

    store.dispatch(action::replace("/apps/ns/other"));
    assert_eq!(store.history().lock().len(), 3);
    assert_eq!(store.history().href(), "#/apps/ns/other");
}

#[tokio::test]
async fn subscribers_observe_changes() {
    let store = test_store();
    let mut rx = store.subscribe();
    assert!(!rx.has_changed().expect("sender alive"));

    store.dispatch(Action::Cluster(ClusterAction::ReceiveNamespaces(vec![
        Namespace::from("default"),
    ])));

    rx.changed().await.expect("changed");
    assert_eq!(rx.borrow().cluster.namespaces, vec![Namespace::from("default")]);
}

#[tokio::test]
async fn thunks_run_on_the_runtime() {
    let store = test_store();
    let handle = store
        .dispatch(thunk(|store| async move {
            store.dispatch(action::authenticate(Some("token".to_string())));
        }))
        .into_task()
        .expect("spawned");
    handle.await.expect("thunk finished");
    assert!(store.get_state().auth.authenticated);
}
