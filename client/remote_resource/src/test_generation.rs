use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use crate::testing::{drain, CallQueue, ScriptedTransport};
use crate::{
    Dependencies, ErrorKind, FetchError, ResourceController, ResourceId, Session, ViewBranch,
    ViewState,
};

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Item {
    id: u32,
}

#[derive(Debug, PartialEq, Deserialize)]
struct Page {
    items: Vec<Item>,
}

fn setup(abort_superseded: bool) -> (ResourceController, Arc<ScriptedTransport>, CallQueue) {
    let (transport, calls) = ScriptedTransport::held();
    let controller =
        ResourceController::with_options(transport.clone(), Session::Anonymous, abort_superseded);
    (controller, transport, calls)
}

fn filter(value: &str) -> Dependencies {
    Dependencies::new().with(value)
}

#[tokio::test]
async fn test_out_of_order_responses_keep_latest() {
    let (controller, _transport, mut calls) = setup(false);
    let projects = controller.resource::<Vec<Item>>("projects");

    projects.declare("/api/projects?filter=a", filter("a"));
    let a = calls.next().await;
    projects.declare("/api/projects?filter=b", filter("b"));
    let b = calls.next().await;
    assert_eq!(b.request.path, "/api/projects?filter=b");

    b.respond_json(json!([{ "id": 2 }]));
    let settled = projects.settled().await;
    assert_eq!(settled.data(), Some(&vec![Item { id: 2 }]));

    // A arrives late and must not overwrite B.
    assert!(!a.is_abandoned());
    a.respond_json(json!([{ "id": 1 }]));
    drain().await;
    assert_eq!(projects.state().data(), Some(&vec![Item { id: 2 }]));
}

#[tokio::test]
async fn test_superseded_request_is_aborted() {
    let (controller, _transport, mut calls) = setup(true);
    let projects = controller.resource::<Vec<Item>>("projects");

    projects.declare("/api/projects?filter=a", filter("a"));
    let a = calls.next().await;
    projects.declare("/api/projects?filter=b", filter("b"));
    let b = calls.next().await;

    drain().await;
    assert!(a.is_abandoned());
    a.respond_json(json!([{ "id": 1 }]));

    b.respond_json(json!([{ "id": 2 }]));
    assert_eq!(projects.settled().await.data(), Some(&vec![Item { id: 2 }]));
}

#[tokio::test]
async fn test_declare_is_idempotent_for_unchanged_dependencies() {
    let (controller, transport, mut calls) = setup(true);
    let wallet = controller.resource::<serde_json::Value>("wallet.balance");

    let first = wallet.declare("/api/wallet/balance", Dependencies::none());
    assert!(first.is_loading());
    drain().await;
    let generation = wallet.generation();

    let again = wallet.declare("/api/wallet/balance", Dependencies::none());
    assert!(again.is_loading());
    drain().await;

    assert_eq!(transport.sent(), 1);
    assert_eq!(wallet.generation(), generation);
    calls.next().await.respond_json(json!({ "balance": 10 }));
    assert!(calls.try_next().is_none());

    wallet.settled().await;
    wallet.declare("/api/wallet/balance", Dependencies::none());
    drain().await;
    assert_eq!(transport.sent(), 1);
}

#[tokio::test]
async fn test_endpoint_change_alone_triggers_fetch() {
    let (controller, transport, mut calls) = setup(true);
    let profile = controller.resource::<serde_json::Value>("profile");

    profile.declare("/entrepreneur-profile/u1", Dependencies::none());
    calls.next().await.respond_json(json!({}));
    profile.settled().await;

    profile.declare("/entrepreneur-profile/u2", Dependencies::none());
    let call = calls.next().await;
    assert_eq!(call.request.path, "/entrepreneur-profile/u2");
    assert_eq!(transport.sent(), 2);
}

#[tokio::test]
async fn test_failures_become_error_state() {
    let (controller, _transport, mut calls) = setup(true);
    let reports = controller.resource::<Vec<Item>>("reports");

    reports.declare("/api/reports/all", filter("all"));
    calls.next().await.respond_status(500, json!({}));
    let state = reports.settled().await;
    let err = state.error().expect("error state");
    assert_eq!(err.kind(), ErrorKind::Server);
    assert_eq!(err.message(), "Request failed with status 500");
    assert!(state.data().is_none());

    reports.declare("/api/reports/all", filter("pending"));
    calls.next().await.fail(FetchError::network(""));
    let state = reports.settled().await;
    assert_eq!(state.error().map(|e| e.kind()), Some(ErrorKind::Network));
    assert!(!state.error().unwrap().message().is_empty());

    // Wrong shape: never a partial success.
    reports.declare("/api/reports/all", filter("resolved"));
    calls.next().await.respond_json(json!({ "unexpected": true }));
    let state = reports.settled().await;
    assert_eq!(state.error().map(|e| e.kind()), Some(ErrorKind::Decode));
    assert!(state.data().is_none());
}

#[tokio::test]
async fn test_empty_collection_renders_empty_branch() {
    let (controller, _transport, mut calls) = setup(true);
    let page = controller.resource::<Page>("investments");

    page.declare("/api/investments/entrepreneur", Dependencies::none());
    calls.next().await.respond_json(json!({ "items": [] }));
    let state = page.settled().await;

    assert_eq!(state.data(), Some(&Page { items: vec![] }));
    assert_eq!(state.branch(|p| p.items.is_empty()), ViewBranch::Empty);
}

#[tokio::test]
async fn test_filter_switch_never_reports_old_data_as_current() {
    let (controller, _transport, mut calls) = setup(true);
    let projects = controller.resource::<Vec<Item>>("projects");

    projects.declare("/projects?filter=all", filter("all"));
    calls.next().await.respond_json(json!([{ "id": 1 }]));
    assert_eq!(projects.settled().await.data(), Some(&vec![Item { id: 1 }]));

    let switching = projects.declare("/projects?filter=projectX", filter("projectX"));
    assert_eq!(switching.data(), None);
    assert_eq!(switching.stale_data(), Some(&vec![Item { id: 1 }]));
    assert_eq!(switching.branch(|v| v.is_empty()), ViewBranch::Loading);

    let mut rx = projects.subscribe();
    calls.next().await.respond_json(json!([{ "id": 2 }]));
    rx.changed().await.unwrap();
    let current = rx.borrow().clone();
    assert_eq!(current, ViewState::Success(Arc::new(vec![Item { id: 2 }])));
}

#[tokio::test]
async fn test_loading_clears_previous_error() {
    let (controller, _transport, mut calls) = setup(true);
    let history = controller.resource::<Vec<Item>>("history");

    history.declare("/api/investments/investor/u1", Dependencies::none());
    calls.next().await.respond_status(403, json!({ "message": "Forbidden" }));
    assert!(history.settled().await.error().is_some());

    assert!(history.revalidate());
    let state = history.state();
    assert!(state.error().is_none());
    assert_eq!(state, ViewState::Loading { stale: None });

    calls.next().await.respond_json(json!([]));
    assert_eq!(history.settled().await.data(), Some(&vec![]));
}

#[tokio::test]
async fn test_dropping_resource_abandons_request() {
    let (controller, _transport, mut calls) = setup(false);
    let wallet = controller.resource::<serde_json::Value>("wallet.balance");

    wallet.declare("/api/wallet/balance", Dependencies::none());
    let call = calls.next().await;
    drop(wallet);
    drain().await;

    assert!(call.is_abandoned());
    assert!(!controller.revalidate(&ResourceId::from("wallet.balance")));
}

#[tokio::test]
async fn test_new_mount_supersedes_same_id() {
    let (controller, transport, mut calls) = setup(false);
    let old = controller.resource::<Vec<Item>>("projects");
    old.declare("/api/projects/approved", Dependencies::none());
    let old_call = calls.next().await;

    let fresh = controller.resource::<Vec<Item>>("projects");
    drain().await;
    assert!(old_call.is_abandoned());

    // Registry now points at the fresh, not yet declared, resource.
    assert!(!controller.revalidate(&"projects".into()));

    fresh.declare("/api/projects/approved", Dependencies::none());
    calls.next().await.respond_json(json!([{ "id": 3 }]));
    fresh.settled().await;

    assert!(controller.revalidate(&"projects".into()));
    calls.next().await.respond_json(json!([{ "id": 4 }]));
    assert_eq!(fresh.settled().await.data(), Some(&vec![Item { id: 4 }]));
    assert_eq!(transport.sent(), 3);
    assert_eq!(old.state(), ViewState::Idle);
}

#[tokio::test]
async fn test_superseded_resource_is_retired() {
    let (controller, transport, mut calls) = setup(true);
    let old = controller.resource::<Vec<Item>>("projects");
    old.declare("/api/projects/approved", Dependencies::none());
    let _old_call = calls.next().await;

    let _fresh = controller.resource::<Vec<Item>>("projects");
    let settled = tokio::time::timeout(Duration::from_millis(300), old.settled()).await;
    assert_eq!(settled.ok(), Some(ViewState::Idle));

    assert!(!old.revalidate());
    assert_eq!(
        old.declare("/api/projects/approved?page=2", Dependencies::none()),
        ViewState::Idle
    );
    old.replace_data(vec![Item { id: 9 }]);
    drain().await;

    assert_eq!(old.state(), ViewState::Idle);
    assert_eq!(transport.sent(), 1);
}

#[tokio::test]
async fn test_replace_data_wins_over_in_flight_fetch() {
    let (controller, _transport, mut calls) = setup(false);
    let balance = controller.resource::<f64>("wallet.balance");

    balance.declare("/api/wallet/balance", Dependencies::none());
    let call = calls.next().await;
    balance.replace_data(175.0);
    assert_eq!(balance.state().data(), Some(&175.0));

    call.respond_json(json!(100.0));
    drain().await;
    assert_eq!(balance.state().data(), Some(&175.0));
}

#[tokio::test]
async fn test_revalidate_without_declare_is_noop() {
    let (controller, transport, _calls) = setup(true);
    let wallet = controller.resource::<f64>("wallet.balance");

    assert!(!wallet.revalidate());
    assert!(!controller.revalidate(&"wallet.balance".into()));
    assert!(!controller.revalidate(&"unknown".into()));
    assert_eq!(wallet.settled().await, ViewState::Idle);
    assert_eq!(transport.sent(), 0);
}
