use std::sync::{Arc, Mutex};

use serde::Deserialize;
use serde_json::{json, Value};

use crate::testing::{drain, ScriptedTransport};
use crate::transport::{ApiRequest, ApiResponse};
use crate::{
    Dependencies, ErrorKind, FetchError, Method, MutationRequest, MutationState,
    ResourceController, ResourceId, Session,
};

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Balance {
    balance: f64,
}

/// A tiny in-memory wallet backend.
fn wallet_backend(start: f64) -> (Arc<ScriptedTransport>, Arc<Mutex<f64>>) {
    let ledger = Arc::new(Mutex::new(start));
    let server = Arc::clone(&ledger);
    let transport = ScriptedTransport::auto(move |req: &ApiRequest| {
        let mut balance = server.lock().unwrap();
        let amount = req
            .body
            .as_ref()
            .and_then(|b| b.get("amount"))
            .and_then(Value::as_f64)
            .unwrap_or(0.0);
        match (req.method, req.path.as_str()) {
            (Method::Get, "/api/wallet/balance") => {
                Ok(ApiResponse::json(&json!({ "balance": *balance })))
            }
            (Method::Post, "/api/wallet/deposit") => {
                *balance += amount;
                Ok(ApiResponse::json(&json!({ "balance": *balance })))
            }
            (Method::Post, "/api/wallet/withdraw") if amount > *balance => Ok(
                ApiResponse::with_status(400, &json!({ "message": "Insufficient balance" })),
            ),
            (Method::Post, "/api/wallet/withdraw") => {
                *balance -= amount;
                Ok(ApiResponse::json(&json!({ "balance": *balance })))
            }
            _ => Ok(ApiResponse::with_status(404, &json!({ "message": "Not found" }))),
        }
    });
    (transport, ledger)
}

fn balance_id() -> ResourceId {
    ResourceId::from("wallet.balance")
}

#[tokio::test]
async fn test_mutate_then_revalidate_reflects_server_state() {
    let (transport, _ledger) = wallet_backend(100.0);
    let controller = ResourceController::new(transport.clone(), Session::Anonymous);
    let wallet = controller.resource::<Balance>(balance_id());

    wallet.declare("/api/wallet/balance", Dependencies::none());
    assert_eq!(wallet.settled().await.data(), Some(&Balance { balance: 100.0 }));

    let deposit = MutationRequest::post("/api/wallet/deposit")
        .json(&json!({ "amount": 50.0 }))
        .unwrap();
    let returned: Balance = controller.mutate(deposit, &[balance_id()]).await.unwrap();
    assert_eq!(returned.balance, 150.0);

    assert_eq!(wallet.settled().await.data(), Some(&Balance { balance: 150.0 }));
    assert_eq!(transport.sent(), 3);
}

#[tokio::test]
async fn test_failed_mutation_leaves_resources_alone() {
    let (transport, ledger) = wallet_backend(20.0);
    let controller = ResourceController::new(transport.clone(), Session::Anonymous);
    let wallet = controller.resource::<Balance>(balance_id());

    wallet.declare("/api/wallet/balance", Dependencies::none());
    wallet.settled().await;

    let withdraw = MutationRequest::post("/api/wallet/withdraw")
        .json(&json!({ "amount": 500.0 }))
        .unwrap();
    let err = controller
        .mutate::<Balance>(withdraw, &[balance_id()])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Server);
    assert_eq!(err.message(), "Insufficient balance");

    drain().await;
    assert_eq!(transport.sent(), 2);
    assert_eq!(wallet.state().data(), Some(&Balance { balance: 20.0 }));
    assert_eq!(*ledger.lock().unwrap(), 20.0);
}

#[tokio::test]
async fn test_merge_returned_state_without_refetch() {
    let (transport, _ledger) = wallet_backend(10.0);
    let controller = ResourceController::new(transport.clone(), Session::Anonymous);
    let wallet = controller.resource::<Balance>(balance_id());

    wallet.declare("/api/wallet/balance", Dependencies::none());
    wallet.settled().await;

    let deposit = MutationRequest::post("/api/wallet/deposit")
        .json(&json!({ "amount": 5.0 }))
        .unwrap();
    let returned: Balance = controller.mutate(deposit, &[]).await.unwrap();
    wallet.replace_data(returned);

    assert_eq!(wallet.state().data(), Some(&Balance { balance: 15.0 }));
    assert_eq!(transport.sent(), 2);
}

#[tokio::test]
async fn test_concurrent_mutations_do_not_block() {
    let (transport, mut calls) = ScriptedTransport::held();
    let controller = ResourceController::new(transport, Session::Anonymous);

    let first = {
        let controller = controller.clone();
        tokio::spawn(async move {
            controller
                .mutate::<Value>(MutationRequest::post("/api/investments"), &[])
                .await
        })
    };
    let second = {
        let controller = controller.clone();
        tokio::spawn(async move {
            controller
                .mutate::<Value>(MutationRequest::put("/api/reports/r1/process"), &[])
                .await
        })
    };

    let a = calls.next().await;
    let b = calls.next().await;
    let (a, b) = if a.request.path == "/api/investments" { (a, b) } else { (b, a) };

    b.respond_json(json!({ "status": "resolved" }));
    assert_eq!(second.await.unwrap().unwrap(), json!({ "status": "resolved" }));
    assert!(!first.is_finished());

    a.respond_json(json!({ "updatedBalance": 40 }));
    assert_eq!(first.await.unwrap().unwrap(), json!({ "updatedBalance": 40 }));
}

#[tokio::test]
async fn test_mutation_handle_tracks_its_own_state() {
    let (transport, mut calls) = ScriptedTransport::held();
    let controller = ResourceController::new(transport, Session::Anonymous);
    let submit = Arc::new(controller.mutation::<Value>());
    assert!(matches!(submit.state(), MutationState::Idle));

    let running = {
        let submit = Arc::clone(&submit);
        tokio::spawn(async move {
            submit
                .run(MutationRequest::post("/api/reports/submit"), &[])
                .await
        })
    };

    let call = calls.next().await;
    assert!(submit.state().is_pending());
    call.respond_status(422, json!({ "message": "Reason is required" }));

    let err = running.await.unwrap().unwrap_err();
    assert_eq!(err.message(), "Reason is required");
    assert_eq!(submit.state().error(), Some(&err));

    submit.reset();
    assert!(matches!(submit.state(), MutationState::Idle));

    let retry = {
        let submit = Arc::clone(&submit);
        tokio::spawn(async move {
            submit
                .run(MutationRequest::post("/api/reports/submit"), &[])
                .await
        })
    };
    calls.next().await.respond_json(json!({ "ok": true }));
    retry.await.unwrap().unwrap();
    assert!(matches!(submit.state(), MutationState::Success(_)));
}

#[tokio::test]
async fn test_network_failure_is_reported_not_raised() {
    let transport = ScriptedTransport::auto(|_| Err(FetchError::network("Could not connect")));
    let controller = ResourceController::new(transport, Session::Anonymous);

    let err = controller
        .mutate::<Value>(MutationRequest::patch("/api/staff/approve-project/p1"), &[])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(err.to_string(), "Could not connect");
}
