//! Capability requests against a spawned session.

use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::{Value, json};
use syster_session::Capability;
use syster_session::ide::{Context, HandlerError};
use syster_session::server::{RequestError, SessionEvent};
use tokio_util::sync::CancellationToken;

use crate::helpers::session_helpers::*;
use crate::helpers::source_fixtures::*;

fn position(uri: &str, line: u32, character: u32) -> Value {
    json!({
        "textDocument": { "uri": uri },
        "position": { "line": line, "character": character },
    })
}

// =============================================================================
// PARKING
// =============================================================================

#[tokio::test]
async fn test_no_answer_before_first_model() {
    let (session, _) = new_session();
    let (handle, _task) = session.spawn();

    let requester = handle.clone();
    let hover = tokio::spawn(async move {
        requester
            .request(&Capability::Hover, position(VEHICLE_URI, 2, 24), CancellationToken::new())
            .await
    });

    // Buffer edits and configuration before the root do not release it.
    handle.notify(open(VEHICLE_URI, VEHICLE, 1)).unwrap();
    handle.notify(open(ENGINE_URI, ENGINE, 1)).unwrap();
    handle
        .notify(SessionEvent::ConfigurationReceived(json!({ "x": 1 })))
        .unwrap();
    handle.settled().await.unwrap();
    tokio::task::yield_now().await;
    assert!(!hover.is_finished());

    handle.notify(announce_root(ROOT)).unwrap();
    let response = hover.await.unwrap().unwrap();
    let contents = response["contents"]["value"].as_str().unwrap();
    assert!(contents.contains("Engines::Engine"), "got {contents}");
}

#[tokio::test]
async fn test_parked_requests_share_one_progress_token() {
    let (session, client) = new_session();
    let (handle, _task) = session.spawn();

    let mut requests = Vec::new();
    for capability in [Capability::Hover, Capability::Definition, Capability::Completion] {
        let requester = handle.clone();
        requests.push(tokio::spawn(async move {
            requester
                .request(&capability, position(VEHICLE_URI, 2, 24), CancellationToken::new())
                .await
        }));
    }
    tokio::task::yield_now().await;

    handle.notify(open(VEHICLE_URI, VEHICLE, 1)).unwrap();
    handle.notify(open(ENGINE_URI, ENGINE, 1)).unwrap();
    handle.notify(announce_root(ROOT)).unwrap();
    for request in requests {
        assert!(request.await.unwrap().is_ok());
    }

    let request_tokens: Vec<_> = client
        .progress()
        .iter()
        .map(|event| event.token().clone())
        .filter(|token| token.as_str().starts_with("request-"))
        .collect();
    assert_eq!(request_tokens.len(), 5); // begin, three reports, end
    assert!(request_tokens.iter().all(|token| *token == request_tokens[0]));
}

#[tokio::test]
async fn test_cancelled_parked_request() {
    let (session, _) = new_session();
    let (handle, _task) = session.spawn();

    let cancel = CancellationToken::new();
    let requester = handle.clone();
    let token = cancel.clone();
    let request = tokio::spawn(async move {
        requester
            .request(&Capability::DocumentSymbol, json!({ "textDocument": { "uri": VEHICLE_URI } }), token)
            .await
    });
    tokio::task::yield_now().await;

    cancel.cancel();
    assert_eq!(request.await.unwrap(), Err(RequestError::Cancelled));

    handle.notify(announce_root(ROOT)).unwrap();
    handle.settled().await.unwrap();
    let symbols = handle
        .request(
            &Capability::DocumentSymbol,
            json!({ "textDocument": { "uri": VEHICLE_URI } }),
            CancellationToken::new(),
        )
        .await;
    // Unknown document: the handler fails and the answer is null.
    assert_eq!(symbols, Ok(Value::Null));
}

// =============================================================================
// READY STATE
// =============================================================================

#[tokio::test]
async fn test_requests_follow_latest_model() {
    let (session, _) = new_session();
    let (handle, _task) = session.spawn();
    handle.notify(announce_root(ROOT)).unwrap();
    handle.notify(open(VEHICLE_URI, VEHICLE, 1)).unwrap();
    handle.notify(open(ENGINE_URI, ENGINE, 1)).unwrap();
    handle.settled().await.unwrap();

    let definition = handle
        .request(&Capability::Definition, position(VEHICLE_URI, 2, 24), CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(definition[0]["uri"], ENGINE_URI);

    handle.notify(close(ENGINE_URI)).unwrap();
    handle.settled().await.unwrap();
    let definition = handle
        .request(&Capability::Definition, position(VEHICLE_URI, 2, 24), CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(definition, json!([]));
}

#[tokio::test]
async fn test_formatting_uses_latest_configuration() {
    let (session, _) = new_session();
    let (handle, _task) = session.spawn();
    handle.notify(announce_root(ROOT)).unwrap();
    handle
        .notify(open(VEHICLE_URI, "package P {\npart def A;\n}\n", 1))
        .unwrap();
    handle
        .notify(SessionEvent::ConfigurationReceived(json!([{ "formatting": { "tabSize": 2 } }])))
        .unwrap();
    handle.settled().await.unwrap();

    let edits = handle
        .request_method(
            "textDocument/formatting",
            json!({
                "textDocument": { "uri": VEHICLE_URI },
                "options": { "tabSize": 8, "insertSpaces": true }
            }),
            CancellationToken::new(),
        )
        .await
        .unwrap();
    assert_eq!(edits[0]["newText"], "package P {\n  part def A;\n}\n");
}

#[tokio::test]
async fn test_handler_failures_answer_null() {
    let (mut session, _) = new_session();
    session.register(
        Capability::Custom("syster/explode".into()),
        Arc::new(|_: &Value, _: &Context, _: &CancellationToken| -> Result<Value, HandlerError> {
            panic!("handler exploded")
        }),
    );
    session.handle(announce_root(ROOT)).unwrap();
    let (handle, _task) = session.spawn();

    let exploded = handle
        .request_method("syster/explode", json!({}), CancellationToken::new())
        .await;
    assert_eq!(exploded, Ok(Value::Null));

    let malformed = handle
        .request(&Capability::Hover, json!({ "nonsense": true }), CancellationToken::new())
        .await;
    assert_eq!(malformed, Ok(Value::Null));

    let unknown = handle
        .request_method("syster/unknown", json!({}), CancellationToken::new())
        .await;
    assert!(matches!(unknown, Err(RequestError::UnknownCapability(_))));

    // The session keeps working.
    handle.notify(open(VEHICLE_URI, VEHICLE, 1)).unwrap();
    handle.settled().await.unwrap();
    let symbols = handle
        .request(
            &Capability::DocumentSymbol,
            json!({ "textDocument": { "uri": VEHICLE_URI } }),
            CancellationToken::new(),
        )
        .await
        .unwrap();
    assert!(!symbols.as_array().unwrap().is_empty());
}

// =============================================================================
// SNAPSHOTS
// =============================================================================

#[tokio::test]
async fn test_repeated_requests_without_rebuild_are_identical() {
    let (session, _) = new_session();
    let (handle, _task) = session.spawn();
    handle.notify(open(VEHICLE_URI, VEHICLE, 1)).unwrap();
    handle.notify(open(ENGINE_URI, ENGINE, 1)).unwrap();
    handle.notify(announce_root(ROOT)).unwrap();
    handle.settled().await.unwrap();

    for capability in [Capability::Hover, Capability::Completion] {
        let first = handle
            .request(&capability, position(VEHICLE_URI, 2, 24), CancellationToken::new())
            .await
            .unwrap();
        let second = handle
            .request(&capability, position(VEHICLE_URI, 2, 24), CancellationToken::new())
            .await
            .unwrap();
        assert!(!first.is_null(), "{capability}");
        assert_eq!(first, second, "{capability}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_request_keeps_its_snapshot_across_rebuilds() {
    let (started_tx, started_rx) = mpsc::channel::<()>();
    let (resume_tx, resume_rx) = mpsc::channel::<()>();
    let started_tx = Mutex::new(started_tx);
    let resume_rx = Mutex::new(resume_rx);

    let (session, _) = new_session();
    session.register(
        Capability::Custom("syster/snapshot".into()),
        Arc::new(move |_: &Value, ctx: &Context, _: &CancellationToken| -> Result<Value, HandlerError> {
            let before = (ctx.model.generation(), ctx.config.extra.get("x").cloned());
            started_tx.lock().send(()).unwrap();
            resume_rx
                .lock()
                .recv_timeout(Duration::from_secs(10))
                .unwrap();
            let after = (ctx.model.generation(), ctx.config.extra.get("x").cloned());
            Ok(json!({ "before": before, "after": after }))
        }),
    );
    let (handle, _task) = session.spawn();
    handle
        .notify(SessionEvent::ConfigurationReceived(json!({ "x": 1 })))
        .unwrap();
    handle.notify(announce_root(ROOT)).unwrap();
    handle.settled().await.unwrap();

    let requester = handle.clone();
    let request = tokio::spawn(async move {
        requester
            .request_method("syster/snapshot", json!({}), CancellationToken::new())
            .await
    });
    tokio::task::spawn_blocking(move || started_rx.recv_timeout(Duration::from_secs(10)))
        .await
        .unwrap()
        .unwrap();

    // A rebuild and a configuration change land while the handler runs.
    handle.notify(open(VEHICLE_URI, VEHICLE, 1)).unwrap();
    handle
        .notify(SessionEvent::ConfigurationReceived(json!({ "x": 2 })))
        .unwrap();
    handle.settled().await.unwrap();
    resume_tx.send(()).unwrap();

    let response = request.await.unwrap().unwrap();
    assert_eq!(response["before"], json!([1, 1]));
    assert_eq!(response["after"], json!([1, 1]));
}
