//! Diagnostics publishing and stale diagnostic erasure.

use std::time::Duration;

use syster_session::SessionOptions;
use syster_session::config::ErasePolicy;

use crate::helpers::session_helpers::*;
use crate::helpers::source_fixtures::*;

#[test]
fn test_invalid_buffer_before_root_published_once() {
    let (mut session, client) = new_session();
    session.handle(open("file:///proj/foo.src", UNCLOSED, 1)).unwrap();
    assert!(client.diagnostics().is_empty());

    session.handle(announce_root(ROOT)).unwrap();
    let model = session.model().unwrap();
    assert_eq!(model.len(), 1);
    assert!(model.document("file:///proj/foo.src").unwrap().has_errors());

    let published = client.diagnostics_for("file:///proj/foo.src");
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].version, Some(1));
    assert!(!published[0].diagnostics.is_empty());
}

#[test]
fn test_every_rebuild_revalidates_all_documents() {
    let (mut session, client) = new_session();
    session.handle(announce_root(ROOT)).unwrap();
    session.handle(open(VEHICLE_URI, VEHICLE, 1)).unwrap();
    session.handle(open(ENGINE_URI, ENGINE, 1)).unwrap();
    client.clear_diagnostics();

    session.handle(change(ENGINE_URI, UNCLOSED, 2)).unwrap();
    let published = client.diagnostics();
    assert_eq!(published.len(), 2);
    assert!(published.iter().any(|p| p.uri == VEHICLE_URI && p.diagnostics.is_empty()));
    assert!(published.iter().any(|p| p.uri == ENGINE_URI && !p.diagnostics.is_empty()));
}

#[test]
fn test_closed_document_diagnostics_cleared() {
    let (mut session, client) = new_session();
    session.handle(announce_root(ROOT)).unwrap();
    session.handle(open(ENGINE_URI, UNCLOSED, 1)).unwrap();
    client.clear_diagnostics();

    session.handle(close(ENGINE_URI)).unwrap();
    let published = client.diagnostics_for(ENGINE_URI);
    assert_eq!(published.len(), 1);
    assert!(published[0].diagnostics.is_empty());
}

#[test]
fn test_outside_root_never_published() {
    let (mut session, client) = new_session();
    session.handle(announce_root(ROOT)).unwrap();
    session.handle(open(OUTSIDE_URI, UNCLOSED, 1)).unwrap();
    assert!(client.diagnostics_for(OUTSIDE_URI).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_removed_files_erased_after_settle_delay() {
    let options = SessionOptions::default().with_settle_delay(Duration::from_millis(500));
    let (session, client) = new_session_with(options);
    let (handle, _task) = session.spawn();

    handle.notify(announce_root(ROOT)).unwrap();
    handle.notify(open(ENGINE_URI, UNCLOSED, 1)).unwrap();
    handle.settled().await.unwrap();
    client.clear_diagnostics();

    handle
        .notify(files_removed(&["file:///proj/old.sysml", "file:///proj/renamed.sysml"]))
        .unwrap();
    handle.settled().await.unwrap();

    // The surviving buffer is revalidated against its current text.
    let surviving = client.diagnostics_for(ENGINE_URI);
    assert_eq!(surviving.len(), 1);
    assert_eq!(surviving[0].version, Some(1));
    assert_eq!(surviving[0].diagnostics.len(), 1);
    assert_eq!(surviving[0].diagnostics[0].code, "S002");

    tokio::time::sleep(Duration::from_millis(499)).await;
    assert!(client.diagnostics_for("file:///proj/old.sysml").is_empty());
    assert!(client.diagnostics_for("file:///proj/renamed.sysml").is_empty());

    tokio::time::sleep(Duration::from_millis(2)).await;
    for uri in ["file:///proj/old.sysml", "file:///proj/renamed.sysml"] {
        let published = client.diagnostics_for(uri);
        assert_eq!(published.len(), 1, "{uri}");
        assert!(published[0].diagnostics.is_empty());
    }
    // The erase leaves the surviving buffer alone.
    assert_eq!(client.diagnostics_for(ENGINE_URI), surviving);
}

#[tokio::test(start_paused = true)]
async fn test_reopened_file_kept_when_skipping_live_documents() {
    let options = SessionOptions::default()
        .with_settle_delay(Duration::from_millis(500))
        .with_erase_policy(ErasePolicy::SkipLiveDocuments);
    let (session, client) = new_session_with(options);
    let (handle, _task) = session.spawn();

    handle.notify(announce_root(ROOT)).unwrap();
    handle.settled().await.unwrap();
    handle
        .notify(files_removed(&[ENGINE_URI, "file:///proj/gone.sysml"]))
        .unwrap();
    handle.notify(open(ENGINE_URI, UNCLOSED, 1)).unwrap();
    handle.settled().await.unwrap();
    client.clear_diagnostics();

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert!(client.diagnostics_for(ENGINE_URI).is_empty());
    assert_eq!(client.diagnostics_for("file:///proj/gone.sysml").len(), 1);
}
