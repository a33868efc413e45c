//! Root resolution, deferred replay, rebuilds and configuration.

use serde_json::json;
use syster_session::SessionOptions;
use syster_session::server::{SessionError, SessionEvent};

use crate::helpers::session_helpers::*;
use crate::helpers::source_fixtures::*;

// =============================================================================
// DEFERRED REPLAY
// =============================================================================

fn edit_sequence() -> Vec<SessionEvent> {
    vec![
        open(VEHICLE_URI, "package Vehicles {}", 1),
        open(ENGINE_URI, ENGINE, 1),
        change(VEHICLE_URI, VEHICLE, 2),
        open(OUTSIDE_URI, "part def Scratch;", 1),
        close(ENGINE_URI),
        open(ENGINE_URI, ENGINE, 3),
    ]
}

#[test]
fn test_replayed_queue_matches_live_processing() {
    let (mut live, _) = new_session();
    live.handle(announce_root(ROOT)).unwrap();
    for event in edit_sequence() {
        live.handle(event).unwrap();
    }

    let (mut deferred, _) = new_session();
    for event in edit_sequence() {
        deferred.handle(event).unwrap();
    }
    assert_eq!(deferred.deferred_len(), 6);
    assert!(deferred.model().is_none());
    deferred.handle(announce_root(ROOT)).unwrap();

    let live = live.model().unwrap();
    let replayed = deferred.model().unwrap();
    assert!(live.same_content(&replayed));
    assert_eq!(replayed.len(), 2);
    assert_eq!(replayed.document(ENGINE_URI).unwrap().version, 3);
}

#[test]
fn test_root_as_file_uri() {
    let (mut session, _) = new_session();
    session.handle(open(VEHICLE_URI, VEHICLE, 1)).unwrap();
    session.handle(announce_root("file:///proj")).unwrap();

    let model = session.model().unwrap();
    assert!(model.contains(VEHICLE_URI));
}

#[test]
fn test_duplicate_root_keeps_first() {
    let (mut session, _) = new_session();
    session.handle(announce_root(ROOT)).unwrap();
    session.handle(open(VEHICLE_URI, VEHICLE, 1)).unwrap();

    let error = session.handle(announce_root("/other")).unwrap_err();
    assert!(matches!(error, SessionError::DuplicateRootAnnouncement { .. }));

    // Still serving the first root.
    session.handle(open(ENGINE_URI, ENGINE, 1)).unwrap();
    let model = session.model().unwrap();
    assert!(model.contains(VEHICLE_URI));
    assert!(model.contains(ENGINE_URI));
}

// =============================================================================
// REBUILDS
// =============================================================================

#[test]
fn test_each_in_root_edit_rebuilds() {
    let (mut session, _) = new_session();
    session.handle(announce_root(ROOT)).unwrap();
    session.handle(open(VEHICLE_URI, VEHICLE, 1)).unwrap();
    session.handle(change(VEHICLE_URI, ENGINE, 2)).unwrap();

    let model = session.model().unwrap();
    assert_eq!(model.generation(), 3);
    assert!(model.lookup_qualified("Engines::Engine").is_some());
    assert!(model.lookup_qualified("Vehicles::Vehicle").is_none());
}

#[test]
fn test_close_removes_document_from_model() {
    let (mut session, _) = new_session();
    session.handle(announce_root(ROOT)).unwrap();
    session.handle(open(VEHICLE_URI, VEHICLE, 1)).unwrap();
    session.handle(close(VEHICLE_URI)).unwrap();

    assert!(session.model().unwrap().is_empty());
    assert!(session.buffers().is_empty());
}

#[test]
fn test_library_symbols_visible_in_model() {
    let library = tempfile::tempdir().unwrap();
    std::fs::create_dir(library.path().join("nested")).unwrap();
    std::fs::write(
        library.path().join("nested").join("quantities.sysml"),
        "package Quantities { attribute def Mass; }",
    )
    .unwrap();
    std::fs::write(library.path().join("notes.txt"), "not a model file").unwrap();

    let (mut session, _) = new_session_with(
        SessionOptions::default().with_library_path(library.path().to_path_buf()),
    );
    session.handle(announce_root(ROOT)).unwrap();

    let model = session.model().unwrap();
    assert_eq!(model.library().len(), 1);
    assert!(model.lookup_qualified("Quantities::Mass").is_some());
}

// =============================================================================
// CONFIGURATION
// =============================================================================

#[test]
fn test_two_configuration_changes_two_emissions_no_rebuild() {
    let (mut session, client) = new_session();
    session.handle(announce_root(ROOT)).unwrap();
    session.handle(open(VEHICLE_URI, VEHICLE, 1)).unwrap();
    let model = session.model().unwrap();
    let emissions = session.context_emissions();

    session.handle(SessionEvent::ConfigurationChanged).unwrap();
    session
        .handle(SessionEvent::ConfigurationReceived(json!([{ "x": 1 }])))
        .unwrap();
    session.handle(SessionEvent::ConfigurationChanged).unwrap();
    session
        .handle(SessionEvent::ConfigurationReceived(json!([{ "x": 2 }])))
        .unwrap();

    assert_eq!(client.configuration_requests(), 2);
    assert_eq!(session.context_emissions(), emissions + 2);
    assert!(std::sync::Arc::ptr_eq(&model, &session.model().unwrap()));
    assert_eq!(session.configuration().extra.get("x"), Some(&json!(2)));
}

#[test]
fn test_rebind_after_many_configurations_uses_last() {
    let (mut session, _) = new_session();
    session.handle(announce_root(ROOT)).unwrap();

    for x in 1..=5 {
        session
            .handle(SessionEvent::ConfigurationReceived(json!({ "x": x })))
            .unwrap();
    }
    session.handle(open(VEHICLE_URI, VEHICLE, 1)).unwrap();

    let bound = session.coordinator().bound_context().unwrap();
    assert_eq!(bound.config.extra.get("x"), Some(&json!(5)));
    assert_eq!(bound.model.generation(), 2);
}
