use skylark_rs::app::{Action, AppStore, Outcome};
use skylark_rs::error::Error;
use skylark_rs::models::{
    MetadataPatch, SessionStatus, SessionType, SightingDraft, SyncStatus,
};
use skylark_rs::views;

/// # Session Lifecycle Tests
///
/// End-to-end coverage of the session aggregate through the application
/// state store:
/// - **Recording**: every append is its own event, totals recomputed from
///   the log
/// - **Round trips**: append followed by remove restores the previous log
/// - **State machine**: finish/resume transitions and what they touch
/// - **Gating**: completed sessions reject sighting mutations but accept
///   metadata edits
/// - **Import**: rejected documents leave the session collection unchanged
///
/// All tests run against an in-memory database; no environment is required.

fn start_session(app: &mut AppStore) -> String {
    let outcome = app
        .dispatch(Action::CreateSession {
            session_type: SessionType::Counting,
            name: "Seawatch".to_string(),
            location: "Point lighthouse".to_string(),
            date: "2025-10-18".to_string(),
            start_time: "06:30".to_string(),
            observers: "RV, LB".to_string(),
            latitude: Some(52.1),
            longitude: Some(4.2),
        })
        .expect("session creation should succeed");
    match outcome {
        Outcome::SessionCreated(id) => id,
        other => panic!("expected SessionCreated, got {:?}", other),
    }
}

fn record(app: &mut AppStore, session_id: &str, species_id: &str, count: i64) -> String {
    let outcome = app
        .dispatch(Action::RecordSighting {
            session_id: session_id.to_string(),
            draft: SightingDraft {
                species_id: species_id.to_string(),
                count,
                ..SightingDraft::default()
            },
        })
        .expect("recording should succeed");
    match outcome {
        Outcome::SightingRecorded(sighting) => sighting.id,
        other => panic!("expected SightingRecorded, got {:?}", other),
    }
}

#[test]
fn totals_equal_sum_of_appended_counts_in_any_order() {
    let mut app = AppStore::open_in_memory().unwrap();
    let id = start_session(&mut app);

    // Interleaved appends across species; totals must be order-independent.
    for (species, count) in [
        ("skylark", 3),
        ("wren", 1),
        ("skylark", 2),
        ("meadow-pipit", 7),
        ("skylark", 1),
    ] {
        record(&mut app, &id, species, count);
    }

    let session = app.session(&id).unwrap();
    assert_eq!(views::count_for_species(session, "skylark"), 6);
    assert_eq!(views::count_for_species(session, "wren"), 1);
    assert_eq!(views::count_for_species(session, "meadow-pipit"), 7);

    let summary = views::report_summary(session, &app.settings().species);
    assert_eq!(summary.total_birds, 14);
    assert_eq!(summary.unique_species, 3);
}

#[test]
fn append_then_remove_restores_previous_log() {
    let mut app = AppStore::open_in_memory().unwrap();
    let id = start_session(&mut app);
    record(&mut app, &id, "skylark", 3);

    let before = app.session(&id).unwrap().sightings.clone();

    let new_id = record(&mut app, &id, "wren", 1);
    let outcome = app
        .dispatch(Action::RemoveSighting {
            session_id: id.clone(),
            sighting_id: new_id,
        })
        .unwrap();
    assert!(matches!(outcome, Outcome::SightingRemoved(true)));

    assert_eq!(app.session(&id).unwrap().sightings, before);
}

#[test]
fn finish_then_resume_touches_only_status_and_end_time() {
    let mut app = AppStore::open_in_memory().unwrap();
    let id = start_session(&mut app);
    record(&mut app, &id, "skylark", 5);

    let before = app.session(&id).unwrap().clone();

    app.dispatch(Action::FinishSession {
        session_id: id.clone(),
    })
    .unwrap();
    {
        let finished = app.session(&id).unwrap();
        assert_eq!(finished.status, SessionStatus::Completed);
        assert!(finished.end_time.is_some());
    }

    app.dispatch(Action::ResumeSession {
        session_id: id.clone(),
    })
    .unwrap();
    let resumed = app.session(&id).unwrap();

    assert_eq!(resumed.status, SessionStatus::Active);
    // Chosen policy: resume clears the end time.
    assert!(resumed.end_time.is_none());
    assert_eq!(resumed.sightings, before.sightings);
    assert_eq!(resumed.name, before.name);
    assert_eq!(resumed.observers, before.observers);
    assert_eq!(resumed.sync_status, before.sync_status);
    assert_eq!(resumed.sync_status, SyncStatus::Unsynced);
}

#[test]
fn completed_session_rejects_sighting_mutations_unchanged() {
    let mut app = AppStore::open_in_memory().unwrap();
    let id = start_session(&mut app);
    let sighting_id = record(&mut app, &id, "skylark", 2);

    app.dispatch(Action::FinishSession {
        session_id: id.clone(),
    })
    .unwrap();
    let before = app.session(&id).unwrap().sightings.clone();

    let append = app.dispatch(Action::RecordSighting {
        session_id: id.clone(),
        draft: SightingDraft {
            species_id: "wren".to_string(),
            count: 1,
            ..SightingDraft::default()
        },
    });
    assert!(matches!(append, Err(Error::StateConflict(_))));

    let remove = app.dispatch(Action::RemoveSighting {
        session_id: id.clone(),
        sighting_id,
    });
    assert!(matches!(remove, Err(Error::StateConflict(_))));

    assert_eq!(app.session(&id).unwrap().sightings, before);
}

#[test]
fn metadata_edits_are_allowed_on_completed_sessions() {
    let mut app = AppStore::open_in_memory().unwrap();
    let id = start_session(&mut app);
    app.dispatch(Action::FinishSession {
        session_id: id.clone(),
    })
    .unwrap();

    app.dispatch(Action::UpdateMetadata {
        session_id: id.clone(),
        patch: MetadataPatch {
            notes: Some("fog lifted around eight".to_string()),
            ..MetadataPatch::default()
        },
    })
    .unwrap();

    let session = app.session(&id).unwrap();
    assert_eq!(session.status, SessionStatus::Completed);
    assert_eq!(session.notes, "fog lifted around eight");
}

#[test]
fn rejected_import_leaves_collection_unchanged() {
    let mut app = AppStore::open_in_memory().unwrap();
    let id = start_session(&mut app);
    record(&mut app, &id, "skylark", 2);

    let before: Vec<_> = app.sessions().to_vec();

    let result = app.dispatch(Action::ImportSession {
        document: r#"{"id": "doc-1", "name": "No sightings here"}"#.to_string(),
    });
    assert!(matches!(result, Err(Error::Import(_))));

    assert_eq!(app.sessions(), before.as_slice());
}

#[test]
fn accepted_import_becomes_a_fresh_unsynced_session() {
    let mut app = AppStore::open_in_memory().unwrap();

    let outcome = app
        .dispatch(Action::ImportSession {
            document: r#"{
                "id": "doc-1",
                "name": "Shared trip",
                "sightings": [
                    {"id": "s1", "species_id": "robin", "timestamp": "2025-05-05T07:00:00+00:00", "count": 4}
                ],
                "sync_status": "synced",
                "remote_id": 41
            }"#
            .to_string(),
        })
        .unwrap();
    let Outcome::SessionImported(id) = outcome else {
        panic!("expected SessionImported");
    };

    let imported = app.session(&id).unwrap();
    assert_ne!(imported.id, "doc-1");
    assert_eq!(imported.name, "Shared trip (Imported)");
    assert_eq!(imported.sync_status, SyncStatus::Unsynced);
    assert_eq!(imported.remote_id, None);
    assert_eq!(imported.sightings.len(), 1);
}
