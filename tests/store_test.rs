use tempfile::TempDir;

use skylark_rs::models::{
    Session, SessionType, Settings, SightingDraft, Species, Theme, UserAccount,
};
use skylark_rs::store::FieldStore;

/// # Store Persistence Tests
///
/// Everything the app persists must survive a close/reopen of the database:
/// sessions with their sighting logs, settings, stored credentials, the
/// location history and the last-active marker. Databases live in a tempdir
/// and are reopened within each test.

fn sample_session() -> Session {
    let settings = Settings::default();
    let mut session = Session::new(
        SessionType::Trip,
        "Estuary loop".to_string(),
        "Mud flats west".to_string(),
        "2025-09-02".to_string(),
        "08:15".to_string(),
        "AN".to_string(),
    );
    session
        .append_sighting(
            SightingDraft {
                species_id: "lapwing".to_string(),
                count: 40,
                count_type: Some("estimate".to_string()),
                ..SightingDraft::default()
            },
            &settings,
        )
        .unwrap();
    session
}

#[test]
fn sessions_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("skylark.db");
    let session = sample_session();

    {
        let store = FieldStore::open(&db_path).unwrap();
        store.save_session(&session).unwrap();
    }

    let store = FieldStore::open(&db_path).unwrap();
    let loaded = store.get_session(&session.id).unwrap().unwrap();
    assert_eq!(loaded, session);
    assert_eq!(loaded.sightings.len(), 1);
    assert_eq!(loaded.sightings[0].count_type.as_deref(), Some("estimate"));
}

#[test]
fn list_sessions_orders_most_recent_first() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("skylark.db");
    let store = FieldStore::open(&db_path).unwrap();

    let mut first = sample_session();
    first.inserted_at = "2025-09-01T06:00:00+00:00".to_string();
    let mut second = sample_session();
    second.inserted_at = "2025-09-03T06:00:00+00:00".to_string();
    store.save_session(&first).unwrap();
    store.save_session(&second).unwrap();

    let listed = store.list_sessions().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, second.id);
    assert_eq!(listed[1].id, first.id);
}

#[test]
fn save_session_replaces_the_whole_record() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("skylark.db");
    let store = FieldStore::open(&db_path).unwrap();

    let mut session = sample_session();
    store.save_session(&session).unwrap();

    session.sightings.clear();
    session.notes = "log cleared after review".to_string();
    store.save_session(&session).unwrap();

    let loaded = store.get_session(&session.id).unwrap().unwrap();
    assert!(loaded.sightings.is_empty());
    assert_eq!(loaded.notes, "log cleared after review");
}

#[test]
fn settings_and_catalogue_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("skylark.db");

    {
        let store = FieldStore::open(&db_path).unwrap();
        let mut settings = store.load_settings().unwrap();
        settings.theme = Theme::Dark;
        settings
            .species
            .push(Species::new("hoopoe", "Eurasian Hoopoe", "HP", Some("Upupidae")));
        store.save_settings(&settings).unwrap();
    }

    let store = FieldStore::open(&db_path).unwrap();
    let settings = store.load_settings().unwrap();
    assert_eq!(settings.theme, Theme::Dark);
    assert!(settings.species.iter().any(|s| s.id == "hoopoe"));
}

#[test]
fn credentials_roundtrip_and_clear() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("skylark.db");
    let store = FieldStore::open(&db_path).unwrap();

    assert!(store.load_user().unwrap().is_none());

    let account = UserAccount {
        website_url: "https://example.org".to_string(),
        username: "warden".to_string(),
        app_password: "abcd efgh".to_string(),
    };
    store.save_user(&account).unwrap();
    assert_eq!(store.load_user().unwrap().unwrap(), account);

    store.clear_user().unwrap();
    assert!(store.load_user().unwrap().is_none());
}

#[test]
fn location_history_and_marker_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("skylark.db");

    {
        let store = FieldStore::open(&db_path).unwrap();
        store.push_location("Mud flats west").unwrap();
        store.push_location("Point lighthouse").unwrap();
        store.set_last_active(Some("session-1")).unwrap();
    }

    let store = FieldStore::open(&db_path).unwrap();
    assert_eq!(
        store.location_history().unwrap(),
        vec!["Point lighthouse".to_string(), "Mud flats west".to_string()]
    );
    assert_eq!(store.last_active().unwrap().as_deref(), Some("session-1"));
}
