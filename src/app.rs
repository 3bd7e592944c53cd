//! Application state store. All user actions funnel through `dispatch`,
//! which runs the matching reducer against in-memory state and then invokes
//! the persistence adapter for exactly the records the action touched.

use std::path::Path;

use tracing::{debug, warn};

use crate::client::{CmsClient, SyncResponseStatus};
use crate::error::{Error, Result};
use crate::import;
use crate::models::{
    MetadataPatch, Session, SessionType, Settings, Sighting, SightingDraft, SightingPatch, Species,
    Syncable, SyncStatus, UserAccount,
};
use crate::store::FieldStore;

/// One user-initiated state change.
#[derive(Debug, Clone)]
pub enum Action {
    CreateSession {
        session_type: SessionType,
        name: String,
        location: String,
        date: String,
        start_time: String,
        observers: String,
        latitude: Option<f64>,
        longitude: Option<f64>,
    },
    RecordSighting {
        session_id: String,
        draft: SightingDraft,
    },
    EditSighting {
        session_id: String,
        sighting_id: String,
        patch: SightingPatch,
    },
    RemoveSighting {
        session_id: String,
        sighting_id: String,
    },
    FinishSession {
        session_id: String,
    },
    ResumeSession {
        session_id: String,
    },
    UpdateMetadata {
        session_id: String,
        patch: MetadataPatch,
    },
    DeleteSession {
        session_id: String,
    },
    ImportSession {
        document: String,
    },
    /// Result of a geolocation request, applied by id so a stale fix for a
    /// session that no longer exists is dropped.
    ApplyLocation {
        session_id: String,
        latitude: f64,
        longitude: f64,
    },
    UpdateSettings(Settings),
    AddSpecies(Species),
    SetUser(UserAccount),
    ClearUser,
    /// Clean close of the currently open session.
    CloseSession,
}

/// What a committed action produced.
#[derive(Debug, Clone)]
pub enum Outcome {
    SessionCreated(String),
    SightingRecorded(Sighting),
    SightingEdited(bool),
    SightingRemoved(bool),
    SessionChanged,
    SessionDeleted(bool),
    SessionImported(String),
    LocationApplied(bool),
    SettingsUpdated,
    UserUpdated,
    Closed,
}

pub struct AppStore {
    store: FieldStore,
    sessions: Vec<Session>,
    settings: Settings,
    user: Option<UserAccount>,
    location_history: Vec<String>,
    last_active: Option<String>,
}

impl AppStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load(FieldStore::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::load(FieldStore::open_in_memory()?)
    }

    fn load(store: FieldStore) -> Result<Self> {
        let sessions = store.list_sessions()?;
        let settings = store.load_settings()?;
        let user = store.load_user()?;
        let location_history = store.location_history()?;
        let last_active = store.last_active()?;
        Ok(Self {
            store,
            sessions,
            settings,
            user,
            location_history,
            last_active,
        })
    }

    // ===== ACCESSORS =====

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn session(&self, session_id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == session_id)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn user(&self) -> Option<&UserAccount> {
        self.user.as_ref()
    }

    pub fn location_history(&self) -> &[String] {
        &self.location_history
    }

    /// Id of the session that was open when the app last ran, if any; used
    /// to offer restore-after-crash.
    pub fn last_active(&self) -> Option<&str> {
        self.last_active.as_deref()
    }

    fn session_mut(&mut self, session_id: &str) -> Result<&mut Session> {
        self.sessions
            .iter_mut()
            .find(|s| s.id == session_id)
            .ok_or_else(|| Error::SessionNotFound(session_id.to_string()))
    }

    // ===== DISPATCH =====

    pub fn dispatch(&mut self, action: Action) -> Result<Outcome> {
        match action {
            Action::CreateSession {
                session_type,
                name,
                location,
                date,
                start_time,
                observers,
                latitude,
                longitude,
            } => {
                let mut session =
                    Session::new(session_type, name, location, date, start_time, observers);
                if let (Some(lat), Some(lon)) = (latitude, longitude) {
                    session = session.with_coordinates(lat, lon);
                }
                session.validate()?;

                self.store.save_session(&session)?;
                self.store.push_location(&session.location)?;
                self.store.set_last_active(Some(&session.id))?;
                self.location_history = self.store.location_history()?;
                self.last_active = Some(session.id.clone());

                let id = session.id.clone();
                self.sessions.insert(0, session);
                Ok(Outcome::SessionCreated(id))
            }

            Action::RecordSighting { session_id, draft } => {
                let settings = self.settings.clone();
                let session = self.session_mut(&session_id)?;
                let sighting = session.append_sighting(draft, &settings)?;
                let snapshot = session.clone();
                self.store.save_session(&snapshot)?;
                Ok(Outcome::SightingRecorded(sighting))
            }

            Action::EditSighting {
                session_id,
                sighting_id,
                patch,
            } => {
                let settings = self.settings.clone();
                let session = self.session_mut(&session_id)?;
                let edited = session.edit_sighting(&sighting_id, patch, &settings)?;
                let snapshot = session.clone();
                self.store.save_session(&snapshot)?;
                Ok(Outcome::SightingEdited(edited))
            }

            Action::RemoveSighting {
                session_id,
                sighting_id,
            } => {
                let session = self.session_mut(&session_id)?;
                let removed = session.remove_sighting(&sighting_id)?;
                let snapshot = session.clone();
                self.store.save_session(&snapshot)?;
                Ok(Outcome::SightingRemoved(removed))
            }

            Action::FinishSession { session_id } => {
                let session = self.session_mut(&session_id)?;
                session.finish()?;
                let snapshot = session.clone();
                self.store.save_session(&snapshot)?;
                Ok(Outcome::SessionChanged)
            }

            Action::ResumeSession { session_id } => {
                let session = self.session_mut(&session_id)?;
                session.resume()?;
                let snapshot = session.clone();
                self.store.save_session(&snapshot)?;
                Ok(Outcome::SessionChanged)
            }

            Action::UpdateMetadata { session_id, patch } => {
                let session = self.session_mut(&session_id)?;
                session.update_metadata(patch)?;
                let snapshot = session.clone();
                self.store.save_session(&snapshot)?;
                self.store.push_location(&snapshot.location)?;
                self.location_history = self.store.location_history()?;
                Ok(Outcome::SessionChanged)
            }

            Action::DeleteSession { session_id } => {
                let existed = self.store.delete_session(&session_id)?;
                self.sessions.retain(|s| s.id != session_id);
                if self.last_active.as_deref() == Some(session_id.as_str()) {
                    self.store.set_last_active(None)?;
                    self.last_active = None;
                }
                Ok(Outcome::SessionDeleted(existed))
            }

            Action::ImportSession { document } => {
                let session = import::import_session(&document)?;
                self.store.save_session(&session)?;
                let id = session.id.clone();
                self.sessions.insert(0, session);
                Ok(Outcome::SessionImported(id))
            }

            Action::ApplyLocation {
                session_id,
                latitude,
                longitude,
            } => {
                let Some(session) = self.sessions.iter_mut().find(|s| s.id == session_id) else {
                    debug!("Dropping stale location fix for session {}", session_id);
                    return Ok(Outcome::LocationApplied(false));
                };
                session.latitude = Some(latitude);
                session.longitude = Some(longitude);
                let snapshot = session.clone();
                self.store.save_session(&snapshot)?;
                Ok(Outcome::LocationApplied(true))
            }

            Action::UpdateSettings(settings) => {
                self.store.save_settings(&settings)?;
                self.settings = settings;
                Ok(Outcome::SettingsUpdated)
            }

            Action::AddSpecies(species) => {
                if species.id.trim().is_empty() || species.name.trim().is_empty() {
                    return Err(Error::Validation(
                        "species id and name are required".to_string(),
                    ));
                }
                if self.settings.species.iter().any(|s| s.id == species.id) {
                    return Err(Error::Validation(format!(
                        "species '{}' already exists in the catalogue",
                        species.id
                    )));
                }
                self.settings.species.push(species);
                self.store.save_settings(&self.settings)?;
                Ok(Outcome::SettingsUpdated)
            }

            Action::SetUser(account) => {
                self.store.save_user(&account)?;
                self.user = Some(account);
                Ok(Outcome::UserUpdated)
            }

            Action::ClearUser => {
                self.store.clear_user()?;
                self.user = None;
                Ok(Outcome::UserUpdated)
            }

            Action::CloseSession => {
                self.store.set_last_active(None)?;
                self.last_active = None;
                Ok(Outcome::Closed)
            }
        }
    }

    // ===== SYNC =====

    /// Uploads one session on explicit user request. Exactly one outcome is
    /// recorded per attempt; failures become `sync_status = error` and wait
    /// for a manual re-trigger. The result is applied by id, so a session
    /// deleted while the upload was in flight is left alone.
    pub async fn sync_session(&mut self, session_id: &str, client: &CmsClient) -> Result<SyncStatus> {
        let session = self
            .session(session_id)
            .cloned()
            .ok_or_else(|| Error::SessionNotFound(session_id.to_string()))?;

        let outcome = client.upload_session(&session).await;

        let Some(stored) = self.sessions.iter_mut().find(|s| s.id == session_id) else {
            debug!("Dropping sync result for deleted session {}", session_id);
            return Err(Error::SessionNotFound(session_id.to_string()));
        };

        match outcome {
            Ok(response) if response.status == SyncResponseStatus::Success => {
                if let Some(remote) = response.data {
                    stored.set_remote_id(remote.id);
                }
                stored.sync_status = SyncStatus::Synced;
            }
            Ok(response) => {
                warn!(
                    "Sync of session {} rejected by backend: {:?}",
                    session_id, response.status
                );
                stored.sync_status = SyncStatus::Error;
            }
            Err(e) => {
                warn!("Sync of session {} failed: {}", session_id, e);
                stored.sync_status = SyncStatus::Error;
            }
        }

        let snapshot = stored.clone();
        self.store.save_session(&snapshot)?;
        Ok(snapshot.sync_status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_action(name: &str) -> Action {
        Action::CreateSession {
            session_type: SessionType::Trip,
            name: name.to_string(),
            location: "River bend".to_string(),
            date: "2025-07-12".to_string(),
            start_time: "09:00".to_string(),
            observers: "TV".to_string(),
            latitude: None,
            longitude: None,
        }
    }

    #[test]
    fn create_session_validates_before_persisting() {
        let mut app = AppStore::open_in_memory().unwrap();
        let result = app.dispatch(Action::CreateSession {
            session_type: SessionType::Trip,
            name: String::new(),
            location: "River bend".to_string(),
            date: "2025-07-12".to_string(),
            start_time: "09:00".to_string(),
            observers: String::new(),
            latitude: None,
            longitude: None,
        });
        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(app.sessions().is_empty());
    }

    #[test]
    fn create_session_marks_last_active_and_records_location() {
        let mut app = AppStore::open_in_memory().unwrap();
        let Outcome::SessionCreated(id) = app.dispatch(create_action("Dawn walk")).unwrap() else {
            panic!("expected SessionCreated");
        };
        assert_eq!(app.last_active(), Some(id.as_str()));
        assert_eq!(app.location_history().to_vec(), vec!["River bend".to_string()]);

        app.dispatch(Action::CloseSession).unwrap();
        assert!(app.last_active().is_none());
    }

    #[test]
    fn record_sighting_persists_through_store() {
        let mut app = AppStore::open_in_memory().unwrap();
        let Outcome::SessionCreated(id) = app.dispatch(create_action("Dawn walk")).unwrap() else {
            panic!("expected SessionCreated");
        };

        app.dispatch(Action::RecordSighting {
            session_id: id.clone(),
            draft: SightingDraft {
                species_id: "skylark".to_string(),
                count: 4,
                ..SightingDraft::default()
            },
        })
        .unwrap();

        let session = app.session(&id).unwrap();
        assert_eq!(session.sightings.len(), 1);
        assert_eq!(session.sightings[0].count, 4);
    }

    #[test]
    fn stale_location_fix_is_dropped() {
        let mut app = AppStore::open_in_memory().unwrap();
        let outcome = app
            .dispatch(Action::ApplyLocation {
                session_id: "gone".to_string(),
                latitude: 1.0,
                longitude: 2.0,
            })
            .unwrap();
        assert!(matches!(outcome, Outcome::LocationApplied(false)));
    }

    #[test]
    fn delete_clears_last_active_marker() {
        let mut app = AppStore::open_in_memory().unwrap();
        let Outcome::SessionCreated(id) = app.dispatch(create_action("Dawn walk")).unwrap() else {
            panic!("expected SessionCreated");
        };

        let outcome = app
            .dispatch(Action::DeleteSession {
                session_id: id.clone(),
            })
            .unwrap();
        assert!(matches!(outcome, Outcome::SessionDeleted(true)));
        assert!(app.last_active().is_none());
        assert!(app.session(&id).is_none());
    }
}
