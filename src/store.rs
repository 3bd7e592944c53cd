//! Embedded local store for sessions, settings, credentials and the small
//! app singletons. Every save rewrites the whole record for its key, so a
//! reader never observes a mix of old and new state within one document.

use std::path::Path;

use native_db::{Builder, Database, Models};
use once_cell::sync::Lazy;
use tracing::{debug, info};

use crate::error::Result;
use crate::models::{
    AppMarkerLocal, LocationHistoryLocal, Session, SessionLocal, Settings, SettingsLocal,
    UserAccount, UserAccountLocal,
};

const SETTINGS_SLOT: &str = "settings";
const USER_SLOT: &str = "user";
const LOCATION_HISTORY_SLOT: &str = "location_history";
const APP_MARKER_SLOT: &str = "app";

/// Most-recent-first location history is capped at this many distinct names.
const LOCATION_HISTORY_LIMIT: usize = 10;

static MODELS: Lazy<Models> = Lazy::new(|| {
    let mut models = Models::new();
    models
        .define::<SessionLocal>()
        .expect("session model definition");
    models
        .define::<SettingsLocal>()
        .expect("settings model definition");
    models
        .define::<UserAccountLocal>()
        .expect("user account model definition");
    models
        .define::<LocationHistoryLocal>()
        .expect("location history model definition");
    models
        .define::<AppMarkerLocal>()
        .expect("app marker model definition");
    models
});

pub struct FieldStore {
    db: Database<'static>,
}

impl FieldStore {
    /// Open or create the database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        info!("Opening field database at {}", path.display());
        let db = Builder::new().create(&MODELS, path)?;
        Ok(Self { db })
    }

    /// In-memory database, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let db = Builder::new().create_in_memory(&MODELS)?;
        Ok(Self { db })
    }

    // ===== SESSIONS =====

    /// Writes the whole session record, replacing any previous version.
    pub fn save_session(&self, session: &Session) -> Result<()> {
        let rw = self.db.rw_transaction()?;
        rw.upsert(SessionLocal::from(session.clone()))?;
        rw.commit()?;
        debug!("Saved session {}", session.id);
        Ok(())
    }

    pub fn get_session(&self, id: &str) -> Result<Option<Session>> {
        let r = self.db.r_transaction()?;
        let local: Option<SessionLocal> = r.get().primary(id.to_string())?;
        Ok(local.map(Session::from))
    }

    /// All sessions, most recently created first.
    pub fn list_sessions(&self) -> Result<Vec<Session>> {
        let r = self.db.r_transaction()?;
        let mut sessions = Vec::new();
        for local in r.scan().primary::<SessionLocal>()?.all()? {
            sessions.push(Session::from(local?));
        }
        sessions.sort_by(|a, b| b.inserted_at.cmp(&a.inserted_at));
        Ok(sessions)
    }

    /// Removes the session record entirely. Returns whether one existed.
    pub fn delete_session(&self, id: &str) -> Result<bool> {
        let rw = self.db.rw_transaction()?;
        let existing: Option<SessionLocal> = rw.get().primary(id.to_string())?;
        let Some(local) = existing else {
            return Ok(false);
        };
        rw.remove(local)?;
        rw.commit()?;
        debug!("Deleted session {}", id);
        Ok(true)
    }

    // ===== SETTINGS =====

    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        let rw = self.db.rw_transaction()?;
        rw.upsert(SettingsLocal::from_settings(
            SETTINGS_SLOT,
            settings.clone(),
        ))?;
        rw.commit()?;
        Ok(())
    }

    /// Stored settings, or the built-in defaults when none were saved yet.
    pub fn load_settings(&self) -> Result<Settings> {
        let r = self.db.r_transaction()?;
        let local: Option<SettingsLocal> = r.get().primary(SETTINGS_SLOT.to_string())?;
        Ok(local.map(Settings::from).unwrap_or_default())
    }

    // ===== USER ACCOUNT =====

    pub fn save_user(&self, account: &UserAccount) -> Result<()> {
        let rw = self.db.rw_transaction()?;
        rw.upsert(UserAccountLocal::from_account(USER_SLOT, account.clone()))?;
        rw.commit()?;
        Ok(())
    }

    pub fn load_user(&self) -> Result<Option<UserAccount>> {
        let r = self.db.r_transaction()?;
        let local: Option<UserAccountLocal> = r.get().primary(USER_SLOT.to_string())?;
        Ok(local.map(UserAccount::from))
    }

    pub fn clear_user(&self) -> Result<()> {
        let rw = self.db.rw_transaction()?;
        let existing: Option<UserAccountLocal> = rw.get().primary(USER_SLOT.to_string())?;
        if let Some(local) = existing {
            rw.remove(local)?;
            rw.commit()?;
        }
        Ok(())
    }

    // ===== LOCATION HISTORY =====

    /// Records a location name at the front of the history, deduplicated and
    /// capped at the history limit.
    pub fn push_location(&self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(());
        }
        let mut locations = self.location_history()?;
        locations.retain(|existing| existing != name);
        locations.insert(0, name.to_string());
        locations.truncate(LOCATION_HISTORY_LIMIT);

        let rw = self.db.rw_transaction()?;
        rw.upsert(LocationHistoryLocal {
            slot: LOCATION_HISTORY_SLOT.to_string(),
            locations,
        })?;
        rw.commit()?;
        Ok(())
    }

    pub fn location_history(&self) -> Result<Vec<String>> {
        let r = self.db.r_transaction()?;
        let local: Option<LocationHistoryLocal> =
            r.get().primary(LOCATION_HISTORY_SLOT.to_string())?;
        Ok(local.map(|l| l.locations).unwrap_or_default())
    }

    // ===== LAST-ACTIVE MARKER =====

    /// Marks the session currently open; `None` on clean close.
    pub fn set_last_active(&self, session_id: Option<&str>) -> Result<()> {
        let rw = self.db.rw_transaction()?;
        rw.upsert(AppMarkerLocal {
            slot: APP_MARKER_SLOT.to_string(),
            last_active_id: session_id.map(|id| id.to_string()),
        })?;
        rw.commit()?;
        Ok(())
    }

    pub fn last_active(&self) -> Result<Option<String>> {
        let r = self.db.r_transaction()?;
        let local: Option<AppMarkerLocal> = r.get().primary(APP_MARKER_SLOT.to_string())?;
        Ok(local.and_then(|m| m.last_active_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SessionType;

    fn sample_session(name: &str) -> Session {
        Session::new(
            SessionType::Trip,
            name.to_string(),
            "Harbour pier".to_string(),
            "2025-08-30".to_string(),
            "06:45".to_string(),
            "KD".to_string(),
        )
    }

    #[test]
    fn session_roundtrip_and_delete() {
        let store = FieldStore::open_in_memory().unwrap();
        let session = sample_session("Pier watch");
        store.save_session(&session).unwrap();

        let loaded = store.get_session(&session.id).unwrap().unwrap();
        assert_eq!(loaded, session);

        assert!(store.delete_session(&session.id).unwrap());
        assert!(!store.delete_session(&session.id).unwrap());
        assert!(store.get_session(&session.id).unwrap().is_none());
    }

    #[test]
    fn settings_default_until_saved() {
        let store = FieldStore::open_in_memory().unwrap();
        let mut settings = store.load_settings().unwrap();
        assert!(!settings.species.is_empty());

        settings.language = "nl".to_string();
        store.save_settings(&settings).unwrap();
        assert_eq!(store.load_settings().unwrap().language, "nl");
    }

    #[test]
    fn location_history_dedupes_and_caps() {
        let store = FieldStore::open_in_memory().unwrap();
        for i in 0..12 {
            store.push_location(&format!("spot-{}", i)).unwrap();
        }
        store.push_location("spot-5").unwrap();

        let history = store.location_history().unwrap();
        assert_eq!(history.len(), 10);
        assert_eq!(history[0], "spot-5");
        assert_eq!(history.iter().filter(|l| *l == "spot-5").count(), 1);
    }

    #[test]
    fn last_active_marker_set_and_cleared() {
        let store = FieldStore::open_in_memory().unwrap();
        assert!(store.last_active().unwrap().is_none());

        store.set_last_active(Some("abc")).unwrap();
        assert_eq!(store.last_active().unwrap().as_deref(), Some("abc"));

        store.set_last_active(None).unwrap();
        assert!(store.last_active().unwrap().is_none());
    }
}
