//! Session import from a JSON document. A document is accepted only when it
//! carries an `id` and a `sightings` array; everything else falls back to
//! defaults. Accepted documents are re-keyed so an import can never collide
//! with an existing session.

use chrono::Utc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{Session, SyncStatus};

pub fn import_session(document: &str) -> Result<Session> {
    let value: serde_json::Value = serde_json::from_str(document)
        .map_err(|e| Error::Import(format!("document is not valid JSON: {}", e)))?;
    let Some(object) = value.as_object() else {
        return Err(Error::Import("document is not a JSON object".to_string()));
    };
    if !object.contains_key("id") {
        return Err(Error::Import("document has no 'id' field".to_string()));
    }
    if !object
        .get("sightings")
        .map(|s| s.is_array())
        .unwrap_or(false)
    {
        return Err(Error::Import(
            "document has no 'sightings' array".to_string(),
        ));
    }

    let mut session: Session = serde_json::from_value(value)
        .map_err(|e| Error::Import(format!("document is not a session: {}", e)))?;

    session.id = Uuid::new_v4().to_string();
    session.name = format!("{} (Imported)", session.name.trim()).trim().to_string();
    session.remote_id = None;
    session.sync_status = SyncStatus::Unsynced;
    if session.inserted_at.is_empty() {
        session.inserted_at = Utc::now().to_rfc3339();
    }
    Ok(session)
}
