use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use native_db::{native_db, ToKey};
use native_model::{native_model, Model};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

// ===== TRAITS =====

/// Implemented by records that can be pushed to the remote backend.
/// The local string id is authoritative; the remote id only exists after a
/// successful upload.
pub trait Syncable {
    fn id(&self) -> &str;
    fn remote_id(&self) -> Option<i64>;
    fn set_remote_id(&mut self, remote_id: i64);
}

// ===== ENUMS =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    Trip,
    Counting,
}

impl From<&str> for SessionType {
    fn from(s: &str) -> Self {
        match s {
            "counting" => SessionType::Counting,
            _ => SessionType::Trip,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
}

impl From<&str> for SessionStatus {
    fn from(s: &str) -> Self {
        match s {
            "completed" => SessionStatus::Completed,
            _ => SessionStatus::Active,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Unsynced,
    Synced,
    Error,
}

impl From<&str> for SyncStatus {
    fn from(s: &str) -> Self {
        match s {
            "synced" => SyncStatus::Synced,
            "error" => SyncStatus::Error,
            _ => SyncStatus::Unsynced,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl From<&str> for Theme {
    fn from(s: &str) -> Self {
        match s {
            "dark" => Theme::Dark,
            _ => Theme::Light,
        }
    }
}

// ===== SPECIES CATALOGUE =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Species {
    pub id: String,
    pub name: String,
    pub abbreviation: String,
    pub family: Option<String>,
}

impl Default for Species {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            abbreviation: String::new(),
            family: None,
        }
    }
}

impl Species {
    pub fn new(id: &str, name: &str, abbreviation: &str, family: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            abbreviation: abbreviation.to_string(),
            family: family.map(|f| f.to_string()),
        }
    }
}

/// Built-in catalogue seed; the settings screen can extend it.
pub fn default_catalogue() -> Vec<Species> {
    vec![
        Species::new("skylark", "Eurasian Skylark", "S", Some("Alaudidae")),
        Species::new("blackbird", "Common Blackbird", "B", Some("Turdidae")),
        Species::new("song-thrush", "Song Thrush", "ST", Some("Turdidae")),
        Species::new("robin", "European Robin", "R", Some("Muscicapidae")),
        Species::new("wren", "Eurasian Wren", "WR", Some("Troglodytidae")),
        Species::new("chaffinch", "Common Chaffinch", "CH", Some("Fringillidae")),
        Species::new("goldfinch", "European Goldfinch", "GO", Some("Fringillidae")),
        Species::new("linnet", "Common Linnet", "LI", Some("Fringillidae")),
        Species::new("great-tit", "Great Tit", "GT", Some("Paridae")),
        Species::new("blue-tit", "Eurasian Blue Tit", "BT", Some("Paridae")),
        Species::new("barn-swallow", "Barn Swallow", "SW", Some("Hirundinidae")),
        Species::new("house-martin", "Common House Martin", "HM", Some("Hirundinidae")),
        Species::new("meadow-pipit", "Meadow Pipit", "MP", Some("Motacillidae")),
        Species::new("pied-wagtail", "Pied Wagtail", "PW", Some("Motacillidae")),
        Species::new("starling", "Common Starling", "SG", Some("Sturnidae")),
        Species::new("house-sparrow", "House Sparrow", "HS", Some("Passeridae")),
        Species::new("yellowhammer", "Yellowhammer", "Y", Some("Emberizidae")),
        Species::new("lapwing", "Northern Lapwing", "L", Some("Charadriidae")),
    ]
}

// ===== CATEGORICAL CODE CONFIGURATION =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeLists {
    pub age: Vec<String>,
    pub sex: Vec<String>,
    pub distance: Vec<String>,
    pub direction: Vec<String>,
    pub status: Vec<String>,
    pub morph: Vec<String>,
    pub count_type: Vec<String>,
}

impl Default for CodeLists {
    fn default() -> Self {
        let list = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            age: list(&["juvenile", "immature", "adult", "unknown"]),
            sex: list(&["male", "female", "unknown"]),
            distance: list(&["0-50m", "50-200m", "200-500m", ">500m"]),
            direction: list(&["N", "NE", "E", "SE", "S", "SW", "W", "NW"]),
            status: list(&["flying", "resting", "foraging", "singing", "migrating"]),
            morph: list(&["light", "dark", "intermediate"]),
            count_type: list(&["exact", "estimate", "minimum"]),
        }
    }
}

/// Per-category display/entry toggles. `status` has no toggle and is always
/// accepted when it matches the configured list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldToggles {
    pub age: bool,
    pub sex: bool,
    pub distance: bool,
    pub direction: bool,
    pub morph: bool,
    pub count_type: bool,
}

impl Default for FieldToggles {
    fn default() -> Self {
        Self {
            age: true,
            sex: true,
            distance: true,
            direction: true,
            morph: true,
            count_type: true,
        }
    }
}

// ===== SETTINGS =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub species: Vec<Species>,
    pub theme: Theme,
    pub language: String,
    pub codes: CodeLists,
    pub fields: FieldToggles,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            species: default_catalogue(),
            theme: Theme::Light,
            language: "en".to_string(),
            codes: CodeLists::default(),
            fields: FieldToggles::default(),
        }
    }
}

impl Settings {
    /// Validates one categorical value against its configured list.
    fn check_code(
        &self,
        category: &str,
        enabled: bool,
        list: &[String],
        value: &Option<String>,
    ) -> Result<()> {
        let Some(value) = value else {
            return Ok(());
        };
        if !enabled {
            return Err(Error::Validation(format!(
                "field '{}' is disabled in settings",
                category
            )));
        }
        if !list.iter().any(|code| code == value) {
            return Err(Error::InvalidCode {
                category: category.to_string(),
                value: value.clone(),
            });
        }
        Ok(())
    }

    /// Write-time validation of a draft's categorical fields.
    pub fn validate_draft(&self, draft: &SightingDraft) -> Result<()> {
        self.check_code("age", self.fields.age, &self.codes.age, &draft.age)?;
        self.check_code("sex", self.fields.sex, &self.codes.sex, &draft.sex)?;
        self.check_code(
            "distance",
            self.fields.distance,
            &self.codes.distance,
            &draft.distance,
        )?;
        self.check_code(
            "direction",
            self.fields.direction,
            &self.codes.direction,
            &draft.direction,
        )?;
        self.check_code("status", true, &self.codes.status, &draft.status)?;
        self.check_code("morph", self.fields.morph, &self.codes.morph, &draft.morph)?;
        self.check_code(
            "count_type",
            self.fields.count_type,
            &self.codes.count_type,
            &draft.count_type,
        )?;
        Ok(())
    }

    pub fn validate_patch(&self, patch: &SightingPatch) -> Result<()> {
        self.check_code("age", self.fields.age, &self.codes.age, &patch.age)?;
        self.check_code("sex", self.fields.sex, &self.codes.sex, &patch.sex)?;
        self.check_code(
            "distance",
            self.fields.distance,
            &self.codes.distance,
            &patch.distance,
        )?;
        self.check_code(
            "direction",
            self.fields.direction,
            &self.codes.direction,
            &patch.direction,
        )?;
        self.check_code("status", true, &self.codes.status, &patch.status)?;
        self.check_code("morph", self.fields.morph, &self.codes.morph, &patch.morph)?;
        self.check_code(
            "count_type",
            self.fields.count_type,
            &self.codes.count_type,
            &patch.count_type,
        )?;
        Ok(())
    }
}

// ===== WEATHER =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weather {
    pub temperature: Option<String>,
    pub cloud_cover: Option<String>,
    pub wind_speed: Option<String>,
    pub precipitation: Option<String>,
}

impl Default for Weather {
    fn default() -> Self {
        Self {
            temperature: None,
            cloud_cover: None,
            wind_speed: None,
            precipitation: None,
        }
    }
}

// ===== SIGHTING =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sighting {
    pub id: String,
    pub species_id: String,
    pub timestamp: String,
    pub count: i64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub direction: Option<String>,
    pub age: Option<String>,
    pub sex: Option<String>,
    pub morph: Option<String>,
    pub distance: Option<String>,
    pub status: Option<String>,
    pub count_type: Option<String>,
    pub comment: Option<String>,
}

impl Default for Sighting {
    fn default() -> Self {
        Self {
            id: String::new(),
            species_id: String::new(),
            timestamp: String::new(),
            count: 0,
            latitude: None,
            longitude: None,
            direction: None,
            age: None,
            sex: None,
            morph: None,
            distance: None,
            status: None,
            count_type: None,
            comment: None,
        }
    }
}

/// Partial record handed to `Session::append_sighting`. Missing coordinates
/// default to the session's own.
#[derive(Debug, Clone, Default)]
pub struct SightingDraft {
    pub species_id: String,
    pub count: i64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub direction: Option<String>,
    pub age: Option<String>,
    pub sex: Option<String>,
    pub morph: Option<String>,
    pub distance: Option<String>,
    pub status: Option<String>,
    pub count_type: Option<String>,
    pub comment: Option<String>,
}

/// Field-wise patch for `Session::edit_sighting`; `Some` replaces, `None`
/// leaves the stored value alone. A `time_of_day` of "HH:MM" or "HH:MM:SS"
/// replaces only the time component of the original timestamp.
#[derive(Debug, Clone, Default)]
pub struct SightingPatch {
    pub time_of_day: Option<String>,
    pub count: Option<i64>,
    pub direction: Option<String>,
    pub age: Option<String>,
    pub sex: Option<String>,
    pub morph: Option<String>,
    pub distance: Option<String>,
    pub status: Option<String>,
    pub count_type: Option<String>,
    pub comment: Option<String>,
}

/// Metadata replacement for `Session::update_metadata`; allowed in either
/// session status since metadata does not affect count integrity.
#[derive(Debug, Clone, Default)]
pub struct MetadataPatch {
    pub name: Option<String>,
    pub location: Option<String>,
    pub observers: Option<String>,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub notes: Option<String>,
    pub weather: Option<Weather>,
}

fn merge_time_of_day(timestamp: &str, time_of_day: &str) -> Result<String> {
    let original = DateTime::parse_from_rfc3339(timestamp)
        .map_err(|e| Error::Validation(format!("invalid timestamp '{}': {}", timestamp, e)))?;
    let time = NaiveTime::parse_from_str(time_of_day, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(time_of_day, "%H:%M"))
        .map_err(|e| Error::Validation(format!("invalid time of day '{}': {}", time_of_day, e)))?;
    let merged = original
        .with_time(time)
        .single()
        .ok_or_else(|| Error::Validation(format!("time '{}' is not representable", time_of_day)))?;
    Ok(merged.to_rfc3339())
}

// ===== SESSION =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<i64>,
    pub session_type: SessionType,
    pub name: String,
    pub location: String,
    pub date: String,
    pub start_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    pub observers: String,
    pub notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    pub weather: Weather,
    pub sightings: Vec<Sighting>,
    pub status: SessionStatus,
    pub sync_status: SyncStatus,
    pub inserted_at: String,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            id: String::new(),
            remote_id: None,
            session_type: SessionType::Trip,
            name: String::new(),
            location: String::new(),
            date: String::new(),
            start_time: String::new(),
            end_time: None,
            observers: String::new(),
            notes: String::new(),
            latitude: None,
            longitude: None,
            weather: Weather::default(),
            sightings: Vec::new(),
            status: SessionStatus::Active,
            sync_status: SyncStatus::Unsynced,
            inserted_at: String::new(),
        }
    }
}

impl Syncable for Session {
    fn id(&self) -> &str {
        &self.id
    }

    fn remote_id(&self) -> Option<i64> {
        self.remote_id
    }

    fn set_remote_id(&mut self, remote_id: i64) {
        self.remote_id = Some(remote_id);
    }
}

impl Session {
    pub fn new(
        session_type: SessionType,
        name: String,
        location: String,
        date: String,
        start_time: String,
        observers: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            session_type,
            name,
            location,
            date,
            start_time,
            observers,
            inserted_at: Utc::now().to_rfc3339(),
            ..Self::default()
        }
    }

    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    /// Creation-time validation, run before the session is persisted.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("session name is required".to_string()));
        }
        if self.location.trim().is_empty() {
            return Err(Error::Validation("session location is required".to_string()));
        }
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .map_err(|e| Error::Validation(format!("invalid session date '{}': {}", self.date, e)))?;
        NaiveTime::parse_from_str(&self.start_time, "%H:%M").map_err(|e| {
            Error::Validation(format!("invalid start time '{}': {}", self.start_time, e))
        })?;
        Ok(())
    }

    fn ensure_active(&self, action: &str) -> Result<()> {
        match self.status {
            SessionStatus::Active => Ok(()),
            SessionStatus::Completed => Err(Error::StateConflict(format!(
                "cannot {} on completed session {}",
                action, self.id
            ))),
        }
    }

    fn species_total(&self, species_id: &str) -> i64 {
        self.sightings
            .iter()
            .filter(|s| s.species_id == species_id)
            .map(|s| s.count)
            .sum()
    }

    /// Appends one sighting as its own event. Every recorded count is a new
    /// entry, never merged into a prior one, so categorical fields can differ
    /// between increments of the same species and the history stays editable.
    pub fn append_sighting(&mut self, draft: SightingDraft, settings: &Settings) -> Result<Sighting> {
        self.ensure_active("append sighting")?;
        if draft.species_id.trim().is_empty() {
            return Err(Error::Validation("species id is required".to_string()));
        }
        if draft.count < 0 && self.species_total(&draft.species_id) + draft.count < 0 {
            return Err(Error::Validation(format!(
                "count for species '{}' would drop below zero",
                draft.species_id
            )));
        }
        settings.validate_draft(&draft)?;

        let sighting = Sighting {
            id: Uuid::new_v4().to_string(),
            species_id: draft.species_id,
            timestamp: Utc::now().to_rfc3339(),
            count: draft.count,
            latitude: draft.latitude.or(self.latitude),
            longitude: draft.longitude.or(self.longitude),
            direction: draft.direction,
            age: draft.age,
            sex: draft.sex,
            morph: draft.morph,
            distance: draft.distance,
            status: draft.status,
            count_type: draft.count_type,
            comment: draft.comment,
        };
        self.sightings.push(sighting.clone());
        Ok(sighting)
    }

    /// Merges a patch into exactly one sighting. Returns `Ok(false)` when no
    /// sighting matches the id.
    pub fn edit_sighting(
        &mut self,
        sighting_id: &str,
        patch: SightingPatch,
        settings: &Settings,
    ) -> Result<bool> {
        self.ensure_active("edit sighting")?;
        settings.validate_patch(&patch)?;
        if let Some(count) = patch.count {
            if count < 0 {
                return Err(Error::Validation(
                    "sighting count cannot be negative".to_string(),
                ));
            }
        }

        let Some(sighting) = self.sightings.iter_mut().find(|s| s.id == sighting_id) else {
            return Ok(false);
        };

        if let Some(time_of_day) = &patch.time_of_day {
            sighting.timestamp = merge_time_of_day(&sighting.timestamp, time_of_day)?;
        }
        if let Some(count) = patch.count {
            sighting.count = count;
        }
        if patch.direction.is_some() {
            sighting.direction = patch.direction;
        }
        if patch.age.is_some() {
            sighting.age = patch.age;
        }
        if patch.sex.is_some() {
            sighting.sex = patch.sex;
        }
        if patch.morph.is_some() {
            sighting.morph = patch.morph;
        }
        if patch.distance.is_some() {
            sighting.distance = patch.distance;
        }
        if patch.status.is_some() {
            sighting.status = patch.status;
        }
        if patch.count_type.is_some() {
            sighting.count_type = patch.count_type;
        }
        if patch.comment.is_some() {
            sighting.comment = patch.comment;
        }
        Ok(true)
    }

    /// Removes exactly one sighting by id. Returns `Ok(false)` when absent.
    pub fn remove_sighting(&mut self, sighting_id: &str) -> Result<bool> {
        self.ensure_active("remove sighting")?;
        let before = self.sightings.len();
        self.sightings.retain(|s| s.id != sighting_id);
        Ok(self.sightings.len() != before)
    }

    /// Explicit active -> completed transition; stamps the end time of day.
    pub fn finish(&mut self) -> Result<()> {
        if self.status == SessionStatus::Completed {
            return Err(Error::StateConflict(format!(
                "session {} is already completed",
                self.id
            )));
        }
        self.status = SessionStatus::Completed;
        self.end_time = Some(Utc::now().format("%H:%M").to_string());
        Ok(())
    }

    /// Completed -> active. Clears the end time; everything else is kept.
    pub fn resume(&mut self) -> Result<()> {
        if self.status == SessionStatus::Active {
            return Err(Error::StateConflict(format!(
                "session {} is already active",
                self.id
            )));
        }
        self.status = SessionStatus::Active;
        self.end_time = None;
        Ok(())
    }

    /// Replaces metadata fields. Permitted in either status.
    pub fn update_metadata(&mut self, patch: MetadataPatch) -> Result<()> {
        if let Some(date) = &patch.date {
            NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map_err(|e| Error::Validation(format!("invalid session date '{}': {}", date, e)))?;
        }
        if let Some(start_time) = &patch.start_time {
            NaiveTime::parse_from_str(start_time, "%H:%M").map_err(|e| {
                Error::Validation(format!("invalid start time '{}': {}", start_time, e))
            })?;
        }

        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(location) = patch.location {
            self.location = location;
        }
        if let Some(observers) = patch.observers {
            self.observers = observers;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(start_time) = patch.start_time {
            self.start_time = start_time;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes;
        }
        if let Some(weather) = patch.weather {
            self.weather = weather;
        }
        Ok(())
    }
}

// ===== STORED RECORDS =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[native_model(id = 1, version = 1)]
#[native_db]
pub struct SessionLocal {
    #[primary_key]
    pub id: String,
    pub remote_id: Option<i64>,
    pub session_type: SessionType,
    pub name: String,
    pub location: String,
    pub date: String,
    pub start_time: String,
    pub end_time: Option<String>,
    pub observers: String,
    pub notes: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub weather: Weather,
    pub sightings: Vec<Sighting>,
    pub status: SessionStatus,
    pub sync_status: SyncStatus,
    pub inserted_at: String,
}

impl Default for SessionLocal {
    fn default() -> Self {
        Session::default().into()
    }
}

impl From<Session> for SessionLocal {
    fn from(session: Session) -> Self {
        Self {
            id: session.id,
            remote_id: session.remote_id,
            session_type: session.session_type,
            name: session.name,
            location: session.location,
            date: session.date,
            start_time: session.start_time,
            end_time: session.end_time,
            observers: session.observers,
            notes: session.notes,
            latitude: session.latitude,
            longitude: session.longitude,
            weather: session.weather,
            sightings: session.sightings,
            status: session.status,
            sync_status: session.sync_status,
            inserted_at: session.inserted_at,
        }
    }
}

impl From<SessionLocal> for Session {
    fn from(local: SessionLocal) -> Self {
        Self {
            id: local.id,
            remote_id: local.remote_id,
            session_type: local.session_type,
            name: local.name,
            location: local.location,
            date: local.date,
            start_time: local.start_time,
            end_time: local.end_time,
            observers: local.observers,
            notes: local.notes,
            latitude: local.latitude,
            longitude: local.longitude,
            weather: local.weather,
            sightings: local.sightings,
            status: local.status,
            sync_status: local.sync_status,
            inserted_at: local.inserted_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[native_model(id = 2, version = 1)]
#[native_db]
pub struct SettingsLocal {
    #[primary_key]
    pub slot: String,
    pub species: Vec<Species>,
    pub theme: Theme,
    pub language: String,
    pub codes: CodeLists,
    pub fields: FieldToggles,
}

impl SettingsLocal {
    pub fn from_settings(slot: &str, settings: Settings) -> Self {
        Self {
            slot: slot.to_string(),
            species: settings.species,
            theme: settings.theme,
            language: settings.language,
            codes: settings.codes,
            fields: settings.fields,
        }
    }
}

impl From<SettingsLocal> for Settings {
    fn from(local: SettingsLocal) -> Self {
        Self {
            species: local.species,
            theme: local.theme,
            language: local.language,
            codes: local.codes,
            fields: local.fields,
        }
    }
}

// ===== USER ACCOUNT =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserAccount {
    pub website_url: String,
    pub username: String,
    pub app_password: String,
}

impl Default for UserAccount {
    fn default() -> Self {
        Self {
            website_url: String::new(),
            username: String::new(),
            app_password: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[native_model(id = 3, version = 1)]
#[native_db]
pub struct UserAccountLocal {
    #[primary_key]
    pub slot: String,
    pub website_url: String,
    pub username: String,
    pub app_password: String,
}

impl UserAccountLocal {
    pub fn from_account(slot: &str, account: UserAccount) -> Self {
        Self {
            slot: slot.to_string(),
            website_url: account.website_url,
            username: account.username,
            app_password: account.app_password,
        }
    }
}

impl From<UserAccountLocal> for UserAccount {
    fn from(local: UserAccountLocal) -> Self {
        Self {
            website_url: local.website_url,
            username: local.username,
            app_password: local.app_password,
        }
    }
}

// ===== SMALL SINGLETON RECORDS =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[native_model(id = 4, version = 1)]
#[native_db]
pub struct LocationHistoryLocal {
    #[primary_key]
    pub slot: String,
    pub locations: Vec<String>,
}

/// Marker for the session currently open, offered for restore-after-crash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[native_model(id = 5, version = 1)]
#[native_db]
pub struct AppMarkerLocal {
    #[primary_key]
    pub slot: String,
    pub last_active_id: Option<String>,
}
