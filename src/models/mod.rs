pub mod v1;

// ===== VERSIONED MODELS FOLLOWING NATIVE_DB PATTERN =====
// Following the pattern from the native_db documentation:
// https://docs.rs/native_db/latest/native_db/

pub mod data {
    // Type aliases pointing to the latest versions
    pub type Species = super::v1::Species;
    pub type Sighting = super::v1::Sighting;
    pub type SightingDraft = super::v1::SightingDraft;
    pub type SightingPatch = super::v1::SightingPatch;
    pub type MetadataPatch = super::v1::MetadataPatch;
    pub type Weather = super::v1::Weather;
    pub type Session = super::v1::Session;
    pub type SessionLocal = super::v1::SessionLocal;
    pub type Settings = super::v1::Settings;
    pub type SettingsLocal = super::v1::SettingsLocal;
    pub type CodeLists = super::v1::CodeLists;
    pub type FieldToggles = super::v1::FieldToggles;
    pub type UserAccount = super::v1::UserAccount;
    pub type UserAccountLocal = super::v1::UserAccountLocal;
    pub type LocationHistoryLocal = super::v1::LocationHistoryLocal;
    pub type AppMarkerLocal = super::v1::AppMarkerLocal;

    // Re-export versioned modules for direct access
    pub use super::v1;
}

// Re-export for backward compatibility at the top level
pub use data::*;

// Re-export common traits and enums that are shared across versions
pub use v1::{default_catalogue, SessionStatus, SessionType, Syncable, SyncStatus, Theme};
