//! Skylark: field recording of bird sightings backed by a local embedded
//! database, with derived reporting views and optional one-way sync of a
//! finished session to a CMS backend.

pub mod app;
pub mod client;
pub mod error;
pub mod export;
pub mod import;
pub mod location;
pub mod models;
pub mod store;
pub mod ui;
pub mod views;
