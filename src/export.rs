//! Export renderers: CSV, the verbatim JSON document, and a plain-text
//! summary suitable for clipboard copy.

use anyhow::{anyhow, Result};

use crate::models::{Session, Species};
use crate::views::{self, UNKNOWN_SPECIES};

fn resolve<'a>(catalogue: &'a [Species], species_id: &str) -> Option<&'a Species> {
    catalogue.iter().find(|s| s.id == species_id)
}

/// The verbatim session document.
pub fn session_to_json(session: &Session) -> Result<String> {
    Ok(serde_json::to_string_pretty(session)?)
}

/// One CSV row per sighting, species resolved to names where possible.
pub fn session_to_csv(session: &Session, catalogue: &[Species]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "species",
        "abbreviation",
        "timestamp",
        "count",
        "age",
        "sex",
        "direction",
        "distance",
        "morph",
        "status",
        "count_type",
        "latitude",
        "longitude",
        "comment",
    ])?;

    for sighting in &session.sightings {
        let species = resolve(catalogue, &sighting.species_id);
        let name = species
            .map(|s| s.name.as_str())
            .unwrap_or(UNKNOWN_SPECIES)
            .to_string();
        let abbreviation = species
            .map(|s| s.abbreviation.as_str())
            .unwrap_or("")
            .to_string();
        writer.write_record([
            name,
            abbreviation,
            sighting.timestamp.clone(),
            sighting.count.to_string(),
            sighting.age.clone().unwrap_or_default(),
            sighting.sex.clone().unwrap_or_default(),
            sighting.direction.clone().unwrap_or_default(),
            sighting.distance.clone().unwrap_or_default(),
            sighting.morph.clone().unwrap_or_default(),
            sighting.status.clone().unwrap_or_default(),
            sighting.count_type.clone().unwrap_or_default(),
            sighting.latitude.map(|v| v.to_string()).unwrap_or_default(),
            sighting
                .longitude
                .map(|v| v.to_string())
                .unwrap_or_default(),
            sighting.comment.clone().unwrap_or_default(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush CSV writer: {}", e))?;
    String::from_utf8(bytes).map_err(|e| anyhow!("CSV output was not UTF-8: {}", e))
}

/// Plain-text report built on the report summary.
pub fn session_to_text(session: &Session, catalogue: &[Species]) -> String {
    let summary = views::report_summary(session, catalogue);

    let mut text = format!("{} ({})\n", session.name, session.location);
    text.push_str(&format!("Date: {}", session.date));
    match &session.end_time {
        Some(end_time) => text.push_str(&format!(" {}-{}\n", session.start_time, end_time)),
        None => text.push_str(&format!(" from {}\n", session.start_time)),
    }
    if !session.observers.is_empty() {
        text.push_str(&format!("Observers: {}\n", session.observers));
    }
    text.push_str(&format!("Total birds: {}\n", summary.total_birds));
    text.push_str(&format!("Species: {}\n", summary.unique_species));
    for tally in &summary.breakdown {
        text.push_str(&format!("  {:>5}  {}\n", tally.count, tally.name));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::v1::{Settings, SightingDraft};
    use crate::models::SessionType;

    fn session_with_sightings() -> (Session, Settings) {
        let settings = Settings::default();
        let mut session = Session::new(
            SessionType::Counting,
            "Ridge count".to_string(),
            "South ridge".to_string(),
            "2025-10-11".to_string(),
            "07:00".to_string(),
            "EH".to_string(),
        );
        session
            .append_sighting(
                SightingDraft {
                    species_id: "skylark".to_string(),
                    count: 12,
                    direction: Some("SW".to_string()),
                    ..SightingDraft::default()
                },
                &settings,
            )
            .unwrap();
        session
            .append_sighting(
                SightingDraft {
                    species_id: "no-such-species".to_string(),
                    count: 1,
                    ..SightingDraft::default()
                },
                &settings,
            )
            .unwrap();
        (session, settings)
    }

    #[test]
    fn csv_has_header_and_one_row_per_sighting() {
        let (session, settings) = session_with_sightings();
        let csv = session_to_csv(&session, &settings.species).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("species,abbreviation,timestamp,count"));
        assert!(lines[1].contains("Eurasian Skylark"));
        assert!(lines[1].contains("SW"));
        assert!(lines[2].contains(UNKNOWN_SPECIES));
    }

    #[test]
    fn json_roundtrips_the_document() {
        let (session, _) = session_with_sightings();
        let json = session_to_json(&session).unwrap();
        let parsed: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, session);
    }

    #[test]
    fn text_summary_carries_totals() {
        let (session, settings) = session_with_sightings();
        let text = session_to_text(&session, &settings.species);
        assert!(text.contains("Ridge count (South ridge)"));
        assert!(text.contains("Total birds: 13"));
        assert!(text.contains("Species: 2"));
        assert!(text.contains("Eurasian Skylark"));
        assert!(text.contains(UNKNOWN_SPECIES));
    }
}
