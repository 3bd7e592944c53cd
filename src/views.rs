//! Derived views over a session: per-species totals, catalogue ordering and
//! report rollups. Everything here is recomputed from current state on each
//! call; nothing is cached or persisted.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{Session, Species};

/// Label used when a sighting's species id no longer resolves in the
/// catalogue.
pub const UNKNOWN_SPECIES: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeciesTally {
    pub name: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub total_birds: i64,
    pub unique_species: usize,
    pub breakdown: Vec<SpeciesTally>,
}

/// Sum of counts for one species, O(sightings).
pub fn count_for_species(session: &Session, species_id: &str) -> i64 {
    session
        .sightings
        .iter()
        .filter(|s| s.species_id == species_id)
        .map(|s| s.count)
        .sum()
}

/// Single-pass species -> total map. Callers rendering totals for many
/// species use this instead of calling `count_for_species` per row.
pub fn species_totals(session: &Session) -> HashMap<String, i64> {
    let mut totals: HashMap<String, i64> = HashMap::new();
    for sighting in &session.sightings {
        *totals.entry(sighting.species_id.clone()).or_insert(0) += sighting.count;
    }
    totals
}

fn matches_search(species: &Species, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }
    let needle = search.to_lowercase();
    species.name.to_lowercase().contains(&needle)
        || species.abbreviation.to_lowercase().contains(&needle)
        || species
            .family
            .as_deref()
            .map(|f| f.to_lowercase().contains(&needle))
            .unwrap_or(false)
}

/// Catalogue entries matching `search`, species already seen this session
/// first, alphabetical by name within each group. Stable ordering.
pub fn sorted_catalogue<'a>(
    catalogue: &'a [Species],
    session: &Session,
    search: &str,
) -> Vec<&'a Species> {
    let totals = species_totals(session);
    let mut entries: Vec<&Species> = catalogue
        .iter()
        .filter(|species| matches_search(species, search))
        .collect();
    entries.sort_by(|a, b| {
        let a_seen = totals.get(&a.id).copied().unwrap_or(0) > 0;
        let b_seen = totals.get(&b.id).copied().unwrap_or(0) > 0;
        b_seen
            .cmp(&a_seen)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
    entries
}

/// Report rollup: total birds, distinct species count and a per-species
/// breakdown ordered by descending total, name ascending on ties. Species
/// ids missing from the catalogue appear under the "Unknown" label.
pub fn report_summary(session: &Session, catalogue: &[Species]) -> ReportSummary {
    let totals = species_totals(session);
    let total_birds: i64 = totals.values().sum();
    let unique_species = totals.len();

    let mut breakdown: Vec<SpeciesTally> = totals
        .into_iter()
        .map(|(species_id, count)| {
            let name = catalogue
                .iter()
                .find(|s| s.id == species_id)
                .map(|s| s.name.clone())
                .unwrap_or_else(|| UNKNOWN_SPECIES.to_string());
            SpeciesTally { name, count }
        })
        .collect();
    breakdown.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });

    ReportSummary {
        total_birds,
        unique_species,
        breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::v1::{Settings, SightingDraft};
    use crate::models::{SessionType, Species};

    fn session_with(counts: &[(&str, i64)]) -> Session {
        let settings = Settings::default();
        let mut session = Session::new(
            SessionType::Trip,
            "Morning walk".to_string(),
            "Polder east".to_string(),
            "2025-09-21".to_string(),
            "08:00".to_string(),
            "AB".to_string(),
        );
        for (species_id, count) in counts {
            session
                .append_sighting(
                    SightingDraft {
                        species_id: species_id.to_string(),
                        count: *count,
                        ..SightingDraft::default()
                    },
                    &settings,
                )
                .unwrap();
        }
        session
    }

    #[test]
    fn count_for_species_sums_all_matching_appends() {
        let session = session_with(&[("skylark", 3), ("robin", 5), ("skylark", 2)]);
        assert_eq!(count_for_species(&session, "skylark"), 5);
        assert_eq!(count_for_species(&session, "robin"), 5);
        assert_eq!(count_for_species(&session, "wren"), 0);

        let totals = species_totals(&session);
        assert_eq!(totals.get("skylark"), Some(&5));
        assert_eq!(totals.len(), 2);
    }

    #[test]
    fn sorted_catalogue_puts_seen_species_first() {
        let catalogue = vec![
            Species::new("robin", "Robin", "R", None),
            Species::new("crow", "Crow", "C", None),
        ];
        let session = session_with(&[("crow", 1)]);

        let sorted = sorted_catalogue(&catalogue, &session, "");
        let names: Vec<&str> = sorted.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Crow", "Robin"]);
    }

    #[test]
    fn sorted_catalogue_filters_on_name_abbreviation_and_family() {
        let catalogue = vec![
            Species::new("great-tit", "Great Tit", "GT", Some("Paridae")),
            Species::new("wren", "Eurasian Wren", "WR", Some("Troglodytidae")),
        ];
        let session = session_with(&[]);

        assert_eq!(sorted_catalogue(&catalogue, &session, "tit").len(), 1);
        assert_eq!(sorted_catalogue(&catalogue, &session, "wr").len(), 1);
        assert_eq!(sorted_catalogue(&catalogue, &session, "paridae").len(), 1);
        assert_eq!(sorted_catalogue(&catalogue, &session, "").len(), 2);
        assert!(sorted_catalogue(&catalogue, &session, "albatross").is_empty());
    }

    #[test]
    fn report_summary_orders_by_count_then_name() {
        let catalogue = vec![
            Species::new("x", "Xeme", "X", None),
            Species::new("y", "Yellowhammer", "Y", None),
        ];
        let session = session_with(&[("x", 3), ("x", 2), ("y", 5)]);

        let summary = report_summary(&session, &catalogue);
        assert_eq!(summary.total_birds, 10);
        assert_eq!(summary.unique_species, 2);
        // Equal totals, so the tie breaks alphabetically by name.
        assert_eq!(summary.breakdown[0].name, "Xeme");
        assert_eq!(summary.breakdown[0].count, 5);
        assert_eq!(summary.breakdown[1].name, "Yellowhammer");
        assert_eq!(summary.breakdown[1].count, 5);
    }

    #[test]
    fn report_summary_labels_dangling_species_as_unknown() {
        let catalogue = vec![Species::new("robin", "Robin", "R", None)];
        let session = session_with(&[("robin", 1), ("ghost-species", 2)]);

        let summary = report_summary(&session, &catalogue);
        assert!(summary
            .breakdown
            .iter()
            .any(|tally| tally.name == UNKNOWN_SPECIES && tally.count == 2));
    }
}
