// Abbreviated player name expansion.
//
// Roster extractions arrive with names like "A. Fonua-Blake"; the dataset
// keys players by full name ("Addin Fonua-Blake"). Expansion matches on
// surname plus first initial, first match wins.

use crate::model::Dataset;

/// Expand an abbreviated name ("I. Surname") to the full name found in the
/// dataset. A name already present in the dataset is returned as-is, as is
/// any name that matches zero full names; the unexpanded name then fails
/// downstream lookups and is treated as unresolved, not fatal.
pub fn expand_abbreviated(name: &str, dataset: &Dataset) -> String {
    // Already a full name in the dataset.
    if dataset.rows().iter().any(|r| r.name == name) {
        return name.to_string();
    }

    let Some((initial, surname)) = name.split_once(". ") else {
        return name.to_string();
    };
    let Some(initial_char) = initial.chars().next() else {
        return name.to_string();
    };

    let mut seen: Vec<&str> = Vec::new();
    for row in dataset.rows() {
        if seen.contains(&row.name.as_str()) {
            continue;
        }
        seen.push(&row.name);

        let Some((first, last)) = row.name.split_once(' ') else {
            continue;
        };
        let first_matches = first
            .chars()
            .next()
            .is_some_and(|c| c.eq_ignore_ascii_case(&initial_char));
        if last == surname && first_matches {
            return row.name.clone();
        }
    }

    name.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PlayerRecord, Position};

    fn dataset(names: &[&str]) -> Dataset {
        Dataset::new(
            names
                .iter()
                .map(|n| PlayerRecord {
                    name: n.to_string(),
                    team: "MEL".into(),
                    position: Position::Middle,
                    secondary_position: None,
                    price: 500_000,
                    diff: 10.0,
                    projection: 50.0,
                    injured: false,
                    bye_grade: None,
                    round: 1,
                })
                .collect(),
        )
    }

    #[test]
    fn expands_initial_and_surname() {
        let ds = dataset(&["Addin Fonua-Blake", "Erin Clark"]);
        assert_eq!(
            expand_abbreviated("A. Fonua-Blake", &ds),
            "Addin Fonua-Blake"
        );
        assert_eq!(expand_abbreviated("E. Clark", &ds), "Erin Clark");
    }

    #[test]
    fn full_name_passes_through() {
        let ds = dataset(&["Erin Clark"]);
        assert_eq!(expand_abbreviated("Erin Clark", &ds), "Erin Clark");
    }

    #[test]
    fn initial_match_is_case_insensitive() {
        let ds = dataset(&["Erin Clark"]);
        assert_eq!(expand_abbreviated("e. Clark", &ds), "Erin Clark");
    }

    #[test]
    fn no_match_returns_input_unchanged() {
        let ds = dataset(&["Erin Clark"]);
        assert_eq!(expand_abbreviated("Z. Nobody", &ds), "Z. Nobody");
    }

    #[test]
    fn multiple_matches_first_wins() {
        let ds = dataset(&["Jake Smith", "John Smith"]);
        assert_eq!(expand_abbreviated("J. Smith", &ds), "Jake Smith");
    }

    #[test]
    fn malformed_abbreviation_returns_input() {
        let ds = dataset(&["Erin Clark"]);
        assert_eq!(expand_abbreviated("Clark", &ds), "Clark");
        assert_eq!(expand_abbreviated("", &ds), "");
    }
}
