//! Row filtering by the active filter selections.
//!
//! A filter is a conjunction of [`Predicate`]s, one per dimension that is
//! applicable to the active tab and not set to `All`. Filtering never fails
//! and never reorders rows.

use enforcement_dash_analytics_models::{FilterState, is_applicable};
use enforcement_dash_dataset_models::{Dataset, Dimension, Record};

/// Exact-match constraint on one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Predicate<'a> {
    /// Constrained dimension.
    pub dimension: Dimension,
    /// Required value, as selected in the filter control.
    pub value: &'a str,
}

impl Predicate<'_> {
    /// Whether `record` satisfies this predicate.
    ///
    /// Years compare numerically, so `"2023"` matches a year loaded from
    /// `2023` or `"2023.0"`. Every other dimension is exact string equality.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        match self.dimension {
            Dimension::Year => loose_year_eq(record.year, self.value),
            dimension => record.text(dimension) == Some(self.value),
        }
    }
}

#[allow(clippy::float_cmp)]
fn loose_year_eq(year: Option<i32>, selected: &str) -> bool {
    let (Some(year), Ok(selected)) = (year, selected.trim().parse::<f64>()) else {
        return false;
    };
    f64::from(year) == selected
}

/// Predicates contributed by `state` for its own tab.
#[must_use]
pub fn active_predicates(state: &FilterState) -> Vec<Predicate<'_>> {
    state
        .active()
        .filter(|(dimension, _)| is_applicable(state.tab(), *dimension))
        .map(|(dimension, value)| Predicate { dimension, value })
        .collect()
}

/// Keeps the records that satisfy every predicate, in input order.
pub fn apply<'r, I>(records: I, predicates: &[Predicate<'_>]) -> Vec<&'r Record>
where
    I: IntoIterator<Item = &'r Record>,
{
    records
        .into_iter()
        .filter(|record| predicates.iter().all(|p| p.matches(record)))
        .collect()
}

/// Rows of `dataset` matching the selections in `state`.
///
/// An empty result is a normal outcome: callers show a placeholder instead
/// of an empty chart.
#[must_use]
pub fn filter_rows<'r>(dataset: &'r Dataset, state: &FilterState) -> Vec<&'r Record> {
    let predicates = active_predicates(state);
    let rows = apply(dataset.records(), &predicates);

    log::debug!(
        "[{}] {} of {} rows match {} predicate(s)",
        state.tab(),
        rows.len(),
        dataset.len(),
        predicates.len()
    );

    rows
}

#[cfg(test)]
mod tests {
    use enforcement_dash_analytics_models::DatasetKind;
    use enforcement_dash_dataset_models::Column;

    use super::*;

    fn drug_dataset() -> Dataset {
        let row = |jur: &str, year: i32, age: &str, method: &str| {
            Record::default()
                .with(Column::Jurisdiction, jur)
                .with(Column::Year, year)
                .with(Column::AgeGroup, age)
                .with(Column::DetectionMethod, method)
        };
        Dataset::new(
            DatasetKind::Drug,
            vec![
                row("NSW", 2023, "17-25", "Roadside drug test"),
                row("VIC", 2023, "26-39", "Laboratory confirmed"),
                row("NSW", 2022, "26-39", "Roadside drug test"),
                row("QLD", 2023, "17-25", "Roadside drug test"),
            ],
        )
    }

    #[test]
    fn unconstrained_state_returns_everything_in_order() {
        let dataset = drug_dataset();
        let rows = filter_rows(&dataset, &FilterState::new(DatasetKind::Drug));
        assert_eq!(rows.len(), dataset.len());
        for (row, original) in rows.iter().zip(dataset.records()) {
            assert!(std::ptr::eq(*row, original));
        }
    }

    #[test]
    fn conjunction_of_active_predicates() {
        let dataset = drug_dataset();
        let state = FilterState::new(DatasetKind::Drug)
            .with_selection(Dimension::Jurisdiction, "NSW")
            .with_selection(Dimension::DetectionMethod, "Roadside drug test");

        let rows = filter_rows(&dataset, &state);
        assert_eq!(rows.len(), 2);
        for row in &rows {
            assert_eq!(row.text(Dimension::Jurisdiction), Some("NSW"));
            assert_eq!(row.text(Dimension::DetectionMethod), Some("Roadside drug test"));
        }
    }

    #[test]
    fn output_is_a_subset_satisfying_every_predicate() {
        let dataset = drug_dataset();
        let selections = [
            (Dimension::Jurisdiction, "NSW"),
            (Dimension::Year, "2023"),
            (Dimension::AgeGroup, "17-25"),
            (Dimension::DetectionMethod, "Roadside drug test"),
        ];

        for (i, _) in selections.iter().enumerate() {
            let state = selections[..=i]
                .iter()
                .fold(FilterState::new(DatasetKind::Drug), |s, (d, v)| {
                    s.with_selection(*d, *v)
                });
            let predicates = active_predicates(&state);
            for row in filter_rows(&dataset, &state) {
                assert!(dataset.records().iter().any(|r| std::ptr::eq(r, row)));
                assert!(predicates.iter().all(|p| p.matches(row)));
            }
        }
    }

    #[test]
    fn year_matches_loosely() {
        let record = Record::default().with(Column::Year, "2023");
        let predicate = |value| Predicate {
            dimension: Dimension::Year,
            value,
        };
        assert!(predicate("2023").matches(&record));
        assert!(predicate(" 2023.0 ").matches(&record));
        assert!(!predicate("2022").matches(&record));
        assert!(!predicate("latest").matches(&record));
        assert!(!predicate("2023").matches(&Record::default()));
    }

    #[test]
    fn string_dimensions_match_exactly() {
        let record = Record::default().with(Column::Jurisdiction, "NSW");
        let predicate = |value| Predicate {
            dimension: Dimension::Jurisdiction,
            value,
        };
        assert!(predicate("NSW").matches(&record));
        assert!(!predicate("nsw").matches(&record));
        assert!(!predicate("NSW ").matches(&record));
    }

    #[test]
    fn inapplicable_dimensions_are_ignored() {
        let dataset = Dataset::new(
            DatasetKind::Fines,
            vec![
                Record::default()
                    .with(Column::Jurisdiction, "NSW")
                    .with(Column::DetectionMethod, "Camera issued"),
            ],
        );
        let state = FilterState::new(DatasetKind::Fines)
            .with_selection(Dimension::DetectionMethod, "Police issued");
        assert_eq!(filter_rows(&dataset, &state).len(), 1);
    }

    #[test]
    fn unknown_jurisdiction_yields_empty_result() {
        let dataset = Dataset::new(
            DatasetKind::Fines,
            vec![Record::default().with(Column::Jurisdiction, "NSW")],
        );
        let state =
            FilterState::new(DatasetKind::Fines).with_selection(Dimension::Jurisdiction, "VIC");
        assert!(filter_rows(&dataset, &state).is_empty());
    }
}
