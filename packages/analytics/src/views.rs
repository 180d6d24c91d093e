//! Per-tab aggregation recipes.
//!
//! [`render_view`] dispatches on the active tab. Each recipe takes rows that
//! were already filtered for that tab and returns a [`ViewResult`]; none of
//! them touches a renderer.

use std::collections::BTreeSet;

use enforcement_dash_analytics_models::view::{
    BarChart, BarPoint, BarRateChart, ChartMeta, GroupedBarChart, LineChart, MetricSeries,
    RatePoint, ViewResult,
};
use enforcement_dash_analytics_models::{FilterState, ViewPolicy};
use enforcement_dash_dataset::DatasetStore;
use enforcement_dash_dataset_models::{Dataset, DatasetKind, Dimension, Measure, Record};

use crate::AnalyticsError;
use crate::aggregate::{AggregateResult, aggregate, aggregate_nested, measure, rate};
use crate::filter::{Predicate, active_predicates, apply, filter_rows};

const FINES_COLOR: &str = "#007acc";
const BREATH_COLOR: &str = "#c0392b";
const DRUG_COLOR: &str = "#2ca02c";
const SERIES_PALETTE: &[&str] = &["#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd"];

const FINES_EMPTY: &str = "No data found for selected filters.";
const ALCOHOL_EMPTY: &str = "No alcohol or drug test data available for selected filters.";
const BREATH_EMPTY: &str = "No breath test data found for selected filters.";
const DRUG_EMPTY: &str =
    "Drug test data is unavailable or zero for selected filters. Try adjusting the filters.";

/// Runs the filter and aggregation pipeline for the active tab.
///
/// # Errors
///
/// Returns [`AnalyticsError::MissingDataset`] if the store lacks the
/// dataset the tab (or the breath join) needs.
pub fn render_view(
    store: &DatasetStore,
    state: &FilterState,
    policy: &ViewPolicy,
) -> Result<ViewResult, AnalyticsError> {
    let dataset = require(store, state.tab())?;
    let rows = filter_rows(dataset, state);

    let view = match state.tab() {
        DatasetKind::Fines => fines_view(&rows, policy),
        DatasetKind::Alcohol => alcohol_view(&rows, state, policy),
        DatasetKind::Breath => {
            breath_view(&rows, require(store, DatasetKind::Alcohol)?, state, policy)
        }
        DatasetKind::Drug => drug_view(&rows, state, policy),
    };

    if let ViewResult::Placeholder { message } = &view {
        log::debug!("[{}] Placeholder: {message}", state.tab());
    }

    Ok(view)
}

fn require(store: &DatasetStore, kind: DatasetKind) -> Result<&Dataset, AnalyticsError> {
    store
        .get(kind)
        .ok_or(AnalyticsError::MissingDataset { kind })
}

/// Total fines per age group, excluding the aggregate and unknown
/// groups, sorted lexically by label.
#[must_use]
pub fn fines_view(rows: &[&Record], policy: &ViewPolicy) -> ViewResult {
    if rows.is_empty() {
        return ViewResult::placeholder(FINES_EMPTY);
    }

    let grouped = aggregate(
        rows.iter().copied(),
        |r| {
            r.age_group.clone().filter(|age| {
                policy.is_chartable_key(age) && !policy.excluded_age_groups.contains(age)
            })
        },
        measure(Measure::Fines),
    );

    if grouped.is_empty() {
        return ViewResult::placeholder(FINES_EMPTY);
    }

    ViewResult::Bars(BarChart {
        meta: meta("Total Fines by Age Group", "Age Group", "Fines"),
        color: FINES_COLOR.to_owned(),
        bars: grouped
            .iter()
            .map(|(key, value)| BarPoint {
                key: key.clone(),
                value,
            })
            .collect(),
    })
}

/// Tests conducted per metric.
///
/// With a single year selected this is a grouped bar chart with one cluster
/// per jurisdiction. Otherwise it is a line chart over years with one line
/// per metric.
#[must_use]
pub fn alcohol_view(rows: &[&Record], state: &FilterState, policy: &ViewPolicy) -> ViewResult {
    if rows.is_empty() {
        return ViewResult::placeholder(ALCOHOL_EMPTY);
    }

    let metric_key = |r: &Record| r.metric.clone().filter(|m| policy.is_chartable_key(m));
    let metrics: BTreeSet<String> = rows.iter().copied().filter_map(metric_key).collect();

    if let Some(year) = state.selection(Dimension::Year).value() {
        let nested = aggregate_nested(
            rows.iter().copied(),
            |r| {
                r.jurisdiction
                    .clone()
                    .filter(|j| policy.is_chartable_key(j))
            },
            metric_key,
            measure(Measure::Count),
        );
        if nested.is_empty() {
            return ViewResult::placeholder(ALCOHOL_EMPTY);
        }

        let categories: Vec<String> = nested.keys().cloned().collect();
        let groups: Vec<&AggregateResult<String>> = nested.values().collect();

        ViewResult::GroupedBars(GroupedBarChart {
            meta: meta(
                &format!("Total Alcohol & Drug Tests Conducted ({year})"),
                "Jurisdiction",
                "Tests",
            ),
            categories,
            series: metric_series(&metrics, &groups),
        })
    } else {
        let nested = aggregate_nested(
            rows.iter().copied(),
            |r| r.year,
            metric_key,
            measure(Measure::Count),
        );
        if nested.is_empty() {
            return ViewResult::placeholder(ALCOHOL_EMPTY);
        }

        let categories: Vec<String> = nested.keys().map(ToString::to_string).collect();
        let groups: Vec<&AggregateResult<String>> = nested.values().collect();

        ViewResult::Lines(LineChart {
            meta: meta("Alcohol & Drug Tests Conducted by Year", "Year", "Tests"),
            categories,
            series: metric_series(&metrics, &groups),
        })
    }
}

/// Positive breath tests against breath tests conducted, per year.
///
/// The denominator comes from `alcohol` (always the alcohol/drug tests
/// dataset, whatever the active tab) restricted to the configured breath
/// test metric and to the jurisdiction and year selections of `state`.
#[must_use]
pub fn breath_view(
    rows: &[&Record],
    alcohol: &Dataset,
    state: &FilterState,
    policy: &ViewPolicy,
) -> ViewResult {
    if rows.is_empty() {
        return ViewResult::placeholder(BREATH_EMPTY);
    }

    let positives = aggregate(rows.iter().copied(), |r| r.year, measure(Measure::Count));

    let shared: Vec<Predicate<'_>> = active_predicates(state)
        .into_iter()
        .filter(|p| matches!(p.dimension, Dimension::Jurisdiction | Dimension::Year))
        .collect();
    let conducted_rows = apply(
        alcohol
            .records()
            .iter()
            .filter(|r| r.metric.as_deref() == Some(policy.breath_tests_metric.as_str())),
        &shared,
    );
    let conducted = aggregate(conducted_rows, |r| r.year, measure(Measure::Count));

    log::debug!(
        "Breath join: {} year(s) of positives, {} year(s) of tests conducted",
        positives.len(),
        conducted.len()
    );

    let points = rate_points(&conducted, &positives);
    if points.is_empty() {
        return ViewResult::placeholder(BREATH_EMPTY);
    }

    ViewResult::BarsWithRate(BarRateChart {
        meta: meta(
            "Breath Tests Conducted vs Positivity Rate",
            "Year",
            "Breath tests",
        ),
        total_label: "Breath tests conducted".to_owned(),
        secondary_label: "Positive breath tests".to_owned(),
        rate_label: "Positivity rate (%)".to_owned(),
        color: BREATH_COLOR.to_owned(),
        points,
    })
}

/// Positive drug tests and arrests with the derived arrest rate.
///
/// Grouped by jurisdiction while no jurisdiction is selected, otherwise by
/// year.
#[must_use]
pub fn drug_view(rows: &[&Record], state: &FilterState, policy: &ViewPolicy) -> ViewResult {
    if rows.is_empty() {
        return ViewResult::placeholder(DRUG_EMPTY);
    }

    let (points, group_label) = if state.selection(Dimension::Jurisdiction).is_all() {
        let key = |r: &Record| {
            r.jurisdiction
                .clone()
                .filter(|j| policy.is_chartable_key(j))
        };
        let tests = aggregate(rows.iter().copied(), key, measure(Measure::Count));
        let arrests = aggregate(rows.iter().copied(), key, measure(Measure::Arrests));
        (rate_points(&tests, &arrests), "Jurisdiction")
    } else {
        let tests = aggregate(rows.iter().copied(), |r| r.year, measure(Measure::Count));
        let arrests = aggregate(rows.iter().copied(), |r| r.year, measure(Measure::Arrests));
        (rate_points(&tests, &arrests), "Year")
    };

    if points.is_empty() {
        return ViewResult::placeholder(DRUG_EMPTY);
    }

    ViewResult::BarsWithRate(BarRateChart {
        meta: meta(
            &format!("Positive Drug Tests by {group_label}"),
            group_label,
            "Positive drug tests",
        ),
        total_label: "Positive drug tests".to_owned(),
        secondary_label: "Arrests".to_owned(),
        rate_label: "Arrest rate (%)".to_owned(),
        color: DRUG_COLOR.to_owned(),
        points,
    })
}

/// Joins two aggregates on their keys. Keys present on either side are
/// kept; the absent side reads as zero.
fn rate_points<K: Ord + ToString>(
    totals: &AggregateResult<K>,
    secondary: &AggregateResult<K>,
) -> Vec<RatePoint> {
    let keys: BTreeSet<&K> = totals.keys().chain(secondary.keys()).collect();
    keys.into_iter()
        .map(|key| {
            let total = totals.get(key);
            let secondary = secondary.get(key);
            RatePoint {
                key: key.to_string(),
                total,
                secondary,
                rate: rate(secondary, total),
            }
        })
        .collect()
}

/// One series per metric, aligned with `groups`; absent pairs are zero.
fn metric_series(
    metrics: &BTreeSet<String>,
    groups: &[&AggregateResult<String>],
) -> Vec<MetricSeries> {
    metrics
        .iter()
        .enumerate()
        .map(|(i, metric)| MetricSeries {
            metric: metric.clone(),
            label: humanize(metric),
            color: SERIES_PALETTE[i % SERIES_PALETTE.len()].to_owned(),
            values: groups.iter().map(|g| g.get(metric.as_str())).collect(),
        })
        .collect()
}

/// `breath_tests_conducted` → `breath tests conducted`.
#[must_use]
pub fn humanize(metric: &str) -> String {
    metric.replace('_', " ")
}

fn meta(title: &str, x_label: &str, y_label: &str) -> ChartMeta {
    ChartMeta {
        title: title.to_owned(),
        x_label: x_label.to_owned(),
        y_label: y_label.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use enforcement_dash_dataset_models::Column;

    use super::*;

    fn store_with(datasets: Vec<Dataset>) -> DatasetStore {
        DatasetStore::new(datasets)
    }

    fn fines_row(age: &str, fines: f64) -> Record {
        Record::default()
            .with(Column::Jurisdiction, "NSW")
            .with(Column::Year, 2023)
            .with(Column::AgeGroup, age)
            .with(Column::Fines, fines)
    }

    fn alcohol_row(jur: &str, year: i32, metric: &str, count: f64) -> Record {
        Record::default()
            .with(Column::Jurisdiction, jur)
            .with(Column::Year, year)
            .with(Column::Metric, metric)
            .with(Column::Count, count)
    }

    fn count_row(jur: &str, year: i32, count: f64) -> Record {
        Record::default()
            .with(Column::Jurisdiction, jur)
            .with(Column::Year, year)
            .with(Column::Count, count)
    }

    fn full_store() -> DatasetStore {
        store_with(vec![
            Dataset::new(
                DatasetKind::Fines,
                vec![
                    fines_row("26-39", 5.0),
                    fines_row("17-25", 10.0),
                    fines_row("All ages", 999.0),
                ],
            ),
            Dataset::new(
                DatasetKind::Alcohol,
                vec![
                    alcohol_row("NSW", 2022, "breath_tests_conducted", 1000.0),
                    alcohol_row("NSW", 2023, "breath_tests_conducted", 2000.0),
                    alcohol_row("NSW", 2023, "drug_tests_conducted", 300.0),
                    alcohol_row("VIC", 2023, "breath_tests_conducted", 500.0),
                ],
            ),
            Dataset::new(
                DatasetKind::Breath,
                vec![
                    count_row("NSW", 2022, 50.0),
                    count_row("NSW", 2023, 40.0),
                    count_row("VIC", 2023, 10.0),
                ],
            ),
            Dataset::new(
                DatasetKind::Drug,
                vec![
                    count_row("NSW", 2023, 100.0).with(Column::Arrests, 20.0),
                    count_row("NSW", 2023, 50.0).with(Column::Arrests, 0.0),
                ],
            ),
        ])
    }

    fn bars(view: &ViewResult) -> &BarChart {
        match view {
            ViewResult::Bars(chart) => chart,
            other => panic!("expected bars, got {other:?}"),
        }
    }

    fn bars_with_rate(view: &ViewResult) -> &BarRateChart {
        match view {
            ViewResult::BarsWithRate(chart) => chart,
            other => panic!("expected bars with rate, got {other:?}"),
        }
    }

    #[test]
    fn fines_exclude_all_ages_and_sort_by_label() {
        let view = render_view(
            &full_store(),
            &FilterState::new(DatasetKind::Fines),
            &ViewPolicy::default(),
        )
        .unwrap();

        let chart = bars(&view);
        let keys: Vec<&str> = chart.bars.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(keys, vec!["17-25", "26-39"]);
        assert!((chart.bars[0].value - 10.0).abs() < f64::EPSILON);
        assert!((chart.bars[1].value - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn fines_with_only_excluded_groups_is_a_placeholder() {
        let rows = [fines_row("All ages", 10.0), fines_row("Unknown", 2.0)];
        let refs: Vec<&Record> = rows.iter().collect();
        assert!(fines_view(&refs, &ViewPolicy::default()).is_placeholder());
    }

    #[test]
    fn unmatched_jurisdiction_renders_placeholder() {
        let state =
            FilterState::new(DatasetKind::Fines).with_selection(Dimension::Jurisdiction, "VIC");
        let view = render_view(&full_store(), &state, &ViewPolicy::default()).unwrap();
        assert_eq!(view, ViewResult::placeholder(FINES_EMPTY));
    }

    #[test]
    fn drug_totals_and_arrest_rate_by_year() {
        let rows = [
            Record::default()
                .with(Column::Year, 2023)
                .with(Column::Count, 100.0)
                .with(Column::Arrests, 20.0),
            Record::default()
                .with(Column::Year, 2023)
                .with(Column::Count, 50.0)
                .with(Column::Arrests, 0.0),
        ];
        let tests = aggregate(&rows, |r| r.year, measure(Measure::Count));
        let arrests = aggregate(&rows, |r| r.year, measure(Measure::Arrests));

        let points = rate_points(&tests, &arrests);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].key, "2023");
        assert!((points[0].total - 150.0).abs() < f64::EPSILON);
        assert!((points[0].secondary - 20.0).abs() < f64::EPSILON);
        assert!((points[0].rate - 100.0 * 20.0 / 150.0).abs() < 1e-9);
    }

    #[test]
    fn unfiltered_drug_view_groups_by_jurisdiction() {
        let rows = [
            count_row("VIC", 2023, 0.0).with(Column::Arrests, 3.0),
            count_row("NSW", 2023, 100.0).with(Column::Arrests, 20.0),
            count_row("NSW", 2022, 50.0),
            count_row("Unknown", 2023, 7.0),
        ];
        let refs: Vec<&Record> = rows.iter().collect();
        let view = drug_view(
            &refs,
            &FilterState::new(DatasetKind::Drug),
            &ViewPolicy::default(),
        );

        let chart = bars_with_rate(&view);
        assert_eq!(chart.meta.x_label, "Jurisdiction");
        let keys: Vec<&str> = chart.points.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["NSW", "VIC"]);
        assert!((chart.points[0].total - 150.0).abs() < f64::EPSILON);
        assert!((chart.points[0].rate - 100.0 * 20.0 / 150.0).abs() < 1e-9);
        assert!(chart.points[1].rate.abs() < f64::EPSILON);
    }

    #[test]
    fn drug_view_for_one_jurisdiction_groups_by_year() {
        let store = store_with(vec![Dataset::new(
            DatasetKind::Drug,
            vec![
                count_row("NSW", 2023, 100.0).with(Column::Arrests, 20.0),
                count_row("NSW", 2023, 50.0).with(Column::Arrests, 0.0),
                count_row("NSW", 2022, 40.0).with(Column::Arrests, 4.0),
                count_row("VIC", 2023, 999.0),
            ],
        )]);
        let state =
            FilterState::new(DatasetKind::Drug).with_selection(Dimension::Jurisdiction, "NSW");
        let view = render_view(&store, &state, &ViewPolicy::default()).unwrap();

        let chart = bars_with_rate(&view);
        assert_eq!(chart.meta.x_label, "Year");
        let keys: Vec<&str> = chart.points.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["2022", "2023"]);
        assert!((chart.points[0].rate - 10.0).abs() < 1e-9);
        assert!((chart.points[1].total - 150.0).abs() < f64::EPSILON);
        assert!((chart.points[1].rate - 100.0 * 20.0 / 150.0).abs() < 1e-9);
    }

    #[test]
    fn alcohol_over_all_years_is_a_line_per_metric() {
        let view = render_view(
            &full_store(),
            &FilterState::new(DatasetKind::Alcohol),
            &ViewPolicy::default(),
        )
        .unwrap();

        let ViewResult::Lines(chart) = view else {
            panic!("expected lines");
        };
        assert_eq!(chart.categories, vec!["2022", "2023"]);
        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.series[0].metric, "breath_tests_conducted");
        assert_eq!(chart.series[0].label, "breath tests conducted");
        assert_eq!(chart.series[0].values, vec![1000.0, 2500.0]);
        assert_eq!(chart.series[1].values, vec![0.0, 300.0]);
    }

    #[test]
    fn alcohol_for_one_year_clusters_by_jurisdiction() {
        let state = FilterState::new(DatasetKind::Alcohol).with_selection(Dimension::Year, "2023");
        let view = render_view(&full_store(), &state, &ViewPolicy::default()).unwrap();

        let ViewResult::GroupedBars(chart) = view else {
            panic!("expected grouped bars");
        };
        assert_eq!(chart.categories, vec!["NSW", "VIC"]);
        assert_eq!(chart.series[0].values, vec![2000.0, 500.0]);
        assert_eq!(chart.series[1].values, vec![300.0, 0.0]);
        assert!(chart.meta.title.contains("2023"));
    }

    #[test]
    fn breath_positivity_joins_alcohol_by_year() {
        let view = render_view(
            &full_store(),
            &FilterState::new(DatasetKind::Breath),
            &ViewPolicy::default(),
        )
        .unwrap();

        let chart = bars_with_rate(&view);
        assert_eq!(chart.points.len(), 2);
        assert_eq!(chart.points[0].key, "2022");
        assert!((chart.points[0].total - 1000.0).abs() < f64::EPSILON);
        assert!((chart.points[0].rate - 5.0).abs() < 1e-9);
        assert!((chart.points[1].total - 2500.0).abs() < f64::EPSILON);
        assert!((chart.points[1].secondary - 50.0).abs() < f64::EPSILON);
        assert!((chart.points[1].rate - 2.0).abs() < 1e-9);
    }

    #[test]
    fn breath_join_applies_jurisdiction_to_denominator() {
        let state =
            FilterState::new(DatasetKind::Breath).with_selection(Dimension::Jurisdiction, "VIC");
        let view = render_view(&full_store(), &state, &ViewPolicy::default()).unwrap();

        let chart = bars_with_rate(&view);
        assert_eq!(chart.points.len(), 1);
        assert!((chart.points[0].total - 500.0).abs() < f64::EPSILON);
        assert!((chart.points[0].rate - 2.0).abs() < 1e-9);
    }

    #[test]
    fn breath_without_denominator_has_zero_rate() {
        let alcohol = Dataset::new(DatasetKind::Alcohol, Vec::new());
        let rows = [count_row("NSW", 2023, 40.0)];
        let refs: Vec<&Record> = rows.iter().collect();
        let view = breath_view(
            &refs,
            &alcohol,
            &FilterState::new(DatasetKind::Breath),
            &ViewPolicy::default(),
        );
        let point = &bars_with_rate(&view).points[0];
        assert!(point.total.abs() < f64::EPSILON);
        assert!(point.rate.abs() < f64::EPSILON);
        assert!(point.rate.is_finite());
    }

    #[test]
    fn breath_needs_the_alcohol_dataset() {
        let store = store_with(vec![Dataset::new(
            DatasetKind::Breath,
            vec![count_row("NSW", 2023, 1.0)],
        )]);
        let err = render_view(
            &store,
            &FilterState::new(DatasetKind::Breath),
            &ViewPolicy::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AnalyticsError::MissingDataset {
                kind: DatasetKind::Alcohol
            }
        ));
    }

    #[test]
    fn pipeline_is_idempotent() {
        let store = full_store();
        let policy = ViewPolicy::default();
        for tab in DatasetKind::all() {
            let state = FilterState::new(*tab).with_selection(Dimension::Jurisdiction, "NSW");
            let first = render_view(&store, &state, &policy).unwrap();
            let second = render_view(&store, &state, &policy).unwrap();
            assert_eq!(first, second);
        }
    }
}
