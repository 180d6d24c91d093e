#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filter state, options policy and chart-ready view types.
//!
//! [`FilterState`] is an immutable value: every interaction produces a new
//! state instead of mutating a shared one, and the state is passed
//! explicitly into filtering and aggregation. The [`view`] module holds the
//! precomputed series the rendering adapter consumes.

pub mod view;

use std::collections::BTreeMap;

pub use enforcement_dash_dataset_models::{DatasetKind, Dimension};
use serde::{Deserialize, Serialize};

/// Reserved selection value meaning "no constraint on this dimension".
pub const ALL: &str = "All";

/// The selected value of one filter dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Selection {
    /// No constraint.
    #[default]
    All,
    /// Only rows whose dimension equals this value.
    Value(String),
}

static ALL_SELECTION: Selection = Selection::All;

impl Selection {
    /// Whether this selection leaves the dimension unconstrained.
    #[must_use]
    pub const fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// The selected value, or `None` for [`Selection::All`].
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Value(v) => Some(v),
        }
    }

    /// The selection as it appears in a filter control.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.value().unwrap_or(ALL)
    }
}

impl From<&str> for Selection {
    /// `"All"` and empty strings map to [`Selection::All`].
    fn from(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed == ALL {
            Self::All
        } else {
            Self::Value(trimmed.to_owned())
        }
    }
}

impl From<String> for Selection {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<Selection> for String {
    fn from(value: Selection) -> Self {
        match value {
            Selection::All => ALL.to_owned(),
            Selection::Value(v) => v,
        }
    }
}

impl std::fmt::Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The active tab and the current selection per filter dimension.
///
/// Dimensions without an entry are unconstrained. Switching tab produces a
/// fresh state so selections never leak between tabs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    tab: DatasetKind,
    selections: BTreeMap<Dimension, Selection>,
}

impl FilterState {
    /// An unconstrained state for `tab`.
    #[must_use]
    pub const fn new(tab: DatasetKind) -> Self {
        Self {
            tab,
            selections: BTreeMap::new(),
        }
    }

    /// The active tab.
    #[must_use]
    pub const fn tab(&self) -> DatasetKind {
        self.tab
    }

    /// Selection for `dimension`; [`Selection::All`] when never set.
    #[must_use]
    pub fn selection(&self, dimension: Dimension) -> &Selection {
        self.selections.get(&dimension).unwrap_or(&ALL_SELECTION)
    }

    /// A fresh state for `tab`. Selections are always cleared, even when
    /// `tab` is the current tab.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub const fn with_tab(&self, tab: DatasetKind) -> Self {
        Self::new(tab)
    }

    /// A copy of this state with `dimension` set to `selection`.
    #[must_use]
    pub fn with_selection(&self, dimension: Dimension, selection: impl Into<Selection>) -> Self {
        let mut next = self.clone();
        match selection.into() {
            Selection::All => {
                next.selections.remove(&dimension);
            }
            value @ Selection::Value(_) => {
                next.selections.insert(dimension, value);
            }
        }
        next
    }

    /// Constrained dimensions and their values, in dimension order.
    pub fn active(&self) -> impl Iterator<Item = (Dimension, &str)> {
        self.selections
            .iter()
            .filter_map(|(dim, sel)| sel.value().map(|v| (*dim, v)))
    }
}

/// Which dimensions each tab can filter by.
///
/// Jurisdiction, year and age group apply everywhere; detection method
/// only applies to the drug tab.
#[must_use]
pub fn tab_dimensions(tab: DatasetKind) -> &'static [Dimension] {
    match tab {
        DatasetKind::Drug => &[
            Dimension::Jurisdiction,
            Dimension::Year,
            Dimension::AgeGroup,
            Dimension::DetectionMethod,
        ],
        DatasetKind::Fines | DatasetKind::Alcohol | DatasetKind::Breath => {
            &[Dimension::Jurisdiction, Dimension::Year, Dimension::AgeGroup]
        }
    }
}

/// Whether `dimension` may constrain rows on `tab`.
#[must_use]
pub fn is_applicable(tab: DatasetKind, dimension: Dimension) -> bool {
    tab_dimensions(tab).contains(&dimension)
}

/// Minimum number of distinct values a dimension needs before it is offered
/// as a filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct OptionsPolicy {
    /// Threshold for dimensions without an explicit entry.
    pub default_min_cardinality: usize,
    /// Per-dimension thresholds.
    pub min_cardinality: BTreeMap<Dimension, usize>,
}

impl Default for OptionsPolicy {
    fn default() -> Self {
        Self {
            default_min_cardinality: 2,
            min_cardinality: BTreeMap::from([
                (Dimension::Jurisdiction, 0),
                (Dimension::Year, 0),
                (Dimension::DetectionMethod, 0),
            ]),
        }
    }
}

impl OptionsPolicy {
    /// Threshold for `dimension`.
    #[must_use]
    pub fn min_cardinality(&self, dimension: Dimension) -> usize {
        self.min_cardinality
            .get(&dimension)
            .copied()
            .unwrap_or(self.default_min_cardinality)
    }
}

/// Tunables for the per-view aggregation recipes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ViewPolicy {
    /// Age groups dropped from the fines chart (aggregate and unknown rows).
    pub excluded_age_groups: Vec<String>,
    /// Group labels never charted in any view.
    pub excluded_keys: Vec<String>,
    /// `METRIC` value in the alcohol dataset that counts breath tests
    /// conducted (the positivity denominator).
    pub breath_tests_metric: String,
}

impl Default for ViewPolicy {
    fn default() -> Self {
        Self {
            excluded_age_groups: vec!["All ages".to_owned(), "Unknown".to_owned()],
            excluded_keys: vec!["Unknown".to_owned()],
            breath_tests_metric: "breath_tests_conducted".to_owned(),
        }
    }
}

impl ViewPolicy {
    /// Whether `key` may become a chart group.
    #[must_use]
    pub fn is_chartable_key(&self, key: &str) -> bool {
        !key.trim().is_empty() && !self.excluded_keys.iter().any(|k| k == key)
    }
}

/// Selectable values per offered dimension, each list starting with
/// [`ALL`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterOptions(BTreeMap<Dimension, Vec<String>>);

impl FilterOptions {
    /// Wraps precomputed option lists.
    #[must_use]
    pub const fn new(options: BTreeMap<Dimension, Vec<String>>) -> Self {
        Self(options)
    }

    /// Options for `dimension`, or `None` if it is not offered.
    #[must_use]
    pub fn get(&self, dimension: Dimension) -> Option<&[String]> {
        self.0.get(&dimension).map(Vec::as_slice)
    }

    /// Whether `dimension` is offered.
    #[must_use]
    pub fn contains(&self, dimension: Dimension) -> bool {
        self.0.contains_key(&dimension)
    }

    /// Offered dimensions and their options, in filter panel order.
    pub fn iter(&self) -> impl Iterator<Item = (Dimension, &[String])> {
        self.0.iter().map(|(d, v)| (*d, v.as_slice()))
    }

    /// Whether no dimension is offered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
