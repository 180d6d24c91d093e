//! Filter options for the active tab.
//!
//! Options are always computed from the whole, unfiltered dataset so the
//! filter panel does not shrink as selections narrow the rows.

use std::collections::{BTreeMap, BTreeSet};

use enforcement_dash_analytics_models::{ALL, FilterOptions, OptionsPolicy, tab_dimensions};
use enforcement_dash_dataset_models::{Dataset, DatasetKind, Dimension, Record};

/// Distinct non-empty values of `dimension` across `records`, sorted
/// lexically. The reserved [`ALL`] value is never returned.
#[must_use]
pub fn distinct_values(records: &[Record], dimension: Dimension) -> BTreeSet<String> {
    records
        .iter()
        .filter_map(|r| r.dimension_value(dimension))
        .filter(|v| !v.trim().is_empty() && v != ALL)
        .collect()
}

/// Selectable values per dimension offered on `tab`, computed from the
/// whole of `dataset`.
///
/// A dimension is offered when it applies to the tab and has at least the
/// policy's minimum number of distinct values. Each list starts with
/// [`ALL`] followed by the distinct values in lexical order.
#[must_use]
pub fn derive_options(dataset: &Dataset, tab: DatasetKind, policy: &OptionsPolicy) -> FilterOptions {
    let mut options = BTreeMap::new();

    for &dimension in tab_dimensions(tab) {
        let values = distinct_values(dataset.records(), dimension);
        let min = policy.min_cardinality(dimension);

        if values.len() < min {
            log::debug!(
                "[{tab}] Not offering {dimension}: {} distinct value(s), need {min}",
                values.len()
            );
            continue;
        }

        let mut list = Vec::with_capacity(values.len() + 1);
        list.push(ALL.to_owned());
        list.extend(values);
        options.insert(dimension, list);
    }

    FilterOptions::new(options)
}
