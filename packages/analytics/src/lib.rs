#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filter-driven aggregation pipeline.
//!
//! A view is produced in three pure steps: [`filter::filter_rows`] narrows
//! the active tab's dataset by the current [`FilterState`],
//! [`aggregate`] groups and sums the surviving rows, and one of the
//! [`views`] recipes shapes the sums into a chart-ready [`ViewResult`].
//! Filter options come from [`options::derive_options`] over the whole,
//! unfiltered dataset.

pub mod aggregate;
pub mod filter;
pub mod options;
pub mod views;

use enforcement_dash_analytics_models::view::ViewResult;
use enforcement_dash_analytics_models::{FilterOptions, FilterState, OptionsPolicy, ViewPolicy};
use enforcement_dash_dataset::DatasetStore;
use enforcement_dash_dataset_models::DatasetKind;
use thiserror::Error;

pub use views::render_view;

/// Errors that can occur while building a view.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// The store has no dataset for a tab the view depends on.
    #[error("No {kind} dataset loaded")]
    MissingDataset {
        /// The missing dataset.
        kind: DatasetKind,
    },
}

/// Filter options for `tab`, read from the store.
///
/// # Errors
///
/// Returns [`AnalyticsError::MissingDataset`] if the tab's dataset is not in
/// the store.
pub fn options_for(
    store: &DatasetStore,
    tab: DatasetKind,
    policy: &OptionsPolicy,
) -> Result<FilterOptions, AnalyticsError> {
    let dataset = store
        .get(tab)
        .ok_or(AnalyticsError::MissingDataset { kind: tab })?;
    Ok(options::derive_options(dataset, tab, policy))
}

/// Views of every tab with no filters applied, in tab order.
///
/// # Errors
///
/// Returns the first [`AnalyticsError`] raised by a tab's view.
pub fn unfiltered_views(
    store: &DatasetStore,
    policy: &ViewPolicy,
) -> Result<Vec<(DatasetKind, ViewResult)>, AnalyticsError> {
    DatasetKind::all()
        .iter()
        .map(|&tab| Ok((tab, render_view(store, &FilterState::new(tab), policy)?)))
        .collect()
}
