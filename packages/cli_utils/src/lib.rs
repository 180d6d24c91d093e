#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared CLI utilities for the enforcement dashboard.
//!
//! Provides an `indicatif` progress bar behind the [`LoadProgress`] trait,
//! plus [`init_logger`] which sets up `indicatif-log-bridge` so that
//! `log::info!` and friends are suspended while progress bars redraw.

use std::sync::Arc;

use enforcement_dash_dataset::progress::LoadProgress;
use enforcement_dash_dataset_models::DatasetKind;
use indicatif::{ProgressBar, ProgressStyle};

pub use indicatif::MultiProgress;

/// An `indicatif` [`ProgressBar`] that implements [`LoadProgress`].
pub struct IndicatifProgress {
    bar: ProgressBar,
}

impl IndicatifProgress {
    /// Creates a bar with one step per dataset file. The length is set when
    /// the load starts.
    #[must_use]
    pub fn datasets_bar(multi: &MultiProgress, message: &str) -> Arc<dyn LoadProgress> {
        let bar = multi.add(ProgressBar::new(0));
        bar.set_style(
            ProgressStyle::with_template(
                "{msg} {wide_bar:.green/dim} {pos}/{len} [{elapsed_precise}]",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
        );
        bar.set_message(message.to_string());

        Arc::new(Self { bar })
    }
}

impl LoadProgress for IndicatifProgress {
    fn start(&self, files: u64) {
        self.bar.set_length(files);
        self.bar.set_position(0);
    }

    fn loaded(&self, kind: DatasetKind, records: usize) {
        self.bar.set_message(format!("{} ({records} records)", kind.label()));
        self.bar.inc(1);
    }

    fn finish(&self, msg: String) {
        self.bar.finish_with_message(msg);
    }
}

/// Initializes the global logger wrapped in `indicatif-log-bridge` so that
/// `log::info!` and friends are suspended while progress bars redraw.
///
/// Returns the [`MultiProgress`] that all progress bars must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok(); // already set in tests

    log::set_max_level(level);

    multi
}
