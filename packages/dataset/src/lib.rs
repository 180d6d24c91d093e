#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CSV loading and the in-memory dataset store.
//!
//! [`load_store`] parses all four dataset files in parallel and only returns
//! once every one of them has loaded. The resulting [`DatasetStore`] is
//! read-only for the rest of the session.

pub mod config;
pub mod parsing;
pub mod progress;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use enforcement_dash_dataset_models::{Column, Dataset, DatasetKind};

use crate::config::DatasetSources;
use crate::progress::LoadProgress;

/// Errors that can occur while loading datasets.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// I/O error (file open/read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing failed.
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    /// The header row lacks a column every dataset must carry.
    #[error("Missing required column {column}")]
    MissingColumn {
        /// The absent column.
        column: Column,
    },

    /// A blocking parse task panicked or was cancelled.
    #[error("Load task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Loading a specific file failed.
    #[error("Failed to load {kind} dataset from {}: {source}", .path.display())]
    File {
        /// Dataset being loaded.
        kind: DatasetKind,
        /// File that failed.
        path: PathBuf,
        /// Underlying failure.
        source: Box<Self>,
    },
}

/// The four loaded datasets, keyed by [`DatasetKind`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetStore {
    datasets: BTreeMap<DatasetKind, Dataset>,
}

impl DatasetStore {
    /// Builds a store from already-loaded datasets. A later dataset with the
    /// same kind replaces an earlier one.
    #[must_use]
    pub fn new(datasets: impl IntoIterator<Item = Dataset>) -> Self {
        Self {
            datasets: datasets.into_iter().map(|d| (d.kind(), d)).collect(),
        }
    }

    /// Dataset loaded under `kind`, if any.
    #[must_use]
    pub fn get(&self, kind: DatasetKind) -> Option<&Dataset> {
        self.datasets.get(&kind)
    }
}

/// Reads and parses one dataset file.
///
/// # Errors
///
/// Returns [`DatasetError::File`] wrapping the I/O, CSV or schema failure.
pub fn load_file(kind: DatasetKind, path: &Path) -> Result<Dataset, DatasetError> {
    let parse = || -> Result<Dataset, DatasetError> {
        let file = File::open(path)?;
        let records = parsing::parse_records(BufReader::new(file))?;
        Ok(Dataset::new(kind, records))
    };

    parse().map_err(|e| DatasetError::File {
        kind,
        path: path.to_path_buf(),
        source: Box::new(e),
    })
}

/// Loads all four datasets in parallel.
///
/// Each file is parsed on its own blocking task. The load is all-or-nothing:
/// the first failure is returned and no partial store is produced.
///
/// # Errors
///
/// Returns [`DatasetError`] if any file cannot be read or parsed.
pub async fn load_store(
    sources: &DatasetSources,
    progress: &Arc<dyn LoadProgress>,
) -> Result<DatasetStore, DatasetError> {
    let kinds = DatasetKind::all();
    progress.start(kinds.len() as u64);

    let tasks = kinds.iter().map(|&kind| {
        let path = sources.path_for(kind);
        let progress = Arc::clone(progress);

        async move {
            log::debug!("[{kind}] Loading {}", path.display());
            let dataset = tokio::task::spawn_blocking(move || load_file(kind, &path)).await??;
            log::info!("[{kind}] Loaded {} records", dataset.len());
            progress.loaded(kind, dataset.len());
            Ok::<_, DatasetError>(dataset)
        }
    });

    let datasets = futures::future::try_join_all(tasks).await?;
    let total: usize = datasets.iter().map(Dataset::len).sum();

    progress.finish(format!("Loaded {} datasets ({total} records)", datasets.len()));

    Ok(DatasetStore::new(datasets))
}
