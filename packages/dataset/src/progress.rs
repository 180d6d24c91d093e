//! Progress reporting for the startup load.
//!
//! [`LoadProgress`] decouples the loader from any rendering backend. The CLI
//! plugs in an `indicatif` bar; tests and library callers use
//! [`null_progress`].

use std::sync::Arc;

use enforcement_dash_dataset_models::DatasetKind;

/// Receives events while the dataset files are parsed.
///
/// Implementations must be `Send + Sync`: every file is parsed on its own
/// blocking task and reports from there.
pub trait LoadProgress: Send + Sync {
    /// Called once before any file is opened with the number of files.
    fn start(&self, files: u64);

    /// Called after one dataset has been parsed.
    fn loaded(&self, kind: DatasetKind, records: usize);

    /// Called once after every dataset loaded.
    fn finish(&self, msg: String);
}

/// A [`LoadProgress`] that ignores every event.
pub struct NullProgress;

impl LoadProgress for NullProgress {
    fn start(&self, _files: u64) {}
    fn loaded(&self, _kind: DatasetKind, _records: usize) {}
    fn finish(&self, _msg: String) {}
}

/// Returns a shared [`NullProgress`] instance for convenient use.
#[must_use]
pub fn null_progress() -> Arc<dyn LoadProgress> {
    Arc::new(NullProgress)
}
