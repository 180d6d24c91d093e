//! Where the four dataset files live on disk.

use std::path::{Path, PathBuf};

use enforcement_dash_dataset_models::DatasetKind;
use serde::Deserialize;

/// Data directory plus one file name per dataset.
///
/// Deserialized from the `[datasets]` table of `dashboard.toml`. Every field
/// has a default, so an empty table is valid.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatasetSources {
    /// Directory the file names are resolved against.
    pub data_dir: PathBuf,
    /// File name per dataset.
    pub files: DatasetFiles,
}

/// File names of the four datasets, relative to
/// [`DatasetSources::data_dir`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatasetFiles {
    /// Fines issued.
    pub fines: String,
    /// Alcohol and drug tests conducted.
    pub alcohol: String,
    /// Positive breath tests.
    pub breath: String,
    /// Positive drug tests.
    pub drug: String,
}

impl Default for DatasetFiles {
    fn default() -> Self {
        Self {
            fines: "police_enforcement_2023_fines_2024-09-20.csv".to_owned(),
            alcohol: "police_enforcement_2023_alcohol_drug_tests_2025-02-13.csv".to_owned(),
            breath: "police_enforcement_2023_positive_breath_tests_2024-09-20.csv".to_owned(),
            drug: "police_enforcement_2023_positive_drug_tests_2024-09-20.csv".to_owned(),
        }
    }
}

impl Default for DatasetSources {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            files: DatasetFiles::default(),
        }
    }
}

impl DatasetFiles {
    /// File name configured for `kind`.
    #[must_use]
    pub fn name(&self, kind: DatasetKind) -> &str {
        match kind {
            DatasetKind::Fines => &self.fines,
            DatasetKind::Alcohol => &self.alcohol,
            DatasetKind::Breath => &self.breath,
            DatasetKind::Drug => &self.drug,
        }
    }
}

impl DatasetSources {
    /// Full path of the file backing `kind`.
    #[must_use]
    pub fn path_for(&self, kind: DatasetKind) -> PathBuf {
        self.data_dir.join(self.files.name(kind))
    }

    /// Replaces the data directory, keeping file names.
    #[must_use]
    pub fn with_data_dir(mut self, data_dir: impl AsRef<Path>) -> Self {
        self.data_dir = data_dir.as_ref().to_path_buf();
        self
    }
}
