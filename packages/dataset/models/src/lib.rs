#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Record, dataset and schema types for the police enforcement datasets.
//!
//! Every CSV table (fines, alcohol/drug tests, positive breath tests,
//! positive drug tests) is parsed into the same structurally typed
//! [`Record`]. Columns outside the known [`Column`] schema are preserved in
//! [`Record::extra`] so nothing in the source file is silently dropped.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Logical key of one of the four loaded datasets.
///
/// Each dashboard tab is backed by exactly one dataset of the same kind.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DatasetKind {
    /// Fines issued, broken down by age group and detection method.
    Fines,
    /// Alcohol and drug tests conducted, keyed by `METRIC`.
    Alcohol,
    /// Positive breath tests.
    Breath,
    /// Positive drug tests and resulting arrests.
    Drug,
}

impl DatasetKind {
    /// Returns all variants of this enum, in tab order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Fines, Self::Alcohol, Self::Breath, Self::Drug]
    }

    /// Human-readable tab label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Fines => "Fines",
            Self::Alcohol => "Alcohol & Drug Tests",
            Self::Breath => "Positive Breath Tests",
            Self::Drug => "Positive Drug Tests",
        }
    }
}

/// A categorical filter axis.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Dimension {
    /// State or territory (e.g. `"NSW"`).
    Jurisdiction,
    /// Calendar year.
    Year,
    /// Age bracket of the offender (e.g. `"17-25"`).
    AgeGroup,
    /// How the offence was detected (e.g. `"Police issued"`).
    DetectionMethod,
}

impl Dimension {
    /// Returns all variants of this enum, in filter panel order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Jurisdiction,
            Self::Year,
            Self::AgeGroup,
            Self::DetectionMethod,
        ]
    }

    /// Human-readable label for filter controls.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Jurisdiction => "Jurisdiction",
            Self::Year => "Year",
            Self::AgeGroup => "Age Group",
            Self::DetectionMethod => "Detection Method",
        }
    }
}

/// Numeric measure columns that can be summed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Measure {
    /// `FINES` column.
    Fines,
    /// `COUNT` column.
    Count,
    /// `ARRESTS` column.
    Arrests,
}

/// Known CSV columns. Header matching is case-insensitive.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Column {
    /// `JURISDICTION`
    Jurisdiction,
    /// `YEAR`
    Year,
    /// `AGE_GROUP`
    AgeGroup,
    /// `DETECTION_METHOD`
    DetectionMethod,
    /// `METRIC`
    Metric,
    /// `FINES`
    Fines,
    /// `COUNT`
    Count,
    /// `ARRESTS`
    Arrests,
}

impl Column {
    /// Columns every dataset file must declare in its header row.
    pub const REQUIRED: &[Self] = &[Self::Jurisdiction, Self::Year];

    /// Resolves a (trimmed) CSV header to a known column.
    #[must_use]
    pub fn from_header(header: &str) -> Option<Self> {
        header.trim().parse().ok()
    }
}

/// A single CSV cell after type coercion.
///
/// Numeric-looking text becomes [`FieldValue::Number`]; everything else
/// stays text. Empty cells never produce a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Finite number.
    Number(f64),
    /// Non-numeric text, trimmed.
    Text(String),
}

impl FieldValue {
    /// Coerces a raw cell. Returns `None` for empty or whitespace-only cells.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(parse_number(trimmed).map_or_else(|| Self::Text(trimmed.to_owned()), Self::Number))
    }

    /// Returns the numeric value, parsing text loosely. Non-numeric text
    /// yields `None`.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.is_finite().then_some(*n),
            Self::Text(s) => parse_number(s.trim()),
        }
    }

    /// Returns the value as display text. Integral numbers print without a
    /// fractional part.
    #[must_use]
    pub fn as_text(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[allow(clippy::cast_possible_truncation)]
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Parses a finite number, rejecting the textual `inf`/`nan` forms Rust
/// would otherwise accept.
fn parse_number(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// One row from a source dataset.
///
/// Fields vary per dataset; anything a file does not provide is `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// State or territory.
    pub jurisdiction: Option<String>,
    /// Calendar year.
    pub year: Option<i32>,
    /// Age bracket.
    pub age_group: Option<String>,
    /// Detection method.
    pub detection_method: Option<String>,
    /// Test type label in the alcohol/drug dataset.
    pub metric: Option<String>,
    /// `FINES` measure as loaded.
    pub fines: Option<FieldValue>,
    /// `COUNT` measure as loaded.
    pub count: Option<FieldValue>,
    /// `ARRESTS` measure as loaded.
    pub arrests: Option<FieldValue>,
    /// Columns outside the known schema, keyed by trimmed header.
    pub extra: BTreeMap<String, FieldValue>,
}

impl Record {
    /// Stores a value in the slot for `column`.
    ///
    /// Categorical columns keep the value's text form. `YEAR` keeps only
    /// integral numeric values; anything else leaves the year unset.
    pub fn set(&mut self, column: Column, value: Option<FieldValue>) {
        match column {
            Column::Jurisdiction => self.jurisdiction = value.map(|v| v.as_text()),
            Column::Year => self.year = value.as_ref().and_then(year_from_value),
            Column::AgeGroup => self.age_group = value.map(|v| v.as_text()),
            Column::DetectionMethod => self.detection_method = value.map(|v| v.as_text()),
            Column::Metric => self.metric = value.map(|v| v.as_text()),
            Column::Fines => self.fines = value,
            Column::Count => self.count = value,
            Column::Arrests => self.arrests = value,
        }
    }

    /// Builder-style [`Record::set`].
    #[must_use]
    pub fn with(mut self, column: Column, value: impl Into<FieldValue>) -> Self {
        self.set(column, Some(value.into()));
        self
    }

    /// Returns a measure as a number. Missing, non-numeric and non-finite
    /// values coerce to zero.
    #[must_use]
    pub fn measure(&self, measure: Measure) -> f64 {
        let value = match measure {
            Measure::Fines => self.fines.as_ref(),
            Measure::Count => self.count.as_ref(),
            Measure::Arrests => self.arrests.as_ref(),
        };
        value.and_then(FieldValue::as_number).unwrap_or(0.0)
    }

    /// Returns the text of a categorical dimension. Always `None` for
    /// [`Dimension::Year`]; use [`Record::year`] for that.
    #[must_use]
    pub fn text(&self, dimension: Dimension) -> Option<&str> {
        match dimension {
            Dimension::Jurisdiction => self.jurisdiction.as_deref(),
            Dimension::AgeGroup => self.age_group.as_deref(),
            Dimension::DetectionMethod => self.detection_method.as_deref(),
            Dimension::Year => None,
        }
    }

    /// Returns the value of any dimension as display text.
    #[must_use]
    pub fn dimension_value(&self, dimension: Dimension) -> Option<String> {
        match dimension {
            Dimension::Year => self.year.map(|y| y.to_string()),
            _ => self.text(dimension).map(str::to_owned),
        }
    }
}

fn year_from_value(value: &FieldValue) -> Option<i32> {
    let n = value.as_number()?;
    #[allow(clippy::cast_possible_truncation)]
    (n.fract() == 0.0 && n >= f64::from(i32::MIN) && n <= f64::from(i32::MAX)).then_some(n as i32)
}

/// A named, immutable collection of [`Record`]s in file order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    kind: DatasetKind,
    records: Vec<Record>,
}

impl Dataset {
    /// Wraps loaded records.
    #[must_use]
    pub const fn new(kind: DatasetKind, records: Vec<Record>) -> Self {
        Self { kind, records }
    }

    /// The logical key this dataset was loaded under.
    #[must_use]
    pub const fn kind(&self) -> DatasetKind {
        self.kind
    }

    /// All records in file order.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
