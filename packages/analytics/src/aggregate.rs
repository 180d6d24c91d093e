//! Group-by aggregation over filtered records.
//!
//! Every view is built from [`aggregate`] or [`aggregate_nested`]. Results
//! are kept in sorted maps, so the output never depends on the order of the
//! input records.

use std::borrow::Borrow;
use std::collections::BTreeMap;

use enforcement_dash_dataset_models::{Dimension, Measure, Record};

/// Sums per group key. Looking up a group that never appeared yields zero.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateResult<K: Ord> {
    sums: BTreeMap<K, f64>,
}

impl<K: Ord> Default for AggregateResult<K> {
    fn default() -> Self {
        Self {
            sums: BTreeMap::new(),
        }
    }
}

impl<K: Ord> AggregateResult<K> {
    /// Sum for `key`, or zero if the group is absent.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> f64
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.sums.get(key).copied().unwrap_or(0.0)
    }

    /// Whether `key` produced a group.
    #[must_use]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.sums.contains_key(key)
    }

    /// Group keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.sums.keys()
    }

    /// Groups and sums in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, f64)> {
        self.sums.iter().map(|(k, v)| (k, *v))
    }

    /// Number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sums.len()
    }

    /// Whether no record produced a group.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sums.is_empty()
    }

    fn add(&mut self, key: K, value: f64) {
        *self.sums.entry(key).or_insert(0.0) += finite_or_zero(value);
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Partitions `records` by `key_fn` and sums `measure_fn` per partition.
///
/// Records for which `key_fn` returns `None` are skipped. Non-finite
/// measures count as zero.
pub fn aggregate<'r, K, I, G, M>(records: I, key_fn: G, measure_fn: M) -> AggregateResult<K>
where
    K: Ord,
    I: IntoIterator<Item = &'r Record>,
    G: Fn(&Record) -> Option<K>,
    M: Fn(&Record) -> f64,
{
    let mut result = AggregateResult::default();
    for record in records {
        if let Some(key) = key_fn(record) {
            result.add(key, measure_fn(record));
        }
    }
    result
}

/// Two-level [`aggregate`]: outer key, then inner key, then sum.
///
/// A record is skipped if either key function returns `None`.
pub fn aggregate_nested<'r, K1, K2, I, G1, G2, M>(
    records: I,
    outer_fn: G1,
    inner_fn: G2,
    measure_fn: M,
) -> BTreeMap<K1, AggregateResult<K2>>
where
    K1: Ord,
    K2: Ord,
    I: IntoIterator<Item = &'r Record>,
    G1: Fn(&Record) -> Option<K1>,
    G2: Fn(&Record) -> Option<K2>,
    M: Fn(&Record) -> f64,
{
    let mut result: BTreeMap<K1, AggregateResult<K2>> = BTreeMap::new();
    for record in records {
        let (Some(outer), Some(inner)) = (outer_fn(record), inner_fn(record)) else {
            continue;
        };
        result
            .entry(outer)
            .or_default()
            .add(inner, measure_fn(record));
    }
    result
}

/// `secondary / primary * 100`.
///
/// Zero when `primary` is zero or either input is not finite, so a rate is
/// never `NaN` or infinite.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn rate(secondary: f64, primary: f64) -> f64 {
    if primary == 0.0 || !primary.is_finite() || !secondary.is_finite() {
        return 0.0;
    }
    secondary / primary * 100.0
}

/// Measure extractor for [`aggregate`].
#[must_use]
pub fn measure(measure: Measure) -> impl Fn(&Record) -> f64 {
    move |record| record.measure(measure)
}

/// Group key extractor for a categorical dimension (or the year, as text).
#[must_use]
pub fn by_dimension(dimension: Dimension) -> impl Fn(&Record) -> Option<String> {
    move |record| record.dimension_value(dimension)
}
