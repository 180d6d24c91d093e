//! Chart-ready series produced by the view recipes.
//!
//! Everything here is precomputed: a renderer only lays these values out and
//! never groups or sums anything itself.

use serde::{Deserialize, Serialize};

/// Title and axis labels shared by every chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    /// Chart title.
    pub title: String,
    /// Category axis label.
    pub x_label: String,
    /// Value axis label.
    pub y_label: String,
}

/// One bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarPoint {
    /// Group label.
    pub key: String,
    /// Summed measure.
    pub value: f64,
}

/// Single-series bar chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarChart {
    /// Title and axes.
    pub meta: ChartMeta,
    /// Bar fill colour (CSS hex).
    pub color: String,
    /// Bars in display order.
    pub bars: Vec<BarPoint>,
}

/// One series of a multi-series chart. `values` is aligned index-for-index
/// with the chart's category list; missing groups are zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSeries {
    /// Raw metric name as it appears in the data.
    pub metric: String,
    /// Human-readable legend label.
    pub label: String,
    /// Series colour (CSS hex).
    pub color: String,
    /// One value per category.
    pub values: Vec<f64>,
}

/// Clustered bars: one cluster per category, one bar per series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedBarChart {
    /// Title and axes.
    pub meta: ChartMeta,
    /// Cluster labels in display order.
    pub categories: Vec<String>,
    /// One entry per metric.
    pub series: Vec<MetricSeries>,
}

/// Multi-series line chart over an ordered category axis (usually years).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineChart {
    /// Title and axes.
    pub meta: ChartMeta,
    /// X-axis labels in display order.
    pub categories: Vec<String>,
    /// One line per metric.
    pub series: Vec<MetricSeries>,
}

/// Totals plus a derived percentage for one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatePoint {
    /// Group label.
    pub key: String,
    /// Denominator (e.g. tests conducted).
    pub total: f64,
    /// Numerator (e.g. positive tests, arrests).
    pub secondary: f64,
    /// `secondary / total * 100`, zero when `total` is zero.
    pub rate: f64,
}

/// Bars of totals overlaid with a line of rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarRateChart {
    /// Title and axes.
    pub meta: ChartMeta,
    /// Legend label of the bars.
    pub total_label: String,
    /// Legend label of the numerator.
    pub secondary_label: String,
    /// Legend label of the rate line.
    pub rate_label: String,
    /// Bar fill colour (CSS hex).
    pub color: String,
    /// Points in display order.
    pub points: Vec<RatePoint>,
}

/// Output of a view recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ViewResult {
    /// Nothing to chart for the current filters.
    Placeholder {
        /// Text shown in place of the chart.
        message: String,
    },
    /// Single-series bars.
    Bars(BarChart),
    /// Clustered bars.
    GroupedBars(GroupedBarChart),
    /// Multi-series lines.
    Lines(LineChart),
    /// Bars with a rate line.
    BarsWithRate(BarRateChart),
}

impl ViewResult {
    /// Builds a placeholder.
    #[must_use]
    pub fn placeholder(message: impl Into<String>) -> Self {
        Self::Placeholder {
            message: message.into(),
        }
    }

    /// Whether this is the "no data" state.
    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder { .. })
    }

    /// Chart metadata, `None` for placeholders.
    #[must_use]
    pub const fn meta(&self) -> Option<&ChartMeta> {
        match self {
            Self::Placeholder { .. } => None,
            Self::Bars(c) => Some(&c.meta),
            Self::GroupedBars(c) => Some(&c.meta),
            Self::Lines(c) => Some(&c.meta),
            Self::BarsWithRate(c) => Some(&c.meta),
        }
    }
}
