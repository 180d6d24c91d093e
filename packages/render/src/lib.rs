#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Rendering adapter for [`ViewResult`]s.
//!
//! Renderers only lay out precomputed series. Each call builds a fresh
//! string and keeps nothing from a previous render.

use std::fmt::Write as _;

use enforcement_dash_analytics_models::view::{
    BarChart, BarRateChart, ChartMeta, GroupedBarChart, LineChart, ViewResult,
};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// Widest bar, in terminal cells.
const BAR_WIDTH: usize = 40;
const BAR_CHAR: char = '\u{2588}';
const AXIS: char = '\u{2502}';

/// Errors that can occur while rendering a view.
#[derive(Debug, Error)]
pub enum RenderError {
    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Output format of a rendered view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum OutputFormat {
    /// Terminal chart.
    #[default]
    Text,
    /// Pretty-printed JSON of the view.
    Json,
}

/// Renders `view` in the requested format.
///
/// # Errors
///
/// Returns [`RenderError::Json`] if JSON serialization fails.
pub fn render(view: &ViewResult, format: OutputFormat) -> Result<String, RenderError> {
    match format {
        OutputFormat::Text => Ok(render_text(view)),
        OutputFormat::Json => render_json(view),
    }
}

/// Pretty-printed JSON, tagged by chart kind.
///
/// # Errors
///
/// Returns [`RenderError::Json`] if serialization fails.
pub fn render_json(view: &ViewResult) -> Result<String, RenderError> {
    Ok(serde_json::to_string_pretty(view)?)
}

/// Terminal rendering with horizontal bars.
#[must_use]
pub fn render_text(view: &ViewResult) -> String {
    let mut out = String::new();
    match view {
        ViewResult::Placeholder { message } => out.push_str(message),
        ViewResult::Bars(chart) => bars(&mut out, chart),
        ViewResult::GroupedBars(chart) => grouped_bars(&mut out, chart),
        ViewResult::Lines(chart) => lines(&mut out, chart),
        ViewResult::BarsWithRate(chart) => bars_with_rate(&mut out, chart),
    }
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

fn header(out: &mut String, meta: &ChartMeta) {
    writeln!(out, "{}", meta.title).unwrap();
    writeln!(out, "{}", "=".repeat(meta.title.chars().count())).unwrap();
    writeln!(out, "{} vs {}", meta.y_label, meta.x_label).unwrap();
    out.push('\n');
}

fn bars(out: &mut String, chart: &BarChart) {
    header(out, &chart.meta);

    let max = max_of(chart.bars.iter().map(|b| b.value));
    let width = label_width(chart.bars.iter().map(|b| b.key.as_str()));

    for bar in &chart.bars {
        writeln!(
            out,
            "{:<width$} {AXIS}{} {}",
            bar.key,
            bar_of(bar.value, max),
            format_value(bar.value)
        )
        .unwrap();
    }
}

fn grouped_bars(out: &mut String, chart: &GroupedBarChart) {
    header(out, &chart.meta);

    let max = max_of(chart.series.iter().flat_map(|s| s.values.iter().copied()));
    let width = label_width(chart.series.iter().map(|s| s.label.as_str()));

    for (i, category) in chart.categories.iter().enumerate() {
        writeln!(out, "{category}").unwrap();
        for series in &chart.series {
            let value = series.values.get(i).copied().unwrap_or(0.0);
            writeln!(
                out,
                "  {:<width$} {AXIS}{} {}",
                series.label,
                bar_of(value, max),
                format_value(value)
            )
            .unwrap();
        }
    }
}

fn lines(out: &mut String, chart: &LineChart) {
    header(out, &chart.meta);

    let key_width = label_width(
        chart
            .categories
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(chart.meta.x_label.as_str())),
    );
    let widths: Vec<usize> = chart
        .series
        .iter()
        .map(|s| {
            s.values
                .iter()
                .map(|v| format_value(*v).len())
                .chain(std::iter::once(s.label.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    write!(out, "{:<key_width$}", chart.meta.x_label).unwrap();
    for (series, width) in chart.series.iter().zip(&widths) {
        write!(out, "  {:>width$}", series.label).unwrap();
    }
    out.push('\n');

    for (i, category) in chart.categories.iter().enumerate() {
        write!(out, "{category:<key_width$}").unwrap();
        for (series, width) in chart.series.iter().zip(&widths) {
            let value = series.values.get(i).copied().unwrap_or(0.0);
            write!(out, "  {:>width$}", format_value(value)).unwrap();
        }
        out.push('\n');
    }
}

fn bars_with_rate(out: &mut String, chart: &BarRateChart) {
    header(out, &chart.meta);

    let max = max_of(chart.points.iter().map(|p| p.total));
    let width = label_width(chart.points.iter().map(|p| p.key.as_str()));

    writeln!(
        out,
        "{:<width$} {AXIS}{}  ({} / {})",
        "",
        chart.total_label,
        chart.secondary_label,
        chart.rate_label
    )
    .unwrap();
    for point in &chart.points {
        writeln!(
            out,
            "{:<width$} {AXIS}{} {}  ({} / {:.2}%)",
            point.key,
            bar_of(point.total, max),
            format_value(point.total),
            format_value(point.secondary),
            point.rate
        )
        .unwrap();
    }
}

fn max_of(values: impl Iterator<Item = f64>) -> f64 {
    values.filter(|v| v.is_finite()).fold(0.0, f64::max)
}

fn label_width<'a>(labels: impl Iterator<Item = &'a str>) -> usize {
    labels.map(|l| l.chars().count()).max().unwrap_or(0)
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn bar_of(value: f64, max: f64) -> String {
    if max <= 0.0 || !value.is_finite() || value <= 0.0 {
        return String::new();
    }
    let cells = ((value / max) * BAR_WIDTH as f64).round() as usize;
    BAR_CHAR.to_string().repeat(cells.max(1))
}

/// Integral values print without a fraction, everything else with two
/// decimals.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}
