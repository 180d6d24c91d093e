#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Police enforcement dashboard.
//!
//! Loads the four enforcement datasets in parallel, then either runs the
//! interactive menu (no subcommand) or executes a single scripted command.
//!
//! Uses `indicatif-log-bridge` (via [`enforcement_dash_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and the load progress bar never fight for the terminal.

mod config;
mod interactive;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use enforcement_dash_analytics::{options_for, render_view, unfiltered_views};
use enforcement_dash_analytics_models::{Dimension, FilterState};
use enforcement_dash_cli_utils::{IndicatifProgress, MultiProgress};
use enforcement_dash_dataset::{DatasetStore, load_store};
use enforcement_dash_dataset_models::DatasetKind;
use enforcement_dash_render::OutputFormat;

use crate::config::DashboardConfig;

#[derive(Parser)]
#[command(name = "enforcement_dash", about = "Police enforcement dashboard")]
struct Cli {
    /// Path to a `dashboard.toml` replacing the embedded default
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory containing the dataset CSV files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the filter options offered on a tab
    Options {
        /// Tab (`fines`, `alcohol`, `breath`, `drug`)
        #[arg(long)]
        tab: DatasetKind,
    },
    /// Print the view of one tab for the given filters
    Render {
        /// Tab (`fines`, `alcohol`, `breath`, `drug`)
        #[arg(long)]
        tab: DatasetKind,
        /// Jurisdiction, e.g. `NSW`
        #[arg(long)]
        jurisdiction: Option<String>,
        /// Year, e.g. `2023`
        #[arg(long)]
        year: Option<String>,
        /// Age group, e.g. `17-25`
        #[arg(long)]
        age_group: Option<String>,
        /// Detection method (drug tab only)
        #[arg(long)]
        detection_method: Option<String>,
        /// Output format (`text` or `json`)
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Write the unfiltered view of every tab as `<tab>.json`
    Export {
        /// Output directory, created if missing
        #[arg(long)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = enforcement_dash_cli_utils::init_logger();
    let cli = Cli::parse();

    let mut config = DashboardConfig::load(cli.config.as_deref())?;
    if let Some(data_dir) = &cli.data_dir {
        config.datasets = config.datasets.with_data_dir(data_dir);
    }

    let store = load(&multi, &config).await?;

    let Some(command) = cli.command else {
        return interactive::run(&store, &config);
    };

    match command {
        Commands::Options { tab } => {
            let options = options_for(&store, tab, &config.options)?;
            println!("{}", tab.label());
            println!("{}", "-".repeat(50));
            for (dimension, values) in options.iter() {
                println!("{:<20} {}", dimension.label(), values.join(", "));
            }
        }
        Commands::Render {
            tab,
            jurisdiction,
            year,
            age_group,
            detection_method,
            format,
        } => {
            let state = filter_state(
                tab,
                [
                    (Dimension::Jurisdiction, jurisdiction),
                    (Dimension::Year, year),
                    (Dimension::AgeGroup, age_group),
                    (Dimension::DetectionMethod, detection_method),
                ],
            );

            let view = render_view(&store, &state, &config.views)?;
            let rendered = enforcement_dash_render::render(&view, format)?;
            println!("{}", rendered.trim_end());
        }
        Commands::Export { output } => export(&store, &config, &output)?,
    }

    Ok(())
}

/// Folds the `render` flags into a state for `tab`. Absent flags and `All`
/// leave their dimension unconstrained.
fn filter_state(
    tab: DatasetKind,
    selections: impl IntoIterator<Item = (Dimension, Option<String>)>,
) -> FilterState {
    selections
        .into_iter()
        .filter_map(|(dimension, value)| value.map(|v| (dimension, v)))
        .fold(FilterState::new(tab), |state, (dimension, value)| {
            state.with_selection(dimension, value)
        })
}

async fn load(
    multi: &MultiProgress,
    config: &DashboardConfig,
) -> Result<DatasetStore, Box<dyn std::error::Error>> {
    log::info!("Loading datasets from {}", config.datasets.data_dir.display());
    let progress = IndicatifProgress::datasets_bar(multi, "Loading datasets");
    Ok(load_store(&config.datasets, &progress).await?)
}

fn export(
    store: &DatasetStore,
    config: &DashboardConfig,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(output)?;

    for (tab, view) in unfiltered_views(store, &config.views)? {
        let path = output.join(format!("{tab}.json"));
        std::fs::write(&path, enforcement_dash_render::render_json(&view)?)?;
        log::info!(
            "[{tab}] Wrote {} ({})",
            path.display(),
            view.meta().map_or("no data", |meta| meta.title.as_str())
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_flags_become_selections() {
        let state = filter_state(
            DatasetKind::Drug,
            [
                (Dimension::Jurisdiction, Some("NSW".to_string())),
                (Dimension::Year, None),
                (Dimension::DetectionMethod, Some("Roadside drug test".to_string())),
            ],
        );

        assert_eq!(state.tab(), DatasetKind::Drug);
        assert_eq!(state.selection(Dimension::Jurisdiction).value(), Some("NSW"));
        assert!(state.selection(Dimension::Year).is_all());
        assert_eq!(
            state.selection(Dimension::DetectionMethod).value(),
            Some("Roadside drug test")
        );
    }

    #[test]
    fn year_all_leaves_year_unconstrained() {
        let state = filter_state(
            DatasetKind::Fines,
            [
                (Dimension::Year, Some("All".to_string())),
                (Dimension::AgeGroup, Some(String::new())),
            ],
        );
        assert_eq!(state, FilterState::new(DatasetKind::Fines));
        assert_eq!(state.active().count(), 0);
    }

    #[test]
    fn cli_parses_render_flags() {
        let cli = Cli::try_parse_from([
            "enforcement_dash",
            "render",
            "--tab",
            "drug",
            "--year",
            "All",
            "--format",
            "json",
        ])
        .unwrap();

        let Some(Commands::Render {
            tab, year, format, ..
        }) = cli.command
        else {
            panic!("expected render");
        };
        assert_eq!(tab, DatasetKind::Drug);
        assert_eq!(year.as_deref(), Some("All"));
        assert_eq!(format, OutputFormat::Json);
    }
}
