//! Menu-driven dashboard using `dialoguer`.
//!
//! Each pass picks a tab, asks for a value per offered filter dimension and
//! prints the resulting chart. The loop owns the only [`FilterState`] and
//! replaces it after every answer.

use dialoguer::Select;
use enforcement_dash_analytics::{options_for, render_view};
use enforcement_dash_analytics_models::FilterState;
use enforcement_dash_dataset::DatasetStore;
use enforcement_dash_dataset_models::DatasetKind;

use crate::config::DashboardConfig;

/// What to do after a chart has been shown.
enum NextAction {
    ChangeFilters,
    SwitchTab,
    Quit,
}

impl NextAction {
    const ALL: &[Self] = &[Self::ChangeFilters, Self::SwitchTab, Self::Quit];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::ChangeFilters => "Change filters",
            Self::SwitchTab => "Switch tab",
            Self::Quit => "Quit",
        }
    }
}

/// Runs the interactive dashboard until the user quits.
///
/// # Errors
///
/// Returns an error if a prompt fails or a view cannot be built.
pub fn run(store: &DatasetStore, config: &DashboardConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut tab = pick_tab()?;

    loop {
        let state = pick_filters(store, config, tab)?;
        let view = render_view(store, &state, &config.views)?;

        println!();
        print!("{}", enforcement_dash_render::render_text(&view));
        println!();

        let labels: Vec<&str> = NextAction::ALL.iter().map(NextAction::label).collect();
        let idx = Select::new()
            .with_prompt("What next?")
            .items(&labels)
            .default(0)
            .interact()?;

        match NextAction::ALL[idx] {
            NextAction::ChangeFilters => {}
            NextAction::SwitchTab => tab = pick_tab()?,
            NextAction::Quit => return Ok(()),
        }
    }
}

fn pick_tab() -> Result<DatasetKind, Box<dyn std::error::Error>> {
    let labels: Vec<&str> = DatasetKind::all().iter().map(|k| k.label()).collect();

    let idx = Select::new()
        .with_prompt("Which tab?")
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(DatasetKind::all()[idx])
}

/// Prompts once per offered dimension, starting from an unconstrained
/// state for `tab`.
fn pick_filters(
    store: &DatasetStore,
    config: &DashboardConfig,
    tab: DatasetKind,
) -> Result<FilterState, Box<dyn std::error::Error>> {
    let options = options_for(store, tab, &config.options)?;
    let mut state = FilterState::new(tab);

    for (dimension, values) in options.iter() {
        let idx = Select::new()
            .with_prompt(dimension.label())
            .items(values)
            .default(0)
            .max_length(15)
            .interact()?;
        state = state.with_selection(dimension, values[idx].as_str());
    }

    log::debug!("[{tab}] Filters: {state:?}");

    Ok(state)
}
