use std::fmt;

use anyhow::Result;
use cityweather_core::{TableMode, WeatherApp};
use inquire::{InquireError, Select, Text};

use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Search,
    ClearSearch,
    AddFavorite,
    ToggleUnits,
    Edit,
    Delete,
    SaveEdit,
    CancelEdit,
    Quit,
}

/// Menu entry; the toggle label depends on the current units.
struct MenuItem {
    action: Action,
    label: String,
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

fn menu(app: &WeatherApp) -> Vec<MenuItem> {
    let item = |action, label: &str| MenuItem { action, label: label.to_string() };

    let mut items = vec![item(Action::Search, "Get Weather")];
    if !app.city().trim().is_empty() || app.weather().is_some() {
        items.push(item(Action::ClearSearch, "Clear search"));
    }
    if !app.city().trim().is_empty() {
        items.push(item(Action::AddFavorite, "Add to Favorites"));
    }
    items.push(MenuItem { action: Action::ToggleUnits, label: render::toggle_label(app) });

    match app.table_mode() {
        TableMode::Editing { .. } => {
            items.push(item(Action::SaveEdit, "Save edit"));
            items.push(item(Action::CancelEdit, "Cancel edit"));
        }
        TableMode::Viewing if !app.favorites().is_empty() => {
            items.push(item(Action::Edit, "Edit a favorite"));
            items.push(item(Action::Delete, "Delete a favorite"));
        }
        TableMode::Viewing => {}
    }

    items.push(item(Action::Quit, "Quit"));
    items
}

/// Ask which favorite to act on; `None` if the prompt was dismissed.
fn pick_favorite(app: &WeatherApp, prompt: &str) -> Result<Option<usize>> {
    let options: Vec<String> =
        app.favorites().iter().enumerate().map(|(i, c)| format!("{}. {c}", i + 1)).collect();

    match Select::new(prompt, options).raw_prompt() {
        Ok(choice) => Ok(Some(choice.index)),
        Err(InquireError::OperationCanceled) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn draw(app: &WeatherApp) {
    println!();
    print!("{}", render::search_results(app));
    if !app.favorites().is_empty() {
        print!("{}", render::favorites_table(app));
    }
}

/// Run the widget until the user quits or interrupts.
pub async fn run(app: &mut WeatherApp) -> Result<()> {
    app.init().await;

    loop {
        draw(app);

        let action = match Select::new("What next?", menu(app)).prompt() {
            Ok(item) => item.action,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                Action::Quit
            }
            Err(e) => return Err(e.into()),
        };

        match action {
            Action::Search => {
                let city = Text::new("City:")
                    .with_initial_value(app.city())
                    .with_placeholder("Enter city name...")
                    .prompt_skippable()?;
                if let Some(city) = city {
                    app.search_city(&city).await;
                }
            }
            Action::ClearSearch => app.clear_search(),
            Action::AddFavorite => {
                if let Err(e) = app.add_favorite().await {
                    tracing::warn!(error = %e, "could not add favorite");
                    println!("{}", e.user_message());
                }
            }
            Action::ToggleUnits => app.toggle_units().await,
            Action::Edit => {
                if let Some(index) = pick_favorite(app, "Edit which favorite?")? {
                    app.start_edit(index)?;
                    let current = app.favorites()[index].clone();
                    let text =
                        Text::new("New name:").with_initial_value(&current).prompt_skippable()?;
                    match text {
                        Some(text) => app.set_edit_text(text),
                        None => app.cancel_edit(),
                    }
                }
            }
            Action::Delete => {
                if let Some(index) = pick_favorite(app, "Delete which favorite?")? {
                    if let Err(e) = app.remove_favorite(index).await {
                        tracing::warn!(error = %e, "could not delete favorite");
                        println!("{}", e.user_message());
                    }
                }
            }
            Action::SaveEdit => {
                if let Err(e) = app.save_edit().await {
                    tracing::warn!(error = %e, "could not rename favorite");
                    println!("{}", e.user_message());
                }
            }
            Action::CancelEdit => app.cancel_edit(),
            Action::Quit => return Ok(()),
        }
    }
}
