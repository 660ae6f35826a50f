use std::io::Write;

use tracing::{debug, info, instrument, warn};

use crate::app::App;
use crate::cli::{Command, ThemeAction, join_text};
use crate::config::Config;
use crate::datastore::KeyValueBackend;
use crate::render::Renderer;

#[instrument(skip(app, cfg, out))]
pub fn dispatch<B: KeyValueBackend, W: Write>(
    app: &mut App<B>,
    cfg: &Config,
    command: Command,
    mut out: W,
) -> anyhow::Result<()> {
    debug!(mutating = command.is_mutating(), "dispatching command");

    match command {
        Command::Add { text } => {
            let text = join_text(&text);
            match app.todos.create(&text)? {
                Some(id) => writeln!(out, "Created task {id}.")?,
                None => writeln!(out, "Nothing to add.")?,
            }
        }
        Command::Toggle { id } => {
            if app.todos.toggle(id)? {
                let state = match app.todos.get(id) {
                    Some(task) if task.completed => "completed",
                    _ => "active",
                };
                writeln!(out, "Task {id} is now {state}.")?;
            } else {
                warn!(id, "no task with that id");
                writeln!(out, "No task {id}.")?;
            }
        }
        Command::Delete { id } => {
            if app.todos.delete(id)? {
                writeln!(out, "Deleted task {id}.")?;
            } else {
                warn!(id, "no task with that id");
                writeln!(out, "No task {id}.")?;
            }
        }
        Command::Edit { id, text } => {
            if app.todos.edit(id, &join_text(&text))? {
                writeln!(out, "Edited task {id}.")?;
            } else {
                warn!(id, "no task with that id");
                writeln!(out, "No task {id}.")?;
            }
        }
        Command::ClearCompleted => {
            let removed = app.todos.clear_completed()?;
            info!(removed, "command clear-completed");
            writeln!(out, "Cleared {removed} completed task(s).")?;
        }
        Command::List { filter } => {
            let mode = match filter {
                Some(mode) => mode,
                None => cfg.default_filter()?,
            };
            app.todos.set_filter(mode);
            let renderer = Renderer::new(cfg, app.prefs.theme());
            renderer.write_task_list(
                &mut out,
                &app.todos.filtered_view(),
                app.todos.filter(),
                app.todos.stats(),
            )?;
        }
        Command::Stats => {
            let renderer = Renderer::new(cfg, app.prefs.theme());
            renderer.write_stats(&mut out, app.todos.stats())?;
        }
        Command::Theme { action } => {
            let dark = match action {
                ThemeAction::Show => app.prefs.dark_mode(),
                ThemeAction::Toggle => app.prefs.toggle()?,
            };
            let name = if dark { "dark" } else { "light" };
            writeln!(out, "Theme: {name}")?;
        }
    }

    Ok(())
}
