use std::io::{self, IsTerminal, Write};

use chrono::Local;
use unicode_width::UnicodeWidthStr;

use crate::config::Config;
use crate::filter::FilterMode;
use crate::preferences::Theme;
use crate::task::Task;
use crate::todos::TaskStats;

#[derive(Debug, Clone, Copy)]
struct Palette {
    id: &'static str,
    done: &'static str,
    active: &'static str,
    muted: &'static str,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Palette {
                id: "34",
                done: "35",
                active: "32",
                muted: "90",
            },
            Theme::Dark => Palette {
                id: "94",
                done: "95",
                active: "92",
                muted: "37",
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
    palette: Palette,
}

impl Renderer {
    /// Colour needs `color` switched on and a terminal on stdout.
    pub fn new(cfg: &Config, theme: Theme) -> Self {
        let color = cfg.get_bool("color").unwrap_or(true) && io::stdout().is_terminal();
        Self::plain(theme).with_color(color)
    }

    /// A renderer that never emits escape codes.
    pub fn plain(theme: Theme) -> Self {
        Self {
            color: false,
            palette: Palette::for_theme(theme),
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    #[tracing::instrument(skip(self, writer, view, stats))]
    pub fn write_task_list<W: Write>(
        &self,
        mut writer: W,
        view: &[&Task],
        mode: FilterMode,
        stats: TaskStats,
    ) -> anyhow::Result<()> {
        if stats.total == 0 {
            writeln!(writer, "{}", self.paint(FilterMode::All.empty_message(), self.palette.muted))?;
            return Ok(());
        }

        self.write_stats(&mut writer, stats)?;
        writeln!(writer)?;

        if view.is_empty() {
            writeln!(writer, "{}", self.paint(mode.empty_message(), self.palette.muted))?;
            return Ok(());
        }

        let headers = vec![
            "ID".to_string(),
            "Done".to_string(),
            "Created".to_string(),
            "Text".to_string(),
        ];

        let rows = view
            .iter()
            .map(|task| {
                let done = if task.completed {
                    self.paint("[x]", self.palette.done)
                } else {
                    self.paint("[ ]", self.palette.active)
                };
                let created = task
                    .created_at
                    .with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M")
                    .to_string();
                vec![
                    self.paint(&task.id.to_string(), self.palette.id),
                    done,
                    created,
                    task.text.clone(),
                ]
            })
            .collect();

        write_table(&mut writer, headers, rows)?;
        if stats.completed > 0 && mode != FilterMode::Active {
            writeln!(
                writer,
                "{}",
                self.paint("Run `ticklist clear-completed` to remove finished tasks.", self.palette.muted)
            )?;
        }
        Ok(())
    }

    pub fn write_stats<W: Write>(&self, mut writer: W, stats: TaskStats) -> anyhow::Result<()> {
        writeln!(
            writer,
            "Total: {}  Active: {}  Completed: {}",
            stats.total,
            self.paint(&stats.active.to_string(), self.palette.active),
            self.paint(&stats.completed.to_string(), self.palette.done),
        )?;
        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths: Vec<usize> = headers
        .iter()
        .map(|header| UnicodeWidthStr::width(header.as_str()))
        .collect();

    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    let last = column_count.saturating_sub(1);
    for (idx, header) in headers.iter().enumerate() {
        if idx == last {
            write!(writer, "{header}")?;
        } else {
            write!(writer, "{:width$} ", header, width = widths[idx])?;
        }
    }
    writeln!(writer)?;

    for (idx, width) in widths.iter().enumerate() {
        let sep = if idx == last { "" } else { " " };
        write!(writer, "{:-<width$}{sep}", "", width = *width)?;
    }
    writeln!(writer)?;

    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            if idx == last {
                write!(writer, "{cell}")?;
                continue;
            }
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}
