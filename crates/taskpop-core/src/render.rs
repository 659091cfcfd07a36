use std::io::{self, IsTerminal, Write};

use unicode_width::UnicodeWidthStr;

use crate::config::Config;
use crate::task::{Priority, Task};

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    /// Colour follows the `color` setting and is only used on a terminal.
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color = cfg.get_bool("color")?.unwrap_or(true);
        Ok(Self {
            color: color && io::stdout().is_terminal(),
        })
    }

    #[tracing::instrument(skip(self, out, tasks), fields(count = tasks.len()))]
    pub fn print_task_table<W: Write>(&mut self, out: W, tasks: &[Task]) -> anyhow::Result<()> {
        write_task_table(out, tasks, self.color)
    }

    #[tracing::instrument(skip(self, out, task), fields(id = task.id))]
    pub fn print_created<W: Write>(&mut self, mut out: W, task: &Task) -> anyhow::Result<()> {
        writeln!(out, "Created task {}.", task.id)?;
        Ok(())
    }
}

pub fn write_task_table<W: Write>(writer: W, tasks: &[Task], color: bool) -> anyhow::Result<()> {
    let headers = vec![
        "ID".to_string(),
        "Done".to_string(),
        "Priority".to_string(),
        "Category".to_string(),
        "Due".to_string(),
        "Text".to_string(),
    ];

    let mut rows = Vec::with_capacity(tasks.len());
    for task in tasks {
        let id = paint(&task.id.to_string(), "33", color);
        let done = if task.completed {
            paint("x", "32", color)
        } else {
            String::new()
        };

        let priority = match Priority::from_code(&task.priority) {
            Some(Priority::High) => paint(Priority::High.name(), "31", color),
            Some(other) => other.name().to_string(),
            None => String::new(),
        };

        rows.push(vec![
            id,
            done,
            priority,
            task.category.clone(),
            task.due_date.clone(),
            task.text.clone(),
        ]);
    }

    write_table(writer, headers, rows)
}

fn paint(text: &str, code: &str, color: bool) -> String {
    if !color {
        return text.to_string();
    }
    format!("\x1b[{code}m{text}\x1b[0m")
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for idx in 0..column_count {
        write!(writer, "{:width$} ", headers[idx], width = widths[idx])?;
    }
    writeln!(writer)?;

    for idx in 0..column_count {
        write!(writer, "{:-<width$} ", "", width = widths[idx])?;
    }
    writeln!(writer)?;

    for row in rows {
        for idx in 0..column_count {
            let cell = &row[idx];
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
