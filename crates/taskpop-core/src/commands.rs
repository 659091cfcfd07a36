use std::fs;
use std::io::Write;

use anyhow::Context;
use chrono::Utc;
use tracing::{info, warn};

use crate::cli::Command;
use crate::datastore::KeyValueArea;
use crate::filter::TaskFilter;
use crate::manager::TaskManager;
use crate::render::Renderer;
use crate::task::Task;

#[tracing::instrument(skip(manager, renderer, out))]
pub async fn dispatch<A: KeyValueArea, W: Write>(
    manager: &TaskManager<A>,
    renderer: &mut Renderer,
    out: &mut W,
    command: Command,
) -> anyhow::Result<()> {
    match command {
        Command::Add { .. } => {
            let Some(draft) = command.into_draft() else {
                return Ok(());
            };
            match manager.create(draft, Utc::now()).await? {
                Some(task) => renderer.print_created(&mut *out, &task)?,
                None => warn!("task text is empty; nothing added"),
            }
        }
        Command::List { category, priority } => {
            let filter = TaskFilter::from_selection(&category, &priority);
            let tasks = manager.filter(&filter).await?;
            renderer.print_task_table(&mut *out, &tasks)?;
        }
        Command::Done { id } => manager.set_completed(id, true).await?,
        Command::Undone { id } => manager.set_completed(id, false).await?,
        Command::Delete { id } => manager.delete(id).await?,
        Command::Export => {
            let tasks = manager.tasks().await?;
            serde_json::to_writer_pretty(&mut *out, &tasks)?;
            writeln!(out)?;
        }
        Command::Import { file } => {
            let text = fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let tasks: Vec<Task> = serde_json::from_str(&text)
                .with_context(|| format!("failed parsing {}", file.display()))?;
            if let Some(empty) = tasks.iter().find(|task| task.text.trim().is_empty()) {
                anyhow::bail!("task {} in {} has empty text", empty.id, file.display());
            }
            info!(count = tasks.len(), file = %file.display(), "importing tasks");
            manager.replace_all(tasks).await?;
        }
    }

    Ok(())
}
