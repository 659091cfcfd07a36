use chrono::{DateTime, Utc};
use futures::lock::Mutex;
use tracing::{debug, info};

use crate::datastore::{KeyValueArea, TaskGateway};
use crate::filter::TaskFilter;
use crate::task::{Task, TaskDraft, next_task_id};

/// Command handlers over the stored task collection.
///
/// Every command reads the full collection, computes the new one and writes
/// it back while holding the gateway lock, so commands issued through one
/// manager never interleave their read and write.
#[derive(Debug)]
pub struct TaskManager<A> {
    gateway: Mutex<TaskGateway<A>>,
}

impl<A: KeyValueArea> TaskManager<A> {
    pub fn new(area: A, key: impl Into<String>) -> Self {
        Self {
            gateway: Mutex::new(TaskGateway::new(area, key)),
        }
    }

    pub fn into_gateway(self) -> TaskGateway<A> {
        self.gateway.into_inner()
    }

    #[tracing::instrument(skip(self))]
    pub async fn tasks(&self) -> anyhow::Result<Vec<Task>> {
        let gateway = self.gateway.lock().await;
        gateway.load().await
    }

    /// Returns `None` without touching storage when the draft has no text.
    #[tracing::instrument(skip(self, draft, now))]
    pub async fn create(
        &self,
        draft: TaskDraft,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<Task>> {
        let Some(draft) = draft.normalized() else {
            debug!("ignoring task with empty text");
            return Ok(None);
        };

        let mut gateway = self.gateway.lock().await;
        let mut tasks = gateway.load().await?;

        let task = Task::from_draft(draft, next_task_id(now, &tasks));
        tasks.push(task.clone());
        gateway.save(&tasks).await?;

        info!(id = task.id, count = tasks.len(), "created task");
        Ok(Some(task))
    }

    #[tracing::instrument(skip(self))]
    pub async fn set_completed(&self, id: u64, completed: bool) -> anyhow::Result<()> {
        let mut gateway = self.gateway.lock().await;
        let mut tasks = gateway.load().await?;

        let mut touched = 0_usize;
        for task in tasks.iter_mut().filter(|task| task.id == id) {
            task.completed = completed;
            touched += 1;
        }
        if touched == 0 {
            debug!(id, "no task with this id to update");
        }

        gateway.save(&tasks).await?;
        info!(id, completed, "updated task completion");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: u64) -> anyhow::Result<()> {
        let mut gateway = self.gateway.lock().await;
        let tasks = gateway.load().await?;

        let before = tasks.len();
        let kept: Vec<Task> = tasks.into_iter().filter(|task| task.id != id).collect();
        if kept.len() == before {
            debug!(id, "no task with this id to delete");
        }

        gateway.save(&kept).await?;
        info!(id, removed = before - kept.len(), "deleted task");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn filter(&self, filter: &TaskFilter) -> anyhow::Result<Vec<Task>> {
        let gateway = self.gateway.lock().await;
        let tasks = gateway.load().await?;
        let visible = filter.apply(tasks);
        debug!(visible = visible.len(), "filtered tasks");
        Ok(visible)
    }

    /// Replaces the whole collection.
    #[tracing::instrument(skip(self, tasks), fields(count = tasks.len()))]
    pub async fn replace_all(&self, tasks: Vec<Task>) -> anyhow::Result<()> {
        let mut gateway = self.gateway.lock().await;
        gateway.save(&tasks).await?;
        info!("replaced task collection");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use futures::executor::block_on;

    use super::*;
    use crate::datastore::MemoryArea;

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).single().expect("valid timestamp")
    }

    fn draft(text: &str, priority: &str, category: &str) -> TaskDraft {
        TaskDraft {
            text: text.to_string(),
            priority: priority.to_string(),
            category: category.to_string(),
            ..TaskDraft::default()
        }
    }

    #[test]
    fn create_appends_exactly_one_task() {
        let manager = TaskManager::new(MemoryArea::new(), "tasks");

        let created = block_on(manager.create(draft("Buy milk", "2", "errand"), at(1_000)))
            .expect("create")
            .expect("task created");
        assert_eq!(created.id, 1_000);
        assert!(!created.completed);
        assert!(created.reminder.is_none());

        let tasks = block_on(manager.tasks()).expect("load");
        assert_eq!(tasks, vec![created]);
    }

    #[test]
    fn whitespace_text_writes_nothing() {
        let manager = TaskManager::new(MemoryArea::new(), "tasks");

        let created = block_on(manager.create(draft("   ", "3", "work"), at(1)))
            .expect("create");
        assert!(created.is_none());

        let gateway = manager.into_gateway();
        assert!(gateway.area().raw("tasks").is_none());
    }

    #[test]
    fn numeric_priority_in_storage_does_not_block_create() {
        let mut area = MemoryArea::new();
        block_on(area.set(
            "tasks",
            serde_json::json!([
                {"id": 1, "text": "ok", "priority": "2"},
                {"id": 2, "text": "legacy", "priority": 3}
            ]),
        ))
        .expect("seed");
        let manager = TaskManager::new(area, "tasks");

        let created = block_on(manager.create(draft("new", "1", ""), at(50)))
            .expect("create")
            .expect("task created");
        assert_eq!(created.id, 50);

        let tasks = block_on(manager.tasks()).expect("load");
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[1].priority, "3");
        let gateway = manager.into_gateway();
        let stored = gateway.area().raw("tasks").expect("stored");
        assert_eq!(stored[1]["priority"], "3");
    }

    #[test]
    fn toggling_touches_only_the_completed_flag() {
        let manager = TaskManager::new(MemoryArea::new(), "tasks");
        block_on(manager.create(draft("a", "1", "work"), at(10))).expect("create a");
        block_on(manager.create(draft("b", "2", "home"), at(20))).expect("create b");
        let before = block_on(manager.tasks()).expect("load");

        block_on(manager.set_completed(20, true)).expect("toggle");
        let after = block_on(manager.tasks()).expect("load");

        assert_eq!(after[0], before[0]);
        let mut expected = before[1].clone();
        expected.completed = true;
        assert_eq!(after[1], expected);

        block_on(manager.set_completed(20, false)).expect("toggle back");
        assert_eq!(block_on(manager.tasks()).expect("load"), before);
    }

    #[test]
    fn deleting_unknown_id_is_a_noop() {
        let manager = TaskManager::new(MemoryArea::new(), "tasks");
        block_on(manager.create(draft("a", "", ""), at(10))).expect("create");
        let before = block_on(manager.tasks()).expect("load");

        block_on(manager.delete(999)).expect("delete");
        assert_eq!(block_on(manager.tasks()).expect("load"), before);

        block_on(manager.delete(10)).expect("delete");
        assert!(block_on(manager.tasks()).expect("load").is_empty());
    }

    #[test]
    fn concurrent_creates_are_not_lost() {
        let manager = TaskManager::new(MemoryArea::new(), "tasks");

        let (a, b) = block_on(futures::future::join(
            manager.create(draft("first", "", ""), at(5)),
            manager.create(draft("second", "", ""), at(5)),
        ));
        let a = a.expect("create first").expect("first created");
        let b = b.expect("create second").expect("second created");
        assert_ne!(a.id, b.id);

        let tasks = block_on(manager.tasks()).expect("load");
        let texts: Vec<&str> = tasks.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }
}
