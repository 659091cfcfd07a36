use crate::task::Task;

pub const ATTACHMENT_CAPTION: &str = "Attachment";
pub const DELETE_CAPTION: &str = "Delete";

/// Display data for one task row in the popup list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub id: u64,
    pub completed: bool,
    pub text: String,
    pub description: String,
    /// Used as-is, even when empty.
    pub attachment_href: String,
    pub due_label: String,
    pub priority_label: &'static str,
    pub priority_class: String,
}

impl TaskRow {
    pub fn from_task(task: &Task) -> Self {
        Self {
            id: task.id,
            completed: task.completed,
            text: task.text.clone(),
            description: task.description.clone(),
            attachment_href: task.attachment.clone(),
            due_label: due_label(&task.due_date),
            priority_label: task.priority_label(),
            priority_class: format!("priority-{}", task.priority),
        }
    }
}

pub fn due_label(due_date: &str) -> String {
    if due_date.is_empty() {
        String::new()
    } else {
        format!("Due Date: {due_date}")
    }
}

/// The visible list container. Rows are appended without deduplication.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListView {
    rows: Vec<TaskRow>,
}

impl ListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[TaskRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn append(&mut self, task: &Task) {
        self.rows.push(TaskRow::from_task(task));
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Clears the list and renders `tasks` in order.
    pub fn show<'a>(&mut self, tasks: impl IntoIterator<Item = &'a Task>) {
        self.clear();
        for task in tasks {
            self.append(task);
        }
    }

    pub fn remove(&mut self, id: u64) {
        self.rows.retain(|row| row.id != id);
    }

    pub fn set_completed(&mut self, id: u64, completed: bool) {
        for row in self.rows.iter_mut().filter(|row| row.id == id) {
            row.completed = completed;
        }
    }
}
