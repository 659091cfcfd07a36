use tracing::trace;

use crate::task::Task;

/// Category/priority selection. `None` on a field means "any".
#[derive(
  Debug, Clone, Default, PartialEq, Eq,
)]
pub struct TaskFilter {
  pub category: Option<String>,
  pub priority: Option<String>
}

impl TaskFilter {
  /// Builds a filter from raw selector
  /// values, where an empty string
  /// selects everything.
  pub fn from_selection(
    category: &str,
    priority: &str
  ) -> Self {
    Self {
      category: non_empty(category),
      priority: non_empty(priority)
    }
  }

  pub fn is_empty(&self) -> bool {
    self.category.is_none()
      && self.priority.is_none()
  }

  pub fn matches(
    &self,
    task: &Task
  ) -> bool {
    if let Some(category) =
      self.category.as_deref()
      && task.category != category
    {
      return false;
    }

    if let Some(priority) =
      self.priority.as_deref()
      && task.priority != priority
    {
      return false;
    }

    true
  }

  /// Keeps matching tasks in their
  /// original order.
  pub fn apply(
    &self,
    tasks: Vec<Task>
  ) -> Vec<Task> {
    if self.is_empty() {
      return tasks;
    }

    tasks
      .into_iter()
      .filter(|task| {
        let keep = self.matches(task);
        trace!(id = task.id, keep, "filter");
        keep
      })
      .collect()
  }
}

fn non_empty(
  value: &str
) -> Option<String> {
  if value.is_empty() {
    None
  } else {
    Some(value.to_string())
  }
}
