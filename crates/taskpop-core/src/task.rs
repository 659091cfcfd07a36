use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "1" => Some(Self::Low),
            "2" => Some(Self::Medium),
            "3" => Some(Self::High),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Low => "1",
            Self::Medium => "2",
            Self::High => "3",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low Priority",
            Self::Medium => "Medium Priority",
            Self::High => "High Priority",
        }
    }

    /// Short name used by selectors ("Low", "Medium", "High").
    pub fn name(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

/// Badge text for a stored priority code. Unknown or empty codes map to "".
pub fn priority_label(code: &str) -> &'static str {
    Priority::from_code(code).map(Priority::label).unwrap_or("")
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: u64,

    #[serde(default, deserialize_with = "lenient_string")]
    pub text: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub priority: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub category: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub attachment: String,

    #[serde(default, deserialize_with = "lenient_bool")]
    pub completed: bool,

    #[serde(default, rename = "dueDate", deserialize_with = "lenient_string")]
    pub due_date: String,

    // Reserved; written as null and never interpreted.
    #[serde(default)]
    pub reminder: Option<serde_json::Value>,

    #[serde(default)]
    pub recurring: Option<serde_json::Value>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Task {
    pub fn from_draft(draft: TaskDraft, id: u64) -> Self {
        Self {
            id,
            text: draft.text,
            description: draft.description,
            priority: draft.priority,
            category: draft.category,
            attachment: draft.attachment,
            completed: false,
            due_date: draft.due_date,
            reminder: None,
            recurring: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn priority_label(&self) -> &'static str {
        priority_label(&self.priority)
    }
}

// Older popups stored whatever the form produced, e.g. numeric priorities.
// One odd field must not make the whole collection unreadable.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(text) => text,
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        other => other.to_string(),
    })
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(flag) => flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => text.trim().eq_ignore_ascii_case("true"),
        _ => false,
    })
}

/// Form input for a new task, as read from the popup or the CLI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub text: String,
    pub description: String,
    pub priority: String,
    pub category: String,
    pub attachment: String,
    pub due_date: String,
}

impl TaskDraft {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Trims the free-text inputs. Returns `None` when no task text remains.
    pub fn normalized(self) -> Option<Self> {
        let text = self.text.trim().to_string();
        if text.is_empty() {
            return None;
        }

        Some(Self {
            text,
            description: self.description.trim().to_string(),
            priority: self.priority,
            category: self.category,
            attachment: self.attachment.trim().to_string(),
            due_date: self.due_date.trim().to_string(),
        })
    }
}

/// Millisecond timestamp id, bumped past the largest existing id so that two
/// tasks created within the same millisecond stay distinct.
pub fn next_task_id(now: DateTime<Utc>, existing: &[Task]) -> u64 {
    let stamp = u64::try_from(now.timestamp_millis()).unwrap_or(0);
    let floor = existing
        .iter()
        .map(|task| task.id)
        .max()
        .map(|max| max.saturating_add(1))
        .unwrap_or(0);
    stamp.max(floor)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn priority_label_is_total() {
        assert_eq!(priority_label("1"), "Low Priority");
        assert_eq!(priority_label("2"), "Medium Priority");
        assert_eq!(priority_label("3"), "High Priority");
        assert_eq!(priority_label(""), "");
        assert_eq!(priority_label("4"), "");
        assert_eq!(priority_label("high"), "");
        assert_eq!(priority_label(" 1"), "");
    }

    #[test]
    fn draft_normalization_trims_free_text_only() {
        let draft = TaskDraft {
            text: "  Buy milk ".to_string(),
            description: " 2 litres ".to_string(),
            priority: "2".to_string(),
            category: "errand".to_string(),
            attachment: " https://example.com/list ".to_string(),
            due_date: " 2026-10-20 ".to_string(),
        };

        let normalized = draft.normalized().expect("text is present");
        assert_eq!(normalized.text, "Buy milk");
        assert_eq!(normalized.description, "2 litres");
        assert_eq!(normalized.attachment, "https://example.com/list");
        assert_eq!(normalized.due_date, "2026-10-20");
        assert_eq!(normalized.category, "errand");

        assert!(TaskDraft::new(" \t\n ").normalized().is_none());
    }

    #[test]
    fn serialized_task_uses_popup_field_names() {
        let task = Task::from_draft(TaskDraft::new("Pay bills"), 1_700_000_000_000);
        let json = serde_json::to_value(&task).expect("serialize");

        assert_eq!(json["id"], 1_700_000_000_000_u64);
        assert_eq!(json["dueDate"], "");
        assert_eq!(json["completed"], false);
        assert!(json["reminder"].is_null());
        assert!(json["recurring"].is_null());
        assert!(json.get("due_date").is_none());
    }

    #[test]
    fn sparse_stored_task_gets_defaults() {
        let task: Task =
            serde_json::from_str(r#"{"id": 5, "text": "old"}"#).expect("deserialize");
        assert_eq!(task.text, "old");
        assert!(!task.completed);
        assert_eq!(task.priority, "");
        assert!(task.extra.is_empty());
    }

    #[test]
    fn mistyped_fields_are_coerced_not_rejected() {
        let tasks: Vec<Task> = serde_json::from_str(
            r#"[{"id":1,"text":"ok","priority":"2"},
                {"id":2,"text":"legacy","priority":3},
                {"id":3,"text":null,"category":false,"completed":1}]"#,
        )
        .expect("deserialize");

        assert_eq!(tasks[0].priority, "2");
        assert_eq!(tasks[1].priority, "3");
        assert_eq!(tasks[1].priority_label(), "High Priority");
        assert_eq!(tasks[2].text, "");
        assert_eq!(tasks[2].category, "false");
        assert!(tasks[2].completed);
    }

    #[test]
    fn next_id_follows_clock_and_never_repeats() {
        let now = Utc
            .timestamp_millis_opt(1_700_000_000_000)
            .single()
            .expect("valid timestamp");
        assert_eq!(next_task_id(now, &[]), 1_700_000_000_000);

        let first = Task::from_draft(TaskDraft::new("a"), next_task_id(now, &[]));
        let second_id = next_task_id(now, std::slice::from_ref(&first));
        assert_eq!(second_id, 1_700_000_000_001);

        let older = Task::from_draft(TaskDraft::new("b"), 10);
        assert_eq!(next_task_id(now, &[older]), 1_700_000_000_000);
    }
}
