use std::collections::BTreeMap;

use anyhow::Context;
use serde_json::Value;
use tracing::debug;

use crate::task::Task;

pub const DEFAULT_TASKS_KEY: &str = "tasks";

/// An asynchronous key-value storage scope, e.g. `chrome.storage.local`.
///
/// Futures are not `Send`: the popup runs on the browser's single thread.
#[allow(async_fn_in_trait)]
pub trait KeyValueArea {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Value>>;

    async fn set(&mut self, key: &str, value: Value) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryArea {
    entries: BTreeMap<String, Value>,
}

impl MemoryArea {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }
}

impl KeyValueArea for MemoryArea {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Value>> {
        Ok(self.entries.get(key).cloned())
    }

    async fn set(&mut self, key: &str, value: Value) -> anyhow::Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// Loads and saves the whole task collection under one key.
#[derive(Debug)]
pub struct TaskGateway<A> {
    area: A,
    key: String,
}

impl<A: KeyValueArea> TaskGateway<A> {
    pub fn new(area: A, key: impl Into<String>) -> Self {
        Self {
            area,
            key: key.into(),
        }
    }

    pub fn area(&self) -> &A {
        &self.area
    }

    pub fn into_area(self) -> A {
        self.area
    }

    /// An absent key reads as an empty collection; read and decode failures
    /// are errors.
    #[tracing::instrument(skip(self), fields(key = %self.key))]
    pub async fn load(&self) -> anyhow::Result<Vec<Task>> {
        let stored = self
            .area
            .get(&self.key)
            .await
            .context("failed to load tasks")?;

        let tasks = match stored {
            None | Some(Value::Null) => vec![],
            Some(value) => serde_json::from_value::<Vec<Task>>(value)
                .with_context(|| format!("failed to decode tasks under key {:?}", self.key))?,
        };

        debug!(count = tasks.len(), "loaded tasks");
        Ok(tasks)
    }

    #[tracing::instrument(skip(self, tasks), fields(key = %self.key, count = tasks.len()))]
    pub async fn save(&mut self, tasks: &[Task]) -> anyhow::Result<()> {
        let value = serde_json::to_value(tasks).context("failed to encode tasks")?;
        self.area
            .set(&self.key, value)
            .await
            .context("failed to save tasks")?;
        debug!("saved tasks");
        Ok(())
    }
}

#[cfg(feature = "native")]
pub use file_area::JsonFileArea;

#[cfg(feature = "native")]
mod file_area {
    use std::fs;
    use std::io::Write;
    use std::path::{Path, PathBuf};

    use anyhow::{Context, anyhow};
    use serde_json::{Map, Value};
    use tempfile::NamedTempFile;
    use tracing::{debug, info};

    use super::KeyValueArea;

    /// A key-value area backed by one JSON object file.
    #[derive(Debug)]
    pub struct JsonFileArea {
        pub path: PathBuf,
    }

    impl JsonFileArea {
        #[tracing::instrument(skip(path))]
        pub fn open(path: &Path) -> anyhow::Result<Self> {
            if let Some(dir) = path.parent()
                && !dir.as_os_str().is_empty()
            {
                fs::create_dir_all(dir)
                    .with_context(|| format!("failed to create {}", dir.display()))?;
            }

            info!(file = %path.display(), "opened key-value file");
            Ok(Self {
                path: path.to_path_buf(),
            })
        }

        fn read_all(&self) -> anyhow::Result<Map<String, Value>> {
            if !self.path.exists() {
                return Ok(Map::new());
            }

            let text = fs::read_to_string(&self.path)
                .with_context(|| format!("failed reading {}", self.path.display()))?;
            if text.trim().is_empty() {
                return Ok(Map::new());
            }

            match serde_json::from_str::<Value>(&text)
                .with_context(|| format!("failed parsing {}", self.path.display()))?
            {
                Value::Object(map) => Ok(map),
                other => Err(anyhow!(
                    "expected a JSON object in {}, found {}",
                    self.path.display(),
                    json_kind(&other)
                )),
            }
        }

        fn write_all(&self, map: &Map<String, Value>) -> anyhow::Result<()> {
            debug!(file = %self.path.display(), keys = map.len(), "writing key-value file atomically");

            let dir = self
                .path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let mut temp = NamedTempFile::new_in(dir)?;
            serde_json::to_writer_pretty(&mut temp, map)?;
            writeln!(temp)?;
            temp.flush()?;

            temp.persist(&self.path)
                .map_err(|err| anyhow!("failed to persist {}: {}", self.path.display(), err))?;
            Ok(())
        }
    }

    impl KeyValueArea for JsonFileArea {
        async fn get(&self, key: &str) -> anyhow::Result<Option<Value>> {
            Ok(self.read_all()?.get(key).cloned())
        }

        async fn set(&mut self, key: &str, value: Value) -> anyhow::Result<()> {
            let mut map = self.read_all()?;
            map.insert(key.to_string(), value);
            self.write_all(&map)
        }
    }

    fn json_kind(value: &Value) -> &'static str {
        match value {
            Value::Null => "null",
            Value::Bool(_) => "a boolean",
            Value::Number(_) => "a number",
            Value::String(_) => "a string",
            Value::Array(_) => "an array",
            Value::Object(_) => "an object",
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use serde_json::json;

    use super::*;
    use crate::task::TaskDraft;

    #[test]
    fn absent_key_loads_as_empty() {
        let gateway = TaskGateway::new(MemoryArea::new(), DEFAULT_TASKS_KEY);
        let tasks = block_on(gateway.load()).expect("load");
        assert!(tasks.is_empty());
    }

    #[test]
    fn malformed_collection_is_an_error_not_an_empty_list() {
        let mut area = MemoryArea::new();
        block_on(area.set(DEFAULT_TASKS_KEY, json!({"not": "a list"}))).expect("set");

        let gateway = TaskGateway::new(area, DEFAULT_TASKS_KEY);
        let err = block_on(gateway.load()).expect_err("decode should fail");
        assert!(format!("{err:#}").contains("failed to decode tasks"));
    }

    #[test]
    fn saving_what_was_loaded_leaves_storage_unchanged() {
        let stored = json!([
            {
                "id": 1, "text": "a", "description": "", "priority": "1",
                "category": "work", "attachment": "", "completed": false,
                "dueDate": "", "reminder": null, "recurring": null
            },
            {
                "id": 2, "text": "b", "description": "d", "priority": "",
                "category": "", "attachment": "https://x", "completed": true,
                "dueDate": "2026-01-01", "reminder": null, "recurring": null,
                "color": "teal"
            }
        ]);

        let mut area = MemoryArea::new();
        block_on(area.set("tasks", stored.clone())).expect("set");
        let mut gateway = TaskGateway::new(area, "tasks");

        let tasks = block_on(gateway.load()).expect("load");
        block_on(gateway.save(&tasks)).expect("save");

        assert_eq!(gateway.area().raw("tasks"), Some(&stored));
    }

    #[test]
    fn gateway_respects_configured_key() {
        let mut gateway = TaskGateway::new(MemoryArea::new(), "todo");
        let task = Task::from_draft(TaskDraft::new("x"), 1);
        block_on(gateway.save(&[task])).expect("save");

        assert!(gateway.area().raw("tasks").is_none());
        assert!(gateway.area().raw("todo").is_some());
    }
}
