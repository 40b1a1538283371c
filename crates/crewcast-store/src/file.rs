use crate::store::{StateChange, TaskStore};
use async_trait::async_trait;
use crewcast_core::{CrewcastError, CrewcastResult, Task, TaskOutcome, TaskState};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;
use uuid::Uuid;

/// File-based task store, one JSON document per task.
///
/// Durable across restarts without a database. Listing scans the directory,
/// so this backend suits modest task volumes; swap in a database-backed
/// implementation of [`TaskStore`] for anything bigger.
pub struct FileTaskStore {
    dir: PathBuf,
}

impl FileTaskStore {
    /// Opens a store rooted at `dir`, creating the directory if needed.
    pub async fn new(dir: PathBuf) -> CrewcastResult<Self> {
        tokio::fs::create_dir_all(&dir).await?;
        debug!(dir = %dir.display(), "Opened file task store");
        Ok(Self { dir })
    }

    fn task_path(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    async fn load(&self, id: Uuid) -> CrewcastResult<Option<Task>> {
        let path = self.task_path(id);
        if !path.exists() {
            return Ok(None);
        }
        let data = tokio::fs::read_to_string(path).await?;
        let task = serde_json::from_str(&data)
            .map_err(|e| CrewcastError::Store(format!("failed to parse task {id}: {e}")))?;
        Ok(Some(task))
    }

    async fn save(&self, task: &Task) -> CrewcastResult<()> {
        let json = serde_json::to_string_pretty(task)?;
        tokio::fs::write(self.task_path(task.id), json).await?;
        Ok(())
    }

    async fn load_all(&self) -> CrewcastResult<Vec<Task>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut tasks = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            let Some(stem) = name.strip_suffix(".json") else {
                continue;
            };
            let Ok(id) = Uuid::parse_str(stem) else {
                continue;
            };
            if let Some(task) = self.load(id).await? {
                tasks.push(task);
            }
        }
        Ok(tasks)
    }
}

#[async_trait]
impl TaskStore for FileTaskStore {
    async fn insert(&self, task: &Task) -> CrewcastResult<()> {
        if self.task_path(task.id).exists() {
            return Err(CrewcastError::Store(format!(
                "task {} already exists",
                task.id
            )));
        }
        self.save(task).await
    }

    async fn get(&self, id: Uuid) -> CrewcastResult<Option<Task>> {
        self.load(id).await
    }

    async fn transition(
        &self,
        id: Uuid,
        to: TaskState,
        outcome: TaskOutcome,
    ) -> CrewcastResult<StateChange> {
        // Read-modify-write without an internal lock: the executor pool is
        // the sole writer for a task id after creation.
        let mut task = self.load(id).await?.ok_or(CrewcastError::NotFound(id))?;
        let previous = task.state;
        task.transition(to, outcome)?;
        self.save(&task).await?;
        Ok(StateChange { previous, task })
    }

    async fn list_for_owner(
        &self,
        owner_id: &str,
        state: Option<TaskState>,
    ) -> CrewcastResult<Vec<Task>> {
        let mut matching: Vec<Task> = self
            .load_all()
            .await?
            .into_iter()
            .filter(|t| t.owner_id == owner_id && state.map_or(true, |s| t.state == s))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }

    async fn running_by_role(&self) -> CrewcastResult<HashMap<String, usize>> {
        let mut counts = HashMap::new();
        for task in self.load_all().await? {
            if task.state == TaskState::Running {
                *counts.entry(task.agent_role).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }
}
