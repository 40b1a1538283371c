use crate::store::{StateChange, TaskStore};
use async_trait::async_trait;
use crewcast_core::{CrewcastError, CrewcastResult, Task, TaskOutcome, TaskState};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory task store. The default backend; suitable for single-process
/// deployments and tests.
///
/// The lock is held only for map access, never across an await, so tasks
/// with disjoint dependency sets make progress independently.
pub struct MemoryTaskStore {
    tasks: RwLock<HashMap<Uuid, Task>>,
}

impl MemoryTaskStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored tasks.
    pub async fn task_count(&self) -> usize {
        self.tasks.read().await.len()
    }
}

impl Default for MemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn insert(&self, task: &Task) -> CrewcastResult<()> {
        let mut tasks = self.tasks.write().await;
        if tasks.contains_key(&task.id) {
            return Err(CrewcastError::Store(format!(
                "task {} already exists",
                task.id
            )));
        }
        tasks.insert(task.id, task.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> CrewcastResult<Option<Task>> {
        Ok(self.tasks.read().await.get(&id).cloned())
    }

    async fn transition(
        &self,
        id: Uuid,
        to: TaskState,
        outcome: TaskOutcome,
    ) -> CrewcastResult<StateChange> {
        let mut tasks = self.tasks.write().await;
        let task = tasks.get_mut(&id).ok_or(CrewcastError::NotFound(id))?;
        let previous = task.state;
        task.transition(to, outcome)?;
        Ok(StateChange {
            previous,
            task: task.clone(),
        })
    }

    async fn list_for_owner(
        &self,
        owner_id: &str,
        state: Option<TaskState>,
    ) -> CrewcastResult<Vec<Task>> {
        let tasks = self.tasks.read().await;
        let mut matching: Vec<Task> = tasks
            .values()
            .filter(|t| t.owner_id == owner_id && state.map_or(true, |s| t.state == s))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }

    async fn running_by_role(&self) -> CrewcastResult<HashMap<String, usize>> {
        let tasks = self.tasks.read().await;
        let mut counts = HashMap::new();
        for task in tasks.values() {
            if task.state == TaskState::Running {
                *counts.entry(task.agent_role.clone()).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crewcast_core::TaskKind;
    use serde_json::json;

    fn task(owner: &str) -> Task {
        Task::new(
            TaskKind::ContentGeneration,
            owner,
            "content_writer",
            json!({}),
            Vec::new(),
        )
    }

    #[tokio::test]
    async fn insert_then_get() {
        let store = MemoryTaskStore::new();
        let t = task("u1");
        store.insert(&t).await.unwrap();

        let loaded = store.get(t.id).await.unwrap().unwrap();
        assert_eq!(loaded.id, t.id);
        assert_eq!(loaded.state, TaskState::Pending);
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected() {
        let store = MemoryTaskStore::new();
        let t = task("u1");
        store.insert(&t).await.unwrap();
        assert!(store.insert(&t).await.is_err());
        assert_eq!(store.task_count().await, 1);
    }

    #[tokio::test]
    async fn transition_enforces_state_machine() {
        let store = MemoryTaskStore::new();
        let t = task("u1");
        store.insert(&t).await.unwrap();

        let change = store
            .transition(t.id, TaskState::Running, TaskOutcome::None)
            .await
            .unwrap();
        assert_eq!(change.previous, TaskState::Pending);
        assert_eq!(change.task.state, TaskState::Running);

        // Running -> Running is not an edge; the record is untouched.
        let err = store
            .transition(t.id, TaskState::Running, TaskOutcome::None)
            .await
            .unwrap_err();
        assert!(matches!(err, CrewcastError::InvalidTransition { .. }));
        let loaded = store.get(t.id).await.unwrap().unwrap();
        assert_eq!(loaded.state, TaskState::Running);
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let store = MemoryTaskStore::new();
        let err = store
            .transition(Uuid::new_v4(), TaskState::Running, TaskOutcome::None)
            .await
            .unwrap_err();
        assert!(matches!(err, CrewcastError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_for_owner_filters_and_sorts() {
        let store = MemoryTaskStore::new();
        let mine = task("u1");
        let other = task("u2");
        store.insert(&mine).await.unwrap();
        store.insert(&other).await.unwrap();

        let listed = store.list_for_owner("u1", None).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, mine.id);

        let running = store
            .list_for_owner("u1", Some(TaskState::Running))
            .await
            .unwrap();
        assert!(running.is_empty());
    }

    #[tokio::test]
    async fn running_by_role_counts_only_running() {
        let store = MemoryTaskStore::new();
        let a = task("u1");
        let b = task("u1");
        store.insert(&a).await.unwrap();
        store.insert(&b).await.unwrap();
        store
            .transition(a.id, TaskState::Running, TaskOutcome::None)
            .await
            .unwrap();

        let counts = store.running_by_role().await.unwrap();
        assert_eq!(counts.get("content_writer"), Some(&1));
    }
}
