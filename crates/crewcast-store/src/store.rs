use async_trait::async_trait;
use crewcast_core::{CrewcastResult, Task, TaskOutcome, TaskState};
use std::collections::HashMap;
use uuid::Uuid;

/// Result of a successfully applied state transition: the state the task
/// left and a snapshot of the updated task.
#[derive(Debug, Clone)]
pub struct StateChange {
    /// State before the transition.
    pub previous: TaskState,
    /// The task after the transition.
    pub task: Task,
}

/// Durable, authoritative record of every task.
///
/// One record per task, keyed by id, with lookup by id and by owner.
/// The executor pool is the sole writer after creation; a store
/// implementation may rely on mutations to a single task id never racing.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Persists a newly created task. Fails if the id already exists.
    async fn insert(&self, task: &Task) -> CrewcastResult<()>;

    /// Snapshot of a task by id.
    async fn get(&self, id: Uuid) -> CrewcastResult<Option<Task>>;

    /// Applies a state transition and returns the change.
    ///
    /// Enforces the task state machine: disallowed edges fail with
    /// [`crewcast_core::CrewcastError::InvalidTransition`] and leave the
    /// record untouched. Unknown ids fail with
    /// [`crewcast_core::CrewcastError::NotFound`].
    async fn transition(
        &self,
        id: Uuid,
        to: TaskState,
        outcome: TaskOutcome,
    ) -> CrewcastResult<StateChange>;

    /// Tasks belonging to an owner, most recent first, optionally filtered
    /// by state.
    async fn list_for_owner(
        &self,
        owner_id: &str,
        state: Option<TaskState>,
    ) -> CrewcastResult<Vec<Task>>;

    /// Number of currently running tasks per agent role.
    async fn running_by_role(&self) -> CrewcastResult<HashMap<String, usize>>;
}
