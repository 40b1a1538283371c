use crate::{CrewcastError, CrewcastResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// The kind of work a task represents.
///
/// Each kind is executed by exactly one registered agent role; ambiguous
/// registrations are rejected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Write a platform-optimized social media post.
    ContentGeneration,
    /// Analyze trending keywords and competitor activity.
    TrendAnalysis,
    /// Produce a video concept, shot list, and production plan.
    VideoPlanning,
    /// Write a video script, optionally building on a video plan.
    ScriptWriting,
}

impl TaskKind {
    /// Wire name of the kind, as it appears in payloads and events.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::ContentGeneration => "content_generation",
            TaskKind::TrendAnalysis => "trend_analysis",
            TaskKind::VideoPlanning => "video_planning",
            TaskKind::ScriptWriting => "script_writing",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a [`Task`].
///
/// Pending -> Running -> {Succeeded, Failed}; any non-terminal state may
/// move to Cancelled. Terminal states accept no further transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    /// Created but not yet started; waiting on a slot or dependencies.
    Pending,
    /// Currently executing against an agent capability.
    Running,
    /// The capability returned a result. Terminal.
    Succeeded,
    /// The capability failed or timed out. Terminal.
    Failed,
    /// Explicitly cancelled, or a dependency failed. Terminal.
    Cancelled,
}

impl TaskState {
    /// Whether this state accepts no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Succeeded | TaskState::Failed | TaskState::Cancelled
        )
    }

    /// Whether the edge `self -> to` is part of the task state machine.
    pub fn can_transition(&self, to: TaskState) -> bool {
        matches!(
            (self, to),
            (TaskState::Pending, TaskState::Running)
                | (TaskState::Pending, TaskState::Cancelled)
                | (TaskState::Running, TaskState::Succeeded)
                | (TaskState::Running, TaskState::Failed)
                | (TaskState::Running, TaskState::Cancelled)
        )
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskState::Pending => "pending",
            TaskState::Running => "running",
            TaskState::Succeeded => "succeeded",
            TaskState::Failed => "failed",
            TaskState::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Why a task failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskErrorKind {
    /// Execution exceeded the per-task timeout.
    Timeout,
    /// The agent capability reported an error.
    Capability,
    /// A dependency of this task failed or was cancelled.
    DependencyFailed,
}

/// Error record attached to a task on its transition to `Failed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskError {
    /// Machine-readable failure category.
    pub kind: TaskErrorKind,
    /// Human-readable description.
    pub message: String,
}

impl TaskError {
    /// A timeout failure.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: TaskErrorKind::Timeout,
            message: message.into(),
        }
    }

    /// A failure reported by the agent capability.
    pub fn capability(message: impl Into<String>) -> Self {
        Self {
            kind: TaskErrorKind::Capability,
            message: message.into(),
        }
    }

    /// A failure caused by an unusable dependency result.
    pub fn dependency(message: impl Into<String>) -> Self {
        Self {
            kind: TaskErrorKind::DependencyFailed,
            message: message.into(),
        }
    }
}

/// Data written alongside a state transition.
///
/// `Output` is only valid for transitions to `Succeeded`, `Failure` only for
/// transitions to `Failed`; everything else carries `None`.
#[derive(Debug, Clone)]
pub enum TaskOutcome {
    /// No result or error accompanies the transition.
    None,
    /// The result produced by a successful execution.
    Output(serde_json::Value),
    /// The error produced by a failed execution.
    Failure(TaskError),
}

/// A unit of orchestrated work.
///
/// The task store owns the authoritative copy; after creation all mutations
/// go through [`Task::transition`], which enforces the state machine and the
/// write-once discipline for `result`, `error`, and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier, assigned at creation.
    pub id: Uuid,
    /// The kind of work this task represents.
    pub kind: TaskKind,
    /// Identifier of the requesting user.
    pub owner_id: String,
    /// The agent role responsible, set by the dispatcher at creation.
    pub agent_role: String,
    /// Current lifecycle state.
    pub state: TaskState,
    /// Opaque structured input, immutable after creation.
    pub payload: serde_json::Value,
    /// Opaque structured output; set exactly once, on success.
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    /// Error record; set exactly once, on failure.
    #[serde(default)]
    pub error: Option<TaskError>,
    /// When the task was created.
    pub created_at: DateTime<Utc>,
    /// When execution began, if it did.
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    /// When the task reached a terminal state, if it did.
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    /// Task ids that must succeed before this task may start.
    #[serde(default)]
    pub dependencies: Vec<Uuid>,
}

impl Task {
    /// Creates a new pending task.
    pub fn new(
        kind: TaskKind,
        owner_id: impl Into<String>,
        agent_role: impl Into<String>,
        payload: serde_json::Value,
        dependencies: Vec<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            owner_id: owner_id.into(),
            agent_role: agent_role.into(),
            state: TaskState::Pending,
            payload,
            result: None,
            error: None,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
            dependencies,
        }
    }

    /// Whether the task has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Applies a state transition, enforcing the state machine.
    ///
    /// Sets `started_at` on entering `Running` and `finished_at` on entering
    /// a terminal state. `result` and `error` are written exactly once, on
    /// the matching transition. Any disallowed edge, or an outcome that does
    /// not match the target state, yields
    /// [`CrewcastError::InvalidTransition`].
    pub fn transition(&mut self, to: TaskState, outcome: TaskOutcome) -> CrewcastResult<()> {
        if !self.state.can_transition(to) {
            return Err(CrewcastError::InvalidTransition {
                id: self.id,
                from: self.state,
                to,
            });
        }

        match (to, outcome) {
            (TaskState::Succeeded, TaskOutcome::Output(value)) => self.result = Some(value),
            (TaskState::Failed, TaskOutcome::Failure(error)) => self.error = Some(error),
            (TaskState::Running | TaskState::Cancelled, TaskOutcome::None) => {}
            _ => {
                return Err(CrewcastError::InvalidTransition {
                    id: self.id,
                    from: self.state,
                    to,
                });
            }
        }

        let now = Utc::now();
        if to == TaskState::Running && self.started_at.is_none() {
            self.started_at = Some(now);
        }
        if to.is_terminal() && self.finished_at.is_none() {
            self.finished_at = Some(now);
        }
        self.state = to;
        Ok(())
    }
}

/// The tasks and dependency edges produced for one incoming request.
///
/// Ephemeral: consumed once to seed the task store and the executor pool,
/// then discarded. Task order is creation order.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    tasks: Vec<Task>,
}

impl TaskGraph {
    /// Wraps planned tasks into a graph. Dependency edges are carried on the
    /// tasks themselves.
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    /// The tasks of the graph, in creation order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Ids of the tasks with no dependencies.
    pub fn root_ids(&self) -> Vec<Uuid> {
        self.tasks
            .iter()
            .filter(|t| t.dependencies.is_empty())
            .map(|t| t.id)
            .collect()
    }

    /// Number of tasks in the graph.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
