use crate::{Task, TaskKind, TaskState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A task state transition, as delivered to status subscribers.
///
/// Events for the same task are delivered in transition order; no ordering
/// is guaranteed across tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEvent {
    /// The task that transitioned.
    pub task_id: Uuid,
    /// Owner of the task, for per-user filtering.
    pub owner_id: String,
    /// The task's kind, for per-kind filtering.
    pub kind: TaskKind,
    /// State before the transition.
    pub old_state: TaskState,
    /// State after the transition.
    pub new_state: TaskState,
    /// When the event was published.
    pub timestamp: DateTime<Utc>,
}

impl TaskEvent {
    /// Builds an event from a freshly transitioned task snapshot.
    pub fn new(task: &Task, old_state: TaskState) -> Self {
        Self {
            task_id: task.id,
            owner_id: task.owner_id.clone(),
            kind: task.kind,
            old_state,
            new_state: task.state,
            timestamp: Utc::now(),
        }
    }
}

/// Server-side filter applied before events are fanned out to a subscriber.
///
/// An unset field matches everything; set fields must all match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventFilter {
    /// Only events for tasks of this owner.
    #[serde(default)]
    pub owner_id: Option<String>,
    /// Only events for tasks of this kind.
    #[serde(default)]
    pub kind: Option<TaskKind>,
}

impl EventFilter {
    /// A filter that matches every event.
    pub fn all() -> Self {
        Self::default()
    }

    /// A filter matching a single owner's tasks.
    pub fn for_owner(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: Some(owner_id.into()),
            kind: None,
        }
    }

    /// A filter matching a single task kind.
    pub fn for_kind(kind: TaskKind) -> Self {
        Self {
            owner_id: None,
            kind: Some(kind),
        }
    }

    /// Whether the event passes this filter.
    pub fn matches(&self, event: &TaskEvent) -> bool {
        if let Some(owner) = &self.owner_id {
            if owner != &event.owner_id {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if kind != event.kind {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::TaskOutcome;
    use serde_json::json;

    fn event_for(owner: &str, kind: TaskKind) -> TaskEvent {
        let mut task = Task::new(kind, owner, "some_role", json!({}), Vec::new());
        let old = task.state;
        task.transition(TaskState::Running, TaskOutcome::None).unwrap();
        TaskEvent::new(&task, old)
    }

    #[test]
    fn event_captures_transition() {
        let event = event_for("u1", TaskKind::TrendAnalysis);
        assert_eq!(event.old_state, TaskState::Pending);
        assert_eq!(event.new_state, TaskState::Running);
        assert_eq!(event.owner_id, "u1");
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = EventFilter::all();
        assert!(filter.matches(&event_for("u1", TaskKind::ContentGeneration)));
        assert!(filter.matches(&event_for("u2", TaskKind::VideoPlanning)));
    }

    #[test]
    fn owner_filter_is_exact() {
        let filter = EventFilter::for_owner("u1");
        assert!(filter.matches(&event_for("u1", TaskKind::ContentGeneration)));
        assert!(!filter.matches(&event_for("u2", TaskKind::ContentGeneration)));
    }

    #[test]
    fn combined_filter_requires_both() {
        let filter = EventFilter {
            owner_id: Some("u1".to_string()),
            kind: Some(TaskKind::ScriptWriting),
        };
        assert!(filter.matches(&event_for("u1", TaskKind::ScriptWriting)));
        assert!(!filter.matches(&event_for("u1", TaskKind::TrendAnalysis)));
        assert!(!filter.matches(&event_for("u2", TaskKind::ScriptWriting)));
    }
}
