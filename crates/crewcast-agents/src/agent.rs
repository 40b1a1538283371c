use async_trait::async_trait;
use crewcast_core::{CrewcastResult, TaskKind};
use serde::{Deserialize, Serialize};

/// Metadata describing an agent role: its name, what it does, and which
/// task kinds it accepts. Immutable after registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDescriptor {
    /// Unique role name, e.g. `content_writer`.
    pub role: String,
    /// Human-readable description of the role.
    pub description: String,
    /// Task kinds this role executes.
    pub accepted_kinds: Vec<TaskKind>,
}

impl AgentDescriptor {
    /// Creates a descriptor for a role accepting the given kinds.
    pub fn new(
        role: impl Into<String>,
        description: impl Into<String>,
        accepted_kinds: Vec<TaskKind>,
    ) -> Self {
        Self {
            role: role.into(),
            description: description.into(),
            accepted_kinds,
        }
    }
}

/// An agent capability, opaque to the orchestration core beyond this
/// contract.
///
/// `execute` receives the task payload (plus a `context` object carrying
/// dependency results, when the task has dependencies) and returns a
/// structured result. Cancellation is cooperative: the executor stops
/// polling the returned future, so a well-behaved implementation observes
/// cancellation at its next await point.
#[async_trait]
pub trait Agent: Send + Sync {
    /// The agent's static descriptor.
    fn descriptor(&self) -> &AgentDescriptor;

    /// Executes one task against this capability.
    async fn execute(&self, input: serde_json::Value) -> CrewcastResult<serde_json::Value>;
}
