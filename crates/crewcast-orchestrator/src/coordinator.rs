use crate::broadcast::StatusBroadcaster;
use crate::config::OrchestratorConfig;
use crate::dispatcher::Dispatcher;
use crate::executor::ExecutorPool;
use crewcast_agents::AgentRegistry;
use crewcast_core::{
    ContentRequest, CrewcastError, CrewcastResult, EventFilter, Task, TaskEvent, TaskState,
};
use crewcast_store::TaskStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};
use uuid::Uuid;

/// Acknowledgement returned from a request submission.
///
/// Carries the ids of the root tasks of the planned graph; dependent tasks
/// are discoverable through owner listing and the event stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAck {
    /// Ids of the dependency-free tasks planned for the request.
    pub root_task_ids: Vec<Uuid>,
}

/// A registered agent's health and load, as reported by
/// [`Coordinator::agents_status`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentStatus {
    /// The agent's registered role.
    pub role: String,
    /// What the agent does.
    pub description: String,
    /// Whether the agent can currently accept work.
    pub healthy: bool,
    /// Number of tasks this agent is executing right now.
    pub active_tasks: usize,
}

/// The orchestration entry point.
///
/// Owns the dispatcher, the executor pool, and the status broadcaster, and
/// exposes the full external surface: submit a request, query or cancel a
/// task, subscribe to status events, and inspect agent load. Cheap to share
/// behind an [`Arc`].
pub struct Coordinator {
    registry: Arc<AgentRegistry>,
    store: Arc<dyn TaskStore>,
    dispatcher: Dispatcher,
    pool: ExecutorPool,
    broadcaster: Arc<StatusBroadcaster>,
}

impl Coordinator {
    /// Wires up the orchestrator over a registry and a task store.
    ///
    /// Spawns the executor pool's scheduler, so this must be called from
    /// within a tokio runtime.
    pub fn new(
        registry: Arc<AgentRegistry>,
        store: Arc<dyn TaskStore>,
        config: OrchestratorConfig,
    ) -> Self {
        let broadcaster = Arc::new(StatusBroadcaster::new(config.event_buffer));
        let pool = ExecutorPool::new(
            store.clone(),
            registry.clone(),
            broadcaster.clone(),
            config,
        );
        Self {
            dispatcher: Dispatcher::new(registry.clone()),
            registry,
            store,
            pool,
            broadcaster,
        }
    }

    /// Validates a request, plans its task graph, persists every task, and
    /// enqueues the graph for execution.
    ///
    /// Returns as soon as the tasks are admitted; execution proceeds in the
    /// background. A rejected request leaves no trace in the store; after
    /// [`Coordinator::shutdown`] every submission fails with
    /// [`CrewcastError::ShutDown`].
    pub async fn submit_request(&self, request: &ContentRequest) -> CrewcastResult<SubmitAck> {
        if self.pool.is_shut_down() {
            return Err(CrewcastError::ShutDown);
        }
        let graph = self.dispatcher.plan(request)?;
        for task in graph.tasks() {
            self.store.insert(task).await?;
        }
        let root_task_ids = graph.root_ids();
        self.pool.submit(&graph)?;
        info!(
            owner_id = %request.owner_id,
            tasks = graph.len(),
            "Request admitted"
        );
        Ok(SubmitAck { root_task_ids })
    }

    /// Snapshot of a task by id.
    pub async fn get_status(&self, id: Uuid) -> CrewcastResult<Task> {
        self.store
            .get(id)
            .await?
            .ok_or(CrewcastError::NotFound(id))
    }

    /// Cancels a task and its dependents.
    ///
    /// Idempotent in effect: cancelling an already-terminal task changes
    /// nothing and reports [`CrewcastError::AlreadyTerminal`].
    pub async fn cancel(&self, id: Uuid) -> CrewcastResult<()> {
        match self.pool.cancel(id).await {
            Ok(()) => Ok(()),
            Err(e @ CrewcastError::AlreadyTerminal(_)) => {
                warn!(task_id = %id, "Cancel requested for a finished task");
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Subscribes to task status events matching `filter`.
    pub fn subscribe(&self, filter: EventFilter) -> ReceiverStream<TaskEvent> {
        self.broadcaster.subscribe(filter)
    }

    /// Tasks belonging to an owner, most recent first, optionally filtered
    /// by state.
    pub async fn list_tasks(
        &self,
        owner_id: &str,
        state: Option<TaskState>,
    ) -> CrewcastResult<Vec<Task>> {
        self.store.list_for_owner(owner_id, state).await
    }

    /// Health and current load of every registered agent.
    pub async fn agents_status(&self) -> CrewcastResult<Vec<AgentStatus>> {
        let running = self.store.running_by_role().await?;
        let healthy = !self.pool.is_shut_down();
        let mut statuses: Vec<AgentStatus> = self
            .registry
            .descriptors()
            .into_iter()
            .map(|d| AgentStatus {
                role: d.role.clone(),
                description: d.description.clone(),
                healthy,
                active_tasks: running.get(&d.role).copied().unwrap_or(0),
            })
            .collect();
        statuses.sort_by(|a, b| a.role.cmp(&b.role));
        Ok(statuses)
    }

    /// Stops accepting new executions. In-flight tasks run to completion.
    pub fn shutdown(&self) {
        info!("Coordinator shutting down");
        self.pool.shutdown();
    }
}
