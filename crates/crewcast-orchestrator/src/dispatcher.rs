use crewcast_agents::AgentRegistry;
use crewcast_core::{
    ContentRequest, CrewcastError, CrewcastResult, RequestPayload, Task, TaskGraph, TaskKind,
};
use std::sync::Arc;

/// Plans the task graph for an incoming request.
///
/// Pure: validates the payload, resolves agent roles via the registry, and
/// builds tasks with their dependency edges. Never touches the task store —
/// persisting and enqueueing the graph is the coordinator's job.
pub struct Dispatcher {
    registry: Arc<AgentRegistry>,
}

impl Dispatcher {
    /// Creates a dispatcher over the given registry.
    pub fn new(registry: Arc<AgentRegistry>) -> Self {
        Self { registry }
    }

    /// Produces the task graph for a request.
    ///
    /// Single-task graphs for content generation and trend analysis. A
    /// video planning request with `include_script` expands into a planning
    /// task plus a script-writing task that depends on it.
    pub fn plan(&self, request: &ContentRequest) -> CrewcastResult<TaskGraph> {
        if request.owner_id.trim().is_empty() {
            return Err(CrewcastError::InvalidRequest(
                "owner_id must not be empty".to_string(),
            ));
        }
        request.payload.validate()?;

        match &request.payload {
            RequestPayload::ContentGeneration(brief) => {
                self.single(request, TaskKind::ContentGeneration, serde_json::to_value(brief)?)
            }
            RequestPayload::TrendAnalysis(query) => {
                self.single(request, TaskKind::TrendAnalysis, serde_json::to_value(query)?)
            }
            RequestPayload::VideoPlanning(brief) => {
                let planning_role = self.registry.resolve(TaskKind::VideoPlanning)?;
                let payload = serde_json::to_value(brief)?;
                let planning = Task::new(
                    TaskKind::VideoPlanning,
                    &request.owner_id,
                    planning_role,
                    payload.clone(),
                    Vec::new(),
                );

                let mut tasks = Vec::with_capacity(2);
                if brief.include_script {
                    let script_role = self.registry.resolve(TaskKind::ScriptWriting)?;
                    let script = Task::new(
                        TaskKind::ScriptWriting,
                        &request.owner_id,
                        script_role,
                        payload,
                        vec![planning.id],
                    );
                    tasks.push(planning);
                    tasks.push(script);
                } else {
                    tasks.push(planning);
                }
                Ok(TaskGraph::new(tasks))
            }
        }
    }

    fn single(
        &self,
        request: &ContentRequest,
        kind: TaskKind,
        payload: serde_json::Value,
    ) -> CrewcastResult<TaskGraph> {
        let role = self.registry.resolve(kind)?;
        let task = Task::new(kind, &request.owner_id, role, payload, Vec::new());
        Ok(TaskGraph::new(vec![task]))
    }
}
