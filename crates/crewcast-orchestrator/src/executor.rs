use crate::broadcast::StatusBroadcaster;
use crate::config::OrchestratorConfig;
use crewcast_agents::AgentRegistry;
use crewcast_core::{
    CrewcastError, CrewcastResult, Task, TaskError, TaskEvent, TaskGraph, TaskOutcome, TaskState,
};
use crewcast_store::TaskStore;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Notify};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// A queued task awaiting a free slot or its dependencies.
struct Waiting {
    id: Uuid,
    unmet: HashSet<Uuid>,
}

/// Scheduler bookkeeping. Guarded by a mutex that is only ever held for map
/// access, never across an await.
struct SchedState {
    next_seq: u64,
    /// Pending tasks in creation order (the map key is the admission
    /// sequence number, so iteration order is FIFO).
    waiting: BTreeMap<u64, Waiting>,
    seq_of: HashMap<Uuid, u64>,
    /// dependency id -> ids of tasks waiting on it.
    dependents: HashMap<Uuid, Vec<Uuid>>,
    /// Cancel signal for each task currently executing.
    running: HashMap<Uuid, watch::Sender<bool>>,
}

struct PoolInner {
    store: Arc<dyn TaskStore>,
    registry: Arc<AgentRegistry>,
    broadcaster: Arc<StatusBroadcaster>,
    config: OrchestratorConfig,
    sched: Mutex<SchedState>,
    wake: Notify,
    shutdown: AtomicBool,
}

/// Runs tasks asynchronously against the agent registry.
///
/// Maintains a bounded set of concurrently running tasks; eligible pending
/// tasks (all dependencies succeeded) start in creation order as slots free
/// up. Every state transition is written to the task store and immediately
/// mirrored to the status broadcaster; the pool is the only component that
/// mutates a task after creation, and at most one execution is in flight per
/// task id.
#[derive(Clone)]
pub struct ExecutorPool {
    inner: Arc<PoolInner>,
}

impl ExecutorPool {
    /// Creates the pool and spawns its scheduler loop.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(
        store: Arc<dyn TaskStore>,
        registry: Arc<AgentRegistry>,
        broadcaster: Arc<StatusBroadcaster>,
        config: OrchestratorConfig,
    ) -> Self {
        let inner = Arc::new(PoolInner {
            store,
            registry,
            broadcaster,
            config,
            sched: Mutex::new(SchedState {
                next_seq: 0,
                waiting: BTreeMap::new(),
                seq_of: HashMap::new(),
                dependents: HashMap::new(),
                running: HashMap::new(),
            }),
            wake: Notify::new(),
            shutdown: AtomicBool::new(false),
        });
        tokio::spawn(scheduler_loop(inner.clone()));
        Self { inner }
    }

    /// Enqueues every task of a planned graph and returns immediately.
    ///
    /// The graph's tasks must already be persisted; execution begins in the
    /// background as slots become available. Fails with
    /// [`CrewcastError::ShutDown`] once the pool has been shut down, since
    /// the scheduler would never pick the tasks up.
    pub fn submit(&self, graph: &TaskGraph) -> CrewcastResult<()> {
        if self.is_shut_down() {
            return Err(CrewcastError::ShutDown);
        }
        {
            let mut sched = self.inner.sched.lock();
            for task in graph.tasks() {
                let seq = sched.next_seq;
                sched.next_seq += 1;
                for dep in &task.dependencies {
                    sched.dependents.entry(*dep).or_default().push(task.id);
                }
                sched.seq_of.insert(task.id, seq);
                sched.waiting.insert(
                    seq,
                    Waiting {
                        id: task.id,
                        unmet: task.dependencies.iter().copied().collect(),
                    },
                );
            }
        }
        self.inner.wake.notify_one();
        Ok(())
    }

    /// Cancels a task and, transitively, every task depending on it.
    ///
    /// A pending task is cancelled synchronously. A running task is
    /// signalled; its terminal state is recorded by the execution it races.
    /// Fails with [`CrewcastError::AlreadyTerminal`] if the task already
    /// finished, and [`CrewcastError::NotFound`] for unknown ids.
    pub async fn cancel(&self, id: Uuid) -> CrewcastResult<()> {
        enum Target {
            Running,
            Waiting(Vec<Uuid>),
            Untracked,
        }

        let target = {
            let mut sched = self.inner.sched.lock();
            if let Some(cancel) = sched.running.get(&id) {
                let _ = cancel.send(true);
                Target::Running
            } else if let Some(seq) = sched.seq_of.remove(&id) {
                sched.waiting.remove(&seq);
                let mut ids = vec![id];
                ids.extend(collect_cascade(&mut sched, id));
                Target::Waiting(ids)
            } else {
                Target::Untracked
            }
        };

        match target {
            Target::Running => {
                info!(task_id = %id, "Cancellation signalled to running task");
                Ok(())
            }
            Target::Waiting(ids) => {
                for task_id in ids {
                    self.inner
                        .record(task_id, TaskState::Cancelled, TaskOutcome::None)
                        .await?;
                }
                self.inner.wake.notify_one();
                Ok(())
            }
            Target::Untracked => match self.inner.store.get(id).await? {
                None => Err(CrewcastError::NotFound(id)),
                Some(task) if task.is_terminal() => Err(CrewcastError::AlreadyTerminal(id)),
                Some(_) => {
                    // Known to the store but not tracked by the pool: cancel
                    // directly so the record still reaches a terminal state.
                    warn!(task_id = %id, "Cancelling task unknown to the scheduler");
                    self.inner
                        .record(id, TaskState::Cancelled, TaskOutcome::None)
                        .await?;
                    Ok(())
                }
            },
        }
    }

    /// Whether the pool has been shut down.
    pub fn is_shut_down(&self) -> bool {
        self.inner.shutdown.load(Ordering::SeqCst)
    }

    /// Stops the scheduler loop. Already-running tasks finish; nothing new
    /// starts.
    pub fn shutdown(&self) {
        self.inner.shutdown.store(true, Ordering::SeqCst);
        self.inner.wake.notify_one();
    }
}

impl PoolInner {
    /// Writes a state transition to the store and mirrors it to the
    /// broadcaster as one step. The store write is authoritative.
    async fn record(&self, id: Uuid, to: TaskState, outcome: TaskOutcome) -> CrewcastResult<Task> {
        let change = self.store.transition(id, to, outcome).await?;
        info!(task_id = %id, from = %change.previous, to = %to, "Task transition");
        let event = TaskEvent::new(&change.task, change.previous);
        self.broadcaster.publish(&event);
        Ok(change.task)
    }

    /// Records a terminal state and updates the schedule: a success unblocks
    /// dependents, anything else cascade-cancels them.
    async fn finish(&self, id: Uuid, to: TaskState, outcome: TaskOutcome) {
        if let Err(e) = self.record(id, to, outcome).await {
            error!(task_id = %id, error = %e, "Failed to record terminal state");
        }

        let cascade: Vec<Uuid> = {
            let mut sched = self.sched.lock();
            sched.running.remove(&id);
            if to == TaskState::Succeeded {
                if let Some(dependents) = sched.dependents.remove(&id) {
                    for dependent in dependents {
                        if let Some(seq) = sched.seq_of.get(&dependent).copied() {
                            if let Some(waiting) = sched.waiting.get_mut(&seq) {
                                waiting.unmet.remove(&id);
                            }
                        }
                    }
                }
                Vec::new()
            } else {
                collect_cascade(&mut sched, id)
            }
        };

        for dependent in cascade {
            debug!(task_id = %dependent, failed_dependency = %id, "Cascade cancelling dependent");
            if let Err(e) = self
                .record(dependent, TaskState::Cancelled, TaskOutcome::None)
                .await
            {
                warn!(task_id = %dependent, error = %e, "Failed to cascade-cancel dependent");
            }
        }

        self.wake.notify_one();
    }

    fn untrack(&self, id: Uuid) {
        self.sched.lock().running.remove(&id);
        self.wake.notify_one();
    }
}

/// Removes every direct and transitive dependent of `id` from the wait
/// queue and returns their ids, in admission order per level.
fn collect_cascade(sched: &mut SchedState, id: Uuid) -> Vec<Uuid> {
    let mut cancelled = Vec::new();
    let mut frontier = vec![id];
    while let Some(current) = frontier.pop() {
        let Some(dependents) = sched.dependents.remove(&current) else {
            continue;
        };
        for dependent in dependents {
            if let Some(seq) = sched.seq_of.remove(&dependent) {
                sched.waiting.remove(&seq);
                cancelled.push(dependent);
                frontier.push(dependent);
            }
        }
    }
    cancelled
}

async fn scheduler_loop(inner: Arc<PoolInner>) {
    loop {
        inner.wake.notified().await;
        if inner.shutdown.load(Ordering::SeqCst) {
            debug!("Executor pool shut down");
            break;
        }

        loop {
            // Pick the oldest eligible pending task, if a slot is free.
            let next = {
                let mut sched = inner.sched.lock();
                if sched.running.len() >= inner.config.max_concurrent {
                    None
                } else {
                    let eligible = sched
                        .waiting
                        .iter()
                        .find(|(_, w)| w.unmet.is_empty())
                        .map(|(seq, _)| *seq);
                    eligible.and_then(|seq| sched.waiting.remove(&seq)).map(|w| {
                        sched.seq_of.remove(&w.id);
                        let (cancel_tx, cancel_rx) = watch::channel(false);
                        sched.running.insert(w.id, cancel_tx);
                        (w.id, cancel_rx)
                    })
                }
            };

            let Some((id, cancel)) = next else { break };
            start_task(&inner, id, cancel).await;
        }
    }
}

/// Moves a picked task to Running and spawns its execution.
async fn start_task(inner: &Arc<PoolInner>, id: Uuid, cancel: watch::Receiver<bool>) {
    let snapshot = match inner.store.get(id).await {
        Ok(Some(task)) => task,
        Ok(None) => {
            error!(task_id = %id, "Queued task missing from store");
            inner.untrack(id);
            return;
        }
        Err(e) => {
            error!(task_id = %id, error = %e, "Failed to load queued task");
            inner.untrack(id);
            return;
        }
    };

    let input = match build_input(inner, &snapshot).await {
        Ok(input) => input,
        Err(e) => {
            // The task is still Pending here; the failure has to land on a
            // legal edge, so pass through Running first.
            let error = TaskError::dependency(format!("failed to assemble task input: {e}"));
            match inner.record(id, TaskState::Running, TaskOutcome::None).await {
                Ok(_) => {
                    inner
                        .finish(id, TaskState::Failed, TaskOutcome::Failure(error))
                        .await;
                }
                Err(record_err) => {
                    warn!(task_id = %id, error = %record_err, "Could not start queued task");
                    inner.untrack(id);
                }
            }
            return;
        }
    };

    match inner.record(id, TaskState::Running, TaskOutcome::None).await {
        Ok(_) => {
            let inner = inner.clone();
            tokio::spawn(run_task(inner, snapshot, input, cancel));
        }
        Err(e) => {
            // Typically a cancellation that won the race; the slot frees up
            // either way.
            warn!(task_id = %id, error = %e, "Could not start queued task");
            inner.untrack(id);
        }
    }
}

/// Injects dependency results into the payload as a `context` object keyed
/// by the dependency's task kind.
async fn build_input(inner: &Arc<PoolInner>, task: &Task) -> CrewcastResult<serde_json::Value> {
    let mut input = task.payload.clone();
    if task.dependencies.is_empty() {
        return Ok(input);
    }

    let mut context = serde_json::Map::new();
    for dep_id in &task.dependencies {
        let dep = inner
            .store
            .get(*dep_id)
            .await?
            .ok_or(CrewcastError::NotFound(*dep_id))?;
        if let Some(result) = dep.result {
            context.insert(dep.kind.as_str().to_string(), result);
        }
    }

    if let serde_json::Value::Object(map) = &mut input {
        map.insert("context".to_string(), serde_json::Value::Object(context));
    }
    Ok(input)
}

/// Executes one task against its agent, racing the capability against the
/// cancel signal and the per-task timeout, then records the terminal state.
async fn run_task(
    inner: Arc<PoolInner>,
    task: Task,
    input: serde_json::Value,
    mut cancel: watch::Receiver<bool>,
) {
    let id = task.id;
    let timeout = inner.config.task_timeout();

    let (to, outcome) = match inner.registry.get(&task.agent_role) {
        None => (
            TaskState::Failed,
            TaskOutcome::Failure(TaskError::capability(format!(
                "agent role '{}' is not registered",
                task.agent_role
            ))),
        ),
        Some(agent) => {
            tokio::select! {
                result = agent.execute(input) => match result {
                    Ok(output) => (TaskState::Succeeded, TaskOutcome::Output(output)),
                    Err(e) => (
                        TaskState::Failed,
                        TaskOutcome::Failure(TaskError::capability(e.to_string())),
                    ),
                },
                _ = cancel.changed() => {
                    debug!(task_id = %id, "Execution cancelled");
                    (TaskState::Cancelled, TaskOutcome::None)
                }
                _ = tokio::time::sleep(timeout) => (
                    TaskState::Failed,
                    TaskOutcome::Failure(TaskError::timeout(format!(
                        "execution exceeded the {}ms task timeout",
                        inner.config.task_timeout_ms
                    ))),
                ),
            }
        }
    };

    inner.finish(id, to, outcome).await;
}
