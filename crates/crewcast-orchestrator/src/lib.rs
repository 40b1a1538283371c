//! The Crewcast orchestration core.
//!
//! Coordinates specialized content agents to fulfill social media content
//! requests: a request is admitted, planned into a task graph, executed
//! asynchronously against the agent registry under a bounded concurrency
//! limit, and every state transition is persisted to the task store and
//! fanned out to status subscribers.
//!
//! # Main types
//!
//! - [`Coordinator`] — The public entry point: submit, query, cancel,
//!   subscribe.
//! - [`Dispatcher`] — Plans the task graph for a request. Pure.
//! - [`ExecutorPool`] — Runs tasks against agents with bounded concurrency,
//!   timeouts, and cascade cancellation.
//! - [`StatusBroadcaster`] — Fans task events out to subscribers.
//! - [`OrchestratorConfig`] — Concurrency limit, per-task timeout, and
//!   subscriber buffer size.

/// Fan-out of task events to subscribers.
pub mod broadcast;
/// Runtime configuration.
pub mod config;
/// The public entry point.
pub mod coordinator;
/// Request planning.
pub mod dispatcher;
/// Asynchronous task execution.
pub mod executor;

pub use broadcast::StatusBroadcaster;
pub use config::OrchestratorConfig;
pub use coordinator::{AgentStatus, Coordinator, SubmitAck};
pub use dispatcher::Dispatcher;
pub use executor::ExecutorPool;
