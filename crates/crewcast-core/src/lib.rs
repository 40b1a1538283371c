//! Core types and error definitions for the Crewcast orchestration core.
//!
//! This crate provides the foundational types shared across all Crewcast
//! crates: error handling, the task model and its state machine, content
//! request payloads, and the status event types.
//!
//! # Main types
//!
//! - [`CrewcastError`] — Unified error enum for all Crewcast subsystems.
//! - [`CrewcastResult`] — Convenience alias for `Result<T, CrewcastError>`.
//! - [`Task`] — A unit of orchestrated work with a lifecycle state.
//! - [`TaskGraph`] — The tasks and dependency edges planned for one request.
//! - [`ContentRequest`] — An incoming content request with a typed payload.
//! - [`TaskEvent`] — A state transition as delivered to status subscribers.

/// Status events and subscriber filters.
pub mod event;
/// Content request payloads and their validation rules.
pub mod request;
/// The task model, state machine, and task graph.
pub mod task;

pub use event::{EventFilter, TaskEvent};
pub use request::{
    ContentBrief, ContentFormat, ContentRequest, Platform, RequestPayload, TrendQuery, VideoBrief,
};
pub use task::{Task, TaskError, TaskErrorKind, TaskGraph, TaskKind, TaskOutcome, TaskState};

use uuid::Uuid;

/// Top-level error type for the Crewcast orchestration core.
#[derive(Debug, thiserror::Error)]
pub enum CrewcastError {
    /// The request payload failed shape validation. No task was created.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No registered agent role accepts the given task kind.
    #[error("No agent registered for task kind '{0}'")]
    NoAgentForType(TaskKind),

    /// An agent role was registered twice. A configuration error, surfaced
    /// at startup.
    #[error("Agent role '{0}' is already registered")]
    DuplicateRole(String),

    /// A disallowed state machine edge was attempted. Never expected in
    /// correct operation; logged as a bug signal.
    #[error("Invalid transition for task {id}: {from} -> {to}")]
    InvalidTransition {
        /// The task whose transition was rejected.
        id: Uuid,
        /// State the task was in.
        from: TaskState,
        /// State the caller attempted to move to.
        to: TaskState,
    },

    /// Cancellation was requested for a task that already reached a
    /// terminal state. Benign; the terminal state is left untouched.
    #[error("Task {0} already reached a terminal state")]
    AlreadyTerminal(Uuid),

    /// The task id is unknown to the store.
    #[error("Task {0} not found")]
    NotFound(Uuid),

    /// Work was submitted after shutdown. The request is rejected and no
    /// task is created.
    #[error("Orchestrator is shut down")]
    ShutDown,

    /// An error from the task store backend.
    #[error("Store error: {0}")]
    Store(String),

    /// An error reported by an agent capability during execution.
    #[error("Agent error: {0}")]
    Agent(String),

    /// An error in configuration parsing or validation.
    #[error("Config error: {0}")]
    Config(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`CrewcastError`].
pub type CrewcastResult<T> = Result<T, CrewcastError>;
