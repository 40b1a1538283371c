//! Agent capabilities and the role registry for Crewcast.
//!
//! The orchestration core treats an agent as an opaque capability:
//! structured input in, structured output or an error out. This crate
//! provides the [`Agent`] trait, the [`AgentRegistry`] that maps roles to
//! capabilities and task kinds to roles, and builtin offline agents for the
//! four content roles.

/// The agent trait and its descriptor.
pub mod agent;
/// Builtin offline agents for the four content roles.
pub mod builtin;
/// The role registry.
pub mod registry;

pub use agent::{Agent, AgentDescriptor};
pub use builtin::{
    builtin_registry, ContentWriterAgent, ScriptWriterAgent, TrendAnalystAgent, VideoPlannerAgent,
};
pub use registry::AgentRegistry;
