use crate::agent::{Agent, AgentDescriptor};
use crewcast_core::{CrewcastError, CrewcastResult, TaskKind};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Central registry mapping agent roles to capabilities and task kinds to
/// the single role that accepts them.
///
/// Built mutably during process startup, then shared immutably behind an
/// `Arc`. A role registered twice, or a task kind claimed by two roles, is
/// a configuration error rejected at registration time — never at dispatch.
pub struct AgentRegistry {
    agents: HashMap<String, Arc<dyn Agent>>,
    role_by_kind: HashMap<TaskKind, String>,
}

impl AgentRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            agents: HashMap::new(),
            role_by_kind: HashMap::new(),
        }
    }

    /// Registers an agent under its descriptor's role.
    ///
    /// Fails with [`CrewcastError::DuplicateRole`] if the role already
    /// exists, and with [`CrewcastError::Config`] if another role already
    /// claims one of its accepted task kinds.
    pub fn register(&mut self, agent: Arc<dyn Agent>) -> CrewcastResult<()> {
        let descriptor = agent.descriptor().clone();
        if self.agents.contains_key(&descriptor.role) {
            return Err(CrewcastError::DuplicateRole(descriptor.role));
        }
        for kind in &descriptor.accepted_kinds {
            if let Some(existing) = self.role_by_kind.get(kind) {
                return Err(CrewcastError::Config(format!(
                    "task kind '{kind}' claimed by both '{existing}' and '{}'",
                    descriptor.role
                )));
            }
        }

        for kind in &descriptor.accepted_kinds {
            self.role_by_kind.insert(*kind, descriptor.role.clone());
        }
        info!(role = %descriptor.role, "Registered agent");
        self.agents.insert(descriptor.role, agent);
        Ok(())
    }

    /// Resolves the single role that accepts the given task kind.
    pub fn resolve(&self, kind: TaskKind) -> CrewcastResult<&str> {
        self.role_by_kind
            .get(&kind)
            .map(String::as_str)
            .ok_or(CrewcastError::NoAgentForType(kind))
    }

    /// The capability registered under a role, if any.
    pub fn get(&self, role: &str) -> Option<Arc<dyn Agent>> {
        self.agents.get(role).cloned()
    }

    /// Descriptors of all registered agents.
    pub fn descriptors(&self) -> Vec<&AgentDescriptor> {
        self.agents.values().map(|a| a.descriptor()).collect()
    }

    /// Number of registered agents.
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
