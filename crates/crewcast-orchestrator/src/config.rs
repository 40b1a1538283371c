use crewcast_core::{CrewcastError, CrewcastResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Runtime tuning for the executor pool and the status broadcaster.
///
/// All fields have defaults, so an empty TOML document is a valid
/// configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Maximum number of concurrently running tasks.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// Per-task execution timeout in milliseconds. A task exceeding it is
    /// marked failed with a timeout error; it is not retried.
    #[serde(default = "default_task_timeout_ms")]
    pub task_timeout_ms: u64,
    /// Per-subscriber event buffer size. A subscriber whose buffer
    /// overflows is dropped and must re-subscribe.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

fn default_max_concurrent() -> usize {
    4
}

fn default_task_timeout_ms() -> u64 {
    300_000
}

fn default_event_buffer() -> usize {
    64
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            task_timeout_ms: default_task_timeout_ms(),
            event_buffer: default_event_buffer(),
        }
    }
}

impl OrchestratorConfig {
    /// The per-task timeout as a [`Duration`].
    pub fn task_timeout(&self) -> Duration {
        Duration::from_millis(self.task_timeout_ms)
    }

    /// Parses a configuration from a TOML string.
    pub fn from_toml_str(raw: &str) -> CrewcastResult<Self> {
        let config: Self =
            toml::from_str(raw).map_err(|e| CrewcastError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration from a TOML file.
    pub async fn load(path: impl AsRef<Path>) -> CrewcastResult<Self> {
        let raw = tokio::fs::read_to_string(path).await?;
        Self::from_toml_str(&raw)
    }

    fn validate(&self) -> CrewcastResult<()> {
        if self.max_concurrent == 0 {
            return Err(CrewcastError::Config(
                "max_concurrent must be at least 1".to_string(),
            ));
        }
        if self.event_buffer == 0 {
            return Err(CrewcastError::Config(
                "event_buffer must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = OrchestratorConfig::from_toml_str("").unwrap();
        assert_eq!(config.max_concurrent, 4);
        assert_eq!(config.task_timeout_ms, 300_000);
        assert_eq!(config.event_buffer, 64);
    }

    #[test]
    fn partial_toml_overrides_some_fields() {
        let config =
            OrchestratorConfig::from_toml_str("max_concurrent = 8\ntask_timeout_ms = 1000")
                .unwrap();
        assert_eq!(config.max_concurrent, 8);
        assert_eq!(config.task_timeout(), Duration::from_secs(1));
        assert_eq!(config.event_buffer, 64);
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let err = OrchestratorConfig::from_toml_str("max_concurrent = 0").unwrap_err();
        assert!(matches!(err, CrewcastError::Config(_)));
    }
}
