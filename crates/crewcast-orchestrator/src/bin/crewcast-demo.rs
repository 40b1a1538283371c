//! Offline demo: wires the builtin agents to an in-memory store, submits a
//! content request and a video request, and prints status events as the
//! tasks run.
//!
//! Pass a TOML config path as the first argument to override the defaults.

use crewcast_agents::builtin_registry;
use crewcast_core::{
    ContentBrief, ContentFormat, ContentRequest, CrewcastResult, EventFilter, Platform,
    RequestPayload, VideoBrief,
};
use crewcast_orchestrator::{Coordinator, OrchestratorConfig};
use crewcast_store::MemoryTaskStore;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::StreamExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

const OWNER: &str = "demo";

#[tokio::main]
async fn main() -> CrewcastResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => OrchestratorConfig::load(path).await?,
        None => OrchestratorConfig::default(),
    };

    let registry = Arc::new(builtin_registry()?);
    let coordinator = Coordinator::new(registry, Arc::new(MemoryTaskStore::new()), config);

    let mut events = coordinator.subscribe(EventFilter::for_owner(OWNER));
    tokio::spawn(async move {
        while let Some(event) = events.next().await {
            info!(
                task_id = %event.task_id,
                kind = %event.kind,
                from = %event.old_state,
                to = %event.new_state,
                "Status event"
            );
        }
    });

    coordinator
        .submit_request(&ContentRequest::new(
            OWNER,
            RequestPayload::ContentGeneration(ContentBrief {
                platform: Platform::Twitter,
                topic: "launching our new analytics dashboard".to_string(),
                brand_voice: "confident but approachable".to_string(),
                target_audience: "data-driven marketing teams".to_string(),
                format: ContentFormat::Post,
                keywords: vec!["analytics".to_string(), "dashboards".to_string()],
                hashtags: Vec::new(),
                call_to_action: Some("Start your free trial today".to_string()),
                additional_context: None,
            }),
        ))
        .await?;

    coordinator
        .submit_request(&ContentRequest::new(
            OWNER,
            RequestPayload::VideoPlanning(VideoBrief {
                topic: "analytics dashboard walkthrough".to_string(),
                platform: Platform::Youtube,
                duration: "90s".to_string(),
                style: "professional".to_string(),
                target_audience: "data-driven marketing teams".to_string(),
                include_script: true,
                brand_colors: vec!["#1a73e8".to_string()],
                music_style: None,
            }),
        ))
        .await?;

    // Poll until every submitted task reaches a terminal state.
    loop {
        let tasks = coordinator.list_tasks(OWNER, None).await?;
        if tasks.iter().all(crewcast_core::Task::is_terminal) {
            for task in &tasks {
                info!(task_id = %task.id, kind = %task.kind, state = %task.state, "Final state");
                if let Some(result) = &task.result {
                    println!("--- {} ---\n{}", task.kind, serde_json::to_string_pretty(result)?);
                }
            }
            break;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }

    for status in coordinator.agents_status().await? {
        info!(
            role = %status.role,
            healthy = status.healthy,
            active_tasks = status.active_tasks,
            "Agent status"
        );
    }

    coordinator.shutdown();
    Ok(())
}
