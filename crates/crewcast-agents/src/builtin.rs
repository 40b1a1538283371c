//! Builtin offline agents for the four content roles.
//!
//! These produce deterministic, structured output from the brief alone, with
//! no network access. They stand in for LLM-backed capabilities in tests and
//! in deployments without AI service credentials.

use crate::agent::{Agent, AgentDescriptor};
use crate::registry::AgentRegistry;
use async_trait::async_trait;
use crewcast_core::{CrewcastResult, TaskKind};
use serde_json::{json, Value};
use std::sync::Arc;

fn text_field<'a>(input: &'a Value, key: &str) -> &'a str {
    input.get(key).and_then(Value::as_str).unwrap_or("")
}

fn list_field(input: &Value, key: &str) -> Vec<String> {
    input
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn as_hashtag(topic: &str) -> String {
    let compact: String = topic.split_whitespace().collect();
    format!("#{compact}")
}

/// Writes platform-optimized social media posts.
pub struct ContentWriterAgent {
    descriptor: AgentDescriptor,
}

impl ContentWriterAgent {
    /// Role name this agent registers under.
    pub const ROLE: &'static str = "content_writer";

    /// Creates the agent.
    pub fn new() -> Self {
        Self {
            descriptor: AgentDescriptor::new(
                Self::ROLE,
                "Writes engaging social media content optimized per platform and audience",
                vec![TaskKind::ContentGeneration],
            ),
        }
    }
}

impl Default for ContentWriterAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for ContentWriterAgent {
    fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    async fn execute(&self, input: Value) -> CrewcastResult<Value> {
        let platform = text_field(&input, "platform");
        let topic = text_field(&input, "topic");
        let voice = text_field(&input, "brand_voice");

        let content = match platform {
            "twitter" => format!(
                "Excited to share insights about {topic}! What's your experience with this? \
                 Share your thoughts below."
            ),
            "linkedin" => format!(
                "Sharing some thoughts on {topic} and its impact on our industry. \
                 Would love to hear your perspectives in the comments."
            ),
            "instagram" => format!(
                "Diving deep into {topic} today. What questions do you have? Drop them below."
            ),
            "tiktok" => format!("POV: you're learning about {topic}. Follow for more insights."),
            "youtube" => format!(
                "In today's video we're exploring {topic} and what it means for you. \
                 Don't forget to subscribe for more."
            ),
            _ => format!("Let's talk about {topic}! What are your thoughts?"),
        };

        let mut hashtags = list_field(&input, "hashtags");
        if hashtags.is_empty() && !topic.is_empty() {
            hashtags.push(as_hashtag(topic));
        }

        Ok(json!({
            "platform": platform,
            "content": content,
            "tone": voice,
            "hashtags": hashtags,
            "call_to_action": input.get("call_to_action").cloned().unwrap_or(Value::Null),
        }))
    }
}

/// Analyzes trending keywords across platforms.
pub struct TrendAnalystAgent {
    descriptor: AgentDescriptor,
}

impl TrendAnalystAgent {
    /// Role name this agent registers under.
    pub const ROLE: &'static str = "trend_analyst";

    /// Creates the agent.
    pub fn new() -> Self {
        Self {
            descriptor: AgentDescriptor::new(
                Self::ROLE,
                "Tracks keyword momentum and competitor activity across platforms",
                vec![TaskKind::TrendAnalysis],
            ),
        }
    }
}

impl Default for TrendAnalystAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for TrendAnalystAgent {
    fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    async fn execute(&self, input: Value) -> CrewcastResult<Value> {
        let keywords = list_field(&input, "keywords");
        let platforms = list_field(&input, "platforms");
        let timeframe = text_field(&input, "timeframe");

        // Deterministic placeholder momentum; a real analyst capability
        // replaces this with platform API data.
        let trending: Vec<Value> = keywords
            .iter()
            .enumerate()
            .map(|(rank, keyword)| {
                json!({
                    "keyword": keyword,
                    "rank": rank + 1,
                    "momentum": if rank == 0 { "rising" } else { "steady" },
                })
            })
            .collect();

        let insights = vec![
            format!("{} keywords tracked over {timeframe}", keywords.len()),
            format!("coverage: {}", platforms.join(", ")),
        ];

        Ok(json!({
            "timeframe": timeframe,
            "platforms": platforms,
            "trending": trending,
            "insights": insights,
        }))
    }
}

/// Plans video concepts, shot lists, and production guidelines.
pub struct VideoPlannerAgent {
    descriptor: AgentDescriptor,
}

impl VideoPlannerAgent {
    /// Role name this agent registers under.
    pub const ROLE: &'static str = "video_planner";

    /// Creates the agent.
    pub fn new() -> Self {
        Self {
            descriptor: AgentDescriptor::new(
                Self::ROLE,
                "Produces video concepts, shot lists, and production plans",
                vec![TaskKind::VideoPlanning],
            ),
        }
    }
}

impl Default for VideoPlannerAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for VideoPlannerAgent {
    fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    async fn execute(&self, input: Value) -> CrewcastResult<Value> {
        let topic = text_field(&input, "topic");
        let platform = text_field(&input, "platform");
        let duration = text_field(&input, "duration");
        let style = text_field(&input, "style");

        Ok(json!({
            "concept": {
                "topic": topic,
                "platform": platform,
                "style": style,
                "duration": duration,
            },
            "script_outline": {
                "hook": format!("Open with the single most surprising fact about {topic}"),
                "main_content": format!("Three key points on {topic}, one visual per point"),
                "call_to_action": "Ask viewers to comment with their own experience",
            },
            "shot_list": [
                { "shot": "establishing", "description": "Wide shot of the setting" },
                { "shot": "talking_head", "description": "Medium shot, chest up" },
                { "shot": "b_roll", "description": "Close-ups illustrating each key point" },
                { "shot": "outro", "description": "Brand card with call to action" },
            ],
            "production_notes": {
                "pre_production": ["finalize script and shot list", "scout location"],
                "filming": ["capture b-roll first", "two takes per talking-head segment"],
            },
        }))
    }
}

/// Writes video scripts, building on a video plan when one is available.
pub struct ScriptWriterAgent {
    descriptor: AgentDescriptor,
}

impl ScriptWriterAgent {
    /// Role name this agent registers under.
    pub const ROLE: &'static str = "script_writer";

    /// Creates the agent.
    pub fn new() -> Self {
        Self {
            descriptor: AgentDescriptor::new(
                Self::ROLE,
                "Writes full video scripts from a brief or an upstream video plan",
                vec![TaskKind::ScriptWriting],
            ),
        }
    }
}

impl Default for ScriptWriterAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for ScriptWriterAgent {
    fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    async fn execute(&self, input: Value) -> CrewcastResult<Value> {
        let topic = text_field(&input, "topic");
        let duration = text_field(&input, "duration");

        // Upstream video plan, injected as context by the executor when this
        // task depends on a planning task.
        let plan = input
            .get("context")
            .and_then(|ctx| ctx.get(TaskKind::VideoPlanning.as_str()));
        let hook = plan
            .and_then(|p| p.get("script_outline"))
            .and_then(|outline| outline.get("hook"))
            .and_then(Value::as_str)
            .map_or_else(
                || format!("Did you know this about {topic}?"),
                str::to_string,
            );

        Ok(json!({
            "script": {
                "hook": hook,
                "sections": [
                    { "name": "intro", "lines": format!("Welcome - today we cover {topic}.") },
                    { "name": "body", "lines": format!("Walk through the three key points on {topic}.") },
                    { "name": "outro", "lines": "Thanks for watching - tell us what you think below." },
                ],
                "target_duration": duration,
            },
            "based_on_plan": plan.is_some(),
        }))
    }
}

/// Builds a registry with all four builtin agents registered.
pub fn builtin_registry() -> CrewcastResult<AgentRegistry> {
    let mut registry = AgentRegistry::new();
    registry.register(Arc::new(ContentWriterAgent::new()))?;
    registry.register(Arc::new(TrendAnalystAgent::new()))?;
    registry.register(Arc::new(VideoPlannerAgent::new()))?;
    registry.register(Arc::new(ScriptWriterAgent::new()))?;
    Ok(registry)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn content_writer_produces_platform_content() {
        let agent = ContentWriterAgent::new();
        let output = agent
            .execute(json!({
                "platform": "twitter",
                "topic": "rust async",
                "brand_voice": "friendly",
            }))
            .await
            .unwrap();

        let content = output["content"].as_str().unwrap();
        assert!(content.contains("rust async"));
        assert_eq!(output["hashtags"][0], "#rustasync");
    }

    #[tokio::test]
    async fn trend_analyst_ranks_keywords() {
        let agent = TrendAnalystAgent::new();
        let output = agent
            .execute(json!({
                "platforms": ["tiktok", "instagram"],
                "keywords": ["dance", "cooking"],
                "timeframe": "24h",
            }))
            .await
            .unwrap();

        let trending = output["trending"].as_array().unwrap();
        assert_eq!(trending.len(), 2);
        assert_eq!(trending[0]["momentum"], "rising");
        assert_eq!(trending[1]["rank"], 2);
    }

    #[tokio::test]
    async fn script_writer_uses_plan_context_when_present() {
        let agent = ScriptWriterAgent::new();
        let with_plan = agent
            .execute(json!({
                "topic": "product launch",
                "duration": "60s",
                "context": {
                    "video_planning": {
                        "script_outline": { "hook": "The launch nobody saw coming" }
                    }
                }
            }))
            .await
            .unwrap();
        assert_eq!(with_plan["based_on_plan"], true);
        assert_eq!(with_plan["script"]["hook"], "The launch nobody saw coming");

        let without_plan = agent
            .execute(json!({ "topic": "product launch", "duration": "60s" }))
            .await
            .unwrap();
        assert_eq!(without_plan["based_on_plan"], false);
    }

    #[test]
    fn builtin_registry_covers_all_kinds() {
        let registry = builtin_registry().unwrap();
        assert_eq!(registry.agent_count(), 4);
        for kind in [
            TaskKind::ContentGeneration,
            TaskKind::TrendAnalysis,
            TaskKind::VideoPlanning,
            TaskKind::ScriptWriting,
        ] {
            registry.resolve(kind).unwrap();
        }
    }
}
