use crate::{CrewcastError, CrewcastResult, TaskKind};
use serde::{Deserialize, Serialize};

/// Target social media platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Twitter / X.
    Twitter,
    /// LinkedIn.
    Linkedin,
    /// Instagram.
    Instagram,
    /// Facebook.
    Facebook,
    /// TikTok.
    Tiktok,
    /// YouTube.
    Youtube,
}

impl Platform {
    /// Wire name of the platform.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Twitter => "twitter",
            Platform::Linkedin => "linkedin",
            Platform::Instagram => "instagram",
            Platform::Facebook => "facebook",
            Platform::Tiktok => "tiktok",
            Platform::Youtube => "youtube",
        }
    }
}

/// Shape of the content to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentFormat {
    /// A single post.
    Post,
    /// A multi-post thread.
    Thread,
    /// A story.
    Story,
    /// A short-form reel.
    Reel,
    /// A video.
    Video,
    /// A carousel of slides.
    Carousel,
    /// A long-form article.
    Article,
}

/// Brief for a content generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentBrief {
    /// Platform the content targets.
    pub platform: Platform,
    /// Topic or theme, 3..=200 characters.
    pub topic: String,
    /// Brand voice and tone, 3..=100 characters.
    pub brand_voice: String,
    /// Target audience description, 3..=200 characters.
    pub target_audience: String,
    /// Content shape to produce.
    #[serde(default = "default_format")]
    pub format: ContentFormat,
    /// Keywords to include, at most 20.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Hashtags to use, at most 30.
    #[serde(default)]
    pub hashtags: Vec<String>,
    /// A specific call-to-action, if any.
    #[serde(default)]
    pub call_to_action: Option<String>,
    /// Extra context or requirements.
    #[serde(default)]
    pub additional_context: Option<String>,
}

fn default_format() -> ContentFormat {
    ContentFormat::Post
}

/// Query for a trend analysis request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendQuery {
    /// Platforms to analyze, at least one.
    pub platforms: Vec<Platform>,
    /// Keywords to track, 1..=50.
    pub keywords: Vec<String>,
    /// Analysis window: one of `1h`, `24h`, `7d`, `30d`.
    #[serde(default = "default_timeframe")]
    pub timeframe: String,
    /// Competitor accounts to analyze, at most 10.
    #[serde(default)]
    pub competitor_accounts: Vec<String>,
    /// Whether to include sentiment analysis.
    #[serde(default)]
    pub include_sentiment: bool,
    /// Optional geographic region filter.
    #[serde(default)]
    pub geographic_region: Option<String>,
}

fn default_timeframe() -> String {
    "24h".to_string()
}

const VALID_TIMEFRAMES: [&str; 4] = ["1h", "24h", "7d", "30d"];

/// Brief for a video planning request.
///
/// With `include_script` set, the dispatcher expands this into a planning
/// task plus a script-writing task that depends on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoBrief {
    /// Video topic or theme, 3..=200 characters.
    pub topic: String,
    /// Platform the video targets.
    pub platform: Platform,
    /// Target duration, e.g. `30s` or `2min`.
    pub duration: String,
    /// Video style, e.g. `professional` or `energetic`.
    pub style: String,
    /// Target audience description, 3..=200 characters.
    pub target_audience: String,
    /// Whether to also produce a script.
    #[serde(default = "default_true")]
    pub include_script: bool,
    /// Brand colors to use, at most 5.
    #[serde(default)]
    pub brand_colors: Vec<String>,
    /// Preferred music style, if any.
    #[serde(default)]
    pub music_style: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Type-specific payload of a [`ContentRequest`], tagged by request type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequestPayload {
    /// Generate a social media post.
    ContentGeneration(ContentBrief),
    /// Analyze trends across platforms.
    TrendAnalysis(TrendQuery),
    /// Plan a video, optionally with a script.
    VideoPlanning(VideoBrief),
}

impl RequestPayload {
    /// The task kind of the primary task this payload maps to.
    pub fn primary_kind(&self) -> TaskKind {
        match self {
            RequestPayload::ContentGeneration(_) => TaskKind::ContentGeneration,
            RequestPayload::TrendAnalysis(_) => TaskKind::TrendAnalysis,
            RequestPayload::VideoPlanning(_) => TaskKind::VideoPlanning,
        }
    }

    /// Validates the payload shape. Violations are
    /// [`CrewcastError::InvalidRequest`] and reject the request before any
    /// task is created.
    pub fn validate(&self) -> CrewcastResult<()> {
        match self {
            RequestPayload::ContentGeneration(brief) => {
                check_len("topic", &brief.topic, 3, 200)?;
                check_len("brand_voice", &brief.brand_voice, 3, 100)?;
                check_len("target_audience", &brief.target_audience, 3, 200)?;
                check_count("keywords", brief.keywords.len(), 20)?;
                check_count("hashtags", brief.hashtags.len(), 30)?;
            }
            RequestPayload::TrendAnalysis(query) => {
                if query.platforms.is_empty() {
                    return Err(invalid("at least one platform is required"));
                }
                if query.keywords.is_empty() {
                    return Err(invalid("at least one keyword is required"));
                }
                check_count("keywords", query.keywords.len(), 50)?;
                check_count("competitor_accounts", query.competitor_accounts.len(), 10)?;
                if !VALID_TIMEFRAMES.contains(&query.timeframe.as_str()) {
                    return Err(invalid(format!(
                        "timeframe must be one of {VALID_TIMEFRAMES:?}, got '{}'",
                        query.timeframe
                    )));
                }
            }
            RequestPayload::VideoPlanning(brief) => {
                check_len("topic", &brief.topic, 3, 200)?;
                check_len("target_audience", &brief.target_audience, 3, 200)?;
                if brief.duration.trim().is_empty() {
                    return Err(invalid("duration must not be empty"));
                }
                if brief.style.trim().is_empty() {
                    return Err(invalid("style must not be empty"));
                }
                check_count("brand_colors", brief.brand_colors.len(), 5)?;
            }
        }
        Ok(())
    }
}

/// An incoming content request: who asked, and what for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRequest {
    /// Identifier of the requesting user.
    pub owner_id: String,
    /// The typed, type-specific payload.
    pub payload: RequestPayload,
}

impl ContentRequest {
    /// Creates a request for the given owner.
    pub fn new(owner_id: impl Into<String>, payload: RequestPayload) -> Self {
        Self {
            owner_id: owner_id.into(),
            payload,
        }
    }
}

fn invalid(message: impl Into<String>) -> CrewcastError {
    CrewcastError::InvalidRequest(message.into())
}

fn check_len(field: &str, value: &str, min: usize, max: usize) -> CrewcastResult<()> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(invalid(format!(
            "{field} must be {min}..={max} characters, got {len}"
        )));
    }
    Ok(())
}

fn check_count(field: &str, count: usize, max: usize) -> CrewcastResult<()> {
    if count > max {
        return Err(invalid(format!("at most {max} {field} allowed, got {count}")));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn content_brief() -> ContentBrief {
        ContentBrief {
            platform: Platform::Twitter,
            topic: "rust async".to_string(),
            brand_voice: "friendly".to_string(),
            target_audience: "backend developers".to_string(),
            format: ContentFormat::Post,
            keywords: vec!["tokio".to_string()],
            hashtags: Vec::new(),
            call_to_action: None,
            additional_context: None,
        }
    }

    #[test]
    fn valid_content_brief_passes() {
        let payload = RequestPayload::ContentGeneration(content_brief());
        payload.validate().unwrap();
        assert_eq!(payload.primary_kind(), TaskKind::ContentGeneration);
    }

    #[test]
    fn short_topic_is_rejected() {
        let mut brief = content_brief();
        brief.topic = "ai".to_string();
        let err = RequestPayload::ContentGeneration(brief).validate().unwrap_err();
        assert!(matches!(err, CrewcastError::InvalidRequest(_)));
    }

    #[test]
    fn too_many_keywords_rejected() {
        let mut brief = content_brief();
        brief.keywords = (0..21).map(|i| format!("kw{i}")).collect();
        let err = RequestPayload::ContentGeneration(brief).validate().unwrap_err();
        assert!(err.to_string().contains("keywords"));
    }

    #[test]
    fn trend_query_timeframe_is_checked() {
        let query = TrendQuery {
            platforms: vec![Platform::Tiktok],
            keywords: vec!["dance".to_string()],
            timeframe: "2w".to_string(),
            competitor_accounts: Vec::new(),
            include_sentiment: false,
            geographic_region: None,
        };
        let err = RequestPayload::TrendAnalysis(query).validate().unwrap_err();
        assert!(err.to_string().contains("timeframe"));
    }

    #[test]
    fn trend_query_requires_keywords() {
        let query = TrendQuery {
            platforms: vec![Platform::Twitter],
            keywords: Vec::new(),
            timeframe: default_timeframe(),
            competitor_accounts: Vec::new(),
            include_sentiment: false,
            geographic_region: None,
        };
        assert!(RequestPayload::TrendAnalysis(query).validate().is_err());
    }

    #[test]
    fn payload_json_is_tagged_by_type() {
        let payload = RequestPayload::ContentGeneration(content_brief());
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["type"], "content_generation");
        assert_eq!(value["platform"], "twitter");

        let back: RequestPayload = serde_json::from_value(value).unwrap();
        assert_eq!(back.primary_kind(), TaskKind::ContentGeneration);
    }

    #[test]
    fn video_brief_defaults_include_script() {
        let raw = serde_json::json!({
            "type": "video_planning",
            "topic": "product launch",
            "platform": "youtube",
            "duration": "60s",
            "style": "professional",
            "target_audience": "existing customers"
        });
        let payload: RequestPayload = serde_json::from_value(raw).unwrap();
        match &payload {
            RequestPayload::VideoPlanning(brief) => assert!(brief.include_script),
            other => panic!("unexpected payload: {other:?}"),
        }
        payload.validate().unwrap();
    }
}
