use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::prompt::build_hook_prompt;
use super::{Agent, AgentResponse, HookTemplate, ParameterSchema, ParameterType};
use crate::config::PromptLimits;
use crate::error::HooksmithError;
use crate::llm::{LlmProvider, Message, ResponseFormat};
use crate::session::{ContentId, MsgStatus, OutputMessage, TextContent};
use crate::videodb::{Scene, VideoDataSource, VideoDbConnector};

const AGENT_NAME: &str = "hook_template";

/// Arguments of the hook template agent
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HookTemplateRequest {
    pub video_id: String,
    pub collection_id: String,
    pub prompt: String,
}

impl HookTemplateRequest {
    fn from_args(args: Value) -> Result<Self, HooksmithError> {
        let request: Self = serde_json::from_value(args)
            .map_err(|e| HooksmithError::InvalidArguments(e.to_string()))?;
        for (name, value) in [
            ("video_id", &request.video_id),
            ("collection_id", &request.collection_id),
            ("prompt", &request.prompt),
        ] {
            if value.trim().is_empty() {
                return Err(HooksmithError::InvalidArguments(format!(
                    "'{}' must not be empty",
                    name
                )));
            }
        }
        Ok(request)
    }
}

/// Which transcript fetch this is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchAttempt {
    Initial,
    AfterIndexing,
}

/// Outcome of one transcript fetch
#[derive(Debug)]
enum TranscriptFetch {
    Ready(String),
    /// The first fetch failed; index spoken words and fetch once more
    NeedsIndexing(String),
    Failed(String),
}

impl TranscriptFetch {
    fn classify(result: anyhow::Result<String>, attempt: FetchAttempt) -> Self {
        match (result, attempt) {
            (Ok(text), _) => Self::Ready(text),
            (Err(e), FetchAttempt::Initial) => Self::NeedsIndexing(format!("{:#}", e)),
            (Err(e), FetchAttempt::AfterIndexing) => Self::Failed(format!("{:#}", e)),
        }
    }
}

/// Scenes obtained for the prompt.
///
/// Scene problems never abort generation; they degrade to `Unavailable`.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneAcquisition {
    /// Read from an index that already existed
    Existing(Vec<Scene>),
    /// Read from an index created during this invocation
    Created(Vec<Scene>),
    Unavailable { reason: String },
}

impl SceneAcquisition {
    pub fn into_scenes(self) -> Vec<Scene> {
        match self {
            Self::Existing(scenes) | Self::Created(scenes) => scenes,
            Self::Unavailable { .. } => Vec::new(),
        }
    }
}

/// Generates hook templates from a video's transcript and scenes
pub struct HookTemplateAgent {
    llm: Arc<dyn LlmProvider>,
    videodb: Arc<dyn VideoDbConnector>,
    limits: PromptLimits,
}

impl HookTemplateAgent {
    pub fn new(llm: Arc<dyn LlmProvider>, videodb: Arc<dyn VideoDbConnector>) -> Self {
        Self {
            llm,
            videodb,
            limits: PromptLimits::default(),
        }
    }

    /// Override how much transcript and how many scenes reach the prompt
    pub fn with_limits(mut self, limits: PromptLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Generate a hook template. Never fails; errors become an error response
    /// and an error status on the output message.
    pub async fn generate(
        &self,
        request: &HookTemplateRequest,
        output: &mut OutputMessage,
    ) -> AgentResponse {
        info!(
            video_id = %request.video_id,
            collection_id = %request.collection_id,
            "generating hook template"
        );

        let content = output.add_content(TextContent::progress(
            AGENT_NAME,
            "Analyzing video content...",
        ));

        match self.try_generate(request, output).await {
            Ok(template) => {
                if let Some(block) = output.content_mut(content) {
                    block.text = template.clone();
                    block.status = MsgStatus::Success;
                    block.status_message = "Hook template generated successfully".to_string();
                }
                output.publish();
                info!(video_id = %request.video_id, "hook template generated");

                AgentResponse::success(format!("Agent {} completed successfully.", AGENT_NAME))
                    .with_data("template", template)
            }
            Err(e) => {
                error!(video_id = %request.video_id, error = %e, "hook template generation failed");
                fail_content(output, content, &e);
                AgentResponse::error(format!("Agent failed with error: {}", e))
            }
        }
    }

    async fn try_generate(
        &self,
        request: &HookTemplateRequest,
        output: &mut OutputMessage,
    ) -> Result<String, HooksmithError> {
        let source = self
            .videodb
            .connect(&request.collection_id)
            .await
            .map_err(|e| HooksmithError::VideoDb(format!("{:#}", e)))?;

        let transcript = self
            .acquire_transcript(source.as_ref(), &request.video_id, output)
            .await?;
        let scenes = self
            .acquire_scenes(source.as_ref(), &request.video_id, output)
            .await
            .into_scenes();

        let prompt = build_hook_prompt(&request.prompt, &transcript, &scenes, &self.limits);
        debug!(
            prompt_chars = prompt.len(),
            scenes = scenes.len(),
            "built hook prompt"
        );

        output.push_action("Generating hook template...");

        let response = self
            .llm
            .chat_completions(&[Message::user(prompt)], ResponseFormat::JsonObject)
            .await
            .map_err(|e| HooksmithError::Generation(format!("{:#}", e)))?;
        if !response.status {
            return Err(HooksmithError::Generation(format!(
                "failed to generate hook template: {}",
                response.content
            )));
        }

        let template = HookTemplate::parse(&response.content)?;
        Ok(template.render())
    }

    /// Fetch the transcript, indexing spoken words and retrying once if the
    /// first fetch fails. A failure after indexing is fatal.
    async fn acquire_transcript(
        &self,
        source: &dyn VideoDataSource,
        video_id: &str,
        output: &mut OutputMessage,
    ) -> Result<String, HooksmithError> {
        output.push_action("Processing video transcript...");

        let first = TranscriptFetch::classify(
            source.get_transcript(video_id).await,
            FetchAttempt::Initial,
        );
        let reason = match first {
            TranscriptFetch::Ready(text) => return Ok(text),
            TranscriptFetch::NeedsIndexing(reason) | TranscriptFetch::Failed(reason) => reason,
        };

        info!(video_id, reason = %reason, "transcript not available, indexing spoken words");
        output.push_action("Indexing video speech...");

        let unavailable = |message: String| HooksmithError::TranscriptUnavailable {
            video_id: video_id.to_string(),
            message,
        };

        source
            .index_spoken_words(video_id)
            .await
            .map_err(|e| unavailable(format!("indexing spoken words failed: {:#}", e)))?;

        match TranscriptFetch::classify(
            source.get_transcript(video_id).await,
            FetchAttempt::AfterIndexing,
        ) {
            TranscriptFetch::Ready(text) => Ok(text),
            TranscriptFetch::NeedsIndexing(reason) | TranscriptFetch::Failed(reason) => {
                Err(unavailable(reason))
            }
        }
    }

    /// Use the first existing scene index, or try to create one
    async fn acquire_scenes(
        &self,
        source: &dyn VideoDataSource,
        video_id: &str,
        output: &mut OutputMessage,
    ) -> SceneAcquisition {
        output.push_action("Analyzing video scenes...");

        let existing = match source.list_scene_index(video_id).await {
            Ok(indexes) => indexes.into_iter().next(),
            Err(e) => {
                warn!(video_id, error = %e, "failed to list scene indexes");
                None
            }
        };

        if let Some(index) = existing {
            return match source.get_scene_index(video_id, &index.scene_index_id).await {
                Ok(scenes) => SceneAcquisition::Existing(scenes),
                Err(e) => {
                    warn!(video_id, error = %e, "failed to read scene index");
                    SceneAcquisition::Unavailable {
                        reason: format!("{:#}", e),
                    }
                }
            };
        }

        output.push_action("Scene index not found. Creating scene index...");

        let created = match source.index_scene(video_id).await {
            Ok(Some(index)) => index,
            Ok(None) => {
                warn!(video_id, "failed to create scene index");
                return SceneAcquisition::Unavailable {
                    reason: "scene indexing produced no index".to_string(),
                };
            }
            Err(e) => {
                warn!(video_id, error = %e, "error creating scene index");
                return SceneAcquisition::Unavailable {
                    reason: format!("{:#}", e),
                };
            }
        };

        match source
            .get_scene_index(video_id, &created.scene_index_id)
            .await
        {
            Ok(scenes) => SceneAcquisition::Created(scenes),
            Err(e) => {
                warn!(video_id, error = %e, "failed to read new scene index");
                SceneAcquisition::Unavailable {
                    reason: format!("{:#}", e),
                }
            }
        }
    }
}

fn fail_content(output: &mut OutputMessage, content: ContentId, error: &HooksmithError) {
    if let Some(block) = output.content_mut(content) {
        block.status = MsgStatus::Error;
        block.status_message = format!("Error generating hook template: {}", error);
    }
    output.publish();
}

#[async_trait]
impl Agent for HookTemplateAgent {
    fn name(&self) -> &str {
        AGENT_NAME
    }

    fn description(&self) -> &str {
        "Generates video hook templates by analyzing video content and creating structured recommendations."
    }

    fn parameters(&self) -> Option<ParameterSchema> {
        Some(
            ParameterSchema::object()
                .required(
                    "video_id",
                    ParameterType::String,
                    "ID of the video to analyze",
                )
                .required(
                    "collection_id",
                    ParameterType::String,
                    "Collection ID of the video",
                )
                .required(
                    "prompt",
                    ParameterType::String,
                    "Description of the desired hook style",
                ),
        )
    }

    async fn run(
        &self,
        args: Value,
        output: &mut OutputMessage,
    ) -> Result<AgentResponse, HooksmithError> {
        let request = HookTemplateRequest::from_args(args)?;
        Ok(self.generate(&request, output).await)
    }
}
