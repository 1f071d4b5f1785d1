/// Errors produced while describing or running agents.
#[derive(Debug, thiserror::Error)]
pub enum HooksmithError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("transcript unavailable for video {video_id}: {message}")]
    TranscriptUnavailable { video_id: String, message: String },

    #[error("generation error: {0}")]
    Generation(String),

    #[error("template parse error: {0}")]
    TemplateParse(String),

    #[error("video database error: {0}")]
    VideoDb(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
