use serde_json::Value;

use crate::config::PromptLimits;
use crate::videodb::Scene;

const NO_TRANSCRIPT: &str = "No transcript available";
const NO_SCENES: &str = "No scenes available";

/// Build the LLM prompt for a hook template.
///
/// Embeds the user's style prompt, the head of the transcript and the first
/// scene descriptions (as a JSON array), each bounded by `limits`.
pub fn build_hook_prompt(
    style_prompt: &str,
    transcript: &str,
    scenes: &[Scene],
    limits: &PromptLimits,
) -> String {
    let transcript = transcript_excerpt(transcript, limits.transcript_chars);
    let scenes = scene_descriptions(scenes, limits.max_scenes);

    format!(
        r#"You are an expert video editor. Create an engaging hook template by analyzing this content carefully.
Focus on capturing specific quotes and insights that will grab attention.

User's Intent: {style_prompt}

Content Analysis:
1. Find the most attention-grabbing quote or insight from the first minute
2. Identify the core message or surprising statement
3. Note the exact visual setting and speaker dynamics
4. Match the actual energy and style of the conversation

Content to Analyze:
Transcript: {transcript}
Scenes: {scenes}

Create a JSON response with:
{{
    "script": "Hook script that uses an actual quote or insight from the video",
    "visuals": [
        "IMPORTANT: Only describe scenes that are explicitly mentioned in the transcript or scene descriptions.",
        "Do not invent or add scenes that aren't in the source material.",
        "Focus on the setting and speaker interactions"
    ],
    "transitions": "Simple, clean transitions that match the setting",
    "music": "Subtle background music that won't overshadow the conversation",
    "sound_effects": "Minimal to none - only if absolutely necessary",
    "pacing": "Match the natural rhythm of the actual conversation"
}}

IMPORTANT GUIDELINES:
1. Only use visual elements that are explicitly present in the video
2. Avoid imagined or additional scenes not in the source material
3. Keep the focus on the actual conversation
4. Minimize unnecessary sound effects
5. Maintain the authentic atmosphere of the video

The hook script should incorporate real quotes or insights from the video to make it authentic and engaging.
"#
    )
}

/// First `limit` characters of the transcript, or a placeholder when empty
fn transcript_excerpt(transcript: &str, limit: usize) -> String {
    if transcript.trim().is_empty() {
        return NO_TRANSCRIPT.to_string();
    }
    transcript.chars().take(limit).collect()
}

fn scene_descriptions(scenes: &[Scene], limit: usize) -> String {
    if scenes.is_empty() {
        return NO_SCENES.to_string();
    }
    let descriptions: Vec<&str> = scenes
        .iter()
        .take(limit)
        .map(|s| s.description.as_str())
        .collect();
    Value::from(descriptions).to_string()
}
