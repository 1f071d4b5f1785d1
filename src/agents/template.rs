use serde::{Deserialize, Serialize};

use crate::error::HooksmithError;

/// Structured plan for a video's opening segment, as returned by the LLM
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookTemplate {
    pub script: String,
    pub visuals: Vec<String>,
    pub transitions: String,
    pub music: String,
    pub sound_effects: String,
    pub pacing: String,
}

impl HookTemplate {
    /// Parse an LLM reply. Every field is required.
    pub fn parse(content: &str) -> Result<Self, HooksmithError> {
        serde_json::from_str(content).map_err(|e| HooksmithError::TemplateParse(e.to_string()))
    }

    /// Render the fixed text layout shown to users
    pub fn render(&self) -> String {
        let visuals = self
            .visuals
            .iter()
            .map(|visual| format!("- {}", visual))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "Hook Script:\n\
             \"{script}\"\n\
             \n\
             Visual Elements:\n\
             {visuals}\n\
             \n\
             Transitions:\n\
             {transitions}\n\
             \n\
             Audio:\n\
             - Music: {music}\n\
             - Sound Effects: {sound_effects}\n\
             \n\
             Pacing:\n\
             {pacing}\n",
            script = self.script,
            visuals = visuals,
            transitions = self.transitions,
            music = self.music,
            sound_effects = self.sound_effects,
            pacing = self.pacing,
        )
    }
}

impl std::fmt::Display for HookTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPLY: &str = r#"{
        "script": "Nobody tells you this about shipping on Fridays.",
        "visuals": ["Wide shot of both hosts", "Close-up of the guest laughing"],
        "transitions": "Hard cuts",
        "music": "Low lo-fi bed",
        "sound_effects": "None",
        "pacing": "Quick, conversational"
    }"#;

    #[test]
    fn test_render_layout() {
        let template = HookTemplate::parse(REPLY).unwrap();

        let expected = "Hook Script:\n\
                        \"Nobody tells you this about shipping on Fridays.\"\n\
                        \n\
                        Visual Elements:\n\
                        - Wide shot of both hosts\n\
                        - Close-up of the guest laughing\n\
                        \n\
                        Transitions:\n\
                        Hard cuts\n\
                        \n\
                        Audio:\n\
                        - Music: Low lo-fi bed\n\
                        - Sound Effects: None\n\
                        \n\
                        Pacing:\n\
                        Quick, conversational\n";
        assert_eq!(template.render(), expected);
    }

    #[test]
    fn test_render_is_stable() {
        let template = HookTemplate::parse(REPLY).unwrap();
        assert_eq!(template.render(), template.render());
        assert_eq!(template.to_string(), template.render());
    }

    #[test]
    fn test_parse_ignores_extra_fields() {
        let reply = REPLY.replacen('{', r#"{"notes": "extra","#, 1);
        assert!(HookTemplate::parse(&reply).is_ok());
    }

    #[test]
    fn test_parse_rejects_missing_field() {
        let reply = r#"{"script": "s", "visuals": [], "transitions": "t", "music": "m", "pacing": "p"}"#;
        let err = HookTemplate::parse(reply).unwrap_err();
        assert!(err.to_string().contains("sound_effects"));
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        assert!(matches!(
            HookTemplate::parse("Here is your hook template!"),
            Err(HooksmithError::TemplateParse(_))
        ));
    }
}
